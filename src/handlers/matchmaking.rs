//! `Matchmaking` and `ReadyCheck` phases.

use super::PhaseContext;
use crate::error::FlowError;
use crate::phase::Phase;

/// Stay in this handler until the queue pops or is abandoned.
pub async fn wait_in_queue(ctx: &mut PhaseContext<'_>) -> Result<(), FlowError> {
    tracing::info!("In queue, waiting for match");
    loop {
        let phase = ctx.observe_phase().await?;
        if phase != Phase::Matchmaking {
            tracing::debug!(phase = %phase, "Left queue");
            return Ok(());
        }
        ctx.pause_ms(ctx.timings().queue_pace_ms).await?;
    }
}

/// Accepting twice is harmless, so this never checks first.
pub async fn accept_ready_check(ctx: &mut PhaseContext<'_>) -> Result<(), FlowError> {
    tracing::info!("Accepting match");
    if let Err(e) = ctx.service.accept_ready_check().await {
        tracing::warn!(error = %e, "Accept ready check failed");
    }
    Ok(())
}
