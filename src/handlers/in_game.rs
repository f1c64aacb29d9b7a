//! `InProgress`, `Reconnect` and `WaitingForStats` phases.

use super::PhaseContext;
use crate::budget::{BudgetOutcome, BudgetVerdict, ErrorBudget};
use crate::error::FlowError;
use crate::phase::Phase;
use crate::service::ReconnectAck;

pub async fn play_game(ctx: &mut PhaseContext<'_>) -> Result<(), FlowError> {
    let game = ctx.collaborators.game.clone();
    game.play(ctx.service, ctx.pacer).await
}

/// Ask to rejoin a few times. Giving up is not fatal; the phase is re-polled.
pub async fn reconnect(ctx: &mut PhaseContext<'_>) -> Result<(), FlowError> {
    let mut budget = ErrorBudget::new("reconnect", ctx.config.budgets.reconnect_attempts);
    loop {
        match ctx.service.reconnect().await {
            Ok(ReconnectAck::Accepted) => {
                tracing::info!("Reconnected to game");
                return Ok(());
            }
            Ok(ReconnectAck::Rejected { status }) => {
                tracing::debug!(status, "Reconnect rejected");
            }
            Err(e) => {
                tracing::debug!(error = %e, "Reconnect request failed");
            }
        }
        if budget.record(BudgetOutcome::NoProgress) == BudgetVerdict::Escalate {
            tracing::warn!(
                budget = budget.name(),
                attempts = budget.count(),
                "Could not reconnect to game"
            );
            return Ok(());
        }
        ctx.pause_ms(ctx.timings().reconnect_pace_ms).await?;
    }
}

/// Stats usually land within seconds; a client stuck here needs a restart.
pub async fn wait_for_stats(ctx: &mut PhaseContext<'_>) -> Result<(), FlowError> {
    tracing::info!("Waiting for stats");
    let mut budget = ErrorBudget::new("stats_wait", ctx.config.budgets.stats_wait_polls);
    loop {
        ctx.pause_ms(ctx.timings().stats_pace_ms).await?;
        let phase = ctx.observe_phase().await?;
        if phase != Phase::WaitingForStats {
            budget.record(BudgetOutcome::Progress);
            return Ok(());
        }
        if budget.record(BudgetOutcome::NoProgress) == BudgetVerdict::Escalate {
            tracing::warn!(budget = budget.name(), polls = budget.count(), "Waiting for stats timeout");
            return Err(FlowError::StatsTimeout {
                polls: budget.count(),
            });
        }
    }
}
