//! `None` and `Lobby` phases.

use super::PhaseContext;
use crate::error::FlowError;
use crate::pacing::format_min_sec;

/// Open a lobby for the target queue. No read-back.
pub async fn create_lobby(ctx: &mut PhaseContext<'_>) -> Result<(), FlowError> {
    let queue_id = ctx.state.target_queue_id;
    tracing::info!(queue_id, "Creating lobby");
    if let Err(e) = ctx.service.create_lobby(queue_id).await {
        tracing::warn!(queue_id, error = %e, "Create lobby failed");
    }
    ctx.pause_ms(ctx.timings().lobby_settle_ms).await
}

/// Make sure the lobby targets the right queue, start searching, and sit out
/// any dodge penalty before returning.
pub async fn start_matchmaking(ctx: &mut PhaseContext<'_>) -> Result<(), FlowError> {
    let queue_id = ctx.state.target_queue_id;
    tracing::info!(queue_id, "Starting queue");

    let lobby_matches = match ctx.service.get_lobby().await {
        Ok(lobby) if lobby.queue_id() == queue_id => true,
        Ok(lobby) => {
            tracing::info!(
                current = lobby.queue_id(),
                target = queue_id,
                "Lobby is for the wrong queue"
            );
            false
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not read lobby, recreating it");
            false
        }
    };
    if !lobby_matches {
        create_lobby(ctx).await?;
        ctx.pause_ms(ctx.timings().lobby_recreate_ms).await?;
    }

    if let Err(e) = ctx.service.start_matchmaking_search().await {
        tracing::warn!(error = %e, "Start matchmaking failed");
    }
    ctx.pause_ms(ctx.timings().search_probe_ms).await?;

    match ctx.service.get_matchmaking_search_state().await {
        Ok(search) => {
            if let Some(penalty) = search.penalty() {
                tracing::info!(
                    remaining = %format_min_sec(penalty.as_secs()),
                    "Dodge timer active, waiting it out"
                );
                ctx.pause(penalty).await?;
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "Matchmaking search state unavailable");
        }
    }
    Ok(())
}
