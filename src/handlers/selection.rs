//! `ChampSelect` phase: hover, lock in, say one line.
//!
//! Hovering and locking in are separate remote operations, and the handler
//! may be entered mid-selection, so every pass accepts either state.

use super::PhaseContext;
use crate::error::FlowError;
use crate::service::{SelectionAction, SelectionSession};
use crate::session::{PickPool, PickSource};

pub async fn automate_selection(ctx: &mut PhaseContext<'_>) -> Result<(), FlowError> {
    let mut session = match ctx.service.get_selection_session().await {
        Ok(session) => session,
        Err(e) => {
            tracing::debug!(error = %e, "Selection session unavailable");
            return Ok(());
        }
    };
    let fallback = match ctx.service.get_fallback_option_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::debug!(error = %e, "Fallback option pool unavailable");
            return Ok(());
        }
    };
    let mut pool = PickPool::new(ctx.config.preferred_options.clone(), fallback);

    loop {
        let timer_phase = session.timer.phase.clone();
        let seconds_left = session.timer.seconds_left();

        match session.local_action().cloned() {
            Some(action) if !action.completed => match action.chosen_option() {
                None => {
                    tracing::info!(state = %timer_phase, seconds_left, "Selection: hovering option");
                    hover_next(ctx, &mut pool, &action).await;
                }
                Some(option_id) => {
                    tracing::info!(state = %timer_phase, seconds_left, option_id, "Selection: locking in");
                    lock_in(ctx, &action, option_id).await?;
                }
            },
            Some(_) => {
                tracing::debug!(state = %timer_phase, seconds_left, "Selection: waiting");
            }
            None => {
                tracing::debug!(state = %timer_phase, seconds_left, "Selection: no local action yet");
            }
        }

        session = match refetch(ctx).await? {
            Some(session) => session,
            None => {
                tracing::info!("Selection closed");
                return Ok(());
            }
        };
        ctx.pause_ms(ctx.timings().selection_pace_ms).await?;
    }
}

async fn hover_next(ctx: &mut PhaseContext<'_>, pool: &mut PickPool, action: &SelectionAction) {
    let Some((option_id, source)) = pool.next_option() else {
        tracing::warn!(action_id = action.action_id, "No options left to hover");
        return;
    };
    if source == PickSource::Fallback {
        tracing::debug!(
            option_id,
            remaining = pool.remaining(),
            "Preferred options exhausted, using fallback pool"
        );
    }
    if let Err(e) = ctx
        .service
        .submit_selection_option(action.action_id, option_id)
        .await
    {
        tracing::warn!(action_id = action.action_id, option_id, error = %e, "Hover failed");
    }
}

async fn lock_in(
    ctx: &mut PhaseContext<'_>,
    action: &SelectionAction,
    option_id: i64,
) -> Result<(), FlowError> {
    if let Err(e) = ctx
        .service
        .complete_selection_action(action.action_id, option_id)
        .await
    {
        tracing::warn!(action_id = action.action_id, option_id, error = %e, "Lock in failed");
        return Ok(());
    }

    if !ctx.state.chat_sent {
        ctx.pause_ms(ctx.timings().chat_delay_ms).await?;
        send_chat_line(ctx).await;
        ctx.state.chat_sent = true;
    }
    Ok(())
}

/// Read the session again. `None` means the selection phase is over.
async fn refetch(ctx: &mut PhaseContext<'_>) -> Result<Option<SelectionSession>, FlowError> {
    let attempts = ctx.config.budgets.selection_refetch_attempts.max(1);
    for attempt in 1..=attempts {
        match ctx.service.get_selection_session().await {
            Ok(session) => return Ok(Some(session)),
            Err(e) => {
                tracing::debug!(attempt, error = %e, "Selection session re-read failed");
            }
        }
        if attempt < attempts {
            ctx.pause_ms(ctx.timings().poll_retry_ms).await?;
        }
    }
    Ok(None)
}

/// Post one dialogue line to the selection chat. Every failure is swallowed.
pub async fn send_chat_line(ctx: &mut PhaseContext<'_>) {
    let Some(line) = ctx.collaborators.dialogue.random_line() else {
        tracing::debug!("No dialogue configured, skipping chat");
        return;
    };

    let conversations = match ctx.service.get_conversations().await {
        Ok(conversations) => conversations,
        Err(e) => {
            tracing::warn!(error = %e, "Chat attempt failed, could not list conversations");
            return;
        }
    };

    let Some(channel) = conversations
        .iter()
        .filter(|c| !c.is_direct_message())
        .last()
    else {
        tracing::warn!("Chat attempt failed, no selection channel");
        return;
    };

    match ctx.service.post_chat_message(&channel.id, &line).await {
        Ok(()) => tracing::debug!(channel = %channel.kind, message = %line, "Message sent"),
        Err(e) => tracing::warn!(error = %e, "Could not send message"),
    }
}
