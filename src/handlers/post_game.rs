//! `PreEndOfGame` and `EndOfGame` phases.
//!
//! Some post-game screens (email prompt, reward pop-ups) have no REST
//! equivalent and are clicked through via `UiAutomation`. That part is best
//! effort. The honor step is not: an unanswered honor screen blocks the
//! client, so a skip is always submitted when no teammate could be honored.

use std::time::Duration;

use super::{lobby, PhaseContext};
use crate::budget::{BudgetOutcome, BudgetVerdict, ErrorBudget};
use crate::config::{PostGameUiConfig, UiTarget};
use crate::error::{CollaboratorError, FlowError};
use crate::phase::Phase;
use crate::service::HONOR_SKIP;

/// Why a block of post-game clicks stopped early.
enum StepError {
    Flow(FlowError),
    Ui(CollaboratorError),
}

impl From<FlowError> for StepError {
    fn from(e: FlowError) -> Self {
        StepError::Flow(e)
    }
}

impl From<CollaboratorError> for StepError {
    fn from(e: CollaboratorError) -> Self {
        StepError::Ui(e)
    }
}

pub async fn clean_up_post_game(ctx: &mut PhaseContext<'_>) -> Result<(), FlowError> {
    tracing::info!("Honoring teammates and accepting rewards");
    let settle = ctx.timings().post_game_settle_ms;
    ctx.pause_ms(settle).await?;

    let ui = ctx.config.post_game_ui.clone();

    // The client window often appears after the service is already up, so
    // the first dismissal may fail without affecting the honor step.
    if let Some(ui) = &ui {
        match click(ctx, ui, ui.dismiss_popup).await {
            Ok(()) => ctx.pause_ms(ctx.timings().ui_step_ms).await?,
            Err(e) => tracing::debug!(error = %e, "Pre-honor dismissal failed"),
        }
    }

    honor_teammate(ctx).await?;

    let Some(ui) = ui else {
        tracing::debug!("No post-game click targets configured");
        return Ok(());
    };
    match click_through_rewards(ctx, &ui).await {
        Ok(()) => Ok(()),
        Err(StepError::Flow(e)) => Err(e),
        Err(StepError::Ui(e)) => {
            tracing::debug!(error = %e, "Post-game cleanup stopped early");
            ctx.pause_ms(settle).await
        }
    }
}

async fn click_through_rewards(
    ctx: &mut PhaseContext<'_>,
    ui: &PostGameUiConfig,
) -> Result<(), StepError> {
    let step = ctx.timings().ui_step_ms;
    ctx.pause_ms(step * 2).await?;
    click(ctx, ui, ui.dismiss_popup).await?;
    ctx.pause_ms(step).await?;
    for _ in 0..ui.reward_screens {
        click(ctx, ui, ui.reward_select).await?;
        click(ctx, ui, ui.reward_confirm).await?;
    }
    click(ctx, ui, ui.dismiss_popup).await?;
    Ok(())
}

async fn click(
    ctx: &PhaseContext<'_>,
    ui: &PostGameUiConfig,
    target: UiTarget,
) -> Result<(), CollaboratorError> {
    ctx.collaborators
        .ui
        .click(
            target,
            &ui.window_name,
            Duration::from_secs(ui.click_timeout_secs),
        )
        .await
}

/// Honor one eligible teammate chosen uniformly at random, or submit a skip.
pub async fn honor_teammate(ctx: &mut PhaseContext<'_>) -> Result<(), FlowError> {
    let attempts = ctx.config.budgets.honor_ballot_attempts.max(1);
    for attempt in 1..=attempts {
        match ctx.service.get_honor_ballot().await {
            Ok(ballot) if !ballot.eligible_players.is_empty() => {
                let players = &ballot.eligible_players;
                let index = ctx.collaborators.random.pick_index(players.len());
                let Some(player) = players.get(index) else {
                    break;
                };
                match ctx.service.submit_honor(player.id).await {
                    Ok(()) => {
                        tracing::info!(
                            player = index + 1,
                            champion = %player.champion_name,
                            name = %player.display_name,
                            id = player.id,
                            "Honor success"
                        );
                        return Ok(());
                    }
                    Err(e) => {
                        tracing::warn!(id = player.id, error = %e, "Honor submission failed");
                        break;
                    }
                }
            }
            Ok(_) => tracing::debug!(attempt, "Honor ballot has no eligible players"),
            Err(e) => tracing::debug!(attempt, error = %e, "Honor ballot unavailable"),
        }
        if attempt < attempts {
            ctx.pause_ms(ctx.timings().honor_retry_ms).await?;
        }
    }

    tracing::info!("Honor failure, skipping honor screen");
    if let Err(e) = ctx.service.submit_honor(HONOR_SKIP).await {
        tracing::warn!(error = %e, "Honor skip failed");
    }
    Ok(())
}

/// Alternate play-again and lobby re-creation until the end screen closes.
pub async fn leave_end_of_game(ctx: &mut PhaseContext<'_>) -> Result<(), FlowError> {
    let mut budget = ErrorBudget::new("end_of_game", ctx.config.budgets.end_of_game_attempts);
    let mut play_again_next = true;
    loop {
        let phase = ctx.observe_phase().await?;
        if phase != Phase::EndOfGame {
            return Ok(());
        }

        if play_again_next {
            tracing::info!("Requesting play again");
            if let Err(e) = ctx.service.post_play_again().await {
                tracing::warn!(error = %e, "Play again failed");
            }
        } else {
            lobby::create_lobby(ctx).await?;
        }
        play_again_next = !play_again_next;

        ctx.pause_ms(ctx.timings().end_of_game_pace_ms).await?;
        if budget.record(BudgetOutcome::NoProgress) == BudgetVerdict::Escalate {
            tracing::warn!(
                budget = budget.name(),
                attempts = budget.count(),
                "Could not exit play-again screen"
            );
            return Err(FlowError::StuckEndOfGame {
                attempts: budget.count(),
            });
        }
    }
}
