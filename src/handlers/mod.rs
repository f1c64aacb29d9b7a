//! One handler per phase.
//!
//! A handler makes one unit of progress (issues a command, or decides none is
//! needed right now) and returns so the orchestrator can poll again. Failed
//! remote calls are logged and swallowed here; only the typed `FlowError`s
//! escape.

pub mod in_game;
pub mod lobby;
pub mod matchmaking;
pub mod post_game;
pub mod selection;

use std::time::Duration;

use crate::collaborators::SessionCollaborators;
use crate::config::{DriverConfig, TimingConfig};
use crate::error::FlowError;
use crate::pacing::Pacer;
use crate::phase::Phase;
use crate::poller::PhasePoller;
use crate::service::GameFlowService;
use crate::session::SessionState;

/// Everything a handler may touch during one dispatch.
pub struct PhaseContext<'a> {
    pub service: &'a dyn GameFlowService,
    pub config: &'a DriverConfig,
    pub pacer: &'a Pacer,
    pub collaborators: &'a SessionCollaborators,
    pub poller: &'a mut PhasePoller,
    pub state: &'a mut SessionState,
}

impl PhaseContext<'_> {
    pub async fn pause_ms(&self, ms: u64) -> Result<(), FlowError> {
        self.pacer.pause(TimingConfig::ms(ms)).await
    }

    pub async fn pause(&self, duration: Duration) -> Result<(), FlowError> {
        self.pacer.pause(duration).await
    }

    /// Re-read the phase without counting repeats against stagnation.
    pub async fn observe_phase(&mut self) -> Result<Phase, FlowError> {
        self.poller
            .observe(self.service, self.state, self.pacer)
            .await
    }

    pub fn timings(&self) -> &TimingConfig {
        &self.config.timings
    }
}

/// Route a phase to its handler.
pub async fn dispatch(phase: &Phase, ctx: &mut PhaseContext<'_>) -> Result<(), FlowError> {
    match phase {
        Phase::None => lobby::create_lobby(ctx).await,
        Phase::Lobby => lobby::start_matchmaking(ctx).await,
        Phase::Matchmaking => matchmaking::wait_in_queue(ctx).await,
        Phase::ReadyCheck => matchmaking::accept_ready_check(ctx).await,
        Phase::ChampionSelect => selection::automate_selection(ctx).await,
        Phase::InProgress => in_game::play_game(ctx).await,
        Phase::Reconnect => in_game::reconnect(ctx).await,
        Phase::WaitingForStats => in_game::wait_for_stats(ctx).await,
        Phase::PreEndOfGame => post_game::clean_up_post_game(ctx).await,
        Phase::EndOfGame => post_game::leave_end_of_game(ctx).await,
        Phase::Unrecognized(raw) => {
            tracing::warn!(phase = %raw, "Unknown phase");
            Err(FlowError::UnknownPhase { raw: raw.clone() })
        }
    }
}
