//! SessionOrchestrator: poll, dispatch, repeat.
//!
//! No retries happen at this level: handlers and the poller own their own
//! budgets, and any `FlowError` they raise is returned as-is.

use std::sync::Arc;

use crate::collaborators::SessionCollaborators;
use crate::config::DriverConfig;
use crate::error::FlowError;
use crate::handlers::{self, PhaseContext};
use crate::pacing::Pacer;
use crate::phase::Phase;
use crate::poller::PhasePoller;
use crate::service::GameFlowService;
use crate::session::SessionState;

/// How a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub final_level: u32,
    pub dispatches: u64,
}

pub struct SessionOrchestrator {
    service: Arc<dyn GameFlowService>,
    config: Arc<DriverConfig>,
    collaborators: SessionCollaborators,
    pacer: Pacer,
    poller: PhasePoller,
    state: SessionState,
}

impl SessionOrchestrator {
    /// Fresh per-session state: empty previous phase, zeroed stagnation.
    pub fn new(
        service: Arc<dyn GameFlowService>,
        config: Arc<DriverConfig>,
        collaborators: SessionCollaborators,
        pacer: Pacer,
    ) -> Self {
        let poller = PhasePoller::new(&config.budgets, &config.timings);
        let state = SessionState::new(config.queue_id);
        Self {
            service,
            config,
            collaborators,
            pacer,
            poller,
            state,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub async fn run(&mut self) -> Result<SessionOutcome, FlowError> {
        let mut dispatches = 0u64;
        loop {
            self.pacer.checkpoint()?;
            if let Some(level) = self.target_reached().await {
                tracing::info!(level, "Account reached target level");
                return Ok(SessionOutcome {
                    final_level: level,
                    dispatches,
                });
            }

            let phase = self
                .poller
                .poll(self.service.as_ref(), &mut self.state, &self.pacer)
                .await?;
            self.dispatch(&phase).await?;
            dispatches += 1;
        }
    }

    async fn dispatch(&mut self, phase: &Phase) -> Result<(), FlowError> {
        let mut ctx = PhaseContext {
            service: self.service.as_ref(),
            config: self.config.as_ref(),
            pacer: &self.pacer,
            collaborators: &self.collaborators,
            poller: &mut self.poller,
            state: &mut self.state,
        };
        handlers::dispatch(phase, &mut ctx).await
    }

    /// `Some(level)` once the target is reached. A failed read is "not yet".
    async fn target_reached(&self) -> Option<u32> {
        match self.service.get_account_progress().await {
            Ok(progress) if progress.level >= self.config.target_level => Some(progress.level),
            Ok(progress) => {
                tracing::info!(
                    level = progress.level,
                    target = self.config.target_level,
                    "Account level"
                );
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "Account progress unavailable");
                None
            }
        }
    }
}
