//! Phase polling with stagnation detection.
//!
//! Two read paths share one retry loop:
//!
//! - [`PhasePoller::poll`] is the orchestrator's read. A read equal to the
//!   previous one counts against the stagnation budget; any change resets it.
//! - [`PhasePoller::observe`] is for handlers that wait inside a phase that is
//!   expected to persist (queueing, stats, end screen). It keeps the
//!   previous/current bookkeeping and resets the budget on change, but never
//!   counts repeats.
//!
//! Both pause for the settle delay after every successful read.

use std::time::Duration;

use crate::budget::{BudgetOutcome, BudgetVerdict, ErrorBudget};
use crate::config::{BudgetConfig, TimingConfig};
use crate::error::FlowError;
use crate::pacing::Pacer;
use crate::phase::Phase;
use crate::service::GameFlowService;
use crate::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadMode {
    Tracked,
    Untracked,
}

#[derive(Debug, Clone)]
pub struct PhasePoller {
    stagnation: ErrorBudget,
    attempts: u32,
    retry_delay: Duration,
    settle_delay: Duration,
}

impl PhasePoller {
    pub fn new(budgets: &BudgetConfig, timings: &TimingConfig) -> Self {
        Self {
            stagnation: ErrorBudget::new("phase_stagnation", budgets.max_identical_polls),
            attempts: budgets.poll_attempts.max(1),
            retry_delay: TimingConfig::ms(timings.poll_retry_ms),
            settle_delay: TimingConfig::ms(timings.poll_settle_ms),
        }
    }

    /// Identical observations since the last phase change.
    pub fn stagnation_count(&self) -> u32 {
        self.stagnation.count()
    }

    pub async fn poll(
        &mut self,
        service: &dyn GameFlowService,
        state: &mut SessionState,
        pacer: &Pacer,
    ) -> Result<Phase, FlowError> {
        self.read(service, state, pacer, ReadMode::Tracked).await
    }

    pub async fn observe(
        &mut self,
        service: &dyn GameFlowService,
        state: &mut SessionState,
        pacer: &Pacer,
    ) -> Result<Phase, FlowError> {
        self.read(service, state, pacer, ReadMode::Untracked).await
    }

    async fn read(
        &mut self,
        service: &dyn GameFlowService,
        state: &mut SessionState,
        pacer: &Pacer,
        mode: ReadMode,
    ) -> Result<Phase, FlowError> {
        let phase = self.fetch(service, pacer).await?;

        let changed = state.observe(phase.clone());
        tracing::debug!(
            phase = %phase,
            previous = state.previous_phase.as_ref().map(Phase::as_wire).unwrap_or(""),
            "Phase read"
        );

        if changed {
            self.stagnation.record(BudgetOutcome::Progress);
        } else if mode == ReadMode::Tracked {
            match self.stagnation.record(BudgetOutcome::NoProgress) {
                BudgetVerdict::Escalate => {
                    tracing::error!(
                        budget = self.stagnation.name(),
                        phase = %phase,
                        observations = self.stagnation.count(),
                        "Phase will not change"
                    );
                    return Err(FlowError::StuckPhase {
                        phase,
                        observations: self.stagnation.count(),
                    });
                }
                BudgetVerdict::Continue => {
                    tracing::warn!(
                        budget = self.stagnation.name(),
                        phase = %phase,
                        observations = self.stagnation.count(),
                        "Phase same as previous"
                    );
                }
            }
        }

        pacer.pause(self.settle_delay).await?;
        Ok(phase)
    }

    /// Bounded retry over the phase endpoint.
    async fn fetch(&self, service: &dyn GameFlowService, pacer: &Pacer) -> Result<Phase, FlowError> {
        for attempt in 1..=self.attempts {
            match service.get_phase().await {
                Ok(phase) => return Ok(phase),
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "Phase read failed");
                }
            }
            pacer.pause(self.retry_delay).await?;
        }
        tracing::warn!(attempts = self.attempts, "Could not get phase");
        Err(FlowError::PollExhausted {
            attempts: self.attempts,
        })
    }
}
