//! SupervisoryLoop: the outermost loop.
//!
//! Launches one session per account, runs it to completion, tears it down,
//! and restarts on phase-fatal errors. Consecutive failed sessions count
//! against a budget whose exhaustion is the single process-fatal path.

use std::sync::Arc;
use std::time::Duration;

use crate::budget::{BudgetOutcome, BudgetVerdict, ErrorBudget};
use crate::collaborators::{
    AccountSource, CompletionStore, Credentials, Launcher, SessionCollaborators, SessionHandle,
};
use crate::config::{DriverConfig, TimingConfig};
use crate::error::{FlowError, SupervisorError};
use crate::orchestrator::{SessionOrchestrator, SessionOutcome};
use crate::pacing::Pacer;
use crate::service::GameFlowService;

/// How the supervisor stopped without a process-fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorExit {
    /// Every account from the source has been completed.
    AccountsExhausted { completed: u32 },
    /// Shutdown was requested.
    Stopped { completed: u32 },
}

/// External capabilities the supervisor drives directly.
#[derive(Clone)]
pub struct SupervisorDeps {
    pub launcher: Arc<dyn Launcher>,
    pub completions: Arc<dyn CompletionStore>,
    pub accounts: Arc<dyn AccountSource>,
}

pub struct SupervisoryLoop {
    service: Arc<dyn GameFlowService>,
    config: Arc<DriverConfig>,
    collaborators: SessionCollaborators,
    deps: SupervisorDeps,
    pacer: Pacer,
    session_failures: ErrorBudget,
}

impl SupervisoryLoop {
    pub fn new(
        service: Arc<dyn GameFlowService>,
        config: Arc<DriverConfig>,
        collaborators: SessionCollaborators,
        deps: SupervisorDeps,
        pacer: Pacer,
    ) -> Self {
        let session_failures =
            ErrorBudget::new("session_failures", config.budgets.max_session_failures);
        Self {
            service,
            config,
            collaborators,
            deps,
            pacer,
            session_failures,
        }
    }

    /// Consecutive failed sessions so far.
    pub fn session_failures(&self) -> u32 {
        self.session_failures.count()
    }

    pub async fn run_forever(&mut self) -> Result<SupervisorExit, SupervisorError> {
        let mut retry: Option<Credentials> = None;
        let mut completed = 0u32;

        loop {
            if self.pacer.is_shutdown() {
                return Ok(SupervisorExit::Stopped { completed });
            }

            let credentials = match retry.take() {
                Some(credentials) => credentials,
                None => match self.deps.accounts.next_account().await {
                    Some(credentials) => credentials,
                    None => {
                        tracing::info!(completed, "No accounts left");
                        return Ok(SupervisorExit::AccountsExhausted { completed });
                    }
                },
            };

            match self.run_session(&credentials).await {
                Ok(outcome) => {
                    tracing::info!(
                        account_id = credentials.account_id(),
                        level = outcome.final_level,
                        dispatches = outcome.dispatches,
                        "Session complete"
                    );
                    if let Err(e) = self.deps.completions.mark_done(credentials.account_id()).await
                    {
                        tracing::error!(
                            account_id = credentials.account_id(),
                            error = %e,
                            "Failed to record completion"
                        );
                    }
                    self.session_failures.record(BudgetOutcome::Progress);
                    completed += 1;
                }
                Err(FlowError::Cancelled) => {
                    tracing::info!("Shutdown requested, stopping");
                    return Ok(SupervisorExit::Stopped { completed });
                }
                Err(e) => {
                    let verdict = self.session_failures.record(BudgetOutcome::NoProgress);
                    let failures = self.session_failures.count();
                    tracing::error!(
                        account_id = credentials.account_id(),
                        kind = e.kind(),
                        error = %e,
                        budget = self.session_failures.name(),
                        failures,
                        max = self.session_failures.max(),
                        "Session failed"
                    );
                    if verdict == BudgetVerdict::Escalate {
                        tracing::error!(failures, "Max errors reached, exiting");
                        return Err(SupervisorError::SessionBudgetExhausted { failures, last: e });
                    }
                    retry = Some(credentials);
                }
            }
        }
    }

    /// Launch, drive, and always tear down.
    async fn run_session(&self, credentials: &Credentials) -> Result<SessionOutcome, FlowError> {
        let handle = self
            .deps
            .launcher
            .launch(credentials)
            .await
            .map_err(|e| FlowError::Launch {
                reason: e.to_string(),
            })?;

        let result = self.drive(&handle).await;
        self.teardown(handle).await;
        result
    }

    async fn drive(&self, handle: &SessionHandle) -> Result<SessionOutcome, FlowError> {
        tracing::info!(session = handle.id, account_id = %handle.account_id, "Session started");
        let startup = Duration::from_secs(self.config.launch.startup_wait_secs);
        tracing::debug!(secs = startup.as_secs(), "Waiting for client startup");
        self.pacer.pause(startup).await?;
        self.wait_for_patch().await?;

        let mut orchestrator = SessionOrchestrator::new(
            Arc::clone(&self.service),
            Arc::clone(&self.config),
            self.collaborators.clone(),
            self.pacer.clone(),
        );
        orchestrator.run().await
    }

    async fn teardown(&self, handle: SessionHandle) {
        let id = handle.id;
        if let Err(e) = self.deps.launcher.terminate(handle).await {
            tracing::warn!(session = id, error = %e, "Teardown failed");
        }
    }

    /// Hold the session until the client reports it is up to date. An
    /// unreadable patch state skips the gate.
    async fn wait_for_patch(&self) -> Result<(), FlowError> {
        let mut budget = ErrorBudget::new("patch_wait", self.config.budgets.patch_wait_polls);
        let pace = TimingConfig::ms(self.config.timings.patch_pace_ms);
        let mut announced = false;

        loop {
            let state = match self.service.get_patcher_state().await {
                Ok(state) => state,
                Err(e) => {
                    tracing::debug!(error = %e, "Patch state unavailable, skipping patch check");
                    return Ok(());
                }
            };
            if state.is_up_to_date {
                if announced {
                    tracing::info!("Client is up to date");
                }
                return Ok(());
            }
            if !announced {
                tracing::info!("Client is patching");
                announced = true;
            }
            tracing::debug!(percent = state.percent_patched, "Patch progress");

            if budget.record(BudgetOutcome::NoProgress) == BudgetVerdict::Escalate {
                return Err(FlowError::PatchTimeout {
                    polls: budget.count(),
                });
            }
            self.pacer.pause(pace).await?;
        }
    }
}
