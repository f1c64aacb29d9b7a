use std::time::Duration;

use async_trait::async_trait;

use super::GameSession;
use crate::error::FlowError;
use crate::pacing::Pacer;
use crate::phase::Phase;
use crate::service::GameFlowService;

/// Waits out the match by watching the phase.
///
/// Read failures are expected while the client is busy loading the game, so
/// only a long unbroken run of them ends the wait with an error.
pub struct PhaseWatchGameSession {
    interval: Duration,
    max_failed_reads: u32,
}

impl PhaseWatchGameSession {
    pub fn new(interval: Duration, max_failed_reads: u32) -> Self {
        Self {
            interval,
            max_failed_reads: max_failed_reads.max(1),
        }
    }
}

impl Default for PhaseWatchGameSession {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), 30)
    }
}

#[async_trait]
impl GameSession for PhaseWatchGameSession {
    async fn play(&self, service: &dyn GameFlowService, pacer: &Pacer) -> Result<(), FlowError> {
        tracing::info!("Game in progress, waiting for it to finish");
        let mut failed_reads = 0u32;
        loop {
            pacer.pause(self.interval).await?;
            match service.get_phase().await {
                Ok(Phase::InProgress) => failed_reads = 0,
                Ok(phase) => {
                    tracing::info!(phase = %phase, "Game finished");
                    return Ok(());
                }
                Err(e) => {
                    failed_reads += 1;
                    tracing::debug!(error = %e, failed_reads, "Phase read failed during game");
                    if failed_reads >= self.max_failed_reads {
                        return Err(FlowError::GameSession {
                            reason: format!("phase unreadable {failed_reads} times in a row: {e}"),
                        });
                    }
                }
            }
        }
    }
}
