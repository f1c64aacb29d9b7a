//! Bounded, interruptible waits.
//!
//! Every sleep in the driver goes through [`Pacer::pause`], so a shutdown
//! request is noticed at the next wait instead of after a full session.

use std::time::Duration;

use tokio::sync::watch;

use crate::error::FlowError;

#[derive(Debug, Clone, Default)]
pub struct Pacer {
    shutdown: Option<watch::Receiver<bool>>,
}

impl Pacer {
    /// Pacer that aborts waits once `shutdown` flips to `true`.
    pub fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self {
            shutdown: Some(shutdown),
        }
    }

    /// Pacer with no shutdown signal.
    pub fn detached() -> Self {
        Self { shutdown: None }
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Sleep for `duration`, or return `FlowError::Cancelled` as soon as
    /// shutdown is requested.
    pub async fn pause(&self, duration: Duration) -> Result<(), FlowError> {
        if self.is_shutdown() {
            return Err(FlowError::Cancelled);
        }

        let Some(shutdown) = &self.shutdown else {
            tokio::time::sleep(duration).await;
            return Ok(());
        };

        let mut rx = shutdown.clone();
        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = sleep.as_mut() => return Ok(()),
                changed = rx.changed() => match changed {
                    Ok(()) => {
                        if *rx.borrow() {
                            return Err(FlowError::Cancelled);
                        }
                    }
                    // Sender gone: nobody can request shutdown any more.
                    Err(_) => {
                        sleep.as_mut().await;
                        return Ok(());
                    }
                },
            }
        }
    }

    /// Fail fast between steps when shutdown was requested.
    pub fn checkpoint(&self) -> Result<(), FlowError> {
        if self.is_shutdown() {
            Err(FlowError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Render seconds as `M:SS` for log lines.
pub fn format_min_sec(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_detached_pause_sleeps_full_duration() {
        let pacer = Pacer::detached();
        let start = Instant::now();
        pacer.pause(Duration::from_secs(42)).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_long_wait() {
        let (tx, rx) = watch::channel(false);
        let pacer = Pacer::new(rx);
        let start = Instant::now();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            let _ = tx.send(true);
        });

        let result = pacer.pause(Duration::from_secs(600)).await;
        assert_eq!(result, Err(FlowError::Cancelled));
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_sender_does_not_cut_wait_short() {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        let pacer = Pacer::new(rx);
        let start = Instant::now();
        pacer.pause(Duration::from_secs(3)).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_already_shut_down_fails_immediately() {
        let (_tx, rx) = watch::channel(true);
        let pacer = Pacer::new(rx);
        assert_eq!(pacer.checkpoint(), Err(FlowError::Cancelled));
        assert_eq!(
            pacer.pause(Duration::from_secs(1)).await,
            Err(FlowError::Cancelled)
        );
    }

    #[test]
    fn test_format_min_sec() {
        assert_eq!(format_min_sec(0), "0:00");
        assert_eq!(format_min_sec(65), "1:05");
        assert_eq!(format_min_sec(1800), "30:00");
    }
}
