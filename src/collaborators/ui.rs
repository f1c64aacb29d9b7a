use std::time::Duration;

use async_trait::async_trait;

use super::UiAutomation;
use crate::config::UiTarget;
use crate::error::CollaboratorError;

/// Stand-in used when no click automation is available. Every click fails as
/// if the window were missing, which post-game cleanup tolerates.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableUi;

#[async_trait]
impl UiAutomation for UnavailableUi {
    async fn click(
        &self,
        _target: UiTarget,
        window_name: &str,
        _timeout: Duration,
    ) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::WindowNotFound {
            window: window_name.to_string(),
        })
    }
}
