//! Capabilities the driver calls but does not own.
//!
//! Launching the client, clicking through screens with no REST equivalent,
//! recording completed accounts, picking dialogue lines and playing the game
//! itself are all external concerns. The core only sees these traits; the
//! submodules hold the implementations the binary wires in.

pub mod accounts;
pub mod completion;
pub mod dialogue;
pub mod game;
pub mod launcher;
pub mod random;
pub mod ui;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::UiTarget;
use crate::error::{CollaboratorError, FlowError};
use crate::pacing::Pacer;
use crate::service::GameFlowService;

pub use accounts::ConfiguredAccounts;
pub use completion::JsonlCompletionStore;
pub use dialogue::ConfiguredDialogue;
pub use game::PhaseWatchGameSession;
pub use launcher::CommandLauncher;
pub use random::{SeededRandom, ThreadRandom};
pub use ui::UnavailableUi;

/// Login for one account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A launched client session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub id: u64,
    pub account_id: String,
}

#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, credentials: &Credentials) -> Result<SessionHandle, CollaboratorError>;

    async fn terminate(&self, handle: SessionHandle) -> Result<(), CollaboratorError>;
}

#[async_trait]
pub trait UiAutomation: Send + Sync {
    /// Click at a window-relative position. Fails when the window is absent.
    async fn click(
        &self,
        target: UiTarget,
        window_name: &str,
        timeout: Duration,
    ) -> Result<(), CollaboratorError>;
}

#[async_trait]
pub trait CompletionStore: Send + Sync {
    async fn mark_done(&self, account_id: &str) -> Result<(), CollaboratorError>;
}

#[async_trait]
pub trait AccountSource: Send + Sync {
    /// Next account that still needs a session, if any.
    async fn next_account(&self) -> Option<Credentials>;
}

/// Hands control to whatever plays the match, returning when it is over.
#[async_trait]
pub trait GameSession: Send + Sync {
    async fn play(&self, service: &dyn GameFlowService, pacer: &Pacer) -> Result<(), FlowError>;
}

pub trait DialogueSource: Send + Sync {
    /// A line to send, or `None` when there is nothing to say.
    fn random_line(&self) -> Option<String>;
}

/// Uniform index source, injectable so tests can fix the sequence.
pub trait RandomSource: Send + Sync {
    /// Uniform in `[0, len)`. `len` is never zero.
    fn pick_index(&self, len: usize) -> usize;
}

/// The collaborators a single session needs.
#[derive(Clone)]
pub struct SessionCollaborators {
    pub game: Arc<dyn GameSession>,
    pub ui: Arc<dyn UiAutomation>,
    pub dialogue: Arc<dyn DialogueSource>,
    pub random: Arc<dyn RandomSource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("smurf01", "hunter2");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("smurf01"));
        assert!(!rendered.contains("hunter2"));
        assert_eq!(creds.account_id(), "smurf01");
    }
}
