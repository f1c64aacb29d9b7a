//! Typed failure model for the driver.
//!
//! Three tiers, matching the three places that are allowed to branch on a
//! failure:
//!
//! ```text
//! ServiceError    → transient, swallowed by the handler that issued the call
//! FlowError       → phase-fatal, aborts one session, caught by the supervisor
//! SupervisorError → process-fatal, ends the process with a non-zero status
//! ```
//!
//! ## Rules
//!
//! - `thiserror` for every enum, no manual `Display` impls.
//! - Nothing below `SessionOrchestrator` catches a `FlowError`.

use crate::phase::Phase;

// ---------------------------------------------------------------------------
// ServiceError: a single failed remote call
// ---------------------------------------------------------------------------

/// Failure of one call against the game-client service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{path} returned HTTP {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("could not decode response from {path}: {reason}")]
    Decode { path: String, reason: String },
}

impl ServiceError {
    pub fn status(path: &str, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            path: path.to_string(),
            status,
            body: body.into(),
        }
    }

    pub fn decode(path: &str, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// FlowError: phase-fatal, recovered by restarting the session
// ---------------------------------------------------------------------------

/// A failure that ends the current session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// The phase endpoint never returned a usable value.
    #[error("phase unavailable after {attempts} attempts")]
    PollExhausted { attempts: u32 },

    /// The same phase was observed too many times in a row.
    #[error("phase {phase} did not change after {observations} identical observations")]
    StuckPhase { phase: Phase, observations: u32 },

    /// Post-game statistics never arrived.
    #[error("still waiting for stats after {polls} polls")]
    StatsTimeout { polls: u32 },

    /// Neither play-again nor lobby re-creation left the end screen.
    #[error("could not leave the end-of-game screen after {attempts} attempts")]
    StuckEndOfGame { attempts: u32 },

    /// The service reported a phase this driver has no handler for.
    #[error("unknown phase: {raw}")]
    UnknownPhase { raw: String },

    /// The in-game collaborator failed.
    #[error("game session failed: {reason}")]
    GameSession { reason: String },

    /// The launcher could not produce a session.
    #[error("launch failed: {reason}")]
    Launch { reason: String },

    /// The client kept patching past the configured ceiling.
    #[error("client still patching after {polls} polls")]
    PatchTimeout { polls: u32 },

    /// Shutdown was requested while the driver was waiting.
    #[error("shutdown requested")]
    Cancelled,
}

impl FlowError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Short stable name for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PollExhausted { .. } => "poll_exhausted",
            Self::StuckPhase { .. } => "stuck_phase",
            Self::StatsTimeout { .. } => "stats_timeout",
            Self::StuckEndOfGame { .. } => "stuck_end_of_game",
            Self::UnknownPhase { .. } => "unknown_phase",
            Self::GameSession { .. } => "game_session",
            Self::Launch { .. } => "launch",
            Self::PatchTimeout { .. } => "patch_timeout",
            Self::Cancelled => "cancelled",
        }
    }
}

// ---------------------------------------------------------------------------
// SupervisorError: process-fatal
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("{failures} consecutive session failures, last: {last}")]
    SessionBudgetExhausted { failures: u32, last: FlowError },
}

// ---------------------------------------------------------------------------
// CollaboratorError: out-of-scope capabilities
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("window not found: {window}")]
    WindowNotFound { window: String },

    #[error("process error: {reason}")]
    Process { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
