//! gameflow-driver: phase-driven session driver for a game client's local
//! REST service.
//!
//! ## Layers
//! ```text
//! SupervisoryLoop      launch → run session → teardown, restart on failure
//!   SessionOrchestrator  target reached? → poll phase → dispatch handler
//!     PhasePoller          bounded read + stagnation budget
//!     handlers             one per phase, commands via GameFlowService
//! ```
//!
//! Everything external (the REST service, process launching, UI clicks,
//! completion records, dialogue, randomness) is reached through traits so
//! the whole loop runs against scripted fakes in tests.

// Core error handling
pub mod error;

// Pure data and policy
pub mod budget;
pub mod config;
pub mod phase;
pub mod session;

// Waiting and reading
pub mod pacing;
pub mod poller;

// Remote service boundary
pub mod service;

// External capabilities
pub mod collaborators;

// Control flow
pub mod handlers;
pub mod orchestrator;
pub mod supervisor;

pub use budget::{BudgetOutcome, BudgetVerdict, ErrorBudget};
pub use config::DriverConfig;
pub use error::{CollaboratorError, FlowError, ServiceError, SupervisorError};
pub use orchestrator::{SessionOrchestrator, SessionOutcome};
pub use pacing::Pacer;
pub use phase::Phase;
pub use poller::PhasePoller;
pub use service::{GameFlowService, HttpGameFlowService};
pub use session::{PickPool, SessionState};
pub use supervisor::{SupervisorDeps, SupervisorExit, SupervisoryLoop};
