//! Driver configuration.
//!
//! Everything the driver used to read from module-level constants (queue,
//! pick priority, dialogue lines, target level, budgets, pacing) lives here
//! and is handed to the orchestrator and supervisor at construction.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Root configuration loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Queue the lobby is created for.
    pub queue_id: i64,

    /// Account level at which a session counts as complete.
    pub target_level: u32,

    /// Option ids tried first during selection, in order.
    pub preferred_options: Vec<i64>,

    /// Lines sent once per session after locking in.
    pub dialogue: Vec<String>,

    pub budgets: BudgetConfig,

    pub timings: TimingConfig,

    pub service: ServiceConfig,

    pub launch: LaunchConfig,

    /// Accounts to level, in order.
    pub accounts: Vec<AccountConfig>,

    /// JSONL file that records completed accounts.
    pub completion_log: PathBuf,

    /// Click targets for post-game screens with no REST equivalent.
    pub post_game_ui: Option<PostGameUiConfig>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            queue_id: 830,
            target_level: 30,
            preferred_options: Vec::new(),
            dialogue: vec!["mid".to_string(), "mid pls".to_string(), "i go mid".to_string()],
            budgets: BudgetConfig::default(),
            timings: TimingConfig::default(),
            service: ServiceConfig::default(),
            launch: LaunchConfig::default(),
            accounts: Vec::new(),
            completion_log: PathBuf::from("data/completed.jsonl"),
            post_game_ui: None,
        }
    }
}

impl DriverConfig {
    /// Load from a YAML file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Parsing {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: DriverConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Override selected fields from `GAMEFLOW_*` environment variables.
    pub fn apply_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var("GAMEFLOW_BASE_URL") {
            self.service.base_url = url;
        }
        if let Ok(token) = std::env::var("GAMEFLOW_AUTH_TOKEN") {
            self.service.auth_token = Some(token);
        }
        if let Ok(queue) = std::env::var("GAMEFLOW_QUEUE_ID") {
            self.queue_id = queue
                .parse()
                .with_context(|| format!("GAMEFLOW_QUEUE_ID is not an integer: {queue}"))?;
        }
        if let Ok(level) = std::env::var("GAMEFLOW_TARGET_LEVEL") {
            self.target_level = level
                .parse()
                .with_context(|| format!("GAMEFLOW_TARGET_LEVEL is not an integer: {level}"))?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_level == 0 {
            bail!("target_level must be at least 1");
        }
        self.budgets.validate()?;
        url::Url::parse(&self.service.base_url)
            .with_context(|| format!("service.base_url is not a URL: {}", self.service.base_url))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Budgets
// ---------------------------------------------------------------------------

/// Attempt ceilings for every bounded loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Reads of the phase endpoint before `PollExhausted`.
    pub poll_attempts: u32,
    /// Identical consecutive phase observations before `StuckPhase`.
    pub max_identical_polls: u32,
    pub stats_wait_polls: u32,
    pub end_of_game_attempts: u32,
    pub reconnect_attempts: u32,
    pub honor_ballot_attempts: u32,
    /// Consecutive failed sessions before the process gives up.
    pub max_session_failures: u32,
    /// Reads of the selection session before the handler exits.
    pub selection_refetch_attempts: u32,
    pub patch_wait_polls: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            poll_attempts: 15,
            max_identical_polls: 15,
            stats_wait_polls: 60,
            end_of_game_attempts: 15,
            reconnect_attempts: 3,
            honor_ballot_attempts: 3,
            max_session_failures: 10,
            selection_refetch_attempts: 1,
            patch_wait_polls: 600,
        }
    }
}

impl BudgetConfig {
    fn validate(&self) -> Result<()> {
        let fields = [
            ("poll_attempts", self.poll_attempts),
            ("max_identical_polls", self.max_identical_polls),
            ("stats_wait_polls", self.stats_wait_polls),
            ("end_of_game_attempts", self.end_of_game_attempts),
            ("reconnect_attempts", self.reconnect_attempts),
            ("honor_ballot_attempts", self.honor_ballot_attempts),
            ("max_session_failures", self.max_session_failures),
            ("selection_refetch_attempts", self.selection_refetch_attempts),
            ("patch_wait_polls", self.patch_wait_polls),
        ];
        for (name, value) in fields {
            if value == 0 {
                bail!("budgets.{name} must be at least 1");
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Timings
// ---------------------------------------------------------------------------

/// Pacing delays, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub poll_retry_ms: u64,
    /// Pause after every successful phase read.
    pub poll_settle_ms: u64,
    pub lobby_settle_ms: u64,
    pub lobby_recreate_ms: u64,
    pub search_probe_ms: u64,
    pub queue_pace_ms: u64,
    pub selection_pace_ms: u64,
    pub chat_delay_ms: u64,
    pub reconnect_pace_ms: u64,
    pub stats_pace_ms: u64,
    pub end_of_game_pace_ms: u64,
    pub post_game_settle_ms: u64,
    pub honor_retry_ms: u64,
    pub patch_pace_ms: u64,
    pub ui_step_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_retry_ms: 1000,
            poll_settle_ms: 1500,
            lobby_settle_ms: 1500,
            lobby_recreate_ms: 1000,
            search_probe_ms: 1500,
            queue_pace_ms: 1000,
            selection_pace_ms: 3000,
            chat_delay_ms: 1000,
            reconnect_pace_ms: 2000,
            stats_pace_ms: 2000,
            end_of_game_pace_ms: 1000,
            post_game_settle_ms: 3000,
            honor_retry_ms: 2000,
            patch_pace_ms: 3000,
            ui_step_ms: 1000,
        }
    }
}

impl TimingConfig {
    /// Every delay set to zero.
    pub fn immediate() -> Self {
        Self {
            poll_retry_ms: 0,
            poll_settle_ms: 0,
            lobby_settle_ms: 0,
            lobby_recreate_ms: 0,
            search_probe_ms: 0,
            queue_pace_ms: 0,
            selection_pace_ms: 0,
            chat_delay_ms: 0,
            reconnect_pace_ms: 0,
            stats_pace_ms: 0,
            end_of_game_pace_ms: 0,
            post_game_settle_ms: 0,
            honor_retry_ms: 0,
            patch_pace_ms: 0,
            ui_step_ms: 0,
        }
    }

    pub fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }
}

// ---------------------------------------------------------------------------
// Service / launch / accounts / UI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub request_timeout_secs: u64,
    pub accept_invalid_certs: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://127.0.0.1:2999".to_string(),
            auth_token: None,
            request_timeout_secs: 10,
            accept_invalid_certs: true,
        }
    }
}

/// Command used to start the client for one account.
///
/// `{username}` and `{password}` in `args` are replaced with the account's
/// credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Wait after spawning before the service is expected to answer.
    pub startup_wait_secs: u64,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            program: "client-launcher".to_string(),
            args: vec!["{username}".to_string(), "{password}".to_string()],
            startup_wait_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub username: String,
    pub password: String,
}

/// A click target as a fraction of the window's width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UiTarget {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostGameUiConfig {
    pub window_name: String,
    pub dismiss_popup: UiTarget,
    pub reward_select: UiTarget,
    pub reward_confirm: UiTarget,
    /// How many reward screens to click through.
    #[serde(default = "default_reward_screens")]
    pub reward_screens: u32,
    #[serde(default = "default_click_timeout")]
    pub click_timeout_secs: u64,
}

fn default_reward_screens() -> u32 {
    3
}

fn default_click_timeout() -> u64 {
    1
}
