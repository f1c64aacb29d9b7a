//! Response shapes consumed from the game-client service.
//!
//! Only the fields the driver reads are modelled; everything else in the
//! payloads is ignored by serde.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Lobby / matchmaking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub queue_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lobby {
    pub game_config: GameConfig,
}

impl Lobby {
    pub fn queue_id(&self) -> i64 {
        self.game_config.queue_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchError {
    #[serde(default)]
    pub penalty_time_remaining: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchmakingSearch {
    #[serde(default)]
    pub errors: Vec<SearchError>,
}

impl MatchmakingSearch {
    /// Dodge penalty reported by the first search error, truncated to whole
    /// seconds. `None` when there is no error or no time left.
    pub fn penalty(&self) -> Option<Duration> {
        let remaining = self.errors.first()?.penalty_time_remaining;
        if remaining.is_finite() && remaining >= 1.0 {
            Some(Duration::from_secs(remaining as u64))
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Selection phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionTimer {
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub adjusted_time_left_in_phase: f64,
}

impl SelectionTimer {
    pub fn seconds_left(&self) -> i64 {
        (self.adjusted_time_left_in_phase / 1000.0) as i64
    }
}

/// One pending choice in the selection phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionAction {
    #[serde(rename = "id")]
    pub action_id: i64,
    #[serde(rename = "actorCellId")]
    pub actor_id: i64,
    #[serde(rename = "championId", default)]
    pub target_option_id: Option<i64>,
    #[serde(default)]
    pub completed: bool,
}

impl SelectionAction {
    /// The option currently hovered, if any. Zero means nothing chosen.
    pub fn chosen_option(&self) -> Option<i64> {
        self.target_option_id.filter(|id| *id != 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSession {
    #[serde(default)]
    pub timer: SelectionTimer,
    /// Action groups; each group holds the concurrent actions of one turn.
    #[serde(default)]
    pub actions: Vec<Vec<SelectionAction>>,
    #[serde(rename = "localPlayerCellId")]
    pub local_actor_id: i64,
}

impl SelectionSession {
    /// The local actor's action in the first action group.
    pub fn local_action(&self) -> Option<&SelectionAction> {
        self.actions
            .first()?
            .iter()
            .find(|action| action.actor_id == self.local_actor_id)
    }
}

// ---------------------------------------------------------------------------
// Session recovery / progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectAck {
    Accepted,
    Rejected { status: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProgress {
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatcherState {
    pub is_up_to_date: bool,
    #[serde(default)]
    pub percent_patched: f64,
}

// ---------------------------------------------------------------------------
// Post-game
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HonorCandidate {
    #[serde(rename = "summonerId")]
    pub id: i64,
    #[serde(rename = "summonerName", default)]
    pub display_name: String,
    #[serde(rename = "championName", default)]
    pub champion_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HonorBallot {
    #[serde(default)]
    pub eligible_players: Vec<HonorCandidate>,
}

/// Target id that clears the honor screen without honoring anyone.
pub const HONOR_SKIP: i64 = 0;

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub game_tag: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl Conversation {
    /// Direct messages carry the other player's name and tag.
    pub fn is_direct_message(&self) -> bool {
        !self.game_name.is_empty() && !self.game_tag.is_empty()
    }
}
