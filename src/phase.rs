//! Gameflow phase reported by the client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Lifecycle phase of the remote session.
///
/// Wire values the driver has no handler for are kept verbatim in
/// `Unrecognized` so the orchestrator can fail loudly on them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Phase {
    None,
    Lobby,
    Matchmaking,
    ReadyCheck,
    ChampionSelect,
    InProgress,
    Reconnect,
    WaitingForStats,
    PreEndOfGame,
    EndOfGame,
    Unrecognized(String),
}

impl Phase {
    /// The string the service uses for this phase.
    pub fn as_wire(&self) -> &str {
        match self {
            Phase::None => "None",
            Phase::Lobby => "Lobby",
            Phase::Matchmaking => "Matchmaking",
            Phase::ReadyCheck => "ReadyCheck",
            Phase::ChampionSelect => "ChampSelect",
            Phase::InProgress => "InProgress",
            Phase::Reconnect => "Reconnect",
            Phase::WaitingForStats => "WaitingForStats",
            Phase::PreEndOfGame => "PreEndOfGame",
            Phase::EndOfGame => "EndOfGame",
            Phase::Unrecognized(raw) => raw,
        }
    }
}

impl FromStr for Phase {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "None" => Phase::None,
            "Lobby" => Phase::Lobby,
            "Matchmaking" => Phase::Matchmaking,
            "ReadyCheck" => Phase::ReadyCheck,
            "ChampSelect" => Phase::ChampionSelect,
            "InProgress" => Phase::InProgress,
            "Reconnect" => Phase::Reconnect,
            "WaitingForStats" => Phase::WaitingForStats,
            "PreEndOfGame" => Phase::PreEndOfGame,
            "EndOfGame" => Phase::EndOfGame,
            other => Phase::Unrecognized(other.to_string()),
        })
    }
}

impl From<&str> for Phase {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(phase) => phase,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Phase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Phase::from(raw.as_str()))
    }
}
