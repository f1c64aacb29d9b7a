//! Per-session state and the selection pick pool.

use crate::phase::Phase;

/// State owned by one `SessionOrchestrator` for the lifetime of one session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub current_phase: Option<Phase>,
    /// Phase seen on the previous successful read; `None` at session start.
    pub previous_phase: Option<Phase>,
    pub target_queue_id: i64,
    /// Set once the post-lock-in chat line has been attempted.
    pub chat_sent: bool,
}

impl SessionState {
    pub fn new(target_queue_id: i64) -> Self {
        Self {
            current_phase: None,
            previous_phase: None,
            target_queue_id,
            chat_sent: false,
        }
    }

    /// Record a successful phase read. Returns `true` when it differs from
    /// the previous read.
    pub fn observe(&mut self, phase: Phase) -> bool {
        let changed = self.current_phase.as_ref() != Some(&phase);
        self.previous_phase = self.current_phase.take();
        self.current_phase = Some(phase);
        changed
    }
}

/// Which list the last id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickSource {
    Preferred,
    Fallback,
}

/// Preferred option ids, then the service's fallback pool.
///
/// Each list has its own cursor. Once the preferred list is exhausted the
/// pool only ever draws from the fallback list.
#[derive(Debug, Clone)]
pub struct PickPool {
    preferred: Vec<i64>,
    fallback: Vec<i64>,
    preferred_cursor: usize,
    fallback_cursor: usize,
}

impl PickPool {
    pub fn new(preferred: Vec<i64>, fallback: Vec<i64>) -> Self {
        Self {
            preferred,
            fallback,
            preferred_cursor: 0,
            fallback_cursor: 0,
        }
    }

    pub fn next_option(&mut self) -> Option<(i64, PickSource)> {
        if let Some(id) = self.preferred.get(self.preferred_cursor) {
            self.preferred_cursor += 1;
            return Some((*id, PickSource::Preferred));
        }
        let id = self.fallback.get(self.fallback_cursor)?;
        self.fallback_cursor += 1;
        Some((*id, PickSource::Fallback))
    }

    pub fn remaining(&self) -> usize {
        (self.preferred.len() - self.preferred_cursor) + (self.fallback.len() - self.fallback_cursor)
    }
}
