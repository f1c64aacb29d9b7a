use std::sync::Arc;

use super::{DialogueSource, RandomSource};

/// Picks a line from the configured dialogue set.
pub struct ConfiguredDialogue {
    lines: Vec<String>,
    random: Arc<dyn RandomSource>,
}

impl ConfiguredDialogue {
    pub fn new(lines: Vec<String>, random: Arc<dyn RandomSource>) -> Self {
        let lines = lines
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect();
        Self { lines, random }
    }
}

impl DialogueSource for ConfiguredDialogue {
    fn random_line(&self) -> Option<String> {
        if self.lines.is_empty() {
            return None;
        }
        let index = self.random.pick_index(self.lines.len());
        self.lines.get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::SeededRandom;

    #[test]
    fn test_empty_set_yields_nothing() {
        let dialogue = ConfiguredDialogue::new(vec!["  ".into()], Arc::new(SeededRandom::new(1)));
        assert_eq!(dialogue.random_line(), None);
    }

    #[test]
    fn test_line_comes_from_set() {
        let lines = vec!["mid".to_string(), "mid pls".to_string()];
        let dialogue = ConfiguredDialogue::new(lines.clone(), Arc::new(SeededRandom::new(1)));
        for _ in 0..10 {
            let line = dialogue.random_line().unwrap();
            assert!(lines.contains(&line));
        }
    }
}
