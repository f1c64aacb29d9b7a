//! Consecutive-failure budgets.
//!
//! A budget counts consecutive "no progress" outcomes and resets on the first
//! "progress" outcome. Reaching the maximum is the only escalation trigger;
//! the caller turns `Escalate` into the typed error for its own scope.

/// What the caller observed since the last record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetOutcome {
    /// Something changed or succeeded. Resets the counter.
    Progress,
    /// Nothing changed, or the attempt failed.
    NoProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetVerdict {
    Continue,
    Escalate,
}

/// A named counter with a fixed ceiling.
#[derive(Debug, Clone)]
pub struct ErrorBudget {
    name: &'static str,
    max: u32,
    count: u32,
}

impl ErrorBudget {
    /// `max` is clamped to at least 1.
    pub fn new(name: &'static str, max: u32) -> Self {
        Self {
            name,
            max: max.max(1),
            count: 0,
        }
    }

    pub fn record(&mut self, outcome: BudgetOutcome) -> BudgetVerdict {
        match outcome {
            BudgetOutcome::Progress => {
                self.count = 0;
                BudgetVerdict::Continue
            }
            BudgetOutcome::NoProgress => {
                self.count = self.count.saturating_add(1);
                if self.count >= self.max {
                    BudgetVerdict::Escalate
                } else {
                    BudgetVerdict::Continue
                }
            }
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_exhausted(&self) -> bool {
        self.count >= self.max
    }
}
