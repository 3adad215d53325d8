//! Outcome of a best-effort step that is reported rather than raised.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The step wrote what it was asked to write.
    Completed,
    /// Nothing to do; the store already held the data.
    Unchanged,
    /// The step did not apply.
    Skipped,
    /// The step failed; the failure was logged.
    Failed { reason: String },
}

impl StepOutcome {
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        StepOutcome::Failed {
            reason: reason.to_string(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed { .. })
    }
}
