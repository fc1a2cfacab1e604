use std::fmt;
use std::time::Duration;

use crate::error::AppError;

/// Knobs shared by the outreach workflows.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Run the search/filter pass but perform no writes.
    pub dry_run: bool,
    /// Pause between two consecutive write attempts.
    pub write_delay: Duration,
}

/// Result of one outreach action against one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Repository full name or post id.
    pub target: String,
    pub status: ActionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStatus {
    /// The write went through; `detail` is a link or id when one is known.
    Succeeded { detail: String },
    /// The write was attempted and refused or lost.
    Failed {
        status_code: Option<u16>,
        message: String,
    },
    /// No write was attempted.
    Skipped { reason: String },
}

impl ActionOutcome {
    pub fn succeeded(target: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            status: ActionStatus::Succeeded {
                detail: detail.into(),
            },
        }
    }

    pub fn failed(target: impl Into<String>, error: &AppError) -> Self {
        let message = match error {
            AppError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self {
            target: target.into(),
            status: ActionStatus::Failed {
                status_code: error.status_code(),
                message,
            },
        }
    }

    pub fn skipped(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            status: ActionStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, ActionStatus::Succeeded { .. })
    }

    /// Whether a write was sent for this target.
    pub fn was_attempted(&self) -> bool {
        !matches!(self.status, ActionStatus::Skipped { .. })
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            ActionStatus::Succeeded { detail } => write!(f, "{}: ok {detail}", self.target),
            ActionStatus::Failed {
                status_code: Some(code),
                message,
            } => write!(f, "{}: failed {code} - {message}", self.target),
            ActionStatus::Failed {
                status_code: None,
                message,
            } => write!(f, "{}: failed - {message}", self.target),
            ActionStatus::Skipped { reason } => write!(f, "{}: skipped ({reason})", self.target),
        }
    }
}

/// Counts of outcomes for the end-of-run log line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Tally {
    pub fn of(outcomes: &[ActionOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut tally, outcome| {
            if outcome.is_success() {
                tally.succeeded += 1;
            } else if outcome.was_attempted() {
                tally.failed += 1;
            } else {
                tally.skipped += 1;
            }
            tally
        })
    }
}
