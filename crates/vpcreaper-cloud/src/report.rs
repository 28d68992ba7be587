//! Teardown run reports

use crate::teardown::Step;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single reaper step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: Step,

    /// Resources found in the network
    pub discovered: usize,

    /// Ids the step tried to remove (or announced, under dry-run)
    pub targeted: Vec<String>,
}

impl StepReport {
    pub fn new(step: Step, discovered: usize, targeted: Vec<String>) -> Self {
        Self {
            step,
            discovered,
            targeted,
        }
    }

    pub fn empty(step: Step) -> Self {
        Self::new(step, 0, Vec::new())
    }
}

/// Result of a full teardown run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeardownReport {
    pub vpc_id: String,

    pub dry_run: bool,

    pub started_at: DateTime<Utc>,

    /// Completed steps, in execution order
    pub steps: Vec<StepReport>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl TeardownReport {
    pub fn new(vpc_id: impl Into<String>, dry_run: bool) -> Self {
        Self {
            vpc_id: vpc_id.into(),
            dry_run,
            started_at: Utc::now(),
            steps: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn push(&mut self, report: StepReport) {
        self.steps.push(report);
    }

    pub fn step(&self, step: Step) -> Option<&StepReport> {
        self.steps.iter().find(|r| r.step == step)
    }

    pub fn summary(&self) -> TeardownSummary {
        TeardownSummary {
            steps: self.steps.len(),
            discovered: self.steps.iter().map(|r| r.discovered).sum(),
            targeted: self.steps.iter().map(|r| r.targeted.len()).sum(),
        }
    }
}

/// Totals across all steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownSummary {
    pub steps: usize,
    pub discovered: usize,
    pub targeted: usize,
}

impl std::fmt::Display for TeardownSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} steps completed, {} resources found, {} targeted",
            self.steps, self.discovered, self.targeted
        )
    }
}
