//! Structured verification record.
//!
//! Every assertion the scenario makes becomes a [`Check`] carrying both the
//! structured fields and the exact transcript line printed for it, built at
//! the same construction site so the two cannot drift apart.

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckOutcome {
    Pass,
    Fail,
}

/// One recorded verification check.
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    /// Stable identifier for the check.
    pub name: &'static str,
    /// What the scenario required.
    pub expected: &'static str,
    /// What the page actually showed.
    pub actual: String,
    pub outcome: CheckOutcome,
    /// The transcript line printed for this check.
    pub line: String,
}

impl Check {
    pub fn pass(name: &'static str, expected: &'static str, actual: String, line: String) -> Self {
        Self {
            name,
            expected,
            actual,
            outcome: CheckOutcome::Pass,
            line,
        }
    }

    pub fn fail(name: &'static str, expected: &'static str, actual: String, line: String) -> Self {
        Self {
            name,
            expected,
            actual,
            outcome: CheckOutcome::Fail,
            line,
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == CheckOutcome::Pass
    }
}

/// Ordered record of one verification run: checks in the order they were
/// made, plus the artifacts written along the way.
#[derive(Debug, Default, Serialize)]
pub struct VerifyReport {
    pub checks: Vec<Check>,
    pub artifacts: Vec<PathBuf>,
}

impl VerifyReport {
    /// Records a check and hands it back for printing.
    pub fn record(&mut self, check: Check) -> &Check {
        self.checks.push(check);
        // Push cannot leave the vec empty.
        &self.checks[self.checks.len() - 1]
    }

    pub fn record_artifact(&mut self, path: PathBuf) {
        self.artifacts.push(path);
    }

    /// Whether every recorded check passed. An empty report counts as
    /// passing; the scenario always records at least one check per screen.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(Check::passed)
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|check| !check.passed()).count()
    }

    /// One-line summary of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} checks, {} passed, {} failed, {} artifacts",
            self.checks.len(),
            self.checks.len() - self.failed_count(),
            self.failed_count(),
            self.artifacts.len()
        )
    }

    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ===== Tests =====
