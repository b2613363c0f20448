//! Findings emitted by the risk checks.

use serde::Serialize;

/// Report section a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Market,
    Oracle,
    Liquidation,
    BorrowController,
    ActivePositions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub message: String,
    pub category: Category,
    pub severity: Severity,
}

/// Outcome of a pure threshold check, before it is attached to a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub severity: Severity,
    pub message: String,
}

impl Assessment {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// Append-only accumulator threaded through every check of one analysis run.
#[derive(Debug, Default)]
pub struct Findings {
    entries: Vec<Finding>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: Category, severity: Severity, message: impl Into<String>) {
        self.entries.push(Finding {
            message: message.into(),
            category,
            severity,
        });
    }

    pub fn error(&mut self, category: Category, message: impl Into<String>) {
        self.push(category, Severity::Error, message);
    }

    pub fn warning(&mut self, category: Category, message: impl Into<String>) {
        self.push(category, Severity::Warning, message);
    }

    pub fn info(&mut self, category: Category, message: impl Into<String>) {
        self.push(category, Severity::Info, message);
    }

    pub fn record(&mut self, category: Category, assessment: Option<Assessment>) {
        if let Some(a) = assessment {
            self.push(category, a.severity, a.message);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Finding> {
        self.entries
    }
}

/// Per-severity counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FindingSummary {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl FindingSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        findings
            .iter()
            .fold(FindingSummary::default(), |mut acc, f| {
                match f.severity {
                    Severity::Error => acc.errors += 1,
                    Severity::Warning => acc.warnings += 1,
                    Severity::Info => acc.info += 1,
                }
                acc
            })
    }
}
