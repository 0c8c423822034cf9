//! Candidate files ingested from an analysis report.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// File category derived from path classification rules.
///
/// Categories drive the base risk tier: calculation code is the most
/// sensitive, service code next, everything else starts low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    /// Core domain calculations.
    Calculation,
    /// Service-layer integration code.
    Service,
    /// UI components.
    Component,
    /// Shared utilities.
    Utility,
    /// Test code.
    Test,
    /// Anything not matched by a classification rule.
    Other,
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Calculation => write!(f, "calculation"),
            Self::Service => write!(f, "service"),
            Self::Component => write!(f, "component"),
            Self::Utility => write!(f, "utility"),
            Self::Test => write!(f, "test"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A file with proposed eliminations awaiting batch processing.
///
/// Created once per campaign from the ingested analysis report; the category
/// is fixed at construction by the configured classification rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCandidate {
    /// Absolute path in the working tree.
    pub path: PathBuf,
    /// Path relative to the campaign workspace root.
    pub relative_path: String,
    /// Category derived from the classification rules.
    pub category: FileCategory,
    /// Number of proposed eliminations in this file.
    pub proposed_changes: usize,
}

impl FileCandidate {
    /// Create a candidate rooted at `workspace`.
    pub fn new(
        workspace: &std::path::Path,
        relative_path: impl Into<String>,
        category: FileCategory,
        proposed_changes: usize,
    ) -> Self {
        let relative_path = relative_path.into();
        Self {
            path: workspace.join(&relative_path),
            relative_path,
            category,
            proposed_changes,
        }
    }
}
