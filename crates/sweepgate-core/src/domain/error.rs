//! Domain-level error taxonomy for sweepgate campaigns.

/// Campaign errors.
///
/// Startup errors (`Configuration`, `AnalysisInput`) abort before any file is
/// touched. `Snapshot` degrades to running without rollback cover; `Restore`
/// is fatal. The orchestrator folds everything else into the final
/// [`CampaignState`](crate::domain::campaign::CampaignState) instead of
/// letting it escape.
#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("invalid analysis report: {0}")]
    AnalysisInput(String),

    #[error("checkpoint failed: {0}")]
    Snapshot(String),

    #[error("restore failed: {0}")]
    Restore(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("command failed: {0}")]
    Command(String),

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for campaign operations.
pub type Result<T> = std::result::Result<T, CampaignError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CampaignError::Configuration("critical batch size must be > 0".to_string());
        assert!(err.to_string().contains("invalid configuration"));

        let err = CampaignError::AnalysisInput("entry 3 has an empty file path".to_string());
        assert!(err.to_string().contains("invalid analysis report"));

        let err = CampaignError::Restore("git reset --hard failed".to_string());
        assert!(err.to_string().contains("restore failed"));
    }

    #[test]
    fn test_digest_mismatch_error() {
        let err = CampaignError::DigestMismatch {
            expected: "abc123".to_string(),
            actual: "def456".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("abc123"));
        assert!(msg.contains("def456"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing report");
        let err: CampaignError = io.into();
        assert!(matches!(err, CampaignError::Io(_)));
    }
}
