//! Error types for the leaseq work queue.
//!
//! Empty queues, refused releases and deletes of unknown items are normal
//! outcomes and never surface here.

use thiserror::Error;

/// The main error type for the leaseq library.
#[derive(Error, Debug)]
pub enum QueueError {
    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Job processing error with message.
    #[error("Job processing error: {0}")]
    JobProcessing(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend-specific error.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type alias using QueueError.
pub type Result<T> = std::result::Result<T, QueueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_serialization() {
        let json_err: serde_json::Error = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err = QueueError::Serialization(json_err);
        let display = format!("{}", err);
        assert!(display.starts_with("Serialization error:"));
    }

    #[test]
    fn test_error_display_job_processing() {
        let err = QueueError::JobProcessing("job for item 3 panicked".to_string());
        assert_eq!(
            format!("{}", err),
            "Job processing error: job for item 3 panicked"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = QueueError::Config("reaper interval must be non-zero".to_string());
        assert_eq!(
            format!("{}", err),
            "Configuration error: reaper interval must be non-zero"
        );
    }

    #[test]
    fn test_error_display_backend() {
        let err = QueueError::Backend("storage unavailable".to_string());
        assert_eq!(format!("{}", err), "Backend error: storage unavailable");
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err: serde_json::Error = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: QueueError = json_err.into();
        assert!(matches!(err, QueueError::Serialization(_)));
    }
}
