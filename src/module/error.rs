//! Error taxonomy for capture operations.
//!
//! Every variant is recoverable at the operation level: errors are
//! reported to the operator as the outcome of the triggering command
//! and never abort the process.

use thiserror::Error;

/// Errors surfaced by capture operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The label is empty or contains disallowed characters after
    /// normalization.
    #[error("invalid label {0:?}")]
    InvalidLabel(String),

    /// A capture was attempted before any label was selected.
    #[error("no label selected")]
    NoLabelSelected,

    /// The camera could not be opened or yielded no frame in time.
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    /// Directory creation, image encoding or the final rename failed.
    #[error("storage failure for label '{label}': {message}")]
    Storage { label: String, message: String },
}

impl CaptureError {
    /// Storage failure tagged with the label it happened under.
    pub fn storage(label: &str, err: impl std::fmt::Display) -> Self {
        Self::Storage {
            label: label.to_owned(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_label() {
        let err = CaptureError::storage("cat", "disk full");
        assert_eq!(err.to_string(), "storage failure for label 'cat': disk full");
        assert_eq!(
            CaptureError::NoLabelSelected.to_string(),
            "no label selected"
        );
    }
}
