//! Error types for strategy analysis.
//!
//! Only genuine failures are errors. A stint too short to fit, an empty
//! comparison domain or a missing sector time are ordinary results and are
//! represented in the output values themselves.
//!
//! ## Error Categories
//!
//! - **Data Integrity**: lap numbers that go backwards or repeat for a driver
//! - **Parse Errors**: malformed lap datasets or configuration documents
//! - **File Errors**: dataset or configuration files that cannot be read
//! - **Config Errors**: configuration values outside their valid range
//! - **Task Errors**: a worker in the session runner panicked or was aborted
//!
//! ```rust
//! use undercut::StrategyError;
//!
//! let error = StrategyError::data_integrity("VER", 2, 2);
//! assert!(!error.is_retryable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for analysis operations.
pub type Result<T, E = StrategyError> = std::result::Result<T, E>;

/// Main error type for analysis operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StrategyError {
    #[error("Lap ordering violated for driver {driver}: lap {lap} follows lap {previous}")]
    DataIntegrity { driver: String, lap: u32, previous: u32 },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Lap data file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid analysis configuration: {reason}")]
    Config { reason: String },

    #[error("Analysis task failed: {reason}")]
    Task { reason: String },
}

impl StrategyError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            StrategyError::Task { .. } => true,
            StrategyError::File { .. } => false,
            StrategyError::DataIntegrity { .. } => false,
            StrategyError::Parse { .. } => false,
            StrategyError::Config { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            StrategyError::DataIntegrity { .. } => vec![
                "Sort the driver's laps by lap number before analysis",
                "Remove duplicated lap rows from the dataset",
                "Check the ingestion adapter groups laps by the right driver",
            ],
            StrategyError::Parse { .. } => vec![
                "Check the document is valid YAML",
                "Verify column names match the expected lap table",
                "Use null for undefined lap or sector times",
            ],
            StrategyError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
            StrategyError::Config { .. } => vec![
                "Use positive thresholds for cliff detection",
                "Set max_concurrency to at least 1",
                "Fall back to AnalysisConfig::default()",
            ],
            StrategyError::Task { .. } => vec![
                "Retry the analysis for the affected driver",
                "Check logs for a panic in the worker",
            ],
        }
    }

    /// Helper constructor for lap ordering violations.
    pub fn data_integrity(driver: impl Into<String>, lap: u32, previous: u32) -> Self {
        StrategyError::DataIntegrity { driver: driver.into(), lap, previous }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        StrategyError::File { path, source }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        StrategyError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        StrategyError::Config { reason: reason.into() }
    }
}

impl From<std::io::Error> for StrategyError {
    fn from(err: std::io::Error) -> Self {
        StrategyError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<tokio::task::JoinError> for StrategyError {
    fn from(err: tokio::task::JoinError) -> Self {
        StrategyError::Task { reason: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn data_integrity_message_names_driver_and_laps(
            driver in "[A-Z]{3}",
            lap in 1u32..100u32,
            previous in 1u32..100u32
          ) {
            let error = StrategyError::data_integrity(driver.clone(), lap, previous);
            let message = error.to_string();

            prop_assert!(message.contains(&driver));
            prop_assert!(message.contains(&lap.to_string()));
            prop_assert!(message.contains(&previous.to_string()));
          }

          #[test]
          fn parse_errors_keep_context_and_details(
            context in "\\w+",
            details in ".*"
          ) {
            let error = StrategyError::parse_error(context.clone(), details.clone());
            let message = error.to_string();

            prop_assert!(message.contains(&context));
            prop_assert!(message.contains(&details));
            prop_assert!(!error.is_retryable());
          }
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<StrategyError>();

        let error = StrategyError::invalid_config("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn recovery_methods_work() {
        let errors = [
            StrategyError::data_integrity("HAM", 3, 4),
            StrategyError::parse_error("lap table", "bad row"),
            StrategyError::invalid_config("cliff_sigma must be positive"),
            StrategyError::Task { reason: "worker panicked".to_string() },
        ];

        for error in &errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            for suggestion in suggestions {
                assert!(suggestion.len() > 5);
            }
        }

        assert!(errors[3].is_retryable());
        assert!(!errors[0].is_retryable());
    }

    #[test]
    fn from_io_error_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "laps.yml");
        let error: StrategyError = io_err.into();

        match error {
            StrategyError::File { source, .. } => {
                assert_eq!(source.to_string(), "laps.yml");
            }
            _ => panic!("Expected File error variant"),
        }
    }
}
