//! Provides `EpiError` and the conversions from the errors of the libraries
//! the simulator touches.
//!
//! Only two classes of failure are expected in practice: a configuration file that cannot be
//! read or decoded (callers usually log it and carry on with defaults), and a report file that
//! cannot be created (fatal, since results could not be persisted).
use std::fmt::{self, Display};
use std::io;

#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum EpiError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    ConfigError(String),
    ReportError(String),
}

impl From<io::Error> for EpiError {
    fn from(error: io::Error) -> Self {
        EpiError::IoError(error)
    }
}

impl From<serde_json::Error> for EpiError {
    fn from(error: serde_json::Error) -> Self {
        EpiError::JsonError(error)
    }
}

impl std::error::Error for EpiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EpiError::IoError(error) => Some(error),
            EpiError::JsonError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for EpiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EpiError::IoError(error) => write!(f, "I/O error: {error}"),
            EpiError::JsonError(error) => write!(f, "JSON error: {error}"),
            EpiError::ConfigError(message) => write!(f, "Invalid configuration: {message}"),
            EpiError::ReportError(message) => write!(f, "Report error: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts_and_keeps_source() {
        let error: EpiError = io::Error::new(io::ErrorKind::NotFound, "missing.json").into();
        assert!(matches!(error, EpiError::IoError(_)));
        assert!(std::error::Error::source(&error).is_some());
        assert!(error.to_string().contains("missing.json"));
    }

    #[test]
    fn config_error_display() {
        let error = EpiError::ConfigError("GridSide must be positive".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid configuration: GridSide must be positive"
        );
    }
}
