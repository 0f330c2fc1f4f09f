//! Error types shared between the parameter resolver, the model builder and the sweep engine.
use derive_more::{Display, Error};

/// A malformed or internally inconsistent scenario configuration.
///
/// Raised by the parameter resolver and the model builder. The sweep engine looks for this error in
/// a failure's chain to report the offending field in the results table.
#[derive(Debug, Clone, PartialEq, Display, Error)]
#[display("Invalid value for {field}: {message}")]
pub struct ConfigurationError {
    /// The configuration field which is at fault
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

impl ConfigurationError {
    /// Create a new [`ConfigurationError`]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Return early with a [`ConfigurationError`] if the condition does not hold.
macro_rules! ensure_config {
    ($cond:expr, $field:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::ConfigurationError::new($field, format!($($arg)+)).into());
        }
    };
}
pub(crate) use ensure_config;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = ConfigurationError::new("horizon_hours", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid value for horizon_hours: must be positive"
        );
    }

    #[test]
    fn test_configuration_error_downcast() {
        let err: anyhow::Error = ConfigurationError::new("demand", "too short").into();
        let err = err.context("Failed to build problem");
        let config_err = err
            .chain()
            .find_map(|e| e.downcast_ref::<ConfigurationError>())
            .unwrap();
        assert_eq!(config_err.field, "demand");
    }
}
