//! Error types for the seismic simulator

use thiserror::Error;

/// Main error type for simulator boundary operations
///
/// The simulation core itself never fails: inputs are clamped and every generated
/// series is sanitized. Errors only surface where external data enters the crate
/// (parsed parameters, config files, drawing surfaces).
#[derive(Error, Debug)]
pub enum SeismicError {
    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Parameter '{name}' has invalid value {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Render surface error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for simulator operations
pub type SeismicResult<T> = Result<T, SeismicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_variant_message_names_kind() {
        let err = SeismicError::UnknownVariant {
            kind: "soil type",
            value: "clay".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown soil type 'clay'");
    }

    #[test]
    fn json_errors_convert() {
        let parse: Result<u32, _> = serde_json::from_str("not json");
        let err: SeismicError = parse.unwrap_err().into();
        assert!(matches!(err, SeismicError::SerializationError(_)));
    }
}
