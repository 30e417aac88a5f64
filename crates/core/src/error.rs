//! Error types for the genart core.

use thiserror::Error;

/// Errors produced by generator operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero (or their product overflowed) when creating a
    /// grid, buffer or canvas.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A cooperative cancellation was observed. Partial results are discarded.
    #[error("generation cancelled")]
    CancellationRequested,

    /// A loaded document was missing a required field or had the wrong shape.
    #[error("serialization mismatch: {0}")]
    SerializationMismatch(String),

    /// A counter would exceed its representable range.
    #[error("numeric overflow: {0}")]
    NumericOverflow(String),

    /// A parameter value is outside its meaningful domain.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Two grids had incompatible dimensions for an element-wise operation.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A palette cannot be used as requested (e.g. no enabled entries).
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// The requested generator name is not registered.
    #[error("unknown generator: {0}")]
    UnknownGenerator(String),

    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidParameter`].
    pub fn invalid_param(name: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// True for the cooperative-abort path, which callers treat as a silent no-op.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, EngineError::CancellationRequested)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::SerializationMismatch(e.to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let err = EngineError::InvalidDimensions;
        let msg = format!("{err}");
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn invalid_parameter_includes_name_and_reason() {
        let err = EngineError::invalid_param("octaves", "must be at least 1");
        let msg = format!("{err}");
        assert!(msg.contains("octaves"), "missing name in: {msg}");
        assert!(msg.contains("at least 1"), "missing reason in: {msg}");
    }

    #[test]
    fn dimension_mismatch_includes_all_dimensions() {
        let err = EngineError::DimensionMismatch {
            lhs_w: 10,
            lhs_h: 20,
            rhs_w: 30,
            rhs_h: 40,
        };
        let msg = format!("{err}");
        assert!(msg.contains("10"), "missing lhs_w in: {msg}");
        assert!(msg.contains("20"), "missing lhs_h in: {msg}");
        assert!(msg.contains("30"), "missing rhs_w in: {msg}");
        assert!(msg.contains("40"), "missing rhs_h in: {msg}");
    }

    #[test]
    fn serde_error_becomes_serialization_mismatch() {
        let bad = serde_json::from_str::<serde_json::Value>("{not json");
        let err = EngineError::from(bad.unwrap_err());
        assert!(matches!(err, EngineError::SerializationMismatch(_)));
    }

    #[test]
    fn io_error_keeps_message() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = EngineError::from(io);
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn only_cancellation_reports_is_cancellation() {
        assert!(EngineError::CancellationRequested.is_cancellation());
        assert!(!EngineError::InvalidDimensions.is_cancellation());
        assert!(!EngineError::NumericOverflow("hits".into()).is_cancellation());
    }

    #[test]
    fn engine_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn engine_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<EngineError>();
    }
}
