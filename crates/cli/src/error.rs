//! Failures of the `genart` binary and the exit status each one ends with.
//!
//! | status | variant         | raised when                                                  |
//! |--------|-----------------|--------------------------------------------------------------|
//! | 0      |                 | the render finished or `--timeout-ms` stopped it             |
//! | 2      |                 | clap rejected the command line                               |
//! | 10     | `Engine`        | unknown generator, out-of-range param, zero-sized canvas     |
//! | 11     | `Io`            | a `--load` document is missing or the PNG cannot be written  |
//! | 12     | `Input`         | flags disagree with each other or with the loaded document   |
//! | 13     | `Serialization` | a document does not parse for its generator                  |

use genart_core::EngineError;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(EngineError),
    #[error("{0}")]
    Io(String),
    #[error("{0}")]
    Input(String),
    #[error("{0}")]
    Serialization(String),
}

impl CliError {
    /// `--params` was given alongside `--load`; the document already carries
    /// the params.
    pub fn params_with_load() -> Self {
        CliError::Input("--params cannot be combined with --load".to_string())
    }

    /// The positional generator name disagrees with the one recorded in the
    /// document at `path`.
    pub fn document_mismatch(path: &Path, recorded: &str, requested: &str) -> Self {
        CliError::Input(format!(
            "{} holds a {recorded} document, not {requested}",
            path.display()
        ))
    }

    pub fn missing_generator() -> Self {
        CliError::Input("a generator name or --load is required".to_string())
    }

    pub fn bad_params(reason: impl std::fmt::Display) -> Self {
        CliError::Input(format!("invalid --params JSON: {reason}"))
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            // Unreadable documents and failed PNG writes share status 11.
            EngineError::Io(msg) => CliError::Io(msg),
            EngineError::SerializationMismatch(msg) => CliError::Serialization(msg),
            other => CliError::Engine(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_with_load_is_an_input_failure() {
        let err = CliError::params_with_load();
        assert_eq!(err.exit_code(), 12);
        assert!(err.to_string().contains("--load"));
    }

    #[test]
    fn document_mismatch_names_both_generators_and_the_path() {
        let err = CliError::document_mismatch(Path::new("art/sky.neb"), "nebula", "flow");
        assert_eq!(err.exit_code(), 12);
        assert_eq!(err.to_string(), "art/sky.neb holds a nebula document, not flow");
    }

    #[test]
    fn unreadable_document_keeps_the_io_status() {
        let err = CliError::from(EngineError::Io("No such file or directory".into()));
        assert_eq!(err.exit_code(), 11);
        assert!(err.to_string().contains("No such file"));
    }

    #[test]
    fn document_with_wrong_param_shape_is_a_serialization_failure() {
        let err = CliError::from(EngineError::SerializationMismatch(
            "unknown field `petals`".into(),
        ));
        assert_eq!(err.exit_code(), 13);
        assert!(err.to_string().contains("petals"));
    }

    #[test]
    fn out_of_range_param_is_reported_by_the_engine() {
        let err = CliError::from(EngineError::invalid_param("grid_count", "must be within [1, 200]"));
        assert_eq!(err.exit_code(), 10);
        assert!(err.to_string().contains("grid_count"));
    }

    #[test]
    fn truncated_document_text_is_a_serialization_failure() {
        let truncated = serde_json::from_str::<serde_json::Value>(r#"{"generator": "flow""#);
        assert_eq!(CliError::from(truncated.unwrap_err()).exit_code(), 13);
    }
}
