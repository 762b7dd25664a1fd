//! Error types for template handling and definition building.

use thiserror::Error;

/// Errors that can occur while modeling templates or building definitions.
#[derive(Debug, Error)]
pub enum Error {
    /// The template root is not a JSON object
    #[error("template root must be a JSON object")]
    MalformedTemplate,

    /// A declared parameter block is not a JSON object
    #[error("parameter block for {name} must be a JSON object")]
    MalformedParameter {
        /// Name of the offending parameter declaration
        name: String,
    },

    /// Required parameters remain unresolved and prompting is unavailable
    #[error("missing value for required parameter(s): {}", names.join(", "))]
    MissingParameters {
        /// Declared parameter names with no resolved value and no default
        names: Vec<String>,
    },

    /// The stack operation timeout is not a positive number of minutes
    #[error("timeout must be a positive number of minutes")]
    InvalidTimeout,

    /// Template JSON could not be parsed or serialized
    #[error("invalid template JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for formation operations.
pub type Result<T> = std::result::Result<T, Error>;
