//! Error types for xeninv-core

use thiserror::Error;

/// Errors that can occur during inventory synthesis
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// A record lacks an attribute the synthesizer requires
    #[error("{object} record is missing attribute '{attribute}'")]
    MissingAttribute {
        /// Name of the missing attribute
        attribute: String,
        /// Object type the record belongs to
        object: String,
    },

    /// A user-defined composition expression failed under strict mode
    #[error("composition failed: {0}")]
    Composition(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl CoreError {
    pub(crate) fn missing(object: &str, attribute: &str) -> Self {
        CoreError::MissingAttribute {
            attribute: attribute.to_string(),
            object: object.to_string(),
        }
    }
}
