//! Error handling for the clientgen code generation library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. It uses `thiserror` for easy
//! error handling and implements conversions from common error types.
//!
//! # Examples
//!
//! ```
//! use clientgen_core::error::{Error, Result};
//!
//! fn lookup(reference: &str) -> Result<()> {
//!     Err(Error::broken_reference(reference))
//! }
//!
//! assert!(matches!(
//!     lookup("#/components/schemas/Missing"),
//!     Err(Error::BrokenReference { .. })
//! ));
//! ```

use thiserror::Error;

/// Result type for clientgen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for clientgen operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP error while fetching a remote description
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed OpenAPI document
    #[error("OpenAPI error: {0}")]
    OpenApi(String),

    /// A `$ref` that does not point at anything in the document
    #[error("Broken reference: '{reference}' does not resolve within the document")]
    BrokenReference { reference: String },

    /// A chain of `$ref`s that loops back on itself
    #[error("Circular reference: '{reference}' refers back to itself")]
    CircularReference { reference: String },

    /// Parameter `in` value outside of query/path/header/cookie
    #[error("Parameter '{name}' has invalid location '{location}'")]
    InvalidParameterLocation { name: String, location: String },

    /// Two operations derived the same output identifier
    #[error("Identifier '{identifier}' is derived by both {first} and {second}")]
    IdentifierCollision {
        identifier: String,
        first: String,
        second: String,
    },

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new OpenAPI error
    pub fn openapi<S: Into<String>>(msg: S) -> Self {
        Self::OpenApi(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }

    /// Create a new broken reference error
    pub fn broken_reference<S: Into<String>>(reference: S) -> Self {
        Self::BrokenReference {
            reference: reference.into(),
        }
    }
}
