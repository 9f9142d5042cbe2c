//! OpenAPI document loading and the typed model built from it.
//!
//! A description is loaded once, from a file or an HTTP(S) URL, as either JSON
//! or YAML. Its operations are parsed into typed values straight away so that
//! malformed shapes are reported before any code is generated. The raw JSON
//! root is kept alongside them for `$ref` resolution.
//!
//! # Examples
//!
//! ```no_run
//! use clientgen_core::openapi::ApiDocument;
//! use clientgen_core::error::Result;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let document = ApiDocument::from_file("openapi.yaml").await?;
//!
//! if let Some(title) = document.title() {
//!     println!("API Title: {}", title);
//! }
//! for operation in document.operations() {
//!     println!("{}", operation.label());
//! }
//! # Ok(())
//! # }
//! ```

pub mod operation;
pub mod reference;
pub mod schema;

pub use operation::{
    HttpMethod, Operation, Parameter, ParameterLocation, RequestBody, Response,
};
pub use schema::{Composition, CompositionKind, ObjectSchema, PrimitiveType, SchemaNode};

// Internal imports (std, crate)
use std::path::Path;

use crate::Error;

// External imports (alphabetized)
use serde_json::Value as JsonValue;
use tokio::fs;

/// A parsed, immutable OpenAPI description
#[derive(Debug, Clone)]
pub struct ApiDocument {
    /// The raw JSON value of the description
    json: JsonValue,
    /// Every (path, method) operation in document order
    operations: Vec<Operation>,
}

impl ApiDocument {
    /// Load a description from a file or URL (supports both YAML and JSON)
    pub async fn from_file_or_url<P: AsRef<str>>(location: P) -> crate::Result<Self> {
        let location = location.as_ref();

        if location.starts_with("http://") || location.starts_with("https://") {
            return Self::from_url(location).await;
        }

        Self::from_file(location).await
    }

    /// Load a description from a file (supports both YAML and JSON)
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        Self::parse_content(&content).map_err(|e| {
            Error::openapi(format!(
                "Failed to parse OpenAPI spec at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load a description from a URL (supports both YAML and JSON)
    pub async fn from_url(url: &str) -> crate::Result<Self> {
        let response = reqwest::get(url).await?;

        if !response.status().is_success() {
            return Err(Error::openapi(format!(
                "Failed to fetch OpenAPI spec from {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let content = response.text().await?;
        Self::parse_content(&content).map_err(|e| {
            Error::openapi(format!("Failed to parse OpenAPI spec from {}: {}", url, e))
        })
    }

    /// Parse content as either JSON or YAML
    pub fn parse_content(content: &str) -> crate::Result<Self> {
        if let Ok(json) = serde_json::from_str::<JsonValue>(content) {
            return Self::from_json(json);
        }

        match serde_yaml::from_str::<JsonValue>(content) {
            Ok(json) => Self::from_json(json),
            Err(_) => Err(Error::openapi("content is neither valid JSON nor YAML")),
        }
    }

    /// Build the typed model from an already parsed JSON value
    pub fn from_json(json: JsonValue) -> crate::Result<Self> {
        let operations = parse_operations(&json)?;
        Ok(Self { json, operations })
    }

    /// Get a reference to the raw JSON value
    pub fn as_json(&self) -> &JsonValue {
        &self.json
    }

    /// Every operation, in the order paths and methods appear in the document
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Get the title of the API
    pub fn title(&self) -> Option<&str> {
        self.json.get("info")?.get("title")?.as_str()
    }

    /// Get the version of the API
    pub fn version(&self) -> Option<&str> {
        self.json.get("info")?.get("version")?.as_str()
    }
}

fn parse_operations(root: &JsonValue) -> crate::Result<Vec<Operation>> {
    let paths = root
        .get("paths")
        .and_then(JsonValue::as_object)
        .ok_or_else(|| Error::openapi("Missing 'paths' object"))?;

    let mut operations = Vec::new();
    for (path, item) in paths {
        let item = reference::follow(root, item)?
            .as_object()
            .ok_or_else(|| Error::openapi(format!("Path item '{path}' must be an object")))?;
        let shared = operation::parse_parameters(root, item.get("parameters"))?;

        for (key, value) in item {
            let Some(method) = HttpMethod::from_key(key) else {
                continue;
            };
            let op = value.as_object().ok_or_else(|| {
                Error::openapi(format!("Operation {} {path} must be an object", method))
            })?;
            operations.push(operation::parse_operation(root, path, method, op, &shared)?);
        }
    }
    Ok(operations)
}
