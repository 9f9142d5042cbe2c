//! Context builder traits and adapters for language-specific codegen.
pub mod typescript;

use crate::openapi::Operation;
use serde_json::Value as JsonValue;

/// Trait for converting an Operation into a language-specific template context.
pub trait EndpointContextBuilder {
    fn build(&self, op: &Operation) -> crate::Result<JsonValue>;
}
