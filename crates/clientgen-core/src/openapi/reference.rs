//! Resolution of document-local `$ref` pointers.

use std::collections::HashSet;

use serde_json::Value as JsonValue;

use super::{ApiDocument, SchemaNode};
use crate::Error;

/// Walk `root` along a `#/a/b/c` pointer and return the value found there.
///
/// Segments are JSON-pointer escaped (`~1` is `/`, `~0` is `~`). Anything that
/// is not a document-local pointer, or any absent segment, is a
/// [`Error::BrokenReference`].
pub fn resolve_value<'a>(root: &'a JsonValue, reference: &str) -> crate::Result<&'a JsonValue> {
    let pointer = reference
        .strip_prefix('#')
        .ok_or_else(|| Error::broken_reference(reference))?;
    if !pointer.is_empty() && !pointer.starts_with('/') {
        return Err(Error::broken_reference(reference));
    }
    root.pointer(pointer)
        .ok_or_else(|| Error::broken_reference(reference))
}

/// Resolve a schema reference to the node it points at.
///
/// The returned node may itself be a [`SchemaNode::Reference`]; following it
/// is up to the caller.
pub fn resolve(reference: &str, document: &ApiDocument) -> crate::Result<SchemaNode> {
    SchemaNode::from_json(resolve_value(document.as_json(), reference)?)
}

/// Follow a chain of `$ref` objects (parameters, request bodies, responses)
/// until a concrete object is reached.
pub(crate) fn follow<'a>(root: &'a JsonValue, value: &'a JsonValue) -> crate::Result<&'a JsonValue> {
    let mut seen = HashSet::new();
    let mut current = value;
    while let Some(reference) = current.get("$ref") {
        let reference = reference
            .as_str()
            .ok_or_else(|| Error::openapi(format!("'$ref' must be a string, got {reference}")))?;
        if !seen.insert(reference) {
            return Err(Error::CircularReference {
                reference: reference.to_string(),
            });
        }
        current = resolve_value(root, reference)?;
    }
    Ok(current)
}
