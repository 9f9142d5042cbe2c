//! String transformation utilities for code generation

use once_cell::sync::Lazy;
use regex::Regex;

use crate::openapi::Operation;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("valid non-word pattern"));

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid identifier pattern"));

/// Words TypeScript rejects as binding or function names
const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Derive the function name (and file stem) of an operation.
///
/// Uses `operationId` when declared, otherwise the method followed by the path.
/// Runs of non-word characters collapse to `_`, then the `_`-separated
/// segments are folded into lowerCamelCase.
pub fn operation_identifier(operation: &Operation) -> String {
    let raw = match operation.id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("{}{}", operation.method.as_str(), operation.path),
    };
    let name = to_identifier(&raw);
    if !is_identifier(&name) || is_reserved_word(&name) {
        log::warn!(
            "{} derives '{}', which is not a valid function name",
            operation.label(),
            name
        );
    }
    name
}

/// Collapse non-word runs to `_` and camel-fold the result
pub fn to_identifier(s: &str) -> String {
    camel_fold(&NON_WORD.replace_all(s, "_"))
}

/// Fold `_`-separated segments into camel case.
///
/// The first segment is kept as-is; every following segment has its first
/// character uppercased. Underscores are dropped.
pub fn camel_fold(s: &str) -> String {
    let mut segments = s.split('_').filter(|seg| !seg.is_empty());
    let mut result = segments.next().map(String::from).unwrap_or_default();
    for segment in segments {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}

/// Whether `name` can be used bare as a TypeScript identifier or property key
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Whether `name` is a reserved word in strict-mode TypeScript
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Render a property key, quoting it when it is not a plain identifier
pub fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        serde_json::Value::String(name.to_string()).to_string()
    }
}

/// Flatten free text into one line that is safe inside a `/** */` block
pub fn sanitize_doc_comment(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("*/", "*\\/")
}
