//! TypeScript endpoint context builder: compiles one operation into the
//! signature, URL construction and response contract of a fetch function.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::EndpointContextBuilder;
use crate::openapi::{ApiDocument, Operation, Parameter, ParameterLocation};
use crate::types::{Member, TypeExpr, TypeSynthesizer};
use crate::utils::{
    is_identifier, is_reserved_word, operation_identifier, property_key, sanitize_doc_comment,
    to_identifier,
};

/// Signature used when an operation takes no path, query or body input
pub const NO_ARGS_SIGNATURE: &str = "_args?: Record<string, never>";

/// Names the generated function declares or reads next to its parameters
const FUNCTION_SCOPE_NAMES: &[&str] = &[
    "url",
    "params",
    "search",
    "options",
    "query",
    "body",
    "_args",
    "fetch",
    "console",
    "JSON",
    "Object",
    "String",
    "URLSearchParams",
    "process",
];

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}/]+)\}").expect("valid placeholder pattern"));

// TypeScript-specific context for codegen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeScriptEndpointContext {
    /// Name of the generated function, also the file stem
    pub fn_name: String,
    /// Uppercase HTTP method
    pub method: String,
    /// Raw path as defined in the description (e.g., "/pet/{petId}")
    pub path: String,
    /// Full parameter list of the generated function
    pub signature: String,
    /// Template literal producing the request URL, including the base address
    pub url: String,
    /// Whether a `query` argument is part of the signature
    pub has_query: bool,
    /// Record type of the `query` argument
    pub query_type: Option<String>,
    /// Whether a `body` argument is part of the signature
    pub has_body: bool,
    /// Type of the `body` argument
    pub body_type: Option<String>,
    /// Type of the successful JSON payload
    pub response_type: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
}

/// Builds [`TypeScriptEndpointContext`]s for the operations of one document
#[derive(Debug, Clone)]
pub struct TypeScriptEndpointContextBuilder<'a> {
    document: &'a ApiDocument,
    /// Expression interpolated in front of every path
    base_url: String,
}

impl<'a> TypeScriptEndpointContextBuilder<'a> {
    pub fn new(document: &'a ApiDocument, base_url: impl Into<String>) -> Self {
        Self {
            document,
            base_url: base_url.into(),
        }
    }

    /// Compile one operation
    pub fn context(&self, op: &Operation) -> crate::Result<TypeScriptEndpointContext> {
        let fn_name = operation_identifier(op);
        let mut synth = TypeSynthesizer::new(self.document);

        let path_params: Vec<&Parameter> = op.parameters_in(ParameterLocation::Path).collect();
        let query_params: Vec<&Parameter> = op.parameters_in(ParameterLocation::Query).collect();
        for skipped in op
            .parameters
            .iter()
            .filter(|p| matches!(p.location, ParameterLocation::Header | ParameterLocation::Cookie))
        {
            log::debug!(
                "{}: {:?} parameter '{}' is not part of the generated signature",
                fn_name,
                skipped.location,
                skipped.name
            );
        }

        let mut parts = Vec::new();

        let bindings = path_bindings(&path_params);
        if !path_params.is_empty() {
            let pattern = path_params
                .iter()
                .zip(&bindings)
                .map(|(p, binding)| {
                    if *binding == p.name {
                        binding.clone()
                    } else {
                        format!("{}: {binding}", property_key(&p.name))
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            let record = TypeExpr::Record(
                path_params
                    .iter()
                    .map(|p| {
                        Ok(Member {
                            name: p.name.clone(),
                            optional: false,
                            ty: synth.synthesize(&p.schema)?,
                        })
                    })
                    .collect::<crate::Result<Vec<_>>>()?,
            );
            parts.push(format!("{{ {pattern} }}: {record}"));
        }

        let query_type = if query_params.is_empty() {
            None
        } else {
            let record = TypeExpr::Record(
                query_params
                    .iter()
                    .map(|p| {
                        Ok(Member {
                            name: p.name.clone(),
                            optional: !p.required,
                            ty: synth.synthesize(&p.schema)?,
                        })
                    })
                    .collect::<crate::Result<Vec<_>>>()?,
            );
            parts.push(format!("query: {record}"));
            Some(record.to_string())
        };

        let body_type = match &op.request_body {
            Some(body) => {
                let ty = match &body.schema {
                    Some(schema) => synth.synthesize(schema)?,
                    None => TypeExpr::Any,
                };
                parts.push(format!("body: {ty}"));
                Some(ty.to_string())
            }
            None => None,
        };

        let signature = if parts.is_empty() {
            NO_ARGS_SIGNATURE.to_string()
        } else {
            parts.join(", ")
        };

        let response_type = match op.response("200").and_then(|r| r.schema.as_ref()) {
            Some(schema) => synth.synthesize(schema)?,
            None => TypeExpr::Any,
        };

        let context = TypeScriptEndpointContext {
            url: self.url_expression(&op.path, &path_params, &bindings),
            fn_name,
            method: op.method.as_upper().to_string(),
            path: op.path.clone(),
            signature,
            has_query: query_type.is_some(),
            query_type,
            has_body: body_type.is_some(),
            body_type,
            response_type: response_type.to_string(),
            summary: op.summary.as_deref().map(sanitize_doc_comment).filter(|s| !s.is_empty()),
            description: op
                .description
                .as_deref()
                .map(sanitize_doc_comment)
                .filter(|s| !s.is_empty()),
            deprecated: op.deprecated,
        };
        log::debug!("Compiled {} as {}({})", op.label(), context.fn_name, context.signature);
        Ok(context)
    }

    /// Template literal for the request URL: base address, then the path with
    /// declared path parameters interpolated
    fn url_expression(&self, path: &str, path_params: &[&Parameter], bindings: &[String]) -> String {
        let mut literal = String::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(path) {
            let Some(whole) = caps.get(0) else { continue };
            literal.push_str(&escape_template_literal(&path[last..whole.start()]));
            literal.push_str(&substitute(&caps, path_params, bindings));
            last = whole.end();
        }
        literal.push_str(&escape_template_literal(&path[last..]));
        format!("`${{{}}}{}`", self.base_url, literal)
    }
}

impl EndpointContextBuilder for TypeScriptEndpointContextBuilder<'_> {
    fn build(&self, op: &Operation) -> crate::Result<JsonValue> {
        Ok(serde_json::to_value(self.context(op)?)?)
    }
}

fn substitute(caps: &Captures<'_>, path_params: &[&Parameter], bindings: &[String]) -> String {
    let name = &caps[1];
    match path_params.iter().position(|p| p.name == name) {
        Some(index) => format!("${{{}}}", bindings[index]),
        // Placeholder without a declared parameter stays literal
        None => escape_template_literal(&caps[0]),
    }
}

/// Local variable each path parameter is bound to, in parameter order.
///
/// Names that are valid, unreserved and free are bound as-is (camel-folded
/// first when they are not identifiers). Anything else gets a `path`-prefixed
/// local, numbered until it is unique.
fn path_bindings(path_params: &[&Parameter]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    path_params
        .iter()
        .map(|p| {
            let preferred = if is_identifier(&p.name) {
                p.name.clone()
            } else {
                to_identifier(&p.name)
            };
            let binding = if is_free_binding(&preferred, &taken) {
                preferred
            } else {
                let base = to_identifier(&format!("path_{preferred}"));
                let mut candidate = base.clone();
                let mut n = 2;
                while !is_free_binding(&candidate, &taken) {
                    candidate = format!("{base}{n}");
                    n += 1;
                }
                candidate
            };
            taken.insert(binding.clone());
            binding
        })
        .collect()
}

fn is_free_binding(name: &str, taken: &HashSet<String>) -> bool {
    is_identifier(name)
        && !is_reserved_word(name)
        && !FUNCTION_SCOPE_NAMES.contains(&name)
        && !taken.contains(name)
}

fn escape_template_literal(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace('$', "\\$")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "process.env.API_BASE_URL";

    fn compile(doc: serde_json::Value) -> TypeScriptEndpointContext {
        let document = ApiDocument::from_json(doc).unwrap();
        let builder = TypeScriptEndpointContextBuilder::new(&document, BASE);
        builder.context(&document.operations()[0]).unwrap()
    }

    #[test]
    fn test_no_arguments() {
        let ctx = compile(json!({"paths": {"/health": {"get": {"responses": {}}}}}));
        assert_eq!(ctx.fn_name, "getHealth");
        assert_eq!(ctx.signature, NO_ARGS_SIGNATURE);
        assert_eq!(ctx.url, "`${process.env.API_BASE_URL}/health`");
        assert_eq!(ctx.response_type, "any");
        assert!(!ctx.has_query);
        assert!(!ctx.has_body);
    }

    #[test]
    fn test_path_parameter_substitution() {
        let ctx = compile(json!({"paths": {"/items/{id}": {"get": {
            "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "integer"}}],
            "responses": {}
        }}}}));
        assert_eq!(ctx.signature, "{ id }: { id: number }");
        assert_eq!(ctx.url, "`${process.env.API_BASE_URL}/items/${id}`");
    }

    #[test]
    fn test_non_identifier_path_parameter_is_rebound() {
        let ctx = compile(json!({"paths": {"/pets/{pet-id}/{undeclared}": {"get": {
            "parameters": [{"name": "pet-id", "in": "path", "required": true, "schema": {"type": "string"}}]
        }}}}));
        assert_eq!(ctx.signature, "{ \"pet-id\": petId }: { \"pet-id\": string }");
        assert_eq!(
            ctx.url,
            "`${process.env.API_BASE_URL}/pets/${petId}/{undeclared}`"
        );
    }

    #[test]
    fn test_path_parameter_named_after_function_local() {
        let ctx = compile(json!({"paths": {"/links/{url}": {"get": {
            "parameters": [{"name": "url", "in": "path", "required": true, "schema": {"type": "string"}}]
        }}}}));
        assert_eq!(ctx.signature, "{ url: pathUrl }: { url: string }");
        assert_eq!(ctx.url, "`${process.env.API_BASE_URL}/links/${pathUrl}`");
    }

    #[test]
    fn test_path_parameter_named_body_next_to_request_body() {
        let ctx = compile(json!({"paths": {"/docs/{body}": {"put": {
            "parameters": [{"name": "body", "in": "path", "required": true, "schema": {"type": "string"}}],
            "requestBody": {"content": {"application/json": {"schema": {"type": "string"}}}}
        }}}}));
        assert_eq!(
            ctx.signature,
            "{ body: pathBody }: { body: string }, body: string"
        );
        assert_eq!(ctx.url, "`${process.env.API_BASE_URL}/docs/${pathBody}`");
    }

    #[test]
    fn test_reserved_word_path_parameter() {
        let ctx = compile(json!({"paths": {"/classes/{class}/{default}": {"get": {
            "parameters": [
                {"name": "class", "in": "path", "required": true, "schema": {"type": "string"}},
                {"name": "default", "in": "path", "required": true, "schema": {"type": "boolean"}}
            ]
        }}}}));
        assert_eq!(
            ctx.signature,
            "{ class: pathClass, default: pathDefault }: { class: string; default: boolean }"
        );
        assert_eq!(
            ctx.url,
            "`${process.env.API_BASE_URL}/classes/${pathClass}/${pathDefault}`"
        );
    }

    #[test]
    fn test_path_parameters_folding_to_one_binding() {
        let ctx = compile(json!({"paths": {"/pets/{pet-id}/{petId}/{path_pet_id}": {"get": {
            "parameters": [
                {"name": "pet-id", "in": "path", "required": true, "schema": {"type": "string"}},
                {"name": "petId", "in": "path", "required": true, "schema": {"type": "string"}},
                {"name": "path_pet_id", "in": "path", "required": true, "schema": {"type": "string"}}
            ]
        }}}}));
        assert_eq!(
            ctx.signature,
            "{ \"pet-id\": petId, petId: pathPetId, path_pet_id }: \
             { \"pet-id\": string; petId: string; path_pet_id: string }"
        );
        assert_eq!(
            ctx.url,
            "`${process.env.API_BASE_URL}/pets/${petId}/${pathPetId}/${path_pet_id}`"
        );
    }

    #[test]
    fn test_query_parameters() {
        let ctx = compile(json!({"paths": {"/search": {"get": {
            "parameters": [
                {"name": "name", "in": "query", "required": true, "schema": {"type": "string"}},
                {"name": "limit", "in": "query", "schema": {"type": "integer"}},
                {"name": "X-Request-Id", "in": "header", "schema": {"type": "string"}},
                {"name": "session", "in": "cookie"}
            ]
        }}}}));
        assert_eq!(ctx.signature, "query: { name: string; limit?: number }");
        assert_eq!(ctx.query_type.as_deref(), Some("{ name: string; limit?: number }"));
        assert!(ctx.has_query);
    }

    #[test]
    fn test_request_body() {
        let ctx = compile(json!({"paths": {"/users": {"post": {
            "requestBody": {
                "required": true,
                "content": {"application/json": {"schema": {
                    "type": "object",
                    "properties": {"name": {"type": "string"}},
                    "required": ["name"]
                }}}
            }
        }}}}));
        assert_eq!(ctx.signature, "body: { name: string }");
        assert_eq!(ctx.body_type.as_deref(), Some("{ name: string }"));
        assert_eq!(ctx.method, "POST");
        assert!(ctx.has_body);
    }

    #[test]
    fn test_request_body_without_json_schema_is_any() {
        let ctx = compile(json!({"paths": {"/upload": {"put": {
            "requestBody": {"content": {"application/octet-stream": {}}}
        }}}}));
        assert_eq!(ctx.signature, "body: any");
    }

    #[test]
    fn test_signature_order() {
        let ctx = compile(json!({"paths": {"/orgs/{org}/members": {"post": {
            "operationId": "add-member",
            "parameters": [
                {"name": "notify", "in": "query", "schema": {"type": "boolean"}},
                {"name": "org", "in": "path", "required": true, "schema": {"type": "string"}}
            ],
            "requestBody": {"content": {"application/json": {"schema": {"type": "object"}}}},
            "responses": {"200": {"content": {"application/json": {"schema": {
                "type": "array", "items": {"type": "string"}
            }}}}}
        }}}}));
        assert_eq!(ctx.fn_name, "addMember");
        assert_eq!(
            ctx.signature,
            "{ org }: { org: string }, query: { notify?: boolean }, body: Record<string, any>"
        );
        assert_eq!(ctx.response_type, "Array<string>");
    }

    #[test]
    fn test_response_only_from_200() {
        let ctx = compile(json!({"paths": {"/pets": {"post": {
            "responses": {"201": {"content": {"application/json": {"schema": {"type": "string"}}}}}
        }}}}));
        assert_eq!(ctx.response_type, "any");
    }

    #[test]
    fn test_docs_are_sanitized() {
        let ctx = compile(json!({"paths": {"/pets": {"get": {
            "summary": "  List\n pets ",
            "description": "Ends a */ comment",
            "deprecated": true
        }}}}));
        assert_eq!(ctx.summary.as_deref(), Some("List pets"));
        assert_eq!(ctx.description.as_deref(), Some("Ends a *\\/ comment"));
        assert!(ctx.deprecated);
    }

    #[test]
    fn test_literal_path_text_is_escaped() {
        let document = ApiDocument::from_json(json!({"paths": {"/price$/`x`": {"get": {}}}})).unwrap();
        let builder = TypeScriptEndpointContextBuilder::new(&document, "\"https://api.example.com\"");
        let ctx = builder.context(&document.operations()[0]).unwrap();
        assert_eq!(ctx.url, "`${\"https://api.example.com\"}/price\\$/\\`x\\``");
    }

    #[test]
    fn test_build_returns_json_context() -> crate::Result<()> {
        let document = ApiDocument::from_json(json!({"paths": {"/a": {"get": {}}}}))?;
        let builder = TypeScriptEndpointContextBuilder::new(&document, BASE);
        let value = builder.build(&document.operations()[0])?;
        assert_eq!(value["fn_name"], "getA");
        assert_eq!(value["method"], "GET");
        Ok(())
    }
}
