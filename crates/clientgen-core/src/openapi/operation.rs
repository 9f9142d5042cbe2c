//! Typed operations, parameters, request bodies and responses.

use std::fmt;

use serde_json::{Map as JsonMap, Value as JsonValue};

use super::reference::follow;
use super::SchemaNode;
use crate::Error;

const JSON_MEDIA_TYPE: &str = "application/json";

/// HTTP methods a path item can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Map a path item key to a method; non-method keys yield `None`
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "get" => Some(Self::Get),
            "put" => Some(Self::Put),
            "post" => Some(Self::Post),
            "delete" => Some(Self::Delete),
            "options" => Some(Self::Options),
            "head" => Some(Self::Head),
            "patch" => Some(Self::Patch),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    /// Lowercase form, as used for path item keys and derived identifiers
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }

    /// Uppercase form sent on the wire
    pub fn as_upper(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_upper())
    }
}

/// Where a parameter is carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Query,
    Path,
    Header,
    Cookie,
}

impl ParameterLocation {
    fn parse(name: &str, location: &str) -> crate::Result<Self> {
        match location {
            "query" => Ok(Self::Query),
            "path" => Ok(Self::Path),
            "header" => Ok(Self::Header),
            "cookie" => Ok(Self::Cookie),
            other => Err(Error::InvalidParameterLocation {
                name: name.to_string(),
                location: other.to_string(),
            }),
        }
    }
}

/// A single operation parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub schema: SchemaNode,
    pub description: Option<String>,
}

/// A declared request body
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    pub required: bool,
    /// Schema of the `application/json` representation, if any
    pub schema: Option<SchemaNode>,
}

/// A declared response
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub description: Option<String>,
    /// Schema of the `application/json` representation, if any
    pub schema: Option<SchemaNode>,
}

/// One HTTP method bound to one path
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub method: HttpMethod,
    /// Path template, e.g. `/pets/{petId}`
    pub path: String,
    /// `operationId`, when declared
    pub id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    /// Effective parameters: path-item level ones first, overridden by operation level ones
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code, in document order
    pub responses: Vec<(String, Response)>,
}

impl Operation {
    /// Look up the response declared for a status code
    pub fn response(&self, status: &str) -> Option<&Response> {
        self.responses
            .iter()
            .find(|(code, _)| code == status)
            .map(|(_, response)| response)
    }

    /// Parameters carried in the given location, in declaration order
    pub fn parameters_in(&self, location: ParameterLocation) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }

    /// Human readable label used in logs and errors, e.g. `GET /pets`
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

pub(crate) fn parse_parameters(
    root: &JsonValue,
    value: Option<&JsonValue>,
) -> crate::Result<Vec<Parameter>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    value
        .as_array()
        .ok_or_else(|| Error::openapi("'parameters' must be an array"))?
        .iter()
        .map(|param| parse_parameter(root, param))
        .collect()
}

fn parse_parameter(root: &JsonValue, value: &JsonValue) -> crate::Result<Parameter> {
    let value = follow(root, value)?;
    let name = value
        .get("name")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::openapi(format!("Parameter without a 'name': {value}")))?;
    let location = value
        .get("in")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::openapi(format!("Parameter '{name}' has no 'in'")))?;
    let location = ParameterLocation::parse(name, location)?;

    // `content`-style parameters carry their schema under a media type instead
    let schema = match value.get("schema") {
        Some(schema) => SchemaNode::from_json(schema)?,
        None => json_content_schema(value)?.unwrap_or(SchemaNode::Untyped(None)),
    };

    Ok(Parameter {
        name: name.to_string(),
        location,
        required: value
            .get("required")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false),
        schema,
        description: value
            .get("description")
            .and_then(JsonValue::as_str)
            .map(String::from),
    })
}

pub(crate) fn parse_operation(
    root: &JsonValue,
    path: &str,
    method: HttpMethod,
    item: &JsonMap<String, JsonValue>,
    shared_parameters: &[Parameter],
) -> crate::Result<Operation> {
    let mut parameters = shared_parameters.to_vec();
    for param in parse_parameters(root, item.get("parameters"))? {
        match parameters
            .iter_mut()
            .find(|p| p.name == param.name && p.location == param.location)
        {
            Some(existing) => *existing = param,
            None => parameters.push(param),
        }
    }

    let request_body = item
        .get("requestBody")
        .map(|body| {
            let body = follow(root, body)?;
            Ok::<_, Error>(RequestBody {
                required: body
                    .get("required")
                    .and_then(JsonValue::as_bool)
                    .unwrap_or(false),
                schema: json_content_schema(body)?,
            })
        })
        .transpose()?;

    let responses = match item.get("responses") {
        None => Vec::new(),
        Some(JsonValue::Object(map)) => map
            .iter()
            .map(|(code, response)| {
                let response = follow(root, response)?;
                Ok((
                    code.clone(),
                    Response {
                        description: response
                            .get("description")
                            .and_then(JsonValue::as_str)
                            .map(String::from),
                        schema: json_content_schema(response)?,
                    },
                ))
            })
            .collect::<crate::Result<Vec<_>>>()?,
        Some(_) => {
            return Err(Error::openapi(format!(
                "'responses' of {} {path} must be an object",
                method.as_upper()
            )));
        }
    };

    let text = |key: &str| item.get(key).and_then(JsonValue::as_str).map(String::from);

    Ok(Operation {
        method,
        path: path.to_string(),
        id: text("operationId"),
        summary: text("summary"),
        description: text("description"),
        deprecated: item
            .get("deprecated")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false),
        parameters,
        request_body,
        responses,
    })
}

/// Schema of the `application/json` entry under `content`, if declared
fn json_content_schema(value: &JsonValue) -> crate::Result<Option<SchemaNode>> {
    value
        .get("content")
        .and_then(|content| content.get(JSON_MEDIA_TYPE))
        .and_then(|media| media.get("schema"))
        .map(SchemaNode::from_json)
        .transpose()
}
