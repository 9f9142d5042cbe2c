//! Typed schema nodes parsed from OpenAPI / JSON Schema objects.

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::Error;

/// Primitive JSON Schema types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    /// `type: string`
    String,
    /// `type: integer`
    Integer,
    /// `type: number`
    Number,
    /// `type: boolean`
    Boolean,
}

/// The composition keyword a schema carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionKind {
    OneOf,
    AnyOf,
    AllOf,
}

impl CompositionKind {
    const ALL: [CompositionKind; 3] = [Self::OneOf, Self::AnyOf, Self::AllOf];

    /// The JSON Schema keyword for this composition
    pub fn keyword(self) -> &'static str {
        match self {
            Self::OneOf => "oneOf",
            Self::AnyOf => "anyOf",
            Self::AllOf => "allOf",
        }
    }
}

/// A `oneOf` / `anyOf` / `allOf` group
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub kind: CompositionKind,
    pub variants: Vec<SchemaNode>,
}

/// An object schema
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    /// Declared properties in document order; `None` when `properties` is absent
    pub properties: Option<Vec<(String, SchemaNode)>>,
    /// Names listed under `required`
    pub required: Vec<String>,
}

impl ObjectSchema {
    /// Whether `name` is listed as required
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// A type description inside an OpenAPI document
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Primitive(PrimitiveType),
    /// Array with its element schema
    Array(Box<SchemaNode>),
    Object(ObjectSchema),
    /// Document-local pointer such as `#/components/schemas/Pet`
    Reference(String),
    /// Unknown or absent `type`, possibly carrying an unsynthesized composition
    Untyped(Option<Composition>),
}

impl SchemaNode {
    /// Parse a schema object.
    ///
    /// A `$ref` wins over every sibling key. Unknown `type` values degrade to
    /// [`SchemaNode::Untyped`]; structurally malformed keys are rejected.
    pub fn from_json(value: &JsonValue) -> crate::Result<Self> {
        let Some(obj) = value.as_object() else {
            return Ok(SchemaNode::Untyped(None));
        };

        if let Some(reference) = obj.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| Error::openapi(format!("'$ref' must be a string, got {reference}")))?;
            return Ok(SchemaNode::Reference(reference.to_string()));
        }

        match obj.get("type").and_then(JsonValue::as_str) {
            Some("string") => Ok(SchemaNode::Primitive(PrimitiveType::String)),
            Some("integer") => Ok(SchemaNode::Primitive(PrimitiveType::Integer)),
            Some("number") => Ok(SchemaNode::Primitive(PrimitiveType::Number)),
            Some("boolean") => Ok(SchemaNode::Primitive(PrimitiveType::Boolean)),
            Some("array") => {
                let items = match obj.get("items") {
                    None => SchemaNode::Untyped(None),
                    Some(items) if items.is_object() => SchemaNode::from_json(items)?,
                    Some(other) => {
                        return Err(Error::openapi(format!(
                            "'items' must be a schema object, got {other}"
                        )));
                    }
                };
                Ok(SchemaNode::Array(Box::new(items)))
            }
            Some("object") => Ok(SchemaNode::Object(parse_object(obj)?)),
            _ => Ok(SchemaNode::Untyped(parse_composition(obj)?)),
        }
    }
}

fn parse_object(obj: &JsonMap<String, JsonValue>) -> crate::Result<ObjectSchema> {
    let properties = match obj.get("properties") {
        None => None,
        Some(JsonValue::Object(props)) => Some(
            props
                .iter()
                .map(|(name, schema)| Ok((name.clone(), SchemaNode::from_json(schema)?)))
                .collect::<crate::Result<Vec<_>>>()?,
        ),
        Some(other) => {
            return Err(Error::openapi(format!(
                "'properties' must be an object, got {other}"
            )));
        }
    };

    let required = match obj.get("required") {
        None => Vec::new(),
        Some(JsonValue::Array(names)) => names
            .iter()
            .map(|n| {
                n.as_str().map(String::from).ok_or_else(|| {
                    Error::openapi(format!("'required' entries must be strings, got {n}"))
                })
            })
            .collect::<crate::Result<Vec<_>>>()?,
        Some(other) => {
            return Err(Error::openapi(format!(
                "'required' must be an array of strings, got {other}"
            )));
        }
    };

    Ok(ObjectSchema {
        properties,
        required,
    })
}

fn parse_composition(obj: &JsonMap<String, JsonValue>) -> crate::Result<Option<Composition>> {
    for kind in CompositionKind::ALL {
        let Some(value) = obj.get(kind.keyword()) else {
            continue;
        };
        let variants = value
            .as_array()
            .ok_or_else(|| Error::openapi(format!("'{}' must be an array", kind.keyword())))?
            .iter()
            .map(SchemaNode::from_json)
            .collect::<crate::Result<Vec<_>>>()?;
        return Ok(Some(Composition { kind, variants }));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitives() -> crate::Result<()> {
        assert_eq!(
            SchemaNode::from_json(&json!({"type": "integer", "format": "int64"}))?,
            SchemaNode::Primitive(PrimitiveType::Integer)
        );
        assert_eq!(
            SchemaNode::from_json(&json!({"type": "boolean"}))?,
            SchemaNode::Primitive(PrimitiveType::Boolean)
        );
        Ok(())
    }

    #[test]
    fn test_ref_wins_over_siblings() -> crate::Result<()> {
        let node = SchemaNode::from_json(&json!({
            "$ref": "#/components/schemas/Pet",
            "type": "string"
        }))?;
        assert_eq!(
            node,
            SchemaNode::Reference("#/components/schemas/Pet".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_object_keeps_declaration_order() -> crate::Result<()> {
        let node = SchemaNode::from_json(&json!({
            "type": "object",
            "required": ["zeta"],
            "properties": {
                "zeta": {"type": "string"},
                "alpha": {"type": "number"},
                "mid": {"type": "array", "items": {"type": "boolean"}}
            }
        }))?;
        let SchemaNode::Object(object) = node else {
            panic!("expected object schema");
        };
        let names: Vec<_> = object
            .properties
            .as_ref()
            .unwrap()
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert!(object.is_required("zeta"));
        assert!(!object.is_required("alpha"));
        Ok(())
    }

    #[test]
    fn test_object_without_properties() -> crate::Result<()> {
        let node = SchemaNode::from_json(&json!({"type": "object"}))?;
        assert_eq!(node, SchemaNode::Object(ObjectSchema::default()));
        Ok(())
    }

    #[test]
    fn test_array_without_items_is_untyped_element() -> crate::Result<()> {
        let node = SchemaNode::from_json(&json!({"type": "array"}))?;
        assert_eq!(
            node,
            SchemaNode::Array(Box::new(SchemaNode::Untyped(None)))
        );
        Ok(())
    }

    #[test]
    fn test_composition_is_carried() -> crate::Result<()> {
        let node = SchemaNode::from_json(&json!({
            "oneOf": [{"type": "string"}, {"$ref": "#/components/schemas/Pet"}]
        }))?;
        let SchemaNode::Untyped(Some(composition)) = node else {
            panic!("expected composition");
        };
        assert_eq!(composition.kind, CompositionKind::OneOf);
        assert_eq!(composition.variants.len(), 2);
        Ok(())
    }

    #[test]
    fn test_unknown_type_degrades() -> crate::Result<()> {
        assert_eq!(
            SchemaNode::from_json(&json!({"type": "file"}))?,
            SchemaNode::Untyped(None)
        );
        assert_eq!(
            SchemaNode::from_json(&json!({"type": ["string", "null"]}))?,
            SchemaNode::Untyped(None)
        );
        assert_eq!(SchemaNode::from_json(&json!({}))?, SchemaNode::Untyped(None));
        Ok(())
    }

    #[test]
    fn test_malformed_shapes_are_rejected() {
        assert!(SchemaNode::from_json(&json!({"$ref": 3})).is_err());
        assert!(SchemaNode::from_json(&json!({"type": "object", "properties": []})).is_err());
        assert!(SchemaNode::from_json(&json!({"type": "object", "required": "id"})).is_err());
        assert!(SchemaNode::from_json(&json!({"type": "array", "items": "string"})).is_err());
        assert!(SchemaNode::from_json(&json!({"anyOf": {}})).is_err());
    }
}
