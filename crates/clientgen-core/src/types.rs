//! TypeScript type synthesis from schema nodes.
//!
//! [`TypeSynthesizer`] walks a [`SchemaNode`], following `$ref`s through the
//! document, and produces a [`TypeExpr`] whose `Display` form is a TypeScript
//! type expression:
//!
//! | schema                          | TypeScript                  |
//! |---------------------------------|-----------------------------|
//! | `string`                        | `string`                    |
//! | `integer`, `number`             | `number`                    |
//! | `boolean`                       | `boolean`                   |
//! | `array` of T                    | `Array<T>`                  |
//! | `object` with properties        | `{ a: T; b?: U }`           |
//! | `object` without properties     | `Record<string, any>`       |
//! | anything else, compositions     | `any`                       |
//! | reference re-entered while open | `unknown`                   |

use std::fmt;

use crate::openapi::{reference, ApiDocument, PrimitiveType, SchemaNode};
use crate::utils::property_key;

/// A synthesized TypeScript type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    String,
    Number,
    Boolean,
    Array(Box<TypeExpr>),
    /// Structural record with members in declaration order
    Record(Vec<Member>),
    /// Open mapping with untyped keys
    Map,
    Any,
    /// A reference that was already being expanded; carries the reference
    Circular(String),
}

/// One member of a [`TypeExpr::Record`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub optional: bool,
    pub ty: TypeExpr,
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::String => f.write_str("string"),
            TypeExpr::Number => f.write_str("number"),
            TypeExpr::Boolean => f.write_str("boolean"),
            TypeExpr::Array(element) => write!(f, "Array<{element}>"),
            TypeExpr::Record(members) if members.is_empty() => f.write_str("{}"),
            TypeExpr::Record(members) => {
                f.write_str("{ ")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str(" }")
            }
            TypeExpr::Map => f.write_str("Record<string, any>"),
            TypeExpr::Any => f.write_str("any"),
            TypeExpr::Circular(_) => f.write_str("unknown"),
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.optional { "?" } else { "" };
        write!(f, "{}{marker}: {}", property_key(&self.name), self.ty)
    }
}

/// Synthesizes TypeScript types for schema nodes of one document.
///
/// Keeps the stack of references currently being expanded so that a schema
/// which reaches itself again yields [`TypeExpr::Circular`].
#[derive(Debug)]
pub struct TypeSynthesizer<'a> {
    document: &'a ApiDocument,
    in_progress: Vec<String>,
}

impl<'a> TypeSynthesizer<'a> {
    pub fn new(document: &'a ApiDocument) -> Self {
        Self {
            document,
            in_progress: Vec::new(),
        }
    }

    /// Synthesize the type of `node`; fails only on broken references
    pub fn synthesize(&mut self, node: &SchemaNode) -> crate::Result<TypeExpr> {
        match node {
            SchemaNode::Reference(target) => {
                if self.in_progress.iter().any(|open| open == target) {
                    log::debug!("Cycle through '{}', substituting unknown", target);
                    return Ok(TypeExpr::Circular(target.clone()));
                }
                let resolved = reference::resolve(target, self.document)?;
                self.in_progress.push(target.clone());
                let result = self.synthesize(&resolved);
                self.in_progress.pop();
                result
            }
            SchemaNode::Primitive(PrimitiveType::String) => Ok(TypeExpr::String),
            SchemaNode::Primitive(PrimitiveType::Integer | PrimitiveType::Number) => {
                Ok(TypeExpr::Number)
            }
            SchemaNode::Primitive(PrimitiveType::Boolean) => Ok(TypeExpr::Boolean),
            SchemaNode::Array(items) => Ok(TypeExpr::Array(Box::new(self.synthesize(items)?))),
            SchemaNode::Object(object) => {
                let Some(properties) = &object.properties else {
                    return Ok(TypeExpr::Map);
                };
                let members = properties
                    .iter()
                    .map(|(name, schema)| {
                        Ok(Member {
                            name: name.clone(),
                            optional: !object.is_required(name),
                            ty: self.synthesize(schema)?,
                        })
                    })
                    .collect::<crate::Result<Vec<_>>>()?;
                Ok(TypeExpr::Record(members))
            }
            // oneOf/anyOf/allOf stay untyped
            SchemaNode::Untyped(_) => Ok(TypeExpr::Any),
        }
    }
}

/// Synthesize a single node against `document`
pub fn synthesize(node: &SchemaNode, document: &ApiDocument) -> crate::Result<TypeExpr> {
    TypeSynthesizer::new(document).synthesize(node)
}
