//! clientgen Core Library
//!
//! This library generates typed TypeScript fetch functions, one per operation,
//! from OpenAPI descriptions.

pub mod builders;
pub mod config;
pub mod error;
pub mod generate;
pub mod openapi;
pub mod templates;
pub mod types;
pub mod utils;

pub use crate::{
    config::{CollisionPolicy, Config},
    error::{Error, Result},
    generate::{generate, generate_from_document, GeneratedUnit, GenerationSummary},
    openapi::ApiDocument,
    templates::TemplateManager,
    types::{synthesize, TypeExpr},
};
