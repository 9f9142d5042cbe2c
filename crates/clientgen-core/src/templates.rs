//! Template system for rendering generated units.
//!
//! Every operation is rendered through a single `operation.ts.tera` template.
//! The built-in one is compiled into the library; a custom directory holding
//! a file of the same name replaces it.

// Internal imports (std, crate)
use std::path::Path;
use std::sync::Arc;

use crate::{config::Config, Error};

// External imports (alphabetized)
use serde::Serialize;
use tera::{Context, Tera};

/// Name of the template every operation is rendered with
pub const OPERATION_TEMPLATE: &str = "operation.ts.tera";

const BUILTIN_OPERATION_TEMPLATE: &str =
    include_str!("../templates/typescript_fetch/operation.ts.tera");

/// Manages loading and rendering of code generation templates
#[derive(Debug, Clone)]
pub struct TemplateManager {
    /// Cached Tera template engine instance
    tera: Arc<Tera>,
}

impl TemplateManager {
    /// Template manager backed by the built-in TypeScript fetch template
    pub fn builtin() -> crate::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(OPERATION_TEMPLATE, BUILTIN_OPERATION_TEMPLATE)?;
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    /// Load templates from a custom directory, which must contain `operation.ts.tera`
    pub async fn from_dir(dir: &Path) -> crate::Result<Self> {
        if !tokio::fs::try_exists(dir.join(OPERATION_TEMPLATE)).await? {
            return Err(Error::template(format!(
                "Template directory {} has no {}",
                dir.display(),
                OPERATION_TEMPLATE
            )));
        }
        let dir_str = dir
            .to_str()
            .ok_or_else(|| Error::template("Template path contains invalid UTF-8"))?;
        let tera = Tera::new(&format!("{}/**/*.tera", dir_str))?;
        log::debug!(
            "Loaded templates from {}: {:?}",
            dir.display(),
            tera.get_template_names().collect::<Vec<_>>()
        );
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    /// Pick the custom template directory from `config`, or the built-in template
    pub async fn from_config(config: &Config) -> crate::Result<Self> {
        match &config.template_dir {
            Some(dir) => Self::from_dir(Path::new(dir)).await,
            None => Self::builtin(),
        }
    }

    /// Get a reference to the Tera template engine
    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// Render one operation context
    pub fn render_operation<T: Serialize>(&self, context: &T) -> crate::Result<String> {
        let context = Context::from_serialize(context)?;
        self.tera.render(OPERATION_TEMPLATE, &context).map_err(|e| {
            log::error!("Template rendering failed for '{}': {}", OPERATION_TEMPLATE, e);
            Error::from(e)
        })
    }
}
