//! Code generation functionality for clientgen

// Internal imports (std, crate)
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::{
    builders::{typescript::TypeScriptEndpointContextBuilder, EndpointContextBuilder},
    config::{CollisionPolicy, Config},
    error::{Error, Result},
    openapi::{ApiDocument, Operation},
    templates::TemplateManager,
};

// External imports (alphabetized)
use serde_json::Value as JsonValue;
use tokio::fs;

/// One compiled operation, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Function name; also the file stem
    pub identifier: String,
    /// File name under the output directory
    pub file_name: String,
    /// Rendered source text
    pub source: String,
    /// Operation the unit was compiled from, e.g. `GET /pets`
    pub operation: String,
}

/// Outcome of a generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    pub output_dir: PathBuf,
    /// Files written, in write order
    pub files: Vec<PathBuf>,
    /// Operations whose unit was replaced by a later one with the same identifier
    pub overwritten: Vec<String>,
}

/// Compile and render a single operation.
///
/// The builder's context must carry the function name under `fn_name`.
pub fn compile_unit<B: EndpointContextBuilder + ?Sized>(
    builder: &B,
    op: &Operation,
    config: &Config,
    templates: &TemplateManager,
) -> Result<GeneratedUnit> {
    let context = builder.build(op)?;
    let identifier = context
        .get("fn_name")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::template(format!("Context for {} has no 'fn_name'", op.label())))?
        .to_string();
    let source = templates.render_operation(&context)?;
    Ok(GeneratedUnit {
        file_name: format!("{}.{}", identifier, config.file_extension),
        identifier,
        source,
        operation: op.label(),
    })
}

/// Compile every operation of `document` in document order.
///
/// Units deriving the same identifier are resolved per `config.collision_policy`:
/// the later unit takes the earlier one's place, unless the policy is
/// [`CollisionPolicy::Error`].
pub fn compile_units(
    document: &ApiDocument,
    config: &Config,
    templates: &TemplateManager,
) -> Result<(Vec<GeneratedUnit>, Vec<String>)> {
    let builder = TypeScriptEndpointContextBuilder::new(document, config.base_url_expression());
    let mut units: Vec<GeneratedUnit> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut overwritten = Vec::new();

    for op in document.operations() {
        let unit = compile_unit(&builder, op, config, templates)?;

        match positions.get(&unit.identifier) {
            Some(&index) => {
                let previous = &units[index];
                match config.collision_policy {
                    CollisionPolicy::Error => {
                        return Err(Error::IdentifierCollision {
                            identifier: unit.identifier,
                            first: previous.operation.clone(),
                            second: unit.operation,
                        });
                    }
                    CollisionPolicy::Warn => log::warn!(
                        "{} and {} both derive '{}'; keeping {}",
                        previous.operation,
                        unit.operation,
                        unit.identifier,
                        unit.operation
                    ),
                    CollisionPolicy::Overwrite => {}
                }
                overwritten.push(previous.operation.clone());
                units[index] = unit;
            }
            None => {
                positions.insert(unit.identifier.clone(), units.len());
                units.push(unit);
            }
        }
    }

    Ok((units, overwritten))
}

/// Source of an index module re-exporting every unit
pub fn render_index(units: &[GeneratedUnit]) -> String {
    units
        .iter()
        .map(|unit| format!("export {{ {0} }} from \"./{0}\";\n", unit.identifier))
        .collect()
}

/// Write units (and optionally the index) into `output_dir`, creating it if needed
pub async fn write_units(
    units: &[GeneratedUnit],
    output_dir: &Path,
    emit_index: bool,
    file_extension: &str,
) -> Result<Vec<PathBuf>> {
    if !output_dir.exists() {
        log::debug!("Creating output directory: {}", output_dir.display());
        fs::create_dir_all(output_dir).await?;
    }

    let mut written = Vec::new();
    for unit in units {
        let path = output_dir.join(&unit.file_name);
        log::debug!("Writing {} to {}", unit.operation, path.display());
        fs::write(&path, &unit.source).await?;
        written.push(path);
    }

    if emit_index {
        let path = output_dir.join(format!("index.{file_extension}"));
        fs::write(&path, render_index(units)).await?;
        written.push(path);
    }

    Ok(written)
}

/// Generate clients for an already loaded document
pub async fn generate_from_document(
    document: &ApiDocument,
    config: &Config,
) -> Result<GenerationSummary> {
    config.validate()?;
    let templates = TemplateManager::from_config(config).await?;
    let (units, overwritten) = compile_units(document, config, &templates)?;

    let output_dir = PathBuf::from(&config.output_dir);
    let files = write_units(&units, &output_dir, config.emit_index, &config.file_extension).await?;
    log::info!(
        "Generated {} client functions in {}",
        units.len(),
        output_dir.display()
    );

    Ok(GenerationSummary {
        output_dir,
        files,
        overwritten,
    })
}

/// Main entry point for code generation
pub async fn generate(config: &Config) -> Result<GenerationSummary> {
    // 1. Load the description
    let document = ApiDocument::from_file_or_url(&config.openapi_schema_path).await?;
    log::info!(
        "Loaded {} {} with {} operations",
        document.title().unwrap_or("untitled API"),
        document.version().unwrap_or(""),
        document.operations().len()
    );

    // 2. Compile and write
    generate_from_document(&document, config).await
}
