//! clientgen CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use clientgen_core::{CollisionPolicy, Config};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "clientgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate one TypeScript fetch function per operation of an OpenAPI spec
    Generate {
        /// Configuration file (YAML, or TOML when it ends in .toml)
        ///
        /// Flags given on the command line override values from the file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Path or URL to the OpenAPI spec (YAML or JSON)
        ///
        /// Example: --schema-path path/to/openapi.yaml
        /// Example: --schema-path https://example.com/openapi.json
        #[arg(long)]
        schema_path: Option<String>,
        /// Output directory for generated code
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// TypeScript expression generated code reads the base address from
        #[arg(long)]
        base_url_expr: Option<String>,
        /// Fixed base address embedded into generated code
        #[arg(long)]
        base_url: Option<Url>,
        /// What to do when two operations derive the same name (overwrite, warn, error)
        #[arg(long)]
        collision_policy: Option<CollisionPolicy>,
        /// Also write an index module re-exporting every function
        #[arg(long)]
        emit_index: bool,
        /// Directory holding a custom operation.ts.tera
        #[arg(long)]
        template_dir: Option<PathBuf>,
        /// Regenerate whenever the spec file changes
        #[arg(long)]
        watch: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            config,
            schema_path,
            output_dir,
            base_url_expr,
            base_url,
            collision_policy,
            emit_index,
            template_dir,
            watch,
        } => {
            let mut resolved = match &config {
                Some(path) => Config::from_file(path)
                    .await
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => {
                    let schema_path = schema_path
                        .clone()
                        .context("--schema-path is required without --config")?;
                    let output_dir = output_dir
                        .clone()
                        .context("--output-dir is required without --config")?;
                    Config::new(schema_path, output_dir.to_string_lossy())
                }
            };

            if let Some(schema_path) = schema_path {
                resolved.openapi_schema_path = schema_path;
            }
            if let Some(output_dir) = output_dir {
                resolved.output_dir = output_dir.to_string_lossy().to_string();
            }
            if let Some(expr) = base_url_expr {
                resolved.base_url_expr = expr;
            }
            if base_url.is_some() {
                resolved.base_url = base_url;
            }
            if let Some(policy) = collision_policy {
                resolved.collision_policy = policy;
            }
            if emit_index {
                resolved.emit_index = true;
            }
            if let Some(dir) = template_dir {
                resolved.template_dir = Some(dir.to_string_lossy().to_string());
            }

            tracing::debug!(?resolved, "Resolved configuration");
            run(&resolved).await?;

            if watch {
                watch_schema(&resolved).await?;
            }
        }
    }
    Ok(())
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let summary = clientgen_core::generate(config).await.with_context(|| {
        format!(
            "Failed to generate clients from {}",
            config.openapi_schema_path
        )
    })?;

    for name in &summary.overwritten {
        tracing::info!("Output of {} was replaced by a later operation", name);
    }
    println!(
        "✅ Successfully generated {} files in: {}",
        summary.files.len(),
        summary.output_dir.display()
    );
    Ok(())
}

async fn watch_schema(config: &Config) -> anyhow::Result<()> {
    let location = &config.openapi_schema_path;
    if location.starts_with("http://") || location.starts_with("https://") {
        anyhow::bail!("--watch needs a local spec file, got {location}");
    }
    let schema = tokio::fs::canonicalize(location)
        .await
        .with_context(|| format!("Failed to resolve {location}"))?;
    let parent = schema
        .parent()
        .context("Spec file has no parent directory")?
        .to_path_buf();

    let (tx, mut rx) = tokio::sync::mpsc::channel::<notify::Result<Event>>(16);
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        // Receiver gone means we are shutting down
        let _ = tx.blocking_send(res);
    })?;
    // Editors often replace the file, so watch its directory
    watcher.watch(&parent, RecursiveMode::NonRecursive)?;
    tracing::info!("Watching {} for changes (Ctrl-C to stop)", schema.display());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(res) = rx.recv() => match res {
                Ok(event) if touches(&event, &schema) => {
                    tracing::info!("{} changed, regenerating", schema.display());
                    if let Err(e) = run(config).await {
                        tracing::error!("{:#}", e);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Watch error: {}", e),
            },
        }
    }
    Ok(())
}

fn touches(event: &Event, schema: &Path) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|p| p == schema || p.file_name() == schema.file_name())
}
