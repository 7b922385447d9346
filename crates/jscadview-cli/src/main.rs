//! jscadview CLI - run the stateless authoring actions from a shell

mod terminal;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use jscadview_authoring::{CompletionProvider, import_polygon};
use jscadview_core::config::PreviewConfig;
use jscadview_engine::StlExporter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use terminal::{StderrChannel, TracingNotifier};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "jscadview")]
#[command(about = "Authoring tools for JSCAD modeling scripts", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a polygon snippet built from the first <polygon> in an SVG file
    ImportSvg {
        /// SVG file to read
        file: PathBuf,
    },

    /// Export a script as STL with the configured tool
    Export {
        /// Script file to export
        file: PathBuf,
    },

    /// List the completion catalogue, or show one entry
    Completions {
        /// Label to resolve
        label: Option<String>,
    },

    /// Print the effective settings as JSON
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries snippets and JSON, so logs go to stderr
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ImportSvg { file } => run_import_svg(&file)?,
        Commands::Export { file } => run_export(&file, cli.config.as_deref()).await?,
        Commands::Completions { label } => run_completions(label.as_deref())?,
        Commands::Config => run_config(cli.config.as_deref())?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PreviewConfig> {
    match path {
        // An explicit file must be valid
        Some(path) => PreviewConfig::load(path).context("Failed to load settings"),
        None => Ok(PreviewConfig::load_or_default(None)),
    }
}

fn run_import_svg(file: &Path) -> Result<()> {
    let snippet =
        import_polygon(file).with_context(|| format!("Failed to import {}", file.display()))?;
    println!("{}", snippet);
    Ok(())
}

async fn run_export(file: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    if !file.exists() {
        bail!("File not found: {}", file.display());
    }

    let exporter = StlExporter::new(
        config.export,
        Arc::new(StderrChannel),
        Arc::new(TracingNotifier),
    );
    let report = exporter.export(file).await;

    if !report.success {
        bail!("{}", report);
    }
    println!("{}", report);
    Ok(())
}

fn run_completions(label: Option<&str>) -> Result<()> {
    let provider = CompletionProvider::standard();

    let Some(label) = label else {
        for item in provider.provide() {
            println!("{:<12} {}", item.label, item.documentation);
        }
        return Ok(());
    };

    let item = provider
        .resolve(label)
        .with_context(|| format!("No completion named '{}'", label))?;
    println!("{}", item.label);
    if let Some(detail) = item.detail {
        println!("  {}", detail);
    }
    println!("  {}", item.documentation);

    for signature in provider.signature_help().iter().filter(|s| s.label == label) {
        let params: Vec<_> = signature.parameters.iter().map(|p| p.label).collect();
        println!("  {}({})", signature.label, params.join(", "));
    }
    Ok(())
}

fn run_config(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
