//! rpatch - Inject a value into targeted fields of a document stream.
//!
//! Reads a YAML document stream, renders a source value from a file (or
//! takes it inline from the config), and stamps it into every field selected
//! by the configured targets.

use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Deserialize;

use resource_patch::fieldpath::{lookup, split_path};
use resource_patch::node::Document;
use resource_patch::patch::{apply_transform, SetValue, TargetSelector};
use resource_patch::render::{FileRenderer, RenderOptions, Renderer};

#[derive(Debug, Parser)]
#[command(name = "rpatch", version, about = "Inject a value into targeted fields of a document stream")]
struct Cli {
    /// Path to the injection config (source + targets).
    #[arg(short, long)]
    config: PathBuf,

    /// Document stream to patch. Reads stdin when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output location. Use '-' for stdout.
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Inject the rendered source as a string scalar instead of a tree.
    #[arg(long)]
    raw_string: bool,
}

/// Top-level injection configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Config {
    source: Option<SourceSpec>,
    targets: Vec<TargetSelector>,
}

/// Where the injected value comes from: a rendered file or an inline value.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SourceSpec {
    path: Option<PathBuf>,
    value: Option<serde_yaml::Value>,
    field_path: String,
    options: RenderOptions,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_yaml::from_str(&config_text)?;

    let input = match &cli.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let mut documents = Document::parse_all(&input)?;

    let source = config
        .source
        .as_ref()
        .ok_or("source must be specified")?;
    let mut value = render_source(source)?;
    if cli.raw_string {
        value = Document::string(value.to_yaml_string()?);
    }

    apply_transform(&SetValue::new(value), &mut documents, &config.targets)?;

    let rendered = Document::render_all(&documents)?;
    match cli.output.as_str() {
        "-" => io::stdout().write_all(rendered.as_bytes())?,
        path => fs::write(path, rendered)?,
    }
    Ok(())
}

/// Renders the source spec down to the single value to inject.
fn render_source(source: &SourceSpec) -> Result<Document, Box<dyn Error>> {
    let doc = match (&source.value, &source.path) {
        (Some(value), _) => Document::from_yaml_value(value)?,
        (None, Some(path)) => {
            let rendered = FileRenderer.render(path, &source.options)?;
            match <[Document; 1]>::try_from(rendered) {
                Ok([doc]) => doc,
                Err(rendered) => {
                    return Err(format!(
                        "source {path:?} rendered {} documents where one was expected",
                        rendered.len()
                    )
                    .into())
                }
            }
        }
        (None, None) => return Err("source.path or source.value must be specified".into()),
    };

    if source.field_path.is_empty() {
        return Ok(doc);
    }
    let found = lookup(&doc, &split_path(&source.field_path));
    match found.as_slice() {
        [node] => Ok(doc.extract(*node)),
        _ => Err(format!(
            "field path {:?} did not resolve to one value in the rendered source",
            source.field_path
        )
        .into()),
    }
}
