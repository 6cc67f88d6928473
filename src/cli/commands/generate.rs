//! `drd` - render the registry into a directory or depot page

use console::style;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::category::{categorize, UnmappedPolicy};
use crate::core::config::Config;
use crate::core::loader::load_rows;
use crate::core::normalize::{normalize, MalformedPolicy, OrderingMode};
use crate::render::{Layout, TemplateRenderer};

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Input file containing entity data (CSV)
    pub input: PathBuf,

    /// Destination file to write to. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Listing to produce
    #[arg(long, value_enum, default_value_t = Layout::Directory)]
    pub layout: Layout,

    /// Render with this Tera template instead of the built-in one
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Handling of types that no category gathers
    #[arg(long, value_enum)]
    pub unmapped: Option<UnmappedPolicy>,

    /// Order of entities within a type
    #[arg(long, value_enum)]
    pub ordering: Option<OrderingMode>,

    /// Handling of rows whose Type field cannot be read
    #[arg(long, value_enum)]
    pub on_malformed: Option<MalformedPolicy>,
}

pub fn run(args: GenerateArgs, global: &GlobalOpts) -> Result<()> {
    let mut config = Config::load(global.config.as_deref())?;
    config.merge(Config {
        unmapped: args.unmapped,
        ordering: args.ordering,
        on_malformed: args.on_malformed,
        ..Config::default()
    });

    let options = config.normalize_options();
    let rows = load_rows(&args.input, options.on_malformed)?;
    let row_count = rows.len();
    let by_type = normalize(rows, &options)?;

    let (text, summary) = match args.layout {
        Layout::Directory => {
            let listing = categorize(&by_type, &config.scheme(), &config.categorize_options())?;
            let text = match global.format {
                OutputFormat::Json => to_json(&listing)?,
                OutputFormat::Template => {
                    renderer(&args, &config)?.render_directory(&listing)?
                }
            };
            let summary = format!(
                "{} entries in {} categories",
                listing.entity_count(),
                listing.len()
            );
            (text, summary)
        }
        Layout::Depot => {
            let text = match global.format {
                OutputFormat::Json => to_json(&by_type)?,
                OutputFormat::Template => renderer(&args, &config)?.render_depot(&by_type)?,
            };
            let summary = format!(
                "{} entries in {} types",
                by_type.association_count(),
                by_type.len()
            );
            (text, summary)
        }
    };

    write_output(args.output.as_deref(), &text)?;

    let destination = args
        .output
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    info!(rows = row_count, layout = ?args.layout, "{summary} written to {destination}");

    if !global.quiet {
        eprintln!(
            "{} Wrote {} to {}",
            style("✓").green(),
            summary,
            style(destination).yellow()
        );
    }

    Ok(())
}

fn renderer(args: &GenerateArgs, config: &Config) -> Result<TemplateRenderer> {
    let renderer = TemplateRenderer::new(&config.wiki_base_url())?;
    match args.template {
        Some(ref path) => Ok(renderer.with_template_file(path)?),
        None => Ok(renderer),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).into_diagnostic()?;
    json.push('\n');
    Ok(json)
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("cannot create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            writer
                .write_all(text.as_bytes())
                .and_then(|_| writer.flush())
                .into_diagnostic()
                .wrap_err_with(|| format!("cannot write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|_| stdout.flush())
                .into_diagnostic()
        }
    }
}
