use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use georss::catalog::StaticCatalog;
use georss::config::Config;
use georss::feed::{
    FeatureRecord, FeedMetadata, FeedRequest, FormatOptions, GeoRssOutputFormat, Gml3Encoder,
    TypeName, FORMAT_NAME,
};
use georss::templates::AttributeTemplates;

/// Get the default config file path (~/.config/georss/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("georss")
        .join("config.toml"))
}

/// Split a `KEY=VALUE` format option.
fn parse_format_option(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// Read one feature collection: a JSON array of feature records.
fn read_collection(path: &Path) -> Result<Vec<FeatureRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open input '{}'", path.display()))?;
    let features: Vec<FeatureRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse features in '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), count = features.len(), "Read feature collection");
    Ok(features)
}

#[derive(Parser, Debug)]
#[command(name = "georss", about = "Encode feature collections as GeoRSS feeds")]
struct Args {
    /// Config file (defaults to ~/.config/georss/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Service base URL used for feed and item links
    #[arg(long, value_name = "URL", default_value = "http://localhost:8080/geoserver/")]
    base_url: String,

    /// Requested feature type(s), as prefix:name
    #[arg(long = "type-name", value_name = "PREFIX:NAME", required = true)]
    type_names: Vec<String>,

    /// Namespace URI bound to the type name prefixes
    #[arg(long, value_name = "URI", default_value = "")]
    namespace: String,

    /// Output format name echoed into the feed link
    #[arg(long, value_name = "NAME", default_value = FORMAT_NAME)]
    output_format: String,

    /// Format option, e.g. -o encoding=gml or -o continuation=true
    #[arg(short = 'o', long = "format-option", value_name = "KEY=VALUE", value_parser = parse_format_option)]
    format_options: Vec<(String, String)>,

    /// Write the feed here instead of stdout
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Feature collection files (JSON arrays), encoded in order
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from '{}'", config_path.display()))?;

    let collections = args
        .inputs
        .iter()
        .map(|path| read_collection(path))
        .collect::<Result<Vec<_>>>()?;

    let request = FeedRequest {
        base_url: args.base_url.clone(),
        output_format: args.output_format.clone(),
        queries: args
            .type_names
            .iter()
            .map(|name| TypeName::parse(name, &args.namespace))
            .collect(),
        format_options: args.format_options.iter().cloned().collect::<FormatOptions>(),
    };

    let templates = AttributeTemplates::new(config.templates.clone(), &args.base_url);
    let catalog = StaticCatalog::new(config.catalog.clone());
    let metadata = FeedMetadata::new(&templates, &catalog, &config.system_name);
    let format = GeoRssOutputFormat::new(metadata, &Gml3Encoder, config.default_encoding);

    let summary = match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output '{}'", path.display()))?;
            format.write(&request, &collections, BufWriter::new(file))
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            let result = format.write(&request, &collections, &mut out);
            out.flush().context("Failed to flush stdout")?;
            result
        }
    };

    let summary = match summary {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "Feed encoding failed");
            return Err(e.into());
        }
    };

    tracing::info!(
        format = format.name(),
        mime = format.mime_type(),
        items = summary.items,
        continuations = summary.continuations,
        skipped = summary.skipped,
        "Feed written"
    );
    Ok(())
}
