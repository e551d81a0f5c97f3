//! Print the OpenAPI document as YAML or JSON.

use std::io::Write;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use storefront::ApiDoc;
use utoipa::OpenApi;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    #[default]
    Yaml,
    Json,
}

/// `openapi-dump` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "openapi-dump",
    about = "Write the storefront OpenAPI document to stdout",
    version
)]
struct CliArgs {
    /// Output encoding.
    #[arg(long, value_enum, default_value_t = Format::Yaml)]
    format: Format,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let doc = ApiDoc::openapi();
    let rendered = match args.format {
        Format::Yaml => doc.to_yaml().wrap_err("serialise OpenAPI document as YAML")?,
        Format::Json => doc
            .to_pretty_json()
            .wrap_err("serialise OpenAPI document as JSON")?,
    };
    std::io::stdout()
        .lock()
        .write_all(rendered.as_bytes())
        .wrap_err("write OpenAPI document")?;
    Ok(())
}
