//! Print the OpenAPI document as JSON, to stdout or a file.

use std::path::PathBuf;

use backend::doc::ApiDoc;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use utoipa::OpenApi;

/// Export the OpenAPI document.
#[derive(Debug, Parser)]
#[command(name = "openapi-dump")]
struct Cli {
    /// Write to this path instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .wrap_err("serialize OpenAPI document")?;
    match cli.output {
        Some(path) => std::fs::write(&path, json)
            .wrap_err_with(|| format!("write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
