//! Write the vending API's OpenAPI document as pretty-printed JSON.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use backend::ApiDoc;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use utoipa::OpenApi;

/// `openapi-dump` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "openapi-dump", about = "Print the OpenAPI document", version)]
struct CliArgs {
    /// Write to this file instead of standard output.
    #[arg(long, short, value_name = "path")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let document = render()?;
    match args.output {
        Some(path) => fs::write(&path, document)
            .wrap_err_with(|| format!("write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn render() -> Result<String> {
    ApiDoc::openapi()
        .to_pretty_json()
        .wrap_err("serialise OpenAPI document")
}
