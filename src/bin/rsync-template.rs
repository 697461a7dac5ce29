//! Renders the Deployment, ConfigMap and Service for an `RsyncSource` manifest as a yaml stream.
//!
//! Usage: `rsync-template [path]`, reading from stdin when no path (or `-`) is given.
use anyhow::{Context, Result};
use rsync_source::prelude::*;

use std::io::Read;

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        log::error!("Failed to render rsync source: {:?}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let input = read_input(std::env::args().nth(1))?;
    let source: RsyncSource =
        rsync_source::serde_yaml::from_str(&input).context("Failed to parse RsyncSource")?;

    let template_config = TemplateConfig::from_rsync_source(&source)?;
    let manifest = template_config
        .build()
        .to_manifest()
        .context("Failed to serialize children")?;
    print!("{}", manifest);
    Ok(())
}

fn read_input(path: Option<String>) -> Result<String> {
    match path.as_deref() {
        None | Some("-") => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read '{}'", path))
        }
    }
}
