//! `fleetdeck validate-deploy`: check deploy-from-template form values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fleetdeck_table::{DeployContext, DeployFormValues};
use serde::de::DeserializeOwned;

use crate::formatters::{OutputFormat, get_formatter};

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn run(values: PathBuf, context: Option<PathBuf>, output_format: OutputFormat) -> Result<()> {
    let values: DeployFormValues = read_json(&values)?;
    let context: DeployContext = match context {
        Some(path) => read_json(&path)?,
        None => DeployContext::default(),
    };

    match values.validate(&context) {
        Ok(()) => {
            println!("Deploy form is valid.");
            Ok(())
        }
        Err(errors) => {
            println!("{}", get_formatter(output_format).format_validation(&errors)?);
            Err(anyhow::Error::new(errors).context("Deploy form is invalid"))
        }
    }
}
