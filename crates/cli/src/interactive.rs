//! User interaction utilities for the CLI.
//!
//! Responsibilities:
//! - Ask for confirmation before destructive bulk actions.
//!
//! Does NOT handle:
//! - Building the confirmation text (see `fleetdeck_table::PendingDelete`).

use anyhow::{Context, Result};
use fleetdeck_table::PendingDelete;

/// Prompt the user to confirm a pending bulk delete.
///
/// Returns `Ok(false)` when the user declines; the pending delete is then
/// simply dropped by the caller and nothing is sent.
pub fn confirm_delete(pending: &PendingDelete) -> Result<bool> {
    if let Some(warning) = pending.in_use_warning() {
        eprintln!("{warning}");
    }

    let confirmed = dialoguer::Confirm::new()
        .with_prompt(pending.message())
        .default(false)
        .interact()
        .context("Failed to read confirmation")?;

    if !confirmed {
        eprintln!("Delete cancelled.");
    }
    Ok(confirmed)
}
