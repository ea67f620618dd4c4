//! Shared test utilities for fleetdeck CLI integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Point every run at a throwaway settings file.
//!
//! Invariants / Assumptions:
//! - `FLEETDECK_API_TOKEN` is set to "test-token" unless overridden.
//! - No test ever touches the user's real settings file.

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// A hermetic `fleetdeck` command and the directory holding its settings file.
pub struct Hermetic {
    pub cmd: Command,
    pub dir: TempDir,
}

impl Hermetic {
    #[allow(dead_code)]
    pub fn settings_path(&self) -> PathBuf {
        self.dir.path().join("settings.json")
    }
}

/// Returns a hermetic `fleetdeck` command for integration testing.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - `FLEETDECK_API_TOKEN` is set to a dummy value to satisfy client setup.
/// - Settings go to a fresh temp directory.
/// - Other env vars are cleared to ensure no leakage from the host.
pub fn fleetdeck_cmd() -> Hermetic {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("fleetdeck");

    cmd.env("DOTENV_DISABLED", "1");
    cmd.env("FLEETDECK_API_TOKEN", "test-token");
    cmd.env("FLEETDECK_SETTINGS_PATH", dir.path().join("settings.json"));

    cmd.env_remove("FLEETDECK_BASE_URL")
        .env_remove("FLEETDECK_ENVIRONMENT_ID")
        .env_remove("FLEETDECK_SCOPES")
        .env_remove("FLEETDECK_TIMEOUT")
        .env_remove("FLEETDECK_MAX_RETRIES")
        .env_remove("FLEETDECK_SKIP_VERIFY");

    Hermetic { cmd, dir }
}

/// Same as [`fleetdeck_cmd`] with `FLEETDECK_BASE_URL` set.
#[allow(dead_code)]
pub fn fleetdeck_cmd_with_base_url(base_url: &str) -> Hermetic {
    let mut h = fleetdeck_cmd();
    h.cmd.env("FLEETDECK_BASE_URL", base_url);
    h
}
