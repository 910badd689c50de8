//! Headless driver for the Grimoire HUD.
//!
//! Reads host events and control requests as JSON lines on stdin, feeds
//! them through a HUD session, and writes every published view model to
//! stdout. Logs go to stderr so stdout stays machine-readable.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `grimoire-config.yaml` (or `GRIMOIRE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Validate settings and build the in-memory host
//! 4. Spawn the session actor and the output writer
//! 5. Apply stdin commands until end of input
//! 6. Shut the session down and flush the last view

mod driver;
mod error;
mod protocol;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use grimoire_core::config::HudConfig;
use grimoire_core::host::StaticHost;
use grimoire_core::session::{HudSession, spawn_session};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::driver::Driver;
use crate::error::DriverError;
use crate::protocol::DriverConfig;

/// Config file used when `GRIMOIRE_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "grimoire-config.yaml";

/// Application entry point for the HUD driver.
///
/// # Errors
///
/// Returns an error if configuration is invalid, stdio fails, or the
/// session stops unexpectedly.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config_path = std::env::var("GRIMOIRE_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = load_config(&config_path)?;
    let driver_config = load_driver_config(&config_path)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging.level, config.logging.json);
    info!(path = %config_path.display(), "grimoire-hud starting");

    // 3. Validate settings and build the host.
    let settings = config
        .into_settings()
        .context("calendar configuration is invalid")?;
    info!(
        months = settings.calendar.month_names().len(),
        days_per_month = settings.calendar.days_per_month(),
        moons = settings.moons.len(),
        enabled = settings.display.enabled,
        "settings loaded"
    );
    let truncate_at = settings.display.truncate_at;

    let host = StaticHost {
        world_title: driver_config.world_title.clone(),
        scene: driver_config.initial_scene.clone(),
        ..StaticHost::at(driver_config.initial_world_time)
    }
    .shared();

    // 4. Spawn the session and the output writer.
    let (handle, session_task) = spawn_session(HudSession::new(host.clone(), settings));
    let writer = tokio::spawn(driver::forward_views(
        handle.subscribe(),
        tokio::io::stdout(),
        driver_config.output,
        truncate_at,
    ));

    // 5. Apply commands until stdin closes.
    let driver = Driver::new(host, handle.clone());
    let applied = driver::read_commands(&driver, BufReader::new(tokio::io::stdin())).await?;

    // 6. Shut down and flush.
    handle.shutdown().await.map_err(DriverError::from)?;
    drop(driver);
    drop(handle);
    session_task.await.map_err(|e| DriverError::Task {
        message: format!("session task: {e}"),
    })?;
    writer
        .await
        .map_err(|e| DriverError::Task {
            message: format!("output task: {e}"),
        })??;

    info!(applied, "grimoire-hud shutdown complete");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the config level.
fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load the overlay configuration, falling back to defaults when the file
/// does not exist.
fn load_config(path: &Path) -> Result<HudConfig, DriverError> {
    if path.exists() {
        Ok(HudConfig::from_file(path)?)
    } else {
        Ok(HudConfig::parse("")?)
    }
}

/// Load the `driver` section of the config file.
///
/// A missing file or missing section yields defaults.
fn load_driver_config(path: &Path) -> Result<DriverConfig, DriverError> {
    if !path.exists() {
        return Ok(DriverConfig::default());
    }
    let contents = std::fs::read_to_string(path)?;
    let raw: serde_yml::Value =
        serde_yml::from_str(&contents).map_err(|e| DriverError::DriverConfig {
            message: format!("failed to parse config YAML: {e}"),
        })?;

    raw.get("driver").map_or_else(
        || Ok(DriverConfig::default()),
        |section| {
            serde_yml::from_value(section.clone()).map_err(|e| DriverError::DriverConfig {
                message: format!("failed to parse driver config: {e}"),
            })
        },
    )
}
