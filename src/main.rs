use anyhow::Context;
use env_logger::Env;
use std::path::Path;

use orrery::config::{OrreryConfig, DEFAULT_CONFIG_PATH};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = OrreryConfig::load(Path::new(&path))
        .with_context(|| format!("Failed to load settings from '{}'", path))?;
    log::info!("Starting '{}'", config.window.title);

    orrery::app::run(config)
}
