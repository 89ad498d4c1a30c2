//! `rustedprompt config` — Configuration management commands.

use anyhow::{Context, bail};
use rustedprompt_config::AppConfig;
use std::path::Path;

pub fn show(config_path: &Path) -> anyhow::Result<()> {
    let config = AppConfig::load_with(config_path).context("Failed to load config")?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub fn path(config_path: &Path) {
    println!("{}", config_path.display());
}

pub fn init(config_path: &Path) -> anyhow::Result<()> {
    if config_path.exists() {
        bail!(
            "{} already exists; remove it first to regenerate",
            config_path.display()
        );
    }

    if let Some(dir) = config_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    std::fs::write(config_path, AppConfig::default_toml())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Wrote default config to {}", config_path.display());
    Ok(())
}
