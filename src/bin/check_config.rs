//! Load the cache coordinator configuration and print its sanitized form.
//!
//! Usage: `check_config [CONFIG_DIR] [ENVIRONMENT]`

use anyhow::Context;
use cache_coordinator::config::ConfigManager;
use cache_coordinator::invalidation::CoordinatorBootstrap;
use std::path::PathBuf;

// Lazy database pools need a runtime to spawn their maintenance tasks
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let config_dir = args.next().map(PathBuf::from);
    let environment = args.next();

    let manager = match environment {
        Some(environment) => ConfigManager::load_from_directory_with_env(config_dir, &environment),
        None => ConfigManager::load_from_directory(config_dir),
    }
    .context("failed to load cache coordinator configuration")?;

    println!("🔍 Environment: {}", manager.environment());
    println!("📁 Config directory: {}", manager.config_directory().display());
    println!(
        "{}",
        serde_json::to_string_pretty(&manager.debug_config())
            .context("failed to render configuration")?
    );

    let coordinator = CoordinatorBootstrap::from_config_manager(&manager)
        .context("configuration does not produce a valid coordinator")?;
    println!(
        "✅ {} backend(s) registered: {}",
        coordinator.registry().len(),
        coordinator.registry().names().join(", ")
    );
    Ok(())
}
