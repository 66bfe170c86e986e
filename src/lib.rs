pub mod core;
pub mod metrics;
pub mod providers;
pub mod server;
pub mod store;

use crate::core::config::AppConfig;
use anyhow::Result;
use std::net::SocketAddr;
use tracing::{debug, info};

pub enum AppCommand {
    Serve { listen: Option<SocketAddr> },
    Convert { from: String, to: String, amount: f64 },
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        listen_addr = %config.server.listen_addr,
        provider_enabled = config.provider.enabled,
        provider_url = %config.provider.base_url,
        "Loaded config"
    );
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxgate starting...");
    let mut config = load_config(config_path)?;

    match command {
        AppCommand::Serve { listen } => {
            if let Some(addr) = listen {
                config.server.listen_addr = addr;
            }
            server::serve(&config).await
        }
        AppCommand::Convert { from, to, amount } => {
            let resolver = server::build_resolver(&config)?;
            let result = resolver.resolve(&from, &to, amount).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}
