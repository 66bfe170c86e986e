use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxgate::core::log::init_logging;
use std::net::SocketAddr;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxgate::AppCommand {
    fn from(cmd: Commands) -> fxgate::AppCommand {
        match cmd {
            Commands::Serve { listen } => fxgate::AppCommand::Serve { listen },
            Commands::Convert { from, to, amount } => {
                fxgate::AppCommand::Convert { from, to, amount }
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Run the HTTP gateway
    Serve {
        /// Address to listen on, overrides the configuration file
        #[arg(short, long)]
        listen: Option<SocketAddr>,
    },
    /// Convert a single amount and print the result as JSON
    Convert {
        from: String,
        to: String,
        #[arg(default_value_t = 1.0, allow_negative_numbers = true)]
        amount: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => fxgate::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = fxgate::core::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
server:
  listen_addr: "0.0.0.0:8000"
  # static_dir: "frontend"

provider:
  enabled: true
  base_url: "https://api.exchangerate.host"
  timeout_secs: 5
  # access_key: "your-key"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
