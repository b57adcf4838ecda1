use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use node_manager::config::{load_config, LoggingConfig};
use node_manager::health::ReadinessProber;
use node_manager::http::RESET_CC_PATH;
use node_manager::observability::logging;

#[derive(Parser)]
#[command(name = "manager-cli")]
#[command(about = "Management CLI for the node manager", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the operator's /healthz (exit status 0 when ready)
    Ready {
        #[arg(short, long, default_value = "127.0.0.1:13009")]
        address: String,
    },
    /// Reset the block reader's continuity checker
    ResetCc {
        #[arg(short, long, default_value = "127.0.0.1:13009")]
        address: String,
    },
    /// Load and validate a config file, then print the effective config
    CheckConfig { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    logging::init(&LoggingConfig {
        filter: "warn".to_string(),
    });

    let cli = Cli::parse();

    match cli.command {
        Commands::Ready { address } => {
            let prober = ReadinessProber::new(&address);
            if prober.is_ready().await {
                println!("ready");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("not ready");
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::ResetCc { address } => {
            let res = reqwest::get(format!("http://{}{}", address, RESET_CC_PATH)).await?;
            let status = res.status();
            let body = res.text().await?;
            if !status.is_success() {
                eprintln!("Error: manager API returned status {}", status);
                eprintln!("Response: {}", body);
                return Ok(ExitCode::FAILURE);
            }
            println!("{}", body);
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckConfig { path } => {
            let config = load_config(&path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
