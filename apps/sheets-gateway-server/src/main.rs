mod config;
mod logging;
mod server;
mod shutdown;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use sheets_gateway::SheetsGateway;

use crate::config::AppConfig;

/// Sheets Gateway - REST API over Google Sheets
#[derive(Parser)]
#[command(name = "sheets-gateway-server")]
#[command(about = "Sheets Gateway - REST API over Google Sheets")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and credentials, then exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = cli.config.as_deref()
        && !Path::new(path).is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    // defaults -> YAML (if provided) -> env (APP__*) -> CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.port, cli.verbose)?;
    config.validate()?;

    logging::init_logging(&config.logging)?;

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    config.bind_addr()?;
    SheetsGateway::init(&config.sheets)?;
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Sheets Gateway starting");

    let addr = config.bind_addr()?;
    let gateway =
        SheetsGateway::init(&config.sheets).context("failed to initialize sheets gateway")?;
    let router = server::apply_middleware_stack(gateway.router(), &config.server);

    server::serve(addr, router, shutdown::shutdown_signal()).await?;
    tracing::info!("Sheets Gateway stopped");
    Ok(())
}
