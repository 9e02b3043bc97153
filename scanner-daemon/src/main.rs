mod runner;

use clap::Parser;
use scanner_core::config::load_config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "wifi-scanner")]
#[command(version, about = "Wi-Fi network survey scanner for macOS")]
pub struct Cli {
    /// Network interface to use (default: auto-detect)
    #[arg(short, long)]
    interface: Option<String>,

    /// Run in headless mode (no HTTP API, log results to the console)
    #[arg(short = 'H', long)]
    headless: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Path to a TOML config file (default: embedded config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the simulated scan source and skip privilege checks
    #[arg(long)]
    mock: bool,

    /// Headless mode: write a report here when the scan is stopped
    #[arg(long)]
    export: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 1. 初始化日志（这是入口点的职责）
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::debug!("Debug mode enabled");

    // 2. 加载配置并运行
    let result = match load_config(cli.config.as_deref()) {
        Ok(config) => runner::run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    // 3. 处理顶层错误
    if let Err(e) = result {
        tracing::error!("❌ {:#}", e);
        std::process::exit(1);
    }
    tracing::info!("Application terminated");
}
