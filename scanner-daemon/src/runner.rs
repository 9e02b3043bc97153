use crate::Cli;
use anyhow::Context;
use scanner_core::backends::FallbackScanner;
use scanner_core::backends::airport::AirportTool;
use scanner_core::backends::mock::MockSource;
use scanner_core::backends::system_profiler::SystemProfilerTool;
use scanner_core::config::AppConfig;
use scanner_core::interfaces::{InterfaceMode, current_channel, interface_mode};
use scanner_core::normalize::Normalizer;
use scanner_core::permissions::{StartupConfig, run_startup_checks};
use scanner_core::traits::ScanSource;
use scanner_core::view::{ScanViewHandle, ViewSettings, spawn_view};
use scanner_core::web_server;
use scanner_core::worker::PollConfig;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

const MOCK_INTERFACE: &str = "mock0";

/// 启动检查 -> 创建视图 -> 按模式运行（HTTP API 或 headless）
pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("🚀 Starting Wi-Fi scanner...");

    let requested = cli.interface.clone().or_else(|| config.scanner.interface.clone());
    let (interface, source): (String, Arc<dyn ScanSource>) = if cli.mock {
        tracing::info!("🤖 Using mock scan source, privilege checks skipped");
        let interface = requested.unwrap_or_else(|| MOCK_INTERFACE.to_string());
        (interface, Arc::new(MockSource::new()))
    } else {
        let report = run_startup_checks(&StartupConfig {
            require_root: config.require_root,
            ifconfig_path: config.tools.ifconfig_path.clone(),
            networksetup_path: config.tools.networksetup_path.clone(),
            csrutil_path: config.tools.csrutil_path.clone(),
            capture_tool: config.tools.capture_tool.clone(),
            requested_interface: requested,
        })
        .await
        .context("Failed to initialize application")?;
        log_interface_state(&config, &report.selected_interface).await;

        let source = FallbackScanner::new(
            AirportTool::new(config.tools.airport_path.clone()),
            SystemProfilerTool::new(config.tools.system_profiler_path.clone()),
        );
        (report.selected_interface, Arc::new(source))
    };

    let vendors = config.vendor_table();
    tracing::debug!(entries = vendors.len(), "Vendor table loaded");

    let view = spawn_view(ViewSettings {
        source,
        normalizer: Normalizer::new(Arc::new(vendors)),
        poll: PollConfig {
            interval: config.scanner.poll_interval,
            channel_filter: config.scanner.channel_filter,
        },
        stop_grace: config.scanner.stop_grace,
        interface,
        export_dir: config.export_dir.clone(),
    });

    if cli.headless {
        tracing::info!("Running in headless mode...");
        run_headless(view, cli.export).await
    } else {
        run_server(view, &config).await
    }
}

/// 非致命：仅记录接口当前信道与模式
async fn log_interface_state(config: &AppConfig, interface: &str) {
    match interface_mode(&config.tools.ifconfig_path, interface).await {
        Ok(InterfaceMode::Monitor) => tracing::info!(interface, "Interface reports monitor mode"),
        Ok(InterfaceMode::Managed) => tracing::debug!(interface, "Interface in managed mode"),
        Err(e) => tracing::warn!(interface, error = %e, "Could not read interface mode"),
    }
    if let Some(channel) = current_channel(&config.tools.airport_path).await {
        tracing::info!(interface, channel, "Current channel");
    }
}

async fn run_server(view: ScanViewHandle, config: &AppConfig) -> anyhow::Result<()> {
    view.start(false).await?;
    let server = web_server::start_web_server(view.clone(), config.tools.clone(), config.bind_addr);

    tokio::select! {
        res = server => {
            res.context("web server task failed")??;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Application interrupted by user");
        }
    }
    view.shutdown().await?;
    Ok(())
}

/// Polls until Ctrl-C, logging each newly seen network.
async fn run_headless(view: ScanViewHandle, export: Option<PathBuf>) -> anyhow::Result<()> {
    let mut updates = view.subscribe();
    let mut seen: HashSet<String> = HashSet::new();
    view.start(false).await?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                for record in snapshot.iter() {
                    if seen.insert(record.hardware_address.clone()) {
                        let lock = if record.is_open() { "🔓" } else { "🔒" };
                        tracing::info!(
                            "📶 {:<24} {}  ch {:>3}  {:>4} dBm  {:>3}%  {} {}  [{}]",
                            record.name,
                            record.hardware_address,
                            record.channel,
                            record.signal_level,
                            record.quality_percent,
                            lock,
                            record.security_label,
                            record.vendor_name,
                        );
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Application interrupted by user");
                break;
            }
        }
    }

    view.stop().await?;
    if let Some(path) = export {
        let written = view.export(Some(path)).await.context("Failed to export scan results")?;
        tracing::info!("Results exported to {}", written.display());
    }
    view.shutdown().await?;
    Ok(())
}
