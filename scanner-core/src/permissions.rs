//! Startup-time privilege and environment checks.
//!
//! These are the only fatal conditions in the application; the scan pipeline
//! itself never fails hard.

use crate::backends::utils::{binary_exists, run_tool};
use crate::interfaces::list_interfaces;
use crate::{Error, Result};
use serde::Serialize;

/// 启动检查所需的配置
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub require_root: bool,
    pub ifconfig_path: String,
    pub networksetup_path: String,
    pub csrutil_path: String,
    pub capture_tool: String,
    pub requested_interface: Option<String>,
}

/// A hardware port that `networksetup` reports as Wi-Fi.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WifiAdapter {
    pub port: String,
    pub device: String,
}

/// System Integrity Protection state from `csrutil status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SipStatus {
    Enabled,
    Disabled,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionReport {
    pub root: bool,
    pub network_access: bool,
    pub capture_tool: bool,
    pub wifi_adapters: Vec<WifiAdapter>,
    pub sip: SipStatus,
    pub interfaces: Vec<String>,
    pub selected_interface: String,
}

pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

/// Runs every startup check and picks the interface to use.
///
/// Missing root (when required), an unusable `ifconfig`, no interfaces, or an
/// unknown requested interface are fatal. A missing capture tool only warns.
pub async fn run_startup_checks(config: &StartupConfig) -> Result<PermissionReport> {
    let root = is_root();
    log_check("Root access", root);
    if config.require_root && !root {
        return Err(Error::Startup(
            "This application requires root privileges. Please run with sudo.".into(),
        ));
    }

    let interfaces = match list_interfaces(&config.ifconfig_path).await {
        Ok(interfaces) => interfaces,
        Err(e) => {
            log_check("Network interface access", false);
            return Err(Error::Startup(format!("Cannot enumerate network interfaces: {}", e)));
        }
    };
    log_check("Network interface access", true);

    let capture_tool = binary_exists(&config.capture_tool);
    log_check("Packet capture capability", capture_tool);

    let adapters = match wifi_adapters(&config.networksetup_path).await {
        Ok(adapters) => adapters,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to list hardware ports");
            Vec::new()
        }
    };
    log_check("Wi-Fi adapter", !adapters.is_empty());
    for adapter in &adapters {
        tracing::info!("  {} -> {}", adapter.port, adapter.device);
    }

    let sip = sip_status(&config.csrutil_path).await;
    match sip {
        SipStatus::Enabled => {
            tracing::warn!("System Integrity Protection (SIP) is enabled; some features may be limited")
        }
        SipStatus::Disabled => tracing::info!("System Integrity Protection (SIP) is disabled"),
        SipStatus::Unknown => tracing::warn!("Could not determine System Integrity Protection status"),
    }

    if interfaces.is_empty() {
        return Err(Error::Startup("No network interfaces found.".into()));
    }
    tracing::info!("Found {} network interface(s)", interfaces.len());
    for iface in &interfaces {
        tracing::info!("  - {}", iface);
    }

    let wifi_devices: Vec<String> = adapters.iter().map(|a| a.device.clone()).collect();
    let selected_interface =
        select_interface(config.requested_interface.as_deref(), &interfaces, &wifi_devices)?;
    tracing::info!("Using interface: {}", selected_interface);

    Ok(PermissionReport {
        root,
        network_access: true,
        capture_tool,
        wifi_adapters: adapters,
        sip,
        interfaces,
        selected_interface,
    })
}

/// The requested interface if it exists. Otherwise the first available
/// Wi-Fi device, falling back to the first available interface.
pub fn select_interface(
    requested: Option<&str>,
    available: &[String],
    wifi_devices: &[String],
) -> Result<String> {
    match requested {
        Some(name) if available.iter().any(|i| i == name) => Ok(name.to_string()),
        Some(name) => Err(Error::Startup(format!(
            "Interface '{}' not found. Available interfaces: {}",
            name,
            available.join(", ")
        ))),
        None => available
            .iter()
            .find(|i| wifi_devices.contains(*i))
            .or_else(|| available.first())
            .cloned()
            .ok_or_else(|| Error::Startup("No network interfaces found.".into())),
    }
}

/// Wi-Fi hardware ports from `networksetup -listallhardwareports`.
pub async fn wifi_adapters(networksetup: &str) -> Result<Vec<WifiAdapter>> {
    let stdout = run_tool(networksetup, &["-listallhardwareports"]).await?;
    Ok(parse_hardware_ports(&stdout))
}

/// Pairs each `Hardware Port:` line with the `Device:` line after it and
/// keeps the Wi-Fi ports (named `AirPort` on older systems).
pub fn parse_hardware_ports(output: &str) -> Vec<WifiAdapter> {
    let mut adapters = Vec::new();
    let mut port: Option<&str> = None;

    for line in output.lines().map(str::trim) {
        if let Some(name) = line.strip_prefix("Hardware Port:") {
            port = Some(name.trim());
        } else if let Some(device) = line.strip_prefix("Device:") {
            if let Some(name) = port.take().filter(|p| p.contains("Wi-Fi") || p.contains("AirPort")) {
                adapters.push(WifiAdapter {
                    port: name.to_string(),
                    device: device.trim().to_string(),
                });
            }
        }
    }
    adapters
}

/// SIP state; a failing `csrutil` is reported as `Unknown`, never as an error.
pub async fn sip_status(csrutil: &str) -> SipStatus {
    match run_tool(csrutil, &["status"]).await {
        Ok(stdout) => parse_sip_status(&stdout),
        Err(e) => {
            tracing::debug!(error = %e, "csrutil status failed");
            SipStatus::Unknown
        }
    }
}

pub fn parse_sip_status(output: &str) -> SipStatus {
    let Some((_, value)) = output
        .lines()
        .find_map(|line| line.split_once("status:"))
    else {
        return SipStatus::Unknown;
    };
    let value = value.trim().to_lowercase();
    if value.starts_with("enabled") {
        SipStatus::Enabled
    } else if value.starts_with("disabled") {
        SipStatus::Disabled
    } else {
        SipStatus::Unknown
    }
}

fn log_check(name: &str, passed: bool) {
    if passed {
        tracing::info!("✓ {}: Passed", name);
    } else {
        tracing::warn!("✗ {}: Failed", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    const HARDWARE_PORTS: &str = "
Hardware Port: Ethernet
Device: en0
Ethernet Address: 3c:07:54:00:00:01

Hardware Port: Wi-Fi
Device: en1
Ethernet Address: a4:83:e7:12:34:56

Hardware Port: Thunderbolt Bridge
Device: bridge0
Ethernet Address: N/A

VLAN Configurations
===================
";

    #[test]
    fn select_requested_interface() {
        let available = names(&["en0", "en1"]);
        assert_eq!(select_interface(Some("en1"), &available, &[]).unwrap(), "en1");
        assert_eq!(select_interface(None, &available, &[]).unwrap(), "en0");
    }

    #[test]
    fn default_selection_prefers_wifi_device() {
        let available = names(&["en0", "en1", "bridge0"]);
        let wifi = names(&["en1"]);
        assert_eq!(select_interface(None, &available, &wifi).unwrap(), "en1");
        // An explicit request still wins.
        assert_eq!(select_interface(Some("en0"), &available, &wifi).unwrap(), "en0");
        // Wi-Fi device that is not listed by ifconfig is ignored.
        assert_eq!(select_interface(None, &available, &names(&["en7"])).unwrap(), "en0");
    }

    #[test]
    fn unknown_interface_is_fatal() {
        let err = select_interface(Some("wlan9"), &names(&["en0"]), &[]).unwrap_err();
        assert!(matches!(err, Error::Startup(msg) if msg.contains("wlan9")));
        assert!(select_interface(None, &[], &[]).is_err());
    }

    #[test]
    fn hardware_ports_keep_only_wifi() {
        assert_eq!(
            parse_hardware_ports(HARDWARE_PORTS),
            vec![WifiAdapter { port: "Wi-Fi".into(), device: "en1".into() }]
        );
        let legacy = "Hardware Port: AirPort\nDevice: en1\nHardware Port: Ethernet\nDevice: en0\n";
        assert_eq!(parse_hardware_ports(legacy)[0].device, "en1");
        assert!(parse_hardware_ports("Hardware Port: Ethernet\nDevice: en0\n").is_empty());
    }

    #[test]
    fn sip_status_parsing() {
        assert_eq!(
            parse_sip_status("System Integrity Protection status: enabled.\n"),
            SipStatus::Enabled
        );
        assert_eq!(
            parse_sip_status("System Integrity Protection status: disabled.\n"),
            SipStatus::Disabled
        );
        assert_eq!(
            parse_sip_status(
                "System Integrity Protection status: enabled (Custom Configuration).\n\n\tFilesystem Protections: disabled\n"
            ),
            SipStatus::Enabled
        );
        assert_eq!(parse_sip_status("csrutil: command not found"), SipStatus::Unknown);
    }

    #[tokio::test]
    async fn missing_tools_degrade_without_error() {
        assert_eq!(sip_status("/nonexistent/csrutil").await, SipStatus::Unknown);
        assert!(wifi_adapters("/nonexistent/networksetup").await.is_err());
    }
}
