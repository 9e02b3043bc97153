//! Network interface enumeration via `ifconfig` and `airport -I`.

use crate::Result;
use crate::backends::utils::run_tool;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static CHANNEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"channel:\s*(\d+)").expect("valid channel regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceStatus {
    Active,
    Inactive,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    Wifi,
    Ethernet,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceMode {
    Monitor,
    Managed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub mac: Option<String>,
    pub ipv4: Option<String>,
    pub ipv6: Option<String>,
    pub status: InterfaceStatus,
    pub kind: InterfaceKind,
}

/// Lists interfaces from `ifconfig -a`, skipping loopback. `en*` come
/// first, then `wlan*`, then the rest, each group in tool order.
pub async fn list_interfaces(ifconfig: &str) -> Result<Vec<String>> {
    let stdout = run_tool(ifconfig, &["-a"]).await?;
    Ok(parse_interface_list(&stdout))
}

pub fn parse_interface_list(output: &str) -> Vec<String> {
    let mut interfaces: Vec<String> = output
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with(char::is_whitespace))
        .filter_map(|line| line.split_once(':').map(|(name, _)| name.trim().to_string()))
        .filter(|name| !name.is_empty() && !name.starts_with("lo"))
        .collect();
    interfaces.dedup();

    // sort_by_key 是稳定排序，同组内保持原顺序
    interfaces.sort_by_key(|name| {
        if name.starts_with("en") {
            0
        } else if name.starts_with("wlan") {
            1
        } else {
            2
        }
    });
    interfaces
}

/// Details for one interface from `ifconfig <name>`.
///
/// `wifi_devices` are the devices behind Wi-Fi hardware ports. When it is
/// empty the kind is guessed from the interface name.
pub async fn interface_info(ifconfig: &str, name: &str, wifi_devices: &[String]) -> Result<InterfaceInfo> {
    let stdout = run_tool(ifconfig, &[name]).await?;
    Ok(parse_interface_info(name, &stdout, wifi_devices))
}

pub fn parse_interface_info(name: &str, output: &str, wifi_devices: &[String]) -> InterfaceInfo {
    let mut info = InterfaceInfo {
        name: name.to_string(),
        mac: None,
        ipv4: None,
        ipv6: None,
        status: InterfaceStatus::Unknown,
        kind: InterfaceKind::Unknown,
    };

    for line in output.lines() {
        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (Some("ether"), Some(mac)) if info.mac.is_none() => info.mac = Some(mac.to_string()),
            (Some("inet"), Some(addr)) if info.ipv4.is_none() => info.ipv4 = Some(addr.to_string()),
            (Some("inet6"), Some(addr)) if info.ipv6.is_none() => {
                // fe80::1%en0 -> fe80::1
                let addr = addr.split('%').next().unwrap_or(addr);
                info.ipv6 = Some(addr.to_string());
            }
            _ => {}
        }
    }

    if output.contains("status: active") {
        info.status = InterfaceStatus::Active;
    } else if output.contains("status: inactive") {
        info.status = InterfaceStatus::Inactive;
    }

    info.kind = if !wifi_devices.is_empty() {
        if wifi_devices.iter().any(|d| d == name) {
            InterfaceKind::Wifi
        } else if info.mac.is_some() || output.contains("Ethernet") {
            InterfaceKind::Ethernet
        } else {
            InterfaceKind::Unknown
        }
    } else if output.contains("Wi-Fi") || name.starts_with("en") || name.starts_with("wlan") {
        InterfaceKind::Wifi
    } else if output.contains("Ethernet") {
        InterfaceKind::Ethernet
    } else {
        InterfaceKind::Unknown
    };
    info
}

/// Channel the interface is currently tuned to, from `airport -I`.
pub async fn current_channel(airport: &str) -> Option<u32> {
    match run_tool(airport, &["-I"]).await {
        Ok(stdout) => parse_current_channel(&stdout),
        Err(e) => {
            tracing::error!(error = %e, "Error getting current channel");
            None
        }
    }
}

pub fn parse_current_channel(output: &str) -> Option<u32> {
    CHANNEL_RE
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Whether the interface reports monitor mode.
pub async fn interface_mode(ifconfig: &str, name: &str) -> Result<InterfaceMode> {
    let stdout = run_tool(ifconfig, &[name]).await?;
    Ok(parse_interface_mode(&stdout))
}

pub fn parse_interface_mode(output: &str) -> InterfaceMode {
    if output.to_lowercase().contains("monitor") {
        InterfaceMode::Monitor
    } else {
        InterfaceMode::Managed
    }
}
