use crate::metrics::supported_channels;
use crate::vendor::VendorTable;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// 编译时嵌入的默认配置
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../configs/scanner.toml");

/// 顶层应用配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scanner: ScannerConfig,
    pub tools: ToolPaths,
    pub bind_addr: SocketAddr,
    pub require_root: bool,
    pub export_dir: PathBuf,
    /// Extra OUI entries layered over the built-in vendor table.
    pub vendors: BTreeMap<String, String>,
}

/// 轮询相关配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    pub interface: Option<String>,
    pub poll_interval: Duration,
    pub stop_grace: Duration,
    pub channel_filter: Option<u32>,
}

/// 外部工具路径
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolPaths {
    pub airport_path: String,
    pub system_profiler_path: String,
    pub ifconfig_path: String,
    pub capture_tool: String,
    #[serde(default = "default_networksetup_path")]
    pub networksetup_path: String,
    #[serde(default = "default_csrutil_path")]
    pub csrutil_path: String,
}

fn default_networksetup_path() -> String {
    "networksetup".into()
}

fn default_csrutil_path() -> String {
    "csrutil".into()
}

/// 用于解析 TOML 的临时结构
#[derive(Deserialize)]
struct AppConfigFile {
    scanner: ScannerToml,
    tools: ToolPaths,
    server: ServerToml,
    #[serde(default)]
    startup: StartupToml,
    #[serde(default)]
    export: ExportToml,
    #[serde(default)]
    vendors: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct ScannerToml {
    interface: Option<String>,
    poll_interval_ms: u64,
    stop_grace_ms: u64,
    channel_filter: Option<u32>,
}

#[derive(Deserialize)]
struct ServerToml {
    bind_addr: String,
}

#[derive(Deserialize)]
struct StartupToml {
    require_root: bool,
}

impl Default for StartupToml {
    fn default() -> Self {
        Self { require_root: true }
    }
}

#[derive(Deserialize)]
struct ExportToml {
    directory: PathBuf,
}

impl Default for ExportToml {
    fn default() -> Self {
        Self { directory: PathBuf::from(".") }
    }
}

impl TryFrom<AppConfigFile> for AppConfig {
    type Error = Error;

    fn try_from(t: AppConfigFile) -> Result<Self> {
        let bind_addr = SocketAddr::from_str(&t.server.bind_addr)
            .map_err(|e| Error::Config(format!("Invalid bind_addr {:?}: {}", t.server.bind_addr, e)))?;
        if t.scanner.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be greater than zero".into()));
        }
        if let Some(channel) = t.scanner.channel_filter.filter(|c| !supported_channels().contains(c)) {
            return Err(Error::Config(format!("channel_filter {} is not a supported channel", channel)));
        }

        Ok(AppConfig {
            scanner: ScannerConfig {
                interface: t.scanner.interface.filter(|s| !s.is_empty()),
                poll_interval: Duration::from_millis(t.scanner.poll_interval_ms),
                stop_grace: Duration::from_millis(t.scanner.stop_grace_ms),
                channel_filter: t.scanner.channel_filter,
            },
            tools: t.tools,
            bind_addr,
            require_root: t.startup.require_root,
            export_dir: t.export.directory,
            vendors: t.vendors,
        })
    }
}

impl AppConfig {
    /// The built-in vendor table with this config's `[vendors]` applied.
    pub fn vendor_table(&self) -> VendorTable {
        VendorTable::with_overrides(self.vendors.iter().map(|(k, v)| (k, v.clone())))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        // 嵌入的默认配置在测试中校验
        load_config_from_toml_str(DEFAULT_CONFIG_TOML).expect("embedded default config is valid")
    }
}

// ============= 配置加载函数 =============

/// 从 TOML 字符串加载应用配置
pub fn load_config_from_toml_str(s: &str) -> Result<AppConfig> {
    let parsed: AppConfigFile =
        toml::from_str(s).map_err(|e| Error::Config(format!("Failed to parse config TOML: {}", e)))?;
    AppConfig::try_from(parsed)
}

/// 从文件加载；未指定路径时使用嵌入的默认配置
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
            tracing::info!("Loaded config from {}", path.display());
            load_config_from_toml_str(&contents)
        }
        None => load_config_from_toml_str(DEFAULT_CONFIG_TOML),
    }
}
