use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;

// 在这里定义扫描记录的数据结构，以及扫描源（外部工具）的 trait。

/// Represents a single Wi-Fi network observed during a poll.
/// 一次轮询中观察到的单个无线网络。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkRecord {
    pub name: String,
    /// Canonical lowercase `aa:bb:cc:dd:ee:ff`, unique within a collection.
    pub hardware_address: String,
    pub channel: u32, // 0 表示无法解析
    pub signal_level: i32, // dBm
    pub security_label: String,
    pub quality_percent: u8, // 0 到 100
    pub frequency_mhz: u32,
    pub vendor_name: String,
    pub observed_at: DateTime<Local>,
    pub ht: Option<String>,
    pub country_code: Option<String>,
}

impl NetworkRecord {
    /// True when the security label means no authentication is required.
    pub fn is_open(&self) -> bool {
        let label = self.security_label.trim();
        label.is_empty() || label.eq_ignore_ascii_case("open") || label.eq_ignore_ascii_case("none")
    }
}

/// Labeled fields of the currently associated network, as reported by the
/// fallback tool. Values are kept as raw text; the normalizer converts them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationFields {
    pub ssid: Option<String>,
    pub bssid: Option<String>,
    pub channel: Option<String>,
    pub signal: Option<String>,
    pub security: Option<String>,
}

/// Raw output of a scan source, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawObservation {
    /// One whitespace-delimited line of a neighbor-list scan.
    Line(String),
    /// The current association only (degraded result, no neighbor list).
    Association(AssociationFields),
}

/// A single external utility that can produce raw observations.
#[async_trait]
pub trait ScanTool: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Whether the tool's binary was found.
    fn is_available(&self) -> bool;

    /// Runs the tool once. Missing binaries and non-success exit statuses
    /// are reported as errors; the caller decides how to degrade.
    async fn run(&self) -> crate::Result<Vec<RawObservation>>;
}

/// 扫描源接口：失败时返回空列表，而不是错误。
#[async_trait]
pub trait ScanSource: Send + Sync {
    fn name(&self) -> &str;

    /// Performs one scan. An empty result means "no data this cycle";
    /// failures are reported through logging only.
    async fn scan(&self) -> Vec<RawObservation>;
}
