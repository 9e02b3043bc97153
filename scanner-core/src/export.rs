//! Flat-text export of a display collection.
//!
//! An empty collection still produces a file containing only the header.

use crate::Result;
use crate::traits::NetworkRecord;
use chrono::{DateTime, Local};
use std::path::Path;

const HEADER_RULE_WIDTH: usize = 80;
const ENTRY_RULE_WIDTH: usize = 40;

pub fn render_report(
    records: &[NetworkRecord],
    interface: &str,
    generated_at: DateTime<Local>,
) -> String {
    let mut out = format!(
        "Wi-Fi Scan Results\nGenerated: {}\nInterface: {}\n{}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        interface,
        "=".repeat(HEADER_RULE_WIDTH)
    );
    for record in records {
        out.push_str(&render_entry(record));
    }
    out
}

fn render_entry(record: &NetworkRecord) -> String {
    format!(
        "SSID: {}\nBSSID: {}\nChannel: {}\nSignal: {} dBm\nQuality: {}%\nSecurity: {}\nVendor: {}\n{}\n",
        record.name,
        record.hardware_address,
        record.channel,
        record.signal_level,
        record.quality_percent,
        record.security_label,
        record.vendor_name,
        "-".repeat(ENTRY_RULE_WIDTH)
    )
}

/// Writes the report to `path`, creating parent directories and replacing
/// any existing file.
pub async fn write_report(
    path: &Path,
    records: &[NetworkRecord],
    interface: &str,
    generated_at: DateTime<Local>,
) -> Result<()> {
    let report = render_report(records, interface, generated_at);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, report).await?;
    tracing::info!(path = %path.display(), count = records.len(), "Scan results exported");
    Ok(())
}

/// Default export file name, e.g. `network_scan_20261017_142501.txt`.
pub fn default_file_name(generated_at: DateTime<Local>) -> String {
    format!("network_scan_{}.txt", generated_at.format("%Y%m%d_%H%M%S"))
}
