// Export tests: report layout, empty collections, file I/O

use chrono::{DateTime, Local, TimeZone};
use scanner_core::export::{default_file_name, render_report, write_report};
use scanner_core::traits::NetworkRecord;
use tempfile::tempdir;

fn ts() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 10, 17, 14, 25, 1).unwrap()
}

fn sample() -> Vec<NetworkRecord> {
    vec![
        NetworkRecord {
            name: "MyNet".into(),
            hardware_address: "00:11:22:33:44:55".into(),
            channel: 6,
            signal_level: -65,
            security_label: "WPA2(PSK/AES/AES)".into(),
            quality_percent: 76,
            frequency_mhz: 2437,
            vendor_name: "Unknown".into(),
            observed_at: ts(),
            ht: Some("Y".into()),
            country_code: Some("US".into()),
        },
        NetworkRecord {
            name: "<Hidden>".into(),
            hardware_address: "00:1b:63:aa:bb:cc".into(),
            channel: 36,
            signal_level: -80,
            security_label: "NONE".into(),
            quality_percent: 25,
            frequency_mhz: 5180,
            vendor_name: "Apple".into(),
            observed_at: ts(),
            ht: None,
            country_code: None,
        },
    ]
}

fn header() -> String {
    format!(
        "Wi-Fi Scan Results\nGenerated: 2026-10-17 14:25:01\nInterface: en0\n{}\n\n",
        "=".repeat(80)
    )
}

#[test]
fn report_lists_entries_in_collection_order() {
    let report = render_report(&sample(), "en0", ts());
    let rule = "-".repeat(40);
    let expected = format!(
        "{}SSID: MyNet\nBSSID: 00:11:22:33:44:55\nChannel: 6\nSignal: -65 dBm\nQuality: 76%\n\
         Security: WPA2(PSK/AES/AES)\nVendor: Unknown\n{rule}\n\
         SSID: <Hidden>\nBSSID: 00:1b:63:aa:bb:cc\nChannel: 36\nSignal: -80 dBm\nQuality: 25%\n\
         Security: NONE\nVendor: Apple\n{rule}\n",
        header()
    );
    assert_eq!(report, expected);
}

#[test]
fn empty_collection_renders_header_only() {
    assert_eq!(render_report(&[], "en0", ts()), header());
}

#[tokio::test]
async fn write_report_creates_file_and_parents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("scan.txt");

    write_report(&path, &sample(), "en0", ts()).await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("Wi-Fi Scan Results\n"));
    assert_eq!(contents.matches("SSID: ").count(), 2);
}

#[tokio::test]
async fn write_report_overwrites_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan.txt");
    std::fs::write(&path, "stale contents that are longer than a header-only report would ever be ".repeat(20)).unwrap();

    write_report(&path, &[], "en0", ts()).await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), header());
}

#[tokio::test]
async fn write_report_into_a_file_path_fails() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "x").unwrap();

    let result = write_report(&blocker.join("scan.txt"), &sample(), "en0", ts()).await;
    assert!(matches!(result, Err(scanner_core::Error::Io(_))));
}

#[test]
fn default_file_name_is_timestamped() {
    assert_eq!(default_file_name(ts()), "network_scan_20261017_142501.txt");
}
