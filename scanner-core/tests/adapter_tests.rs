// Scan source adapter tests: primary/secondary fallback with stub tools

use async_trait::async_trait;
use scanner_core::backends::FallbackScanner;
use scanner_core::backends::mock::MockSource;
use scanner_core::traits::{AssociationFields, RawObservation, ScanSource, ScanTool};
use std::sync::atomic::{AtomicU32, Ordering};

struct StubTool {
    name: &'static str,
    available: bool,
    output: Option<Vec<RawObservation>>,
    runs: AtomicU32,
}

impl StubTool {
    fn ok(name: &'static str, output: Vec<RawObservation>) -> Self {
        Self { name, available: true, output: Some(output), runs: AtomicU32::new(0) }
    }

    fn failing(name: &'static str) -> Self {
        Self { name, available: true, output: None, runs: AtomicU32::new(0) }
    }

    fn missing(name: &'static str) -> Self {
        Self { name, available: false, output: None, runs: AtomicU32::new(0) }
    }

    fn runs(&self) -> u32 {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScanTool for StubTool {
    fn name(&self) -> &str {
        self.name
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn run(&self) -> scanner_core::Result<Vec<RawObservation>> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        match &self.output {
            Some(out) => Ok(out.clone()),
            None if !self.available => Err(scanner_core::Error::ToolUnavailable(self.name.into())),
            None => Err(scanner_core::Error::CommandFailed(format!("{} exited with status 1", self.name))),
        }
    }
}

fn primary_lines() -> Vec<RawObservation> {
    vec![
        RawObservation::Line("MyNet 00:11:22:33:44:55 -65 6 Y US WPA2(PSK/AES/AES)".into()),
        RawObservation::Line("Other 00:11:22:33:44:66 -75 11 Y US NONE".into()),
    ]
}

fn association() -> Vec<RawObservation> {
    vec![RawObservation::Association(AssociationFields {
        ssid: Some("HomeNet".into()),
        bssid: Some("3c:5a:b4:01:02:03".into()),
        ..Default::default()
    })]
}

#[tokio::test]
async fn primary_success_skips_secondary() {
    let scanner = FallbackScanner::new(
        StubTool::ok("airport", primary_lines()),
        StubTool::ok("system_profiler", association()),
    );
    assert_eq!(scanner.scan().await, primary_lines());
    assert_eq!(scanner.primary().runs(), 1);
    assert_eq!(scanner.secondary().runs(), 0);
    assert_eq!(scanner.name(), "airport");
}

#[tokio::test]
async fn primary_failure_falls_back_to_secondary() {
    let scanner = FallbackScanner::new(
        StubTool::failing("airport"),
        StubTool::ok("system_profiler", association()),
    );
    assert_eq!(scanner.scan().await, association());
    assert_eq!(scanner.primary().runs(), 1);
    assert_eq!(scanner.secondary().runs(), 1);
}

#[tokio::test]
async fn missing_primary_is_not_invoked() {
    let scanner = FallbackScanner::new(
        StubTool::missing("airport"),
        StubTool::ok("system_profiler", association()),
    );
    assert_eq!(scanner.scan().await, association());
    assert_eq!(scanner.primary().runs(), 0);
    assert_eq!(scanner.name(), "system_profiler");
}

#[tokio::test]
async fn total_failure_yields_empty_result() {
    let scanner = FallbackScanner::new(StubTool::failing("airport"), StubTool::failing("system_profiler"));
    assert!(scanner.scan().await.is_empty());

    // Each call is independent; nothing is retried or cached.
    assert!(scanner.scan().await.is_empty());
    assert_eq!(scanner.primary().runs(), 2);
    assert_eq!(scanner.secondary().runs(), 2);
}

#[tokio::test]
async fn mock_source_emits_parsable_lines() {
    let source = MockSource::new();
    let first = source.scan().await;
    let second = source.scan().await;
    assert_eq!(first.len(), 5);
    assert_ne!(first, second, "signal levels should drift between calls");
    assert_eq!(source.calls(), 2);
    assert!(first.iter().all(|obs| matches!(obs, RawObservation::Line(_))));
}
