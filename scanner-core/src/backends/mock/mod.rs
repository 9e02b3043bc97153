use crate::traits::{RawObservation, ScanSource};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::sleep;

// (ssid, bssid, rssi, channel, ht, cc, security)
const FAKE_NETWORKS: &[(&str, &str, i32, &str, &str, &str, &str)] = &[
    ("MyHomeWiFi", "00:1b:63:84:45:e6", -42, "6", "Y", "US", "WPA3(SAE/AES/AES)"),
    ("CafeGuest", "3c:5a:b4:10:20:30", -61, "11", "Y", "US", "NONE"),
    ("Neighbor's Network", "94:b4:0f:aa:bb:cc", -74, "36,+1", "Y", "US", "WPA2(PSK/AES/AES)"),
    ("xfinitywifi", "00:24:6c:01:02:03", -83, "149", "Y", "US", "WPA2(802.1x/AES/AES)"),
    ("(null)", "f4:f5:d8:de:ad:01", -88, "1", "N", "--", "WPA2(PSK/AES/AES)"),
];

/// A mock scan source for development and tests.
/// It simulates `airport -s` output without any real hardware interaction;
/// signal levels drift slightly on every call.
#[derive(Debug, Default)]
pub struct MockSource {
    calls: AtomicU32,
    delay: Duration,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a slow scan.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            calls: AtomicU32::new(0),
            delay,
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScanSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn scan(&self) -> Vec<RawObservation> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let drift = (call % 5) as i32 - 2;
        let lines: Vec<RawObservation> = FAKE_NETWORKS
            .iter()
            .map(|(ssid, bssid, rssi, channel, ht, cc, security)| {
                RawObservation::Line(format!(
                    "{ssid} {bssid} {} {channel} {ht} {cc} {security}",
                    rssi + drift
                ))
            })
            .collect();

        tracing::debug!(call, count = lines.len(), "[MockSource] Simulated scan");
        lines
    }
}
