use crate::Result;
use crate::backends::utils::{binary_exists, run_tool};
use crate::traits::{RawObservation, ScanTool};
use async_trait::async_trait;

// 主扫描工具：`airport -s`，每个网络一行，以空白分隔
// SSID BSSID RSSI CHANNEL HT CC SECURITY (auth/unicast/group)

/// Primary neighbor-list scan using the `airport` utility.
#[derive(Debug, Clone)]
pub struct AirportTool {
    path: String,
    available: bool,
}

impl AirportTool {
    /// Availability is probed once, here.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let available = binary_exists(&path);
        if !available {
            tracing::warn!(path = %path, "Airport utility not found. Scans will use the fallback tool.");
        }
        Self { path, available }
    }

    /// Splits `airport -s` output into one observation per line, skipping the
    /// header and blank lines. Field validation happens in the normalizer.
    pub fn parse_scan_output(output: &str) -> Vec<RawObservation> {
        output
            .lines()
            .skip(1)
            .filter(|line| !line.trim().is_empty())
            .map(|line| RawObservation::Line(line.trim().to_string()))
            .collect()
    }
}

#[async_trait]
impl ScanTool for AirportTool {
    fn name(&self) -> &str {
        "airport"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn run(&self) -> Result<Vec<RawObservation>> {
        let stdout = run_tool(&self.path, &["-s"]).await?;
        Ok(Self::parse_scan_output(&stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_blank_lines_are_skipped() {
        let output = "                            SSID BSSID             RSSI CHANNEL HT CC SECURITY (auth/unicast/group)\n\
                      MyNet 00:11:22:33:44:55 -65 6 y US WPA2(PSK/AES/AES)\n\
                      \n\
                      Cafe 00:11:22:33:44:66 -80 36,+1 Y -- NONE\n";
        let obs = AirportTool::parse_scan_output(output);
        assert_eq!(obs.len(), 2);
        assert_eq!(
            obs[0],
            RawObservation::Line("MyNet 00:11:22:33:44:55 -65 6 y US WPA2(PSK/AES/AES)".into())
        );
    }

    #[test]
    fn missing_binary_is_reported_unavailable() {
        let tool = AirportTool::new("/nonexistent/airport");
        assert!(!tool.is_available());
    }
}
