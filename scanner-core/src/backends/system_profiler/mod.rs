use crate::Result;
use crate::backends::utils::{binary_exists, run_tool};
use crate::traits::{AssociationFields, RawObservation, ScanTool};
use async_trait::async_trait;

/// Fallback source: `system_profiler SPAirPortDataType`. It only describes
/// the currently associated network, so a scan yields at most one record.
#[derive(Debug, Clone)]
pub struct SystemProfilerTool {
    path: String,
    available: bool,
}

impl SystemProfilerTool {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let available = binary_exists(&path);
        Self { path, available }
    }

    /// Extracts the current association from the labeled `key: value` block.
    /// Returns `None` unless both an SSID and a BSSID are present.
    pub fn parse_current_network(output: &str) -> Option<AssociationFields> {
        let mut fields = AssociationFields::default();
        let mut in_current = false;

        for line in output.lines() {
            let line = line.trim();
            if line.starts_with("Current Network Information:") {
                in_current = true;
                continue;
            }
            if line.starts_with("Other Local Wi-Fi Networks:") {
                in_current = false;
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                // 段落标题，例如 "MyNet:" 出现在当前网络信息下
                if in_current && fields.ssid.is_none() && !key.contains(' ') {
                    fields.ssid = Some(key.to_string());
                }
                continue;
            }

            match key.trim() {
                "SSID" => fields.ssid = Some(value.to_string()),
                "BSSID" => fields.bssid = Some(value.to_string()),
                "Channel" if fields.channel.is_none() => fields.channel = Some(value.to_string()),
                "Security" if in_current => fields.security = Some(value.to_string()),
                "Signal / Noise" if in_current => fields.signal = Some(value.to_string()),
                _ => {}
            }
        }

        (fields.ssid.is_some() && fields.bssid.is_some()).then_some(fields)
    }
}

#[async_trait]
impl ScanTool for SystemProfilerTool {
    fn name(&self) -> &str {
        "system_profiler"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn run(&self) -> Result<Vec<RawObservation>> {
        let stdout = run_tool(&self.path, &["SPAirPortDataType"]).await?;
        Ok(Self::parse_current_network(&stdout)
            .map(RawObservation::Association)
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILER_OUTPUT: &str = "\
Wi-Fi:

      Interfaces:
        en0:
          Card Type: Wi-Fi  (0x14E4, 0x7BF)
          Status: Connected
          Current Network Information:
            HomeNet:
              SSID: HomeNet
              BSSID: 3c:5a:b4:1:2:3
              PHY Mode: 802.11ac
              Channel: 36 (5GHz, 80MHz)
              Country Code: US
              Security: WPA2 Personal
              Signal / Noise: -58 dBm / -92 dBm
          Other Local Wi-Fi Networks:
            Neighbor:
              Channel: 11 (2GHz, 20MHz)
              Security: WPA2 Personal
";

    #[test]
    fn parses_current_association() {
        let fields = SystemProfilerTool::parse_current_network(PROFILER_OUTPUT).unwrap();
        assert_eq!(fields.ssid.as_deref(), Some("HomeNet"));
        assert_eq!(fields.bssid.as_deref(), Some("3c:5a:b4:1:2:3"));
        assert_eq!(fields.channel.as_deref(), Some("36 (5GHz, 80MHz)"));
        assert_eq!(fields.security.as_deref(), Some("WPA2 Personal"));
        assert_eq!(fields.signal.as_deref(), Some("-58 dBm / -92 dBm"));
    }

    #[test]
    fn no_bssid_means_no_association() {
        let output = "Current Network Information:\n  SSID: Lonely\n  Channel: 6\n";
        assert!(SystemProfilerTool::parse_current_network(output).is_none());
    }
}
