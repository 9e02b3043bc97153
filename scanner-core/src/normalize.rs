//! Record normalizer: turns raw scan observations into `NetworkRecord`s and
//! fills in the derived fields.

use crate::metrics::{frequency_mhz, quality_percent};
use crate::traits::{AssociationFields, NetworkRecord, RawObservation};
use crate::vendor::VendorTable;
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;

/// Minimum whitespace-delimited fields for a primary-tool line.
pub const MIN_LINE_FIELDS: usize = 7;
/// Name token the scan tool prints for suppressed SSIDs.
pub const HIDDEN_TOKEN: &str = "(null)";
/// Display name used for hidden networks.
pub const HIDDEN_NAME: &str = "<Hidden>";
/// Signal assumed for the fallback tool when it reports none.
pub const ASSOCIATION_DEFAULT_SIGNAL: i32 = -50;

static MAC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]{1,2}(?::[0-9A-Fa-f]{1,2}){5}$").expect("valid MAC regex"));

/// Why a single observation could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected at least 7 fields, found {found}")]
    TooFewFields { found: usize },

    #[error("no hardware address in line")]
    MissingAddress,

    #[error("expected signal, channel, ht, cc and security after the address, found {found} fields")]
    TruncatedAfterAddress { found: usize },

    #[error("invalid signal level: {0:?}")]
    InvalidSignal(String),

    #[error("association is missing {0}")]
    IncompleteAssociation(&'static str),
}

/// Stateless parse/derive stage. The vendor table is injected so it can be
/// extended from config or swapped in tests.
#[derive(Debug, Clone)]
pub struct Normalizer {
    vendors: Arc<VendorTable>,
}

impl Normalizer {
    pub fn new(vendors: Arc<VendorTable>) -> Self {
        Self { vendors }
    }

    pub fn normalize(
        &self,
        raw: &RawObservation,
        observed_at: DateTime<Local>,
    ) -> Result<NetworkRecord, ParseError> {
        match raw {
            RawObservation::Line(line) => self.normalize_line(line, observed_at),
            RawObservation::Association(fields) => self.normalize_association(fields, observed_at),
        }
    }

    /// Normalizes every observation, dropping the ones that fail to parse.
    pub fn normalize_batch(
        &self,
        raw: &[RawObservation],
        observed_at: DateTime<Local>,
    ) -> Vec<NetworkRecord> {
        raw.iter()
            .filter_map(|obs| match self.normalize(obs, observed_at) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::debug!(error = %e, observation = ?obs, "Dropping unparsable observation");
                    None
                }
            })
            .collect()
    }

    fn normalize_line(
        &self,
        line: &str,
        observed_at: DateTime<Local>,
    ) -> Result<NetworkRecord, ParseError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_LINE_FIELDS {
            return Err(ParseError::TooFewFields { found: fields.len() });
        }

        let addr_idx = address_index(&fields).ok_or(ParseError::MissingAddress)?;
        let rest = &fields[addr_idx + 1..];
        if rest.len() < 5 {
            return Err(ParseError::TruncatedAfterAddress { found: rest.len() });
        }

        let name = display_name(&fields[..addr_idx].join(" "));
        let hardware_address = canonical_address(fields[addr_idx]);
        let signal_level = rest[0]
            .parse::<i32>()
            .map_err(|_| ParseError::InvalidSignal(rest[0].to_string()))?;
        let channel = parse_channel(rest[1]);
        let security_label = rest[4..].join(" ");

        Ok(self.build(
            name,
            hardware_address,
            channel,
            signal_level,
            security_label,
            observed_at,
            Some(rest[2].to_string()),
            Some(rest[3].to_string()),
        ))
    }

    fn normalize_association(
        &self,
        fields: &AssociationFields,
        observed_at: DateTime<Local>,
    ) -> Result<NetworkRecord, ParseError> {
        let ssid = fields
            .ssid
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ParseError::IncompleteAssociation("ssid"))?;
        let bssid = fields
            .bssid
            .as_deref()
            .filter(|s| MAC_RE.is_match(s))
            .ok_or(ParseError::IncompleteAssociation("bssid"))?;

        // "36 (5GHz, 80MHz)" -> 36
        let channel = fields
            .channel
            .as_deref()
            .and_then(|c| c.split_whitespace().next())
            .map(parse_channel)
            .unwrap_or(0);
        // "-55 dBm / -90 dBm" -> -55
        let signal_level = fields
            .signal
            .as_deref()
            .and_then(|s| s.split_whitespace().next())
            .and_then(|s| s.parse::<i32>().ok())
            .unwrap_or(ASSOCIATION_DEFAULT_SIGNAL);
        let security_label = fields.security.clone().unwrap_or_else(|| "Unknown".to_string());

        Ok(self.build(
            display_name(ssid),
            canonical_address(bssid),
            channel,
            signal_level,
            security_label,
            observed_at,
            None,
            None,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        &self,
        name: String,
        hardware_address: String,
        channel: u32,
        signal_level: i32,
        security_label: String,
        observed_at: DateTime<Local>,
        ht: Option<String>,
        country_code: Option<String>,
    ) -> NetworkRecord {
        let vendor_name = self.vendors.lookup(&hardware_address).to_string();
        NetworkRecord {
            name,
            hardware_address,
            channel,
            signal_level,
            security_label,
            quality_percent: quality_percent(signal_level),
            frequency_mhz: frequency_mhz(channel),
            vendor_name,
            observed_at,
            ht,
            country_code,
        }
    }
}

/// Index of the hardware address in a split line.
///
/// SSIDs may contain spaces or look like a MAC themselves, so the address is
/// the first MAC-shaped token that is followed by a numeric signal and the
/// remaining columns. Falls back to the first MAC-shaped token so the caller
/// can report what is wrong with the line.
fn address_index(fields: &[&str]) -> Option<usize> {
    let mut macs = fields
        .iter()
        .enumerate()
        .filter(|(_, f)| MAC_RE.is_match(f))
        .map(|(i, _)| i)
        .peekable();
    let first = *macs.peek()?;
    Some(
        macs.find(|&i| fields.len() - i > 5 && fields[i + 1].parse::<i32>().is_ok())
            .unwrap_or(first),
    )
}

/// Parses a channel field such as `"6"` or `"6,+1"`. Returns 0 on failure.
pub fn parse_channel(raw: &str) -> u32 {
    raw.split(',').next().unwrap_or("").trim().parse().unwrap_or(0)
}

/// Lowercases and zero-pads each octet: `A0:4:3E:...` -> `a0:04:3e:...`.
pub fn canonical_address(raw: &str) -> String {
    raw.split(':')
        .map(|octet| format!("{:0>2}", octet.to_ascii_lowercase()))
        .collect::<Vec<_>>()
        .join(":")
}

fn display_name(raw: &str) -> String {
    if raw.is_empty() || raw == HIDDEN_TOKEN {
        HIDDEN_NAME.to_string()
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_with_offset() {
        assert_eq!(parse_channel("6,+1"), 6);
        assert_eq!(parse_channel("149,80"), 149);
        assert_eq!(parse_channel("abc"), 0);
        assert_eq!(parse_channel(""), 0);
    }

    #[test]
    fn address_is_padded_and_lowercased() {
        assert_eq!(canonical_address("A0:4:3E:b:0C:1"), "a0:04:3e:0b:0c:01");
        assert_eq!(canonical_address("00:11:22:33:44:55"), "00:11:22:33:44:55");
    }
}
