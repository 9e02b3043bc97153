use std::collections::HashMap;

/// Fallback vendor name for unknown prefixes.
pub const UNKNOWN_VENDOR: &str = "Unknown";

// 常见厂商 OUI
const DEFAULT_OUIS: &[(&str, &str)] = &[
    ("00:1B:63", "Apple"),
    ("00:1E:52", "Apple"),
    ("00:1F:F3", "Apple"),
    ("00:23:12", "Apple"),
    ("00:25:00", "Apple"),
    ("00:26:08", "Apple"),
    ("3C:5A:B4", "Google"),
    ("F4:F5:D8", "Google"),
    ("00:1A:11", "Google"),
    ("94:B4:0F", "Aruba Networks"),
    ("00:0B:86", "Aruba Networks"),
    ("00:24:6C", "Aruba Networks"),
];

/// Immutable OUI (first three octets) to vendor name mapping.
///
/// Keys are stored upper-cased; lookups match the upper-cased first eight
/// characters of an address exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorTable {
    entries: HashMap<String, String>,
}

impl VendorTable {
    pub fn empty() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Builds a table from the built-in entries plus `extra`, with `extra`
    /// taking precedence.
    pub fn with_overrides<I, K, V>(extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut table = Self::default();
        for (oui, vendor) in extra {
            table.entries.insert(oui.as_ref().to_uppercase(), vendor.into());
        }
        table
    }

    pub fn lookup(&self, hardware_address: &str) -> &str {
        let oui = hardware_address.get(..8).unwrap_or(hardware_address).to_uppercase();
        self.entries.get(&oui).map(String::as_str).unwrap_or(UNKNOWN_VENDOR)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for VendorTable {
    fn default() -> Self {
        let entries = DEFAULT_OUIS
            .iter()
            .map(|(oui, vendor)| (oui.to_string(), vendor.to_string()))
            .collect();
        Self { entries }
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for VendorTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let entries = iter
            .into_iter()
            .map(|(oui, vendor)| (oui.as_ref().to_uppercase(), vendor.into()))
            .collect();
        Self { entries }
    }
}
