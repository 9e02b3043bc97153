use crate::traits::NetworkRecord;
use serde::Serialize;
use std::collections::HashMap;

/// Counts produced by merging one batch into a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Display collection keyed by hardware address.
///
/// Rows keep the order in which their address was first seen. A later
/// observation of the same address overwrites the row in place. Rows are
/// only removed by `clear`.
#[derive(Debug, Clone, Default)]
pub struct NetworkCollection {
    entries: Vec<NetworkRecord>,
    index: HashMap<String, usize>,
}

impl NetworkCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge<I>(&mut self, records: I) -> MergeSummary
    where
        I: IntoIterator<Item = NetworkRecord>,
    {
        let mut summary = MergeSummary::default();
        for record in records {
            match self.index.get(&record.hardware_address) {
                Some(&pos) => {
                    self.entries[pos] = record;
                    summary.updated += 1;
                }
                None => {
                    self.index.insert(record.hardware_address.clone(), self.entries.len());
                    self.entries.push(record);
                    summary.inserted += 1;
                }
            }
        }
        summary
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn get(&self, hardware_address: &str) -> Option<&NetworkRecord> {
        self.index.get(hardware_address).map(|&pos| &self.entries[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkRecord> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> Vec<NetworkRecord> {
        self.entries.clone()
    }
}
