//! In-memory mirror of the wallet's UTXO set.
//!
//! The cache keeps records in the order the node returned them; selection
//! walks that order. Outpoints are unique within a snapshot.

use std::collections::HashSet;

use sompi_core::types::{OutPoint, UtxoRecord};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct UtxoCache {
    records: Vec<UtxoRecord>,
}

impl UtxoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole snapshot. Later duplicates of an outpoint are dropped.
    pub fn replace(&mut self, records: Vec<UtxoRecord>) {
        let mut seen: HashSet<OutPoint> = HashSet::with_capacity(records.len());
        let total = records.len();
        self.records = records
            .into_iter()
            .filter(|r| seen.insert(r.outpoint))
            .collect();
        if self.records.len() != total {
            debug!(
                dropped = total - self.records.len(),
                "duplicate outpoints dropped from UTXO snapshot"
            );
        }
    }

    /// Records in snapshot order.
    pub fn records(&self) -> &[UtxoRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all cached amounts, spendable or not.
    pub fn total_amount(&self) -> u64 {
        self.records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.entry.amount))
    }
}
