use crate::store::CaptureRecord;
use std::collections::{HashMap, HashSet};

/// Tracks which (message, url) pairs have already been captured.
pub trait SeenPairs: Send {
    fn contains(&self, message_id: &str, url: &str) -> bool;

    /// Returns `true` when the pair was not present before.
    fn insert(&mut self, message_id: &str, url: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory ledger keyed by message id. Entries are never evicted.
#[derive(Debug, Default)]
pub struct SeenPairLedger {
    by_message: HashMap<String, HashSet<String>>,
    total: usize,
}

impl SeenPairLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the ledger from records already persisted in the store.
    pub fn load<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a CaptureRecord>,
    {
        let mut ledger = Self::new();
        for record in records {
            ledger.insert(&record.message_id, &record.url);
        }
        ledger
    }
}

impl SeenPairs for SeenPairLedger {
    fn contains(&self, message_id: &str, url: &str) -> bool {
        self.by_message
            .get(message_id)
            .map_or(false, |urls| urls.contains(url))
    }

    fn insert(&mut self, message_id: &str, url: &str) -> bool {
        let added = self
            .by_message
            .entry(message_id.to_string())
            .or_default()
            .insert(url.to_string());
        if added {
            self.total += 1;
        }
        added
    }

    fn len(&self) -> usize {
        self.total
    }
}
