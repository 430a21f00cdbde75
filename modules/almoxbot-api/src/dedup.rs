use std::collections::HashSet;

pub const DEDUP_CAPACITY: usize = 1000;

/// Bounded set of already-processed update ids.
///
/// Eviction is clear-on-overflow: once the set is full, the whole thing is
/// flushed before the next id is recorded. No ordering guarantee on what
/// survives — this is deliberately not an LRU, just a cap on memory. The
/// policy lives behind this type so it can be swapped without touching the
/// pipeline.
#[derive(Debug)]
pub struct DedupCache {
    seen: HashSet<i64>,
    capacity: usize,
}

impl DedupCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::new(),
            capacity,
        }
    }

    /// Returns true and records the id if it was not seen before; returns
    /// false for a duplicate. Recording happens before the caller processes
    /// the message, so a crash mid-processing drops it rather than allowing
    /// a reprocess.
    pub fn check_and_record(&mut self, id: i64) -> bool {
        if self.seen.contains(&id) {
            return false;
        }
        if self.seen.len() >= self.capacity {
            self.seen.clear();
        }
        self.seen.insert(id);
        true
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new(DEDUP_CAPACITY)
    }
}
