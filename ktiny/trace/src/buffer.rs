//! Trace buffer management
//!
//! Keeps the most recent trace entries in a fixed ring. When the ring is
//! full the oldest entry is overwritten and counted as dropped, so a reader
//! that falls behind still sees what happened last.

use heapless::Deque;

use crate::types::{TraceEntry, TraceRecord};

/// Ring of trace entries with a record-type filter
pub struct TraceBuffer<const N: usize> {
    entries: Deque<TraceEntry, N>,
    /// Sequence number of the next entry
    seq: u16,
    /// Global filter (64-bit mask over record ids)
    global_filter: u64,
    /// Entries overwritten before they were read
    dropped: u32,
}

impl<const N: usize> TraceBuffer<N> {
    /// Create a buffer with every maskable record filtered out
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
            seq: 0,
            global_filter: 0,
            dropped: 0,
        }
    }

    /// Discard all entries and restore the default filter
    pub fn init(&mut self) {
        self.entries.clear();
        self.seq = 0;
        self.global_filter = 0;
        self.dropped = 0;
    }

    /// Enable or disable one record type
    pub fn set_global_filter(&mut self, record: TraceRecord, enable: bool) {
        let bit = 1u64 << record.id();
        if enable {
            self.global_filter |= bit;
        } else {
            self.global_filter &= !bit;
        }
    }

    /// Set global filter mask directly
    pub fn set_global_filter_mask(&mut self, mask: u64) {
        self.global_filter = mask;
    }

    /// Check if record passes the filter
    pub fn passes_filter(&self, record: TraceRecord) -> bool {
        record.is_non_maskable() || (self.global_filter & (1u64 << record.id())) != 0
    }

    /// Store a record; returns `false` if the filter rejected it
    pub fn record(&mut self, record: TraceRecord, payload: &[u8]) -> bool {
        if !self.passes_filter(record) {
            return false;
        }

        let entry = TraceEntry::new(record, self.seq, payload);
        self.seq = self.seq.wrapping_add(1);

        if self.entries.is_full() {
            self.entries.pop_front();
            self.dropped = self.dropped.saturating_add(1);
        }
        // Cannot fail: a slot was freed above if needed
        let _ = self.entries.push_back(entry);
        true
    }

    /// Take the oldest entry
    pub fn read(&mut self) -> Option<TraceEntry> {
        self.entries.pop_front()
    }

    /// Get number of entries waiting to be read
    pub fn available(&self) -> usize {
        self.entries.len()
    }

    /// Get number of entries lost to overwrites
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<const N: usize> Default for TraceBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
