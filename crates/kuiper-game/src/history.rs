//! Per-turn trend history for the dashboard.
//!
//! One sample per turn, per resource stock and per science rate, in
//! fixed-capacity ring buffers. History is a presentation aid and is
//! deliberately left out of snapshots: a restored game starts its charts
//! fresh.

use std::collections::BTreeMap;

use kuiper_core::fixed::Fixed64;
use kuiper_core::ledger::Ledger;
use kuiper_core::resource::ResourceType;
use kuiper_core::science::Science;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for turn history retention.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Maximum number of turn samples to retain per series.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

// ---------------------------------------------------------------------------
// RingBuffer
// ---------------------------------------------------------------------------

/// A fixed-capacity ring buffer for trend series.
///
/// When full, the oldest entry is overwritten. Iterates oldest-to-newest.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    data: Vec<T>,
    head: usize,
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Create a new ring buffer with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be > 0");
        Self {
            data: vec![T::default(); capacity],
            head: 0,
            len: 0,
        }
    }

    /// Push a value, overwriting the oldest entry if at capacity.
    pub fn push(&mut self, value: T) {
        self.data[self.head] = value;
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
    }

    /// Number of values currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total capacity.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Get the most recently pushed value, if any.
    pub fn latest(&self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let idx = if self.head == 0 {
            self.capacity() - 1
        } else {
            self.head - 1
        };
        Some(self.data[idx])
    }

    /// Iterate values from oldest to newest.
    pub fn iter(&self) -> RingBufferIter<'_, T> {
        let start = if self.len < self.capacity() {
            0
        } else {
            self.head
        };
        RingBufferIter {
            buffer: self,
            index: start,
            remaining: self.len,
        }
    }

    /// Collect all stored values into a Vec (oldest to newest).
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Clear all stored values without changing capacity.
    pub fn clear(&mut self) {
        for slot in &mut self.data {
            *slot = T::default();
        }
        self.head = 0;
        self.len = 0;
    }
}

/// Iterator over [`RingBuffer`] values, oldest to newest.
pub struct RingBufferIter<'a, T> {
    buffer: &'a RingBuffer<T>,
    index: usize,
    remaining: usize,
}

impl<T: Copy + Default> Iterator for RingBufferIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.buffer.data[self.index];
        self.index = (self.index + 1) % self.buffer.capacity();
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Copy + Default> ExactSizeIterator for RingBufferIter<'_, T> {}

// ---------------------------------------------------------------------------
// TurnHistory
// ---------------------------------------------------------------------------

/// Ledger trend series, sampled once at the end of every turn.
#[derive(Debug, Clone)]
pub struct TurnHistory {
    resources: BTreeMap<ResourceType, RingBuffer<i64>>,
    sciences: BTreeMap<Science, RingBuffer<Fixed64>>,
    samples: u64,
}

impl TurnHistory {
    /// Create empty series for every resource kind and discipline.
    pub fn new(config: &HistoryConfig) -> Self {
        let resources = ResourceType::ALL
            .iter()
            .map(|&kind| (kind, RingBuffer::new(config.capacity)))
            .collect();
        let sciences = Science::ALL
            .iter()
            .map(|&science| (science, RingBuffer::new(config.capacity)))
            .collect();
        Self {
            resources,
            sciences,
            samples: 0,
        }
    }

    /// Record the ledger as it stands. Called once per turn.
    pub fn sample(&mut self, ledger: &Ledger) {
        for (&kind, series) in &mut self.resources {
            series.push(ledger.resource(kind));
        }
        for (&science, series) in &mut self.sciences {
            series.push(ledger.science_rate(science));
        }
        self.samples += 1;
    }

    /// Stock history for one resource, oldest to newest.
    pub fn resource_series(&self, kind: ResourceType) -> Vec<i64> {
        self.resources
            .get(&kind)
            .map(RingBuffer::to_vec)
            .unwrap_or_default()
    }

    /// Rate history for one discipline, oldest to newest.
    pub fn science_series(&self, science: Science) -> Vec<Fixed64> {
        self.sciences
            .get(&science)
            .map(RingBuffer::to_vec)
            .unwrap_or_default()
    }

    /// The stock recorded by the most recent sample.
    pub fn latest_resource(&self, kind: ResourceType) -> Option<i64> {
        self.resources.get(&kind).and_then(RingBuffer::latest)
    }

    /// The rate recorded by the most recent sample.
    pub fn latest_science_rate(&self, science: Science) -> Option<Fixed64> {
        self.sciences.get(&science).and_then(RingBuffer::latest)
    }

    /// Total samples taken over the session, including overwritten ones.
    pub fn samples(&self) -> u64 {
        self.samples
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use kuiper_core::fixed::f64_to_fixed64;

    // -----------------------------------------------------------------------
    // Test 1: below capacity, values come back in push order.
    // -----------------------------------------------------------------------
    #[test]
    fn ring_keeps_push_order() {
        let mut ring: RingBuffer<i64> = RingBuffer::new(4);
        ring.push(10);
        ring.push(20);
        ring.push(30);
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.to_vec(), vec![10, 20, 30]);
    }

    // -----------------------------------------------------------------------
    // Test 2: at capacity, the oldest entry is overwritten.
    // -----------------------------------------------------------------------
    #[test]
    fn ring_overwrites_oldest() {
        let mut ring: RingBuffer<i64> = RingBuffer::new(3);
        for v in [1, 2, 3, 4, 5] {
            ring.push(v);
        }
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.to_vec(), vec![3, 4, 5]);
        assert_eq!(ring.latest(), Some(5));
    }

    // -----------------------------------------------------------------------
    // Test 3: the iterator reports its exact length.
    // -----------------------------------------------------------------------
    #[test]
    fn ring_iter_is_exact_size() {
        let mut ring: RingBuffer<i64> = RingBuffer::new(8);
        ring.push(1);
        ring.push(2);
        let iter = ring.iter();
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.size_hint(), (2, Some(2)));
    }

    // -----------------------------------------------------------------------
    // Test 4: clear resets contents but keeps capacity.
    // -----------------------------------------------------------------------
    #[test]
    fn ring_clear_keeps_capacity() {
        let mut ring: RingBuffer<i64> = RingBuffer::new(2);
        ring.push(7);
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 2);
        assert_eq!(ring.latest(), None);
    }

    // -----------------------------------------------------------------------
    // Test 5: every resource kind and discipline gets a sample per turn.
    // -----------------------------------------------------------------------
    #[test]
    fn history_samples_whole_ledger() {
        let mut ledger = Ledger::new();
        ledger.add_resource(ResourceType::Gold, 120);
        ledger.set_science_rate(Science::Physics, f64_to_fixed64(1.5));

        let mut history = TurnHistory::new(&HistoryConfig::default());
        history.sample(&ledger);

        assert_eq!(history.samples(), 1);
        assert_eq!(history.resource_series(ResourceType::Gold), vec![120]);
        // Kinds the ledger never touched still chart as zero.
        assert_eq!(history.resource_series(ResourceType::Influence), vec![0]);
        assert_eq!(
            history.science_series(Science::Physics),
            vec![f64_to_fixed64(1.5)]
        );
        assert_eq!(
            history.science_series(Science::Geology),
            vec![Fixed64::ZERO]
        );
    }

    // -----------------------------------------------------------------------
    // Test 6: retention is bounded by the configured capacity.
    // -----------------------------------------------------------------------
    #[test]
    fn history_respects_capacity() {
        let mut ledger = Ledger::new();
        let mut history = TurnHistory::new(&HistoryConfig { capacity: 3 });

        for year in 0..5 {
            ledger.set_resource(ResourceType::Gold, year);
            history.sample(&ledger);
        }

        assert_eq!(history.samples(), 5);
        assert_eq!(history.resource_series(ResourceType::Gold), vec![2, 3, 4]);
        assert_eq!(history.latest_resource(ResourceType::Gold), Some(4));
    }
}
