//! Cancellable tick-based timers keyed by entity id
//!
//! At most one pending deadline per key. Scheduling again replaces the
//! old deadline, cancelling removes it, and `advance` hands back the keys
//! whose deadline was reached in key order so expiry is deterministic.

use std::collections::BTreeMap;

/// Keyed countdown table driven by the simulation tick
#[derive(Debug, Clone)]
pub struct Timers<K: Ord + Copy> {
    now: u64,
    pending: BTreeMap<K, u64>,
}

impl<K: Ord + Copy> Default for Timers<K> {
    fn default() -> Self {
        Self {
            now: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy> Timers<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks advanced so far
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Fire `key` after `delay_ticks` more calls to `advance` (minimum one)
    pub fn schedule(&mut self, key: K, delay_ticks: u32) {
        let due = self.now + u64::from(delay_ticks.max(1));
        self.pending.insert(key, due);
    }

    /// Drop the pending deadline for `key`; returns whether one existed
    pub fn cancel(&mut self, key: K) -> bool {
        self.pending.remove(&key).is_some()
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.pending.contains_key(&key)
    }

    /// Ticks left before `key` fires
    pub fn remaining(&self, key: K) -> Option<u64> {
        self.pending.get(&key).map(|due| due - self.now)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Step one tick and return every key whose deadline arrived
    pub fn advance(&mut self) -> Vec<K> {
        self.now += 1;
        let now = self.now;
        let due: Vec<K> = self
            .pending
            .iter()
            .filter(|&(_, &at)| at <= now)
            .map(|(&k, _)| k)
            .collect();
        for key in &due {
            self.pending.remove(key);
        }
        due
    }
}
