// src/session/buffer.rs
//! Fixed-capacity sample ring for the per-frame analysis window.
//!
//! Exclusively owned by one session; overwrites the oldest sample when full
//! so memory stays bounded regardless of session length.

use std::collections::VecDeque;

use crate::session::RawSample;

/// Overwrite-oldest ring of recent samples.
#[derive(Debug, Clone)]
pub struct SampleRing {
    buffer: VecDeque<RawSample>,
    capacity: usize,
}

impl SampleRing {
    /// Ring holding up to `capacity` samples. Capacity of zero is rounded up
    /// to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest when full.
    pub fn push(&mut self, sample: RawSample) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(sample);
    }

    /// Samples currently held, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &RawSample> {
        self.buffer.iter()
    }

    /// Sample at position `i` from the oldest.
    pub fn get(&self, i: usize) -> Option<&RawSample> {
        self.buffer.get(i)
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True when no samples are held.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Maximum samples held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
