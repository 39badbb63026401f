//! Bounded FIFO windows
//!
//! A [`FixedWindow`] holds at most `capacity` floats in insertion order;
//! pushing into a full window evicts the oldest value. It backs both the AR
//! context buffers (capacity k) and the score smoothing buffers (capacity T).

use crate::error::{Error, Result};
use std::collections::VecDeque;

/// Bounded window of the most recent values, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct FixedWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl FixedWindow {
    /// Create an empty window
    ///
    /// Fails when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::Configuration(
                "window capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Create a window already filled with `capacity` zeros
    pub fn zero_filled(capacity: usize) -> Result<Self> {
        let mut window = Self::new(capacity)?;
        window.values.extend(std::iter::repeat(0.0).take(capacity));
        Ok(window)
    }

    /// Append a value, returning the evicted oldest value if the window was full
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.values.len() == self.capacity {
            self.values.pop_front()
        } else {
            None
        };
        self.values.push_back(value);
        evicted
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Most recently inserted value
    pub fn last(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = f64> + ExactSizeIterator + '_ {
        self.values.iter().copied()
    }

    /// Contiguous view, oldest first
    pub fn as_slice(&mut self) -> &[f64] {
        self.values.make_contiguous()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    /// Arithmetic mean of the current contents, 0 for an empty window
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
