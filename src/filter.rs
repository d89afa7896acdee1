//! Sample filtering and temporal smoothing
//!
//! First two stages of the pipeline: drop blink/glitch spikes, then average the
//! surviving samples over a short sliding window.

use crate::types::{Position, RawSample};
use std::collections::VecDeque;

/// Default outlier jump threshold (px)
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 700.0;

/// Default smoothing window (accepted samples)
pub const DEFAULT_SMOOTHING_WINDOW: usize = 6;

/// Outlier rejection based on the jump from the previous accepted sample
#[derive(Debug, Clone)]
pub struct SampleFilter {
    threshold: f64,
}

impl Default for SampleFilter {
    fn default() -> Self {
        Self::new(DEFAULT_OUTLIER_THRESHOLD)
    }
}

impl SampleFilter {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Whether `candidate` should be kept.
    ///
    /// The first sample is always accepted. A jump exactly equal to the
    /// threshold is accepted. Non-finite samples are always rejected.
    pub fn accept(&self, prev: Option<&RawSample>, candidate: &RawSample) -> bool {
        if !candidate.x.is_finite() || !candidate.y.is_finite() {
            return false;
        }
        match prev {
            None => true,
            Some(prev) => prev.position().distance_to(&candidate.position()) <= self.threshold,
        }
    }
}

/// Fixed-size moving average over accepted samples
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    window: VecDeque<Position>,
    capacity: usize,
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_WINDOW)
    }
}

impl TemporalSmoother {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add an accepted sample and return the window mean
    pub fn push(&mut self, sample: &RawSample) -> Position {
        self.window.push_back(sample.position());
        while self.window.len() > self.capacity {
            self.window.pop_front();
        }
        self.mean()
    }

    /// Current mean, `None` before the first push
    pub fn current(&self) -> Option<Position> {
        if self.window.is_empty() {
            None
        } else {
            Some(self.mean())
        }
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    fn mean(&self) -> Position {
        let n = self.window.len() as f64;
        let (sx, sy) = self
            .window
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Position::new(sx / n, sy / n)
    }
}
