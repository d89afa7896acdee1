//! Rolling stability metric
//!
//! Keeps the last N jitter distances between consecutive logical positions
//! and maps their mean onto a 1-5 rating.

use crate::types::{Position, StabilityRating};
use std::collections::VecDeque;

/// Default jitter ring capacity
pub const DEFAULT_STABILITY_CAPACITY: usize = 60;

/// Default minimum samples before rating
pub const DEFAULT_STABILITY_MIN_SAMPLES: usize = 5;

/// Mean-jitter upper bounds (px) for ratings 5, 4, 3 and 2; anything above is 1
const RATING_BANDS: [(f64, u8); 4] = [(4.0, 5), (10.0, 4), (25.0, 3), (60.0, 2)];

/// Jitter statistics over recent logical positions
#[derive(Debug, Clone)]
pub struct StabilityScorer {
    jitter: VecDeque<f64>,
    capacity: usize,
    min_samples: usize,
    last: Option<Position>,
}

impl Default for StabilityScorer {
    fn default() -> Self {
        Self::new(DEFAULT_STABILITY_CAPACITY, DEFAULT_STABILITY_MIN_SAMPLES)
    }
}

impl StabilityScorer {
    pub fn new(capacity: usize, min_samples: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            jitter: VecDeque::with_capacity(capacity),
            capacity,
            min_samples: min_samples.max(1),
            last: None,
        }
    }

    /// Record the latest logical position. The first one only seeds the reference.
    pub fn observe(&mut self, position: Position) {
        if let Some(last) = self.last {
            self.push_jitter(last.distance_to(&position));
        }
        self.last = Some(position);
    }

    fn push_jitter(&mut self, distance: f64) {
        self.jitter.push_back(distance);
        while self.jitter.len() > self.capacity {
            self.jitter.pop_front();
        }
    }

    pub fn sample_count(&self) -> usize {
        self.jitter.len()
    }

    pub fn mean_jitter(&self) -> Option<f64> {
        if self.jitter.is_empty() {
            return None;
        }
        Some(self.jitter.iter().sum::<f64>() / self.jitter.len() as f64)
    }

    pub fn rating(&self) -> StabilityRating {
        if self.jitter.len() < self.min_samples {
            return StabilityRating::Insufficient;
        }
        match self.mean_jitter() {
            Some(mean) => StabilityRating::Rated(rate_mean_jitter(mean)),
            None => StabilityRating::Insufficient,
        }
    }
}

fn rate_mean_jitter(mean: f64) -> u8 {
    RATING_BANDS
        .iter()
        .find(|(limit, _)| mean < *limit)
        .map(|(_, rating)| *rating)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(scorer: &mut StabilityScorer, steps: &[f64]) {
        let mut x = 0.0;
        scorer.observe(Position::new(x, 0.0));
        for step in steps {
            x += step;
            scorer.observe(Position::new(x, 0.0));
        }
    }

    #[test]
    fn test_insufficient_until_min_samples() {
        let mut scorer = StabilityScorer::new(60, 5);
        assert_eq!(scorer.rating(), StabilityRating::Insufficient);
        feed(&mut scorer, &[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(scorer.rating(), StabilityRating::Insufficient);
        scorer.observe(Position::new(5.0, 0.0));
        assert_eq!(scorer.rating(), StabilityRating::Rated(5));
    }

    #[test]
    fn test_still_gaze_is_not_reported_as_zero() {
        let mut scorer = StabilityScorer::new(60, 5);
        feed(&mut scorer, &[0.0; 5]);
        assert_eq!(scorer.mean_jitter(), Some(0.0));
        assert_eq!(scorer.rating(), StabilityRating::Rated(5));
    }

    #[test]
    fn test_bands() {
        assert_eq!(rate_mean_jitter(3.9), 5);
        assert_eq!(rate_mean_jitter(4.0), 4);
        assert_eq!(rate_mean_jitter(24.0), 3);
        assert_eq!(rate_mean_jitter(59.0), 2);
        assert_eq!(rate_mean_jitter(60.0), 1);
        assert_eq!(rate_mean_jitter(500.0), 1);
    }

    #[test]
    fn test_ring_evicts_oldest() {
        let mut scorer = StabilityScorer::new(5, 5);
        feed(&mut scorer, &[100.0; 5]);
        assert_eq!(scorer.rating(), StabilityRating::Rated(1));
        // Five calm steps from the last position push every large jump out
        let mut x = 500.0;
        for _ in 0..5 {
            x += 1.0;
            scorer.observe(Position::new(x, 0.0));
        }
        assert_eq!(scorer.sample_count(), 5);
        assert_eq!(scorer.rating(), StabilityRating::Rated(5));
    }
}
