//! Attention aggregation
//!
//! Turns per-region fixation totals into a dominant-category profile, and
//! keeps the session's cumulative score.

use crate::types::{AttentionProfile, RegionCategory};
use log::warn;

/// Share above which the dominant category names the profile
const DOMINANT_SHARE: f64 = 0.4;

/// Share below which attention counts as diffuse
const DIFFUSE_SHARE: f64 = 0.35;

const DIFFUSE_LABEL: &str = "diffuse_attention";
const NEUTRAL_LABEL: &str = "balanced_observer";

/// Default minimum fixation seconds before profiling
pub const DEFAULT_PROFILE_MIN_TOTAL_SEC: f64 = 1.0;

fn category_label(category: RegionCategory) -> &'static str {
    match category {
        RegionCategory::Private => "intimate_observer",
        RegionCategory::Domestic => "domestic_watcher",
        RegionCategory::Transit => "passage_monitor",
        RegionCategory::Utility => "storage_inspector",
    }
}

/// Profile builder over fixation totals
#[derive(Debug, Clone)]
pub struct AttentionAggregator {
    min_total_sec: f64,
}

impl Default for AttentionAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_PROFILE_MIN_TOTAL_SEC)
    }
}

impl AttentionAggregator {
    pub fn new(min_total_sec: f64) -> Self {
        Self { min_total_sec }
    }

    /// Classify attention from `(category, fixation seconds)` pairs in registration order.
    ///
    /// Category totals keep first-encountered order, so ties go to the category
    /// that appeared first.
    pub fn profile(&self, fixations: &[(RegionCategory, f64)]) -> AttentionProfile {
        let mut totals: Vec<(RegionCategory, f64)> = Vec::new();
        for (category, seconds) in fixations {
            match totals.iter_mut().find(|(c, _)| c == category) {
                Some((_, total)) => *total += seconds,
                None => totals.push((*category, *seconds)),
            }
        }

        let grand_total: f64 = totals.iter().map(|(_, t)| t).sum();
        if grand_total < self.min_total_sec {
            return AttentionProfile::Insufficient;
        }

        let mut dominant = totals[0];
        for entry in &totals[1..] {
            if entry.1 > dominant.1 {
                dominant = *entry;
            }
        }

        let share = dominant.1 / grand_total;
        let label = if share > DOMINANT_SHARE {
            category_label(dominant.0)
        } else if share < DIFFUSE_SHARE {
            DIFFUSE_LABEL
        } else {
            NEUTRAL_LABEL
        };

        AttentionProfile::Classified {
            dominant_category: dominant.0,
            share,
            label: label.to_string(),
        }
    }
}

/// Monotonic session score
#[derive(Debug, Clone)]
pub struct Score {
    value: f64,
    every_ticks: u64,
    increment: f64,
    /// Consecutive dwell ticks on the focused region
    streak: u64,
}

impl Score {
    pub fn new(every_ticks: u64, increment: f64) -> Self {
        Self {
            value: 0.0,
            every_ticks: every_ticks.max(1),
            increment,
            streak: 0,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Count a tick of dwell. Returns true when the score grew.
    ///
    /// A focus change restarts the streak; a tick without a hit neither counts
    /// nor restarts it.
    pub fn record_tick(&mut self, hit: bool, focus_changed: bool) -> bool {
        if !hit {
            return false;
        }
        if focus_changed {
            self.streak = 0;
        }
        self.streak += 1;
        if self.streak % self.every_ticks == 0 {
            self.value += self.increment;
            return true;
        }
        false
    }

    /// Add manual-input points. Negative or non-finite amounts are ignored.
    pub fn add_manual(&mut self, points: f64) -> bool {
        if !points.is_finite() || points < 0.0 {
            warn!("ignoring manual score of {points}: score never decreases");
            return false;
        }
        self.value += points;
        true
    }
}
