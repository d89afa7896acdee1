//! Pipeline configuration
//!
//! Every tunable constant of the pipeline lives here. The values drift between
//! product releases, so they are loaded from JSON rather than hard-coded at the
//! use site. Contract values (stability bands, profile breakpoints) are not
//! configuration and stay next to the code that applies them.

use crate::error::GazeError;
use serde::{Deserialize, Serialize};

/// Hold-time thresholds (seconds) for the staged reaction state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionThresholds {
    pub soft_sec: f64,
    pub strong_sec: f64,
    pub logged_sec: f64,
    pub ghost_sec: f64,
    /// Lifetime of the one-shot ghost transient
    pub ghost_transient_ms: f64,
}

impl Default for ReactionThresholds {
    fn default() -> Self {
        Self {
            soft_sec: 0.4,
            strong_sec: 0.9,
            logged_sec: 1.4,
            ghost_sec: 2.2,
            ghost_transient_ms: 220.0,
        }
    }
}

impl ReactionThresholds {
    /// Hold level below which a region's reaction resets
    pub fn reset_level(&self) -> f64 {
        self.soft_sec / 2.0
    }

    fn validate(&self) -> Result<(), GazeError> {
        let ordered = [self.soft_sec, self.strong_sec, self.logged_sec, self.ghost_sec];
        if ordered.iter().any(|t| !t.is_finite() || *t <= 0.0) {
            return Err(GazeError::InvalidConfig(
                "reaction thresholds must be positive".to_string(),
            ));
        }
        if ordered.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(GazeError::InvalidConfig(
                "reaction thresholds must be strictly increasing (soft < strong < logged < ghost)"
                    .to_string(),
            ));
        }
        if !self.ghost_transient_ms.is_finite() || self.ghost_transient_ms < 0.0 {
            return Err(GazeError::InvalidConfig(
                "ghost_transient_ms must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the gaze attention pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Max jump between consecutive accepted samples before a sample is dropped
    pub outlier_threshold_px: f64,
    /// Number of accepted samples averaged by the temporal smoother
    pub smoothing_window: usize,
    /// Distance to a region center under which the position snaps to it
    pub snap_threshold_px: f64,
    /// Hit-test margin added on every side of a region's bounds
    pub hit_margin_px: f64,
    /// Exponential factor for the display cursor (0-1]
    pub display_smoothing: f64,
    /// Fixed tick period
    pub tick_interval_ms: u64,
    /// Hold drain rate relative to accrual for non-hit regions
    pub decay_factor: f64,
    pub reaction: ReactionThresholds,
    /// Jitter ring-buffer capacity
    pub stability_capacity: usize,
    /// Jitter samples required before a rating is produced
    pub stability_min_samples: usize,
    /// Total fixation seconds required before profiling
    pub profile_min_total_sec: f64,
    /// Consecutive dwell ticks on one region per score increment
    pub score_every_ticks: u64,
    pub score_increment: f64,
    /// Log events buffered for a live session's subscriber before new ones are dropped
    pub log_channel_capacity: usize,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            outlier_threshold_px: 700.0,
            smoothing_window: 6,
            snap_threshold_px: 120.0,
            hit_margin_px: 80.0,
            display_smoothing: 0.25,
            tick_interval_ms: 120,
            decay_factor: 2.0,
            reaction: ReactionThresholds::default(),
            stability_capacity: 60,
            stability_min_samples: 5,
            profile_min_total_sec: 1.0,
            score_every_ticks: 50,
            score_increment: 1.0,
            log_channel_capacity: 256,
        }
    }
}

impl GazeConfig {
    /// Tick duration in seconds (the fixed `dt` of the fixation tracker)
    pub fn tick_dt(&self) -> f64 {
        self.tick_interval_ms as f64 / 1000.0
    }

    /// Check every value against its documented domain
    pub fn validate(&self) -> Result<(), GazeError> {
        fn positive(name: &str, value: f64) -> Result<(), GazeError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(GazeError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )))
            }
        }

        positive("outlier_threshold_px", self.outlier_threshold_px)?;
        positive("hit_margin_px", self.hit_margin_px)?;
        positive("profile_min_total_sec", self.profile_min_total_sec)?;
        positive("score_increment", self.score_increment)?;

        if !self.snap_threshold_px.is_finite() || self.snap_threshold_px < 0.0 {
            return Err(GazeError::InvalidConfig(
                "snap_threshold_px must be non-negative".to_string(),
            ));
        }
        if self.smoothing_window == 0 {
            return Err(GazeError::InvalidConfig(
                "smoothing_window must be at least 1".to_string(),
            ));
        }
        if !(self.display_smoothing > 0.0 && self.display_smoothing <= 1.0) {
            return Err(GazeError::InvalidConfig(format!(
                "display_smoothing must be in (0, 1], got {}",
                self.display_smoothing
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(GazeError::InvalidConfig(
                "tick_interval_ms must be positive".to_string(),
            ));
        }
        if !self.decay_factor.is_finite() || self.decay_factor <= 1.0 {
            return Err(GazeError::InvalidConfig(format!(
                "decay_factor must be greater than 1, got {}",
                self.decay_factor
            )));
        }
        if self.stability_min_samples == 0 || self.stability_capacity < self.stability_min_samples
        {
            return Err(GazeError::InvalidConfig(
                "stability_capacity must be at least stability_min_samples (>= 1)".to_string(),
            ));
        }
        if self.score_every_ticks == 0 {
            return Err(GazeError::InvalidConfig(
                "score_every_ticks must be at least 1".to_string(),
            ));
        }
        if self.log_channel_capacity == 0 {
            return Err(GazeError::InvalidConfig(
                "log_channel_capacity must be at least 1".to_string(),
            ));
        }
        self.reaction.validate()
    }

    /// Load and validate configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, GazeError> {
        let config: GazeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, GazeError> {
        serde_json::to_string_pretty(self).map_err(|e| GazeError::EncodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GazeConfig::default().validate().is_ok());
        assert!((GazeConfig::default().tick_dt() - 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = GazeConfig::from_json(r#"{"hit_margin_px": 40, "reaction": {"ghost_sec": 3.0}}"#)
            .unwrap();
        assert_eq!(config.hit_margin_px, 40.0);
        assert_eq!(config.reaction.ghost_sec, 3.0);
        assert_eq!(config.reaction.soft_sec, 0.4);
        assert_eq!(config.smoothing_window, 6);
    }

    #[test]
    fn test_rejects_unordered_thresholds() {
        let result = GazeConfig::from_json(r#"{"reaction": {"strong_sec": 0.3}}"#);
        assert!(matches!(result, Err(GazeError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_weak_decay() {
        let config = GazeConfig {
            decay_factor: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_margin() {
        let config = GazeConfig {
            hit_margin_px: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_log_capacity() {
        let result = GazeConfig::from_json(r#"{"log_channel_capacity": 0}"#);
        assert!(matches!(result, Err(GazeError::InvalidConfig(_))));
    }

    #[test]
    fn test_roundtrip_through_json() {
        let config = GazeConfig::default();
        let loaded = GazeConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            GazeConfig::from_json("not json"),
            Err(GazeError::JsonError(_))
        ));
    }
}
