//! Core types for the Synheart Gaze pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw provider samples, logical and display positions, regions, and
//! the published attention outputs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw gaze prediction as delivered by the provider.
///
/// Coordinates are screen pixels; `t` is the provider clock in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub x: f64,
    pub y: f64,
    pub t: f64,
}

impl RawSample {
    pub fn new(x: f64, y: f64, t: f64) -> Self {
        Self { x, y, t }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.t.is_finite()
    }
}

/// A point in screen space.
///
/// Used both for the logical position (drives hit-testing) and the display
/// position (drives rendering only).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Clamp into `[0, width] x [0, height]`
    pub fn clamp_to(&self, viewport: &Viewport) -> Position {
        Position {
            x: self.x.clamp(0.0, viewport.width.max(0.0)),
            y: self.y.clamp(0.0, viewport.height.max(0.0)),
        }
    }
}

/// Viewport size reported by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned screen rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Grow the rectangle by `margin` on all four sides
    pub fn expand(&self, margin: f64) -> Rect {
        Rect {
            left: self.left - margin,
            top: self.top - margin,
            width: self.width + 2.0 * margin,
            height: self.height + 2.0 * margin,
        }
    }

    /// Edges are inclusive
    pub fn contains(&self, pos: &Position) -> bool {
        pos.x >= self.left && pos.x <= self.right() && pos.y >= self.top && pos.y <= self.bottom()
    }
}

/// Stable region identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Semantic category of a region, used for attention profiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionCategory {
    Private,
    Domestic,
    Transit,
    Utility,
}

impl RegionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionCategory::Private => "private",
            RegionCategory::Domestic => "domestic",
            RegionCategory::Transit => "transit",
            RegionCategory::Utility => "utility",
        }
    }
}

/// A trackable on-screen region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub label: String,
    pub category: RegionCategory,
    pub bounds: Rect,
}

impl Region {
    pub fn new(id: u32, label: impl Into<String>, category: RegionCategory, bounds: Rect) -> Self {
        Self {
            id: RegionId(id),
            label: label.into(),
            category,
            bounds,
        }
    }
}

/// New bounds for an existing region (layout refresh)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsUpdate {
    pub id: RegionId,
    pub bounds: Rect,
}

/// Published reaction stage ordinal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionStage {
    #[default]
    Idle,
    Reacting,
    Logged,
    Ghost,
}

impl ReactionStage {
    pub fn ordinal(&self) -> u8 {
        match self {
            ReactionStage::Idle => 0,
            ReactionStage::Reacting => 1,
            ReactionStage::Logged => 2,
            ReactionStage::Ghost => 3,
        }
    }
}

/// Visual intensity marker within the reacting range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionIntensity {
    #[default]
    None,
    Soft,
    Strong,
}

/// Threshold crossing emitted by a reaction state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionEvent {
    Soft,
    Strong,
    Logged,
    Ghost,
    /// Hold fell below the reset level and all markers cleared
    Cleared,
}

/// Severity of a session log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    Info,
    Alert,
}

/// Auditable stage-crossing notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Position in the session log (arrival order)
    pub seq: u64,
    /// Tick at which the event was raised
    pub tick: u64,
    pub region_id: RegionId,
    pub message: String,
    pub severity: LogSeverity,
    /// Whether the line reveals a sensitive observation
    pub sensitive: bool,
}

/// Stability rating over recent logical-position jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "rating", rename_all = "snake_case")]
pub enum StabilityRating {
    /// Not enough samples collected yet
    Insufficient,
    /// 1 (very jittery) ..= 5 (rock steady)
    Rated(u8),
}

/// Dominant-category attention profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttentionProfile {
    /// Too little total fixation time to classify
    Insufficient,
    Classified {
        dominant_category: RegionCategory,
        /// Dominant category total / grand total (0-1)
        share: f64,
        label: String,
    },
}

/// Per-region slice of a published snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub id: RegionId,
    pub label: String,
    pub stage: ReactionStage,
    pub intensity: ReactionIntensity,
    pub ghost_active: bool,
    pub fixation_time_total: f64,
}

/// Everything the presentation layer may consume after a tick.
///
/// The logical position is deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionSnapshot {
    pub tick: u64,
    pub tracking_enabled: bool,
    /// Cursor position; `None` when the display output is disabled or has no data
    pub display_position: Option<Position>,
    pub focused_region: Option<RegionId>,
    pub focused_label: Option<String>,
    pub regions: Vec<RegionSnapshot>,
    pub score: f64,
    pub stability: StabilityRating,
    pub profile: AttentionProfile,
}

/// Result of feeding one raw sample into the processor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// Sample passed the filter; carries the new logical position
    Accepted(Position),
    /// Dropped as an outlier
    Rejected,
    /// Tracking is disabled
    Ignored,
}

/// Result of one processor tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub hit_region: Option<RegionId>,
    pub focus_changed: bool,
    pub events: Vec<(RegionId, ReactionEvent)>,
    pub log_events: Vec<LogEvent>,
    pub snapshot: AttentionSnapshot,
}
