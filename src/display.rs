//! Display cursor smoothing
//!
//! A second low-pass filter that only feeds the rendered cursor. It is kept
//! apart from the logical position so visual lag never changes fixation
//! accounting.

use crate::types::Position;

/// Default exponential factor
pub const DEFAULT_DISPLAY_SMOOTHING: f64 = 0.25;

/// Exponential smoother with an explicit enabled flag
#[derive(Debug, Clone)]
pub struct DisplaySmoother {
    factor: f64,
    current: Option<Position>,
    enabled: bool,
}

impl Default for DisplaySmoother {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_SMOOTHING)
    }
}

impl DisplaySmoother {
    pub fn new(factor: f64) -> Self {
        Self {
            factor: factor.clamp(f64::EPSILON, 1.0),
            current: None,
            enabled: true,
        }
    }

    /// Move the cursor toward `target`. The first target is taken as-is.
    pub fn update(&mut self, target: Position) {
        self.current = Some(match self.current {
            None => target,
            Some(prev) => Position::new(
                prev.x + (target.x - prev.x) * self.factor,
                prev.y + (target.y - prev.y) * self.factor,
            ),
        });
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Cursor position for rendering; `None` while disabled or before any data
    pub fn output(&self) -> Option<Position> {
        if self.enabled {
            self.current
        } else {
            None
        }
    }
}
