//! Staged reaction state machine
//!
//! Each region escalates through soft → strong → logged → ghost as its hold
//! time grows. Every threshold fires at most once per accrual episode; the
//! episode ends only when hold drops below half the soft threshold.

use crate::config::ReactionThresholds;
use crate::types::{ReactionEvent, ReactionIntensity, ReactionStage};

/// Crossing order; index `i` is reached when the level goes from `i` to `i + 1`
const CROSSINGS: [ReactionEvent; 4] = [
    ReactionEvent::Soft,
    ReactionEvent::Strong,
    ReactionEvent::Logged,
    ReactionEvent::Ghost,
];

/// Per-region reaction bookkeeping
#[derive(Debug, Clone)]
pub struct ReactionStateMachine {
    thresholds: ReactionThresholds,
    /// Number of thresholds crossed in the current episode (0..=4)
    level: u8,
    ghost_remaining_ms: f64,
}

impl Default for ReactionStateMachine {
    fn default() -> Self {
        Self::new(ReactionThresholds::default())
    }
}

impl ReactionStateMachine {
    pub fn new(thresholds: ReactionThresholds) -> Self {
        Self {
            thresholds,
            level: 0,
            ghost_remaining_ms: 0.0,
        }
    }

    /// Feed the region's current hold time and return the crossings it caused.
    ///
    /// Feeding the same hold twice yields no new events.
    pub fn update(&mut self, hold: f64) -> Vec<ReactionEvent> {
        if hold < self.thresholds.reset_level() {
            if self.level > 0 || self.ghost_remaining_ms > 0.0 {
                self.level = 0;
                self.ghost_remaining_ms = 0.0;
                return vec![ReactionEvent::Cleared];
            }
            return Vec::new();
        }

        let limits = [
            self.thresholds.soft_sec,
            self.thresholds.strong_sec,
            self.thresholds.logged_sec,
            self.thresholds.ghost_sec,
        ];

        let mut events = Vec::new();
        for (i, limit) in limits.iter().enumerate() {
            if self.level as usize == i && hold >= *limit {
                self.level += 1;
                let event = CROSSINGS[i];
                if event == ReactionEvent::Ghost {
                    self.ghost_remaining_ms = self.thresholds.ghost_transient_ms;
                }
                events.push(event);
            }
        }
        events
    }

    /// Let the ghost transient run down by `elapsed_ms`
    pub fn age(&mut self, elapsed_ms: f64) {
        self.ghost_remaining_ms = (self.ghost_remaining_ms - elapsed_ms).max(0.0);
    }

    pub fn stage(&self) -> ReactionStage {
        match self.level {
            0 => ReactionStage::Idle,
            1 | 2 => ReactionStage::Reacting,
            3 => ReactionStage::Logged,
            _ => ReactionStage::Ghost,
        }
    }

    pub fn intensity(&self) -> ReactionIntensity {
        match self.level {
            0 => ReactionIntensity::None,
            1 => ReactionIntensity::Soft,
            _ => ReactionIntensity::Strong,
        }
    }

    /// Whether the one-shot ghost effect is still visible
    pub fn ghost_active(&self) -> bool {
        self.ghost_remaining_ms > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> ReactionStateMachine {
        ReactionStateMachine::new(ReactionThresholds {
            soft_sec: 0.4,
            strong_sec: 0.9,
            logged_sec: 1.4,
            ghost_sec: 2.2,
            ghost_transient_ms: 220.0,
        })
    }

    #[test]
    fn test_stage_trajectory() {
        let mut m = machine();
        let mut stages = Vec::new();
        let mut ghosts = 0;
        for hold in [0.0, 0.5, 1.0, 1.5, 2.3] {
            let events = m.update(hold);
            ghosts += events.iter().filter(|e| **e == ReactionEvent::Ghost).count();
            stages.push(m.stage().ordinal());
        }
        assert_eq!(stages, vec![0, 1, 1, 2, 3]);
        assert_eq!(ghosts, 1);
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut m = machine();
        assert_eq!(m.update(1.0), vec![ReactionEvent::Soft, ReactionEvent::Strong]);
        assert!(m.update(1.0).is_empty());
        assert_eq!(m.intensity(), ReactionIntensity::Strong);
    }

    #[test]
    fn test_jump_fires_every_skipped_threshold_once() {
        let mut m = machine();
        let events = m.update(5.0);
        assert_eq!(
            events,
            vec![
                ReactionEvent::Soft,
                ReactionEvent::Strong,
                ReactionEvent::Logged,
                ReactionEvent::Ghost
            ]
        );
        assert!(m.update(6.0).is_empty());
    }

    #[test]
    fn test_partial_decay_keeps_stage() {
        let mut m = machine();
        m.update(1.5);
        assert_eq!(m.stage(), ReactionStage::Logged);
        // Above soft / 2: no reset, no re-trigger
        assert!(m.update(0.25).is_empty());
        assert_eq!(m.stage(), ReactionStage::Logged);
        assert!(m.update(1.5).is_empty());
    }

    #[test]
    fn test_reset_below_half_soft() {
        let mut m = machine();
        m.update(2.5);
        assert!(m.ghost_active());
        assert_eq!(m.update(0.19), vec![ReactionEvent::Cleared]);
        assert_eq!(m.stage(), ReactionStage::Idle);
        assert_eq!(m.intensity(), ReactionIntensity::None);
        assert!(!m.ghost_active());
        // Already clear: nothing more to report
        assert!(m.update(0.0).is_empty());
        // New episode fires again
        assert_eq!(m.update(0.5), vec![ReactionEvent::Soft]);
    }

    #[test]
    fn test_ghost_transient_expires() {
        let mut m = machine();
        m.update(2.2);
        assert!(m.ghost_active());
        m.age(120.0);
        assert!(m.ghost_active());
        m.age(120.0);
        assert!(!m.ghost_active());
        assert_eq!(m.stage(), ReactionStage::Ghost);
    }
}
