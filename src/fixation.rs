//! Per-region fixation accounting
//!
//! Once per tick the region under the logical position accrues hold and
//! fixation time while every other region's hold drains. Reaction staging is
//! driven from the resulting hold values.

use crate::config::ReactionThresholds;
use crate::reaction::ReactionStateMachine;
use crate::region::RegionIndex;
use crate::types::{Position, ReactionEvent, RegionId};

/// Fixation state of one region
#[derive(Debug, Clone)]
pub struct RegionFixationState {
    pub id: RegionId,
    /// Ticks spent under gaze; fixation time is derived from it so sums stay exact
    fixation_ticks: u64,
    hold_time: f64,
    reaction: ReactionStateMachine,
}

impl RegionFixationState {
    fn new(id: RegionId, thresholds: ReactionThresholds) -> Self {
        Self {
            id,
            fixation_ticks: 0,
            hold_time: 0.0,
            reaction: ReactionStateMachine::new(thresholds),
        }
    }

    pub fn fixation_ticks(&self) -> u64 {
        self.fixation_ticks
    }

    pub fn hold_time(&self) -> f64 {
        self.hold_time
    }

    pub fn reaction(&self) -> &ReactionStateMachine {
        &self.reaction
    }
}

/// What a single tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub hit: Option<RegionId>,
    pub focus_changed: bool,
    pub events: Vec<(RegionId, ReactionEvent)>,
}

/// Owns every region's fixation state and the current focus
#[derive(Debug, Clone)]
pub struct FixationTracker {
    dt: f64,
    decay_factor: f64,
    margin: f64,
    states: Vec<RegionFixationState>,
    focused: Option<RegionId>,
}

impl FixationTracker {
    /// One state per region, in the index's registration order
    pub fn new(
        index: &RegionIndex,
        dt: f64,
        decay_factor: f64,
        margin: f64,
        thresholds: ReactionThresholds,
    ) -> Self {
        let states = index
            .regions()
            .iter()
            .map(|r| RegionFixationState::new(r.id, thresholds.clone()))
            .collect();
        Self {
            dt,
            decay_factor,
            margin,
            states,
            focused: None,
        }
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn states(&self) -> &[RegionFixationState] {
        &self.states
    }

    pub fn state(&self, id: RegionId) -> Option<&RegionFixationState> {
        self.states.iter().find(|s| s.id == id)
    }

    pub fn focused(&self) -> Option<RegionId> {
        self.focused
    }

    pub fn fixation_time_total(&self, id: RegionId) -> f64 {
        self.state(id)
            .map(|s| s.fixation_ticks as f64 * self.dt)
            .unwrap_or(0.0)
    }

    /// Advance one tick.
    ///
    /// `position` is `None` when no logical position exists yet; in that case
    /// (as with a miss) every hold decays and nothing accrues.
    pub fn tick(&mut self, index: &RegionIndex, position: Option<Position>) -> TickOutcome {
        let hit = position
            .and_then(|pos| index.first_hit(&pos, self.margin))
            .map(|region| region.id);

        let transient_ms = self.dt * 1000.0;
        let mut events = Vec::new();
        for state in &mut self.states {
            state.reaction.age(transient_ms);

            if Some(state.id) == hit {
                state.hold_time += self.dt;
                state.fixation_ticks += 1;
            } else {
                state.hold_time = (state.hold_time - self.dt * self.decay_factor).max(0.0);
            }

            for event in state.reaction.update(state.hold_time) {
                events.push((state.id, event));
            }
        }

        let focus_changed = match hit {
            Some(id) if self.focused != Some(id) => {
                self.focused = Some(id);
                true
            }
            _ => false,
        };

        TickOutcome {
            hit,
            focus_changed,
            events,
        }
    }
}
