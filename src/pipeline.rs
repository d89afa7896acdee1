//! Pipeline orchestration
//!
//! This module provides the stateful session context of Synheart Gaze. It owns
//! every pipeline stage and exposes the two entry points driven by the host:
//! one per raw provider sample, one per fixed-period tick.
//!
//! Sample path: SampleFilter → TemporalSmoother → RegionSnapper → clamp →
//! logical position (→ DisplaySmoother for the cursor).
//!
//! Tick path: FixationTracker (→ ReactionStateMachine) → StabilityScorer →
//! Score, with the AttentionAggregator evaluated on demand.

use crate::aggregator::{AttentionAggregator, Score};
use crate::config::GazeConfig;
use crate::display::DisplaySmoother;
use crate::error::GazeError;
use crate::filter::{SampleFilter, TemporalSmoother};
use crate::fixation::FixationTracker;
use crate::region::{RegionIndex, RegionSnapper};
use crate::stability::StabilityScorer;
use crate::types::{
    AttentionProfile, AttentionSnapshot, BoundsUpdate, LogEvent, LogSeverity, Position, RawSample,
    ReactionEvent, Region, RegionId, RegionSnapshot, SampleOutcome, TickReport, Viewport,
};
use log::{debug, info, trace, warn};

/// Stateful attention processor for one session.
///
/// Region membership is fixed at construction; bounds may be refreshed.
pub struct GazeProcessor {
    config: GazeConfig,
    filter: SampleFilter,
    smoother: TemporalSmoother,
    snapper: RegionSnapper,
    display: DisplaySmoother,
    regions: RegionIndex,
    tracker: FixationTracker,
    stability: StabilityScorer,
    aggregator: AttentionAggregator,
    score: Score,
    viewport: Option<Viewport>,
    last_raw: Option<RawSample>,
    logical: Option<Position>,
    tracking_enabled: bool,
    ticks: u64,
    log: Vec<LogEvent>,
}

impl GazeProcessor {
    /// Create a processor with validated configuration and the session's regions
    pub fn new(config: GazeConfig, regions: Vec<Region>) -> Result<Self, GazeError> {
        config.validate()?;
        let regions = RegionIndex::new(regions)?;
        let tracker = FixationTracker::new(
            &regions,
            config.tick_dt(),
            config.decay_factor,
            config.hit_margin_px,
            config.reaction.clone(),
        );

        info!(
            "gaze processor ready: {} regions, tick {}ms",
            regions.len(),
            config.tick_interval_ms
        );

        Ok(Self {
            filter: SampleFilter::new(config.outlier_threshold_px),
            smoother: TemporalSmoother::new(config.smoothing_window),
            snapper: RegionSnapper::new(config.snap_threshold_px),
            display: DisplaySmoother::new(config.display_smoothing),
            stability: StabilityScorer::new(
                config.stability_capacity,
                config.stability_min_samples,
            ),
            aggregator: AttentionAggregator::new(config.profile_min_total_sec),
            score: Score::new(config.score_every_ticks, config.score_increment),
            regions,
            tracker,
            viewport: None,
            last_raw: None,
            logical: None,
            tracking_enabled: true,
            ticks: 0,
            log: Vec::new(),
            config,
        })
    }

    /// Processor with default configuration
    pub fn with_regions(regions: Vec<Region>) -> Result<Self, GazeError> {
        Self::new(GazeConfig::default(), regions)
    }

    pub fn config(&self) -> &GazeConfig {
        &self.config
    }

    pub fn regions(&self) -> &RegionIndex {
        &self.regions
    }

    pub fn tracker(&self) -> &FixationTracker {
        &self.tracker
    }

    /// Turn gaze tracking on or off. While off, samples are ignored and no
    /// region is hit, so holds drain and nothing accrues.
    pub fn set_tracking_enabled(&mut self, enabled: bool) {
        if self.tracking_enabled != enabled {
            info!("gaze tracking {}", if enabled { "enabled" } else { "disabled" });
        }
        self.tracking_enabled = enabled;
        self.display.set_enabled(enabled);
    }

    pub fn tracking_enabled(&self) -> bool {
        self.tracking_enabled
    }

    /// Show or hide the display cursor without touching tracking
    pub fn set_display_enabled(&mut self, enabled: bool) {
        self.display.set_enabled(enabled);
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Some(Viewport::new(width, height));
    }

    /// Apply new bounds after a layout change; only the new bounds are used afterwards
    pub fn refresh_bounds(&mut self, updates: &[BoundsUpdate]) -> Result<(), GazeError> {
        self.regions.refresh_bounds(updates)?;
        debug!("refreshed bounds for {} regions", updates.len());

        // The held logical position was snapped against the old geometry
        if self.logical.is_some() {
            self.logical = self.smoother.current().map(|smoothed| self.resolve(smoothed));
        }
        Ok(())
    }

    /// Snap then clamp a smoothed position against the current layout
    fn resolve(&self, smoothed: Position) -> Position {
        let snapped = self.snapper.snap(&self.regions, smoothed);
        match &self.viewport {
            Some(viewport) => snapped.clamp_to(viewport),
            None => snapped,
        }
    }

    /// Feed one raw provider sample
    pub fn on_sample(&mut self, sample: RawSample) -> SampleOutcome {
        if !self.tracking_enabled {
            return SampleOutcome::Ignored;
        }
        if !self.filter.accept(self.last_raw.as_ref(), &sample) {
            trace!("dropped outlier sample ({:.1}, {:.1})", sample.x, sample.y);
            return SampleOutcome::Rejected;
        }
        self.last_raw = Some(sample);

        let smoothed = self.smoother.push(&sample);
        let logical = self.resolve(smoothed);

        self.logical = Some(logical);
        self.display.update(logical);
        SampleOutcome::Accepted(logical)
    }

    /// Latest logical position. Not part of the published outputs.
    pub fn logical_position(&self) -> Option<Position> {
        self.logical
    }

    /// Advance fixation, reactions, stability and score by one tick
    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;

        let position = if self.tracking_enabled {
            self.logical
        } else {
            None
        };
        let outcome = self.tracker.tick(&self.regions, position);

        if outcome.focus_changed {
            if let Some(region) = outcome.hit.and_then(|id| self.regions.get(id)) {
                info!("focus -> {} ({})", region.label, region.id);
            }
        }

        if let Some(position) = position {
            self.stability.observe(position);
        }
        self.score
            .record_tick(outcome.hit.is_some(), outcome.focus_changed);

        let mut log_events = Vec::new();
        for (region_id, event) in &outcome.events {
            debug!("region {region_id} reaction {event:?}");
            if let Some(entry) = self.log_entry(*region_id, *event) {
                self.log.push(entry.clone());
                log_events.push(entry);
            }
        }

        TickReport {
            tick: self.ticks,
            hit_region: outcome.hit,
            focus_changed: outcome.focus_changed,
            events: outcome.events,
            log_events,
            snapshot: self.snapshot(),
        }
    }

    fn log_entry(&self, region_id: RegionId, event: ReactionEvent) -> Option<LogEvent> {
        let label = self
            .regions
            .get(region_id)
            .map(|r| r.label.as_str())
            .unwrap_or("UNKNOWN");
        let (message, severity, sensitive) = match event {
            ReactionEvent::Logged => (
                format!("[LOG] {label}: sustained observation recorded"),
                LogSeverity::Info,
                false,
            ),
            ReactionEvent::Ghost => (
                format!("[ALERT] {label}: something looked back"),
                LogSeverity::Alert,
                true,
            ),
            _ => return None,
        };
        Some(LogEvent {
            seq: self.log.len() as u64,
            tick: self.ticks,
            region_id,
            message,
            severity,
            sensitive,
        })
    }

    /// Add manual-input points to the score; negative amounts are ignored
    pub fn add_manual_score(&mut self, points: f64) -> bool {
        self.score.add_manual(points)
    }

    pub fn score(&self) -> f64 {
        self.score.value()
    }

    pub fn profile(&self) -> AttentionProfile {
        let fixations: Vec<_> = self
            .regions
            .regions()
            .iter()
            .map(|r| (r.category, self.tracker.fixation_time_total(r.id)))
            .collect();
        self.aggregator.profile(&fixations)
    }

    /// Session log in arrival order
    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Everything the presentation layer consumes
    pub fn snapshot(&self) -> AttentionSnapshot {
        let focused_region = self.tracker.focused();
        let regions = self
            .regions
            .regions()
            .iter()
            .zip(self.tracker.states())
            .map(|(region, state)| RegionSnapshot {
                id: region.id,
                label: region.label.clone(),
                stage: state.reaction().stage(),
                intensity: state.reaction().intensity(),
                ghost_active: state.reaction().ghost_active(),
                fixation_time_total: self.tracker.fixation_time_total(region.id),
            })
            .collect();

        AttentionSnapshot {
            tick: self.ticks,
            tracking_enabled: self.tracking_enabled,
            display_position: self.display.output(),
            focused_region,
            focused_label: focused_region
                .and_then(|id| self.regions.get(id))
                .map(|r| r.label.clone()),
            regions,
            score: self.score.value(),
            stability: self.stability.rating(),
            profile: self.profile(),
        }
    }
}

/// Drive a processor offline from a recorded sample stream.
///
/// Ticks are laid on the sample clock every `tick_interval_ms`, starting one
/// interval after the first sample with a finite timestamp. All ticks due at
/// or before a sample's timestamp run before that sample is applied, and one
/// final tick closes the stream. Samples without a finite timestamp cannot be
/// placed on the clock and are skipped.
pub fn replay(processor: &mut GazeProcessor, samples: &[RawSample]) -> Vec<TickReport> {
    let interval = processor.config().tick_interval_ms as f64;
    let mut reports = Vec::new();
    let mut next_tick: Option<f64> = None;

    for sample in samples {
        if !sample.t.is_finite() {
            warn!("skipping sample with non-finite timestamp {}", sample.t);
            continue;
        }
        let due = next_tick.get_or_insert(sample.t + interval);
        while *due <= sample.t {
            reports.push(processor.tick());
            *due += interval;
        }
        processor.on_sample(*sample);
    }

    if next_tick.is_some() {
        reports.push(processor.tick());
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ReactionStage, Rect, RegionCategory, StabilityRating};
    use pretty_assertions::assert_eq;

    fn layout() -> Vec<Region> {
        vec![
            Region::new(1, "BEDROOM", RegionCategory::Private, Rect::new(0.0, 0.0, 200.0, 200.0)),
            Region::new(2, "GARAGE", RegionCategory::Utility, Rect::new(600.0, 0.0, 200.0, 200.0)),
        ]
    }

    fn config() -> GazeConfig {
        GazeConfig {
            tick_interval_ms: 100,
            ..Default::default()
        }
    }

    fn processor() -> GazeProcessor {
        GazeProcessor::new(config(), layout()).unwrap()
    }

    #[test]
    fn test_first_sample_becomes_logical_position() {
        let mut p = processor();
        // Far from any center: no snap
        let outcome = p.on_sample(RawSample::new(400.0, 500.0, 0.0));
        assert_eq!(outcome, SampleOutcome::Accepted(Position::new(400.0, 500.0)));
        assert_eq!(p.logical_position(), Some(Position::new(400.0, 500.0)));
    }

    #[test]
    fn test_snap_to_nearby_center() {
        let mut p = processor();
        let outcome = p.on_sample(RawSample::new(130.0, 100.0, 0.0));
        assert_eq!(outcome, SampleOutcome::Accepted(Position::new(100.0, 100.0)));
    }

    #[test]
    fn test_outlier_is_dropped_without_moving() {
        let mut p = processor();
        p.on_sample(RawSample::new(100.0, 100.0, 0.0));
        assert_eq!(p.on_sample(RawSample::new(1900.0, 100.0, 16.0)), SampleOutcome::Rejected);
        assert_eq!(p.logical_position(), Some(Position::new(100.0, 100.0)));
    }

    #[test]
    fn test_viewport_clamp() {
        let mut p = processor();
        p.set_viewport(1000.0, 700.0);
        let outcome = p.on_sample(RawSample::new(1200.0, -50.0, 0.0));
        assert_eq!(outcome, SampleOutcome::Accepted(Position::new(1000.0, 0.0)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = GazeConfig {
            smoothing_window: 0,
            ..Default::default()
        };
        assert!(matches!(
            GazeProcessor::new(bad, layout()),
            Err(GazeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_dwell_escalates_and_logs_in_order() {
        let mut p = processor();
        p.on_sample(RawSample::new(100.0, 100.0, 0.0));

        let mut reports = Vec::new();
        for _ in 0..23 {
            reports.push(p.tick());
        }

        assert!(reports[0].focus_changed);
        assert_eq!(reports[0].snapshot.focused_label.as_deref(), Some("BEDROOM"));

        let last = reports.last().unwrap();
        assert_eq!(last.snapshot.regions[0].stage, ReactionStage::Ghost);
        assert_eq!(last.snapshot.regions[1].stage, ReactionStage::Idle);

        let log = p.log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].seq, 0);
        assert!(!log[0].sensitive);
        assert_eq!(log[1].seq, 1);
        assert!(log[1].sensitive);
        assert_eq!(log[1].severity, LogSeverity::Alert);
        assert!(log[0].tick < log[1].tick);

        // Ghost transient fires exactly once
        let ghosts = reports
            .iter()
            .flat_map(|r| r.events.iter())
            .filter(|(_, e)| *e == ReactionEvent::Ghost)
            .count();
        assert_eq!(ghosts, 1);
    }

    #[test]
    fn test_ghost_transient_visible_briefly() {
        let mut p = processor();
        p.on_sample(RawSample::new(100.0, 100.0, 0.0));
        let reports: Vec<_> = (0..26).map(|_| p.tick()).collect();
        let ghost_tick = reports
            .iter()
            .position(|r| r.events.contains(&(RegionId(1), ReactionEvent::Ghost)))
            .unwrap();
        assert!(reports[ghost_tick].snapshot.regions[0].ghost_active);
        assert!(reports[ghost_tick + 1].snapshot.regions[0].ghost_active);
        assert!(!reports[ghost_tick + 3].snapshot.regions[0].ghost_active);
    }

    #[test]
    fn test_score_grows_with_dwell() {
        let config = GazeConfig {
            tick_interval_ms: 100,
            score_every_ticks: 10,
            ..Default::default()
        };
        let mut p = GazeProcessor::new(config, layout()).unwrap();
        p.on_sample(RawSample::new(100.0, 100.0, 0.0));
        for _ in 0..25 {
            p.tick();
        }
        assert_eq!(p.score(), 2.0);
        assert!(p.add_manual_score(0.5));
        assert!(!p.add_manual_score(-3.0));
        assert_eq!(p.snapshot().score, 2.5);
    }

    #[test]
    fn test_profile_from_dwell() {
        let mut p = processor();
        p.on_sample(RawSample::new(100.0, 100.0, 0.0));
        for _ in 0..8 {
            p.tick();
        }
        assert_eq!(p.profile(), AttentionProfile::Insufficient);
        for _ in 0..2 {
            p.tick();
        }
        match p.profile() {
            AttentionProfile::Classified {
                dominant_category,
                share,
                label,
            } => {
                assert_eq!(dominant_category, RegionCategory::Private);
                assert_eq!(share, 1.0);
                assert_eq!(label, "intimate_observer");
            }
            AttentionProfile::Insufficient => panic!("expected profile"),
        }
    }

    #[test]
    fn test_stability_rating_with_still_gaze() {
        let mut p = processor();
        p.on_sample(RawSample::new(100.0, 100.0, 0.0));
        for _ in 0..5 {
            p.tick();
        }
        // First tick only seeds the reference position
        assert_eq!(p.snapshot().stability, StabilityRating::Insufficient);
        p.tick();
        assert_eq!(p.snapshot().stability, StabilityRating::Rated(5));
    }

    #[test]
    fn test_disabled_tracking_is_inert() {
        let mut p = processor();
        p.set_tracking_enabled(false);
        assert_eq!(p.on_sample(RawSample::new(100.0, 100.0, 0.0)), SampleOutcome::Ignored);
        let report = p.tick();
        assert_eq!(report.hit_region, None);
        assert_eq!(report.snapshot.focused_region, None);
        assert_eq!(report.snapshot.display_position, None);
        assert_eq!(report.snapshot.score, 0.0);
        assert_eq!(report.snapshot.profile, AttentionProfile::Insufficient);
    }

    #[test]
    fn test_resize_moves_hits_to_new_bounds() {
        let mut p = processor();
        p.on_sample(RawSample::new(400.0, 500.0, 0.0));
        assert_eq!(p.tick().hit_region, None);

        p.refresh_bounds(&[BoundsUpdate {
            id: RegionId(2),
            bounds: Rect::new(350.0, 450.0, 100.0, 100.0),
        }])
        .unwrap();
        assert_eq!(p.tick().hit_region, Some(RegionId(2)));

        assert!(matches!(
            p.refresh_bounds(&[BoundsUpdate {
                id: RegionId(9),
                bounds: Rect::new(0.0, 0.0, 1.0, 1.0),
            }]),
            Err(GazeError::UnknownRegion(RegionId(9)))
        ));
    }

    #[test]
    fn test_refresh_re_snaps_held_position() {
        let regions = vec![
            Region::new(1, "KITCHEN", RegionCategory::Domestic, Rect::new(0.0, 0.0, 100.0, 100.0)),
            Region::new(2, "HALLWAY", RegionCategory::Transit, Rect::new(1000.0, 1000.0, 100.0, 100.0)),
        ];
        let mut p = GazeProcessor::new(config(), regions).unwrap();
        assert_eq!(
            p.on_sample(RawSample::new(150.0, 50.0, 0.0)),
            SampleOutcome::Accepted(Position::new(50.0, 50.0))
        );

        p.refresh_bounds(&[
            BoundsUpdate {
                id: RegionId(1),
                bounds: Rect::new(2000.0, 2000.0, 100.0, 100.0),
            },
            BoundsUpdate {
                id: RegionId(2),
                bounds: Rect::new(-100.0, -100.0, 100.0, 100.0),
            },
        ])
        .unwrap();

        // No new sample: the next tick must only see the refreshed geometry
        assert_eq!(p.logical_position(), Some(Position::new(150.0, 50.0)));
        assert_eq!(p.tick().hit_region, None);
    }

    #[test]
    fn test_refresh_before_any_sample_keeps_no_position() {
        let mut p = processor();
        p.refresh_bounds(&[BoundsUpdate {
            id: RegionId(1),
            bounds: Rect::new(10.0, 10.0, 50.0, 50.0),
        }])
        .unwrap();
        assert_eq!(p.logical_position(), None);
        assert_eq!(p.tick().hit_region, None);
    }

    #[test]
    fn test_stalled_provider_reads_as_still_gaze() {
        let mut p = processor();
        p.on_sample(RawSample::new(400.0, 500.0, 0.0));
        p.on_sample(RawSample::new(420.0, 500.0, 30.0));
        // Ticks keep sampling the held position while no new samples arrive
        for _ in 0..6 {
            p.tick();
        }
        assert_eq!(p.snapshot().stability, StabilityRating::Rated(5));
    }

    #[test]
    fn test_empty_layout_is_not_an_error() {
        let mut p = GazeProcessor::with_regions(Vec::new()).unwrap();
        p.on_sample(RawSample::new(10.0, 10.0, 0.0));
        let report = p.tick();
        assert_eq!(report.hit_region, None);
        assert!(report.snapshot.regions.is_empty());
    }

    #[test]
    fn test_replay_schedules_ticks_on_sample_clock() {
        let mut p = processor();
        let samples: Vec<_> = (0..10)
            .map(|i| RawSample::new(100.0, 100.0, i as f64 * 50.0))
            .collect();
        // Samples span 0..450ms: ticks at 100, 200, 300, 400 plus the closing one
        let reports = replay(&mut p, &samples);
        assert_eq!(reports.len(), 5);
        assert_eq!(reports.last().unwrap().tick, 5);
        assert!(replay(&mut processor(), &[]).is_empty());
    }

    #[test]
    fn test_replay_skips_non_finite_timestamps() {
        let mut samples = vec![RawSample::new(100.0, 100.0, f64::NAN)];
        samples.extend((0..100).map(|i| RawSample::new(100.0, 100.0, i as f64 * 100.0)));
        samples.insert(50, RawSample::new(100.0, 100.0, f64::INFINITY));

        // 0..9900ms: ticks at 100..=9900 plus the closing one
        let reports = replay(&mut processor(), &samples);
        assert_eq!(reports.len(), 100);
        assert_eq!(reports[0].hit_region, Some(RegionId(1)));

        let unplaceable = [RawSample::new(100.0, 100.0, f64::NAN)];
        assert!(replay(&mut processor(), &unplaceable).is_empty());
    }
}
