//! Region index and snapping
//!
//! Holds the screen-space bounds of every trackable region and answers
//! nearest-region and hit-test queries. Registration order is the canonical
//! order for every tie-break in the crate.

use crate::error::GazeError;
use crate::types::{BoundsUpdate, Position, Region, RegionId};
use std::collections::HashSet;

/// Fixed-membership set of regions with refreshable bounds
#[derive(Debug, Clone, Default)]
pub struct RegionIndex {
    regions: Vec<Region>,
}

impl RegionIndex {
    /// Build the index. Region ids must be unique.
    pub fn new(regions: Vec<Region>) -> Result<Self, GazeError> {
        let mut seen = HashSet::with_capacity(regions.len());
        for region in &regions {
            if !seen.insert(region.id) {
                return Err(GazeError::DuplicateRegion(region.id));
            }
        }
        Ok(Self { regions })
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn position_of(&self, id: RegionId) -> Option<usize> {
        self.regions.iter().position(|r| r.id == id)
    }

    /// Replace bounds after a layout change.
    ///
    /// The whole batch is checked first; an unknown id leaves every bound untouched.
    pub fn refresh_bounds(&mut self, updates: &[BoundsUpdate]) -> Result<(), GazeError> {
        let mut resolved = Vec::with_capacity(updates.len());
        for update in updates {
            let idx = self
                .position_of(update.id)
                .ok_or(GazeError::UnknownRegion(update.id))?;
            resolved.push((idx, update.bounds));
        }
        for (idx, bounds) in resolved {
            self.regions[idx].bounds = bounds;
        }
        Ok(())
    }

    /// Closest region center by Euclidean distance; first registered wins a tie
    pub fn nearest(&self, pos: &Position) -> Option<(&Region, f64)> {
        let mut best: Option<(&Region, f64)> = None;
        for region in &self.regions {
            let distance = region.bounds.center().distance_to(pos);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((region, distance)),
            }
        }
        best
    }

    /// Whether `pos` lies inside `region` grown by `margin`
    pub fn hit_test(pos: &Position, region: &Region, margin: f64) -> bool {
        region.bounds.expand(margin).contains(pos)
    }

    /// First region, in registration order, hit by `pos`
    pub fn first_hit(&self, pos: &Position, margin: f64) -> Option<&Region> {
        self.regions
            .iter()
            .find(|region| Self::hit_test(pos, region, margin))
    }
}

/// Pulls positions onto the nearest region center within a proximity threshold
#[derive(Debug, Clone)]
pub struct RegionSnapper {
    threshold: f64,
}

impl RegionSnapper {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Snap when strictly closer than the threshold; a distance equal to it is not snapped
    pub fn snap(&self, index: &RegionIndex, pos: Position) -> Position {
        match index.nearest(&pos) {
            Some((region, distance)) if distance < self.threshold => region.bounds.center(),
            _ => pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Rect, RegionCategory};

    fn grid() -> RegionIndex {
        RegionIndex::new(vec![
            Region::new(1, "A", RegionCategory::Private, Rect::new(0.0, 0.0, 100.0, 100.0)),
            Region::new(2, "B", RegionCategory::Utility, Rect::new(200.0, 0.0, 100.0, 100.0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = RegionIndex::new(vec![
            Region::new(1, "A", RegionCategory::Private, Rect::new(0.0, 0.0, 1.0, 1.0)),
            Region::new(1, "B", RegionCategory::Private, Rect::new(5.0, 0.0, 1.0, 1.0)),
        ]);
        assert!(matches!(result, Err(GazeError::DuplicateRegion(RegionId(1)))));
    }

    #[test]
    fn test_nearest_and_tie_break() {
        let index = grid();
        let (region, distance) = index.nearest(&Position::new(60.0, 50.0)).unwrap();
        assert_eq!(region.id, RegionId(1));
        assert!((distance - 10.0).abs() < 1e-9);

        // Exactly between the two centers (50,50) and (250,50)
        let (region, _) = index.nearest(&Position::new(150.0, 50.0)).unwrap();
        assert_eq!(region.id, RegionId(1));
    }

    #[test]
    fn test_nearest_on_empty_index() {
        let index = RegionIndex::default();
        assert!(index.nearest(&Position::new(0.0, 0.0)).is_none());
        assert!(index.first_hit(&Position::new(0.0, 0.0), 80.0).is_none());
    }

    #[test]
    fn test_snap_boundary() {
        let index = grid();
        let snapper = RegionSnapper::new(30.0);

        let inside = Position::new(50.0, 79.0); // 29 from center
        assert_eq!(snapper.snap(&index, inside), Position::new(50.0, 50.0));

        let on_edge = Position::new(50.0, 80.0); // exactly 30: not snapped
        assert_eq!(snapper.snap(&index, on_edge), on_edge);

        let far = Position::new(50.0, 95.0);
        assert_eq!(snapper.snap(&index, far), far);
    }

    #[test]
    fn test_hit_test_margin() {
        let index = grid();
        let region = &index.regions()[0];
        assert!(RegionIndex::hit_test(&Position::new(-80.0, 50.0), region, 80.0));
        assert!(!RegionIndex::hit_test(&Position::new(-80.5, 50.0), region, 80.0));
        assert!(RegionIndex::hit_test(&Position::new(180.0, 180.0), region, 80.0));
    }

    #[test]
    fn test_first_hit_prefers_registration_order() {
        let index = grid();
        // Inside both expanded boxes (A reaches 180, B starts at 120)
        let hit = index.first_hit(&Position::new(150.0, 50.0), 80.0).unwrap();
        assert_eq!(hit.id, RegionId(1));
    }

    #[test]
    fn test_refresh_bounds_replaces_stale_geometry() {
        let mut index = grid();
        let old_spot = Position::new(50.0, 50.0);
        assert_eq!(index.first_hit(&old_spot, 10.0).unwrap().id, RegionId(1));

        index
            .refresh_bounds(&[BoundsUpdate {
                id: RegionId(1),
                bounds: Rect::new(500.0, 500.0, 100.0, 100.0),
            }])
            .unwrap();

        assert!(index.first_hit(&old_spot, 10.0).is_none());
        assert_eq!(
            index.first_hit(&Position::new(550.0, 550.0), 10.0).unwrap().id,
            RegionId(1)
        );
    }

    #[test]
    fn test_refresh_unknown_id_is_atomic() {
        let mut index = grid();
        let before = index.regions().to_vec();
        let result = index.refresh_bounds(&[
            BoundsUpdate {
                id: RegionId(1),
                bounds: Rect::new(9.0, 9.0, 9.0, 9.0),
            },
            BoundsUpdate {
                id: RegionId(42),
                bounds: Rect::new(0.0, 0.0, 1.0, 1.0),
            },
        ]);
        assert!(matches!(result, Err(GazeError::UnknownRegion(RegionId(42)))));
        assert_eq!(index.regions(), before.as_slice());
    }
}
