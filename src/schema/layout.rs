//! Region layout files
//!
//! A layout carries the viewport size and every region with its current
//! bounds, in registration order.

use crate::error::GazeError;
use crate::types::{BoundsUpdate, Rect, Region, RegionCategory, Viewport};
use serde::{Deserialize, Serialize};

/// Six CCTV windows of the demo wall, in grid order
const DEMO_WINDOWS: [(&str, RegionCategory); 6] = [
    ("BEDROOM", RegionCategory::Private),
    ("KITCHEN", RegionCategory::Domestic),
    ("STAIRCASE", RegionCategory::Transit),
    ("GARAGE", RegionCategory::Utility),
    ("HALLWAY", RegionCategory::Transit),
    ("STORAGE", RegionCategory::Utility),
];

/// Viewport plus regions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutFile {
    pub viewport: Viewport,
    pub regions: Vec<Region>,
}

impl LayoutFile {
    pub fn from_json(json: &str) -> Result<Self, GazeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, GazeError> {
        serde_json::to_string_pretty(self).map_err(|e| GazeError::EncodingError(e.to_string()))
    }

    /// Bounds of every region, for refreshing an existing processor
    pub fn bounds_updates(&self) -> Vec<BoundsUpdate> {
        self.regions
            .iter()
            .map(|r| BoundsUpdate {
                id: r.id,
                bounds: r.bounds,
            })
            .collect()
    }

    /// The 3x2 surveillance wall laid out over a `width` x `height` viewport
    pub fn demo(width: f64, height: f64) -> Self {
        let gap = 16.0;
        let cols = 3.0;
        let rows = 2.0;
        let cell_w = (width - gap * (cols + 1.0)) / cols;
        let cell_h = (height - gap * (rows + 1.0)) / rows;

        let regions = DEMO_WINDOWS
            .iter()
            .enumerate()
            .map(|(i, (name, category))| {
                let col = (i % 3) as f64;
                let row = (i / 3) as f64;
                Region::new(
                    i as u32 + 1,
                    format!("{name} // CAM_0{}", i + 1),
                    *category,
                    Rect::new(
                        gap + col * (cell_w + gap),
                        gap + row * (cell_h + gap),
                        cell_w,
                        cell_h,
                    ),
                )
            })
            .collect();

        Self {
            viewport: Viewport::new(width, height),
            regions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_layout_grid() {
        let layout = LayoutFile::demo(1280.0, 720.0);
        assert_eq!(layout.regions.len(), 6);
        assert_eq!(layout.regions[0].label, "BEDROOM // CAM_01");
        assert_eq!(layout.regions[5].label, "STORAGE // CAM_06");

        let first = layout.regions[0].bounds;
        let second = layout.regions[1].bounds;
        let fourth = layout.regions[3].bounds;
        assert!(first.right() < second.left);
        assert!(first.bottom() < fourth.top);
        assert!(layout.regions[5].bounds.right() <= 1280.0);
        assert!(layout.regions[5].bounds.bottom() <= 720.0);
    }

    #[test]
    fn test_layout_json_roundtrip() {
        let layout = LayoutFile::demo(1000.0, 600.0);
        let loaded = LayoutFile::from_json(&layout.to_json().unwrap()).unwrap();
        assert_eq!(layout, loaded);
        assert_eq!(loaded.bounds_updates().len(), 6);
    }
}
