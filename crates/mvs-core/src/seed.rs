//! Seed points: oriented surface samples with their visibility lists.

use crate::{OrientedPoint, Point3d};

/// A reconstructed surface sample produced by the matching stage.
///
/// Besides its position and orientation a seed carries a local tangent frame
/// (`xax`, `yax`), its footprint in pixels, and the ids of every camera that
/// observes it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeedPoint {
    /// Position, normal and similarity score.
    pub op: OrientedPoint,
    /// First tangent-plane axis.
    pub xax: Point3d,
    /// Second tangent-plane axis.
    pub yax: Point3d,
    /// Footprint of the sample in pixels.
    pub pix_size: f32,
    /// Surface area accumulator.
    pub area: u64,
    /// Id of the segment the seed belongs to.
    pub seg_id: u64,
    /// Ids of the cameras that see this seed.
    pub cams: Vec<u32>,
}

impl SeedPoint {
    /// Creates a seed at `op` with an empty tangent frame and no cameras.
    pub fn new(op: OrientedPoint) -> Self {
        Self {
            op,
            ..Default::default()
        }
    }

    /// Sets the segment id.
    pub fn with_seg_id(mut self, seg_id: u64) -> Self {
        self.seg_id = seg_id;
        self
    }

    /// Sets the visible-camera list.
    pub fn with_cams(mut self, cams: Vec<u32>) -> Self {
        self.cams = cams;
        self
    }

    /// Number of cameras observing the seed.
    #[inline]
    pub fn ncams(&self) -> usize {
        self.cams.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let seed = SeedPoint::new(OrientedPoint::default())
            .with_seg_id(7)
            .with_cams(vec![1, 4, 9]);
        assert_eq!(seed.seg_id, 7);
        assert_eq!(seed.ncams(), 3);
        assert_eq!(seed.area, 0);
    }
}
