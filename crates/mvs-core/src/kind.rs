//! Artifact kinds and their naming templates.
//!
//! Each [`FileKind`] fixes a file stem, an extension, and whether the artifact
//! exists once per pyramid scale. These values are part of the on-disk
//! contract shared by every pipeline stage and must not change between
//! releases.
//!
//! | Kind | Stem | Ext | Per scale |
//! |------|------|-----|-----------|
//! | [`FileKind::ProjectionMatrix`] | `P` | `bin` | no |
//! | [`FileKind::Seeds`] | `seeds` | `bin` | no |
//! | [`FileKind::GrowedSeeds`] | `growed` | `bin` | no |
//! | [`FileKind::DepthMap`] | `depthMap` | `exr` | yes |
//! | [`FileKind::SimMap`] | `simMap` | `exr` | yes |
//! | [`FileKind::PixelTile`] | `img` | `png` | yes |
//! | [`FileKind::DepthRange`] | `depthMapInfo` | `bin` | no |

use std::fmt;

/// Kind of persisted artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Raw 3x4 projection matrix.
    ProjectionMatrix,
    /// Seed points from the matching stage.
    Seeds,
    /// Seed points after region growing.
    GrowedSeeds,
    /// Depth map.
    DepthMap,
    /// Similarity map accompanying a depth map.
    SimMap,
    /// Decimated RGB image tile.
    PixelTile,
    /// Depth bounds and target cameras of a reference camera.
    DepthRange,
}

impl FileKind {
    /// Every kind, in declaration order.
    pub const ALL: [FileKind; 7] = [
        FileKind::ProjectionMatrix,
        FileKind::Seeds,
        FileKind::GrowedSeeds,
        FileKind::DepthMap,
        FileKind::SimMap,
        FileKind::PixelTile,
        FileKind::DepthRange,
    ];

    /// File stem used in the artifact name.
    pub const fn stem(self) -> &'static str {
        match self {
            FileKind::ProjectionMatrix => "P",
            FileKind::Seeds => "seeds",
            FileKind::GrowedSeeds => "growed",
            FileKind::DepthMap => "depthMap",
            FileKind::SimMap => "simMap",
            FileKind::PixelTile => "img",
            FileKind::DepthRange => "depthMapInfo",
        }
    }

    /// File extension, without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            FileKind::DepthMap | FileKind::SimMap => "exr",
            FileKind::PixelTile => "png",
            FileKind::ProjectionMatrix
            | FileKind::Seeds
            | FileKind::GrowedSeeds
            | FileKind::DepthRange => "bin",
        }
    }

    /// Returns `true` if one artifact exists per pyramid level.
    pub const fn is_per_scale(self) -> bool {
        matches!(self, FileKind::DepthMap | FileKind::SimMap | FileKind::PixelTile)
    }

    /// Returns `true` if the artifact uses the seed file format.
    pub const fn is_seed_kind(self) -> bool {
        matches!(self, FileKind::Seeds | FileKind::GrowedSeeds)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}
