//! # mvs-core
//!
//! Core types for multi-view reconstruction artifacts.
//!
//! This crate provides the value types that pipeline stages exchange through
//! the artifact store, and the session configuration every stage is started
//! with:
//!
//! - [`Point3d`], [`OrientedPoint`], [`Matrix3x4`] - Geometry with a fixed binary layout
//! - [`Color`] - RGB pixel used for image tiles
//! - [`SeedPoint`] - Surface sample plus its visible-camera list
//! - [`FileKind`] - Closed set of artifact kinds and their naming templates
//! - [`MultiViewInputParams`] - Session configuration (output tree, cameras, pyramid)
//!
//! ## Crate Structure
//!
//! ```text
//! mvs-core (this crate)
//!    ^
//!    |
//!    +-- mvs-io (naming, codecs, stores)
//!    +-- mvs-tests (end-to-end tests)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod color;
pub mod error;
pub mod geometry;
pub mod kind;
pub mod params;
pub mod seed;

pub use color::{luminance_rec709, Color, REC709_LUMA_B, REC709_LUMA_G, REC709_LUMA_R};
pub use error::{Error, Result};
pub use geometry::{Matrix3x4, OrientedPoint, Point3d};
pub use kind::FileKind;
pub use params::{CameraInfo, MultiViewInputParams};
pub use seed::SeedPoint;

/// Prelude module for convenient imports.
///
/// ```
/// use mvs_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::Color;
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Matrix3x4, OrientedPoint, Point3d};
    pub use crate::kind::FileKind;
    pub use crate::params::{CameraInfo, MultiViewInputParams};
    pub use crate::seed::SeedPoint;
}
