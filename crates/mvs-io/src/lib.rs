//! # mvs-io
//!
//! Artifact I/O for multi-view reconstruction pipelines.
//!
//! Pipeline stages (matching, depth-map estimation, fusion) run as separate
//! processes over one output tree. This crate is the contract between them:
//!
//! - [`naming`] - Deterministic `(camera, kind, scale)` to path mapping
//! - [`codec`] - Fixed-size little-endian records (matrices, seed headers)
//! - [`seeds`] - Seed-point files
//! - [`depth_range`] - Depth bounds and target cameras per reference camera
//! - [`projection`] - Projection-matrix files
//! - [`image`] - Source images into caller buffers (decimation, bands, transpose)
//! - [`fsutil`] - Existence checks, recursive delete, atomic writes
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use mvs_core::{FileKind, MultiViewInputParams};
//! use mvs_io::{depth_range, seeds};
//!
//! let params = MultiViewInputParams::load("session.yaml")?;
//!
//! match seeds::load_seeds_at(&params, 0, FileKind::Seeds)? {
//!     Some(seeds) => println!("{} seeds", seeds.len()),
//!     None => println!("camera 0 not matched yet"),
//! }
//!
//! let range = depth_range::get_depth_map_info(&params, 0)?;
//! println!("depth [{}, {}] against {:?}", range.min_depth, range.max_depth, range.tcams);
//! ```
//!
//! # Crash Safety
//!
//! Every store writes through [`fsutil::write_atomic`]: a temporary file in
//! the destination directory, flushed and synced, then renamed over the
//! destination. Readers never observe a partially written artifact under its
//! final name. There is no locking; stages own disjoint addresses.
//!
//! # Feature Flags
//!
//! - `png` - PNG source images and pixel tiles (default)
//! - `jpeg` - JPEG source images (default)
//! - `tiff` - TIFF source images (default)
//! - `rayon` - Parallel decimation

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;

pub mod codec;
pub mod decode;
pub mod depth_range;
pub mod detect;
pub mod fsutil;
pub mod image;
pub mod naming;
pub mod projection;
pub mod seeds;

#[cfg(feature = "png")]
pub mod encode;

pub use depth_range::{get_depth_map_info, save_depth_map_info, DepthRangeInfo};
pub use error::{IoError, IoResult};
pub use fsutil::{delete_directory_recursively, file_exists, folder_exists};
pub use image::{load_image, Band, ImageStreamLoader, LoadOptions};
pub use naming::{resolve, Address};
pub use projection::{load_projection_matrix, save_projection_matrix};
pub use seeds::{load_seeds, load_seeds_at, save_seeds, save_seeds_at};
