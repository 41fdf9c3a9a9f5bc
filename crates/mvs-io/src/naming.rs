//! Deterministic artifact addressing.
//!
//! An [`Address`] (camera index, [`FileKind`], optional pyramid level) maps to
//! exactly one path under the session's base directory:
//!
//! ```text
//! <base_dir>/<camera>/<stem>.<ext>            kinds stored once per camera
//! <base_dir>/<camera>/<stem>_<scale>.<ext>    kinds stored per pyramid level
//! ```
//!
//! Resolution is a pure function of the session parameters and the address;
//! it never touches the filesystem, so separate pipeline processes agree on
//! every path.
//!
//! # Example
//!
//! ```rust
//! use mvs_core::{FileKind, MultiViewInputParams};
//! use mvs_io::naming::{resolve, Address};
//!
//! let params = MultiViewInputParams::new("/data/mvs")
//!     .with_camera(640, 480)
//!     .with_scales(vec![0, 1]);
//! let path = resolve(&params, &Address::scaled(0, FileKind::DepthMap, 1)).unwrap();
//! assert!(path.ends_with("0/depthMap_1.exr"));
//! ```

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use mvs_core::{FileKind, MultiViewInputParams};

use crate::fsutil::ensure_parent;
use crate::{IoError, IoResult};

/// Location of one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    /// Camera index in `[0, num_cameras)`.
    pub camera: usize,
    /// Artifact kind.
    pub kind: FileKind,
    /// Pyramid level; required for per-scale kinds.
    pub scale: Option<u32>,
}

impl Address {
    /// Address of an artifact stored once per camera.
    pub const fn new(camera: usize, kind: FileKind) -> Self {
        Self {
            camera,
            kind,
            scale: None,
        }
    }

    /// Address of an artifact at pyramid level `scale`.
    pub const fn scaled(camera: usize, kind: FileKind, scale: u32) -> Self {
        Self {
            camera,
            kind,
            scale: Some(scale),
        }
    }

    /// File name of this address, without directories.
    ///
    /// Does not validate the address; see [`resolve`].
    pub fn file_name(&self) -> String {
        match (self.kind.is_per_scale(), self.scale) {
            (true, Some(scale)) => {
                format!("{}_{}.{}", self.kind.stem(), scale, self.kind.extension())
            }
            _ => format!("{}.{}", self.kind.stem(), self.kind.extension()),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scale {
            Some(s) => write!(f, "camera {} {} scale {}", self.camera, self.kind, s),
            None => write!(f, "camera {} {}", self.camera, self.kind),
        }
    }
}

/// Directory holding every artifact of `camera`.
pub fn camera_dir<P: AsRef<Path>>(base_dir: P, camera: usize) -> PathBuf {
    base_dir.as_ref().join(camera.to_string())
}

/// Checks `address` against the session.
pub fn validate(params: &MultiViewInputParams, address: &Address) -> IoResult<()> {
    if address.camera >= params.num_cameras() {
        return Err(IoError::InvalidAddress(format!(
            "camera {} out of range [0, {})",
            address.camera,
            params.num_cameras()
        )));
    }
    match (address.kind.is_per_scale(), address.scale) {
        (true, None) => Err(IoError::InvalidAddress(format!(
            "{} requires a pyramid level",
            address.kind
        ))),
        (true, Some(s)) if MultiViewInputParams::scale_factor(s).is_none() => Err(
            IoError::InvalidAddress(format!("pyramid level {s} is too deep")),
        ),
        (true, Some(s)) if !params.has_scale(s) => Err(IoError::InvalidAddress(format!(
            "pyramid level {s} is not declared (levels: {:?})",
            params.scales()
        ))),
        (false, Some(s)) if s != 0 => Err(IoError::InvalidAddress(format!(
            "{} is not stored per pyramid level, got level {s}",
            address.kind
        ))),
        _ => Ok(()),
    }
}

/// Resolves `address` under the session's base directory.
pub fn resolve(params: &MultiViewInputParams, address: &Address) -> IoResult<PathBuf> {
    resolve_in(params.base_dir(), params, address)
}

/// Resolves `address` under an explicit base directory.
pub fn resolve_in<P: AsRef<Path>>(
    base_dir: P,
    params: &MultiViewInputParams,
    address: &Address,
) -> IoResult<PathBuf> {
    validate(params, address)?;
    Ok(camera_dir(base_dir, address.camera).join(address.file_name()))
}

/// How [`open_file`] opens an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Open an existing artifact for reading.
    Read,
    /// Create or truncate the artifact, creating its directory.
    Write,
}

/// Resolves `address` and opens it.
///
/// A missing artifact in [`OpenMode::Read`] yields [`IoError::NotFound`].
/// Writers that need crash safety should use [`crate::fsutil::write_atomic`]
/// instead of [`OpenMode::Write`].
pub fn open_file(
    params: &MultiViewInputParams,
    address: &Address,
    mode: OpenMode,
) -> IoResult<File> {
    let path = resolve(params, address)?;
    match mode {
        OpenMode::Read => open_existing(&path),
        OpenMode::Write => {
            ensure_parent(&path)?;
            Ok(File::create(&path)?)
        }
    }
}

/// Opens `path` for reading, mapping absence to [`IoError::NotFound`].
pub(crate) fn open_existing(path: &Path) -> IoResult<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => IoError::NotFound(path.to_path_buf()),
        _ => IoError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn params() -> MultiViewInputParams {
        let mut p = MultiViewInputParams::new("/out");
        for _ in 0..8 {
            p = p.with_camera(64, 48);
        }
        p.with_scales(vec![0, 1, 2, 3])
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let params = params();
        let addr = Address::scaled(5, FileKind::DepthMap, 2);
        let a = resolve(&params, &addr).unwrap();
        let b = resolve(&params, &addr).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Path::new("/out/5/depthMap_2.exr"));
    }

    #[test]
    fn test_unscaled_kinds() {
        let params = params();
        let p = resolve(&params, &Address::new(0, FileKind::Seeds)).unwrap();
        assert_eq!(p, Path::new("/out/0/seeds.bin"));
        // level 0 is accepted and means the same artifact
        let q = resolve(&params, &Address::scaled(0, FileKind::Seeds, 0)).unwrap();
        assert_eq!(p, q);
    }

    #[test]
    fn test_no_collisions() {
        let params = params();
        let mut seen = HashSet::new();
        for camera in 0..params.num_cameras() {
            for kind in FileKind::ALL {
                if kind.is_per_scale() {
                    for &s in params.scales() {
                        let path = resolve(&params, &Address::scaled(camera, kind, s)).unwrap();
                        assert!(seen.insert(path));
                    }
                } else {
                    assert!(seen.insert(resolve(&params, &Address::new(camera, kind)).unwrap()));
                }
            }
        }
    }

    #[test]
    fn test_invalid_camera() {
        let err = resolve(&params(), &Address::new(8, FileKind::Seeds)).unwrap_err();
        assert!(matches!(err, IoError::InvalidAddress(_)));
    }

    #[test]
    fn test_missing_scale() {
        let err = resolve(&params(), &Address::new(1, FileKind::SimMap)).unwrap_err();
        assert!(matches!(err, IoError::InvalidAddress(_)));
    }

    #[test]
    fn test_undeclared_scale() {
        let err = resolve(&params(), &Address::scaled(1, FileKind::PixelTile, 4)).unwrap_err();
        assert!(matches!(err, IoError::InvalidAddress(_)));
    }

    #[test]
    fn test_level_too_deep_for_factor() {
        let params = MultiViewInputParams::new("/out").with_camera(4, 4).with_scales(vec![0, 32]);
        let err = resolve(&params, &Address::scaled(0, FileKind::DepthMap, 32)).unwrap_err();
        assert!(matches!(err, IoError::InvalidAddress(_)));
    }

    #[test]
    fn test_scale_on_unscaled_kind() {
        let addr = Address::scaled(1, FileKind::ProjectionMatrix, 1);
        let err = resolve(&params(), &addr).unwrap_err();
        assert!(matches!(err, IoError::InvalidAddress(_)));
    }

    #[test]
    fn test_resolve_in_overrides_base() {
        let addr = Address::new(2, FileKind::DepthRange);
        let p = resolve_in("/elsewhere", &params(), &addr).unwrap();
        assert_eq!(p, Path::new("/elsewhere/2/depthMapInfo.bin"));
    }

    #[test]
    fn test_open_missing_for_read() {
        let dir = tempfile::tempdir().unwrap();
        let params = MultiViewInputParams::new(dir.path()).with_camera(4, 4);
        let addr = Address::new(0, FileKind::Seeds);
        let err = open_file(&params, &addr, OpenMode::Read).unwrap_err();
        assert!(err.is_not_found());
        open_file(&params, &addr, OpenMode::Write).unwrap();
        assert!(dir.path().join("0/seeds.bin").is_file());
    }
}
