//! Session configuration shared by every pipeline stage.
//!
//! [`MultiViewInputParams`] describes the output tree (base directory), the
//! cameras of the session with their full-resolution image sizes, and the
//! pyramid levels that exist for per-scale artifacts. It is built once per
//! run, usually from a YAML document, and never mutated afterwards.
//!
//! # YAML
//!
//! ```yaml
//! base_dir: /data/shot010/mvs
//! scales: [0, 1, 2]
//! cameras:
//!   - { width: 1920, height: 1080, image_path: images/0000.jpg }
//!   - { width: 1920, height: 1080 }
//! ```
//!
//! # Usage
//!
//! ```rust
//! use mvs_core::MultiViewInputParams;
//!
//! let params = MultiViewInputParams::new("/tmp/mvs")
//!     .with_camera(640, 480)
//!     .with_camera(640, 480)
//!     .with_scales(vec![0, 1, 2]);
//! assert!(params.validate().is_ok());
//! assert_eq!(params.num_cameras(), 2);
//! assert!(params.has_scale(2));
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

fn default_scales() -> Vec<u32> {
    vec![0]
}

/// Per-camera entry of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraInfo {
    /// Full-resolution image width in pixels.
    pub width: u32,
    /// Full-resolution image height in pixels.
    pub height: u32,
    /// Source image for this camera, if the session knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
}

impl CameraInfo {
    /// Creates a camera entry without a source image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            image_path: None,
        }
    }
}

/// Immutable description of a reconstruction session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiViewInputParams {
    base_dir: PathBuf,
    cameras: Vec<CameraInfo>,
    #[serde(default = "default_scales")]
    scales: Vec<u32>,
}

impl MultiViewInputParams {
    /// Creates an empty session rooted at `base_dir` with only level 0.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            cameras: Vec::new(),
            scales: default_scales(),
        }
    }

    /// Appends a camera with the given full-resolution size.
    pub fn with_camera(mut self, width: u32, height: u32) -> Self {
        self.cameras.push(CameraInfo::new(width, height));
        self
    }

    /// Appends a camera entry.
    pub fn with_camera_info(mut self, info: CameraInfo) -> Self {
        self.cameras.push(info);
        self
    }

    /// Replaces the set of pyramid levels.
    pub fn with_scales(mut self, scales: Vec<u32>) -> Self {
        self.scales = scales;
        self
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let params: Self = serde_yaml::from_str(yaml)?;
        params.validate()?;
        Ok(params)
    }

    /// Reads, parses and validates a YAML configuration file.
    ///
    /// A relative `base_dir` is resolved against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut params = Self::from_yaml_str(&text)?;
        if params.base_dir.is_relative() {
            if let Some(parent) = path.parent() {
                params.base_dir = parent.join(&params.base_dir);
            }
        }
        Ok(params)
    }

    /// Serializes the session to YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Checks the session invariants.
    ///
    /// At least one camera, every camera with non-zero dimensions, and a
    /// duplicate-free scale set that contains the full-resolution level 0.
    pub fn validate(&self) -> Result<()> {
        if self.cameras.is_empty() {
            return Err(Error::invalid_params("session declares no cameras"));
        }
        for (i, cam) in self.cameras.iter().enumerate() {
            if cam.width == 0 || cam.height == 0 {
                return Err(Error::invalid_params(format!(
                    "camera {i} has empty dimensions {}x{}",
                    cam.width, cam.height
                )));
            }
        }
        if !self.scales.contains(&0) {
            return Err(Error::invalid_params("scale set must contain level 0"));
        }
        let unique: HashSet<_> = self.scales.iter().collect();
        if unique.len() != self.scales.len() {
            return Err(Error::invalid_params(format!(
                "duplicate pyramid levels in {:?}",
                self.scales
            )));
        }
        if let Some(&s) = self.scales.iter().find(|&&s| s >= 32) {
            return Err(Error::invalid_params(format!("pyramid level {s} is too deep")));
        }
        Ok(())
    }

    /// Root of the output tree.
    #[inline]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Number of cameras in the session.
    #[inline]
    pub fn num_cameras(&self) -> usize {
        self.cameras.len()
    }

    /// All camera entries.
    #[inline]
    pub fn cameras(&self) -> &[CameraInfo] {
        &self.cameras
    }

    /// Camera entry for `index`, if it exists.
    #[inline]
    pub fn camera(&self, index: usize) -> Option<&CameraInfo> {
        self.cameras.get(index)
    }

    /// Full-resolution `(width, height)` of camera `index`.
    #[inline]
    pub fn dimensions(&self, index: usize) -> Option<(u32, u32)> {
        self.cameras.get(index).map(|c| (c.width, c.height))
    }

    /// Declared pyramid levels.
    #[inline]
    pub fn scales(&self) -> &[u32] {
        &self.scales
    }

    /// Returns `true` if `scale` is a declared pyramid level.
    #[inline]
    pub fn has_scale(&self, scale: u32) -> bool {
        self.scales.contains(&scale)
    }

    /// Decimation factor of a pyramid level (`2^scale`), or `None` if the
    /// level is too deep for a `u32` factor.
    #[inline]
    pub fn scale_factor(scale: u32) -> Option<u32> {
        1u32.checked_shl(scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
base_dir: /data/mvs
scales: [0, 1, 2]
cameras:
  - { width: 1920, height: 1080, image_path: images/0000.jpg }
  - { width: 1280, height: 720 }
"#;

    #[test]
    fn test_from_yaml() {
        let params = MultiViewInputParams::from_yaml_str(YAML).unwrap();
        assert_eq!(params.base_dir(), Path::new("/data/mvs"));
        assert_eq!(params.num_cameras(), 2);
        assert_eq!(params.dimensions(1), Some((1280, 720)));
        assert_eq!(
            params.camera(0).unwrap().image_path.as_deref(),
            Some(Path::new("images/0000.jpg"))
        );
        assert_eq!(params.scales(), &[0, 1, 2]);
    }

    #[test]
    fn test_default_scales() {
        let yaml = "base_dir: out\ncameras:\n  - { width: 4, height: 4 }\n";
        let params = MultiViewInputParams::from_yaml_str(yaml).unwrap();
        assert_eq!(params.scales(), &[0]);
    }

    #[test]
    fn test_rejects_missing_level_zero() {
        let params = MultiViewInputParams::new("out")
            .with_camera(8, 8)
            .with_scales(vec![1, 2]);
        assert!(matches!(params.validate(), Err(Error::InvalidParams(_))));
    }

    #[test]
    fn test_rejects_duplicate_scales() {
        let params = MultiViewInputParams::new("out")
            .with_camera(8, 8)
            .with_scales(vec![0, 1, 1]);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_camera() {
        let params = MultiViewInputParams::new("out").with_camera(0, 8);
        assert!(params.validate().is_err());
        assert!(MultiViewInputParams::new("out").validate().is_err());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let params = MultiViewInputParams::from_yaml_str(YAML).unwrap();
        let text = params.to_yaml_string().unwrap();
        assert_eq!(MultiViewInputParams::from_yaml_str(&text).unwrap(), params);
    }

    #[test]
    fn test_load_resolves_relative_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("session.yaml");
        std::fs::write(&cfg, "base_dir: out\ncameras:\n  - { width: 4, height: 4 }\n").unwrap();
        let params = MultiViewInputParams::load(&cfg).unwrap();
        assert_eq!(params.base_dir(), dir.path().join("out"));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = MultiViewInputParams::from_yaml_str("cameras: [").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_scale_factor() {
        assert_eq!(MultiViewInputParams::scale_factor(0), Some(1));
        assert_eq!(MultiViewInputParams::scale_factor(3), Some(8));
        assert_eq!(MultiViewInputParams::scale_factor(31), Some(1 << 31));
        assert_eq!(MultiViewInputParams::scale_factor(32), None);
    }
}
