//! Pixel-tile encoding.
//!
//! Tiles are written as 8-bit RGB PNG through [`write_atomic`], so a reader
//! never sees a partially written tile.

use std::path::Path;

use mvs_core::{Color, FileKind, MultiViewInputParams};

use crate::fsutil::write_atomic;
use crate::image::decimated_size;
use crate::naming::{resolve, Address};
use crate::{IoError, IoResult};

/// Converts a normalized sample to 8 bits.
#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Writes `pixels` (row-major, `width * height` entries) as an 8-bit RGB PNG.
pub fn write_png<P: AsRef<Path>>(
    path: P,
    width: u32,
    height: u32,
    pixels: &[Color],
) -> IoResult<()> {
    let expected = width as usize * height as usize;
    if pixels.len() != expected {
        return Err(IoError::BufferSizeMismatch {
            expected,
            actual: pixels.len(),
        });
    }
    let bytes: Vec<u8> = pixels
        .iter()
        .flat_map(|c| [to_u8(c.r), to_u8(c.g), to_u8(c.b)])
        .collect();

    let path = path.as_ref();
    write_atomic(path, |writer| {
        let mut encoder = png::Encoder::new(writer, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut png_writer = encoder
            .write_header()
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        png_writer
            .write_image_data(&bytes)
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        png_writer
            .finish()
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        Ok(())
    })?;
    tracing::debug!(path = %path.display(), width, height, "wrote pixel tile");
    Ok(())
}

/// Writes the pixel tile of `camera` at pyramid level `scale`.
///
/// `pixels` must hold the camera's image decimated by `2^scale`.
pub fn save_pixel_tile(
    params: &MultiViewInputParams,
    camera: usize,
    scale: u32,
    pixels: &[Color],
) -> IoResult<()> {
    let path = resolve(params, &Address::scaled(camera, FileKind::PixelTile, scale))?;
    let (width, height) = params
        .dimensions(camera)
        .ok_or_else(|| IoError::InvalidAddress(format!("camera {camera} out of range")))?;
    let factor = MultiViewInputParams::scale_factor(scale)
        .ok_or_else(|| IoError::InvalidAddress(format!("pyramid level {scale} is too deep")))?;
    let (w, h) = decimated_size(width, height, factor);
    write_png(path, w, h, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_u8_rounds_and_clamps() {
        assert_eq!(to_u8(0.0), 0);
        assert_eq!(to_u8(1.0), 255);
        assert_eq!(to_u8(2.0), 255);
        assert_eq!(to_u8(-1.0), 0);
        assert_eq!(to_u8(128.0 / 255.0), 128);
    }

    #[test]
    fn test_write_png_size_check() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_png(dir.path().join("t.png"), 2, 2, &[Color::BLACK; 3]).unwrap_err();
        assert!(matches!(err, IoError::BufferSizeMismatch { expected: 4, actual: 3 }));
        assert!(!dir.path().join("t.png").exists());
    }

    #[test]
    fn test_save_pixel_tile_rejects_deep_level() {
        let dir = tempfile::tempdir().unwrap();
        let params = MultiViewInputParams::new(dir.path())
            .with_camera(4, 4)
            .with_scales(vec![0, 32]);
        let err = save_pixel_tile(&params, 0, 32, &[Color::BLACK; 1]).unwrap_err();
        assert!(matches!(err, IoError::InvalidAddress(_)));
        assert!(!dir.path().join("0").exists());
    }
}
