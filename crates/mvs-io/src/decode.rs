//! Source image decoding.
//!
//! Decodes PNG, JPEG and TIFF files into a [`DecodedImage`]: interleaved `f32`
//! samples normalized to `[0, 1]` (8-bit values divided by 255, 16-bit by
//! 65535, float samples unchanged). Grayscale sources keep one channel; the
//! band selection in [`crate::image`] decides how channels are materialized.
//!
//! Each format is behind the cargo feature of the same name.

use std::path::Path;

use crate::detect::Format;
use crate::{IoError, IoResult};

/// A decoded image with interleaved, normalized samples.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channels per pixel: 1 (gray), 2 (gray+alpha), 3 (RGB) or 4 (RGBA).
    pub channels: u32,
    /// Row-major interleaved samples.
    pub data: Vec<f32>,
}

impl DecodedImage {
    /// Creates an image, checking that `data` matches the dimensions.
    pub fn new(width: u32, height: u32, channels: u32, data: Vec<f32>) -> IoResult<Self> {
        if !(1..=4).contains(&channels) {
            return Err(IoError::DecodeError(format!("unsupported channel count: {channels}")));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(IoError::DecodeError(format!(
                "sample count {} does not match {width}x{height}x{channels}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Returns `true` if the image carries an alpha channel.
    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.channels == 2 || self.channels == 4
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels as usize
    }

    /// RGB value of pixel `(x, y)`; gray sources are replicated.
    #[inline]
    pub fn rgb(&self, x: u32, y: u32) -> [f32; 3] {
        let o = self.offset(x, y);
        match self.channels {
            1 | 2 => [self.data[o]; 3],
            _ => [self.data[o], self.data[o + 1], self.data[o + 2]],
        }
    }

    /// Alpha value of pixel `(x, y)`, or 1.0 without an alpha channel.
    #[inline]
    pub fn alpha(&self, x: u32, y: u32) -> f32 {
        if self.has_alpha() {
            self.data[self.offset(x, y) + self.channels as usize - 1]
        } else {
            1.0
        }
    }
}

/// Reads an image, auto-detecting the format.
///
/// # Errors
///
/// - [`IoError::NotFound`] if the file does not exist
/// - [`IoError::UnsupportedFormat`] if the format is unknown or its feature is disabled
/// - [`IoError::DecodeError`] if the file is corrupted
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<DecodedImage> {
    let path = path.as_ref();
    let format = Format::detect(path)?;

    let image = match format {
        #[cfg(feature = "png")]
        Format::Png => read_png(path)?,

        #[cfg(feature = "jpeg")]
        Format::Jpeg => read_jpeg(path)?,

        #[cfg(feature = "tiff")]
        Format::Tiff => read_tiff(path)?,

        #[allow(unreachable_patterns)]
        _ => {
            return Err(IoError::UnsupportedFormat(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            ));
        }
    };
    tracing::trace!(
        path = %path.display(),
        width = image.width,
        height = image.height,
        channels = image.channels,
        "decoded source image"
    );
    Ok(image)
}

#[cfg(any(feature = "png", feature = "jpeg"))]
fn u8_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes.iter().map(|&v| v as f32 / 255.0).collect()
}

#[cfg(any(feature = "png", feature = "jpeg"))]
fn be_u16_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]) as f32 / 65535.0)
        .collect()
}

#[cfg(feature = "png")]
fn read_png(path: &Path) -> IoResult<DecodedImage> {
    let file = crate::naming::open_existing(path)?;
    let mut decoder = png::Decoder::new(std::io::BufReader::new(file));
    // palette and sub-byte gray become 8-bit samples
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    let bytes = &buf[..info.buffer_size()];

    let channels = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        png::ColorType::Indexed => {
            return Err(IoError::DecodeError("palette was not expanded".into()));
        }
    };
    let data = match info.bit_depth {
        png::BitDepth::Eight => u8_to_f32(bytes),
        png::BitDepth::Sixteen => be_u16_to_f32(bytes),
        depth => {
            return Err(IoError::DecodeError(format!("unexpected PNG bit depth {depth:?}")));
        }
    };
    DecodedImage::new(info.width, info.height, channels, data)
}

#[cfg(feature = "jpeg")]
fn read_jpeg(path: &Path) -> IoResult<DecodedImage> {
    let file = crate::naming::open_existing(path)?;
    let mut decoder = jpeg_decoder::Decoder::new(std::io::BufReader::new(file));
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;

    let (channels, data) = match info.pixel_format {
        jpeg_decoder::PixelFormat::L8 => (1, u8_to_f32(&pixels)),
        jpeg_decoder::PixelFormat::L16 => (1, be_u16_to_f32(&pixels)),
        jpeg_decoder::PixelFormat::RGB24 => (3, u8_to_f32(&pixels)),
        jpeg_decoder::PixelFormat::CMYK32 => (3, cmyk_to_rgb(&pixels)),
    };
    DecodedImage::new(info.width as u32, info.height as u32, channels, data)
}

/// CMYK to RGB (approximate conversion).
#[cfg(feature = "jpeg")]
fn cmyk_to_rgb(pixels: &[u8]) -> Vec<f32> {
    pixels
        .chunks_exact(4)
        .flat_map(|cmyk| {
            let k = 1.0 - cmyk[3] as f32 / 255.0;
            [
                (1.0 - cmyk[0] as f32 / 255.0) * k,
                (1.0 - cmyk[1] as f32 / 255.0) * k,
                (1.0 - cmyk[2] as f32 / 255.0) * k,
            ]
        })
        .collect()
}

#[cfg(feature = "tiff")]
fn read_tiff(path: &Path) -> IoResult<DecodedImage> {
    use tiff::decoder::{Decoder, DecodingResult};
    use tiff::ColorType;

    let file = crate::naming::open_existing(path)?;
    let mut decoder = Decoder::new(std::io::BufReader::new(file))
        .map_err(|e: tiff::TiffError| IoError::DecodeError(e.to_string()))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e: tiff::TiffError| IoError::DecodeError(e.to_string()))?;
    let color_type = decoder
        .colortype()
        .map_err(|e: tiff::TiffError| IoError::DecodeError(e.to_string()))?;
    let result = decoder
        .read_image()
        .map_err(|e: tiff::TiffError| IoError::DecodeError(e.to_string()))?;

    let channels = match color_type {
        ColorType::Gray(_) => 1,
        ColorType::GrayA(_) => 2,
        ColorType::RGB(_) => 3,
        ColorType::RGBA(_) => 4,
        ct => {
            return Err(IoError::DecodeError(format!("unsupported TIFF color type: {ct:?}")));
        }
    };
    let data = match result {
        DecodingResult::U8(buf) => buf.iter().map(|&v| v as f32 / 255.0).collect(),
        DecodingResult::U16(buf) => buf.iter().map(|&v| v as f32 / 65535.0).collect(),
        DecodingResult::F32(buf) => buf,
        _ => {
            return Err(IoError::DecodeError(format!(
                "unsupported TIFF sample type for {color_type:?}"
            )));
        }
    };
    DecodedImage::new(width, height, channels, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_sample_count() {
        assert!(DecodedImage::new(2, 2, 3, vec![0.0; 12]).is_ok());
        assert!(DecodedImage::new(2, 2, 3, vec![0.0; 11]).is_err());
        assert!(DecodedImage::new(2, 2, 5, vec![0.0; 20]).is_err());
    }

    #[test]
    fn test_gray_replicates() {
        let img = DecodedImage::new(2, 1, 2, vec![0.25, 0.5, 0.75, 1.0]).unwrap();
        assert_eq!(img.rgb(1, 0), [0.75; 3]);
        assert_eq!(img.alpha(0, 0), 0.5);
        assert!(img.has_alpha());
    }

    #[test]
    fn test_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depthMap_0.exr");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(read(&path), Err(IoError::UnsupportedFormat(_))));
    }

    #[cfg(feature = "jpeg")]
    #[test]
    fn test_cmyk_to_rgb() {
        let rgb = cmyk_to_rgb(&[0, 0, 0, 0, 255, 0, 0, 0, 0, 0, 0, 255]);
        assert_eq!(rgb, vec![1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[cfg(feature = "png")]
    #[test]
    fn test_read_corrupt_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img_0.png");
        std::fs::write(&path, [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3]).unwrap();
        assert!(matches!(read(&path), Err(IoError::DecodeError(_))));
    }
}
