//! Streaming image loads into caller-owned buffers.
//!
//! [`ImageStreamLoader`] decodes a camera's source image and writes it into a
//! `[Color]` slice the caller allocated, applying three transforms:
//!
//! - **Decimation**: a factor `n` produces `ceil(w/n) x ceil(h/n)` samples.
//!   Each output sample is the mean of its `n x n` source block (box filter);
//!   blocks at the right and bottom edges are clipped to the image. `n = 1`
//!   reproduces the source exactly.
//! - **Band selection**: full color, Rec.709 luminance, or one source channel
//!   replicated into r/g/b. See [`Band`].
//! - **Transpose**: output sample `(x, y)` lands at `x * out_h + y` instead of
//!   `y * out_w + x` (column-major storage).
//!
//! The buffer size is checked before anything is decoded, and the loader
//! never allocates the result buffer.
//!
//! # Example
//!
//! ```rust,ignore
//! use mvs_core::{Color, MultiViewInputParams};
//! use mvs_io::image::{Band, ImageStreamLoader, LoadOptions};
//!
//! let params = MultiViewInputParams::load("session.yaml")?;
//! let loader = ImageStreamLoader::new(&params).with_options(LoadOptions {
//!     scale_factor: 2,
//!     band: Band::Luminance,
//!     ..Default::default()
//! });
//! let mut tile = vec![Color::BLACK; loader.expected_len(0)?];
//! loader.load(0, "images/0000.jpg", &mut tile)?;
//! ```

use std::path::{Path, PathBuf};

use mvs_core::{Color, MultiViewInputParams};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::decode::{self, DecodedImage};
use crate::{IoError, IoResult};

/// Which channel(s) of the source are materialized.
///
/// Integer selectors (as stored in job descriptions) convert with
/// `Band::try_from(i32)`:
///
/// | Selector | Band |
/// |----------|------|
/// | 0 | [`Band::Color`] |
/// | 1 | [`Band::Luminance`] |
/// | 2 | [`Band::Red`] |
/// | 3 | [`Band::Green`] |
/// | 4 | [`Band::Blue`] |
/// | 5 | [`Band::Alpha`] |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Band {
    /// RGB as decoded; gray sources are replicated.
    #[default]
    Color,
    /// Rec.709 luminance replicated into r/g/b.
    Luminance,
    /// Red channel replicated into r/g/b.
    Red,
    /// Green channel replicated into r/g/b.
    Green,
    /// Blue channel replicated into r/g/b.
    Blue,
    /// Alpha channel replicated into r/g/b. The source must have alpha.
    Alpha,
}

impl Band {
    /// Integer selector of this band.
    pub const fn selector(self) -> i32 {
        match self {
            Band::Color => 0,
            Band::Luminance => 1,
            Band::Red => 2,
            Band::Green => 3,
            Band::Blue => 4,
            Band::Alpha => 5,
        }
    }

    /// Maps a box-averaged source pixel to the output color.
    #[inline]
    fn apply(self, rgb: [f32; 3], alpha: f32) -> Color {
        match self {
            Band::Color => Color::new(rgb[0], rgb[1], rgb[2]),
            Band::Luminance => Color::gray(mvs_core::luminance_rec709(rgb)),
            Band::Red => Color::gray(rgb[0]),
            Band::Green => Color::gray(rgb[1]),
            Band::Blue => Color::gray(rgb[2]),
            Band::Alpha => Color::gray(alpha),
        }
    }
}

impl TryFrom<i32> for Band {
    type Error = IoError;

    fn try_from(v: i32) -> IoResult<Self> {
        match v {
            0 => Ok(Band::Color),
            1 => Ok(Band::Luminance),
            2 => Ok(Band::Red),
            3 => Ok(Band::Green),
            4 => Ok(Band::Blue),
            5 => Ok(Band::Alpha),
            _ => Err(IoError::UnsupportedBand(format!("unknown band selector {v}"))),
        }
    }
}

/// Options for [`ImageStreamLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Store the output column-major.
    pub transpose: bool,
    /// Decimation factor, at least 1.
    pub scale_factor: u32,
    /// Channel selection.
    pub band: Band,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            transpose: false,
            scale_factor: 1,
            band: Band::Color,
        }
    }
}

/// Output size of a `width x height` image decimated by `factor`.
#[inline]
pub fn decimated_size(width: u32, height: u32, factor: u32) -> (u32, u32) {
    (width.div_ceil(factor), height.div_ceil(factor))
}

/// Loads source images into caller-owned buffers.
#[derive(Debug, Clone)]
pub struct ImageStreamLoader<'a> {
    params: &'a MultiViewInputParams,
    options: LoadOptions,
}

impl<'a> ImageStreamLoader<'a> {
    /// Creates a loader with default options (no transpose, factor 1, color).
    pub fn new(params: &'a MultiViewInputParams) -> Self {
        Self {
            params,
            options: LoadOptions::default(),
        }
    }

    /// Replaces the load options.
    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Current load options.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Output `(width, height)` for `camera` under the current options.
    pub fn output_size(&self, camera: usize) -> IoResult<(u32, u32)> {
        if self.options.scale_factor == 0 {
            return Err(IoError::InvalidScaleFactor(0));
        }
        let (w, h) = self.camera_dimensions(camera)?;
        Ok(decimated_size(w, h, self.options.scale_factor))
    }

    /// Number of pixels the target buffer must hold for `camera`.
    pub fn expected_len(&self, camera: usize) -> IoResult<usize> {
        let (w, h) = self.output_size(camera)?;
        Ok(w as usize * h as usize)
    }

    fn camera_dimensions(&self, camera: usize) -> IoResult<(u32, u32)> {
        self.params.dimensions(camera).ok_or_else(|| {
            IoError::InvalidAddress(format!(
                "camera {camera} out of range [0, {})",
                self.params.num_cameras()
            ))
        })
    }

    /// Decodes `path` as the image of `camera` into `target`.
    ///
    /// # Errors
    ///
    /// - [`IoError::InvalidAddress`] for an unknown camera
    /// - [`IoError::InvalidScaleFactor`] for a factor of zero
    /// - [`IoError::BufferSizeMismatch`] if `target` has the wrong length
    /// - [`IoError::DimensionMismatch`] if the file's size differs from the camera's
    /// - [`IoError::UnsupportedBand`] for [`Band::Alpha`] on a source without alpha
    /// - decoding errors from [`crate::decode::read`]
    pub fn load<P: AsRef<Path>>(
        &self,
        camera: usize,
        path: P,
        target: &mut [Color],
    ) -> IoResult<()> {
        let path = path.as_ref();
        let (out_w, out_h) = self.output_size(camera)?;
        let expected = out_w as usize * out_h as usize;
        if target.len() != expected {
            return Err(IoError::BufferSizeMismatch {
                expected,
                actual: target.len(),
            });
        }

        let image = decode::read(path)?;
        let (width, height) = self.camera_dimensions(camera)?;
        if (image.width, image.height) != (width, height) {
            return Err(IoError::DimensionMismatch {
                expected: format!("{width}x{height}"),
                actual: format!("{}x{}", image.width, image.height),
            });
        }
        if self.options.band == Band::Alpha && !image.has_alpha() {
            return Err(IoError::UnsupportedBand(format!(
                "{} has no alpha channel",
                path.display()
            )));
        }
        if expected == 0 {
            return Ok(());
        }

        render(&image, &self.options, out_w, out_h, target);

        tracing::debug!(
            camera,
            path = %path.display(),
            scale_factor = self.options.scale_factor,
            transpose = self.options.transpose,
            band = ?self.options.band,
            "loaded image into buffer"
        );
        Ok(())
    }

    /// Loads the session's source image of `camera`.
    ///
    /// Relative image paths are resolved against the session base directory.
    pub fn load_camera(&self, camera: usize, target: &mut [Color]) -> IoResult<()> {
        let path = self.source_path(camera)?;
        self.load(camera, path, target)
    }

    fn source_path(&self, camera: usize) -> IoResult<PathBuf> {
        let info = self.params.camera(camera).ok_or_else(|| {
            IoError::InvalidAddress(format!(
                "camera {camera} out of range [0, {})",
                self.params.num_cameras()
            ))
        })?;
        let image = info.image_path.as_ref().ok_or_else(|| {
            IoError::InvalidAddress(format!("camera {camera} has no source image"))
        })?;
        Ok(if image.is_relative() {
            self.params.base_dir().join(image)
        } else {
            image.clone()
        })
    }
}

/// Smallest output worth splitting across threads.
#[cfg(feature = "rayon")]
const PARALLEL_MIN_SAMPLES: usize = 64 * 64;

/// Output samples per line: a row, or a column when transposed.
#[inline]
fn line_len(options: &LoadOptions, out_w: u32, out_h: u32) -> usize {
    if options.transpose {
        out_h as usize
    } else {
        out_w as usize
    }
}

/// Fills output line `index` (row `index`, or column `index` when transposed).
fn fill_line(image: &DecodedImage, options: &LoadOptions, index: usize, line: &mut [Color]) {
    for (j, px) in line.iter_mut().enumerate() {
        let (ox, oy) = if options.transpose { (index, j) } else { (j, index) };
        *px = sample(image, options.scale_factor, options.band, ox as u32, oy as u32);
    }
}

fn render_serial(
    image: &DecodedImage,
    options: &LoadOptions,
    line_len: usize,
    target: &mut [Color],
) {
    target
        .chunks_mut(line_len)
        .enumerate()
        .for_each(|(i, line)| fill_line(image, options, i, line));
}

#[cfg(feature = "rayon")]
fn render_parallel(
    image: &DecodedImage,
    options: &LoadOptions,
    line_len: usize,
    target: &mut [Color],
) {
    target
        .par_chunks_mut(line_len)
        .enumerate()
        .for_each(|(i, line)| fill_line(image, options, i, line));
}

/// Fills a non-empty `out_w x out_h` target from `image`.
fn render(
    image: &DecodedImage,
    options: &LoadOptions,
    out_w: u32,
    out_h: u32,
    target: &mut [Color],
) {
    let line_len = line_len(options, out_w, out_h);

    #[cfg(feature = "rayon")]
    {
        if target.len() >= PARALLEL_MIN_SAMPLES {
            render_parallel(image, options, line_len, target);
            return;
        }
    }

    render_serial(image, options, line_len, target);
}

/// Box-filtered output sample `(ox, oy)` for decimation factor `n`.
fn sample(image: &DecodedImage, n: u32, band: Band, ox: u32, oy: u32) -> Color {
    let x0 = ox * n;
    let y0 = oy * n;
    if n == 1 {
        return band.apply(image.rgb(x0, y0), image.alpha(x0, y0));
    }
    let x1 = (x0 + n).min(image.width);
    let y1 = (y0 + n).min(image.height);

    let mut rgb = [0.0f32; 3];
    let mut alpha = 0.0f32;
    for y in y0..y1 {
        for x in x0..x1 {
            let px = image.rgb(x, y);
            rgb[0] += px[0];
            rgb[1] += px[1];
            rgb[2] += px[2];
            alpha += image.alpha(x, y);
        }
    }
    let count = ((x1 - x0) * (y1 - y0)) as f32;
    band.apply([rgb[0] / count, rgb[1] / count, rgb[2] / count], alpha / count)
}

/// Loads `path` as the image of `camera` into `target`.
///
/// Convenience form of [`ImageStreamLoader::load`].
pub fn load_image<P: AsRef<Path>>(
    params: &MultiViewInputParams,
    camera: usize,
    path: P,
    target: &mut [Color],
    transpose: bool,
    scale_factor: u32,
    band: Band,
) -> IoResult<()> {
    ImageStreamLoader::new(params)
        .with_options(LoadOptions {
            transpose,
            scale_factor,
            band,
        })
        .load(camera, path, target)
}
