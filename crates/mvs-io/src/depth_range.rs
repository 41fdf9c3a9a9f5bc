//! Per-camera depth bounds and target cameras.
//!
//! The matching stage writes one record per reference camera; the depth-map
//! stage reads it back. A record is always rewritten whole.
//!
//! ```text
//! f32 min_depth | f32 max_depth | u32 count | count x u32 target camera
//! ```

use std::collections::HashSet;
use std::io::{BufReader, Read, Write};

use mvs_core::{FileKind, MultiViewInputParams};

use crate::codec::{self, DepthRangeHeader};
use crate::fsutil::write_atomic;
use crate::naming::{open_existing, resolve, Address};
use crate::{IoError, IoResult};

/// Depth bounds of a reference camera and the cameras to match it against.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DepthRangeInfo {
    /// Nearest depth to consider.
    pub min_depth: f32,
    /// Farthest depth to consider.
    pub max_depth: f32,
    /// Target cameras, in priority order, without duplicates.
    pub tcams: Vec<u32>,
}

impl DepthRangeInfo {
    /// Creates a record.
    pub fn new(min_depth: f32, max_depth: f32, tcams: Vec<u32>) -> Self {
        Self {
            min_depth,
            max_depth,
            tcams,
        }
    }

    /// Returns the first target camera listed twice, if any.
    fn first_duplicate(&self) -> Option<u32> {
        let mut seen = HashSet::with_capacity(self.tcams.len());
        self.tcams.iter().copied().find(|&c| !seen.insert(c))
    }

    /// Checks that the record can be written.
    pub fn validate(&self) -> IoResult<()> {
        if self.min_depth.is_nan() || self.max_depth.is_nan() || self.min_depth > self.max_depth {
            return Err(IoError::InvalidRecord(format!(
                "depth range [{}, {}] is empty or not a number",
                self.min_depth, self.max_depth
            )));
        }
        if let Some(c) = self.first_duplicate() {
            return Err(IoError::InvalidRecord(format!("target camera {c} listed twice")));
        }
        if u32::try_from(self.tcams.len()).is_err() {
            return Err(IoError::InvalidRecord("too many target cameras".into()));
        }
        Ok(())
    }
}

/// Decodes one record; the stream must end right after it.
pub fn read_depth_range<R: Read + ?Sized>(reader: &mut R) -> IoResult<DepthRangeInfo> {
    let header = codec::read_depth_range_header(reader)?;
    let tcams = codec::read_u32_list(reader, header.count as usize).map_err(|e| match e {
        IoError::TruncatedStream { actual, .. } => IoError::CorruptRecord(format!(
            "depth range declares {} target cameras but only {actual} bytes remain",
            header.count
        )),
        other => other,
    })?;
    if !codec::at_eof(reader)? {
        return Err(IoError::CorruptRecord("trailing bytes after depth range record".into()));
    }
    let info = DepthRangeInfo::new(header.min_depth, header.max_depth, tcams);
    if let Some(c) = info.first_duplicate() {
        return Err(IoError::CorruptRecord(format!("target camera {c} listed twice")));
    }
    Ok(info)
}

/// Encodes one record.
pub fn write_depth_range<W: Write + ?Sized>(writer: &mut W, info: &DepthRangeInfo) -> IoResult<()> {
    info.validate()?;
    let header = DepthRangeHeader {
        min_depth: info.min_depth,
        max_depth: info.max_depth,
        count: info.tcams.len() as u32,
    };
    codec::write_depth_range_header(writer, &header)?;
    codec::write_u32_list(writer, &info.tcams)
}

/// Looks up the depth range of reference camera `camera`.
///
/// # Errors
///
/// [`IoError::NotFound`] when no record was written for the camera; callers
/// must not substitute default bounds.
pub fn get_depth_map_info(
    params: &MultiViewInputParams,
    camera: usize,
) -> IoResult<DepthRangeInfo> {
    let path = resolve(params, &Address::new(camera, FileKind::DepthRange))?;
    let file = open_existing(&path)?;
    let info = read_depth_range(&mut BufReader::new(file))?;
    tracing::debug!(
        camera,
        min_depth = info.min_depth,
        max_depth = info.max_depth,
        tcams = info.tcams.len(),
        "loaded depth range"
    );
    Ok(info)
}

/// Writes the depth range of reference camera `camera`, replacing any
/// previous record atomically.
pub fn save_depth_map_info(
    params: &MultiViewInputParams,
    camera: usize,
    info: &DepthRangeInfo,
) -> IoResult<()> {
    let path = resolve(params, &Address::new(camera, FileKind::DepthRange))?;
    info.validate()?;
    write_atomic(&path, |writer| write_depth_range(writer, info))?;
    tracing::debug!(camera, path = %path.display(), "saved depth range");
    Ok(())
}
