//! Projection-matrix files: 12 little-endian `f32`, row-major, no header.

use std::io::BufReader;

use mvs_core::{FileKind, Matrix3x4, MultiViewInputParams};

use crate::codec;
use crate::fsutil::write_atomic;
use crate::naming::{open_existing, resolve, Address};
use crate::{IoError, IoResult};

/// Loads the projection matrix of `camera`.
///
/// Fails with [`IoError::NotFound`] if none was saved, and with a corruption
/// error if the file is not exactly one matrix long.
pub fn load_projection_matrix(params: &MultiViewInputParams, camera: usize) -> IoResult<Matrix3x4> {
    let path = resolve(params, &Address::new(camera, FileKind::ProjectionMatrix))?;
    let mut reader = BufReader::new(open_existing(&path)?);
    let m = codec::read_matrix3x4(&mut reader)?;
    if !codec::at_eof(&mut reader)? {
        return Err(IoError::CorruptRecord(format!(
            "{} is longer than one 3x4 matrix",
            path.display()
        )));
    }
    Ok(m)
}

/// Saves the projection matrix of `camera`.
pub fn save_projection_matrix(
    params: &MultiViewInputParams,
    camera: usize,
    m: &Matrix3x4,
) -> IoResult<()> {
    let path = resolve(params, &Address::new(camera, FileKind::ProjectionMatrix))?;
    write_atomic(&path, |writer| codec::write_matrix3x4(writer, m))?;
    tracing::debug!(camera, path = %path.display(), "saved projection matrix");
    Ok(())
}
