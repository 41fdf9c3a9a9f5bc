//! Seed-point files.
//!
//! A seed file is a sequence of blocks, each an 80-byte
//! [`SeedHeader`](crate::codec::SeedHeader) followed by `ncams` little-endian
//! `u32` camera ids. There is no count prefix, magic number or version tag;
//! the collection ends at end of file.
//!
//! ```text
//! [header 0][ids 0][header 1][ids 1] ... EOF
//! ```
//!
//! Loading distinguishes three outcomes:
//!
//! - `Ok(Some(seeds))` - the file exists and every block is complete
//! - `Ok(None)` - no file at that location yet
//! - `Err(..)` - the file exists but is truncated or inconsistent
//!
//! Saving writes a temporary file next to the destination and renames it over
//! the destination once everything is flushed to disk.

use std::io::{BufReader, Read, Write};
use std::path::Path;

use mvs_core::{FileKind, MultiViewInputParams, SeedPoint};

use crate::codec::{self, SeedHeader};
use crate::fsutil::write_atomic;
use crate::naming::{open_existing, resolve, Address};
use crate::{IoError, IoResult};

/// Encodes `seeds` to `writer` in file order.
pub fn write_seeds<W: Write + ?Sized>(writer: &mut W, seeds: &[SeedPoint]) -> IoResult<()> {
    for seed in seeds {
        let header = SeedHeader::from_seed(seed)?;
        codec::write_seed_header(writer, &header)?;
        codec::write_u32_list(writer, &seed.cams)?;
    }
    Ok(())
}

/// Decodes seed blocks from `reader` until end of stream.
///
/// A stream that ends inside a header yields
/// [`IoError::TruncatedStream`]; one that ends inside a camera list yields
/// [`IoError::CorruptRecord`].
pub fn read_seeds<R: Read + ?Sized>(reader: &mut R) -> IoResult<Vec<SeedPoint>> {
    let mut seeds = Vec::new();
    while let Some(header) = codec::try_read_seed_header(reader)? {
        let ncams = header.ncams as usize;
        let cams = codec::read_u32_list(reader, ncams).map_err(|e| match e {
            IoError::TruncatedStream { expected, actual } => IoError::CorruptRecord(format!(
                "seed {} declares {ncams} cameras ({expected} bytes), {actual} bytes remain",
                seeds.len()
            )),
            other => other,
        })?;
        seeds.push(header.into_seed(cams));
    }
    Ok(seeds)
}

/// Saves `seeds` to `path`, replacing any previous file atomically.
///
/// Every seed is checked before the file is created, so an oversized camera
/// list leaves the destination untouched.
pub fn save_seeds<P: AsRef<Path>>(seeds: &[SeedPoint], path: P) -> IoResult<()> {
    let path = path.as_ref();
    for seed in seeds {
        SeedHeader::from_seed(seed)?;
    }
    write_atomic(path, |writer| write_seeds(writer, seeds))?;
    tracing::debug!(path = %path.display(), count = seeds.len(), "saved seeds");
    Ok(())
}

/// Saves `seeds` as the `kind` artifact of `camera`.
///
/// `kind` must be a seed kind ([`FileKind::Seeds`] or [`FileKind::GrowedSeeds`]).
pub fn save_seeds_at(
    seeds: &[SeedPoint],
    params: &MultiViewInputParams,
    camera: usize,
    kind: FileKind,
) -> IoResult<()> {
    let path = seed_path(params, camera, kind)?;
    save_seeds(seeds, path)
}

/// Loads the seeds stored at `path`.
///
/// Returns `Ok(None)` if there is no file at `path`.
pub fn load_seeds<P: AsRef<Path>>(path: P) -> IoResult<Option<Vec<SeedPoint>>> {
    let path = path.as_ref();
    let file = match open_existing(path) {
        Ok(file) => file,
        Err(IoError::NotFound(_)) => {
            tracing::debug!(path = %path.display(), "no seed file");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    let seeds = read_seeds(&mut BufReader::new(file))?;
    tracing::debug!(path = %path.display(), count = seeds.len(), "loaded seeds");
    Ok(Some(seeds))
}

/// Loads the `kind` seeds of `camera`; `Ok(None)` if none were saved yet.
pub fn load_seeds_at(
    params: &MultiViewInputParams,
    camera: usize,
    kind: FileKind,
) -> IoResult<Option<Vec<SeedPoint>>> {
    let path = seed_path(params, camera, kind)?;
    load_seeds(path)
}

fn seed_path(
    params: &MultiViewInputParams,
    camera: usize,
    kind: FileKind,
) -> IoResult<std::path::PathBuf> {
    if !kind.is_seed_kind() {
        return Err(IoError::InvalidAddress(format!("{kind} is not a seed artifact")));
    }
    resolve(params, &Address::new(camera, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvs_core::{OrientedPoint, Point3d};
    use std::io::Cursor;
    use tempfile::tempdir;

    fn seed(seg_id: u64, cams: Vec<u32>) -> SeedPoint {
        SeedPoint {
            op: OrientedPoint::new(
                Point3d::new(seg_id as f32, 1.0, -2.0),
                Point3d::new(0.0, 0.0, 1.0),
                0.25,
            ),
            xax: Point3d::new(1.0, 0.0, 0.0),
            yax: Point3d::new(0.0, 1.0, 0.0),
            pix_size: 2.5,
            area: seg_id * 10,
            seg_id,
            cams,
        }
    }

    #[test]
    fn test_stream_layout() {
        let mut out = Vec::new();
        write_seeds(&mut out, &[seed(1, vec![0, 3]), seed(2, vec![])]).unwrap();
        assert_eq!(out.len(), 80 + 8 + 80);
        assert_eq!(&out[80..84], &0u32.to_le_bytes());
        assert_eq!(&out[84..88], &3u32.to_le_bytes());
    }

    #[test]
    fn test_scenario_two_seeds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seeds.bin");
        let seeds = vec![seed(1, vec![0, 3]), seed(2, vec![])];
        save_seeds(&seeds, &path).unwrap();

        let loaded = load_seeds(&path).unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].seg_id, 1);
        assert_eq!(loaded[0].cams, vec![0, 3]);
        assert_eq!(loaded[1].seg_id, 2);
        assert!(loaded[1].cams.is_empty());
        assert_eq!(loaded, seeds);
    }

    #[test]
    fn test_empty_collection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seeds.bin");
        save_seeds(&[], &path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
        assert_eq!(load_seeds(&path).unwrap(), Some(vec![]));
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempdir().unwrap();
        assert_eq!(load_seeds(dir.path().join("nope.bin")).unwrap(), None);
    }

    #[test]
    fn test_every_truncation_is_detected() {
        let seeds = vec![seed(1, vec![4, 5, 6]), seed(2, vec![7])];
        let mut full = Vec::new();
        write_seeds(&mut full, &seeds).unwrap();
        let first_block = 80 + 12;

        for len in 1..full.len() {
            if len == first_block {
                // clean block boundary: a shorter but well-formed list
                continue;
            }
            let err = read_seeds(&mut Cursor::new(&full[..len])).unwrap_err();
            assert!(err.is_corruption(), "length {len}: {err}");
        }
    }

    #[test]
    fn test_ncams_larger_than_remaining() {
        let mut header = SeedHeader::from_seed(&seed(9, vec![])).unwrap();
        header.ncams = 1000;
        let mut bytes = header.encode().to_vec();
        bytes.extend_from_slice(&[0u8; 16]);
        let err = read_seeds(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, IoError::CorruptRecord(_)));
    }

    #[test]
    fn test_address_form() {
        let dir = tempdir().unwrap();
        let params = MultiViewInputParams::new(dir.path()).with_camera(8, 8).with_camera(8, 8);
        let seeds = vec![seed(3, vec![1])];

        assert_eq!(load_seeds_at(&params, 1, FileKind::Seeds).unwrap(), None);
        save_seeds_at(&seeds, &params, 1, FileKind::Seeds).unwrap();
        assert!(dir.path().join("1/seeds.bin").is_file());
        assert_eq!(load_seeds_at(&params, 1, FileKind::Seeds).unwrap(), Some(seeds.clone()));
        assert_eq!(load_seeds_at(&params, 1, FileKind::GrowedSeeds).unwrap(), None);
    }

    #[test]
    fn test_address_form_rejects_other_kinds() {
        let params = MultiViewInputParams::new("/out").with_camera(8, 8);
        let err = load_seeds_at(&params, 0, FileKind::DepthRange).unwrap_err();
        assert!(matches!(err, IoError::InvalidAddress(_)));
        let err = save_seeds_at(&[], &params, 2, FileKind::Seeds).unwrap_err();
        assert!(matches!(err, IoError::InvalidAddress(_)));
    }

    #[test]
    fn test_oversized_list_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seeds.bin");
        save_seeds(&[seed(1, vec![2])], &path).unwrap();
        let before = std::fs::read(&path).unwrap();

        let huge = seed(2, vec![0; u16::MAX as usize + 1]);
        let err = save_seeds(&[huge], &path).unwrap_err();
        assert!(matches!(err, IoError::InvalidRecord(_)));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }
}
