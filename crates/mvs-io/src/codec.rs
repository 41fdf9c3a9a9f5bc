//! Fixed-size little-endian records.
//!
//! Every record in this module has a constant encoded size and no framing.
//! Readers either return a whole record or fail; a short read is reported as
//! [`IoError::TruncatedStream`] with the number of bytes that were available.
//!
//! # Records
//!
//! | Record | Bytes | Layout |
//! |--------|-------|--------|
//! | [`Matrix3x4`] | 48 | 12 x `f32`, row-major |
//! | [`SeedHeader`] | 80 | see below |
//! | [`DepthRangeHeader`] | 12 | `f32 min, f32 max, u32 count` |
//!
//! Seed header layout:
//!
//! ```text
//! offset  size  field
//!      0    12  op.p       (3 x f32)
//!     12    12  op.n       (3 x f32)
//!     24     4  op.sim     (f32)
//!     28    12  xax        (3 x f32)
//!     40    12  yax        (3 x f32)
//!     52     4  pix_size   (f32)
//!     56     8  area       (u64)
//!     64     8  seg_id     (u64)
//!     72     2  ncams      (u16)
//!     74     6  padding    (zero)
//! ```

use std::io::{self, Read, Write};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use mvs_core::{Matrix3x4, OrientedPoint, Point3d, SeedPoint};

use crate::{IoError, IoResult};

/// Reads until `buf` is full or the stream ends, returning the bytes read.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Reads exactly `N` bytes or fails with [`IoError::TruncatedStream`].
fn read_record<const N: usize, R: Read + ?Sized>(reader: &mut R) -> IoResult<[u8; N]> {
    let mut buf = [0u8; N];
    let n = read_full(reader, &mut buf)?;
    if n < N {
        return Err(IoError::TruncatedStream {
            expected: N,
            actual: n,
        });
    }
    Ok(buf)
}

/// Returns `true` if the stream has no bytes left.
pub(crate) fn at_eof<R: Read + ?Sized>(reader: &mut R) -> IoResult<bool> {
    let mut probe = [0u8; 1];
    Ok(read_full(reader, &mut probe)? == 0)
}

// === Matrix3x4 ===

/// Reads a row-major 3x4 matrix.
pub fn read_matrix3x4<R: Read + ?Sized>(reader: &mut R) -> IoResult<Matrix3x4> {
    let buf = read_record::<{ Matrix3x4::ENCODED_SIZE }, R>(reader)?;
    let mut m = [0.0f32; 12];
    LittleEndian::read_f32_into(&buf, &mut m);
    Ok(Matrix3x4::from_array(m))
}

/// Writes a row-major 3x4 matrix.
pub fn write_matrix3x4<W: Write + ?Sized>(writer: &mut W, m: &Matrix3x4) -> IoResult<()> {
    for v in m.m {
        writer.write_f32::<LittleEndian>(v)?;
    }
    Ok(())
}

// === SeedHeader ===

/// The fixed 80-byte part of a seed block.
///
/// `ncams` camera ids (`u32` each) follow the header in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeedHeader {
    /// Position, normal and similarity.
    pub op: OrientedPoint,
    /// First tangent axis.
    pub xax: Point3d,
    /// Second tangent axis.
    pub yax: Point3d,
    /// Footprint in pixels.
    pub pix_size: f32,
    /// Area accumulator.
    pub area: u64,
    /// Segment id.
    pub seg_id: u64,
    /// Length of the camera-id list that follows.
    pub ncams: u16,
}

impl SeedHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = 80;

    /// Builds the header of `seed`.
    ///
    /// Fails with [`IoError::InvalidRecord`] if the camera list does not fit
    /// the 16-bit count.
    pub fn from_seed(seed: &SeedPoint) -> IoResult<Self> {
        let ncams = u16::try_from(seed.cams.len()).map_err(|_| {
            IoError::InvalidRecord(format!(
                "seed lists {} cameras, at most {} fit the header",
                seed.cams.len(),
                u16::MAX
            ))
        })?;
        Ok(Self {
            op: seed.op,
            xax: seed.xax,
            yax: seed.yax,
            pix_size: seed.pix_size,
            area: seed.area,
            seg_id: seed.seg_id,
            ncams,
        })
    }

    /// Combines the header with its camera list.
    pub fn into_seed(self, cams: Vec<u32>) -> SeedPoint {
        debug_assert_eq!(cams.len(), self.ncams as usize);
        SeedPoint {
            op: self.op,
            xax: self.xax,
            yax: self.yax,
            pix_size: self.pix_size,
            area: self.area,
            seg_id: self.seg_id,
            cams,
        }
    }

    /// Encodes to the on-disk byte layout.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        LittleEndian::write_f32_into(&self.op.p.to_array(), &mut buf[0..12]);
        LittleEndian::write_f32_into(&self.op.n.to_array(), &mut buf[12..24]);
        LittleEndian::write_f32(&mut buf[24..28], self.op.sim);
        LittleEndian::write_f32_into(&self.xax.to_array(), &mut buf[28..40]);
        LittleEndian::write_f32_into(&self.yax.to_array(), &mut buf[40..52]);
        LittleEndian::write_f32(&mut buf[52..56], self.pix_size);
        LittleEndian::write_u64(&mut buf[56..64], self.area);
        LittleEndian::write_u64(&mut buf[64..72], self.seg_id);
        LittleEndian::write_u16(&mut buf[72..74], self.ncams);
        buf
    }

    /// Decodes from the on-disk byte layout. Padding is ignored.
    pub fn decode(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            op: OrientedPoint::new(
                read_point(&buf[0..12]),
                read_point(&buf[12..24]),
                LittleEndian::read_f32(&buf[24..28]),
            ),
            xax: read_point(&buf[28..40]),
            yax: read_point(&buf[40..52]),
            pix_size: LittleEndian::read_f32(&buf[52..56]),
            area: LittleEndian::read_u64(&buf[56..64]),
            seg_id: LittleEndian::read_u64(&buf[64..72]),
            ncams: LittleEndian::read_u16(&buf[72..74]),
        }
    }
}

fn read_point(bytes: &[u8]) -> Point3d {
    let mut v = [0.0f32; 3];
    LittleEndian::read_f32_into(bytes, &mut v);
    Point3d::from_array(v)
}

/// Reads a seed header.
pub fn read_seed_header<R: Read + ?Sized>(reader: &mut R) -> IoResult<SeedHeader> {
    let buf = read_record::<{ SeedHeader::SIZE }, R>(reader)?;
    Ok(SeedHeader::decode(&buf))
}

/// Reads a seed header, or `None` if the stream ends cleanly before it.
///
/// A stream that ends inside the header is still a
/// [`IoError::TruncatedStream`].
pub fn try_read_seed_header<R: Read + ?Sized>(reader: &mut R) -> IoResult<Option<SeedHeader>> {
    let mut buf = [0u8; SeedHeader::SIZE];
    match read_full(reader, &mut buf)? {
        0 => Ok(None),
        SeedHeader::SIZE => Ok(Some(SeedHeader::decode(&buf))),
        n => Err(IoError::TruncatedStream {
            expected: SeedHeader::SIZE,
            actual: n,
        }),
    }
}

/// Writes a seed header.
pub fn write_seed_header<W: Write + ?Sized>(writer: &mut W, header: &SeedHeader) -> IoResult<()> {
    writer.write_all(&header.encode())?;
    Ok(())
}

// === Id lists ===

/// Reads `count` little-endian `u32` ids.
pub fn read_u32_list<R: Read + ?Sized>(reader: &mut R, count: usize) -> IoResult<Vec<u32>> {
    let expected = count.saturating_mul(4);
    // the count comes from the stream; grow with the bytes actually present
    let mut bytes = Vec::with_capacity(expected.min(64 * 1024));
    Read::take(&mut *reader, expected as u64).read_to_end(&mut bytes)?;
    if bytes.len() < expected {
        return Err(IoError::TruncatedStream {
            expected,
            actual: bytes.len(),
        });
    }
    let mut ids = vec![0u32; count];
    LittleEndian::read_u32_into(&bytes, &mut ids);
    Ok(ids)
}

/// Writes little-endian `u32` ids.
pub fn write_u32_list<W: Write + ?Sized>(writer: &mut W, ids: &[u32]) -> IoResult<()> {
    for &id in ids {
        writer.write_u32::<LittleEndian>(id)?;
    }
    Ok(())
}

// === DepthRangeHeader ===

/// Fixed part of a depth-range record; `count` target ids follow.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DepthRangeHeader {
    /// Nearest depth.
    pub min_depth: f32,
    /// Farthest depth.
    pub max_depth: f32,
    /// Number of target cameras.
    pub count: u32,
}

impl DepthRangeHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = 12;
}

/// Reads a depth-range header.
pub fn read_depth_range_header<R: Read + ?Sized>(reader: &mut R) -> IoResult<DepthRangeHeader> {
    let buf = read_record::<{ DepthRangeHeader::SIZE }, R>(reader)?;
    Ok(DepthRangeHeader {
        min_depth: LittleEndian::read_f32(&buf[0..4]),
        max_depth: LittleEndian::read_f32(&buf[4..8]),
        count: LittleEndian::read_u32(&buf[8..12]),
    })
}

/// Writes a depth-range header.
pub fn write_depth_range_header<W: Write + ?Sized>(
    writer: &mut W,
    header: &DepthRangeHeader,
) -> IoResult<()> {
    writer.write_f32::<LittleEndian>(header.min_depth)?;
    writer.write_f32::<LittleEndian>(header.max_depth)?;
    writer.write_u32::<LittleEndian>(header.count)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_header() -> SeedHeader {
        SeedHeader {
            op: OrientedPoint::new(Point3d::new(1.0, 2.0, 3.0), Point3d::new(0.0, 0.0, 1.0), 0.75),
            xax: Point3d::new(1.0, 0.0, 0.0),
            yax: Point3d::new(0.0, 1.0, 0.0),
            pix_size: 1.5,
            area: 0x0102_0304_0506_0708,
            seg_id: 42,
            ncams: 3,
        }
    }

    #[test]
    fn test_seed_header_byte_layout() {
        let bytes = sample_header().encode();
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[20..24], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[24..28], &0.75f32.to_le_bytes());
        assert_eq!(&bytes[52..56], &1.5f32.to_le_bytes());
        assert_eq!(&bytes[56..64], &0x0102_0304_0506_0708u64.to_le_bytes());
        assert_eq!(&bytes[64..72], &42u64.to_le_bytes());
        assert_eq!(&bytes[72..74], &3u16.to_le_bytes());
        assert_eq!(&bytes[74..80], &[0u8; 6]);
    }

    #[test]
    fn test_seed_header_decode_ignores_padding() {
        let mut bytes = sample_header().encode();
        bytes[74..80].copy_from_slice(&[0xAA; 6]);
        assert_eq!(SeedHeader::decode(&bytes), sample_header());
    }

    #[test]
    fn test_truncated_seed_header() {
        let bytes = sample_header().encode();
        let mut cursor = Cursor::new(&bytes[..79]);
        match read_seed_header(&mut cursor) {
            Err(IoError::TruncatedStream { expected, actual }) => {
                assert_eq!(expected, 80);
                assert_eq!(actual, 79);
            }
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn test_try_read_seed_header_clean_eof() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        assert!(try_read_seed_header(&mut cursor).unwrap().is_none());

        let mut cursor = Cursor::new(vec![0u8; 5]);
        assert!(try_read_seed_header(&mut cursor).unwrap_err().is_corruption());
    }

    #[test]
    fn test_matrix_layout() {
        let m = Matrix3x4::from_array([
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0,
        ]);
        let mut out = Vec::new();
        write_matrix3x4(&mut out, &m).unwrap();
        assert_eq!(out.len(), 48);
        assert_eq!(&out[44..48], &12.0f32.to_le_bytes());
        assert_eq!(read_matrix3x4(&mut Cursor::new(&out)).unwrap(), m);
    }

    #[test]
    fn test_matrix_truncated() {
        let err = read_matrix3x4(&mut Cursor::new(vec![0u8; 47])).unwrap_err();
        assert!(matches!(err, IoError::TruncatedStream { expected: 48, actual: 47 }));
    }

    #[test]
    fn test_u32_list_truncated() {
        let mut cursor = Cursor::new(vec![1u8, 0, 0, 0, 2, 0]);
        let err = read_u32_list(&mut cursor, 2).unwrap_err();
        assert!(matches!(err, IoError::TruncatedStream { expected: 8, actual: 6 }));
    }

    #[test]
    fn test_from_seed_rejects_overflow() {
        let seed = SeedPoint::default().with_cams(vec![0; u16::MAX as usize + 1]);
        assert!(matches!(SeedHeader::from_seed(&seed), Err(IoError::InvalidRecord(_))));
    }

    #[test]
    fn test_depth_range_header() {
        let header = DepthRangeHeader {
            min_depth: 0.5,
            max_depth: 12.0,
            count: 4,
        };
        let mut out = Vec::new();
        write_depth_range_header(&mut out, &header).unwrap();
        assert_eq!(out.len(), DepthRangeHeader::SIZE);
        assert_eq!(read_depth_range_header(&mut Cursor::new(&out)).unwrap(), header);
    }
}
