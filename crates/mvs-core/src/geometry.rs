//! Geometric value types persisted by the artifact store.
//!
//! These are plain-old-data types with a fixed binary layout. They carry no
//! behaviour beyond construction and conversion; the reconstruction algorithms
//! that produce them live elsewhere.
//!
//! # Layout
//!
//! | Type | Bytes | Fields |
//! |------|-------|--------|
//! | [`Point3d`] | 12 | `x, y, z` as `f32` |
//! | [`OrientedPoint`] | 28 | `p`, `n`, `sim` |
//! | [`Matrix3x4`] | 48 | 12 `f32`, row-major |
//!
//! # Usage
//!
//! ```rust
//! use mvs_core::{Matrix3x4, Point3d};
//!
//! let p = Matrix3x4::from_rows([
//!     [1.0, 0.0, 0.0, 0.0],
//!     [0.0, 1.0, 0.0, 0.0],
//!     [0.0, 0.0, 1.0, 0.0],
//! ]);
//! assert_eq!(p.get(2, 2), 1.0);
//! assert_eq!(Point3d::new(1.0, 2.0, 3.0).to_array(), [1.0, 2.0, 3.0]);
//! ```

use std::ops::Index;

/// A 3D point or direction with `f32` components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Point3d {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl Point3d {
    /// Size of the on-disk encoding in bytes.
    pub const ENCODED_SIZE: usize = 12;

    /// Origin (0, 0, 0).
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a point from components.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Creates a point from an `[x, y, z]` array.
    #[inline]
    pub const fn from_array(a: [f32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    /// Returns the components as `[x, y, z]`.
    #[inline]
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<glam::Vec3> for Point3d {
    #[inline]
    fn from(v: glam::Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Point3d> for glam::Vec3 {
    #[inline]
    fn from(p: Point3d) -> Self {
        glam::Vec3::new(p.x, p.y, p.z)
    }
}

impl From<[f32; 3]> for Point3d {
    #[inline]
    fn from(a: [f32; 3]) -> Self {
        Self::from_array(a)
    }
}

/// A surface sample: position, normal and a matching similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct OrientedPoint {
    /// Position in world space.
    pub p: Point3d,
    /// Surface normal.
    pub n: Point3d,
    /// Photo-consistency score of the sample.
    pub sim: f32,
}

impl OrientedPoint {
    /// Size of the on-disk encoding in bytes.
    pub const ENCODED_SIZE: usize = 28;

    /// Creates an oriented point.
    #[inline]
    pub const fn new(p: Point3d, n: Point3d, sim: f32) -> Self {
        Self { p, n, sim }
    }
}

/// A 3x4 camera projection matrix, stored row-major.
///
/// ```text
/// | m[0] m[1]  m[2]  m[3]  |
/// | m[4] m[5]  m[6]  m[7]  |
/// | m[8] m[9]  m[10] m[11] |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Matrix3x4 {
    /// Elements in row-major order.
    pub m: [f32; 12],
}

impl Matrix3x4 {
    /// Size of the on-disk encoding in bytes.
    pub const ENCODED_SIZE: usize = 48;

    /// `[I | 0]`.
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0,
        ],
    };

    /// Creates a matrix from a row-major element array.
    #[inline]
    pub const fn from_array(m: [f32; 12]) -> Self {
        Self { m }
    }

    /// Creates a matrix from three rows of four elements.
    pub const fn from_rows(rows: [[f32; 4]; 3]) -> Self {
        let mut m = [0.0f32; 12];
        let mut r = 0;
        while r < 3 {
            let mut c = 0;
            while c < 4 {
                m[r * 4 + c] = rows[r][c];
                c += 1;
            }
            r += 1;
        }
        Self { m }
    }

    /// Returns the element at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= 3` or `col >= 4`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(row < 3 && col < 4, "index ({row}, {col}) out of range for 3x4 matrix");
        self.m[row * 4 + col]
    }

    /// Returns row `r` as an array.
    #[inline]
    pub fn row(&self, r: usize) -> [f32; 4] {
        [self.m[r * 4], self.m[r * 4 + 1], self.m[r * 4 + 2], self.m[r * 4 + 3]]
    }

    /// Returns the elements in row-major order.
    #[inline]
    pub const fn to_array(self) -> [f32; 12] {
        self.m
    }
}

impl Index<(usize, usize)> for Matrix3x4 {
    type Output = f32;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        assert!(row < 3 && col < 4, "index ({row}, {col}) out of range for 3x4 matrix");
        &self.m[row * 4 + col]
    }
}
