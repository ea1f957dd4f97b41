//! Grid-local geometry: world-space vectors, tile coordinates, and the
//! octile metric used to compare tiles.
//!
//! `Vec2` uses `f32` like the rest of the simulation.  All positions are
//! *grid-local*: two points are only comparable when they sit on the same
//! [`GridId`].

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use crate::GridId;

/// Cost of a diagonal step relative to a cardinal one.
pub const DIAGONAL_COST: f32 = 1.4;

/// Vectors shorter than this are treated as zero when normalizing.
const NORMALIZE_EPSILON: f32 = 1e-6;

// ── Vec2 ──────────────────────────────────────────────────────────────────────

/// A 2-D world-space vector or point.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// `true` for the exact zero vector.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Unit vector in the same direction, or [`Vec2::ZERO`] when the length
    /// is (near) zero or not finite.
    pub fn normalize_or_zero(self) -> Vec2 {
        let len = self.length();
        if !len.is_finite() || len <= NORMALIZE_EPSILON {
            return Vec2::ZERO;
        }
        self / len
    }

    /// Rotate counter-clockwise by `radians`.
    pub fn rotate(self, radians: f32) -> Vec2 {
        let (sin, cos) = radians.sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ── TileCoord ─────────────────────────────────────────────────────────────────

/// Integer index of a tile on a grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Octile (8-connected) distance: cardinal steps cost 1, diagonal steps
    /// cost [`DIAGONAL_COST`].
    pub fn octile_distance(self, other: TileCoord) -> f32 {
        let dx = (self.x - other.x).unsigned_abs() as f32;
        let dy = (self.y - other.y).unsigned_abs() as f32;
        if dx > dy {
            DIAGONAL_COST * dy + (dx - dy)
        } else {
            DIAGONAL_COST * dx + (dy - dx)
        }
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

// ── GridPoint ─────────────────────────────────────────────────────────────────

/// A world-space position tagged with the grid it lives on.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPoint {
    pub grid: GridId,
    pub pos:  Vec2,
}

impl GridPoint {
    #[inline]
    pub fn new(grid: GridId, pos: Vec2) -> Self {
        Self { grid, pos }
    }
}
