//! Axis-aligned splitting planes.

use std::fmt;

use nalgebra::Point3;

use crate::error::BspError;

/// A coordinate axis. Encoded as 0, 1, 2 on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes, in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the coordinate index of this axis.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl TryFrom<u8> for Axis {
    type Error = BspError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Axis::X),
            1 => Ok(Axis::Y),
            2 => Ok(Axis::Z),
            other => Err(BspError::InvalidAxis(other)),
        }
    }
}

impl From<Axis> for u8 {
    fn from(axis: Axis) -> Self {
        axis.index() as u8
    }
}

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Beyond the tolerance band, on the positive side
    Front,
    /// Beyond the tolerance band, on the negative side
    Back,
    /// Within the tolerance band
    OnPlane,
}

/// Classification of a face relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// All vertices at or in front of the plane (within tolerance)
    Front,
    /// All vertices at or behind the plane (within tolerance)
    Back,
    /// Vertices on both sides
    Split,
}

/// The plane `coord[axis] = offset`.
///
/// "Front" is the positive side of the axis; a branch's right child holds the
/// front faces and its left child the faces at or behind the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hyperplane {
    axis: Axis,
    offset: f64,
}

impl Hyperplane {
    /// Creates a plane perpendicular to `axis` at `offset`.
    pub fn new(axis: Axis, offset: f64) -> Self {
        Self { axis, offset }
    }

    /// Creates the plane through `point` perpendicular to `axis`.
    pub fn through_point(axis: Axis, point: &Point3<f64>) -> Self {
        Self::new(axis, point[axis.index()])
    }

    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Signed distance from the plane along its axis.
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        point[self.axis.index()] - self.offset
    }

    /// Classifies a point with the given tolerance band.
    pub fn classify_point(&self, point: &Point3<f64>, fudge: f64) -> PlaneSide {
        let dist = self.signed_distance(point);
        if dist > fudge {
            PlaneSide::Front
        } else if dist < -fudge {
            PlaneSide::Back
        } else {
            PlaneSide::OnPlane
        }
    }

    /// Classifies a triangle by its three vertices.
    ///
    /// A face that fits both the front and back bands (coplanar with the
    /// plane) is reported as [`Classification::Front`].
    pub fn classify_triangle(&self, points: &[Point3<f64>; 3], fudge: f64) -> Classification {
        let axis = self.axis.index();
        if points.iter().all(|p| p[axis] >= self.offset - fudge) {
            Classification::Front
        } else if points.iter().all(|p| p[axis] <= self.offset + fudge) {
            Classification::Back
        } else {
            Classification::Split
        }
    }
}

impl fmt::Display for Hyperplane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.axis {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        write!(f, "{} = {}", name, self.offset)
    }
}
