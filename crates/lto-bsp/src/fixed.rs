//! 16.16 fixed-point conversion.
//!
//! Source meshes and LTO files store coordinates as signed 32-bit integers
//! with 16 fractional bits. In memory they are `f64`, which represents every
//! 16.16 value exactly.

use nalgebra::Point3;

use crate::error::{BspError, Result};

/// The value of `1.0` in 16.16 fixed point.
pub const FIXED_ONE: f64 = 65536.0;

/// Converts a 16.16 value to render units.
#[inline]
pub fn from_fixed(value: i32) -> f64 {
    value as f64 / FIXED_ONE
}

/// Converts render units to the nearest 16.16 value.
pub fn to_fixed(value: f64) -> Result<i32> {
    let scaled = (value * FIXED_ONE).round();
    if !scaled.is_finite() || scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
        return Err(BspError::CoordinateOutOfRange(value));
    }
    Ok(scaled as i32)
}

/// Converts a fixed-point position to a point.
#[inline]
pub fn point_from_fixed(raw: [i32; 3]) -> Point3<f64> {
    Point3::new(from_fixed(raw[0]), from_fixed(raw[1]), from_fixed(raw[2]))
}

/// Converts a point to its fixed-point position.
pub fn point_to_fixed(point: &Point3<f64>) -> Result<[i32; 3]> {
    Ok([to_fixed(point.x)?, to_fixed(point.y)?, to_fixed(point.z)?])
}
