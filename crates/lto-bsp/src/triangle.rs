//! Resolved triangle geometry.

use nalgebra::{Point3, Vector3};

/// A triangle whose vertex indices have been looked up in a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    vertices: [Point3<f64>; 3],
}

impl Triangle {
    /// Creates a new triangle from three points.
    ///
    /// The winding order determines the normal direction via the right-hand rule:
    /// normal = (b - a) × (c - a)
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Returns the three vertices of the triangle.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>; 3] {
        &self.vertices
    }

    /// Computes the (unnormalized) normal vector of the triangle.
    pub fn normal(&self) -> Vector3<f64> {
        let [a, b, c] = &self.vertices;
        (b - a).cross(&(c - a))
    }

    /// Computes the unit normal vector of the triangle.
    ///
    /// Returns `None` if the triangle is degenerate (zero area).
    pub fn unit_normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal();
        let len = n.norm();
        if len > f64::EPSILON {
            Some(n / len)
        } else {
            None
        }
    }

    /// Surface area.
    pub fn area(&self) -> f64 {
        self.normal().norm() * 0.5
    }

    /// Computes the centroid (mean of the three vertices).
    pub fn centroid(&self) -> Point3<f64> {
        let [a, b, c] = &self.vertices;
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ccw_winding_points_up() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let n = tri.unit_normal().unwrap();
        assert!((n - Vector3::z()).norm() < 1e-12);
        assert!((tri.area() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn degenerate_has_no_normal() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
        );
        assert!(tri.unit_normal().is_none());
        assert_eq!(tri.area(), 0.0);
    }

    #[test]
    fn centroid_is_vertex_mean() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 3.0),
        );
        assert_eq!(tri.centroid(), Point3::new(1.0, 1.0, 1.0));
    }
}
