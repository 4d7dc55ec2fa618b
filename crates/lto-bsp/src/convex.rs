//! Convexity test for face clusters.

use crate::{Face, MeshModel};

/// Returns `true` if no face in `faces` has another face's vertex in front of it.
///
/// For each face the unit vector from its centroid to every vertex of every
/// other face is dotted with the face's outward unit normal. Any value above
/// `tolerance` means the cluster folds inward and needs further splitting.
/// Faces with a degenerate normal impose no constraint. The check is O(n²)
/// and returns at the first violation.
pub fn is_convex(mesh: &MeshModel, faces: &[Face], tolerance: f64) -> bool {
    if faces.len() <= 1 {
        return true;
    }

    for (i, face) in faces.iter().enumerate() {
        let triangle = mesh.triangle(face);
        let Some(normal) = triangle.unit_normal() else {
            continue;
        };
        let centroid = triangle.centroid();

        for (j, other) in faces.iter().enumerate() {
            if i == j {
                continue;
            }
            for point in mesh.points(other) {
                let to_vertex = point - centroid;
                let len = to_vertex.norm();
                if len <= f64::EPSILON {
                    continue;
                }
                if (to_vertex / len).dot(&normal) > tolerance {
                    return false;
                }
            }
        }
    }

    true
}
