//! Splitting triangles against axis-aligned planes.

use log::trace;

use crate::{Classification, Face, Hyperplane, MeshModel, PlaneSide};

/// Faces produced by clipping one triangle, grouped by side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipResult {
    /// Pieces at or in front of the plane
    pub front: Vec<Face>,
    /// Pieces at or behind the plane
    pub back: Vec<Face>,
}

impl ClipResult {
    /// Total number of emitted faces.
    pub fn len(&self) -> usize {
        self.front.len() + self.back.len()
    }

    /// True if nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.front.is_empty() && self.back.is_empty()
    }
}

/// Clips `face` against `plane`, appending new intersection vertices to `mesh`.
///
/// The face is split into a triangle on the side of its lone vertex and up to
/// two triangles covering the quad on the other side. Winding is preserved.
/// An edge crossing is snapped to the far vertex when that vertex lies within
/// `fudge` of the plane, or when the crossing fraction along the edge is
/// within `fudge` of 1. The vertex is then reused instead of creating a new
/// one next to it, and triangles that collapse as a result are dropped. At
/// most one end is snapped per face. A face that does not straddle the plane
/// is returned whole on its side.
pub fn clip_face(mesh: &mut MeshModel, face: &Face, plane: &Hyperplane, fudge: f64) -> ClipResult {
    let points = mesh.points(face);
    match plane.classify_triangle(&points, fudge) {
        Classification::Front => {
            return ClipResult {
                front: vec![*face],
                back: Vec::new(),
            };
        }
        Classification::Back => {
            return ClipResult {
                front: Vec::new(),
                back: vec![*face],
            };
        }
        Classification::Split => {}
    }

    let axis = plane.axis().index();
    let in_front = points.map(|p| p[axis] >= plane.offset());
    let lone_in_front = in_front.iter().filter(|&&f| f).count() == 1;

    // Rotate (never reflect) so the lone vertex comes first.
    let k = in_front
        .iter()
        .position(|&f| f == lone_in_front)
        .unwrap_or(0);
    let idx = face.indices();
    let lone = idx[k];
    let other1 = idx[(k + 1) % 3];
    let other2 = idx[(k + 2) % 3];

    let tp = edge_fraction(mesh, plane, lone, other1);
    let tq = edge_fraction(mesh, plane, lone, other2);
    let mut snap_p = snaps_to_other(mesh, plane, fudge, tp, other1);
    let mut snap_q = snaps_to_other(mesh, plane, fudge, tq, other2);
    // Snapping both ends would hand the whole face to the lone side.
    if snap_p && snap_q {
        if tp >= tq {
            snap_q = false;
        } else {
            snap_p = false;
        }
    }

    let p = if snap_p {
        other1
    } else {
        intersect_edge(mesh, plane, lone, other1)
    };
    let q = if snap_q {
        other2
    } else {
        intersect_edge(mesh, plane, lone, other2)
    };

    let mut lone_side = Vec::with_capacity(1);
    let mut other_side = Vec::with_capacity(2);
    push_face(&mut lone_side, [lone, p, q]);
    push_face(&mut other_side, [p, other1, other2]);
    push_face(&mut other_side, [p, other2, q]);

    trace!(
        "clipped {:?} at {}: {} lone-side, {} other-side",
        face,
        plane,
        lone_side.len(),
        other_side.len()
    );

    if lone_in_front {
        ClipResult {
            front: lone_side,
            back: other_side,
        }
    } else {
        ClipResult {
            front: other_side,
            back: lone_side,
        }
    }
}

/// Fraction along `lone -> other` at which the edge meets the plane.
fn edge_fraction(mesh: &MeshModel, plane: &Hyperplane, lone: u32, other: u32) -> f64 {
    let axis = plane.axis().index();
    let from = mesh.vertex(lone)[axis];
    (plane.offset() - from) / (mesh.vertex(other)[axis] - from)
}

/// True when the crossing at fraction `t` counts as `other` itself.
fn snaps_to_other(mesh: &MeshModel, plane: &Hyperplane, fudge: f64, t: f64, other: u32) -> bool {
    t >= 1.0 - fudge || plane.classify_point(&mesh.vertex(other), fudge) == PlaneSide::OnPlane
}

/// Index of the point where the edge `lone -> other` meets the plane.
fn intersect_edge(mesh: &mut MeshModel, plane: &Hyperplane, lone: u32, other: u32) -> u32 {
    // Interpolate from the lower index so a shared edge yields identical bits
    // no matter which face is being clipped.
    let (from, to) = if lone < other {
        (mesh.vertex(lone), mesh.vertex(other))
    } else {
        (mesh.vertex(other), mesh.vertex(lone))
    };
    let axis = plane.axis().index();
    let t = (plane.offset() - from[axis]) / (to[axis] - from[axis]);
    let mut point = from + (to - from) * t;
    point[axis] = plane.offset();

    mesh.insert_vertex(point)
}

fn push_face(out: &mut Vec<Face>, indices: [u32; 3]) {
    let face = Face::from_indices(indices);
    if !face.is_degenerate() {
        out.push(face);
    }
}
