//! Indexed triangle mesh with an append-only vertex buffer.

use hashbrown::HashMap;
use nalgebra::Point3;

use crate::error::{BspError, Result};
use crate::fixed::point_from_fixed;
use crate::triangle::Triangle;

/// Three vertex indices, counter-clockwise when seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Face {
    pub v1: u32,
    pub v2: u32,
    pub v3: u32,
}

impl Face {
    pub fn new(v1: u32, v2: u32, v3: u32) -> Self {
        Self { v1, v2, v3 }
    }

    /// The indices in winding order.
    #[inline]
    pub fn indices(&self) -> [u32; 3] {
        [self.v1, self.v2, self.v3]
    }

    /// Builds a face from indices in winding order.
    #[inline]
    pub fn from_indices(indices: [u32; 3]) -> Self {
        Self::new(indices[0], indices[1], indices[2])
    }

    /// True if two corners share a vertex.
    pub fn is_degenerate(&self) -> bool {
        self.v1 == self.v2 || self.v2 == self.v3 || self.v3 == self.v1
    }
}

/// Hash key for exact coordinate equality; `-0.0` and `0.0` share a key.
fn point_key(point: &Point3<f64>) -> [u64; 3] {
    [
        (point.x + 0.0).to_bits(),
        (point.y + 0.0).to_bits(),
        (point.z + 0.0).to_bits(),
    ]
}

/// The mesh being partitioned.
///
/// Owns the vertex sequence, which only ever grows: indices handed out to
/// faces stay valid for the lifetime of the model. New vertices go through
/// [`MeshModel::insert_vertex`], which reuses an existing index when a vertex
/// with exactly the same coordinates is already present.
#[derive(Debug, Clone, Default)]
pub struct MeshModel {
    vertices: Vec<Point3<f64>>,
    faces: Vec<Face>,
    lookup: HashMap<[u64; 3], u32>,
}

impl MeshModel {
    /// Creates a model, rejecting faces that reference missing vertices.
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<Face>) -> Result<Self> {
        validate_faces(&faces, vertices.len())?;
        if vertices.len() > u32::MAX as usize {
            return Err(BspError::TooManyVertices(vertices.len()));
        }

        let mut lookup = HashMap::with_capacity(vertices.len());
        for (i, v) in vertices.iter().enumerate() {
            lookup.entry(point_key(v)).or_insert(i as u32);
        }

        Ok(Self {
            vertices,
            faces,
            lookup,
        })
    }

    /// Creates a model from 16.16 fixed-point positions.
    pub fn from_fixed(vertices: &[[i32; 3]], faces: Vec<Face>) -> Result<Self> {
        Self::new(vertices.iter().copied().map(point_from_fixed).collect(), faces)
    }

    /// Creates a model from a flat triangle index buffer.
    pub fn from_indices(vertices: Vec<Point3<f64>>, indices: &[u32]) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(BspError::IndexCountNotTriangles(indices.len()));
        }
        let faces = indices
            .chunks_exact(3)
            .map(|c| Face::new(c[0], c[1], c[2]))
            .collect();
        Self::new(vertices, faces)
    }

    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// The input faces. Construction never modifies this list.
    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns the position of a vertex.
    ///
    /// # Panics
    /// Panics if the index is out of range.
    #[inline]
    pub fn vertex(&self, index: u32) -> Point3<f64> {
        self.vertices[index as usize]
    }

    /// Looks up the three corners of a face.
    pub fn points(&self, face: &Face) -> [Point3<f64>; 3] {
        [self.vertex(face.v1), self.vertex(face.v2), self.vertex(face.v3)]
    }

    /// Looks up a face as a [`Triangle`].
    pub fn triangle(&self, face: &Face) -> Triangle {
        let [a, b, c] = self.points(face);
        Triangle::new(a, b, c)
    }

    /// Returns the index of a vertex at exactly `point`, appending one if needed.
    pub fn insert_vertex(&mut self, point: Point3<f64>) -> u32 {
        let next = self.vertices.len() as u32;
        let index = *self.lookup.entry(point_key(&point)).or_insert(next);
        if index == next {
            self.vertices.push(point);
        }
        index
    }

    /// Summed area of the input faces.
    pub fn total_area(&self) -> f64 {
        self.faces.iter().map(|f| self.triangle(f).area()).sum()
    }

    /// Checks `faces` against the current vertex count.
    pub fn validate(&self, faces: &[Face]) -> Result<()> {
        validate_faces(faces, self.vertices.len())
    }

    /// Consumes the model, returning its vertices and input faces.
    pub fn into_parts(self) -> (Vec<Point3<f64>>, Vec<Face>) {
        (self.vertices, self.faces)
    }
}

fn validate_faces(faces: &[Face], vertex_count: usize) -> Result<()> {
    for (i, face) in faces.iter().enumerate() {
        if let Some(index) = face
            .indices()
            .into_iter()
            .find(|&idx| idx as usize >= vertex_count)
        {
            return Err(BspError::InvalidFaceIndex {
                face: i,
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}
