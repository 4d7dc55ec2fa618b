//! Callbacks for walking leaf clusters.
//!
//! [`BspTree`](crate::BspTree) decides the order in which leaves are reached
//! (depth-first, or sorted by distance from an eye point). A [`BspVisitor`]
//! receives each leaf's face cluster in that order. Faces are mesh indices;
//! resolve them through the [`MeshModel`](crate::MeshModel) the tree was
//! built from.

use crate::Face;

/// Receives leaf clusters in traversal order.
pub trait BspVisitor {
    /// Handles the faces of one leaf. Empty leaves are not reported.
    fn visit(&mut self, faces: &[Face]);
}

/// Concatenates every cluster it receives and counts the leaves.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    faces: Vec<Face>,
    leaves: usize,
}

impl CollectingVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Faces received so far, cluster after cluster.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn into_faces(self) -> Vec<Face> {
        self.faces
    }

    /// Number of clusters received.
    pub fn leaf_count(&self) -> usize {
        self.leaves
    }
}

impl BspVisitor for CollectingVisitor {
    fn visit(&mut self, faces: &[Face]) {
        self.leaves += 1;
        self.faces.extend_from_slice(faces);
    }
}

/// Adapts a closure taking one cluster into a [`BspVisitor`].
pub struct FnVisitor<F>(F);

impl<F: FnMut(&[Face])> FnVisitor<F> {
    pub fn new(func: F) -> Self {
        Self(func)
    }
}

impl<F: FnMut(&[Face])> BspVisitor for FnVisitor<F> {
    fn visit(&mut self, faces: &[Face]) {
        (self.0)(faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_starts_empty() {
        let visitor = CollectingVisitor::new();
        assert!(visitor.faces().is_empty());
        assert_eq!(visitor.leaf_count(), 0);
    }

    #[test]
    fn collector_keeps_cluster_order() {
        let mut visitor = CollectingVisitor::new();
        let a = Face::new(0, 1, 2);
        let b = Face::new(2, 3, 4);

        visitor.visit(&[a]);
        visitor.visit(&[b, a]);

        assert_eq!(visitor.leaf_count(), 2);
        assert_eq!(visitor.into_faces(), vec![a, b, a]);
    }

    #[test]
    fn closure_sees_each_cluster() {
        let mut sizes = Vec::new();
        let mut visitor = FnVisitor::new(|faces: &[Face]| sizes.push(faces.len()));
        visitor.visit(&[Face::new(0, 1, 2), Face::new(1, 2, 3)]);
        visitor.visit(&[Face::new(4, 5, 6)]);
        drop(visitor);
        assert_eq!(sizes, vec![2, 1]);
    }
}
