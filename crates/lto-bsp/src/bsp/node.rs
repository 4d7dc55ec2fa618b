//! BSP tree node implementation.

use crate::{Face, Hyperplane};

/// A node in the BSP tree.
///
/// Branches split space with an axis-aligned plane; leaves hold the convex
/// cluster of faces that ended up in their region.
///
/// # Child Convention
///
/// - `back` (the "left" child): faces at or behind the plane
/// - `front` (the "right" child): faces in front of the plane
#[derive(Debug, Clone, PartialEq)]
pub enum BspNode {
    /// Terminal node holding a face cluster.
    Leaf(Vec<Face>),
    /// Internal node with a splitting plane and two subtrees.
    Branch {
        plane: Hyperplane,
        back: Box<BspNode>,
        front: Box<BspNode>,
    },
}

impl BspNode {
    /// Creates a leaf node.
    pub fn leaf(faces: Vec<Face>) -> Self {
        BspNode::Leaf(faces)
    }

    /// Creates a branch node.
    pub fn branch(plane: Hyperplane, back: BspNode, front: BspNode) -> Self {
        BspNode::Branch {
            plane,
            back: Box::new(back),
            front: Box::new(front),
        }
    }

    /// Checks if this node is a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, BspNode::Leaf(_))
    }

    /// Returns the faces of a leaf, or `None` for a branch.
    #[inline]
    pub fn faces(&self) -> Option<&[Face]> {
        match self {
            BspNode::Leaf(faces) => Some(faces),
            BspNode::Branch { .. } => None,
        }
    }

    /// Returns the splitting plane of a branch.
    #[inline]
    pub fn plane(&self) -> Option<&Hyperplane> {
        match self {
            BspNode::Leaf(_) => None,
            BspNode::Branch { plane, .. } => Some(plane),
        }
    }

    /// Returns a reference to the back (left) subtree.
    #[inline]
    pub fn back(&self) -> Option<&BspNode> {
        match self {
            BspNode::Leaf(_) => None,
            BspNode::Branch { back, .. } => Some(back),
        }
    }

    /// Returns a reference to the front (right) subtree.
    #[inline]
    pub fn front(&self) -> Option<&BspNode> {
        match self {
            BspNode::Leaf(_) => None,
            BspNode::Branch { front, .. } => Some(front),
        }
    }

    /// Returns the total number of faces in this subtree.
    pub fn face_count(&self) -> usize {
        match self {
            BspNode::Leaf(faces) => faces.len(),
            BspNode::Branch { back, front, .. } => back.face_count() + front.face_count(),
        }
    }

    /// Returns the number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            BspNode::Leaf(_) => 1,
            BspNode::Branch { back, front, .. } => back.leaf_count() + front.leaf_count(),
        }
    }

    /// Returns the number of branches in this subtree.
    pub fn branch_count(&self) -> usize {
        match self {
            BspNode::Leaf(_) => 0,
            BspNode::Branch { back, front, .. } => 1 + back.branch_count() + front.branch_count(),
        }
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        match self {
            BspNode::Leaf(_) => 1,
            BspNode::Branch { back, front, .. } => 1 + back.depth().max(front.depth()),
        }
    }
}
