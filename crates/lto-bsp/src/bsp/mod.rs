//! Axis-aligned Binary Space Partitioning tree over an indexed mesh.
//!
//! This module recursively partitions a mesh's faces with planes
//! perpendicular to the coordinate axes until every leaf holds a convex
//! cluster. The result enables:
//!
//! - Back-to-front leaf ordering for painter's algorithm rendering
//! - Compact persistence in the LTO format (see [`crate::lto`])
//!
//! # Example
//!
//! ```
//! use lto_bsp::{BspTree, BuildConfig, CollectingVisitor, Face, MeshModel};
//! use nalgebra::Point3;
//!
//! let mut mesh = MeshModel::from_fixed(
//!     &[[0, 0, 0], [65536, 0, 0], [0, 65536, 0]],
//!     vec![Face::new(0, 1, 2)],
//! )
//! .unwrap();
//!
//! let tree = BspTree::from_mesh(&mut mesh, &BuildConfig::default().with_seed(3)).unwrap();
//!
//! let mut visitor = CollectingVisitor::new();
//! tree.traverse_back_to_front(Point3::new(0.0, 0.0, 10.0), &mut visitor);
//! assert_eq!(visitor.faces().len(), 1);
//! ```
//!
//! # Architecture
//!
//! - [`BspTree`]: The main container holding the root node
//! - [`BspNode`]: Leaf clusters and axis-aligned branches
//! - [`PlaneSelector`]: Strategy trait for choosing splitting planes
//! - [`BspVisitor`]: Visitor trait for custom traversal behavior

mod node;
mod selector;
mod tree;
mod visitor;

// Re-export main types
pub use node::BspNode;
pub use selector::{ExhaustiveSelector, PlaneChoice, PlaneSelector, SampledSelector, SplitCounts};
pub use tree::{BspTree, TreeStats};
pub use visitor::{BspVisitor, CollectingVisitor, FnVisitor};
