//! BSP tree construction for fixed-point renderers.
//!
//! Takes an indexed triangle mesh, partitions it with axis-aligned planes into
//! convex leaf clusters, and reads/writes the result in the compact LTO
//! binary format.

pub mod bsp;
pub mod clip;
mod config;
pub mod convex;
mod error;
pub mod fixed;
pub mod lto;
mod mesh;
mod plane;
mod triangle;

pub use bsp::{
    BspNode, BspTree, BspVisitor, CollectingVisitor, ExhaustiveSelector, FnVisitor, PlaneChoice,
    PlaneSelector, SampledSelector, SplitCounts, TreeStats,
};
pub use config::{
    BuildConfig, DEFAULT_CONVEX_TOLERANCE, DEFAULT_FUDGE, DEFAULT_MAX_DEPTH, DEFAULT_SAMPLE_COUNT,
};
pub use error::{BspError, Result};
pub use mesh::{Face, MeshModel};
pub use plane::{Axis, Classification, Hyperplane, PlaneSide};
pub use triangle::Triangle;
