//! Error types for mesh validation, tree construction and LTO file I/O.

use thiserror::Error;

/// Errors surfaced to callers of the builder and the LTO codec.
///
/// Degenerate geometry (empty meshes, near-coplanar vertices, zero-area clip
/// products) is resolved locally and never shows up here. Broken internal
/// invariants panic instead of being reported.
#[derive(Error, Debug)]
pub enum BspError {
    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but only {vertex_count} vertices exist")]
    InvalidFaceIndex {
        /// Position of the offending face in its list
        face: usize,
        /// The out-of-range vertex index
        index: u32,
        /// Number of vertices available at the time of the check
        vertex_count: usize,
    },

    /// A flat index buffer whose length is not a multiple of three.
    #[error("index buffer of length {0} does not describe whole triangles")]
    IndexCountNotTriangles(usize),

    /// Underlying read/write failure, including truncated files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the `LTO` tag.
    #[error("invalid magic bytes: {0:?}")]
    BadMagic([u8; 3]),

    /// The file was written by an unknown format version.
    #[error("unsupported LTO version: {0}")]
    UnsupportedVersion(u8),

    /// A branch record carries an axis other than 0, 1 or 2.
    #[error("invalid hyperplane axis: {0}")]
    InvalidAxis(u8),

    /// The encoded tree nests deeper than the decoder accepts.
    #[error("encoded tree exceeds maximum depth of {0}")]
    TreeTooDeep(usize),

    /// Bytes left over after the encoded tree.
    #[error("{0} unexpected bytes after the encoded tree")]
    TrailingBytes(usize),

    /// Leaves are never written with zero faces; a zero count marks a branch.
    #[error("cannot encode a leaf without faces")]
    EmptyLeaf,

    /// A coordinate cannot be represented in 16.16 fixed point.
    #[error("coordinate {0} does not fit in 16.16 fixed point")]
    CoordinateOutOfRange(f64),

    /// More vertices than the 32-bit vertex count can describe.
    #[error("{0} vertices exceed the format limit")]
    TooManyVertices(usize),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BspError>;
