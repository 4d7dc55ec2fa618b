//! Tunables for BSP construction.

use crate::lto::MAX_DECODE_DEPTH;

/// Default classification tolerance, in render units.
pub const DEFAULT_FUDGE: f64 = 0.1;

/// Default tolerance for the pairwise convexity test.
pub const DEFAULT_CONVEX_TOLERANCE: f64 = 0.01;

/// Default number of faces sampled as plane sources per node.
pub const DEFAULT_SAMPLE_COUNT: usize = 5;

/// Default recursion limit before a node is forced to become a leaf.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Parameters controlling how a [`BspTree`](crate::BspTree) is built.
///
/// ```
/// use lto_bsp::BuildConfig;
///
/// let config = BuildConfig::default().with_seed(7).with_split_weight(2.0);
/// assert_eq!(config.sample_count, 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    /// Vertices within this distance of a plane count as being on either side.
    pub fudge: f64,
    /// Dot products above this value make a face set non-convex.
    pub convex_tolerance: f64,
    /// Faces sampled as plane sources at each node.
    pub sample_count: usize,
    /// Weight of the squared split count in the plane score.
    pub split_weight: f64,
    /// Nodes at this depth become leaves regardless of their contents.
    /// Never exceeds [`MAX_DECODE_DEPTH`] in effect, so every built tree can
    /// be read back from an LTO file.
    pub max_depth: usize,
    /// Seed for plane sampling; OS entropy is used when `None`.
    pub seed: Option<u64>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            fudge: DEFAULT_FUDGE,
            convex_tolerance: DEFAULT_CONVEX_TOLERANCE,
            sample_count: DEFAULT_SAMPLE_COUNT,
            split_weight: 1.0,
            max_depth: DEFAULT_MAX_DEPTH,
            seed: None,
        }
    }
}

impl BuildConfig {
    /// Sets the classification tolerance.
    pub fn with_fudge(mut self, fudge: f64) -> Self {
        self.fudge = fudge;
        self
    }

    /// Sets the convexity tolerance.
    pub fn with_convex_tolerance(mut self, tolerance: f64) -> Self {
        self.convex_tolerance = tolerance;
        self
    }

    /// Sets how many faces are sampled per node. Clamped to at least one.
    pub fn with_sample_count(mut self, count: usize) -> Self {
        self.sample_count = count.max(1);
        self
    }

    /// Sets the weight of splits relative to imbalance.
    pub fn with_split_weight(mut self, weight: f64) -> Self {
        self.split_weight = weight;
        self
    }

    /// Sets the depth at which construction stops subdividing.
    /// Clamped to [`MAX_DECODE_DEPTH`].
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.min(MAX_DECODE_DEPTH);
        self
    }

    /// The depth limit the builder actually applies.
    pub fn depth_limit(&self) -> usize {
        self.max_depth.min(MAX_DECODE_DEPTH)
    }

    /// Makes plane sampling reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
