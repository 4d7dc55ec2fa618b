//! Plane selection strategies for BSP tree construction.
//!
//! Candidate planes pass through the vertices of source faces, one per axis.
//! Each candidate is scored by how evenly it divides the partition and how
//! many faces it would cut; the lowest score wins.

use log::trace;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::{Axis, BuildConfig, Classification, Face, Hyperplane, MeshModel};

/// How a plane divides a set of faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitCounts {
    pub front: usize,
    pub back: usize,
    pub split: usize,
}

impl SplitCounts {
    /// Counts front, back and straddling faces. Coplanar faces count as front.
    pub fn measure(mesh: &MeshModel, faces: &[Face], plane: &Hyperplane, fudge: f64) -> Self {
        let mut counts = Self::default();
        for face in faces {
            match plane.classify_triangle(&mesh.points(face), fudge) {
                Classification::Front => counts.front += 1,
                Classification::Back => counts.back += 1,
                Classification::Split => counts.split += 1,
            }
        }
        counts
    }

    /// `(front - back)² + split_weight · split²`
    pub fn score(&self, split_weight: f64) -> f64 {
        let imbalance = self.front as f64 - self.back as f64;
        let split = self.split as f64;
        imbalance * imbalance + split_weight * split * split
    }

    /// True if splitting on this plane makes progress.
    #[inline]
    pub fn divides(&self) -> bool {
        self.split > 0 || (self.front > 0 && self.back > 0)
    }
}

/// The winning candidate of a selection round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneChoice {
    pub plane: Hyperplane,
    pub counts: SplitCounts,
    pub score: f64,
}

impl PlaneChoice {
    /// False if every face would land on the same side uncut.
    #[inline]
    pub fn divides(&self) -> bool {
        self.counts.divides()
    }

    /// Whether `self` should replace `best`.
    fn beats(&self, best: &PlaneChoice) -> bool {
        self.score < best.score || (self.score == best.score && self.divides() && !best.divides())
    }
}

/// Strategy for choosing the splitting plane of a node.
pub trait PlaneSelector {
    /// Picks a plane for `faces`.
    ///
    /// Returns `None` only if `faces` is empty.
    fn select(&mut self, mesh: &MeshModel, faces: &[Face], fudge: f64) -> Option<PlaneChoice>;
}

/// Scores every candidate plane through the vertices of `sources`.
fn best_candidate<'a>(
    mesh: &MeshModel,
    faces: &[Face],
    sources: impl IntoIterator<Item = &'a Face>,
    fudge: f64,
    split_weight: f64,
) -> Option<PlaneChoice> {
    let mut best: Option<PlaneChoice> = None;

    for source in sources {
        for point in mesh.points(source) {
            for axis in Axis::ALL {
                let plane = Hyperplane::through_point(axis, &point);
                let counts = SplitCounts::measure(mesh, faces, &plane, fudge);
                let candidate = PlaneChoice {
                    plane,
                    counts,
                    score: counts.score(split_weight),
                };
                if best.as_ref().is_none_or(|b| candidate.beats(b)) {
                    best = Some(candidate);
                }
            }
        }
    }

    best
}

/// Samples a few faces at random and tries the planes through their vertices.
///
/// The random source is injected, so a seeded generator gives reproducible
/// trees.
#[derive(Debug, Clone)]
pub struct SampledSelector<R> {
    rng: R,
    sample_count: usize,
    split_weight: f64,
}

impl<R: Rng> SampledSelector<R> {
    /// Creates a selector with the default sample count and split weight.
    pub fn new(rng: R) -> Self {
        let defaults = BuildConfig::default();
        Self {
            rng,
            sample_count: defaults.sample_count,
            split_weight: defaults.split_weight,
        }
    }

    /// Sets how many source faces are sampled per node.
    pub fn with_sample_count(mut self, count: usize) -> Self {
        self.sample_count = count.max(1);
        self
    }

    /// Sets the weight of splits relative to imbalance.
    pub fn with_split_weight(mut self, weight: f64) -> Self {
        self.split_weight = weight;
        self
    }
}

impl SampledSelector<StdRng> {
    /// Creates a reproducible selector.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Creates a selector from the sampling fields of `config`.
    ///
    /// Without a seed the generator is initialised from OS entropy.
    pub fn from_config(config: &BuildConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(rng)
            .with_sample_count(config.sample_count)
            .with_split_weight(config.split_weight)
    }
}

impl<R: Rng> PlaneSelector for SampledSelector<R> {
    /// Falls back to every face when no sampled candidate divides, so a
    /// non-dividing choice means no candidate plane divides `faces`.
    fn select(&mut self, mesh: &MeshModel, faces: &[Face], fudge: f64) -> Option<PlaneChoice> {
        let amount = self.sample_count.min(faces.len());
        let sampled = index::sample(&mut self.rng, faces.len(), amount);
        let choice = best_candidate(
            mesh,
            faces,
            sampled.iter().map(|i| &faces[i]),
            fudge,
            self.split_weight,
        )?;

        if choice.divides() || amount == faces.len() {
            return Some(choice);
        }
        trace!(
            "no sampled plane divides {} faces, scanning all",
            faces.len()
        );
        best_candidate(mesh, faces, faces, fudge, self.split_weight)
    }
}

/// Tries the planes through every vertex of every face.
///
/// Deterministic but quadratic in the partition size; useful for small meshes
/// and reproducible comparisons.
#[derive(Debug, Clone, Copy)]
pub struct ExhaustiveSelector {
    pub split_weight: f64,
}

impl ExhaustiveSelector {
    /// Creates a selector using the split weight of `config`.
    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            split_weight: config.split_weight,
        }
    }
}

impl Default for ExhaustiveSelector {
    fn default() -> Self {
        Self::from_config(&BuildConfig::default())
    }
}

impl PlaneSelector for ExhaustiveSelector {
    fn select(&mut self, mesh: &MeshModel, faces: &[Face], fudge: f64) -> Option<PlaneChoice> {
        best_candidate(mesh, faces, faces, fudge, self.split_weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn make_mesh(points: &[[f64; 3]], faces: &[[u32; 3]]) -> MeshModel {
        MeshModel::new(
            points.iter().map(|p| Point3::from(*p)).collect(),
            faces.iter().map(|f| Face::from_indices(*f)).collect(),
        )
        .unwrap()
    }

    /// Two triangles on either side of x = 0, facing each other.
    fn facing_pair() -> MeshModel {
        make_mesh(
            &[
                [-0.05, 0.0, 0.0],
                [-1.0, 1.0, 0.0],
                [-1.0, 0.0, 1.0],
                [0.05, 0.0, 0.0],
                [1.0, 0.0, 1.0],
                [1.0, 1.0, 0.0],
            ],
            &[[0, 1, 2], [3, 4, 5]],
        )
    }

    #[test]
    fn score_formula() {
        let counts = SplitCounts {
            front: 5,
            back: 2,
            split: 3,
        };
        assert_eq!(counts.score(1.0), 18.0);
        assert_eq!(counts.score(2.0), 27.0);
    }

    #[test]
    fn divides() {
        let all_front = SplitCounts {
            front: 4,
            back: 0,
            split: 0,
        };
        let one_split = SplitCounts {
            front: 3,
            back: 0,
            split: 1,
        };
        let balanced = SplitCounts {
            front: 2,
            back: 2,
            split: 0,
        };
        assert!(!all_front.divides());
        assert!(one_split.divides());
        assert!(balanced.divides());
    }

    #[test]
    fn empty_selection() {
        let mesh = facing_pair();
        assert!(SampledSelector::seeded(1).select(&mesh, &[], 0.1).is_none());
        assert!(ExhaustiveSelector::default().select(&mesh, &[], 0.1).is_none());
    }

    #[test]
    fn finds_separating_plane() {
        let mesh = facing_pair();
        for seed in 0..8 {
            let choice = SampledSelector::seeded(seed)
                .select(&mesh, mesh.faces(), 0.1)
                .unwrap();
            assert_eq!(choice.plane.axis(), Axis::X);
            assert!(choice.plane.offset().abs() <= 0.1);
            assert_eq!(choice.counts, SplitCounts { front: 1, back: 1, split: 0 });
            assert_eq!(choice.score, 0.0);
        }
    }

    #[test]
    fn reports_no_progress() {
        // Floor and wall meeting at the x = 0 edge: every candidate keeps
        // all four faces on one side.
        let mesh = make_mesh(
            &[
                [0.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
                [2.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 1.0, 2.0],
                [0.0, 0.0, 2.0],
            ],
            &[[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 5]],
        );
        let choice = ExhaustiveSelector::default()
            .select(&mesh, mesh.faces(), 0.1)
            .unwrap();
        assert!(!choice.divides());
    }

    #[test]
    fn seeded_selection_is_reproducible() {
        let points: Vec<[f64; 3]> = (0..30)
            .map(|i| {
                let t = i as f64 * 0.37;
                [t.sin() * 3.0, t.cos() * 2.0, (i % 7) as f64 * 0.5]
            })
            .collect();
        let faces: Vec<[u32; 3]> = (0..28).map(|i| [i, i + 1, i + 2]).collect();
        let mesh = make_mesh(&points, &faces);

        let a = SampledSelector::seeded(99).select(&mesh, mesh.faces(), 0.1);
        let b = SampledSelector::seeded(99).select(&mesh, mesh.faces(), 0.1);
        assert_eq!(a, b);
    }

    #[test]
    fn exhaustive_never_loses_to_sampled() {
        let mesh = facing_pair();
        let exhaustive = ExhaustiveSelector::default()
            .select(&mesh, mesh.faces(), 0.1)
            .unwrap();
        let sampled = SampledSelector::seeded(3)
            .with_sample_count(1)
            .select(&mesh, mesh.faces(), 0.1)
            .unwrap();
        assert!(exhaustive.score <= sampled.score);
    }

    #[test]
    fn exhaustive_takes_split_weight_from_config() {
        let config = BuildConfig::default().with_split_weight(4.0);
        assert_eq!(ExhaustiveSelector::from_config(&config).split_weight, 4.0);
        assert_eq!(ExhaustiveSelector::default().split_weight, 1.0);
    }

    #[test]
    fn split_weight_changes_the_winner() {
        // Three small faces along x and a wide one spanning them. Cutting
        // through the middle is balanced but splits faces.
        let mesh = make_mesh(
            &[
                [0.0, 0.0, 0.0],
                [0.5, 1.0, 0.0],
                [0.5, 0.0, 1.0],
                [1.5, 0.0, 0.0],
                [2.0, 1.0, 0.0],
                [2.0, 0.0, 1.0],
                [3.0, 0.0, 0.0],
                [3.5, 1.0, 0.0],
                [3.5, 0.0, 1.0],
                [0.0, 5.0, 0.0],
                [3.5, 5.0, 0.0],
                [1.75, 6.0, 0.0],
            ],
            &[[0, 1, 2], [3, 4, 5], [6, 7, 8], [9, 10, 11]],
        );
        let light = ExhaustiveSelector { split_weight: 0.0 }
            .select(&mesh, mesh.faces(), 0.1)
            .unwrap();
        let heavy = ExhaustiveSelector { split_weight: 100.0 }
            .select(&mesh, mesh.faces(), 0.1)
            .unwrap();

        assert!(light.counts.split > 0);
        assert_eq!(heavy.counts.split, 0);
    }

    #[test]
    fn sampled_falls_back_to_full_scan() {
        // A valley with a small triangle inside its bounds: only the small
        // triangle's planes divide, and one sample rarely picks it.
        let mesh = make_mesh(
            &[
                [0.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
                [2.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 1.0, 2.0],
                [0.0, 0.0, 2.0],
                [1.0, 0.5, 1.0],
                [1.2, 0.5, 1.0],
                [1.0, 0.7, 1.2],
            ],
            &[[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 5], [6, 7, 8]],
        );

        for seed in 0..16 {
            let choice = SampledSelector::seeded(seed)
                .with_sample_count(1)
                .select(&mesh, mesh.faces(), 0.1)
                .unwrap();
            assert!(choice.divides(), "seed {seed}");
        }
    }
}
