//! BSP tree container and construction.

use std::fmt;

use log::{debug, info, trace, warn};
use nalgebra::Point3;

use crate::clip::clip_face;
use crate::convex::is_convex;
use crate::error::Result;
use crate::{BuildConfig, Classification, Face, MeshModel};

use super::node::BspNode;
use super::selector::{PlaneSelector, SampledSelector};
use super::visitor::BspVisitor;

/// An axis-aligned Binary Space Partitioning tree over a triangle mesh.
///
/// Leaves hold clusters of faces that are convex (no face can occlude
/// another within the cluster), so a renderer only has to order leaves.
/// Faces are stored as indices into the vertex sequence of the
/// [`MeshModel`] the tree was built from, which gains a vertex for every new
/// intersection point created while clipping.
///
/// # Construction
///
/// ```
/// use lto_bsp::{BspTree, BuildConfig, Face, MeshModel};
/// use nalgebra::Point3;
///
/// let mut mesh = MeshModel::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![Face::new(0, 1, 2)],
/// )
/// .unwrap();
///
/// let tree = BspTree::from_mesh(&mut mesh, &BuildConfig::default().with_seed(1)).unwrap();
/// assert_eq!(tree.leaf_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BspTree {
    root: BspNode,
}

impl BspTree {
    /// Wraps an existing node hierarchy.
    pub fn from_root(root: BspNode) -> Self {
        Self { root }
    }

    /// Builds a tree from the faces of `mesh`.
    ///
    /// Uses the provided [`PlaneSelector`] to choose splitting planes.
    /// Faces straddling a plane are clipped and the new vertices appended to
    /// `mesh`. An empty mesh yields a single empty leaf.
    pub fn build<S: PlaneSelector>(
        mesh: &mut MeshModel,
        config: &BuildConfig,
        selector: &mut S,
    ) -> Result<Self> {
        mesh.validate(mesh.faces())?;

        let faces = mesh.faces().to_vec();
        if faces.is_empty() {
            return Ok(Self::from_root(BspNode::Leaf(faces)));
        }

        let input_vertices = mesh.vertex_count();
        let mut builder = Builder {
            mesh,
            config,
            selector,
        };
        let root = builder.build_node(faces, 0);
        let tree = Self { root };

        info!(
            "built BSP tree: {}, {} vertices added",
            tree.stats(),
            builder.mesh.vertex_count() - input_vertices
        );
        Ok(tree)
    }

    /// Builds a tree with a [`SampledSelector`] configured from `config`.
    pub fn from_mesh(mesh: &mut MeshModel, config: &BuildConfig) -> Result<Self> {
        let mut selector = SampledSelector::from_config(config);
        Self::build(mesh, config, &mut selector)
    }

    /// Returns a reference to the root node.
    #[inline]
    pub fn root(&self) -> &BspNode {
        &self.root
    }

    /// Consumes the tree, returning its root node.
    pub fn into_root(self) -> BspNode {
        self.root
    }

    /// Returns the total number of faces across all leaves.
    pub fn face_count(&self) -> usize {
        self.root.face_count()
    }

    /// Returns the number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Returns the number of branches.
    pub fn branch_count(&self) -> usize {
        self.root.branch_count()
    }

    /// Returns the maximum depth of the tree (1 for a single leaf).
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Summary counts for display.
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            leaves: self.leaf_count(),
            branches: self.branch_count(),
            faces: self.face_count(),
            depth: self.depth(),
        }
    }

    /// Returns every leaf's faces, depth-first, back before front.
    pub fn leaves(&self) -> Vec<&[Face]> {
        let mut result = Vec::with_capacity(self.leaf_count());
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                BspNode::Leaf(faces) => result.push(faces.as_slice()),
                BspNode::Branch { back, front, .. } => {
                    stack.push(front);
                    stack.push(back);
                }
            }
        }
        result
    }

    /// Collects all faces in the tree into a vector, in leaf order.
    pub fn collect_faces(&self) -> Vec<Face> {
        self.leaves().into_iter().flatten().copied().collect()
    }

    /// Visits every leaf depth-first, back before front.
    pub fn visit_leaves<V: BspVisitor>(&self, visitor: &mut V) {
        for faces in self.leaves().into_iter().filter(|f| !f.is_empty()) {
            visitor.visit(faces);
        }
    }

    /// Visits leaves from the farthest to the nearest relative to `eye`.
    ///
    /// This is the painter's algorithm order: later leaves are drawn on top.
    pub fn traverse_back_to_front<V: BspVisitor>(&self, eye: Point3<f64>, visitor: &mut V) {
        traverse_node(&self.root, &eye, visitor, false);
    }

    /// Visits leaves from the nearest to the farthest relative to `eye`.
    pub fn traverse_front_to_back<V: BspVisitor>(&self, eye: Point3<f64>, visitor: &mut V) {
        traverse_node(&self.root, &eye, visitor, true);
    }
}

/// Leaf, branch and face totals of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    pub leaves: usize,
    pub branches: usize,
    pub faces: usize,
    pub depth: usize,
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} leaves, {} branches, {} faces, depth {}",
            self.leaves, self.branches, self.faces, self.depth
        )
    }
}

/// Recursive construction state.
struct Builder<'a, S> {
    mesh: &'a mut MeshModel,
    config: &'a BuildConfig,
    selector: &'a mut S,
}

impl<S: PlaneSelector> Builder<'_, S> {
    fn build_node(&mut self, faces: Vec<Face>, depth: usize) -> BspNode {
        assert!(
            !faces.is_empty(),
            "BSP construction reached an empty partition at depth {depth}"
        );

        if faces.len() <= 1 {
            trace!("leaf at depth {depth}: single face");
            return BspNode::Leaf(faces);
        }
        if depth >= self.config.depth_limit() {
            warn!(
                "depth limit {} reached, forcing leaf with {} faces",
                self.config.depth_limit(),
                faces.len()
            );
            return BspNode::Leaf(faces);
        }
        if is_convex(self.mesh, &faces, self.config.convex_tolerance) {
            trace!("leaf at depth {depth}: {} convex faces", faces.len());
            return BspNode::Leaf(faces);
        }

        let Some(choice) = self.selector.select(self.mesh, &faces, self.config.fudge) else {
            return BspNode::Leaf(faces);
        };
        if !choice.divides() {
            trace!(
                "leaf at depth {depth}: no plane divides {} faces",
                faces.len()
            );
            return BspNode::Leaf(faces);
        }

        let plane = choice.plane;
        let fudge = self.config.fudge;
        let mut front = Vec::with_capacity(choice.counts.front + choice.counts.split * 2);
        let mut back = Vec::with_capacity(choice.counts.back + choice.counts.split * 2);

        for face in &faces {
            match plane.classify_triangle(&self.mesh.points(face), fudge) {
                Classification::Front => front.push(*face),
                Classification::Back => back.push(*face),
                Classification::Split => {
                    let pieces = clip_face(self.mesh, face, &plane, fudge);
                    front.extend(pieces.front);
                    back.extend(pieces.back);
                }
            }
        }

        if front.is_empty() || back.is_empty() {
            warn!(
                "plane {plane} left one side empty at depth {depth}; keeping {} faces as a leaf",
                front.len() + back.len()
            );
            front.append(&mut back);
            return BspNode::Leaf(front);
        }

        debug!(
            "branch at depth {depth} on {plane} (score {}): {} back, {} front, {} clipped",
            choice.score,
            back.len(),
            front.len(),
            choice.counts.split
        );

        let back_node = self.build_node(back, depth + 1);
        let front_node = self.build_node(front, depth + 1);
        BspNode::branch(plane, back_node, front_node)
    }
}

/// Recursively visits leaves ordered by the eye's side of each plane.
fn traverse_node<V: BspVisitor>(
    node: &BspNode,
    eye: &Point3<f64>,
    visitor: &mut V,
    near_first: bool,
) {
    match node {
        BspNode::Leaf(faces) => {
            if !faces.is_empty() {
                visitor.visit(faces);
            }
        }
        BspNode::Branch { plane, back, front } => {
            let eye_in_front = plane.signed_distance(eye) >= 0.0;
            let (first, second) = if eye_in_front == near_first {
                (front, back)
            } else {
                (back, front)
            };
            traverse_node(first, eye, visitor, near_first);
            traverse_node(second, eye, visitor, near_first);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::selector::ExhaustiveSelector;
    use crate::bsp::visitor::{CollectingVisitor, FnVisitor};
    use crate::{Axis, Hyperplane};

    fn make_mesh(points: &[[f64; 3]], faces: &[[u32; 3]]) -> MeshModel {
        MeshModel::new(
            points.iter().map(|p| Point3::from(*p)).collect(),
            faces.iter().map(|f| Face::from_indices(*f)).collect(),
        )
        .unwrap()
    }

    fn config() -> BuildConfig {
        BuildConfig::default().with_seed(11)
    }

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

    fn valley() -> MeshModel {
        make_mesh(
            &[
                [0.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
                [2.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 1.0, 2.0],
                [0.0, 0.0, 2.0],
            ],
            &[[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 5]],
        )
    }

    #[test]
    fn build_empty() {
        let mut mesh = make_mesh(&[], &[]);
        let tree = BspTree::from_mesh(&mut mesh, &config()).unwrap();
        assert!(tree.root().is_leaf());
        assert_eq!(tree.face_count(), 0);
        assert_eq!(tree.depth(), 1);

        let mut visitor = CollectingVisitor::new();
        tree.visit_leaves(&mut visitor);
        tree.traverse_back_to_front(Point3::origin(), &mut visitor);
        assert_eq!(visitor.leaf_count(), 0);
    }

    #[test]
    fn build_single_face() {
        let mut mesh = make_mesh(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[[0, 1, 2]],
        );
        let tree = BspTree::from_mesh(&mut mesh, &config()).unwrap();

        assert_eq!(tree.root(), &BspNode::Leaf(vec![Face::new(0, 1, 2)]));
        assert_eq!(tree.branch_count(), 0);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn facing_pair_becomes_one_branch() {
        let mut mesh = facing_pair();
        let tree = BspTree::from_mesh(&mut mesh, &config()).unwrap();

        let plane = tree.root().plane().unwrap();
        assert_eq!(plane.axis(), Axis::X);
        assert!(plane.offset().abs() <= 0.1);
        assert_eq!(tree.root().back().unwrap().faces(), Some(&[Face::new(0, 1, 2)][..]));
        assert_eq!(tree.root().front().unwrap().faces(), Some(&[Face::new(3, 4, 5)][..]));
        assert_eq!(mesh.vertex_count(), 6);
    }

    #[test]
    fn no_progress_becomes_leaf() {
        let mut mesh = valley();
        let mut selector = ExhaustiveSelector::default();
        let tree = BspTree::build(&mut mesh, &config(), &mut selector).unwrap();

        assert!(tree.root().is_leaf());
        assert_eq!(tree.face_count(), 4);
    }

    #[test]
    fn depth_limit_forces_leaf() {
        let mut mesh = facing_pair();
        let tree = BspTree::from_mesh(&mut mesh, &config().with_max_depth(0)).unwrap();
        assert!(tree.root().is_leaf());
        assert_eq!(tree.face_count(), 2);
    }

    #[test]
    fn stats_display() {
        let mut mesh = facing_pair();
        let tree = BspTree::from_mesh(&mut mesh, &config()).unwrap();
        let stats = tree.stats();
        assert_eq!(
            stats,
            TreeStats {
                leaves: 2,
                branches: 1,
                faces: 2,
                depth: 2
            }
        );
        assert_eq!(stats.to_string(), "2 leaves, 1 branches, 2 faces, depth 2");
    }

    #[test]
    fn leaves_are_back_first() {
        let plane = Hyperplane::new(Axis::Z, 0.0);
        let tree = BspTree::from_root(BspNode::branch(
            plane,
            BspNode::leaf(vec![Face::new(0, 1, 2)]),
            BspNode::branch(
                plane,
                BspNode::leaf(vec![Face::new(3, 4, 5)]),
                BspNode::leaf(vec![Face::new(6, 7, 8)]),
            ),
        ));

        assert_eq!(
            tree.collect_faces(),
            vec![Face::new(0, 1, 2), Face::new(3, 4, 5), Face::new(6, 7, 8)]
        );

        let mut visitor = CollectingVisitor::new();
        tree.visit_leaves(&mut visitor);
        assert_eq!(visitor.leaf_count(), 3);
    }

    #[test]
    fn traverse_back_to_front_ordering() {
        let mut mesh = facing_pair();
        let tree = BspTree::from_mesh(&mut mesh, &config()).unwrap();

        // Eye far along +x: the x < 0 triangle is farther and comes first.
        let mut order = Vec::new();
        let mut visitor = FnVisitor::new(|faces: &[Face]| order.extend_from_slice(faces));
        tree.traverse_back_to_front(Point3::new(10.0, 0.5, 0.5), &mut visitor);
        assert_eq!(order, vec![Face::new(0, 1, 2), Face::new(3, 4, 5)]);
    }

    #[test]
    fn traverse_front_to_back_ordering() {
        let mut mesh = facing_pair();
        let tree = BspTree::from_mesh(&mut mesh, &config()).unwrap();

        let mut visitor = CollectingVisitor::new();
        tree.traverse_front_to_back(Point3::new(10.0, 0.5, 0.5), &mut visitor);
        assert_eq!(
            visitor.into_faces(),
            vec![Face::new(3, 4, 5), Face::new(0, 1, 2)]
        );
    }

    #[test]
    fn rejects_mesh_with_bad_indices() {
        let result = MeshModel::new(vec![Point3::origin(); 2], vec![Face::new(0, 1, 2)]);
        assert!(result.is_err());
    }
}
