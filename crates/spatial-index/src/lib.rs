//! Nearest-node spatial index for non-rectilinear meshes.
//!
//! Point location on a curvilinear or unstructured mesh starts from a seed:
//! the mesh node closest to the query point. This crate provides [`NodeIndex`],
//! an immutable, balanced k-d tree over the 2D horizontal coordinates of the
//! mesh nodes. Each indexed point carries a payload identifying the node it
//! belongs to — an `[i, j]` index tuple for logically structured meshes, or a
//! flat node id for unstructured ones.
//!
//! The index is built once, before any query, and is read-only afterwards.
//! All queries take `&self` and are safe to issue concurrently.
//!
//! # Example
//!
//! ```
//! use nalgebra::Point2;
//! use spatial_index::NodeIndex;
//!
//! let nodes = vec![
//!     (Point2::new(0.0, 0.0), [0usize, 0usize]),
//!     (Point2::new(1.0, 0.0), [1, 0]),
//!     (Point2::new(0.0, 1.0), [0, 1]),
//!     (Point2::new(1.0, 1.0), [1, 1]),
//! ];
//! let index = NodeIndex::build(nodes).unwrap();
//!
//! let (_, node, _) = index.nearest(Point2::new(0.9, 0.1)).unwrap();
//! assert_eq!(*node, [1, 0]);
//! ```

use nalgebra::Point2;
use thiserror::Error;

/// Errors that can occur while building an index.
#[derive(Error, Debug)]
pub enum IndexError {
    /// The point set handed to [`NodeIndex::build`] was empty.
    #[error("cannot build a spatial index over an empty point set")]
    EmptyPointSet,
}

/// Result type for index construction.
pub type Result<T> = std::result::Result<T, IndexError>;

/// An indexed point together with its payload.
#[derive(Debug, Clone)]
struct Entry<T> {
    position: Point2<f64>,
    payload: T,
}

/// A node in the k-d tree.
#[derive(Debug)]
enum Node<T> {
    /// Leaf node (empty or a single point).
    Leaf(Option<Entry<T>>),
    /// Internal node with a splitting point and two children.
    Internal {
        entry: Entry<T>,
        /// Split dimension (0 = x, 1 = y).
        axis: usize,
        /// Points with axis value below the split.
        left: Box<Node<T>>,
        /// Points with axis value at or above the split.
        right: Box<Node<T>>,
    },
}

/// An immutable balanced k-d tree over 2D node coordinates.
///
/// Built once with [`NodeIndex::build`]; nearest-neighbor queries return the
/// payload of the closest indexed node. Median splits keep the tree balanced,
/// giving O(log n) query time on well-distributed meshes.
#[derive(Debug)]
pub struct NodeIndex<T> {
    root: Node<T>,
    len: usize,
}

impl<T> NodeIndex<T> {
    /// Build an index over a set of points with payloads.
    ///
    /// Returns [`IndexError::EmptyPointSet`] if the iterator yields nothing;
    /// a grid without nodes cannot seed a search.
    pub fn build(points: impl IntoIterator<Item = (Point2<f64>, T)>) -> Result<Self> {
        let entries: Vec<Entry<T>> = points
            .into_iter()
            .map(|(position, payload)| Entry { position, payload })
            .collect();

        if entries.is_empty() {
            return Err(IndexError::EmptyPointSet);
        }

        let len = entries.len();
        let root = Self::build_recursive(entries, 0);
        Ok(Self { root, len })
    }

    fn build_recursive(mut entries: Vec<Entry<T>>, depth: usize) -> Node<T> {
        match entries.len() {
            0 => return Node::Leaf(None),
            1 => return Node::Leaf(entries.pop()),
            _ => {}
        }

        let axis = depth % 2;
        entries.sort_by(|a, b| {
            let va = a.position[axis];
            let vb = b.position[axis];
            va.partial_cmp(&vb).unwrap_or(std::cmp::Ordering::Equal)
        });

        let median = entries.len() / 2;
        let mut upper = entries.split_off(median);
        let entry = upper.remove(0);

        let left = Box::new(Self::build_recursive(entries, depth + 1));
        let right = Box::new(Self::build_recursive(upper, depth + 1));

        Node::Internal {
            entry,
            axis,
            left,
            right,
        }
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no points. Always false for a built index.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Find the indexed node nearest to `position`.
    ///
    /// Returns the node's coordinates, its payload, and the distance to it.
    pub fn nearest(&self, position: Point2<f64>) -> Option<(Point2<f64>, &T, f64)> {
        let mut best: Option<(&Entry<T>, f64)> = None;
        Self::nearest_recursive(&self.root, position, &mut best);
        best.map(|(entry, dist)| (entry.position, &entry.payload, dist))
    }

    fn nearest_recursive<'a>(
        node: &'a Node<T>,
        position: Point2<f64>,
        best: &mut Option<(&'a Entry<T>, f64)>,
    ) {
        match node {
            Node::Leaf(None) => {}
            Node::Leaf(Some(entry)) => {
                Self::consider(entry, position, best);
            }
            Node::Internal {
                entry,
                axis,
                left,
                right,
            } => {
                Self::consider(entry, position, best);

                let axis_val = position[*axis];
                let split_val = entry.position[*axis];

                // Descend into the side holding the query point first.
                let (near, far) = if axis_val < split_val {
                    (left.as_ref(), right.as_ref())
                } else {
                    (right.as_ref(), left.as_ref())
                };

                Self::nearest_recursive(near, position, best);

                // The far side can only help if the splitting plane is closer
                // than the best match so far.
                let axis_dist = (axis_val - split_val).abs();
                match best {
                    Some((_, dist)) if axis_dist >= *dist => {}
                    _ => Self::nearest_recursive(far, position, best),
                }
            }
        }
    }

    fn consider<'a>(
        entry: &'a Entry<T>,
        position: Point2<f64>,
        best: &mut Option<(&'a Entry<T>, f64)>,
    ) {
        let dist = (entry.position - position).norm();
        match best {
            Some((_, best_dist)) if dist >= *best_dist => {}
            _ => *best = Some((entry, dist)),
        }
    }
}
