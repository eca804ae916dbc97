//! A k-d tree for points of a fixed dimension, with exact lookup and
//! k-nearest-neighbor majority-vote classification.
//!
//! ```
//! use kdvote::{KDTree, Point};
//!
//! let mut tree: KDTree<2, &str> = KDTree::new();
//! tree.insert(Point::new([0.0, 0.0]), "red");
//! tree.insert(Point::new([10.0, 10.0]), "blue");
//! tree.insert(Point::new([10.0, 11.0]), "blue");
//!
//! assert_eq!(tree.knn_value(&Point::new([9.0, 9.0]), 2), "blue");
//! assert_eq!(tree.at(&Point::new([0.0, 0.0])), Ok(&"red"));
//! ```
//!
//! Nearest neighbor queries walk the tree depth first, keeping the best
//! candidates found so far in a [`BoundedPriorityQueue`]. A subtree on the far
//! side of a splitting plane is skipped once the queue is full and the plane
//! lies further from the query than the worst kept candidate.

pub mod bounded_queue;
pub mod error;
pub mod kdtree;
pub mod point;

pub use bounded_queue::BoundedPriorityQueue;
pub use error::KDTreeError;
pub use kdtree::{KDTree, Neighbor, Vote};
pub use point::{distance, Point};
