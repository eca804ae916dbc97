//! Error types for the k-d tree.

/// Error type for the fallible lookups on a [`KDTree`](crate::KDTree).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KDTreeError {
    /// Returned by `at` and `at_mut` when no stored key equals the point.
    #[error("point not found in {dimension}-dimensional tree")]
    KeyNotFound {
        /// Dimension of the tree that was searched.
        dimension: usize,
    },
}
