use num_traits::Float;
use std::ops::{Index, IndexMut};

/// A point in `N`-dimensional space.
///
/// The dimension is part of the type, so a `KDTree<3, _>` can only ever be
/// handed three-dimensional points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<const N: usize, T = f64> {
    coordinates: [T; N],
}

impl<const N: usize, T> Point<N, T>
where
    T: Float,
{
    pub fn new(coordinates: [T; N]) -> Self {
        Self { coordinates }
    }

    pub fn origin() -> Self {
        Self {
            coordinates: [T::zero(); N],
        }
    }

    /// Number of components, always `N`.
    pub fn dimension(&self) -> usize {
        N
    }

    pub fn as_array(&self) -> &[T; N] {
        &self.coordinates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.coordinates.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.coordinates.iter_mut()
    }

    pub fn squared_distance(&self, other: &Self) -> T {
        self.coordinates
            .iter()
            .zip(other.coordinates.iter())
            .fold(T::zero(), |acc, (&a, &b)| acc + (a - b) * (a - b))
    }

    /// Euclidean distance between `self` and `other`.
    pub fn distance(&self, other: &Self) -> T {
        self.squared_distance(other).sqrt()
    }
}

/// Euclidean distance between two points.
pub fn distance<const N: usize, T: Float>(one: &Point<N, T>, two: &Point<N, T>) -> T {
    one.distance(two)
}

impl<const N: usize, T> From<[T; N]> for Point<N, T>
where
    T: Float,
{
    fn from(coordinates: [T; N]) -> Self {
        Self::new(coordinates)
    }
}

impl<const N: usize, T> Default for Point<N, T>
where
    T: Float,
{
    fn default() -> Self {
        Self::origin()
    }
}

// Indexing past `N` panics, same as the underlying array.
impl<const N: usize, T> Index<usize> for Point<N, T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.coordinates[index]
    }
}

impl<const N: usize, T> IndexMut<usize> for Point<N, T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.coordinates[index]
    }
}

impl<'a, const N: usize, T> IntoIterator for &'a Point<N, T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.coordinates.iter()
    }
}
