use crate::bounded_queue::BoundedPriorityQueue;
use crate::error::KDTreeError;
use crate::point::Point;
use num_traits::Float;
use std::cmp::Ordering;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct Node<const N: usize, V, T> {
    key: Point<N, T>,
    value: V,
    depth: usize,
    left: Option<usize>,
    right: Option<usize>,
}

impl<const N: usize, V, T> Node<N, V, T> {
    fn axis(&self) -> usize {
        self.depth % N
    }
}

/// Where a descent for some key ended.
enum Slot {
    Occupied(usize),
    /// The key is absent. `parent` is the node whose empty child the key
    /// belongs in and whether that is the right child; `None` for an empty tree.
    Vacant {
        parent: Option<(usize, bool)>,
        depth: usize,
    },
}

/// One entry returned by the neighbor queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a, const N: usize, V, T = f64> {
    pub distance: T,
    pub key: &'a Point<N, T>,
    pub value: &'a V,
}

/// The outcome of a k-nearest-neighbor majority vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote<V> {
    /// The most frequent value, the smallest one if several are equally frequent.
    pub value: V,
    /// How many of the consulted neighbors carry `value`.
    pub frequency: usize,
    /// How many neighbors were consulted; less than `k` when the tree is small.
    pub neighbors: usize,
}

/// A k-d tree mapping `N`-dimensional points to values of type `V`.
///
/// Nodes live in a flat arena and refer to their children by index, the root
/// being the first node. Each node splits space along axis `depth % N`: keys
/// strictly less than the node's key on that axis go left, all others go
/// right. The tree is never rebalanced, so its shape is a function of the
/// insertion order alone.
///
/// Cloning a tree copies every node, the copy shares nothing with the original.
#[derive(Debug, Clone)]
pub struct KDTree<const N: usize, V, T = f64> {
    nodes: Vec<Node<N, V, T>>,
}

impl<const N: usize, V, T> KDTree<N, V, T>
where
    T: Float,
{
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Dimension of the stored points, always `N`.
    pub fn dimension(&self) -> usize {
        N
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Iterates over all `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Point<N, T>, &V)> + '_ {
        self.nodes.iter().map(|node| (&node.key, &node.value))
    }

    fn locate(&self, point: &Point<N, T>) -> Slot {
        if self.nodes.is_empty() {
            return Slot::Vacant {
                parent: None,
                depth: 0,
            };
        }
        let mut index = 0;
        loop {
            let node = &self.nodes[index];
            if node.key == *point {
                return Slot::Occupied(index);
            }
            let axis = node.axis();
            let goes_right = !(point[axis] < node.key[axis]);
            let child = if goes_right { node.right } else { node.left };
            match child {
                Some(child) => index = child,
                None => {
                    return Slot::Vacant {
                        parent: Some((index, goes_right)),
                        depth: node.depth + 1,
                    }
                }
            }
        }
    }

    fn attach(
        &mut self,
        parent: Option<(usize, bool)>,
        depth: usize,
        key: Point<N, T>,
        value: V,
    ) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            key,
            value,
            depth,
            left: None,
            right: None,
        });
        if let Some((parent, goes_right)) = parent {
            let parent = &mut self.nodes[parent];
            if goes_right {
                parent.right = Some(index);
            } else {
                parent.left = Some(index);
            }
        }
        trace!(depth, size = self.nodes.len(), "attached new node");
        index
    }

    /// Associates `value` with `point`.
    ///
    /// If `point` is already stored its value is overwritten in place and the
    /// previous value returned; the size of the tree does not change.
    pub fn insert(&mut self, point: Point<N, T>, value: V) -> Option<V> {
        match self.locate(&point) {
            Slot::Occupied(index) => Some(std::mem::replace(&mut self.nodes[index].value, value)),
            Slot::Vacant { parent, depth } => {
                self.attach(parent, depth, point, value);
                None
            }
        }
    }

    /// Returns a mutable reference to the value stored at `point`, first
    /// inserting `V::default()` there if the point is absent.
    pub fn get_or_insert_default(&mut self, point: Point<N, T>) -> &mut V
    where
        V: Default,
    {
        let index = match self.locate(&point) {
            Slot::Occupied(index) => index,
            Slot::Vacant { parent, depth } => self.attach(parent, depth, point, V::default()),
        };
        &mut self.nodes[index].value
    }

    pub fn contains(&self, point: &Point<N, T>) -> bool {
        matches!(self.locate(point), Slot::Occupied(_))
    }

    pub fn get(&self, point: &Point<N, T>) -> Option<&V> {
        match self.locate(point) {
            Slot::Occupied(index) => Some(&self.nodes[index].value),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get_mut(&mut self, point: &Point<N, T>) -> Option<&mut V> {
        match self.locate(point) {
            Slot::Occupied(index) => Some(&mut self.nodes[index].value),
            Slot::Vacant { .. } => None,
        }
    }

    /// Returns the value stored at `point`, or [`KDTreeError::KeyNotFound`].
    pub fn at(&self, point: &Point<N, T>) -> Result<&V, KDTreeError> {
        self.get(point)
            .ok_or(KDTreeError::KeyNotFound { dimension: N })
    }

    pub fn at_mut(&mut self, point: &Point<N, T>) -> Result<&mut V, KDTreeError> {
        self.get_mut(point)
            .ok_or(KDTreeError::KeyNotFound { dimension: N })
    }

    /// Depth-first walk from the root that offers every visited node to
    /// `collector`. The child on the query's side of a node's splitting plane
    /// is walked first; the other child is only walked afterwards if the
    /// collector says a candidate could still lie beyond the plane.
    fn traverse<C: Collector<T>>(&self, query: &Point<N, T>, collector: &mut C) {
        if self.nodes.is_empty() {
            return;
        }
        let mut visited = 0usize;
        let mut pruned = 0usize;
        // Far children still to be considered, with the distance from the
        // query to the splitting plane that separates them from it
        let mut unexplored: Vec<(usize, T)> = Vec::new();
        let mut next = Some(0);
        loop {
            while let Some(index) = next {
                let node = &self.nodes[index];
                visited += 1;
                collector.offer(index, node.key.distance(query));

                let axis = node.axis();
                let (near, far) = if query[axis] < node.key[axis] {
                    (node.left, node.right)
                } else {
                    (node.right, node.left)
                };
                if let Some(far) = far {
                    unexplored.push((far, (node.key[axis] - query[axis]).abs()));
                }
                next = near;
            }
            /* The near side of the node that pushed this entry has been fully
            explored, so the collector's state reflects every candidate there.
            The far side can only matter if the search radius crosses the plane. */
            match unexplored.pop() {
                Some((far, distance_to_plane)) => {
                    if collector.reaches(distance_to_plane) {
                        next = Some(far);
                    } else {
                        pruned += 1;
                    }
                }
                None => break,
            }
        }
        trace!(visited, pruned, "traversal finished");
    }

    fn nearest(&self, query: &Point<N, T>, k: usize) -> BoundedPriorityQueue<usize, T> {
        let mut queue = BoundedPriorityQueue::new(k);
        self.traverse(query, &mut queue);
        queue
    }

    fn neighbor(&self, index: usize, distance: T) -> Neighbor<'_, N, V, T> {
        let node = &self.nodes[index];
        Neighbor {
            distance,
            key: &node.key,
            value: &node.value,
        }
    }

    /// The `k` stored entries closest to `query`, nearest first. Returns
    /// fewer than `k` entries when the tree holds fewer.
    pub fn k_nearest_neighbors(&self, query: &Point<N, T>, k: usize) -> Vec<Neighbor<'_, N, V, T>> {
        self.nearest(query, k)
            .into_sorted_vec()
            .into_iter()
            .map(|(distance, index)| self.neighbor(index, distance))
            .collect()
    }

    pub fn nearest_neighbor(&self, query: &Point<N, T>) -> Option<Neighbor<'_, N, V, T>> {
        self.k_nearest_neighbors(query, 1).into_iter().next()
    }

    /// Every stored entry within `radius` of `query` (inclusive), nearest first.
    pub fn neighbors_within_radius(
        &self,
        query: &Point<N, T>,
        radius: T,
    ) -> Vec<Neighbor<'_, N, V, T>> {
        let mut within = WithinRadius {
            radius,
            found: Vec::new(),
        };
        self.traverse(query, &mut within);
        within.found.sort_by(|a, b| {
            if a.0 < b.0 {
                Ordering::Less
            } else if b.0 < a.0 {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        });
        within
            .found
            .into_iter()
            .map(|(distance, index)| self.neighbor(index, distance))
            .collect()
    }

    /// Majority vote among the values of the `k` keys nearest to `query`.
    ///
    /// Returns `None` when no neighbor was consulted, i.e. for `k == 0` or an
    /// empty tree.
    pub fn knn_vote(&self, query: &Point<N, T>, k: usize) -> Option<Vote<V>>
    where
        V: Clone + Ord,
    {
        let mut queue = self.nearest(query, k);
        let mut values = Vec::with_capacity(queue.size());
        while !queue.empty() {
            values.push(&self.nodes[queue.dequeue_min()].value);
        }
        let vote = majority(values);
        if let Some(vote) = &vote {
            debug!(
                k,
                neighbors = vote.neighbors,
                frequency = vote.frequency,
                "resolved nearest neighbor vote"
            );
        }
        vote
    }

    /// The most common value among the `k` keys nearest to `query`, the
    /// smallest such value on a tie.
    ///
    /// For `k == 0` or an empty tree this is `V::default()`, which is not a
    /// classification; use [`knn_vote`](Self::knn_vote) to tell the two apart.
    pub fn knn_value(&self, query: &Point<N, T>, k: usize) -> V
    where
        V: Clone + Ord + Default,
    {
        self.knn_vote(query, k)
            .map(|vote| vote.value)
            .unwrap_or_default()
    }
}

/// Picks the most frequent value. Values are scanned in ascending order and a
/// value only displaces the current best with a strictly higher count, so ties
/// go to the smallest value.
fn majority<V: Clone + Ord>(mut values: Vec<&V>) -> Option<Vote<V>> {
    values.sort();
    let neighbors = values.len();
    let mut best: Option<(&V, usize)> = None;
    let mut start = 0;
    while start < values.len() {
        let candidate = values[start];
        let frequency = values[start..]
            .iter()
            .take_while(|value| **value == candidate)
            .count();
        if best.map_or(true, |(_, best_frequency)| frequency > best_frequency) {
            best = Some((candidate, frequency));
        }
        start += frequency;
    }
    best.map(|(value, frequency)| Vote {
        value: value.clone(),
        frequency,
        neighbors,
    })
}

/// Receives the nodes visited by [`KDTree::traverse`] and decides which far
/// subtrees are worth entering.
trait Collector<T> {
    fn offer(&mut self, index: usize, distance: T);

    /// Whether a subtree lying `distance_to_plane` beyond a splitting plane
    /// could still contain something this collector wants.
    fn reaches(&self, distance_to_plane: T) -> bool;
}

impl<T> Collector<T> for BoundedPriorityQueue<usize, T>
where
    T: Float,
{
    fn offer(&mut self, index: usize, distance: T) {
        self.enqueue(index, distance);
    }

    fn reaches(&self, distance_to_plane: T) -> bool {
        !self.is_full() || (!self.empty() && distance_to_plane < self.worst())
    }
}

struct WithinRadius<T> {
    radius: T,
    found: Vec<(T, usize)>,
}

impl<T> Collector<T> for WithinRadius<T>
where
    T: Float,
{
    fn offer(&mut self, index: usize, distance: T) {
        if distance <= self.radius {
            self.found.push((distance, index));
        }
    }

    fn reaches(&self, distance_to_plane: T) -> bool {
        distance_to_plane <= self.radius
    }
}

impl<const N: usize, V, T> Default for KDTree<N, V, T>
where
    T: Float,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, V, T> Extend<(Point<N, T>, V)> for KDTree<N, V, T>
where
    T: Float,
{
    fn extend<I: IntoIterator<Item = (Point<N, T>, V)>>(&mut self, items: I) {
        for (point, value) in items {
            self.insert(point, value);
        }
    }
}

impl<const N: usize, V, T> FromIterator<(Point<N, T>, V)> for KDTree<N, V, T>
where
    T: Float,
{
    fn from_iter<I: IntoIterator<Item = (Point<N, T>, V)>>(items: I) -> Self {
        let mut tree = Self::new();
        tree.extend(items);
        tree
    }
}
