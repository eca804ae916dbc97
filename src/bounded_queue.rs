use std::cmp::Ordering;
use std::collections::VecDeque;

/// A priority queue that only ever holds the `max_size` entries with the
/// lowest priorities it has been offered.
///
/// Entries are kept sorted by priority, so the best entry sits at the front
/// and the worst one at the back. Entries with equal priority keep the order
/// they were enqueued in.
#[derive(Debug, Clone)]
pub struct BoundedPriorityQueue<Item, Priority> {
    entries: VecDeque<(Priority, Item)>,
    max_size: usize,
}

impl<Item, Priority> BoundedPriorityQueue<Item, Priority>
where
    Priority: Copy + PartialOrd,
{
    /// Creates an empty queue that retains at most `max_size` entries.
    /// A `max_size` of zero is allowed; such a queue discards everything.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_size,
        }
    }

    /// Offers `item` to the queue.
    ///
    /// While the queue has room the item is always kept. Once it is full the
    /// item is kept only if `priority` is strictly less than the current
    /// worst priority, which is then evicted.
    pub fn enqueue(&mut self, item: Item, priority: Priority) {
        if self.max_size == 0 {
            return;
        }
        if self.entries.len() == self.max_size {
            match self.entries.back() {
                Some((worst, _)) if priority < *worst => {
                    self.entries.pop_back();
                }
                _ => return,
            }
        }
        // Insert after every entry with a priority <= the new one
        let position = self
            .entries
            .binary_search_by(|(entry_priority, _)| {
                if *entry_priority <= priority {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            })
            .unwrap_or_else(|x| x);
        self.entries.insert(position, (priority, item));
    }

    /// Removes and returns the entry with the smallest priority.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty.
    pub fn dequeue_min(&mut self) -> Item {
        self.try_dequeue_min()
            .expect("dequeue_min called on an empty BoundedPriorityQueue")
    }

    pub fn try_dequeue_min(&mut self) -> Option<Item> {
        self.entries.pop_front().map(|(_, item)| item)
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() == self.max_size
    }

    /// The smallest priority currently retained.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty.
    pub fn best(&self) -> Priority {
        match self.entries.front() {
            Some((priority, _)) => *priority,
            None => panic!("best called on an empty BoundedPriorityQueue"),
        }
    }

    /// The largest priority currently retained. During a nearest neighbor
    /// search this is the radius a candidate has to beat.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty.
    pub fn worst(&self) -> Priority {
        match self.entries.back() {
            Some((priority, _)) => *priority,
            None => panic!("worst called on an empty BoundedPriorityQueue"),
        }
    }

    /// Entries in ascending priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Priority, &Item)> + '_ {
        self.entries.iter().map(|(priority, item)| (*priority, item))
    }

    /// Consumes the queue, returning `(priority, item)` pairs in ascending
    /// priority order.
    pub fn into_sorted_vec(self) -> Vec<(Priority, Item)> {
        self.entries.into_iter().collect()
    }
}

impl<Item, Priority> Extend<(Item, Priority)> for BoundedPriorityQueue<Item, Priority>
where
    Priority: Copy + PartialOrd,
{
    fn extend<I: IntoIterator<Item = (Item, Priority)>>(&mut self, iter: I) {
        for (item, priority) in iter {
            self.enqueue(item, priority);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_lowest_priorities() {
        let mut queue = BoundedPriorityQueue::new(3);
        queue.extend(vec![("e", 5.0), ("a", 1.0), ("d", 4.0), ("b", 2.0), ("c", 3.0)]);
        assert_eq!(queue.size(), 3);
        assert_eq!(queue.max_size(), 3);
        assert!(queue.is_full());
        assert_eq!(queue.best(), 1.0);
        assert_eq!(queue.worst(), 3.0);
        assert_eq!(queue.dequeue_min(), "a");
        assert_eq!(queue.dequeue_min(), "b");
        assert_eq!(queue.dequeue_min(), "c");
        assert!(queue.empty());
        assert_eq!(queue.try_dequeue_min(), None);
    }

    #[test]
    fn fills_before_evicting() {
        let mut queue = BoundedPriorityQueue::new(2);
        queue.enqueue(1, 10.0);
        assert!(!queue.is_full());
        assert_eq!(queue.worst(), 10.0);
        // Worse than the current worst, but there is still room
        queue.enqueue(2, 20.0);
        assert_eq!(queue.worst(), 20.0);
        // Full now, so a worse priority is discarded
        queue.enqueue(3, 30.0);
        assert_eq!(queue.into_sorted_vec(), vec![(10.0, 1), (20.0, 2)]);
    }

    #[test]
    fn equal_priority_does_not_evict() {
        let mut queue = BoundedPriorityQueue::new(2);
        queue.enqueue('a', 1);
        queue.enqueue('b', 2);
        queue.enqueue('c', 2);
        assert_eq!(queue.into_sorted_vec(), vec![(1, 'a'), (2, 'b')]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut queue = BoundedPriorityQueue::new(4);
        queue.enqueue("first", 1.0);
        queue.enqueue("second", 1.0);
        queue.enqueue("zero", 0.0);
        queue.enqueue("third", 1.0);
        let order: Vec<&str> = queue.iter().map(|(_, item)| *item).collect();
        assert_eq!(order, vec!["zero", "first", "second", "third"]);
    }

    #[test]
    fn zero_capacity_discards_everything() {
        let mut queue = BoundedPriorityQueue::new(0);
        queue.enqueue("x", 0.0);
        queue.enqueue("y", -1.0);
        assert_eq!(queue.size(), 0);
        assert!(queue.empty());
        assert!(queue.is_full());
    }

    #[test]
    #[should_panic(expected = "empty BoundedPriorityQueue")]
    fn dequeue_on_empty_panics() {
        let mut queue: BoundedPriorityQueue<u8, f64> = BoundedPriorityQueue::new(1);
        queue.dequeue_min();
    }

    #[test]
    #[should_panic(expected = "empty BoundedPriorityQueue")]
    fn worst_on_empty_panics() {
        let queue: BoundedPriorityQueue<u8, f64> = BoundedPriorityQueue::new(1);
        queue.worst();
    }
}
