//! Binary-search insertion and bounded top/bottom-K ranking.
//!
//! Every ranking step in the window selector keeps a small ascending array
//! of candidates and evicts the current worst once over capacity. The order
//! of operations matters: the element is inserted *first*, then the array's
//! front is evicted, so an element worse than the current minimum can be
//! the one evicted in the same step.

use std::cmp::Ordering;

/// Insert `entry` into `items`, which must be ascending under `compare`.
///
/// Position is found by binary search; on an equal key the entry is
/// inserted at the probe midpoint. Callers that need a total order break
/// ties before calling.
pub fn insert_keeping_order<T, F>(entry: T, items: &mut Vec<T>, mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut lo: isize = 0;
    let mut hi: isize = items.len() as isize - 1;
    while lo <= hi {
        let mid = (lo + hi) / 2;
        match compare(&items[mid as usize], &entry) {
            Ordering::Equal => {
                items.insert(mid as usize, entry);
                return;
            }
            Ordering::Less => lo = mid + 1,
            Ordering::Greater => hi = mid - 1,
        }
    }
    items.insert(lo as usize, entry);
}

/// A bounded ascending candidate set.
///
/// [`offer`](Self::offer) inserts, then evicts the front element when over
/// capacity. With an ascending comparator this keeps the `capacity` largest
/// entries; flip the comparator to keep the smallest. Capacity zero
/// collects nothing.
#[derive(Debug, Clone)]
pub struct BoundedRank<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> BoundedRank<T> {
    /// Create an empty set that retains at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity.saturating_add(1)),
            capacity,
        }
    }

    /// Insert `entry` in order, then evict the front element if the set is
    /// over capacity. Returns the evicted element, if any.
    pub fn offer<F>(&mut self, entry: T, compare: F) -> Option<T>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        insert_keeping_order(entry, &mut self.items, compare);
        if self.items.len() > self.capacity {
            Some(self.items.remove(0))
        } else {
            None
        }
    }

    /// Retained entries in ascending order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the set, yielding retained entries in ascending order.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asc(a: &i64, b: &i64) -> Ordering {
        a.cmp(b)
    }

    #[test]
    fn insert_keeps_ascending_order() {
        let mut items = Vec::new();
        for v in [5i64, 1, 9, 3, 7, 3] {
            insert_keeping_order(v, &mut items, asc);
        }
        assert_eq!(items, vec![1, 3, 3, 5, 7, 9]);
    }

    #[test]
    fn insert_into_empty() {
        let mut items = Vec::new();
        insert_keeping_order(42i64, &mut items, asc);
        assert_eq!(items, vec![42]);
    }

    #[test]
    fn bounded_keeps_largest_with_ascending_comparator() {
        let mut rank = BoundedRank::new(3);
        for v in [4i64, 8, 1, 9, 2, 7] {
            rank.offer(v, asc);
        }
        assert_eq!(rank.into_vec(), vec![7, 8, 9]);
    }

    #[test]
    fn bounded_keeps_smallest_with_flipped_comparator() {
        let mut rank = BoundedRank::new(3);
        for v in [4i64, 8, 1, 9, 2, 7] {
            rank.offer(v, |a, b| b.cmp(a));
        }
        assert_eq!(rank.into_vec(), vec![4, 2, 1]);
    }

    #[test]
    fn insert_happens_before_evict() {
        // An entry below the current minimum is inserted at the front and
        // immediately evicted in the same step.
        let mut rank = BoundedRank::new(2);
        rank.offer(5i64, asc);
        rank.offer(6i64, asc);
        let evicted = rank.offer(1i64, asc);
        assert_eq!(evicted, Some(1));
        assert_eq!(rank.as_slice(), &[5, 6]);
    }

    #[test]
    fn capacity_zero_collects_nothing() {
        let mut rank = BoundedRank::new(0);
        assert_eq!(rank.offer(3i64, asc), Some(3));
        assert!(rank.is_empty());
    }
}
