//! HeightIndex - O(log n) prefix sums and lower_bound via Fenwick tree
//!
//! Provides efficient operations for computing cumulative heights and finding
//! item indices by vertical offset (scroll position). Holds each item's
//! best-known height: the measured one when available, else the estimate.
//!
//! # Complexity
//!
//! - `set`: O(log n)
//! - `get`: O(1)
//! - `prefix_sum`: O(log n)
//! - `lower_bound` / `first_reaching`: O(log² n)
//! - `push`: O(log n) amortized
//! - `total`: O(log n)
//! - `truncate`: O(n log n)
//! - `clear`: O(capacity)

/// HeightIndex wraps a Fenwick tree for O(log n) prefix sum queries and updates.
///
/// Maintains cumulative heights for a sequence of items, supporting:
/// - Setting individual item heights
/// - Computing prefix sums (cumulative height up to index)
/// - Binary search for an item by vertical offset (`lower_bound`)
#[derive(Debug, Clone)]
pub struct HeightIndex {
    /// Fenwick tree backing storage (1-indexed internally, 0-indexed API).
    /// Its length is the capacity; every update propagates over all of it.
    tree: Vec<f64>,
    /// Raw per-item heights, `heights.len()` is the item count.
    heights: Vec<f64>,
}

impl HeightIndex {
    /// Creates a new HeightIndex with the given initial capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tokflow::view_state::height_index::HeightIndex;
    /// let index = HeightIndex::new(100);
    /// assert_eq!(index.len(), 0);
    /// assert_eq!(index.total(), 0.0);
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            tree: vec![0.0; capacity],
            heights: Vec::with_capacity(capacity),
        }
    }

    /// Build an index from a slice of heights.
    pub fn from_heights(heights: &[f64]) -> Self {
        let mut index = Self::new(heights.len());
        for &height in heights {
            index.push(height);
        }
        index
    }

    /// Sets the height at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tokflow::view_state::height_index::HeightIndex;
    /// let mut index = HeightIndex::new(10);
    /// index.push(5.0);
    /// index.set(0, 10.0);
    /// assert_eq!(index.prefix_sum(0), 10.0);
    /// ```
    pub fn set(&mut self, index: usize, height: f64) {
        assert!(
            index < self.len(),
            "index {} out of bounds (len: {})",
            index,
            self.len()
        );

        let delta = height - self.heights[index];
        self.heights[index] = height;
        if delta != 0.0 {
            fenwick::array::update(&mut self.tree, index, delta);
        }
    }

    /// Height of the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn get(&self, index: usize) -> f64 {
        self.heights[index]
    }

    /// Returns the cumulative height up to and including the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tokflow::view_state::height_index::HeightIndex;
    /// let index = HeightIndex::from_heights(&[3.0, 4.0, 5.0]);
    /// assert_eq!(index.prefix_sum(0), 3.0);
    /// assert_eq!(index.prefix_sum(1), 7.0);
    /// assert_eq!(index.prefix_sum(2), 12.0);
    /// ```
    pub fn prefix_sum(&self, index: usize) -> f64 {
        assert!(
            index < self.len(),
            "index {} out of bounds (len: {})",
            index,
            self.len()
        );

        fenwick::array::prefix_sum(&self.tree, index)
    }

    /// Sum of the heights of all items before `index` (the item's top edge).
    ///
    /// `offset_of(len())` equals `total()`.
    pub fn offset_of(&self, index: usize) -> f64 {
        if index == 0 || self.is_empty() {
            0.0
        } else {
            self.prefix_sum(index.min(self.len()) - 1)
        }
    }

    /// Binary search for the first index where `prefix_sum(index) > value`.
    ///
    /// Returns the index of the item containing the given vertical offset,
    /// or `None` if `value >= total()` or the index is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tokflow::view_state::height_index::HeightIndex;
    /// let index = HeightIndex::from_heights(&[10.0, 20.0, 15.0]);
    /// assert_eq!(index.lower_bound(0.0), Some(0));
    /// assert_eq!(index.lower_bound(10.0), Some(1));
    /// assert_eq!(index.lower_bound(29.5), Some(1));
    /// assert_eq!(index.lower_bound(30.0), Some(2));
    /// assert_eq!(index.lower_bound(100.0), None);
    /// ```
    pub fn lower_bound(&self, value: f64) -> Option<usize> {
        self.partition(|sum| sum > value)
    }

    /// Binary search for the first index where `prefix_sum(index) >= value`.
    ///
    /// This is the item whose bottom edge reaches `value`.
    ///
    /// ```
    /// # use tokflow::view_state::height_index::HeightIndex;
    /// let index = HeightIndex::from_heights(&[10.0, 20.0, 15.0]);
    /// assert_eq!(index.first_reaching(10.0), Some(0));
    /// assert_eq!(index.first_reaching(10.5), Some(1));
    /// assert_eq!(index.first_reaching(45.0), Some(2));
    /// assert_eq!(index.first_reaching(45.5), None);
    /// ```
    pub fn first_reaching(&self, value: f64) -> Option<usize> {
        self.partition(|sum| sum >= value)
    }

    fn partition(&self, reached: impl Fn(f64) -> bool) -> Option<usize> {
        // Item i covers [prefix_sum(i-1), prefix_sum(i))
        let mut left = 0;
        let mut right = self.len();

        while left < right {
            let mid = left + (right - left) / 2;
            if reached(self.prefix_sum(mid)) {
                right = mid;
            } else {
                left = mid + 1;
            }
        }

        (left < self.len()).then_some(left)
    }

    /// Returns the total cumulative height of all items.
    ///
    /// ```
    /// # use tokflow::view_state::height_index::HeightIndex;
    /// let mut index = HeightIndex::new(10);
    /// assert_eq!(index.total(), 0.0);
    /// index.push(5.0);
    /// index.push(3.0);
    /// assert_eq!(index.total(), 8.0);
    /// ```
    pub fn total(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.prefix_sum(self.len() - 1)
        }
    }

    /// Returns the number of items in the index.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Returns true if the index contains no items.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Appends a new item with the given height.
    ///
    /// Grows (and rebuilds) the backing tree when capacity is exhausted.
    pub fn push(&mut self, height: f64) {
        if self.heights.len() >= self.tree.len() {
            let capacity = self.tree.len().max(1) * 2;
            self.rebuild(capacity);
        }

        let idx = self.heights.len();
        self.heights.push(height);
        fenwick::array::update(&mut self.tree, idx, height);
    }

    /// Drops every item at position `len` and beyond.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len() {
            return;
        }
        self.heights.truncate(len);
        let capacity = self.tree.len();
        self.rebuild(capacity);
    }

    /// Clears all items, resetting to empty state.
    ///
    /// Retains allocated capacity for reuse.
    pub fn clear(&mut self) {
        self.tree.iter_mut().for_each(|node| *node = 0.0);
        self.heights.clear();
    }

    /// Recreate the tree at `capacity` from the raw heights.
    fn rebuild(&mut self, capacity: usize) {
        self.tree = vec![0.0; capacity];
        for (idx, &height) in self.heights.iter().enumerate() {
            fenwick::array::update(&mut self.tree, idx, height);
        }
    }
}

impl Default for HeightIndex {
    fn default() -> Self {
        Self::new(0)
    }
}
