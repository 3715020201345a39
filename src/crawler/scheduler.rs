//! Priority admission queue for pending crawl requests
//!
//! A binary max-heap stored in a `Vec`. Elements are ordered by priority;
//! elements of equal priority leave in insertion order, tracked by a
//! sequence number assigned on push.
//!
//! The queue is not synchronized. The coordinator task owns it and is the
//! only code that pushes or pops.

/// An element held by the admission queue
#[derive(Debug)]
pub struct QueueElement<T> {
    /// The queued payload
    pub value: T,

    /// Priority (higher pops first)
    pub priority: i32,

    sequence: u64,
}

impl<T> QueueElement<T> {
    /// Insertion sequence number (lower was pushed earlier)
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns true if `self` must leave the queue before `other`
    fn outranks(&self, other: &Self) -> bool {
        self.priority > other.priority
            || (self.priority == other.priority && self.sequence < other.sequence)
    }
}

/// Max-priority queue of pending requests
#[derive(Debug)]
pub struct AdmissionQueue<T> {
    heap: Vec<QueueElement<T>>,
    next_sequence: u64,
}

impl<T> Default for AdmissionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AdmissionQueue<T> {
    /// Creates an empty queue
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            next_sequence: 0,
        }
    }

    /// Inserts a value in O(log n)
    pub fn push(&mut self, value: T, priority: i32) {
        let element = QueueElement {
            value,
            priority,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;

        self.heap.push(element);
        self.sift_up(self.heap.len() - 1);
    }

    /// Removes and returns the highest-priority element in O(log n)
    ///
    /// Returns `None` when the queue is empty.
    pub fn pop(&mut self) -> Option<QueueElement<T>> {
        self.remove(0)
    }

    /// Returns the highest-priority element without removing it
    pub fn peek(&self) -> Option<&QueueElement<T>> {
        self.heap.first()
    }

    /// Returns the element stored at a heap position
    pub fn at(&self, index: usize) -> Option<&QueueElement<T>> {
        self.heap.get(index)
    }

    /// Removes and returns the element at a heap position in O(log n)
    pub fn remove(&mut self, index: usize) -> Option<QueueElement<T>> {
        if index >= self.heap.len() {
            return None;
        }

        let last = self.heap.len() - 1;
        self.heap.swap(index, last);
        let removed = self.heap.pop();

        if index < self.heap.len() {
            // The moved element may belong above or below its new slot
            self.sift_down(index);
            self.sift_up(index);
        }

        removed
    }

    /// Removes and returns the lowest-priority element
    ///
    /// The lowest element of a max-heap is always a leaf, so only the
    /// second half of the backing vector is scanned.
    pub fn pop_lowest(&mut self) -> Option<QueueElement<T>> {
        if self.heap.is_empty() {
            return None;
        }

        let first_leaf = self.heap.len() / 2;
        let mut lowest = first_leaf;
        for index in first_leaf + 1..self.heap.len() {
            if self.heap[lowest].outranks(&self.heap[index]) {
                lowest = index;
            }
        }

        self.remove(lowest)
    }

    /// Number of queued elements
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Iterates over queued elements in heap order (not priority order)
    pub fn iter(&self) -> impl Iterator<Item = &QueueElement<T>> {
        self.heap.iter()
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.heap[index].outranks(&self.heap[parent]) {
                break;
            }
            self.heap.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut highest = index;

            if left < len && self.heap[left].outranks(&self.heap[highest]) {
                highest = left;
            }
            if right < len && self.heap[right].outranks(&self.heap[highest]) {
                highest = right;
            }
            if highest == index {
                break;
            }

            self.heap.swap(index, highest);
            index = highest;
        }
    }

    /// Checks that no element outranks its parent
    #[cfg(test)]
    fn is_heap(&self) -> bool {
        (1..self.heap.len()).all(|i| !self.heap[i].outranks(&self.heap[(i - 1) / 2]))
    }
}
