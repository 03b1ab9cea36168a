//! Fixed-capacity ring buffer of access timestamps.

// == Ring Buffer ==
/// Keeps the most recent `capacity` timestamps; pushing into a full buffer
/// overwrites the oldest one.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    slots: Vec<u64>,
    capacity: usize,
    /// Index the next push writes to
    head: usize,
}

impl RingBuffer {
    /// Creates an empty buffer. A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Appends a timestamp in O(1).
    pub fn push(&mut self, timestamp_ms: u64) {
        if self.slots.len() < self.capacity {
            self.slots.push(timestamp_ms);
        } else {
            self.slots[self.head] = timestamp_ms;
        }
        self.head = (self.head + 1) % self.capacity;
    }

    /// Iterates oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        // Before the buffer fills, slots are already in push order
        let split = if self.slots.len() < self.capacity {
            0
        } else {
            self.head
        };
        self.slots[split..]
            .iter()
            .chain(self.slots[..split].iter())
            .copied()
    }

    pub fn latest(&self) -> Option<u64> {
        if self.slots.is_empty() {
            return None;
        }
        let idx = (self.head + self.capacity - 1) % self.capacity;
        self.slots.get(idx).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_below_capacity() {
        let mut ring = RingBuffer::with_capacity(4);
        ring.push(1);
        ring.push(2);

        assert_eq!(ring.len(), 2);
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(ring.latest(), Some(2));
    }

    #[test]
    fn test_push_overwrites_oldest() {
        let mut ring = RingBuffer::with_capacity(3);
        for ts in 1..=5 {
            ring.push(ts);
        }

        assert_eq!(ring.len(), 3);
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(ring.latest(), Some(5));
    }

    #[test]
    fn test_exactly_full_keeps_order() {
        let mut ring = RingBuffer::with_capacity(3);
        for ts in [10, 20, 30] {
            ring.push(ts);
        }
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![10, 20, 30]);
        assert_eq!(ring.latest(), Some(30));
    }

    #[test]
    fn test_empty_and_zero_capacity() {
        let mut ring = RingBuffer::with_capacity(0);
        assert!(ring.is_empty());
        assert_eq!(ring.latest(), None);
        assert_eq!(ring.capacity(), 1);

        ring.push(7);
        ring.push(8);
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![8]);
    }
}
