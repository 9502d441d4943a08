//! Batch size tracking

/// Default maximum number of records in one batch
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Counts records since the last drain and signals when a batch is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCounter {
    count: usize,
    max_size: usize,
}

impl Default for BatchCounter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BATCH_SIZE)
    }
}

impl BatchCounter {
    /// Create a counter with the given maximum (at least 1)
    pub fn new(max_size: usize) -> Self {
        Self {
            count: 0,
            max_size: max_size.max(1),
        }
    }

    /// Record one written record, returning true when the batch is full
    pub fn increment(&mut self) -> bool {
        self.count += 1;
        self.is_full()
    }

    /// Check if the batch reached its maximum size
    pub fn is_full(&self) -> bool {
        self.count >= self.max_size
    }

    /// Check if no records were counted since the last reset
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of records in the current batch
    pub fn count(&self) -> usize {
        self.count
    }

    /// Maximum batch size
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Start a new batch
    pub fn reset(&mut self) {
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_max() {
        let counter = BatchCounter::default();
        assert_eq!(counter.max_size(), 1000);
        assert!(counter.is_empty());
    }

    #[test]
    fn test_full_at_max_and_reset() {
        let mut counter = BatchCounter::new(3);
        assert!(!counter.increment());
        assert!(!counter.increment());
        assert!(counter.increment());
        assert_eq!(counter.count(), 3);

        counter.reset();
        assert!(counter.is_empty());
        assert!(!counter.is_full());
    }

    #[test]
    fn test_zero_max_clamped() {
        let mut counter = BatchCounter::new(0);
        assert_eq!(counter.max_size(), 1);
        assert!(counter.increment());
    }
}
