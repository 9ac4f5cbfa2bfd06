use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-wide count of successfully processed pages
///
/// Workers read it as their loop condition; the monitoring side reads it
/// for progress reports. All accesses are sequentially consistent.
#[derive(Debug)]
pub struct PageCounter {
    count: AtomicUsize,
    budget: usize,
}

impl PageCounter {
    /// Creates a counter at zero with the given page budget
    pub fn new(budget: usize) -> Self {
        Self {
            count: AtomicUsize::new(0),
            budget,
        }
    }

    /// Records one processed page and returns the new count
    pub fn increment(&self) -> usize {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Current number of processed pages
    pub fn get(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// The page budget
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Returns true once the count has reached the budget
    pub fn is_exhausted(&self) -> bool {
        self.get() >= self.budget
    }
}
