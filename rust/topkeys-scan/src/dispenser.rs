//! Hands out segment indices to workers.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// A shared cursor over `[0, total)`: every index is handed out exactly once,
/// in increasing order, across all callers.
#[derive(Debug)]
pub struct WorkDispenser {
    state: Mutex<DispenserState>,
}

#[derive(Debug)]
struct DispenserState {
    next_index: usize,
    total: usize,
}

impl WorkDispenser {
    pub fn new(total: usize) -> WorkDispenser {
        WorkDispenser {
            state: Mutex::new(DispenserState {
                next_index: 0,
                total,
            }),
        }
    }

    /// Returns the next undispensed index, or `None` once all are taken.
    pub fn acquire_next(&self) -> Option<usize> {
        let mut state = self.lock();
        if state.next_index < state.total {
            let index = state.next_index;
            state.next_index += 1;
            Some(index)
        } else {
            None
        }
    }

    pub fn total(&self) -> usize {
        self.lock().total
    }

    /// Number of indices handed out so far.
    pub fn dispensed(&self) -> usize {
        self.lock().next_index
    }

    pub fn remaining(&self) -> usize {
        let state = self.lock();
        state.total - state.next_index
    }

    // The state is a plain counter, consistent even if a holder panicked.
    fn lock(&self) -> MutexGuard<'_, DispenserState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::WorkDispenser;
    use std::sync::Arc;

    #[test]
    fn test_sequential_acquire() {
        let dispenser = WorkDispenser::new(3);
        assert_eq!(dispenser.acquire_next(), Some(0));
        assert_eq!(dispenser.acquire_next(), Some(1));
        assert_eq!(dispenser.remaining(), 1);
        assert_eq!(dispenser.acquire_next(), Some(2));
        assert_eq!(dispenser.acquire_next(), None);
        assert_eq!(dispenser.acquire_next(), None);
        assert_eq!(dispenser.dispensed(), 3);
        assert_eq!(dispenser.total(), 3);
    }

    #[test]
    fn test_empty() {
        let dispenser = WorkDispenser::new(0);
        assert_eq!(dispenser.acquire_next(), None);
        assert_eq!(dispenser.remaining(), 0);
    }

    #[test]
    fn test_exactly_once_under_contention() {
        const TOTAL: usize = 10_000;
        let dispenser = Arc::new(WorkDispenser::new(TOTAL));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dispenser = dispenser.clone();
                std::thread::spawn(move || {
                    let mut taken = Vec::new();
                    while let Some(index) = dispenser.acquire_next() {
                        taken.push(index);
                    }
                    taken
                })
            })
            .collect();

        let mut all = Vec::with_capacity(TOTAL);
        for handle in handles {
            let taken = handle.join().unwrap();
            assert!(taken.windows(2).all(|w| w[0] < w[1]));
            all.extend(taken);
        }
        all.sort_unstable();
        assert_eq!(all, (0..TOTAL).collect::<Vec<_>>());
    }
}
