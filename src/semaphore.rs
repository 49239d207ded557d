//! Non-blocking counting semaphore used for slot admission.
//!
//! Only `try_acquire` and `release` ever modify the count. There is no
//! blocking `acquire`: a caller that finds the count at zero is turned away.

use std::sync::atomic::{AtomicUsize, Ordering};

/// A counting semaphore bounded above by `limit`.
///
/// Each permit stands for one buffer slot in a particular state (empty or
/// full). The count never goes below zero and never exceeds `limit`; a
/// release that would push it past `limit` is a bookkeeping defect and panics.
#[derive(Debug)]
pub struct SlotSemaphore {
    permits: AtomicUsize,
    limit: usize,
}

impl SlotSemaphore {
    pub fn new(initial: usize, limit: usize) -> Self {
        assert!(initial <= limit, "initial permits {} exceed limit {}", initial, limit);
        SlotSemaphore {
            permits: AtomicUsize::new(initial),
            limit,
        }
    }

    /// Take one permit if any is available.
    ///
    /// Returns `false` straight away when the count is zero.
    ///
    /// # Memory Ordering
    /// - Successful CAS: Acquire (pairs with the Release in `release`, so the
    ///   critical section that made the permit available happens before ours)
    #[inline]
    pub fn try_acquire(&self) -> bool {
        let mut current = self.permits.load(Ordering::Relaxed);
        loop {
            if current == 0 {
                return false;
            }

            match self.permits.compare_exchange_weak(
                current,
                current - 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(actual) => {
                    // Lost the race to another acquirer or releaser, retry
                    current = actual;
                    std::hint::spin_loop();
                }
            }
        }
    }

    /// Return one permit.
    #[inline]
    pub fn release(&self) {
        let previous = self.permits.fetch_add(1, Ordering::Release);
        assert!(
            previous < self.limit,
            "slot count overflow: released past limit {}",
            self.limit
        );
    }

    /// Current number of permits. Approximate while other threads are active.
    #[inline]
    pub fn available(&self) -> usize {
        self.permits.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_acquire_until_exhausted() {
        let sem = SlotSemaphore::new(3, 3);
        assert!(sem.try_acquire());
        assert!(sem.try_acquire());
        assert!(sem.try_acquire());
        assert!(!sem.try_acquire());
        assert_eq!(sem.available(), 0);

        sem.release();
        assert_eq!(sem.available(), 1);
        assert!(sem.try_acquire());
    }

    #[test]
    fn test_zero_initial() {
        let sem = SlotSemaphore::new(0, 4);
        assert!(!sem.try_acquire());
        sem.release();
        assert!(sem.try_acquire());
        assert!(!sem.try_acquire());
    }

    #[test]
    #[should_panic(expected = "slot count overflow")]
    fn test_release_past_limit_panics() {
        let sem = SlotSemaphore::new(2, 2);
        sem.release();
    }

    /// Test: many threads race for fewer permits than there are threads.
    ///
    /// Exactly `PERMITS` acquisitions may succeed, no matter the interleaving.
    #[test]
    fn test_contended_acquire_grants_exact_permits() {
        const PERMITS: usize = 16;
        const THREADS: usize = 8;
        const ATTEMPTS: usize = 10;

        for _attempt in 0..20 {
            let sem = Arc::new(SlotSemaphore::new(PERMITS, PERMITS));
            let barrier = Arc::new(Barrier::new(THREADS));

            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let sem = Arc::clone(&sem);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        (0..ATTEMPTS).filter(|_| sem.try_acquire()).count()
                    })
                })
                .collect();

            let granted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
            assert_eq!(granted, PERMITS, "granted {} permits out of {}", granted, PERMITS);
            assert_eq!(sem.available(), 0);
        }
    }
}
