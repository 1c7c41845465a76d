// CLASSIFICATION: COMMUNITY
// Filename: clock.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-08-29

//! Wrap-safe 64-bit extension of a narrower kernel tick counter.

use std::sync::Mutex;
use std::time::Instant;

/// Width-limited, wrapping tick counter consumed by [`ExtendedClock`].
///
/// Readings are monotonically non-decreasing apart from the wrap back to zero
/// at the 32-bit boundary.
pub trait TickSource: Send + Sync {
    /// Current low-order tick reading.
    fn low_order_ticks(&self) -> u32;
}

/// Milliseconds since construction, truncated to the 32-bit tick width.
///
/// Stands in for the kernel tick counter on hosted builds; wraps every
/// ~49.7 days like its RTOS counterpart.
pub struct KernelTicks {
    epoch: Instant,
}

impl KernelTicks {
    /// Start counting from now.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for KernelTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for KernelTicks {
    fn low_order_ticks(&self) -> u32 {
        self.epoch.elapsed().as_millis() as u32
    }
}

struct TickMemory {
    low: u32,
    high: u32,
}

/// Extends a wrapping 32-bit tick counter to a non-decreasing 64-bit count.
///
/// A wrap is detected when a reading is smaller than the previous one, so
/// [`ExtendedClock::now`] must be called at least once per wrap period of the
/// underlying counter. Calling less often silently loses wrap events and
/// breaks monotonicity; the algorithm does not enforce this precondition.
///
/// The read-compare-update sequence runs under a mutex that is only ever held
/// for those few instructions, so `now` is safe under concurrent invocation
/// and never blocks for long.
pub struct ExtendedClock<T: TickSource> {
    source: T,
    memory: Mutex<TickMemory>,
}

impl<T: TickSource> ExtendedClock<T> {
    /// Wrap `source` into an extended clock starting at wrap count zero.
    pub fn new(source: T) -> Self {
        Self {
            source,
            memory: Mutex::new(TickMemory { low: 0, high: 0 }),
        }
    }

    /// Current extended tick count: `(wrap_count << 32) | low_reading`.
    pub fn now(&self) -> u64 {
        let mut memory = self
            .memory
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let low = self.source.low_order_ticks();
        if low < memory.low {
            memory.high += 1;
        }
        memory.low = low;
        (u64::from(memory.high) << 32) | u64::from(low)
    }
}

// ───────────────────────────── tests ─────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays a fixed sequence of readings, repeating the last one.
    struct ScriptedTicks {
        readings: Vec<u32>,
        next: AtomicUsize,
    }

    impl ScriptedTicks {
        fn new(readings: &[u32]) -> Self {
            Self {
                readings: readings.to_vec(),
                next: AtomicUsize::new(0),
            }
        }
    }

    impl TickSource for ScriptedTicks {
        fn low_order_ticks(&self) -> u32 {
            let i = self.next.fetch_add(1, Ordering::Relaxed);
            self.readings[i.min(self.readings.len() - 1)]
        }
    }

    #[test]
    fn extends_without_wrap() {
        let clock = ExtendedClock::new(ScriptedTicks::new(&[5, 10, 1000]));
        assert_eq!(clock.now(), 5);
        assert_eq!(clock.now(), 10);
        assert_eq!(clock.now(), 1000);
    }

    #[test]
    fn strictly_increases_across_a_wrap() {
        let clock = ExtendedClock::new(ScriptedTicks::new(&[u32::MAX - 5, 2, 7]));
        let before = clock.now();
        let after = clock.now();
        assert!(after > before);
        // The low 32 bits track the raw reading.
        assert_eq!(after & 0xFFFF_FFFF, 2);
        assert_eq!(after >> 32, 1);
        assert_eq!(clock.now(), (1u64 << 32) | 7);
    }

    #[test]
    fn kernel_ticks_do_not_decrease() {
        let ticks = KernelTicks::new();
        let first = ticks.low_order_ticks();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(ticks.low_order_ticks() >= first);
    }

    #[test]
    fn counts_multiple_wraps() {
        let clock = ExtendedClock::new(ScriptedTicks::new(&[10, 3, 1, 0]));
        clock.now();
        clock.now(); // wrap 1
        clock.now(); // wrap 2
        assert_eq!(clock.now() >> 32, 3);
    }
}
