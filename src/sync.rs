// CLASSIFICATION: COMMUNITY
// Filename: sync.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-08-29

//! Event-flag synchronisation for the blocking socket layer.
//!
//! [`EventFlags`] is a word-sized set of readiness bits. Notifiers OR bits in
//! from any context; waiters block until any bit of their mask is present and
//! consume exactly the bits they matched. Waits honour the three-way
//! [`Timeout`] policy used throughout the socket layer.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Readiness bit set by the stack when a receive may make progress.
pub const READ_READY: u32 = 0x1;
/// Readiness bit set by the stack when a send may make progress.
pub const WRITE_READY: u32 = 0x2;

/// Wait policy for blocking socket operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Try once, never wait.
    #[default]
    NonBlocking,
    /// Wait at most this long.
    Bounded(Duration),
    /// Wait indefinitely.
    Infinite,
}

/// A bounded or non-blocking wait ended without any requested flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitTimedOut;

/// Word-sized event-flag set with any-of waiting.
pub struct EventFlags {
    state: Mutex<u32>,
    cond: Condvar,
}

impl EventFlags {
    /// Create an empty flag set.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(0),
            cond: Condvar::new(),
        }
    }

    /// Set `mask` bits and wake all waiters.
    pub fn set(&self, mask: u32) {
        let mut state = self.lock_state();
        *state |= mask;
        self.cond.notify_all();
    }

    /// Wait until any bit of `mask` is set, clear the matched bits and return
    /// them.
    ///
    /// With [`Timeout::NonBlocking`] the flags are checked exactly once. With
    /// [`Timeout::Bounded`] a deadline is re-armed across spurious wakeups, so
    /// the wait expires no earlier than the bound.
    pub fn wait_any(&self, mask: u32, timeout: Timeout) -> Result<u32, WaitTimedOut> {
        let mut state = self.lock_state();
        match timeout {
            Timeout::NonBlocking => Self::take_matched(&mut state, mask).ok_or(WaitTimedOut),
            Timeout::Infinite => loop {
                if let Some(matched) = Self::take_matched(&mut state, mask) {
                    return Ok(matched);
                }
                state = self
                    .cond
                    .wait(state)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            },
            Timeout::Bounded(limit) => {
                let deadline = Instant::now() + limit;
                loop {
                    if let Some(matched) = Self::take_matched(&mut state, mask) {
                        return Ok(matched);
                    }
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(WaitTimedOut);
                    }
                    let (guard, _) = self
                        .cond
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    state = guard;
                }
            }
        }
    }

    fn take_matched(state: &mut MutexGuard<'_, u32>, mask: u32) -> Option<u32> {
        let matched = **state & mask;
        if matched == 0 {
            return None;
        }
        **state &= !matched;
        Some(matched)
    }

    fn lock_state(&self) -> MutexGuard<'_, u32> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for EventFlags {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────── tests ─────────────────────────────────────────
