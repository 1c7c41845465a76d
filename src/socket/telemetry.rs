// CLASSIFICATION: COMMUNITY
// Filename: telemetry.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-08-29

//! Byte-count telemetry keyed by socket identity.
//!
//! Each socket registers itself at construction and accumulates its own sent
//! and received byte counts; any thread may query the process-wide totals.
//! Entries outlive their socket so aggregate totals survive individual socket
//! destruction.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;

static NEXT_SOCKET_ID: AtomicU64 = AtomicU64::new(1);

static GLOBAL: Lazy<TelemetryRegistry> = Lazy::new(TelemetryRegistry::new);

/// Process-unique identity of a socket instance.
///
/// Used as the key into the byte-count maps; unlike an address it survives
/// moves and is never reused within a process run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketId(u64);

impl SocketId {
    pub(crate) fn next() -> Self {
        SocketId(NEXT_SOCKET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Process-wide registry of per-socket byte counters.
///
/// Initialised once and never torn down mid-run. Sockets receive a handle to
/// a registry at construction; [`TelemetryRegistry::global`] provides the
/// default process-lifetime instance.
pub struct TelemetryRegistry {
    sent: Mutex<HashMap<SocketId, u64>>,
    received: Mutex<HashMap<SocketId, u64>>,
}

impl TelemetryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(HashMap::new()),
            received: Mutex::new(HashMap::new()),
        }
    }

    /// The default registry with process lifetime.
    pub fn global() -> &'static TelemetryRegistry {
        &GLOBAL
    }

    /// Insert zeroed counters for a freshly opened socket.
    pub(crate) fn register(&self, id: SocketId) {
        lock_map(&self.sent).insert(id, 0);
        lock_map(&self.received).insert(id, 0);
    }

    pub(crate) fn add_sent(&self, id: SocketId, bytes: u64) {
        *lock_map(&self.sent).entry(id).or_insert(0) += bytes;
    }

    pub(crate) fn add_received(&self, id: SocketId, bytes: u64) {
        *lock_map(&self.received).entry(id).or_insert(0) += bytes;
    }

    /// Bytes sent by one socket instance.
    pub fn bytes_sent(&self, id: SocketId) -> u64 {
        lock_map(&self.sent).get(&id).copied().unwrap_or(0)
    }

    /// Bytes received by one socket instance.
    pub fn bytes_received(&self, id: SocketId) -> u64 {
        lock_map(&self.received).get(&id).copied().unwrap_or(0)
    }

    /// Sum of bytes sent across all registered sockets.
    ///
    /// The map lock is held for the whole iteration, so the sum is a
    /// consistent snapshot: entries cannot appear or vanish mid-sum. An empty
    /// registry sums to zero.
    pub fn total_bytes_sent(&self) -> u64 {
        lock_map(&self.sent).values().sum()
    }

    /// Sum of bytes received across all registered sockets.
    pub fn total_bytes_received(&self) -> u64 {
        lock_map(&self.received).values().sum()
    }

    /// Drop the counters for a socket. Entries are retained by default when a
    /// socket closes; this is for callers that want the memory back.
    pub fn forget(&self, id: SocketId) {
        lock_map(&self.sent).remove(&id);
        lock_map(&self.received).remove(&id);
    }
}

impl Default for TelemetryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_map(map: &Mutex<HashMap<SocketId, u64>>) -> MutexGuard<'_, HashMap<SocketId, u64>> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ───────────────────────────── tests ─────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_sums_to_zero() {
        let registry = TelemetryRegistry::new();
        assert_eq!(registry.total_bytes_sent(), 0);
        assert_eq!(registry.total_bytes_received(), 0);
    }

    #[test]
    fn registration_and_accumulation() {
        let registry = TelemetryRegistry::new();
        let a = SocketId::next();
        let b = SocketId::next();
        registry.register(a);
        registry.register(b);
        assert_eq!(registry.total_bytes_sent(), 0);

        registry.add_sent(a, 100);
        registry.add_sent(b, 250);
        registry.add_received(a, 42);
        assert_eq!(registry.bytes_sent(a), 100);
        assert_eq!(registry.total_bytes_sent(), 350);
        assert_eq!(registry.total_bytes_received(), 42);
    }

    #[test]
    fn forget_removes_contribution() {
        let registry = TelemetryRegistry::new();
        let id = SocketId::next();
        registry.register(id);
        registry.add_sent(id, 10);
        registry.forget(id);
        assert_eq!(registry.total_bytes_sent(), 0);
        assert_eq!(registry.bytes_sent(id), 0);
    }
}
