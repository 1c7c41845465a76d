// CLASSIFICATION: COMMUNITY
// Filename: transitions.rs v0.4
// Author: Lukas Bower
// Date Modified: 2026-08-29

//! Fixed-capacity log of TCP state transitions.
//!
//! Every tracked transition mutates the control block and, capacity
//! permitting, appends one timestamped entry. The log saturates rather than
//! evicting: once full, further transitions still take effect but their
//! entries are dropped with a warning. Appends never block beyond the brief
//! log lock and the backing storage never grows.

use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread;

use log::{debug, warn};
use serde::{Serialize, Serializer};

use super::clock::{ExtendedClock, TickSource};

/// Maximum recorded length of a reporting thread's name, in bytes.
pub const THREAD_NAME_CAPACITY: usize = 32;

/// Default entry capacity of a [`TransitionLog`].
pub const DEFAULT_LOG_DEPTH: usize = 50;

/// TCP connection states as tracked by the stack core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TcpState {
    Closed,
    Listen,
    SynSent,
    SynRcvd,
    Established,
    FinWait1,
    FinWait2,
    CloseWait,
    Closing,
    LastAck,
    TimeWait,
}

impl TcpState {
    /// Lower-case name used in log and JSON output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Listen => "listen",
            Self::SynSent => "syn_sent",
            Self::SynRcvd => "syn_rcvd",
            Self::Established => "established",
            Self::FinWait1 => "fin_wait_1",
            Self::FinWait2 => "fin_wait_2",
            Self::CloseWait => "close_wait",
            Self::Closing => "closing",
            Self::LastAck => "last_ack",
            Self::TimeWait => "time_wait",
        }
    }
}

impl Serialize for TcpState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Protocol control block whose state transitions are recorded.
#[derive(Debug, Clone)]
pub struct TcpPcb {
    /// Local endpoint address.
    pub local_addr: IpAddr,
    /// Remote endpoint address.
    pub remote_addr: IpAddr,
    /// Local port.
    pub local_port: u16,
    /// Remote port.
    pub remote_port: u16,
    /// Current connection state.
    pub state: TcpState,
}

/// One observed transition of a control block to a new state.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionEvent {
    /// Local endpoint address at the time of the transition.
    pub local_addr: IpAddr,
    /// Remote endpoint address at the time of the transition.
    pub remote_addr: IpAddr,
    /// Local port.
    pub local_port: u16,
    /// Remote port.
    pub remote_port: u16,
    /// The state the control block moved to.
    pub state: TcpState,
    /// Extended 64-bit tick timestamp.
    pub timestamp: u64,
    /// Name of the reporting thread, truncated to
    /// [`THREAD_NAME_CAPACITY`] bytes.
    pub thread: String,
}

impl TransitionEvent {
    /// Render the event as one JSON line.
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Fixed-capacity, append-only log of TCP state transitions.
///
/// Insertion order is temporal order. The logical size never exceeds the
/// capacity fixed at construction.
pub struct TransitionLog<T: TickSource> {
    clock: ExtendedClock<T>,
    events: Mutex<Vec<TransitionEvent>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl<T: TickSource> TransitionLog<T> {
    /// Create a log of [`DEFAULT_LOG_DEPTH`] entries timestamped by `source`.
    pub fn new(source: T) -> Self {
        Self::with_capacity(DEFAULT_LOG_DEPTH, source)
    }

    /// Create a log holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize, source: T) -> Self {
        Self {
            clock: ExtendedClock::new(source),
            events: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Move `pcb` to `new_state` and record the transition.
    ///
    /// The state change always takes effect; only the log entry is subject to
    /// the capacity limit. At capacity the entry is dropped with a warning,
    /// never blocking or failing the caller.
    pub fn record_transition(&self, pcb: &mut TcpPcb, new_state: TcpState) {
        pcb.state = new_state;

        let mut events = self.lock_events();
        if events.len() == self.capacity {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            warn!(
                "tcp transition log saturated at {} entries, dropped transition to {}",
                self.capacity,
                new_state.as_str()
            );
            return;
        }

        let event = TransitionEvent {
            local_addr: pcb.local_addr,
            remote_addr: pcb.remote_addr,
            local_port: pcb.local_port,
            remote_port: pcb.remote_port,
            state: new_state,
            timestamp: self.clock.now(),
            thread: current_thread_name(),
        };
        debug!(
            "tcp {}:{} <-> {}:{} now {} at {} on {}",
            event.local_addr,
            event.local_port,
            event.remote_addr,
            event.remote_port,
            event.state.as_str(),
            event.timestamp,
            event.thread
        );
        events.push(event);
    }

    /// Copy of the current entries in insertion order.
    pub fn snapshot(&self) -> Vec<TransitionEvent> {
        self.lock_events().clone()
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.lock_events().len()
    }

    /// True when no entries are recorded.
    pub fn is_empty(&self) -> bool {
        self.lock_events().is_empty()
    }

    /// Fixed entry capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Transitions dropped because the log was full.
    pub fn saturated_drops(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset the logical size to zero. Capacity is unchanged and the backing
    /// storage is kept for future appends.
    pub fn clear(&self) {
        self.lock_events().clear();
    }

    fn lock_events(&self) -> MutexGuard<'_, Vec<TransitionEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn current_thread_name() -> String {
    let thread = thread::current();
    truncate_name(thread.name().unwrap_or("<unnamed>"))
}

fn truncate_name(name: &str) -> String {
    if name.len() <= THREAD_NAME_CAPACITY {
        return name.to_string();
    }
    let mut end = THREAD_NAME_CAPACITY;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

// ───────────────────────────── tests ─────────────────────────────────────────
