// CLASSIFICATION: COMMUNITY
// Filename: trace/mod.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-08-29

//! Diagnostic tracing of protocol state transitions.
//!
//! [`TransitionLog`] keeps a fixed-capacity, append-only history of TCP state
//! changes for post-hoc inspection; [`ExtendedClock`] supplies the wrap-safe
//! 64-bit timestamps the entries carry.

/// Wrap-safe 64-bit extension of a narrower tick counter.
pub mod clock;

/// The fixed-capacity state transition log.
pub mod transitions;

pub use clock::{ExtendedClock, KernelTicks, TickSource};
pub use transitions::{TcpPcb, TcpState, TransitionEvent, TransitionLog};
