// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-08-29

//! Blocking-style datagram I/O and protocol state tracing over an
//! asynchronous network stack.
//!
//! The stack itself is an external collaborator: it performs work
//! asynchronously and reports either immediate completion or a would-block
//! status, signalling readiness through a per-socket event callback. This
//! crate supplies the thread-facing scaffolding around it:
//!
//! * [`socket::UdpSocket`] emulates a blocking send/receive contract with
//!   optional timeouts on top of the non-blocking primitives, and keeps
//!   process-wide byte-count telemetry in a [`socket::TelemetryRegistry`].
//! * [`trace::TransitionLog`] records TCP state transitions into a
//!   fixed-capacity log, timestamped by a wrap-safe 64-bit extension of a
//!   narrower kernel tick counter ([`trace::ExtendedClock`]).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Socket-layer error taxonomy.
pub mod error;

/// Traits for the consumed asynchronous network stack.
pub mod stack;

/// Event-flag synchronisation and wait policies.
pub mod sync;

/// Blocking datagram socket emulation and byte-count telemetry.
pub mod socket;

/// Diagnostic tracing: tick extension and the state transition log.
pub mod trace;

pub use error::SocketError;
pub use stack::{NetworkStack, StackError};
pub use sync::Timeout;
