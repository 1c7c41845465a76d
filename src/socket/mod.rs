// CLASSIFICATION: COMMUNITY
// Filename: socket/mod.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-08-29

//! Blocking datagram socket emulation over the asynchronous stack.

/// Per-socket byte-count telemetry and process-wide aggregation.
pub mod telemetry;

/// The blocking UDP socket itself.
pub mod udp;

pub use telemetry::{SocketId, TelemetryRegistry};
pub use udp::UdpSocket;
