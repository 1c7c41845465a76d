// CLASSIFICATION: COMMUNITY
// Filename: error.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-08-29

//! Errors surfaced by the blocking socket layer.
//!
//! All socket operations report failure as a returned value, never as a
//! panic; callers decide whether to retry or give up.

use thiserror::Error;

use crate::stack::StackError;

/// Errors returned by blocking socket operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SocketError {
    /// Operation attempted on a socket whose stack handle is absent
    /// (never opened, or closed by a concurrent thread).
    #[error("no underlying stack socket")]
    NoSocket,

    /// Host name resolution failed. Distinct from network errors so callers
    /// can tell "name didn't resolve" from "network unreachable".
    #[error("dns resolution failed")]
    DnsFailure,

    /// A non-blocking call had nothing ready, or a bounded wait expired.
    #[error("operation would block")]
    WouldBlock,

    /// Opaque error code passed through verbatim from the stack layer.
    #[error("stack error {0}")]
    Stack(i32),
}

impl From<StackError> for SocketError {
    fn from(err: StackError) -> Self {
        match err {
            StackError::WouldBlock => SocketError::WouldBlock,
            StackError::Device(code) => SocketError::Stack(code),
        }
    }
}
