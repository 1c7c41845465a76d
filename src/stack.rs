// CLASSIFICATION: COMMUNITY
// Filename: stack.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-08-29

//! Contract of the consumed asynchronous network stack.
//!
//! The stack owns the actual socket resources and performs all protocol work.
//! Its datagram primitives never block: they either complete immediately or
//! report [`StackError::WouldBlock`], and readiness to retry is announced
//! through the callback registered with [`NetworkStack::socket_attach`].

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

/// Errors reported by the underlying network stack.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    /// The stack made no progress; retry after the next readiness event.
    #[error("would block")]
    WouldBlock,

    /// Opaque device or stack error code.
    #[error("device error {0}")]
    Device(i32),
}

/// Asynchronous, event-notified datagram stack.
///
/// The attached readiness callback is invoked from the stack's own event
/// context, which may be interrupt-like. It is never invoked while the caller
/// holds a socket's instance lock, and implementations of this trait must not
/// assume they can take such a lock from within it.
pub trait NetworkStack: Send + Sync {
    /// Opaque per-socket resource owned by the stack.
    type Handle: Send;

    /// Allocate a datagram socket inside the stack.
    fn socket_open(&self) -> Result<Self::Handle, StackError>;

    /// Release a stack socket. The handle is consumed either way.
    fn socket_close(&self, handle: Self::Handle) -> Result<(), StackError>;

    /// Register the single readiness callback for `handle`, replacing any
    /// previous registration.
    fn socket_attach(&self, handle: &Self::Handle, sigio: Box<dyn Fn() + Send + Sync>);

    /// Resolve a host name to an address.
    fn resolve(&self, host: &str) -> Result<IpAddr, StackError>;

    /// Non-blocking datagram send. Returns the number of bytes accepted.
    fn sendto(
        &self,
        handle: &Self::Handle,
        dest: SocketAddr,
        data: &[u8],
    ) -> Result<usize, StackError>;

    /// Non-blocking datagram receive. Returns the source address and the
    /// number of bytes written into `buf`.
    fn recvfrom(
        &self,
        handle: &Self::Handle,
        buf: &mut [u8],
    ) -> Result<(SocketAddr, usize), StackError>;
}
