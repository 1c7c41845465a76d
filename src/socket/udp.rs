// CLASSIFICATION: COMMUNITY
// Filename: udp.rs v0.5
// Author: Lukas Bower
// Date Modified: 2026-08-29

//! Blocking send/receive emulation for a datagram socket.
//!
//! The underlying stack never blocks: it completes immediately or reports
//! would-block, then signals readiness through a per-socket event callback.
//! [`UdpSocket`] turns that into a blocking contract with an optional timeout
//! by looping attempt / wait-on-flag / retry, releasing the instance lock for
//! the duration of every wait.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::info;

use crate::error::SocketError;
use crate::socket::telemetry::{SocketId, TelemetryRegistry};
use crate::stack::{NetworkStack, StackError};
use crate::sync::{EventFlags, Timeout, READ_READY, WRITE_READY};

type Sigio = Arc<dyn Fn() + Send + Sync>;

/// Socket state reachable from the stack's event context.
///
/// Kept outside the instance lock on purpose: the event context must never
/// queue behind a thread that holds the instance lock while it, in turn, may
/// hold locks of other resources.
struct SocketShared {
    flags: EventFlags,
    pending: AtomicU32,
    sigio: Mutex<Option<Sigio>>,
}

impl SocketShared {
    /// Readiness notification from the stack.
    ///
    /// The stack does not say which direction became ready at this
    /// granularity, so both flags are set unconditionally.
    fn stack_event(&self) {
        self.flags.set(READ_READY | WRITE_READY);

        let previous = self.pending.fetch_add(1, Ordering::AcqRel);
        if previous == 0 {
            // Edge-triggered: only the 0 -> 1 transition dispatches the
            // callback. Bursts arriving while one is outstanding do not
            // re-enter it; the application drains all work once notified.
            let callback = self
                .sigio
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone();
            if let Some(callback) = callback {
                callback();
            }
        }
    }
}

/// Fields guarded by the instance lock.
struct Inner<H> {
    handle: Option<H>,
    timeout: Timeout,
}

/// Datagram socket presenting a blocking send/receive contract over an
/// asynchronous [`NetworkStack`].
///
/// Safe to share across threads; concurrent operations on one instance are
/// serialised by the instance lock, which is never held across a wait.
pub struct UdpSocket<S: NetworkStack> {
    stack: Arc<S>,
    registry: Arc<TelemetryRegistry>,
    id: SocketId,
    inner: Mutex<Inner<S::Handle>>,
    shared: Arc<SocketShared>,
}

impl<S: NetworkStack> UdpSocket<S> {
    /// Open a socket on `stack` and register its telemetry entry.
    ///
    /// A fresh socket is non-blocking; use [`UdpSocket::set_timeout`] to opt
    /// into bounded or unbounded waits.
    pub fn open(stack: Arc<S>, registry: Arc<TelemetryRegistry>) -> Result<Self, SocketError> {
        let handle = stack.socket_open()?;
        let id = SocketId::next();
        registry.register(id);

        let shared = Arc::new(SocketShared {
            flags: EventFlags::new(),
            pending: AtomicU32::new(0),
            sigio: Mutex::new(None),
        });
        let event_target = Arc::clone(&shared);
        stack.socket_attach(&handle, Box::new(move || event_target.stack_event()));
        info!("udp socket {:?} opened", id);

        Ok(Self {
            stack,
            registry,
            id,
            inner: Mutex::new(Inner {
                handle: Some(handle),
                timeout: Timeout::NonBlocking,
            }),
            shared,
        })
    }

    /// Configure the wait policy for subsequent send/receive calls.
    pub fn set_timeout(&self, timeout: Timeout) {
        self.lock_inner().timeout = timeout;
    }

    /// Current wait policy.
    pub fn timeout(&self) -> Timeout {
        self.lock_inner().timeout
    }

    /// Install the readiness callback. It fires once per burst of stack
    /// notifications, on the transition from zero to one pending events.
    pub fn set_event_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self
            .shared
            .sigio
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::new(callback));
    }

    /// Remove the readiness callback.
    pub fn clear_event_callback(&self) {
        *self
            .shared
            .sigio
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    /// Stack notifications received since the last send/receive attempt
    /// started.
    pub fn pending_events(&self) -> u32 {
        self.shared.pending.load(Ordering::Acquire)
    }

    /// Telemetry identity of this socket.
    pub fn id(&self) -> SocketId {
        self.id
    }

    /// Resolve `host` and send `data` to it at `port`.
    ///
    /// Resolution happens before the instance lock is taken and never touches
    /// socket state; a resolver failure reports [`SocketError::DnsFailure`].
    pub fn send_to_host(&self, host: &str, port: u16, data: &[u8]) -> Result<usize, SocketError> {
        let addr = self
            .stack
            .resolve(host)
            .map_err(|_| SocketError::DnsFailure)?;
        self.send_to(SocketAddr::new(addr, port), data)
    }

    /// Send `data` to `dest`, blocking per the configured [`Timeout`].
    ///
    /// On success the byte count is accumulated into this socket's telemetry
    /// entry. A bounded wait that expires resolves to
    /// [`SocketError::WouldBlock`].
    pub fn send_to(&self, dest: SocketAddr, data: &[u8]) -> Result<usize, SocketError> {
        let mut inner = self.lock_inner();
        loop {
            let handle = inner.handle.as_ref().ok_or(SocketError::NoSocket)?;
            self.shared.pending.store(0, Ordering::Release);

            match self.stack.sendto(handle, dest, data) {
                Ok(sent) => {
                    self.registry.add_sent(self.id, sent as u64);
                    return Ok(sent);
                }
                Err(StackError::WouldBlock) if inner.timeout != Timeout::NonBlocking => {
                    // Release the lock before waiting so other threads
                    // accessing this socket aren't blocked.
                    let timeout = inner.timeout;
                    drop(inner);
                    let waited = self.shared.flags.wait_any(WRITE_READY, timeout);
                    inner = self.lock_inner();
                    if waited.is_err() {
                        return Err(SocketError::WouldBlock);
                    }
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    /// Receive a datagram, blocking per the configured [`Timeout`].
    ///
    /// Returns the source address and the number of bytes written into `buf`.
    /// The byte count is accumulated into this socket's telemetry entry,
    /// mirroring the send path.
    pub fn recv_from(&self, buf: &mut [u8]) -> Result<(SocketAddr, usize), SocketError> {
        let mut inner = self.lock_inner();
        loop {
            let handle = inner.handle.as_ref().ok_or(SocketError::NoSocket)?;
            self.shared.pending.store(0, Ordering::Release);

            match self.stack.recvfrom(handle, buf) {
                Ok((source, read)) => {
                    self.registry.add_received(self.id, read as u64);
                    return Ok((source, read));
                }
                Err(StackError::WouldBlock) if inner.timeout != Timeout::NonBlocking => {
                    let timeout = inner.timeout;
                    drop(inner);
                    let waited = self.shared.flags.wait_any(READ_READY, timeout);
                    inner = self.lock_inner();
                    if waited.is_err() {
                        return Err(SocketError::WouldBlock);
                    }
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    /// Close the underlying stack socket.
    ///
    /// Concurrent and future operations fail with [`SocketError::NoSocket`].
    /// Blocked waiters are woken so they observe the absent handle instead of
    /// sleeping forever. Telemetry entries are retained for aggregate totals.
    pub fn close(&self) -> Result<(), SocketError> {
        let mut inner = self.lock_inner();
        if let Some(handle) = inner.handle.take() {
            self.stack.socket_close(handle)?;
            info!("udp socket {:?} closed", self.id);
        }
        drop(inner);
        self.shared.flags.set(READ_READY | WRITE_READY);
        Ok(())
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner<S::Handle>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S: NetworkStack> Drop for UdpSocket<S> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
