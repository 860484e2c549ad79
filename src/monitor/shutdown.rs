// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cooperative shutdown for the poll loop.
//!
//! [`Shutdown`] is a cloneable handle around an atomic run state. Signal
//! listeners only flip the state and wake sleepers; the loop itself decides
//! when to stop, at its next check point.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::Notify;

use crate::error::Error;

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPING: u8 = 2;

/// Shared run flag between the poll loop and shutdown requesters.
///
/// A stop request made before [`start`](Self::start) is not lost: `start`
/// then returns `false`.
///
/// # Examples
///
/// ```
/// use fcsp_monitor::monitor::Shutdown;
///
/// let shutdown = Shutdown::new();
/// assert!(!shutdown.is_running());
///
/// assert!(shutdown.start());
/// assert!(shutdown.is_running());
///
/// shutdown.clone().request();
/// assert!(!shutdown.is_running());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    state: AtomicU8,
    notify: Notify,
    reason: OnceLock<&'static str>,
}

impl Shutdown {
    /// Creates a handle in the not-yet-running state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the loop as running.
    ///
    /// Returns `false` if a stop was already requested.
    pub fn start(&self) -> bool {
        match self.inner.state.compare_exchange(
            IDLE,
            RUNNING,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => true,
            Err(current) => current == RUNNING,
        }
    }

    /// Returns `true` while the loop is started and no stop was requested.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.state.load(Ordering::Acquire) == RUNNING
    }

    /// Returns `true` once a stop has been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.inner.state.load(Ordering::Acquire) == STOPPING
    }

    /// Requests a stop and wakes any pending [`wait`](Self::wait).
    pub fn request(&self) {
        self.inner.state.store(STOPPING, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    /// Requests a stop, recording what caused it.
    ///
    /// Only the first recorded reason is kept.
    pub fn request_with_reason(&self, reason: &'static str) {
        let _ = self.inner.reason.set(reason);
        self.request();
    }

    /// Returns the first recorded stop reason, such as `SIGINT`.
    #[must_use]
    pub fn reason(&self) -> Option<&'static str> {
        self.inner.reason.get().copied()
    }

    /// Waits for `duration` or until a stop is requested, whichever is first.
    ///
    /// Returns whether the loop should keep running.
    pub async fn wait(&self, duration: Duration) -> bool {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent request cannot
        // slip between the check and the wait.
        notified.as_mut().enable();

        if !self.is_running() {
            return false;
        }

        tokio::select! {
            () = tokio::time::sleep(duration) => {}
            () = &mut notified => {}
        }

        self.is_running()
    }

    /// Installs SIGINT and SIGTERM handlers that request a stop.
    ///
    /// The handlers are registered before this returns; a background task
    /// then forwards each received signal to [`request_with_reason`].
    ///
    /// [`request_with_reason`]: Self::request_with_reason
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signal`] if a handler cannot be registered.
    #[cfg(unix)]
    pub fn listen_for_signals(&self) -> Result<(), Error> {
        use tokio::signal::unix::{SignalKind, signal};

        let mut interrupt = signal(SignalKind::interrupt()).map_err(Error::Signal)?;
        let mut terminate = signal(SignalKind::terminate()).map_err(Error::Signal)?;
        let shutdown = self.clone();

        tokio::spawn(async move {
            loop {
                let name = tokio::select! {
                    Some(()) = interrupt.recv() => "SIGINT",
                    Some(()) = terminate.recv() => "SIGTERM",
                    else => break,
                };
                tracing::info!(signal = name, "Received shutdown signal");
                shutdown.request_with_reason(name);
            }
        });

        Ok(())
    }

    /// Installs a Ctrl+C handler that requests a stop.
    ///
    /// # Errors
    ///
    /// Never fails on this platform; registration errors are logged by the
    /// listener task.
    #[cfg(not(unix))]
    pub fn listen_for_signals(&self) -> Result<(), Error> {
        let shutdown = self.clone();

        tokio::spawn(async move {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                    break;
                }
                tracing::info!(signal = "Ctrl+C", "Received shutdown signal");
                shutdown.request_with_reason("Ctrl+C");
            }
        });

        Ok(())
    }
}
