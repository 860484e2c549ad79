// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Poll loop with change detection.
//!
//! [`StateMonitor`] reads the device state once at startup, then polls it at
//! a fixed interval and writes a report whenever the charger state or the
//! inverter list differs from the last snapshot it saw.
//!
//! # Lifecycle
//!
//! 1. **Starting** - banner, initial fetch. If the device cannot be read the
//!    loop never starts and [`run`](StateMonitor::run) returns
//!    [`Error::InitialFetch`].
//! 2. **Sleeping** - a [`Shutdown::wait`] for the poll interval. A stop
//!    request ends the wait early and is honored before the next fetch.
//! 3. **Polling** - fetch and compare. A failed fetch is reported and the
//!    previous snapshot is kept.
//! 4. **Error backoff** - if writing a report fails, the error is logged and
//!    the loop pauses for the recovery delay before sleeping again. A closed
//!    output (broken pipe) stops the loop instead.
//! 5. **Stopped** - shutdown acknowledgment.
//!
//! # Examples
//!
//! ```no_run
//! use fcsp_monitor::monitor::{MonitorConfig, StateMonitor};
//! use fcsp_monitor::protocol::HttpConfig;
//! use std::time::Duration;
//!
//! # async fn example() -> fcsp_monitor::Result<()> {
//! let device = HttpConfig::new("192.168.1.197").into_device()?;
//! let config = MonitorConfig::new(Duration::from_secs(30));
//!
//! let mut monitor = StateMonitor::initialize(device, config, std::io::stdout())?;
//! monitor.run().await
//! # }
//! ```

mod report;
mod shutdown;

pub use report::{TIMESTAMP_FORMAT, banner, format_change, initial_state};
pub use shutdown::Shutdown;

use std::io::{ErrorKind, Write};
use std::time::Duration;

use chrono::Local;

use crate::catalog::{Descriptor, StateCatalog};
use crate::error::{ConfigError, Error, Result};
use crate::protocol::{DeviceClient, DeviceSession, inverter_states};
use crate::types::{InverterStates, StateCode};

// ============================================================================
// MonitorConfig
// ============================================================================

/// Timing parameters for the poll loop.
///
/// # Examples
///
/// ```
/// use fcsp_monitor::monitor::MonitorConfig;
/// use std::time::Duration;
///
/// let config = MonitorConfig::from_secs(30);
/// assert_eq!(config.poll_interval(), Duration::from_secs(30));
/// assert_eq!(config.recovery_delay(), Duration::from_secs(5));
///
/// // The recovery delay always stays below the poll interval.
/// let fast = MonitorConfig::from_secs(2);
/// assert_eq!(fast.recovery_delay(), Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    poll_interval: Duration,
    recovery_delay: Duration,
}

impl MonitorConfig {
    /// Default poll interval.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
    /// Default pause after an unexpected loop error.
    pub const DEFAULT_RECOVERY_DELAY: Duration = Duration::from_secs(5);

    /// Creates a configuration polling every `poll_interval`.
    #[must_use]
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            recovery_delay: Self::DEFAULT_RECOVERY_DELAY,
        }
    }

    /// Creates a configuration polling every `secs` seconds.
    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Sets the pause after an unexpected loop error.
    #[must_use]
    pub fn with_recovery_delay(mut self, delay: Duration) -> Self {
        self.recovery_delay = delay;
        self
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the effective recovery delay.
    ///
    /// A configured delay that is not shorter than the poll interval is
    /// replaced by half the interval.
    #[must_use]
    pub fn recovery_delay(&self) -> Duration {
        if self.recovery_delay < self.poll_interval {
            self.recovery_delay
        } else {
            self.poll_interval / 2
        }
    }

    /// Checks that the poll interval is positive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInterval`] for a zero interval.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidInterval(self.poll_interval));
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_POLL_INTERVAL)
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Charger state and inverter states read in one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Charger operating mode.
    pub state: StateCode,
    /// Inverter module states, in module order.
    pub inverters: InverterStates,
}

impl Snapshot {
    /// Creates a snapshot from raw codes.
    #[must_use]
    pub fn new(state: impl Into<StateCode>, inverters: &[&str]) -> Self {
        Self {
            state: state.into(),
            inverters: inverters.iter().copied().collect(),
        }
    }
}

/// Result of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The device matched the previous snapshot.
    Unchanged,
    /// A change was reported and the snapshot updated.
    Changed,
    /// The fetch failed; the previous snapshot was kept.
    Skipped,
}

/// Reads one snapshot through a fresh session.
///
/// The session is closed whether or not the reads succeed.
///
/// # Errors
///
/// Returns the first connection, transport or decoding error.
pub async fn read_snapshot<C: DeviceClient>(client: &C) -> Result<Snapshot> {
    let mut session = client.connect().await?;
    let result = read_records(&mut session).await;
    session.close().await;
    result
}

async fn read_records<S: DeviceSession>(session: &mut S) -> Result<Snapshot> {
    let charger = session.charger_info().await?;
    let inverters = session.inverter_info().await?;

    Ok(Snapshot {
        state: charger.state().clone(),
        inverters: inverter_states(&inverters),
    })
}

// ============================================================================
// StateMonitor
// ============================================================================

/// Polls a device and reports state transitions to `out`.
#[derive(Debug)]
pub struct StateMonitor<C, W> {
    client: C,
    catalog: StateCatalog,
    config: MonitorConfig,
    shutdown: Shutdown,
    previous: Option<Snapshot>,
    out: W,
}

impl<C: DeviceClient, W: Write> StateMonitor<C, W> {
    /// Creates a monitor without installing signal handlers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInterval`] for a zero poll interval.
    pub fn new(client: C, config: MonitorConfig, out: W) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            client,
            catalog: StateCatalog::builtin(),
            config,
            shutdown: Shutdown::new(),
            previous: None,
            out,
        })
    }

    /// Creates a monitor and registers SIGINT/SIGTERM handlers for it.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration or if the signal
    /// handlers cannot be registered.
    pub fn initialize(client: C, config: MonitorConfig, out: W) -> Result<Self> {
        let monitor = Self::new(client, config, out)?;
        monitor.shutdown.listen_for_signals()?;
        Ok(monitor)
    }

    /// Replaces the state catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: StateCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Returns a handle that can stop the loop.
    #[must_use]
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Returns the last snapshot the loop accepted.
    #[must_use]
    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    /// Returns the device client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Returns the output sink.
    #[must_use]
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Consumes the monitor, returning the output sink.
    #[must_use]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Resolves a state code through the catalog.
    #[must_use]
    pub fn describe(&self, code: &StateCode) -> Descriptor {
        self.catalog.describe(code)
    }

    /// Formats a change report stamped with the current local time.
    #[must_use]
    pub fn format_change(&self, old: &Snapshot, new: &Snapshot) -> String {
        format_change(&self.catalog, Local::now().naive_local(), old, new)
    }

    /// Reads the current device state.
    ///
    /// Device failures are reported to the output and the log and yield
    /// `Ok(None)`; they never propagate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Output`] only if the failure notice cannot be
    /// written.
    pub async fn fetch_state(&mut self) -> Result<Option<Snapshot>> {
        match read_snapshot(&self.client).await {
            Ok(snapshot) => {
                tracing::debug!(
                    state = %snapshot.state,
                    inverters = %snapshot.inverters,
                    "Fetched device state"
                );
                Ok(Some(snapshot))
            }
            Err(e) => {
                tracing::debug!(error = %e, "Failed to get device state");
                self.emit(&format!("❌ Error getting state: {e}"))?;
                Ok(None)
            }
        }
    }

    /// Runs one fetch-compare-report cycle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Output`] if a report cannot be written. The previous
    /// snapshot is then left untouched so the change is reported again on
    /// the next poll.
    pub async fn poll_once(&mut self) -> Result<PollOutcome> {
        let Some(current) = self.fetch_state().await? else {
            return Ok(PollOutcome::Skipped);
        };

        let Some(previous) = self.previous.as_ref() else {
            self.previous = Some(current);
            return Ok(PollOutcome::Unchanged);
        };

        if *previous == current {
            return Ok(PollOutcome::Unchanged);
        }

        let report = self.format_change(previous, &current);
        tracing::info!(
            from = %previous.state,
            to = %current.state,
            inverters = %current.inverters,
            "State change detected"
        );
        self.emit(&format!("\n{report}"))?;
        self.previous = Some(current);

        Ok(PollOutcome::Changed)
    }

    /// Runs the loop until a stop is requested.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InitialFetch`] if the first read fails, or
    /// [`Error::Output`] if the startup text cannot be written. Errors after
    /// startup are reported and the loop keeps going, except a broken pipe
    /// on the output, which ends the loop.
    pub async fn run(&mut self) -> Result<()> {
        self.emit(&banner(self.config.poll_interval()))?;

        if !self.shutdown.start() {
            self.finish();
            return Ok(());
        }

        self.emit("🔍 Getting initial state...")?;
        let Some(initial) = self.fetch_state().await? else {
            tracing::info!("Initial device state unavailable, not starting loop");
            self.shutdown.request();
            self.emit("❌ Failed to get initial state. Exiting.")?;
            return Err(Error::InitialFetch);
        };

        self.emit(&initial_state(&self.catalog, &initial))?;
        self.emit("🔄 Starting monitoring loop...\n")?;
        tracing::info!(
            state = %initial.state,
            interval_secs = self.config.poll_interval().as_secs(),
            "Monitoring started"
        );
        self.previous = Some(initial);

        while self.shutdown.wait(self.config.poll_interval()).await {
            match self.poll_once().await {
                Ok(outcome) => tracing::trace!(?outcome, "Poll cycle complete"),
                Err(Error::Output(e)) if e.kind() == ErrorKind::BrokenPipe => {
                    tracing::error!(error = %e, "Report output closed, stopping");
                    self.shutdown.request();
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Unexpected error in monitoring loop");
                    if let Err(write_err) =
                        self.emit(&format!("❌ Unexpected error in monitoring loop: {e}"))
                    {
                        tracing::debug!(error = %write_err, "Could not report loop error");
                    }
                    if !self.shutdown.wait(self.config.recovery_delay()).await {
                        break;
                    }
                }
            }
        }

        self.finish();
        Ok(())
    }

    fn finish(&mut self) {
        let mut text = String::new();
        if let Some(reason) = self.shutdown.reason() {
            text.push_str(&format!("\n👋 Received {reason}, shutting down gracefully...\n"));
        }
        text.push_str("\n👋 Monitoring stopped");

        if let Err(e) = self.emit(&text) {
            tracing::debug!(error = %e, "Could not write shutdown notice");
        }
        tracing::info!("Monitoring stopped");
    }

    fn emit(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}").map_err(Error::Output)?;
        self.out.flush().map_err(Error::Output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_interval() {
        let config = MonitorConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_zero_interval() {
        let err = MonitorConfig::from_secs(0).validate().unwrap_err();
        assert_eq!(err, ConfigError::InvalidInterval(Duration::ZERO));
    }

    #[test]
    fn recovery_delay_is_shorter_than_interval() {
        let config = MonitorConfig::from_secs(5);
        assert_eq!(config.recovery_delay(), Duration::from_millis(2500));

        let config = MonitorConfig::from_secs(60).with_recovery_delay(Duration::from_secs(10));
        assert_eq!(config.recovery_delay(), Duration::from_secs(10));

        let config = MonitorConfig::from_secs(60).with_recovery_delay(Duration::from_secs(90));
        assert_eq!(config.recovery_delay(), Duration::from_secs(30));
    }

    #[test]
    fn snapshot_equality_covers_inverters() {
        let a = Snapshot::new("CS00", &["ready"]);
        let b = Snapshot::new("CS00", &["ready", "ready"]);
        assert_ne!(a, b);
        assert_eq!(a, Snapshot::new("CS00", &["ready"]));
    }
}
