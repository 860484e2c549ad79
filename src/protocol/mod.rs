// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Access to the charging device.
//!
//! A [`DeviceClient`] hands out short-lived [`DeviceSession`]s. The monitor
//! opens one session per poll, reads the charger and inverter records, and
//! closes it again before sleeping, so nothing is held open between polls.
//!
//! - [`HttpDevice`]: REST client for the device's local HTTP API

mod http;
mod info;

pub use http::{HttpConfig, HttpDevice, HttpSession};
pub use info::{ChargerInfo, InverterInfo, inverter_states};

use crate::error::Error;

/// Source of device sessions.
#[allow(async_fn_in_trait)]
pub trait DeviceClient {
    /// Session type produced by [`connect`](Self::connect).
    type Session: DeviceSession;

    /// Opens a session to the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be reached or rejects the
    /// session.
    async fn connect(&self) -> Result<Self::Session, Error>;
}

/// An open connection to the device.
///
/// Callers should finish with [`close`](Self::close). Implementations must
/// also release their resources when dropped without being closed.
#[allow(async_fn_in_trait)]
pub trait DeviceSession {
    /// Reads the charger status record.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an undecodable response.
    async fn charger_info(&mut self) -> Result<ChargerInfo, Error>;

    /// Reads the status records of all inverter modules, in module order.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an undecodable response.
    async fn inverter_info(&mut self) -> Result<Vec<InverterInfo>, Error>;

    /// Releases the session.
    async fn close(self)
    where
        Self: Sized;
}
