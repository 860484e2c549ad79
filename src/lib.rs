// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `fcsp_monitor` - Console state monitor for Ford Charge Station Pro devices.
//!
//! The monitor polls the charger's local REST API at a fixed interval and
//! prints a report only when the charger state or the inverter states change.
//!
//! # Components
//!
//! - [`StateMonitor`]: poll loop, change detection and reporting
//! - [`StateCatalog`]: descriptions of the known charger state codes
//! - [`HttpDevice`]: device client over HTTP(S)
//! - [`Shutdown`]: cooperative stop flag driven by SIGINT/SIGTERM
//!
//! # Quick Start
//!
//! ```no_run
//! use fcsp_monitor::{HttpConfig, MonitorConfig, StateMonitor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> fcsp_monitor::Result<()> {
//!     let device = HttpConfig::new("192.168.1.197")
//!         .with_https()
//!         .with_invalid_certs_accepted()
//!         .into_device()?;
//!
//!     let mut monitor =
//!         StateMonitor::initialize(device, MonitorConfig::from_secs(30), std::io::stdout())?;
//!     monitor.run().await
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod monitor;
pub mod protocol;
pub mod types;

pub use catalog::{Descriptor, StateCatalog};
pub use error::{ConfigError, Error, ParseError, ProtocolError, Result};
pub use monitor::{MonitorConfig, PollOutcome, Shutdown, Snapshot, StateMonitor};
pub use protocol::{DeviceClient, DeviceSession, HttpConfig, HttpDevice};
pub use types::{InverterStates, StateCode};
