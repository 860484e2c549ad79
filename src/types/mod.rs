// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for device state.
//!
//! - [`StateCode`] - Opaque charger operating-mode code
//! - [`InverterStates`] - Ordered codes of the attached inverter modules

mod state;

pub use state::{InverterStates, StateCode};
