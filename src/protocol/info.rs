// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status records returned by the device.

use serde::Deserialize;

use crate::error::ParseError;
use crate::types::{InverterStates, StateCode};

/// Charger status record from `/api/v1/chargerinfo`.
///
/// Only the `state` field is required; everything else the device sends is
/// ignored.
///
/// # Examples
///
/// ```
/// use fcsp_monitor::protocol::ChargerInfo;
///
/// let info = ChargerInfo::from_json(r#"{"state":"CS02","firmware":"4.1"}"#).unwrap();
/// assert_eq!(info.state(), "CS02");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargerInfo {
    state: StateCode,
}

impl ChargerInfo {
    /// Creates a record holding `state`.
    #[must_use]
    pub fn new(state: impl Into<StateCode>) -> Self {
        Self {
            state: state.into(),
        }
    }

    /// Decodes a charger record from a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] for malformed JSON and
    /// [`ParseError::MissingField`] when `state` is absent or null.
    pub fn from_json(body: &str) -> Result<Self, ParseError> {
        let raw: RawRecord = serde_json::from_str(body)?;
        raw.state
            .map(|state| Self { state })
            .ok_or_else(|| ParseError::MissingField("state".to_string()))
    }

    /// Returns the charger state code.
    #[must_use]
    pub fn state(&self) -> &StateCode {
        &self.state
    }
}

/// Status record of one inverter module from `/api/v1/inverterinfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InverterInfo {
    state: StateCode,
}

impl InverterInfo {
    /// Creates a record holding `state`.
    #[must_use]
    pub fn new(state: impl Into<StateCode>) -> Self {
        Self {
            state: state.into(),
        }
    }

    /// Decodes the inverter list from a JSON array body.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] when the body is not an array of objects
    /// and [`ParseError::MissingField`] naming the first entry without a
    /// `state`.
    pub fn list_from_json(body: &str) -> Result<Vec<Self>, ParseError> {
        let raw: Vec<RawRecord> = serde_json::from_str(body)?;
        raw.into_iter()
            .enumerate()
            .map(|(index, record)| {
                record
                    .state
                    .map(|state| Self { state })
                    .ok_or_else(|| ParseError::MissingField(format!("[{index}].state")))
            })
            .collect()
    }

    /// Returns the inverter state code.
    #[must_use]
    pub fn state(&self) -> &StateCode {
        &self.state
    }
}

/// Collects the state codes of an inverter list, preserving order.
#[must_use]
pub fn inverter_states(infos: &[InverterInfo]) -> InverterStates {
    infos.iter().map(|info| info.state().clone()).collect()
}

#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    state: Option<StateCode>,
}
