// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State code types reported by the charger.

use std::fmt;

use serde::Deserialize;

/// An opaque operating-mode code reported by the device, such as `CS00`.
///
/// Codes are compared verbatim. Their meaning lives in the
/// [`StateCatalog`](crate::catalog::StateCatalog); codes the catalog does not
/// know are still valid values.
///
/// # Examples
///
/// ```
/// use fcsp_monitor::types::StateCode;
///
/// let code = StateCode::new("CS02");
/// assert_eq!(code.as_str(), "CS02");
/// assert_eq!(code, "CS02");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct StateCode(String);

impl StateCode {
    /// Creates a state code from any string.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the raw code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StateCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StateCode {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for StateCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StateCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Ordered state codes of the inverter modules attached to the device.
///
/// The list is treated as a single value: two lists are equal only when
/// they have the same length and the same codes in the same order.
///
/// # Examples
///
/// ```
/// use fcsp_monitor::types::InverterStates;
///
/// let none = InverterStates::default();
/// let one: InverterStates = ["charging"].into_iter().collect();
///
/// assert_ne!(none, one);
/// assert_eq!(none.to_string(), "[]");
/// assert_eq!(one.to_string(), r#"["charging"]"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InverterStates(Vec<StateCode>);

impl InverterStates {
    /// Returns the number of inverter modules reported.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no inverter module was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for InverterStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, code) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}", code.as_str())?;
        }
        f.write_str("]")
    }
}

impl<S: Into<StateCode>> FromIterator<S> for InverterStates {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
