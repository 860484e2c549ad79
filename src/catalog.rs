// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Human-readable descriptions of charger state codes.
//!
//! The catalog is built once and only read afterwards. Lookups never fail:
//! a code the catalog does not know resolves to an `Unknown (<code>)`
//! descriptor.
//!
//! # Examples
//!
//! ```
//! use fcsp_monitor::catalog::StateCatalog;
//! use fcsp_monitor::types::StateCode;
//!
//! let catalog = StateCatalog::builtin();
//!
//! assert_eq!(catalog.describe(&StateCode::new("CS02")).name(), "Charging");
//! assert_eq!(catalog.describe(&StateCode::new("XX9")).name(), "Unknown (XX9)");
//! ```

use std::borrow::Cow;
use std::collections::HashMap;

use crate::types::StateCode;

/// Icon used for codes missing from the catalog.
pub const UNKNOWN_ICON: &str = "❓";

/// Display information for one state code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    name: Cow<'static, str>,
    description: Option<&'static str>,
    icon: &'static str,
}

impl Descriptor {
    /// Creates a descriptor for a known state.
    #[must_use]
    pub const fn new(name: &'static str, description: &'static str, icon: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            description: Some(description),
            icon,
        }
    }

    /// Creates the fallback descriptor for a code the catalog does not know.
    #[must_use]
    pub fn unknown(code: &StateCode) -> Self {
        Self {
            name: Cow::Owned(format!("Unknown ({code})")),
            description: None,
            icon: UNKNOWN_ICON,
        }
    }

    /// Returns the short display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the longer description, if the state is known.
    #[must_use]
    pub fn description(&self) -> Option<&'static str> {
        self.description
    }

    /// Returns the presentation icon.
    #[must_use]
    pub fn icon(&self) -> &'static str {
        self.icon
    }
}

/// Immutable mapping from state codes to descriptors.
#[derive(Debug, Clone, Default)]
pub struct StateCatalog {
    entries: HashMap<&'static str, Descriptor>,
}

impl StateCatalog {
    /// Builds the catalog of charger states observed on real devices.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_entries([
            (
                "CS00",
                Descriptor::new(
                    "Available",
                    "No vehicle connected - Ready for charging",
                    "🟢",
                ),
            ),
            (
                "CS01",
                Descriptor::new(
                    "Connected (Not Charging)",
                    "Vehicle connected but charging paused/stopped",
                    "🟡",
                ),
            ),
            (
                "CS02",
                Descriptor::new(
                    "Charging",
                    "Vehicle connected and actively charging",
                    "🔋",
                ),
            ),
            (
                "CS03",
                Descriptor::new("Error/Fault", "Possible error or fault condition", "🔴"),
            ),
        ])
    }

    /// Builds a catalog from explicit entries.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (&'static str, Descriptor)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Returns the descriptor registered for `code`, if any.
    #[must_use]
    pub fn get(&self, code: &StateCode) -> Option<&Descriptor> {
        self.entries.get(code.as_str())
    }

    /// Resolves `code` to a descriptor, falling back to `Unknown (<code>)`.
    #[must_use]
    pub fn describe(&self, code: &StateCode) -> Descriptor {
        self.get(code)
            .cloned()
            .unwrap_or_else(|| Descriptor::unknown(code))
    }

    /// Returns the number of known codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the catalog knows no codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
