// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Console text produced by the monitor.

use std::time::Duration;

use chrono::NaiveDateTime;

use crate::catalog::StateCatalog;
use crate::types::StateCode;

use super::Snapshot;

/// Timestamp layout used in change reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats a change between two successive snapshots.
///
/// The device line is always present; when the charger state did not move
/// it is marked `(unchanged)`. The inverter line only appears when the
/// inverter lists differ.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use fcsp_monitor::catalog::StateCatalog;
/// use fcsp_monitor::monitor::{Snapshot, format_change};
///
/// let at = NaiveDate::from_ymd_opt(2025, 6, 1)
///     .unwrap()
///     .and_hms_opt(18, 30, 0)
///     .unwrap();
/// let old = Snapshot::new("CS00", &[]);
/// let new = Snapshot::new("CS02", &["charging"]);
///
/// let report = format_change(&StateCatalog::builtin(), at, &old, &new);
/// assert!(report.contains("[2025-06-01 18:30:00]"));
/// assert!(report.contains("CS00 (Available) → 🔋 CS02 (Charging)"));
/// assert!(report.contains(r#"Inverters: [] → ["charging"]"#));
/// ```
#[must_use]
pub fn format_change(
    catalog: &StateCatalog,
    at: NaiveDateTime,
    old: &Snapshot,
    new: &Snapshot,
) -> String {
    let mut lines = vec![
        format!("🔔 [{}] STATE CHANGE DETECTED!", at.format(TIMESTAMP_FORMAT)),
        device_line(catalog, &old.state, &new.state),
    ];

    if old.inverters != new.inverters {
        lines.push(format!("   Inverters: {} → {}", old.inverters, new.inverters));
    }

    lines.join("\n")
}

fn device_line(catalog: &StateCatalog, old: &StateCode, new: &StateCode) -> String {
    let new_info = catalog.describe(new);
    if old == new {
        return format!(
            "   Device: {} {new} ({}) (unchanged)",
            new_info.icon(),
            new_info.name()
        );
    }

    let old_info = catalog.describe(old);
    format!(
        "   Device: {} {old} ({}) → {} {new} ({})",
        old_info.icon(),
        old_info.name(),
        new_info.icon(),
        new_info.name()
    )
}

/// Startup banner printed before the initial fetch.
#[must_use]
pub fn banner(poll_interval: Duration) -> String {
    [
        "🔌 FCSP State Monitor".to_string(),
        format!("📡 Polling every {} seconds", poll_interval.as_secs()),
        "🎯 Press Ctrl+C to stop".to_string(),
        "=".repeat(50),
    ]
    .join("\n")
}

/// Line announcing the state found at startup.
#[must_use]
pub fn initial_state(catalog: &StateCatalog, snapshot: &Snapshot) -> String {
    let info = catalog.describe(&snapshot.state);
    format!(
        "📊 Initial state: {} {} - {}",
        info.icon(),
        snapshot.state,
        info.name()
    )
}
