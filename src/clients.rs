//! Client subscription bookkeeping.
//!
//! `daysLeft` is never stored. It is derived from the start date and the
//! subscription length each time clients are read, and a client whose
//! subscription has run out is marked inactive.

use crate::models::{Client, ClientView};
use chrono::{DateTime, Months, Utc};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days remaining until `start + duration months`, rounded up and
/// floored at zero. `None` when either input is missing.
pub fn days_left(client: &Client, now: DateTime<Utc>) -> Option<i64> {
    let start = client.start_date?.and_hms_opt(0, 0, 0)?.and_utc();
    let end = start.checked_add_months(Months::new(client.duration?))?;

    let remaining_ms = (end - now).num_milliseconds();
    if remaining_ms <= 0 {
        return Some(0);
    }

    Some((remaining_ms + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY)
}

/// Recompute derived fields for every client, deactivating expired ones.
pub fn refresh(clients: &mut [Client], now: DateTime<Utc>) -> Vec<ClientView> {
    clients
        .iter_mut()
        .map(|client| {
            let days_left = days_left(client, now);
            if days_left == Some(0) {
                client.active = false;
            }
            ClientView {
                client: client.clone(),
                days_left,
            }
        })
        .collect()
}
