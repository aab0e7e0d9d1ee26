//! Candidate slots and the operations that narrow them down
//!
//! A [`Slot`] is owned by the external availability source; this engine only
//! reads it. Timestamps arrive as ISO-8601 strings, usually UTC with a "Z"
//! suffix, but offset-free wall-clock strings also occur and are taken to be
//! in the deployment zone.

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::clock::local_datetime;

mod filter;
mod rank;

pub use filter::*;
pub use rank::*;

/// A bookable interval as offered by the availability source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    pub start: String,
    pub end: String,
}

/// Start of a slot as an instant in `zone`, or `None` when the timestamp is
/// not something we can read.
pub fn slot_start_local(slot: &Slot, zone: Tz) -> Option<DateTime<Tz>> {
    let parsed = parse_instant(&slot.start, zone);
    if parsed.is_none() {
        debug!("slot {} has unreadable start '{}'", slot.id, slot.start);
    }
    parsed
}

fn parse_instant(raw: &str, zone: Tz) -> Option<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&zone));
    }
    // No offset: interpret as wall-clock time in the deployment zone.
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Some(local_datetime(zone, naive.date(), naive.time()))
}
