//! Window and hour filters over candidate slots

use chrono::{Timelike, Utc};
use chrono_tz::Tz;

use super::{slot_start_local, Slot};
use crate::planner::TimeWindow;

/// Keep only slots starting inside `[window.start, window.end)`.
///
/// This is a hard correctness boundary: a slot whose timestamp cannot be
/// parsed is dropped, because it cannot be proven to lie inside the window.
pub fn filter_by_window(mut slots: Vec<Slot>, window: &TimeWindow, zone: Tz) -> Vec<Slot> {
    slots.retain(|slot| match slot_start_local(slot, zone) {
        Some(start) => window.contains(start.with_timezone(&Utc)),
        None => false,
    });
    slots
}

/// Keep only slots whose local hour-of-day is at or after `min_hour`.
///
/// This is a soft preference refinement, so the failure direction flips: a
/// slot whose timestamp cannot be parsed stays in.
pub fn clamp_after_hour(mut slots: Vec<Slot>, min_hour: u32, zone: Tz) -> Vec<Slot> {
    slots.retain(|slot| match slot_start_local(slot, zone) {
        Some(start) => start.hour() >= min_hour,
        None => true,
    });
    slots
}
