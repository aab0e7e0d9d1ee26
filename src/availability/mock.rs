//! Deterministic mock availability
//!
//! Stands in for Cal.com during local runs and demos: a fixed grid of
//! half-hour slots starting at 12:00 UTC (09:00 in São Paulo) on the
//! requested day, or on tomorrow when no window is given. Slot ids embed the
//! start's unix timestamp so mock bookings can reconstruct the instant.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, TimeZone, Utc};

use super::{AvailabilityError, AvailabilitySource, Booking, BookingRequest};
use crate::planner::TimeWindow;
use crate::slots::Slot;

const SLOT_COUNT: usize = 16;
const SLOT_MINUTES: i64 = 30;

/// Availability source serving a synthetic slot grid.
#[derive(Debug, Default)]
pub struct MockSource;

impl MockSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AvailabilitySource for MockSource {
    async fn get_slots(
        &self,
        window: Option<TimeWindow>,
    ) -> Result<Vec<Slot>, AvailabilityError> {
        Ok(mock_slots(window, Utc::now()))
    }

    async fn book_slot(&self, request: &BookingRequest) -> Result<Booking, AvailabilityError> {
        Ok(mock_booking(&request.slot_id, Utc::now()))
    }

    async fn cancel_booking(
        &self,
        _booking_id: &str,
        _reason: Option<&str>,
    ) -> Result<(), AvailabilityError> {
        Ok(())
    }
}

/// The slot grid for `window`, anchored on the window's start date. Windows
/// that already started in the past re-anchor on tomorrow, like a real
/// provider that never offers past slots.
fn mock_slots(window: Option<TimeWindow>, now: DateTime<Utc>) -> Vec<Slot> {
    let mut base_date = match window {
        Some(w) => w.start_utc.date_naive(),
        None => (now + Duration::days(1)).date_naive(),
    };
    if let Some(w) = window {
        if w.start_utc < now {
            base_date = (now + Duration::days(1)).date_naive();
        }
    }

    let base = Utc.from_utc_datetime(&base_date.and_time(NaiveTime::MIN)) + Duration::hours(12);
    let grid: Vec<(DateTime<Utc>, Slot)> = (0..SLOT_COUNT)
        .map(|i| {
            let start = base + Duration::minutes(SLOT_MINUTES * i as i64);
            let end = start + Duration::minutes(SLOT_MINUTES);
            let slot = Slot {
                id: format!("mock-{}", start.timestamp()),
                start: iso(start),
                end: iso(end),
            };
            (start, slot)
        })
        .collect();

    if let Some(w) = window {
        // Inclusive on both ends on purpose: the engine applies its own
        // half-open filter on top.
        let matching: Vec<Slot> = grid
            .iter()
            .filter(|(start, _)| w.start_utc <= *start && *start <= w.end_utc)
            .map(|(_, slot)| slot.clone())
            .collect();
        if !matching.is_empty() {
            return capped(matching);
        }
        let same_day: Vec<Slot> = grid
            .into_iter()
            .filter(|(start, _)| start.date_naive() == base_date)
            .map(|(_, slot)| slot)
            .collect();
        return capped(same_day);
    }

    capped(grid.into_iter().map(|(_, slot)| slot).collect())
}

/// Fabricate a booking for a mock slot id, recovering the start instant from
/// the trailing unix timestamp when possible.
fn mock_booking(slot_id: &str, now: DateTime<Utc>) -> Booking {
    let start = slot_id
        .rsplit('-')
        .next()
        .and_then(|ts| ts.parse::<i64>().ok())
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .unwrap_or_else(|| now + Duration::days(1) + Duration::hours(12));

    Booking {
        booking_id: Some(format!("mock-bk-{}", start.timestamp())),
        meeting_url: format!("https://meet.example/{}", slot_id),
        start: iso(start),
    }
}

fn capped(mut slots: Vec<Slot>) -> Vec<Slot> {
    slots.truncate(SLOT_COUNT);
    slots
}

fn iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, false)
}
