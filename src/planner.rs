//! Query window planning
//!
//! Combines the parsed date and hour preference into one primary UTC window
//! plus an ordered list of fallback windows the cascade will try when the
//! primary turns up empty. All wall-clock arithmetic happens in the
//! deployment zone and only the final bounds are carried as UTC instants.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use log::debug;

use crate::clock::{local_datetime, local_midnight, Clock};
use crate::parser::{date_expr, time_pref, ParsedDate, PreferenceMode, TimePreference};

/// Hour range assumed when the message names no hours at all.
pub const DEFAULT_HOURS: (u32, u32) = (9, 18);

/// Narrower afternoon assumption when the user explicitly said "tomorrow"
/// but gave no hours.
pub const TOMORROW_DEFAULT_HOURS: (u32, u32) = (13, 18);

/// Half-open UTC interval `[start, end)` used to query and filter slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window, swapping reversed bounds and widening a collapsed pair
    /// by one second so that `start_utc < end_utc` always holds.
    pub fn new(start_utc: DateTime<Utc>, end_utc: DateTime<Utc>) -> Self {
        let (start_utc, mut end_utc) =
            if start_utc <= end_utc { (start_utc, end_utc) } else { (end_utc, start_utc) };
        if start_utc == end_utc {
            end_utc += Duration::seconds(1);
        }
        Self { start_utc, end_utc }
    }

    /// `[start_hour:00, end_hour:00)` on `date`, local to `zone`.
    pub fn local_hours(zone: Tz, date: NaiveDate, start_hour: u32, end_hour: u32) -> Self {
        Self::new(
            local_datetime(zone, date, hms(start_hour, 0, 0)).with_timezone(&Utc),
            local_datetime(zone, date, hms(end_hour, 0, 0)).with_timezone(&Utc),
        )
    }

    /// `[00:00:00, 23:59:59)` on `date`, local to `zone`.
    pub fn whole_day(zone: Tz, date: NaiveDate) -> Self {
        Self::new(
            local_midnight(zone, date).with_timezone(&Utc),
            local_datetime(zone, date, hms(23, 59, 59)).with_timezone(&Utc),
        )
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start_utc <= instant && instant < self.end_utc
    }
}

fn hms(hour: u32, minute: u32, second: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour.min(23), minute, second).unwrap_or(NaiveTime::MIN)
}

/// Everything the cascade needs to resolve one scheduling request.
#[derive(Debug, Clone)]
pub struct Plan {
    pub primary: TimeWindow,
    pub fallbacks: Vec<TimeWindow>,
    pub target_hour: Option<u32>,
    pub mode: PreferenceMode,
    pub base_date: NaiveDate,
    pub mentions_tomorrow: bool,
}

/// Parse `text` and lay out the query windows for it.
pub fn plan(text: &str, clock: &dyn Clock) -> Plan {
    let parsed = date_expr::parse(text, clock.today());
    let prefs = time_pref::parse(text);
    build(parsed, prefs, clock.zone())
}

/// Assemble a plan from already-parsed components.
///
/// Fallback order matters: first the same hour range one day later (skipped
/// when the user already asked for tomorrow), then a whole-day window that
/// keeps the date intent but abandons the hour intent. The whole-day entry
/// is always present and always last.
pub fn build(parsed: ParsedDate, prefs: TimePreference, zone: Tz) -> Plan {
    let (start_hour, end_hour) = match (prefs.start_hour, prefs.end_hour) {
        (Some(s), Some(e)) => (s, e),
        _ if parsed.mentions_tomorrow => TOMORROW_DEFAULT_HOURS,
        _ => DEFAULT_HOURS,
    };

    let primary = TimeWindow::local_hours(zone, parsed.base_date, start_hour, end_hour);
    let next_day = parsed.base_date + Duration::days(1);

    let mut fallbacks = Vec::with_capacity(2);
    if !parsed.mentions_tomorrow {
        fallbacks.push(TimeWindow::local_hours(zone, next_day, start_hour, end_hour));
    }
    let whole_day_date = if parsed.mentions_tomorrow { parsed.base_date } else { next_day };
    fallbacks.push(TimeWindow::whole_day(zone, whole_day_date));

    debug!(
        "planned {} -> {} with {} fallback(s), mode {:?}, target {:?}",
        primary.start_utc,
        primary.end_utc,
        fallbacks.len(),
        prefs.mode,
        prefs.target_hour
    );

    Plan {
        primary,
        fallbacks,
        target_hour: prefs.target_hour,
        mode: prefs.mode,
        base_date: parsed.base_date,
        mentions_tomorrow: parsed.mentions_tomorrow,
    }
}
