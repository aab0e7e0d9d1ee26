//! Wall-clock and timezone plumbing.
//!
//! The whole deployment runs against one fixed IANA timezone (the zone the
//! assistant's customers live in, `America/Sao_Paulo` by default). Every
//! parsing component receives a [`Clock`] instead of reading ambient time so
//! tests can pin "now" and stay deterministic.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Source of "now" in the configured local zone.
pub trait Clock: Send + Sync {
    /// Current instant expressed in the deployment zone.
    fn now(&self) -> DateTime<Tz>;

    /// The fixed deployment zone.
    fn zone(&self) -> Tz;

    /// Today's calendar date in the deployment zone.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Convert any instant into the deployment zone.
    fn to_local(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.zone())
    }
}

/// Production clock: system time viewed in the configured zone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    zone: Tz,
}

impl SystemClock {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.zone)
    }

    fn zone(&self) -> Tz {
        self.zone
    }
}

/// Clock pinned to a single instant, for deterministic tests and for
/// reproducing field reports with `plan_probe --now`.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Tz>,
}

impl FixedClock {
    pub fn new(now: DateTime<Tz>) -> Self {
        Self { now }
    }

    /// Pin the clock to a local wall-clock date and time in `zone`.
    pub fn from_local(zone: Tz, date: NaiveDate, time: NaiveTime) -> Self {
        Self { now: local_datetime(zone, date, time) }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Tz> {
        self.now
    }

    fn zone(&self) -> Tz {
        self.now.timezone()
    }
}

/// Resolve a local wall-clock datetime in `zone` to a concrete instant.
///
/// Total by construction: an ambiguous local time (DST fall-back) resolves to
/// the earlier instant, and a nonexistent one (DST spring-forward gap) is
/// advanced an hour at a time until it lands on real wall-clock time.
pub fn local_datetime(zone: Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
    let mut naive = NaiveDateTime::new(date, time);
    for _ in 0..4 {
        match zone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => return dt,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => naive += Duration::hours(1),
        }
    }
    // Gaps longer than four hours do not occur in the tz database; map the
    // remaining naive value through UTC so the function still returns.
    Utc.from_utc_datetime(&naive).with_timezone(&zone)
}

/// Local midnight of `date` as an instant in `zone`.
pub fn local_midnight(zone: Tz, date: NaiveDate) -> DateTime<Tz> {
    local_datetime(zone, date, NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::America::Sao_Paulo;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fixed_clock_reports_pinned_instant() {
        let clock = FixedClock::from_local(
            Sao_Paulo,
            date(2025, 11, 10),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        );
        assert_eq!(clock.today(), date(2025, 11, 10));
        assert_eq!(clock.now().hour(), 9);
        assert_eq!(clock.zone(), Sao_Paulo);
    }

    #[test]
    fn to_local_applies_fixed_offset() {
        let clock = FixedClock::from_local(Sao_Paulo, date(2025, 11, 10), NaiveTime::MIN);
        // São Paulo is UTC-3 year-round since 2019.
        let instant = Utc.with_ymd_and_hms(2025, 11, 10, 23, 0, 0).unwrap();
        let local = clock.to_local(instant);
        assert_eq!(local.hour(), 20);
        assert_eq!(local.date_naive(), date(2025, 11, 10));
    }

    #[test]
    fn local_midnight_is_start_of_day() {
        let midnight = local_midnight(Sao_Paulo, date(2025, 11, 10));
        assert_eq!(midnight.hour(), 0);
        assert_eq!(midnight.with_timezone(&Utc).hour(), 3);
    }

    #[test]
    fn dst_gap_advances_to_first_existing_hour() {
        // Brazilian DST began 2017-10-15 at midnight: 00:00 never happened.
        let resolved = local_midnight(Sao_Paulo, date(2017, 10, 15));
        assert_eq!(resolved.hour(), 1);
        assert_eq!(resolved.date_naive(), date(2017, 10, 15));
    }

    #[test]
    fn dst_overlap_picks_earlier_instant() {
        // DST ended the night of 2018-02-17: 23:00-23:59 happened twice.
        let first = local_datetime(
            Sao_Paulo,
            date(2018, 2, 17),
            NaiveTime::from_hms_opt(23, 30, 0).unwrap(),
        );
        // One absolute hour later the wall clock shows 23:30 again, so the
        // resolved instant was the earlier of the two.
        let one_hour_on = first + Duration::hours(1);
        assert_eq!(one_hour_on.naive_local().time(), first.naive_local().time());
    }
}
