//! Date expression recognition for Portuguese text
//!
//! Resolves phrases like "amanhã", "hoje", "na sexta", "dia 15" or "15/11"
//! to a concrete calendar date relative to an injected "today". Recognizers
//! run in a fixed order and the first match wins; anything unrecognized,
//! including calendar-invalid dates like "31/02", quietly resolves to today.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Weekday names as written in scheduling messages, with and without accents.
/// A leading preposition ("na sexta", "próxima segunda") is irrelevant to the
/// match, so a bare "sexta às 15h" resolves the same way.
static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(segunda|ter[çc]a|quarta|quinta|sexta|s[áa]bado|domingo)\b").unwrap()
});

/// "dia 15" style day-of-current-month mentions.
static DAY_OF_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bdia\s+(\d{1,2})\b").unwrap());

/// Numeric "D/M" or "D/M/Y" dates, day first as written in Brazil.
static SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?\b").unwrap());

/// Outcome of a date parse: the day the user is talking about plus whether
/// they literally said "tomorrow", which changes the default hour range and
/// the fallback windows downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDate {
    pub base_date: NaiveDate,
    pub mentions_tomorrow: bool,
}

impl ParsedDate {
    fn on(base_date: NaiveDate) -> Self {
        Self { base_date, mentions_tomorrow: false }
    }
}

/// Extract the base date a message refers to. Total: any text yields a date.
pub fn parse(text: &str, today: NaiveDate) -> ParsedDate {
    let t = text.to_lowercase();

    // "amanhã" anywhere wins over every other mention and short-circuits.
    if t.contains("amanhã") || t.contains("amanha") {
        debug!("date expression: tomorrow");
        return ParsedDate { base_date: today + Duration::days(1), mentions_tomorrow: true };
    }

    if t.contains("hoje") {
        debug!("date expression: today");
        return ParsedDate::on(today);
    }

    if let Some(weekday) = WEEKDAY.captures(&t).and_then(|c| weekday_from_name(&c[1])) {
        let resolved = next_weekday(today, weekday, t.contains("hoje"));
        debug!("date expression: weekday {:?} -> {}", weekday, resolved);
        return ParsedDate::on(resolved);
    }

    if let Some(caps) = DAY_OF_MONTH.captures(&t) {
        if let Some(date) = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .and_then(|day| NaiveDate::from_ymd_opt(today.year(), today.month(), day))
        {
            debug!("date expression: day of current month -> {}", date);
            return ParsedDate::on(date);
        }
        // Day does not exist in the current month: fall through.
    }

    if let Some(caps) = SLASH_DATE.captures(&t) {
        let day = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
        let month = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
        let year = match caps.get(3) {
            Some(m) => m.as_str().parse::<i32>().ok().map(|y| if y < 100 { y + 2000 } else { y }),
            None => Some(today.year()),
        };
        if let (Some(day), Some(month), Some(year)) = (day, month, year) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                debug!("date expression: explicit date -> {}", date);
                return ParsedDate::on(date);
            }
        }
        // Invalid calendar date: fall through to the default.
    }

    ParsedDate::on(today)
}

/// Next occurrence of `target` strictly after `from`, unless `include_today`
/// allows `from` itself to count when the weekdays line up.
pub fn next_weekday(from: NaiveDate, target: Weekday, include_today: bool) -> NaiveDate {
    let current = from.weekday().num_days_from_monday() as i64;
    let wanted = target.num_days_from_monday() as i64;
    let mut delta = (wanted - current).rem_euclid(7);
    if delta == 0 && !include_today {
        delta = 7;
    }
    from + Duration::days(delta)
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "segunda" => Some(Weekday::Mon),
        "terça" | "terca" => Some(Weekday::Tue),
        "quarta" => Some(Weekday::Wed),
        "quinta" => Some(Weekday::Thu),
        "sexta" => Some(Weekday::Fri),
        "sábado" | "sabado" => Some(Weekday::Sat),
        "domingo" => Some(Weekday::Sun),
        _ => None,
    }
}
