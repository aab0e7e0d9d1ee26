//! Hour preference recognition for Portuguese text
//!
//! Turns "de manhã", "a partir das 10", "entre 14 até 16" or "às 15h" into an
//! hour range, an optional target hour and a mode describing how the range
//! was derived. Date mentions are stripped first so "dia 15 às 10h" prefers
//! the 10, not the 15. Recognizers run in a fixed order, first match wins.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// "dia 15" mentions, removed before any hour matching.
static DAY_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bdia\s+\d{1,2}\b").unwrap());

/// "15/11" / "15/11/2025" mentions, removed before any hour matching.
static SLASH_MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}/\d{1,2}(?:/\d{2,4})?\b").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// "a partir das 10" / "após as 18" / "depois das 14".
static AFTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(a partir|ap[óo]s|depois)\s+(?:d?[àa]s?\s*)?(\d{1,2})h?").unwrap());

/// "próximo das 15" / "perto das 16" / "às 15h".
static AROUND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(pr[óo]ximo|perto|[àa]s?)\s*(\d{1,2})h?").unwrap());

/// Bare hour tokens, "15" or "15h".
static HOUR_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2})h?\b").unwrap());

/// The word "até", which turns a pair of hours into an explicit range.
/// Word-bounded so it does not fire inside "atender" and the like.
static UNTIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bat[ée]\b").unwrap());

const MORNING_WORDS: [&str; 2] = ["manhã", "manha"];
const AFTERNOON_WORDS: [&str; 3] = ["tarde", "depois do almoço", "depois do almoco"];

/// How an hour preference was expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceMode {
    /// "entre X até Y": explicit bounds.
    Range,
    /// "a partir das X": open-ended from X, target stays at X.
    After,
    /// "às X" and friends: a two-hour halo around X.
    Around,
    /// "de manhã" / "à tarde": a named block of the day.
    Period,
    /// Nothing recognized; the planner applies its defaults.
    None,
}

/// Hour range plus optional target hour extracted from a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePreference {
    pub start_hour: Option<u32>,
    pub end_hour: Option<u32>,
    pub target_hour: Option<u32>,
    pub mode: PreferenceMode,
}

impl TimePreference {
    /// Normalized preference: hours clamped to 0-23, reversed bounds swapped,
    /// a zero-width range widened by one hour so the window stays non-empty.
    fn bounded(start: u32, end: u32, target: Option<u32>, mode: PreferenceMode) -> Self {
        let (mut start, mut end) = (start.min(23), end.min(23));
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }
        if start == end {
            if end < 23 {
                end += 1;
            } else {
                start -= 1;
            }
        }
        Self {
            start_hour: Some(start),
            end_hour: Some(end),
            target_hour: target.map(|h| h.min(23)),
            mode,
        }
    }

    fn unspecified() -> Self {
        Self { start_hour: None, end_hour: None, target_hour: None, mode: PreferenceMode::None }
    }

    /// Both bounds present, i.e. some hour intent was recognized.
    pub fn has_range(&self) -> bool {
        self.start_hour.is_some() && self.end_hour.is_some()
    }
}

/// Extract the hour preference from a message. Total: any text yields a
/// (possibly empty) preference.
pub fn parse(text: &str) -> TimePreference {
    let t = text.to_lowercase();
    let t = DAY_MENTION.replace_all(&t, " ");
    let t = SLASH_MENTION.replace_all(&t, " ");
    let t = WHITESPACE.replace_all(&t, " ");

    if MORNING_WORDS.iter().any(|w| t.contains(w)) {
        debug!("time preference: morning period");
        return TimePreference::bounded(8, 12, None, PreferenceMode::Period);
    }
    if AFTERNOON_WORDS.iter().any(|w| t.contains(w)) {
        debug!("time preference: afternoon period");
        return TimePreference::bounded(13, 18, None, PreferenceMode::Period);
    }

    if let Some(hour) = AFTER.captures(&t).and_then(|c| parse_hour(c.get(2))) {
        debug!("time preference: after {}", hour);
        return TimePreference::bounded(hour, 20, Some(hour), PreferenceMode::After);
    }

    if UNTIL.is_match(&t) {
        let hours = hour_tokens(&t);
        if hours.len() >= 2 {
            let (h1, h2) = (hours[0], hours[1]);
            debug!("time preference: range {}-{}", h1, h2);
            return TimePreference::bounded(
                h1.min(h2),
                h1.max(h2),
                Some((h1 + h2) / 2),
                PreferenceMode::Range,
            );
        }
    }

    if let Some(hour) = AROUND.captures(&t).and_then(|c| parse_hour(c.get(2))) {
        debug!("time preference: around {}", hour);
        return around(hour);
    }

    if let Some(&hour) = hour_tokens(&t).last() {
        debug!("time preference: bare hour {}", hour);
        return around(hour);
    }

    TimePreference::unspecified()
}

/// A two-hour halo on each side of `hour`, kept inside business bounds.
fn around(hour: u32) -> TimePreference {
    TimePreference::bounded(
        hour.saturating_sub(2).max(8),
        (hour + 2).min(20),
        Some(hour),
        PreferenceMode::Around,
    )
}

fn parse_hour(m: Option<regex::Match<'_>>) -> Option<u32> {
    m.and_then(|m| m.as_str().parse::<u32>().ok()).map(|h| h.min(23))
}

/// All bare hour tokens in order of appearance, clamped to 0-23.
fn hour_tokens(t: &str) -> Vec<u32> {
    HOUR_TOKEN
        .captures_iter(t)
        .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse::<u32>().ok()))
        .map(|h| h.min(23))
        .collect()
}
