//! Target-hour proximity ranking

use std::cmp::Ordering;

use chrono::Timelike;
use chrono_tz::Tz;

use super::{slot_start_local, Slot};

/// Order slots by closeness to `target_hour` in local time.
///
/// The key is `|hour - target| + minute/60`: whole-hour distance dominates,
/// minutes break ties inside the same hour distance. The sort is stable, so
/// slots with equal keys keep the order the provider returned them in. With
/// no target hour, or nothing to sort, the input comes back untouched.
pub fn rank(slots: Vec<Slot>, target_hour: Option<u32>, zone: Tz) -> Vec<Slot> {
    let target = match target_hour {
        Some(hour) => hour,
        None => return slots,
    };
    if slots.is_empty() {
        return slots;
    }

    let mut keyed: Vec<(f64, Slot)> =
        slots.into_iter().map(|slot| (proximity(&slot, target, zone), slot)).collect();
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    keyed.into_iter().map(|(_, slot)| slot).collect()
}

fn proximity(slot: &Slot, target: u32, zone: Tz) -> f64 {
    match slot_start_local(slot, zone) {
        Some(start) => {
            let hour_gap = (f64::from(start.hour()) - f64::from(target)).abs();
            hour_gap + f64::from(start.minute()) / 60.0
        }
        // Unreadable timestamps sort last but are not removed here.
        None => f64::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Sao_Paulo;
    use pretty_assertions::assert_eq;

    fn slot(id: &str, start: &str) -> Slot {
        Slot { id: id.into(), start: start.into(), end: start.into() }
    }

    fn ids(slots: &[Slot]) -> Vec<&str> {
        slots.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn no_target_returns_input_unchanged() {
        let slots = vec![
            slot("b", "2025-11-10T20:00:00Z"),
            slot("a", "2025-11-10T12:00:00Z"),
        ];
        assert_eq!(rank(slots.clone(), None, Sao_Paulo), slots);
    }

    #[test]
    fn minutes_break_ties_within_the_same_hour_distance() {
        // Local times: 15:10 (distance 0.17) vs 14:30 (distance 1.5).
        let slots = vec![
            slot("fourteen-thirty", "2025-11-10T17:30:00Z"),
            slot("fifteen-ten", "2025-11-10T18:10:00Z"),
        ];
        let ranked = rank(slots, Some(15), Sao_Paulo);
        assert_eq!(ids(&ranked), vec!["fifteen-ten", "fourteen-thirty"]);
    }

    #[test]
    fn closest_hour_wins_across_a_morning() {
        // Local: 09:00, 10:00, 11:00, 12:00; target 10.
        let slots = vec![
            slot("nine", "2025-11-10T12:00:00Z"),
            slot("ten", "2025-11-10T13:00:00Z"),
            slot("eleven", "2025-11-10T14:00:00Z"),
            slot("twelve", "2025-11-10T15:00:00Z"),
        ];
        let ranked = rank(slots, Some(10), Sao_Paulo);
        assert_eq!(ids(&ranked), vec!["ten", "nine", "eleven", "twelve"]);
    }

    #[test]
    fn equal_keys_preserve_provider_order() {
        // Both at local 14:00, one UTC-suffixed and one offset-explicit.
        let slots = vec![
            slot("first", "2025-11-10T17:00:00Z"),
            slot("second", "2025-11-10T14:00:00-03:00"),
        ];
        let ranked = rank(slots, Some(14), Sao_Paulo);
        assert_eq!(ids(&ranked), vec!["first", "second"]);
    }

    #[test]
    fn unreadable_timestamps_sink_to_the_end() {
        let slots = vec![
            slot("mystery", "not-a-time"),
            slot("good", "2025-11-10T18:00:00Z"),
        ];
        let ranked = rank(slots, Some(15), Sao_Paulo);
        assert_eq!(ids(&ranked), vec!["good", "mystery"]);
    }
}
