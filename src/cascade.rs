//! Fallback cascade over availability queries
//!
//! Runs the plan's windows against the availability source in order of
//! decreasing strictness: primary window, planned fallbacks, then two rescue
//! strategies that keep only the date intent (the requested day with any
//! hour) or give up on intent entirely (the coming week). The first stage
//! with survivors wins; its slots are ranked by target-hour proximity and
//! capped. A source failure never aborts the cascade, it just counts as an
//! empty stage.

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::{debug, warn};

use crate::availability::AvailabilitySource;
use crate::clock::Clock;
use crate::parser::PreferenceMode;
use crate::planner::{Plan, TimeWindow};
use crate::slots::{clamp_after_hour, filter_by_window, rank, slot_start_local, Slot};

/// Upper bound on how many slots one reply may offer.
pub const MAX_OFFERED_SLOTS: usize = 5;

/// One cascade run over a borrowed source and clock.
pub struct SlotCascade<'a> {
    source: &'a dyn AvailabilitySource,
    clock: &'a dyn Clock,
}

impl<'a> SlotCascade<'a> {
    pub fn new(source: &'a dyn AvailabilitySource, clock: &'a dyn Clock) -> Self {
        Self { source, clock }
    }

    /// Resolve a plan to at most [`MAX_OFFERED_SLOTS`] slots. An empty result
    /// means every strategy came up dry; it is not an error.
    pub async fn resolve(&self, plan: &Plan) -> Vec<Slot> {
        let zone = self.clock.zone();

        let mut slots = self.windowed(plan, &plan.primary, zone).await;

        let mut i = 0;
        while slots.is_empty() && i < plan.fallbacks.len() {
            debug!("empty so far, trying fallback window {}", i);
            slots = self.windowed(plan, &plan.fallbacks[i], zone).await;
            i += 1;
        }

        if slots.is_empty() && plan.base_date != self.clock.today() {
            slots = self.requested_day(plan.base_date, zone).await;
        }
        if slots.is_empty() {
            slots = self.coming_week().await;
        }

        let mut offered = rank(slots, plan.target_hour, zone);
        offered.truncate(MAX_OFFERED_SLOTS);
        offered
    }

    /// Query one window, keep slots inside it, and for "after" requests also
    /// enforce the minimum hour. The hour clamp applies to every planned
    /// window including the whole-day fallback, but not to the rescue
    /// strategies below.
    // TODO: confirm with product whether "after" should keep clamping in the
    // rescue stages too
    async fn windowed(&self, plan: &Plan, window: &TimeWindow, zone: Tz) -> Vec<Slot> {
        let mut slots = filter_by_window(self.query(*window).await, window, zone);
        if plan.mode == PreferenceMode::After {
            if let Some(min_hour) = plan.target_hour {
                slots = clamp_after_hour(slots, min_hour, zone);
            }
        }
        slots
    }

    /// Any hour on the requested day, as long as the slot really falls on
    /// that local date. Earliest five survive.
    async fn requested_day(&self, date: NaiveDate, zone: Tz) -> Vec<Slot> {
        debug!("no slots in planned windows, retrying whole day {}", date);
        let mut slots = self.query(TimeWindow::whole_day(zone, date)).await;
        slots.retain(|slot| {
            slot_start_local(slot, zone).map_or(false, |start| start.date_naive() == date)
        });
        earliest(slots)
    }

    /// Last resort: seven days starting tomorrow UTC, earliest five first.
    async fn coming_week(&self) -> Vec<Slot> {
        let now_utc = self.clock.now().with_timezone(&Utc);
        let start_date = (now_utc + Duration::days(1)).date_naive();
        let start = Utc.from_utc_datetime(&start_date.and_time(NaiveTime::MIN));
        debug!("no slots on the requested day, retrying the week from {}", start);
        let slots = self.query(TimeWindow::new(start, start + Duration::days(7))).await;
        earliest(slots)
    }

    async fn query(&self, window: TimeWindow) -> Vec<Slot> {
        match self.source.get_slots(Some(window)).await {
            Ok(slots) => slots,
            Err(err) => {
                warn!("availability lookup failed, treating window as empty: {}", err);
                Vec::new()
            }
        }
    }
}

/// Chronologically earliest slots, capped at the offer limit before the
/// proximity ranking runs.
fn earliest(mut slots: Vec<Slot>) -> Vec<Slot> {
    slots.sort_by(|a, b| a.start.cmp(&b.start));
    slots.truncate(MAX_OFFERED_SLOTS);
    slots
}
