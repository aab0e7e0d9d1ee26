use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::America::Sao_Paulo;
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use agendai::{
    AvailabilityError, AvailabilitySource, Booking, BookingRequest, FixedClock, PreferenceMode,
    Scheduler, Slot, TimeWindow, MAX_OFFERED_SLOTS,
};

/// Replays canned slot responses in order; once the script runs out every
/// further query gets an empty list.
struct CannedSource {
    responses: Mutex<VecDeque<Result<Vec<Slot>, AvailabilityError>>>,
    queries: Arc<Mutex<Vec<TimeWindow>>>,
}

#[async_trait]
impl AvailabilitySource for CannedSource {
    async fn get_slots(&self, window: Option<TimeWindow>) -> Result<Vec<Slot>, AvailabilityError> {
        if let Some(window) = window {
            self.queries.lock().unwrap().push(window);
        }
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn book_slot(&self, request: &BookingRequest) -> Result<Booking, AvailabilityError> {
        Ok(Booking {
            booking_id: Some("bk-1".into()),
            meeting_url: format!("https://meet.test/{}", request.slot_id),
            start: request.start.clone().unwrap_or_default(),
        })
    }

    async fn cancel_booking(
        &self,
        _booking_id: &str,
        _reason: Option<&str>,
    ) -> Result<(), AvailabilityError> {
        Ok(())
    }
}

/// Scheduler pinned to Monday 2025-11-10 09:00 in São Paulo, plus a handle to
/// the windows the cascade ends up querying.
fn scheduler_at_monday(
    responses: Vec<Result<Vec<Slot>, AvailabilityError>>,
) -> (Scheduler, Arc<Mutex<Vec<TimeWindow>>>) {
    let queries = Arc::new(Mutex::new(Vec::new()));
    let source = CannedSource {
        responses: Mutex::new(responses.into()),
        queries: Arc::clone(&queries),
    };
    let clock = FixedClock::from_local(
        Sao_Paulo,
        NaiveDate::from_ymd_opt(2025, 11, 10).unwrap(),
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    );
    (Scheduler::new(Box::new(source), Box::new(clock)), queries)
}

fn slot(id: &str, start: &str) -> Slot {
    Slot { id: id.into(), start: start.into(), end: start.into() }
}

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

#[test]
fn tomorrow_morning_plans_the_morning_window() {
    let (scheduler, _) = scheduler_at_monday(Vec::new());
    let plan = scheduler.plan("amanhã de manhã");

    assert!(plan.mentions_tomorrow);
    assert_eq!(plan.base_date, NaiveDate::from_ymd_opt(2025, 11, 11).unwrap());
    assert_eq!(plan.mode, PreferenceMode::Period);
    assert_eq!(plan.target_hour, None);
    // Morning period 08-12 BRT on Tuesday is 11:00-15:00 UTC.
    assert_eq!(plan.primary.start_utc, utc(2025, 11, 11, 11, 0, 0));
    assert_eq!(plan.primary.end_utc, utc(2025, 11, 11, 15, 0, 0));
}

#[test]
fn friday_at_three_resolves_next_friday_with_target() {
    let (scheduler, _) = scheduler_at_monday(Vec::new());
    let plan = scheduler.plan("sexta às 15h");

    assert!(!plan.mentions_tomorrow);
    // Strictly after Monday the 10th: Friday the 14th.
    assert_eq!(plan.base_date, NaiveDate::from_ymd_opt(2025, 11, 14).unwrap());
    assert_eq!(plan.mode, PreferenceMode::Around);
    assert_eq!(plan.target_hour, Some(15));
    // The around-15h halo is 13-17 local, 16:00-20:00 UTC.
    assert_eq!(plan.primary.start_utc, utc(2025, 11, 14, 16, 0, 0));
    assert_eq!(plan.primary.end_utc, utc(2025, 11, 14, 20, 0, 0));
    // Same hour range on Saturday first, whole Saturday last.
    assert_eq!(plan.fallbacks.len(), 2);
    assert_eq!(plan.fallbacks[0].start_utc, utc(2025, 11, 15, 16, 0, 0));
    assert_eq!(plan.fallbacks[1].start_utc, utc(2025, 11, 15, 3, 0, 0));
    assert_eq!(plan.fallbacks[1].end_utc, utc(2025, 11, 16, 2, 59, 59));
}

#[tokio::test]
async fn after_preference_clamps_fallbacks_but_not_the_day_rescue() {
    // "sexta a partir das 18": every planned window keeps the >= 18h clamp,
    // so the Saturday 10:00 slot inside the whole-day fallback is rejected.
    // The requested-day rescue keeps only the date intent and accepts a
    // Friday 10:00 slot.
    let (scheduler, queries) = scheduler_at_monday(vec![
        Ok(Vec::new()),                                        // Friday 18-20h
        Ok(Vec::new()),                                        // Saturday 18-20h
        Ok(vec![slot("sat-morning", "2025-11-15T13:00:00Z")]), // whole Saturday
        Ok(vec![slot("fri-morning", "2025-11-14T13:00:00Z")]), // whole Friday, rescue
    ]);

    let offered = scheduler.plan_and_resolve_slots("sexta a partir das 18").await;

    let ids: Vec<&str> = offered.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["fri-morning"]);
    assert_eq!(queries.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn late_utc_slot_is_filtered_out_of_business_hours() {
    // 23:00 UTC is 20:00 in São Paulo, outside the default 09-18 range; the
    // cascade moves on instead of offering it.
    let (scheduler, queries) =
        scheduler_at_monday(vec![Ok(vec![slot("late", "2025-11-10T23:00:00Z")])]);

    let offered = scheduler.plan_and_resolve_slots("oi, tudo bem?").await;

    assert!(offered.is_empty());
    // Primary, both fallbacks and the week rescue all ran dry.
    assert_eq!(queries.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn ranking_prefers_minute_proximity_to_the_target() {
    // Both slots sit inside Friday 13-17h local; 15:10 is 0.17h from the
    // 15:00 target while 14:30 is 0.5h away.
    let (scheduler, _) = scheduler_at_monday(vec![Ok(vec![
        slot("fourteen-thirty", "2025-11-14T17:30:00Z"),
        slot("fifteen-ten", "2025-11-14T18:10:00Z"),
    ])]);

    let offered = scheduler.plan_and_resolve_slots("sexta às 15h").await;

    let ids: Vec<&str> = offered.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["fifteen-ten", "fourteen-thirty"]);
}

#[tokio::test]
async fn offers_are_capped_at_five() {
    let many: Vec<Slot> = (0..8)
        .map(|i| {
            slot(
                &format!("s{}", i),
                &format!("2025-11-10T{:02}:{:02}:00Z", 12 + i / 2, (i % 2) * 30),
            )
        })
        .collect();
    let (scheduler, _) = scheduler_at_monday(vec![Ok(many)]);

    let offered = scheduler.plan_and_resolve_slots("bom dia, podemos falar?").await;

    assert_eq!(offered.len(), MAX_OFFERED_SLOTS);
    // No target hour, so provider order survives the cap.
    let ids: Vec<&str> = offered.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["s0", "s1", "s2", "s3", "s4"]);
}

#[tokio::test]
async fn empty_availability_is_an_empty_offer_not_an_error() {
    let (scheduler, queries) = scheduler_at_monday(Vec::new());

    let offered = scheduler.plan_and_resolve_slots("pode ser dia 20?").await;

    assert!(offered.is_empty());
    // Primary, two fallbacks, the requested-day rescue and the week rescue.
    assert_eq!(queries.lock().unwrap().len(), 5);
}

#[tokio::test]
async fn booking_delegates_to_the_source() {
    let (scheduler, _) = scheduler_at_monday(Vec::new());
    let request = BookingRequest {
        slot_id: "cal-0-2025-11-14T18:00:00Z".into(),
        start: Some("2025-11-14T18:00:00Z".into()),
        attendee_name: Some("Maria".into()),
        attendee_email: None,
    };

    let booking = scheduler.book_slot(&request).await.unwrap();
    assert_eq!(booking.meeting_url, "https://meet.test/cal-0-2025-11-14T18:00:00Z");
    assert_eq!(booking.start, "2025-11-14T18:00:00Z");

    scheduler.cancel_booking("bk-1", Some("cliente desmarcou")).await.unwrap();
}
