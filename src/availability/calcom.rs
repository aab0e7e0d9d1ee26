//! Cal.com v2 API client
//!
//! Talks to `api.cal.com` for slot lookup and the booking lifecycle. Slot
//! queries and bookings require different `cal-api-version` headers; the
//! values here mirror what the v2 endpoints currently accept.

use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, SecondsFormat, TimeZone, Utc};
use log::{debug, warn};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use super::{AvailabilityError, AvailabilitySource, Booking, BookingRequest};
use crate::config::{sanitize_time_zone, Config};
use crate::planner::TimeWindow;
use crate::slots::Slot;
use async_trait::async_trait;

const CAL_BASE: &str = "https://api.cal.com";
/// Version header for slot queries; overridable because Cal.com revs it.
const DEFAULT_SLOTS_API_VERSION: &str = "2024-09-04";
/// Bookings only work against this version, so it is not configurable.
const BOOKINGS_API_VERSION: &str = "2024-08-13";
const SLOTS_TIMEOUT: Duration = Duration::from_secs(12);
const BOOKINGS_TIMEOUT: Duration = Duration::from_secs(20);

/// Availability source backed by the Cal.com v2 API.
pub struct CalComSource {
    client: Client,
    api_key: SecretString,
    username: String,
    event_type_slug: String,
    event_type_id: Option<i64>,
    time_zone: String,
    slots_api_version: String,
}

impl CalComSource {
    /// Build from configuration plus the `CAL_API_KEY` environment variable.
    /// Fails when the key, username or event type slug is missing, which the
    /// factory treats as "run on mock slots instead".
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = std::env::var("CAL_API_KEY")
            .map_err(|_| anyhow!("CAL_API_KEY is not set"))?;
        let username = config
            .calcom
            .username
            .clone()
            .ok_or_else(|| anyhow!("calcom.username is not configured"))?;
        let event_type_slug = config
            .calcom
            .event_type_slug
            .clone()
            .ok_or_else(|| anyhow!("calcom.event_type_slug is not configured"))?;

        Ok(Self {
            client: Client::new(),
            api_key: SecretString::from(api_key),
            username,
            event_type_slug,
            event_type_id: config.calcom.event_type_id,
            time_zone: sanitize_time_zone(&config.scheduling.timezone),
            slots_api_version: config
                .calcom
                .api_version
                .clone()
                .unwrap_or_else(|| DEFAULT_SLOTS_API_VERSION.to_string()),
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key.expose_secret())
    }
}

#[async_trait]
impl AvailabilitySource for CalComSource {
    async fn get_slots(
        &self,
        window: Option<TimeWindow>,
    ) -> Result<Vec<Slot>, AvailabilityError> {
        let (start, end) = match window {
            Some(w) => (w.start_utc, w.end_utc),
            None => default_horizon(Utc::now()),
        };
        let start_day = start.date_naive().to_string();
        let end_day = end.date_naive().to_string();

        let response = self
            .client
            .get(format!("{}/v2/slots", CAL_BASE))
            .timeout(SLOTS_TIMEOUT)
            .header("Authorization", self.bearer())
            .header("cal-api-version", self.slots_api_version.as_str())
            .query(&[
                ("eventTypeSlug", self.event_type_slug.as_str()),
                ("username", self.username.as_str()),
                ("start", start_day.as_str()),
                ("end", end_day.as_str()),
                ("timeZone", self.time_zone.as_str()),
                ("format", "range"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AvailabilityError::Api { status, body });
        }

        let payload: Value = response.json().await?;
        let mut slots = Vec::new();
        if let Some(days) = payload.get("data").and_then(Value::as_object) {
            // Day keys are ISO dates, so map order is chronological.
            for day_slots in days.values() {
                let list = match day_slots.as_array() {
                    Some(list) => list,
                    None => continue,
                };
                for entry in list {
                    if let Some(start) = entry.get("start").and_then(Value::as_str) {
                        let end = entry.get("end").and_then(Value::as_str).unwrap_or(start);
                        slots.push(Slot {
                            id: format!("cal-{}-{}", slots.len(), start),
                            start: start.to_string(),
                            end: end.to_string(),
                        });
                    }
                }
            }
        }
        debug!("cal.com returned {} slot(s)", slots.len());
        Ok(slots)
    }

    async fn book_slot(&self, request: &BookingRequest) -> Result<Booking, AvailabilityError> {
        let start = ensure_utc_z(request.start.as_deref())
            .ok_or(AvailabilityError::MissingBookingStart)?;

        let mut body = json!({
            "start": start,
            "attendee": {
                "name": request.attendee_name.as_deref().unwrap_or("Convidado"),
                "email": request.attendee_email.as_deref().unwrap_or("lead@example.com"),
                "timeZone": self.time_zone,
                "language": "pt-BR",
            },
            "metadata": { "source": "ai-sdr" },
        });
        // Bookings accept either a numeric event type id or slug+username.
        match self.event_type_id {
            Some(id) => body["eventTypeId"] = json!(id),
            None => {
                body["eventTypeSlug"] = json!(self.event_type_slug);
                body["username"] = json!(self.username);
            }
        }

        let response = self
            .client
            .post(format!("{}/v2/bookings", CAL_BASE))
            .timeout(BOOKINGS_TIMEOUT)
            .header("Authorization", self.bearer())
            .header("cal-api-version", BOOKINGS_API_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("cal.com booking for slot {} failed with {}", request.slot_id, status);
            return Err(AvailabilityError::Api { status, body });
        }

        let payload: Value = response.json().await?;
        let data = payload.get("data").unwrap_or(&payload);
        let booking = data.get("booking").unwrap_or(data);

        let meeting_url = booking
            .get("meetingUrl")
            .or_else(|| booking.get("hangoutLink"))
            .or_else(|| booking.get("locationUrl"))
            .or_else(|| booking.get("location"))
            .and_then(Value::as_str)
            .unwrap_or("https://meeting.link")
            .to_string();
        let confirmed_start = booking
            .get("start")
            .and_then(Value::as_str)
            .unwrap_or(&start)
            .to_string();
        let booking_id = booking
            .get("id")
            .or_else(|| booking.get("uid"))
            .or_else(|| booking.get("bookingId"))
            .and_then(string_or_number);

        Ok(Booking { booking_id, meeting_url, start: confirmed_start })
    }

    async fn cancel_booking(
        &self,
        booking_id: &str,
        reason: Option<&str>,
    ) -> Result<(), AvailabilityError> {
        let body = match reason {
            Some(reason) => json!({ "reason": reason }),
            None => json!({}),
        };

        let response = self
            .client
            .post(format!("{}/v2/bookings/{}/cancel", CAL_BASE, booking_id))
            .timeout(BOOKINGS_TIMEOUT)
            .header("Authorization", self.bearer())
            .header("cal-api-version", BOOKINGS_API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(AvailabilityError::Api { status, body })
        }
    }
}

/// Tomorrow's business hours in UTC, used when no window is requested.
fn default_horizon(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let tomorrow = (now + ChronoDuration::days(1)).date_naive();
    let start = Utc.from_utc_datetime(&tomorrow.and_time(NaiveTime::MIN)) + ChronoDuration::hours(9);
    (start, start + ChronoDuration::hours(9))
}

/// Normalize an ISO timestamp to an explicit-"Z" UTC string. Offset-free
/// inputs are assumed UTC; unreadable input passes through unchanged.
fn ensure_utc_z(iso: Option<&str>) -> Option<String> {
    let raw = iso?.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.ends_with('Z') {
        return Some(raw.to_string());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(
            parsed.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true),
        );
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(
            Utc.from_utc_datetime(&naive).to_rfc3339_opts(SecondsFormat::Secs, true),
        );
    }
    Some(raw.to_string())
}

fn string_or_number(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
