//! External availability sources
//!
//! The engine consumes slots from exactly one source per deployment: the
//! Cal.com v2 API in production, or a deterministic mock when running
//! without credentials. Sources also carry the booking operations the
//! dialogue layer invokes once the lead picks a slot.

use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{AvailabilityProvider, Config};
use crate::planner::TimeWindow;
use crate::slots::Slot;

mod calcom;
mod mock;

pub use calcom::CalComSource;
pub use mock::MockSource;

/// Errors surfaced by an availability source. The cascade treats every one
/// of them as "zero slots for this step"; booking callers see them as-is.
#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    #[error("availability request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("availability api answered {status}: {body}")]
    Api { status: reqwest::StatusCode, body: String },
    #[error("booking request is missing a start timestamp")]
    MissingBookingStart,
}

/// What the dialogue layer knows when it asks for a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub slot_id: String,
    pub start: Option<String>,
    pub attendee_name: Option<String>,
    pub attendee_email: Option<String>,
}

/// A confirmed (or mock-confirmed) booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: Option<String>,
    pub meeting_url: String,
    pub start: String,
}

/// One availability backend: slot lookup plus the booking lifecycle.
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// Candidate slots within or near `window`. The engine re-filters, so a
    /// source is free to return slots outside the requested bounds. With no
    /// window, the source picks its own default horizon.
    async fn get_slots(&self, window: Option<TimeWindow>)
        -> Result<Vec<Slot>, AvailabilityError>;

    async fn book_slot(&self, request: &BookingRequest) -> Result<Booking, AvailabilityError>;

    async fn cancel_booking(
        &self,
        booking_id: &str,
        reason: Option<&str>,
    ) -> Result<(), AvailabilityError>;
}

/// Factory for the configured availability source.
pub struct SourceFactory;

impl SourceFactory {
    /// Create the source the configuration asks for, degrading to the mock
    /// when Cal.com credentials are incomplete so the flow keeps working.
    pub fn create_source(config: &Config) -> Box<dyn AvailabilitySource> {
        match config.availability.provider {
            AvailabilityProvider::CalCom => match CalComSource::from_config(config) {
                Ok(source) => {
                    info!("using Cal.com availability source");
                    Box::new(source)
                }
                Err(err) => {
                    warn!("Cal.com source unavailable ({}); serving mock slots", err);
                    Box::new(MockSource::new())
                }
            },
            AvailabilityProvider::Mock => {
                info!("using mock availability source");
                Box::new(MockSource::new())
            }
        }
    }
}
