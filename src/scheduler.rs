//! High-level scheduling facade
//!
//! Ties the pieces together: a [`Clock`] for "now", the parsing/planning
//! pipeline, and an [`AvailabilitySource`] queried through the fallback
//! cascade. Callers hand it a raw chat message and get back bookable slots.

use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use log::info;

use crate::availability::{
    AvailabilityError, AvailabilitySource, Booking, BookingRequest, SourceFactory,
};
use crate::cascade::SlotCascade;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::planner::{self, Plan};
use crate::slots::Slot;

pub struct Scheduler {
    source: Box<dyn AvailabilitySource>,
    clock: Box<dyn Clock>,
}

impl Scheduler {
    pub fn new(source: Box<dyn AvailabilitySource>, clock: Box<dyn Clock>) -> Self {
        Self { source, clock }
    }

    /// Wires a scheduler from configuration: the availability provider comes
    /// from the factory, the clock runs in the configured timezone.
    pub fn from_config(config: &Config) -> Result<Self> {
        let zone: Tz = config
            .scheduling
            .timezone
            .parse()
            .map_err(|e| anyhow!("Invalid timezone '{}': {}", config.scheduling.timezone, e))?;
        let source = SourceFactory::create_source(config);
        Ok(Self::new(source, Box::new(SystemClock::new(zone))))
    }

    /// Parses a message into a scheduling plan without querying availability.
    pub fn plan(&self, text: &str) -> Plan {
        planner::plan(text, self.clock.as_ref())
    }

    /// Full pipeline: parse the message, walk the window cascade against the
    /// availability source and return the best slots, capped at
    /// [`crate::cascade::MAX_OFFERED_SLOTS`]. An empty vec means nothing could
    /// be offered, not an error.
    pub async fn plan_and_resolve_slots(&self, text: &str) -> Vec<Slot> {
        let plan = self.plan(text);
        let cascade = SlotCascade::new(self.source.as_ref(), self.clock.as_ref());
        let slots = cascade.resolve(&plan).await;
        info!("Resolved {} slot(s) for message {:?}", slots.len(), text);
        slots
    }

    pub async fn book_slot(&self, request: &BookingRequest) -> Result<Booking, AvailabilityError> {
        self.source.book_slot(request).await
    }

    pub async fn cancel_booking(
        &self,
        booking_id: &str,
        reason: Option<&str>,
    ) -> Result<(), AvailabilityError> {
        self.source.cancel_booking(booking_id, reason).await
    }
}
