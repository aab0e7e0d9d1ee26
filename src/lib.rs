//! AgendAI scheduling engine
//!
//! Turns Portuguese chat messages like "podemos falar quinta à tarde?" into
//! concrete meeting slots. The pipeline parses the date expression and the
//! time preference, plans candidate windows in the configured timezone,
//! queries an availability source (Cal.com or a deterministic mock) and
//! resolves slots through a fallback cascade that widens the search instead
//! of giving up.

pub mod availability;
pub mod cascade;
pub mod clock;
pub mod config;
pub mod parser;
pub mod planner;
pub mod scheduler;
pub mod slots;

pub fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

// Re-export commonly used types
pub use availability::{
    AvailabilityError, AvailabilitySource, Booking, BookingRequest, CalComSource, MockSource,
    SourceFactory,
};
pub use cascade::{SlotCascade, MAX_OFFERED_SLOTS};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use parser::{ParsedDate, PreferenceMode, TimePreference};
pub use planner::{Plan, TimeWindow};
pub use scheduler::Scheduler;
pub use slots::Slot;
