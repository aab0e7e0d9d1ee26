//! Debug harness for the planning pipeline.
//!
//! Prints how a message parses and which slots the cascade resolves, without
//! going through any chat surface:
//!
//! ```text
//! cargo run --bin plan_probe -- "pode ser sexta à tarde?"
//! cargo run --bin plan_probe -- --now 2025-11-10T12:00:00Z "amanhã às 10h"
//! ```

use anyhow::{anyhow, Context, Result};
use chrono::DateTime;
use chrono_tz::Tz;

use agendai::{Config, FixedClock, Scheduler, SourceFactory};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    agendai::init_logger();

    let mut now_override = None;
    let mut words = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--now" {
            let value = args
                .next()
                .ok_or_else(|| anyhow!("--now requires an RFC3339 timestamp"))?;
            now_override = Some(
                DateTime::parse_from_rfc3339(&value)
                    .with_context(|| format!("Could not parse --now value '{}'", value))?,
            );
        } else {
            words.push(arg);
        }
    }

    if words.is_empty() {
        eprintln!("Usage: plan_probe [--now <rfc3339>] <message...>");
        std::process::exit(2);
    }
    let message = words.join(" ");

    let config = Config::load()?;
    let scheduler = match now_override {
        Some(instant) => {
            let zone: Tz = config
                .scheduling
                .timezone
                .parse()
                .map_err(|e| anyhow!("Invalid timezone '{}': {}", config.scheduling.timezone, e))?;
            let clock = FixedClock::new(instant.with_timezone(&zone));
            Scheduler::new(SourceFactory::create_source(&config), Box::new(clock))
        }
        None => Scheduler::from_config(&config)?,
    };

    let plan = scheduler.plan(&message);
    println!("message: {:?}", message);
    println!("plan: {:#?}", plan);

    let slots = scheduler.plan_and_resolve_slots(&message).await;
    println!("slots ({}):", slots.len());
    println!("{}", serde_json::to_string_pretty(&slots)?);

    Ok(())
}
