//! Host-facing services: logging, sleeping, and random seeding.

use std::time::Duration;

use rand::{rngs::SmallRng, SeedableRng};
use tracing::debug;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::PlatformError;
use crate::formatter::CustomFormatter;

/// Installs the global tracing subscriber.
///
/// Honors `RUST_LOG`, defaulting to `info`.
pub fn init_logging() -> Result<(), PlatformError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().event_format(CustomFormatter))
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| PlatformError::LoggingInit(format!("Failed to set tracing subscriber: {e}")))
}

/// Sleeps precisely when focused, cheaply otherwise.
pub fn sleep(duration: Duration, focused: bool) {
    if focused {
        spin_sleep::sleep(duration);
    } else {
        std::thread::sleep(duration);
    }
}

/// The simulation's random source: fixed for a seed, otherwise drawn from the thread generator.
pub fn rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => {
            debug!(seed, "Using seeded generator");
            SmallRng::seed_from_u64(seed)
        }
        None => SmallRng::from_rng(&mut rand::rng()),
    }
}
