//! Logging initialization

use std::sync::Once;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Human-readable output, `msdl_core=debug`
    #[default]
    Development,
    /// JSON structured output, `msdl_core=info`
    Production,
    /// Bare registry; tests attach their own capture layer
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Only the first call installs a subscriber; later calls are no-ops.
/// `RUST_LOG` overrides the profile's default filter.
///
/// # Example
///
/// ```
/// use msdl_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let fmt = tracing_subscriber::fmt().with_env_filter(filter(profile));
        // A host may already own the global subscriber.
        let _ = match profile {
            Profile::Development => fmt.finish().try_init(),
            Profile::Production => fmt.json().finish().try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
    });
}

fn filter(profile: Profile) -> EnvFilter {
    let default = match profile {
        Profile::Production => "msdl_core=info",
        Profile::Development | Profile::Test => "msdl_core=debug",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
