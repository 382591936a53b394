//! Client configuration

use clap::Args;
use jiff::{Zoned, tz::TimeZone};
use tracing::warn;

use crate::{api::ApiConfig, observability::LoggingConfig, storage::StorageConfig};

/// Offset used when the time zone database has no entry for the configured zone.
const LIMA_OFFSET_HOURS: i8 = -5;

/// San Isidro client configuration
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// API connection settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Local storage settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Time zone invoices and reservations are dated in
    #[arg(long, env = "SANISIDRO_TIMEZONE", default_value = "America/Lima")]
    pub timezone: String,
}

impl AppConfig {
    /// Resolve the configured time zone.
    ///
    /// Falls back to a fixed UTC-5 offset, the restaurant's wall clock, if the zone is unknown.
    pub fn time_zone(&self) -> TimeZone {
        TimeZone::get(&self.timezone).unwrap_or_else(|error| {
            warn!(timezone = %self.timezone, %error, "unknown time zone, using UTC-5");

            TimeZone::fixed(jiff::tz::offset(LIMA_OFFSET_HOURS))
        })
    }

    /// The current time in the configured time zone.
    pub fn now(&self) -> Zoned {
        Zoned::now().with_time_zone(self.time_zone())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::observability::LogFormat;

    use super::*;

    fn config(timezone: &str) -> AppConfig {
        AppConfig {
            api: ApiConfig {
                api_url: "http://localhost:8080/api".to_string(),
                timeout_secs: 15,
            },
            storage: StorageConfig {
                storage_dir: PathBuf::from(".sanisidro"),
            },
            logging: LoggingConfig {
                log_level: "warn".to_string(),
                log_format: LogFormat::Compact,
            },
            timezone: timezone.to_string(),
        }
    }

    #[test]
    fn unknown_zone_falls_back_to_lima_offset() {
        let now = config("Mars/Olympus_Mons").now();

        assert_eq!(now.offset(), jiff::tz::offset(LIMA_OFFSET_HOURS));
    }
}
