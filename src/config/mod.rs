pub mod cli;

use crate::domain::model::{
    BatchSettings, FailurePolicy, FocusPoint, GeocoderSettings, RateLimit, DEFAULT_ADDRESS_COLUMN,
    DEFAULT_FOCUS_POINT,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "csv-geocode")]
#[command(about = "Geocode the addresses of a CSV file and print a GeoJSON FeatureCollection")]
pub struct CliConfig {
    /// CSV file with a header row
    pub input: String,

    /// Pelias host name; a full http(s) URL is used as-is
    #[arg(long, env = "PELIAS_HOST_NAME")]
    pub host: Option<String>,

    #[arg(long, env = "PELIAS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_ADDRESS_COLUMN)]
    pub address_column: String,

    #[arg(long, default_value_t = DEFAULT_FOCUS_POINT.lat, allow_negative_numbers = true)]
    pub focus_lat: f64,

    #[arg(long, default_value_t = DEFAULT_FOCUS_POINT.lon, allow_negative_numbers = true)]
    pub focus_lon: f64,

    #[arg(long, default_value = "5")]
    pub concurrent_requests: usize,

    /// Calls admitted per rate interval
    #[arg(long, default_value = "10")]
    pub rate_limit: usize,

    #[arg(long, default_value = "1000")]
    pub rate_interval_ms: u64,

    /// Per-call timeout
    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    /// Abort the whole batch on the first failed address
    #[arg(long)]
    pub fail_fast: bool,

    /// Write the GeoJSON here instead of stdout
    #[arg(long)]
    pub output: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// `https://<host>` unless the host already names a scheme.
    pub fn base_url(&self) -> Option<String> {
        self.host.as_deref().map(str::trim).map(|host| {
            if host.contains("://") {
                host.trim_end_matches('/').to_string()
            } else {
                format!("https://{}", host.trim_end_matches('/'))
            }
        })
    }
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn geocoder_settings(&self) -> Result<GeocoderSettings> {
        let base_url = validation::validate_required_field("host", &self.base_url())?.clone();
        let api_key = validation::validate_required_field("api_key", &self.api_key)?.clone();

        Ok(GeocoderSettings {
            base_url,
            api_key,
            focus_point: FocusPoint {
                lat: self.focus_lat,
                lon: self.focus_lon,
            },
            request_timeout: Duration::from_secs(self.timeout_seconds),
        })
    }

    fn batch_settings(&self) -> BatchSettings {
        BatchSettings {
            address_column: self.address_column.clone(),
            concurrency: self.concurrent_requests,
            rate_limit: RateLimit {
                max_calls: self.rate_limit,
                interval: Duration::from_millis(self.rate_interval_ms),
            },
            call_timeout: Duration::from_secs(self.timeout_seconds),
            failure_policy: if self.fail_fast {
                FailurePolicy::FailFast
            } else {
                FailurePolicy::BestEffort
            },
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;

        let settings = self.geocoder_settings()?;
        validation::validate_url("host", &settings.base_url)?;
        validation::validate_non_empty_string("api_key", &settings.api_key)?;
        validation::validate_range("focus_lat", self.focus_lat, -90.0, 90.0)?;
        validation::validate_range("focus_lon", self.focus_lon, -180.0, 180.0)?;

        validation::validate_non_empty_string("address_column", &self.address_column)?;
        validation::validate_positive_number("concurrent_requests", self.concurrent_requests, 1)?;
        validation::validate_positive_number("rate_limit", self.rate_limit, 1)?;
        validation::validate_positive_number("rate_interval_ms", self.rate_interval_ms, 1)?;
        validation::validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;

        Ok(())
    }
}
