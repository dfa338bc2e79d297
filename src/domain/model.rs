use crate::utils::error::EtlError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One CSV row, keyed by header name, in header order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    pub fn from_row(headers: &csv::StringRecord, row: &csv::StringRecord) -> Self {
        let data = headers
            .iter()
            .zip(row.iter())
            .map(|(column, value)| {
                (
                    column.to_string(),
                    serde_json::Value::String(value.to_string()),
                )
            })
            .collect();
        Self { data }
    }

    /// The trimmed address in `column`, or `None` when the record should be skipped.
    pub fn address(&self, column: &str) -> Option<&str> {
        self.data
            .get(column)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|address| !address.is_empty())
    }
}

/// A single match returned by the geocoder. Only `geometry` reaches the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub geometry: Option<serde_json::Value>,
    #[serde(default)]
    pub properties: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub features: Vec<Candidate>,
}

impl GeocodeResult {
    pub fn first_candidate(&self) -> Option<&Candidate> {
        self.features.first()
    }
}

#[derive(Debug)]
pub struct GeocodeFailure {
    pub address: String,
    pub error: EtlError,
}

#[derive(Debug)]
pub enum GeocodeOutcome {
    Skipped,
    Success(GeocodeResult),
    Failure(GeocodeFailure),
}

/// A record paired with its outcome, at its original input position.
#[derive(Debug)]
pub struct GeocodedRecord {
    pub index: usize,
    pub record: Record,
    pub outcome: GeocodeOutcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_entries(entries: &[GeocodedRecord]) -> Self {
        entries.iter().fold(
            Self {
                total: entries.len(),
                ..Self::default()
            },
            |mut summary, entry| {
                match entry.outcome {
                    GeocodeOutcome::Skipped => summary.skipped += 1,
                    GeocodeOutcome::Success(_) => summary.succeeded += 1,
                    GeocodeOutcome::Failure(_) => summary.failed += 1,
                }
                summary
            },
        )
    }
}

#[derive(Debug)]
pub struct TransformResult {
    pub entries: Vec<GeocodedRecord>,
    pub summary: BatchSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub r#type: String,
    pub geometry: Option<serde_json::Value>,
    pub properties: Record,
}

impl Feature {
    pub fn new(geometry: Option<serde_json::Value>, properties: Record) -> Self {
        Self {
            r#type: "Feature".to_string(),
            geometry,
            properties,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub r#type: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            r#type: "FeatureCollection".to_string(),
            features,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Philadelphia City Hall.
pub const DEFAULT_FOCUS_POINT: FocusPoint = FocusPoint {
    lat: 39.952,
    lon: -75.164,
};

pub const DEFAULT_ADDRESS_COLUMN: &str = "Rack Address";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_calls: usize,
    pub interval: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max_calls: 10,
            interval: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Keep going; a failed record is emitted with a null geometry.
    #[default]
    BestEffort,
    /// Abort the whole batch on the first failed call.
    FailFast,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchSettings {
    pub address_column: String,
    pub concurrency: usize,
    pub rate_limit: RateLimit,
    pub call_timeout: Duration,
    pub failure_policy: FailurePolicy,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            address_column: DEFAULT_ADDRESS_COLUMN.to_string(),
            concurrency: 5,
            rate_limit: RateLimit::default(),
            call_timeout: Duration::from_secs(30),
            failure_policy: FailurePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderSettings {
    pub base_url: String,
    pub api_key: String,
    pub focus_point: FocusPoint,
    pub request_timeout: Duration,
}
