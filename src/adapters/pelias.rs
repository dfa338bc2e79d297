use crate::domain::model::{GeocodeResult, GeocoderSettings};
use crate::domain::ports::Geocoder;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;

/// Forward geocoding against a Pelias `/v1/search` endpoint.
pub struct PeliasGeocoder {
    client: Client,
    search_url: String,
    api_key: String,
    focus_lat: String,
    focus_lon: String,
}

impl PeliasGeocoder {
    pub fn new(settings: &GeocoderSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            client,
            search_url: format!("{}/v1/search", settings.base_url.trim_end_matches('/')),
            api_key: settings.api_key.clone(),
            focus_lat: settings.focus_point.lat.to_string(),
            focus_lon: settings.focus_point.lon.to_string(),
        })
    }
}

/// The request URL carries `api_key`; it must not reach error text.
fn without_url(e: reqwest::Error) -> EtlError {
    EtlError::ApiError(e.without_url())
}

#[async_trait]
impl Geocoder for PeliasGeocoder {
    async fn search(&self, term: &str) -> Result<GeocodeResult> {
        let response = self
            .client
            .get(&self.search_url)
            .query(&[
                ("text", term),
                ("focus.point.lat", self.focus_lat.as_str()),
                ("focus.point.lon", self.focus_lon.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(without_url)?;

        let status = response.status();
        tracing::debug!("Pelias responded {} for '{}'", status, term);

        let body = response.text().await.map_err(without_url)?;
        if !status.is_success() {
            return Err(EtlError::GeocodeStatusError {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| EtlError::MalformedResponseError {
            message: e.to_string(),
        })
    }
}
