use crate::adapters::pelias::PeliasGeocoder;
use crate::core::assembler::FeatureAssembler;
use crate::core::orchestrator::BatchOrchestrator;
use crate::core::{ConfigProvider, Geocoder, Pipeline, Record, Storage, TransformResult};
use crate::domain::model::BatchSummary;
use crate::utils::error::Result;
use std::sync::Arc;

/// CSV in, geocoded GeoJSON out.
pub struct GeocodePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    orchestrator: BatchOrchestrator,
}

impl<S: Storage, C: ConfigProvider> GeocodePipeline<S, C> {
    /// Builds the Pelias geocoder from `config`.
    pub fn new(storage: S, config: C) -> Result<Self> {
        let geocoder = PeliasGeocoder::new(&config.geocoder_settings()?)?;
        Ok(Self::with_geocoder(storage, config, Arc::new(geocoder)))
    }

    pub fn with_geocoder(storage: S, config: C, geocoder: Arc<dyn Geocoder>) -> Self {
        let orchestrator = BatchOrchestrator::new(geocoder, config.batch_settings());
        Self {
            storage,
            config,
            orchestrator,
        }
    }
}

/// Parses CSV text with a header row into records, in file order.
pub fn parse_csv(data: &[u8]) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    reader
        .records()
        .map(|row| Ok(Record::from_row(&headers, &row?)))
        .collect()
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for GeocodePipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let path = self.config.input_path();
        tracing::debug!("Reading CSV from: {}", path);

        let data = self.storage.read_file(path).await?;
        let records = parse_csv(&data)?;

        let column = &self.orchestrator.settings().address_column;
        if !records.is_empty() && records.iter().all(|r| !r.data.contains_key(column)) {
            tracing::warn!("Column '{}' not found in {}, nothing will be geocoded", column, path);
        }

        Ok(records)
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        let entries = self.orchestrator.run(data).await?;
        let summary = BatchSummary::from_entries(&entries);

        tracing::info!(
            "Geocoded {} of {} records ({} skipped, {} failed)",
            summary.succeeded,
            summary.total,
            summary.skipped,
            summary.failed
        );

        Ok(TransformResult { entries, summary })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let collection = FeatureAssembler::assemble(result.entries);
        tracing::debug!("Assembled {} features", collection.features.len());

        Ok(serde_json::to_string(&collection)?)
    }
}
