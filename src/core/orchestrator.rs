use crate::core::pool::ConcurrencyPool;
use crate::core::rate_limiter::RateLimiter;
use crate::domain::model::{
    BatchSettings, FailurePolicy, GeocodeFailure, GeocodeOutcome, GeocodedRecord, Record,
};
use crate::domain::ports::Geocoder;
use crate::utils::error::{EtlError, Result};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Geocodes a batch of records under a concurrency ceiling and a rate limit.
///
/// Every non-empty address gets its own task up front; outcomes are written
/// back by original position, so completion order never leaks into the result.
pub struct BatchOrchestrator {
    geocoder: Arc<dyn Geocoder>,
    limiter: Arc<RateLimiter>,
    pool: Arc<ConcurrencyPool>,
    settings: BatchSettings,
}

impl BatchOrchestrator {
    pub fn new(geocoder: Arc<dyn Geocoder>, settings: BatchSettings) -> Self {
        Self {
            geocoder,
            limiter: Arc::new(RateLimiter::new(settings.rate_limit)),
            pool: Arc::new(ConcurrencyPool::new(settings.concurrency)),
            settings,
        }
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    pub async fn run(&self, records: Vec<Record>) -> Result<Vec<GeocodedRecord>> {
        let mut outcomes: Vec<Option<GeocodeOutcome>> = Vec::with_capacity(records.len());
        let mut tasks = JoinSet::new();

        for (index, record) in records.iter().enumerate() {
            match record.address(&self.settings.address_column) {
                None => outcomes.push(Some(GeocodeOutcome::Skipped)),
                Some(address) => {
                    outcomes.push(None);
                    tasks.spawn(self.geocode(index, address.to_string()));
                }
            }
        }

        tracing::debug!(
            "Scheduled {} geocoding calls for {} records, {} at a time",
            tasks.len(),
            records.len(),
            self.pool.capacity()
        );

        while let Some(joined) = tasks.join_next().await {
            let (index, outcome) = joined.map_err(|e| EtlError::ProcessingError {
                message: format!("geocoding task did not complete: {}", e),
            })?;

            if let GeocodeOutcome::Failure(failure) = &outcome {
                tracing::error!(
                    address = %failure.address,
                    "Error geocoding '{}': {}",
                    failure.address,
                    failure.error
                );
            }

            outcomes[index] = match outcome {
                GeocodeOutcome::Failure(failure)
                    if self.settings.failure_policy == FailurePolicy::FailFast =>
                {
                    tasks.abort_all();
                    return Err(EtlError::BatchAborted {
                        address: failure.address,
                        source: Box::new(failure.error),
                    });
                }
                outcome => Some(outcome),
            };
        }

        records
            .into_iter()
            .zip(outcomes)
            .enumerate()
            .map(|(index, (record, outcome))| {
                let outcome = outcome.ok_or_else(|| EtlError::ProcessingError {
                    message: format!("no geocoding outcome for record {}", index),
                })?;
                Ok(GeocodedRecord {
                    index,
                    record,
                    outcome,
                })
            })
            .collect()
    }

    /// One gated call: pool slot, then rate admission, then the timed search.
    fn geocode(
        &self,
        index: usize,
        address: String,
    ) -> impl std::future::Future<Output = (usize, GeocodeOutcome)> + Send + 'static {
        let geocoder = Arc::clone(&self.geocoder);
        let limiter = Arc::clone(&self.limiter);
        let pool = Arc::clone(&self.pool);
        let call_timeout = self.settings.call_timeout;

        async move {
            let searched = pool
                .submit(async {
                    limiter.admit().await;
                    tracing::debug!("Geocoding '{}'", address);
                    match tokio::time::timeout(call_timeout, geocoder.search(&address)).await {
                        Ok(result) => result,
                        Err(_) => Err(EtlError::TimeoutError {
                            elapsed: call_timeout,
                        }),
                    }
                })
                .await
                .and_then(|result| result);

            let outcome = match searched {
                Ok(result) => {
                    if result.first_candidate().is_none() {
                        tracing::warn!(
                            address = %address,
                            "No geocoding candidates for '{}', geometry set to null",
                            address
                        );
                    }
                    GeocodeOutcome::Success(result)
                }
                Err(error) => GeocodeOutcome::Failure(GeocodeFailure { address, error }),
            };
            (index, outcome)
        }
    }
}
