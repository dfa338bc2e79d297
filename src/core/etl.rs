use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Runs extract, transform and load; returns the GeoJSON document.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting geocoding run");

        let records = self.pipeline.extract().await?;
        tracing::info!("Extracted {} records", records.len());
        self.monitor.log_phase("Extract", records.len());

        let total = records.len();
        let result = self.pipeline.transform(records).await?;
        self.monitor.log_phase("Transform", total);

        let document = self.pipeline.load(result).await?;
        self.monitor.log_phase("Load", total);
        self.monitor.log_final_stats();

        Ok(document)
    }
}
