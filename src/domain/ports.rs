use crate::domain::model::{
    BatchSettings, GeocodeResult, GeocoderSettings, Record, TransformResult,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn geocoder_settings(&self) -> Result<GeocoderSettings>;
    fn batch_settings(&self) -> BatchSettings;
}

/// Forward geocoding: free-text address to candidate matches.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, term: &str) -> Result<GeocodeResult>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Record>>;
    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
