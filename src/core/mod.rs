pub mod assembler;
pub mod etl;
pub mod orchestrator;
pub mod pipeline;
pub mod pool;
pub mod rate_limiter;

pub use crate::domain::model::{Record, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Geocoder, Pipeline, Storage};
pub use crate::utils::error::Result;
