pub mod adapters;
#[cfg(feature = "cli")]
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use adapters::pelias::PeliasGeocoder;
pub use self::core::{etl::EtlEngine, pipeline::GeocodePipeline};
pub use utils::error::{EtlError, Result};
