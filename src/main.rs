use clap::Parser;
use csv_geocode::domain::ports::Storage;
use csv_geocode::utils::error::ErrorSeverity;
use csv_geocode::utils::{logger, validation::Validate};
use csv_geocode::{CliConfig, EtlEngine, EtlError, GeocodePipeline, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // PELIAS_HOST_NAME / PELIAS_API_KEY may come from .env
    dotenvy::dotenv().ok();

    let config = CliConfig::parse();
    logger::init_cli_logger(config.verbose, config.json_logs);

    tracing::info!("Starting csv-geocode for {}", config.input);

    if let Err(e) = run(config).await {
        tracing::error!(
            "❌ Geocoding failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(config: CliConfig) -> Result<(), EtlError> {
    config.validate()?;

    let output = config.output.clone();
    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::default();
    let pipeline = GeocodePipeline::new(storage.clone(), config)?;
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    let document = engine.run().await?;

    match output {
        Some(path) => {
            storage.write_file(&path, document.as_bytes()).await?;
            tracing::info!("📁 GeoJSON saved to: {}", path);
        }
        None => println!("{}", document),
    }

    Ok(())
}
