use clap::Parser;
use csv_geocode::{CliConfig, EtlEngine, EtlError, GeocodePipeline, LocalStorage};
use httpmock::prelude::*;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const RACKS_CSV: &str = "Rack ID,Rack Address,Racks\n\
                         PHL-1,123 Main St,2\n\
                         PHL-2,,1\n\
                         PHL-3,456 Oak Ave,4\n";

fn csv_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn config(server: &MockServer, input: &str, extra: &[&str]) -> CliConfig {
    let host = server.base_url();
    let mut args = vec!["csv-geocode", input, "--host", host.as_str(), "--api-key", "test-key"];
    args.extend_from_slice(extra);
    CliConfig::try_parse_from(args).unwrap()
}

fn mock_address<'a>(server: &'a MockServer, address: &str, lon: f64, lat: f64) -> httpmock::Mock<'a> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/v1/search")
            .query_param("text", address)
            .query_param("api_key", "test-key");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [lon, lat]},
                    "properties": {"label": address}
                }]
            }));
    })
}

async fn run(config: CliConfig) -> Result<serde_json::Value, EtlError> {
    let pipeline = GeocodePipeline::new(LocalStorage::default(), config)?;
    let document = EtlEngine::new(pipeline).run().await?;
    Ok(serde_json::from_str(&document).unwrap())
}

#[tokio::test]
async fn test_end_to_end_geocoding_with_real_http() {
    let server = MockServer::start();
    let main_st = mock_address(&server, "123 Main St", -75.1652, 39.9526);
    let oak_ave = mock_address(&server, "456 Oak Ave", -75.1800, 39.9700);

    let input = csv_file(RACKS_CSV);
    let geojson = run(config(&server, input.path().to_str().unwrap(), &[]))
        .await
        .unwrap();

    main_st.assert();
    oak_ave.assert();

    let features = geojson["features"].as_array().unwrap();
    assert_eq!(geojson["type"], "FeatureCollection");
    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["type"], "Feature");
    assert_eq!(
        features[0]["properties"],
        serde_json::json!({"Rack ID": "PHL-1", "Rack Address": "123 Main St", "Racks": "2"})
    );
    assert_eq!(
        features[0]["geometry"],
        serde_json::json!({"type": "Point", "coordinates": [-75.1652, 39.9526]})
    );
    assert_eq!(features[1]["properties"]["Rack ID"], "PHL-3");
    assert_eq!(features[1]["geometry"]["coordinates"], serde_json::json!([-75.18, 39.97]));
}

#[tokio::test]
async fn test_server_error_for_one_address_keeps_the_rest() {
    let server = MockServer::start();
    let main_st = mock_address(&server, "123 Main St", -75.1652, 39.9526);
    let oak_ave = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/search")
            .query_param("text", "456 Oak Ave");
        then.status(500);
    });

    let input = csv_file(RACKS_CSV);
    let geojson = run(config(&server, input.path().to_str().unwrap(), &[]))
        .await
        .unwrap();

    main_st.assert();
    oak_ave.assert();

    let features = geojson["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    assert!(features[0]["geometry"].is_object());
    assert!(features[1]["geometry"].is_null());
    assert_eq!(features[1]["properties"]["Rack Address"], "456 Oak Ave");
}

#[tokio::test]
async fn test_fail_fast_aborts_on_server_error() {
    let server = MockServer::start();
    mock_address(&server, "123 Main St", -75.1652, 39.9526);
    server.mock(|when, then| {
        when.method(GET)
            .path("/v1/search")
            .query_param("text", "456 Oak Ave");
        then.status(503);
    });

    let input = csv_file(RACKS_CSV);
    let err = run(config(&server, input.path().to_str().unwrap(), &["--fail-fast"]))
        .await
        .unwrap_err();

    match err {
        EtlError::BatchAborted { address, source } => {
            assert_eq!(address, "456 Oak Ave");
            assert!(matches!(*source, EtlError::GeocodeStatusError { status: 503, .. }));
        }
        other => panic!("expected BatchAborted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_candidates_gives_null_geometry() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/search");
        then.status(200)
            .json_body(serde_json::json!({"type": "FeatureCollection", "features": []}));
    });

    let input = csv_file("Rack Address\n1 Nowhere Ln\n");
    let geojson = run(config(&server, input.path().to_str().unwrap(), &[]))
        .await
        .unwrap();

    assert_eq!(geojson["features"].as_array().unwrap().len(), 1);
    assert!(geojson["features"][0]["geometry"].is_null());
}

#[tokio::test]
async fn test_custom_address_column() {
    let server = MockServer::start();
    let mock = mock_address(&server, "1 Elm St", -75.0, 40.0);

    let input = csv_file("Location,Rack Address\n1 Elm St,ignored\n");
    let geojson = run(config(
        &server,
        input.path().to_str().unwrap(),
        &["--address-column", "Location"],
    ))
    .await
    .unwrap();

    mock.assert();
    assert_eq!(geojson["features"][0]["properties"]["Rack Address"], "ignored");
}

#[tokio::test]
async fn test_missing_input_file_is_io_error() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.csv");

    let err = run(config(&server, missing.to_str().unwrap(), &[]))
        .await
        .unwrap_err();

    assert!(matches!(err, EtlError::IoError(_)));
}

mod binary {
    use super::*;
    use std::process::Command;

    fn bin() -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_csv-geocode"));
        command
            .env_remove("PELIAS_HOST_NAME")
            .env_remove("PELIAS_API_KEY")
            .env("RUST_LOG", "off");
        command
    }

    #[test]
    fn test_missing_path_argument_is_a_usage_error() {
        let output = bin().output().unwrap();

        assert!(!output.status.success());
        assert!(output.stdout.is_empty());
        assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
    }

    #[test]
    fn test_missing_api_key_exits_without_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("racks.csv");
        std::fs::write(&input, RACKS_CSV).unwrap();

        let output = bin()
            .current_dir(dir.path())
            .arg(&input)
            .env("PELIAS_HOST_NAME", "pelias.example.com")
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn test_prints_single_line_geojson_to_stdout() {
        let server = MockServer::start();
        mock_address(&server, "123 Main St", -75.1652, 39.9526);
        mock_address(&server, "456 Oak Ave", -75.18, 39.97);

        let dir = TempDir::new().unwrap();
        let input = dir.path().join("racks.csv");
        std::fs::write(&input, RACKS_CSV).unwrap();

        let output = bin()
            .current_dir(dir.path())
            .arg(&input)
            .env("PELIAS_HOST_NAME", server.base_url())
            .env("PELIAS_API_KEY", "test-key")
            .output()
            .unwrap();

        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout).unwrap();
        assert_eq!(stdout.trim_end().lines().count(), 1);

        let geojson: serde_json::Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(geojson["features"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_failed_address_is_reported_on_stderr() {
        let server = MockServer::start();
        mock_address(&server, "123 Main St", -75.1652, 39.9526);
        server.mock(|when, then| {
            when.method(GET)
                .path("/v1/search")
                .query_param("text", "456 Oak Ave");
            then.status(500);
        });

        let dir = TempDir::new().unwrap();
        let input = dir.path().join("racks.csv");
        std::fs::write(&input, RACKS_CSV).unwrap();

        let output = bin()
            .current_dir(dir.path())
            .arg(&input)
            .env_remove("RUST_LOG")
            .env("PELIAS_HOST_NAME", server.base_url())
            .env("PELIAS_API_KEY", "test-key")
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(0));

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("456 Oak Ave"), "stderr was: {}", stderr);
        assert!(!stderr.contains("test-key"));

        let stdout = String::from_utf8(output.stdout).unwrap();
        assert_eq!(stdout.trim_end().lines().count(), 1);
        let geojson: serde_json::Value = serde_json::from_str(&stdout).unwrap();
        let features = geojson["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert!(features[1]["geometry"].is_null());
    }

    #[test]
    fn test_address_without_candidates_is_reported_on_stderr() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/search");
            then.status(200)
                .json_body(serde_json::json!({"type": "FeatureCollection", "features": []}));
        });

        let dir = TempDir::new().unwrap();
        let input = dir.path().join("racks.csv");
        std::fs::write(&input, "Rack Address\n1 Nowhere Ln\n").unwrap();

        let output = bin()
            .current_dir(dir.path())
            .arg(&input)
            .env_remove("RUST_LOG")
            .env("PELIAS_HOST_NAME", server.base_url())
            .env("PELIAS_API_KEY", "test-key")
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(0));

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("No geocoding candidates"), "stderr was: {}", stderr);
        assert!(stderr.contains("1 Nowhere Ln"));

        let geojson: serde_json::Value =
            serde_json::from_str(&String::from_utf8(output.stdout).unwrap()).unwrap();
        assert!(geojson["features"][0]["geometry"].is_null());
    }

    #[test]
    fn test_output_flag_writes_file_instead_of_stdout() {
        let server = MockServer::start();
        mock_address(&server, "123 Main St", -75.1652, 39.9526);
        mock_address(&server, "456 Oak Ave", -75.18, 39.97);

        let dir = TempDir::new().unwrap();
        let input = dir.path().join("racks.csv");
        let out = dir.path().join("out").join("racks.geojson");
        std::fs::write(&input, RACKS_CSV).unwrap();

        let output = bin()
            .current_dir(dir.path())
            .arg(&input)
            .arg("--output")
            .arg(&out)
            .env("PELIAS_HOST_NAME", server.base_url())
            .env("PELIAS_API_KEY", "test-key")
            .output()
            .unwrap();

        assert!(output.status.success());
        assert!(output.stdout.is_empty());

        let geojson: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(geojson["type"], "FeatureCollection");
    }
}
