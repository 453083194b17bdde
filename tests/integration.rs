//! Integration tests for the DigiCam configuration loader.
//!
//! This test suite covers:
//! - Loading the sample configurations of both themes
//! - Documented invariants of the sample files
//! - Defaults for absent optional keys
//! - Serialization round trips
//! - Error cases naming the offending file and key
//! - The HTTP API over the sample catalog

use std::collections::BTreeMap;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use digicam_config::analysis::{DataSource, PipelineStep, RunPlan, check_consistency};
use digicam_config::api::{AppState, create_router};
use digicam_config::config::{
    AnalysisConfig, ConfigLoader, ConfigTheme, LoadOptions, LoadedConfig, schema,
};
use digicam_config::error::ConfigError;

// =============================================================================
// Test Helpers
// =============================================================================

const MPE_MC: &str = "./config/samples/mpe_mc.yaml";
const TRIGGER_FULL: &str = "./config/samples/trigger_full.yaml";

fn load(path: &str) -> LoadedConfig {
    ConfigLoader::load_file(path).expect("Failed to load sample config")
}

fn raw_mapping(path: &str) -> serde_yaml::Mapping {
    let content = std::fs::read_to_string(path).unwrap();
    serde_yaml::from_str(&content).unwrap()
}

fn create_router_for_test() -> Router {
    let catalog = ConfigLoader::load_dir("./config/samples").expect("Failed to load config");
    create_router(AppState::new(catalog))
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn post_validate(router: Router, uri: &str, yaml: String) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::from(yaml))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

// =============================================================================
// Sample files
// =============================================================================

#[test]
fn test_samples_contain_every_required_key_of_their_theme() {
    for (path, theme) in [(MPE_MC, ConfigTheme::Mpe), (TRIGGER_FULL, ConfigTheme::Trigger)] {
        let loaded = load(path);
        assert_eq!(loaded.theme(), theme, "{}", path);

        let mapping = raw_mapping(path);
        for key in schema::required_keys(theme) {
            assert!(mapping.contains_key(key), "{} lacks {}", path, key);
        }
    }
}

#[test]
fn test_mpe_mc_scan_levels_and_event_count() {
    let loaded = load(MPE_MC);
    let config = loaded.config();

    assert_eq!(config.scan_level.len(), 21);
    assert_eq!(config.scan_level, (0..=20).collect::<Vec<i64>>());
    assert_eq!(config.events_per_level, Some(10_000));
    assert_eq!(config.evt_max, Some(210_000));
    assert_eq!(
        config.evt_max.unwrap(),
        config.events_per_level.unwrap() * config.scan_level.len() as u64
    );
    assert!(check_consistency(&loaded).is_valid());
}

#[test]
fn test_trigger_full_nsb_aligned_with_scan_levels() {
    let loaded = load(TRIGGER_FULL);
    let config = loaded.config();

    assert_eq!(config.nsb_rate().len(), 9);
    assert_eq!(config.scan_level.len(), 9);
    assert!(config.nsb_aligned());
}

#[test]
fn test_missing_optional_boolean_resolves_to_default() {
    let config = load(TRIGGER_FULL).config().clone();
    assert!(!raw_mapping(TRIGGER_FULL).contains_key("mc"));
    assert_eq!(config.mc, None);
    assert!(!config.is_mc());

    let mpe = load(MPE_MC);
    assert!(mpe.config().is_mc());
}

#[test]
fn test_sample_histogram_axis() {
    let axis = load(MPE_MC).config().adc_axis().unwrap();
    assert_eq!(axis.n_bins(), 4096);
    assert_eq!(axis.bin_centers()[4095], 4095);
}

// =============================================================================
// Round trips
// =============================================================================

#[test]
fn test_round_trip_preserves_all_pairs() {
    for path in [MPE_MC, TRIGGER_FULL] {
        let loaded = load(path);
        let yaml = serde_yaml::to_string(loaded.config()).unwrap();

        let reparsed: AnalysisConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(&reparsed, loaded.config(), "{}", path);

        let original: BTreeMap<String, serde_yaml::Value> =
            serde_yaml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        let written: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(original, written, "{}", path);
    }
}

#[test]
fn test_round_trip_keeps_integer_thresholds() {
    let loaded = load(TRIGGER_FULL);
    let written = serde_yaml::to_value(loaded.config()).unwrap();
    let thresholds = written["threshold"].as_sequence().unwrap();
    assert_eq!(thresholds.len(), 20);
    assert!(thresholds.iter().all(|t| t.is_u64()));
    assert!(written["nsb_rate"][1].is_f64());
}

#[test]
fn test_round_trip_through_loader() {
    let loaded = load(TRIGGER_FULL);
    let yaml = serde_yaml::to_string(loaded.config()).unwrap();
    let reloaded =
        ConfigLoader::parse_str("trigger_full", "<memory>", &yaml, LoadOptions::default())
            .unwrap();
    assert_eq!(reloaded.config(), loaded.config());
}

// =============================================================================
// Error cases
// =============================================================================

#[test]
fn test_missing_scan_level_names_file_and_key() {
    match ConfigLoader::load_file("./tests/fixtures/missing_scan_level.yaml") {
        Err(ConfigError::MissingKey { path, key }) => {
            assert!(path.ends_with("missing_scan_level.yaml"));
            assert_eq!(key, "scan_level");
        }
        other => panic!("Expected MissingKey error, got {:?}", other),
    }
}

#[test]
fn test_scan_level_not_integers_is_type_mismatch() {
    let err = ConfigLoader::load_file("./tests/fixtures/scan_level_not_integers.yaml").unwrap_err();
    match &err {
        ConfigError::TypeMismatch {
            path,
            key,
            expected,
            ..
        } => {
            assert!(path.ends_with("scan_level_not_integers.yaml"));
            assert_eq!(key, "scan_level");
            assert_eq!(expected, "sequence of integers");
        }
        other => panic!("Expected TypeMismatch error, got {:?}", other),
    }
    assert!(err.to_string().contains("scan_level_not_integers.yaml"));
}

#[test]
fn test_broken_yaml_is_parse_error() {
    let result = ConfigLoader::load_file("./tests/fixtures/broken.yaml");
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn test_fixture_directory_fails_on_first_invalid_file() {
    assert!(ConfigLoader::load_dir("./tests/fixtures").is_err());
}

#[test]
fn test_strict_load_of_samples_succeeds() {
    for path in [MPE_MC, TRIGGER_FULL] {
        assert!(ConfigLoader::load_file_with(path, LoadOptions::strict()).is_ok());
    }
}

// =============================================================================
// Run plans
// =============================================================================

#[test]
fn test_mpe_plan() {
    let plan = RunPlan::build(&load(MPE_MC)).unwrap();

    assert_eq!(plan.data_source, DataSource::MonteCarlo);
    assert_eq!(
        plan.steps,
        vec![PipelineStep::CreateHisto, PipelineStep::PerformAnalysis]
    );
    assert_eq!(plan.input_files.len(), 1);
    assert!(plan.input_files[0].ends_with("mpe_toy_0.hdf5"));
    assert_eq!(plan.batches, Some(210));
    assert_eq!(plan.pixels.as_ref().map(Vec::len), Some(1296));
    assert_eq!(plan.scan_points.len(), 21);
    assert_eq!(plan.scan_points[20].events, Some(200_000..210_000));
    assert!(plan.artifacts.contains_key("peak_histo_filename"));
}

#[test]
fn test_trigger_plan() {
    let plan = RunPlan::build(&load(TRIGGER_FULL)).unwrap();

    assert_eq!(plan.data_source, DataSource::Camera);
    assert!(plan.blinded);
    assert!(plan.verbose);
    assert_eq!(plan.input_files.len(), 9);
    assert!(
        plan.input_files[8]
            .to_string_lossy()
            .ends_with("_012.fits.fz")
    );
    assert_eq!(plan.scan_points[8].nsb_rate, Some(1250.0));
    assert_eq!(plan.adc_axis, None);
}

// =============================================================================
// HTTP API
// =============================================================================

#[tokio::test]
async fn test_api_lists_sample_configs() {
    let (status, body) = get(create_router_for_test(), "/configs").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["mpe_mc", "trigger_full"]);
}

#[tokio::test]
async fn test_api_validates_sample_document() {
    let yaml = std::fs::read_to_string(MPE_MC).unwrap();
    let (status, body) = post_validate(create_router_for_test(), "/validate?strict=true", yaml).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theme"], "mpe");
    assert_eq!(body["config"]["evt_max"], 210_000);
    assert!(body["validation_id"].is_string());
}

#[tokio::test]
async fn test_api_rejects_inconsistent_document_in_strict_mode() {
    let yaml = std::fs::read_to_string(MPE_MC)
        .unwrap()
        .replace("evt_max: 210000", "evt_max: 200000");

    let (status, body) =
        post_validate(create_router_for_test(), "/validate", yaml.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"]["findings"][0]["code"], "EVT_MAX_MISMATCH");

    let (status, body) = post_validate(create_router_for_test(), "/validate?strict=true", yaml).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVARIANT_VIOLATION");
}

#[tokio::test]
async fn test_api_plan_for_unknown_config() {
    let (status, body) = get(create_router_for_test(), "/configs/missing/plan").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "UNKNOWN_CONFIG");
}
