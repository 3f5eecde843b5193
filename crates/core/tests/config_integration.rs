//! stagehand.toml 통합 설정 테스트
//!
//! - stagehand.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use std::io::Write;

use stagehand_core::config::StagehandConfig;
use stagehand_core::error::{ConfigError, StagehandError};
use stagehand_core::types::{ResourceKind, ResourceParams};

const EXAMPLE: &str = include_str!("../../../stagehand.toml.example");

// =============================================================================
// stagehand.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let config = StagehandConfig::parse(EXAMPLE).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "pretty");
    assert!(config.general.report_path.is_none());
    assert_eq!(config.aws.region, "eu-central-1");
    assert!(config.suites.is_empty());
}

#[test]
fn example_config_passes_validation() {
    let config = StagehandConfig::parse(EXAMPLE).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_code_defaults() {
    let from_file = StagehandConfig::parse(EXAMPLE).expect("should parse");
    let from_code = StagehandConfig::default();

    assert_eq!(from_file.general.log_level, from_code.general.log_level);
    assert_eq!(from_file.general.log_format, from_code.general.log_format);
    assert_eq!(from_file.aws.region, from_code.aws.region);
    assert_eq!(from_file.readiness.mode, from_code.readiness.mode);
    assert_eq!(
        from_file.readiness.initial_backoff_ms,
        from_code.readiness.initial_backoff_ms
    );
    assert_eq!(
        from_file.readiness.max_backoff_ms,
        from_code.readiness.max_backoff_ms
    );
    assert_eq!(
        from_file.readiness.timeout_secs,
        from_code.readiness.timeout_secs
    );
    assert_eq!(
        from_file.assertions.comparison,
        from_code.assertions.comparison
    );
}

#[test]
fn example_config_declares_inventory_resources() {
    let config = StagehandConfig::parse(EXAMPLE).expect("should parse");
    let specs = config.resource_specs();

    assert_eq!(specs.len(), 3);
    assert_eq!(specs[0].kind(), ResourceKind::Queue);
    assert!(specs[0].is_fifo());
    assert_eq!(specs[1].binding, "testBucket");
    assert_eq!(
        specs[1].params,
        ResourceParams::Bucket {
            region: "eu-central-1".to_owned()
        }
    );
    assert_eq!(specs[2].binding, "testDynamoTable");
    assert_eq!(
        config.targets["inventory-lambda"].handler,
        "update_inventory"
    );
}

// =============================================================================
// 부분 설정 로딩 테스트
// =============================================================================

#[test]
fn partial_config_general_only() {
    let toml = r#"
[general]
log_level = "debug"
"#;
    let config = StagehandConfig::parse(toml).expect("should parse");
    assert_eq!(config.general.log_level, "debug");
    // 나머지는 기본값
    assert_eq!(config.general.log_format, "pretty");
    assert_eq!(config.readiness.timeout_secs, 300);
    assert!(config.queues.is_empty());
}

#[test]
fn partial_config_resources_only() {
    let toml = r#"
[[queues]]
name = "orders"
binding = "ordersUrl"

[[queues]]
binding = "eventsUrl"
fifo = true
"#;
    let config = StagehandConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");
    assert_eq!(config.queues.len(), 2);
    assert_eq!(config.queues[0].name.as_deref(), Some("orders"));
    assert!(!config.queues[0].fifo);
    assert!(config.queues[1].fifo);
}

#[test]
fn table_without_keys_fails_validation() {
    let toml = r#"
[[tables]]
binding = "t"
attributes = [{ name = "id", type = "S" }]
"#;
    let config = StagehandConfig::parse(toml).expect("should parse");
    let err = config.validate().unwrap_err();
    assert!(matches!(
        err,
        StagehandError::Config(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn missing_binding_is_parse_error() {
    let toml = r#"
[[buckets]]
name = "logs"
"#;
    assert!(matches!(
        StagehandConfig::parse(toml).unwrap_err(),
        StagehandError::Config(ConfigError::ParseFailed { .. })
    ));
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[general]
log_level = "info"
"#;

    let original = std::env::var("STAGEHAND_GENERAL_LOG_LEVEL").ok();
    // SAFETY: 테스트는 serial로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("STAGEHAND_GENERAL_LOG_LEVEL", "error");
    }

    let mut config = StagehandConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let result = config.general.log_level.clone();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("STAGEHAND_GENERAL_LOG_LEVEL", val),
            None => std::env::remove_var("STAGEHAND_GENERAL_LOG_LEVEL"),
        }
    }

    assert_eq!(result, "error");
}

#[test]
#[serial_test::serial]
fn env_override_numeric_field() {
    let original = std::env::var("STAGEHAND_READINESS_TIMEOUT_SECS").ok();
    // SAFETY: 테스트는 serial로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("STAGEHAND_READINESS_TIMEOUT_SECS", "42");
    }

    let mut config = StagehandConfig::parse("").expect("should parse");
    config.apply_env_overrides();
    let result = config.readiness.timeout_secs;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("STAGEHAND_READINESS_TIMEOUT_SECS", val),
            None => std::env::remove_var("STAGEHAND_READINESS_TIMEOUT_SECS"),
        }
    }

    assert_eq!(result, 42);
}

#[test]
#[serial_test::serial]
fn env_override_sets_endpoint_url() {
    let original = std::env::var("STAGEHAND_AWS_ENDPOINT_URL").ok();
    // SAFETY: 테스트는 serial로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("STAGEHAND_AWS_ENDPOINT_URL", "http://localhost:4566");
    }

    let mut config = StagehandConfig::parse("").expect("should parse");
    config.apply_env_overrides();
    let result = config.aws.endpoint_url.clone();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("STAGEHAND_AWS_ENDPOINT_URL", val),
            None => std::env::remove_var("STAGEHAND_AWS_ENDPOINT_URL"),
        }
    }

    assert_eq!(result.as_deref(), Some("http://localhost:4566"));
}

#[tokio::test]
#[serial_test::serial]
async fn load_rejects_invalid_env_override() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(b"[assertions]\ncomparison = \"legacy\"\n")
        .expect("write config");

    let original = std::env::var("STAGEHAND_ASSERTIONS_COMPARISON").ok();
    // SAFETY: 테스트는 serial로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("STAGEHAND_ASSERTIONS_COMPARISON", "fuzzy");
    }

    let result = StagehandConfig::load(file.path()).await;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("STAGEHAND_ASSERTIONS_COMPARISON", val),
            None => std::env::remove_var("STAGEHAND_ASSERTIONS_COMPARISON"),
        }
    }

    let err = result.unwrap_err();
    assert!(err.to_string().contains("assertions.comparison"));
}

// =============================================================================
// 빈 파일 / 잘못된 형식 에러 테스트
// =============================================================================

#[test]
fn whitespace_only_parses_with_defaults() {
    let config = StagehandConfig::parse("   \n\n  \t  ").expect("whitespace should parse");
    config.validate().expect("should validate");
    assert_eq!(config.general.log_level, "info");
}

#[test]
fn wrong_type_for_numeric_field() {
    let toml = r#"
[readiness]
timeout_secs = "five minutes"
"#;
    assert!(matches!(
        StagehandConfig::parse(toml).unwrap_err(),
        StagehandError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[tokio::test]
async fn from_file_nonexistent_returns_file_not_found() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = StagehandConfig::from_file(dir.path().join("missing.toml")).await;
    assert!(matches!(
        result.unwrap_err(),
        StagehandError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[tokio::test]
async fn load_from_temp_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(EXAMPLE.as_bytes()).expect("write config");

    let config = StagehandConfig::load(file.path()).await.expect("should load");
    assert_eq!(config.tables.len(), 1);
}

// =============================================================================
// 직렬화 라운드트립 테스트
// =============================================================================

#[test]
fn serialize_and_reparse_example() {
    let original = StagehandConfig::parse(EXAMPLE).expect("should parse");
    let toml_str = toml::to_string_pretty(&original).expect("should serialize");
    let parsed = StagehandConfig::parse(&toml_str).expect("should reparse");
    parsed.validate().expect("reparsed should validate");

    assert_eq!(original.queues, parsed.queues);
    assert_eq!(original.tables, parsed.tables);
    assert_eq!(original.targets, parsed.targets);
}
