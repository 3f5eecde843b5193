//! 설정 관리: stagehand.toml 파싱 및 런타임 설정
//!
//! [`StagehandConfig`]는 리소스 선언, 타깃 매핑, 실행 옵션을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`STAGEHAND_AWS_REGION=us-east-1` 형식)
//! 3. 설정 파일 (`stagehand.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), stagehand_core::error::StagehandError> {
//! use stagehand_core::config::StagehandConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = StagehandConfig::load("stagehand.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = StagehandConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, StagehandError};
use crate::types::{
    AttributeDefinition, KeyDefinition, KeyType, ResourceParams, ResourceSpec,
};

/// 기본 설정 파일 경로
pub const DEFAULT_CONFIG_PATH: &str = "stagehand.toml";

/// Stagehand 통합 설정
///
/// `stagehand.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StagehandConfig {
    /// 실행할 스위트 이름 (비어 있으면 등록된 전체)
    #[serde(default)]
    pub suites: Vec<String>,
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// AWS 연결 설정
    #[serde(default)]
    pub aws: AwsConfig,
    /// 준비 상태 대기 정책
    #[serde(default)]
    pub readiness: ReadinessConfig,
    /// 단언 비교 방식
    #[serde(default)]
    pub assertions: AssertionsConfig,
    /// 큐 선언
    #[serde(default)]
    pub queues: Vec<QueueConfig>,
    /// 버킷 선언
    #[serde(default)]
    pub buckets: Vec<BucketConfig>,
    /// 테이블 선언
    #[serde(default)]
    pub tables: Vec<TableConfig>,
    /// 타깃 ID → 핸들러 매핑
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
}

impl StagehandConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StagehandError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, StagehandError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StagehandError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                StagehandError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, StagehandError> {
        toml::from_str(toml_str).map_err(|e| {
            StagehandError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `STAGEHAND_{SECTION}_{FIELD}`
    /// 예: `STAGEHAND_READINESS_TIMEOUT_SECS=60`
    ///
    /// 리소스/타깃 선언은 파일에서만 읽습니다.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "STAGEHAND_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "STAGEHAND_GENERAL_LOG_FORMAT");
        override_opt_string(
            &mut self.general.report_path,
            "STAGEHAND_GENERAL_REPORT_PATH",
        );

        // AWS
        override_string(&mut self.aws.region, "STAGEHAND_AWS_REGION");
        override_opt_string(&mut self.aws.endpoint_url, "STAGEHAND_AWS_ENDPOINT_URL");

        // Readiness
        override_string(&mut self.readiness.mode, "STAGEHAND_READINESS_MODE");
        override_u64(
            &mut self.readiness.initial_backoff_ms,
            "STAGEHAND_READINESS_INITIAL_BACKOFF_MS",
        );
        override_u64(
            &mut self.readiness.max_backoff_ms,
            "STAGEHAND_READINESS_MAX_BACKOFF_MS",
        );
        override_u64(
            &mut self.readiness.timeout_secs,
            "STAGEHAND_READINESS_TIMEOUT_SECS",
        );

        // Assertions
        override_string(
            &mut self.assertions.comparison,
            "STAGEHAND_ASSERTIONS_COMPARISON",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), StagehandError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.aws.region.is_empty() {
            return Err(invalid("aws.region", "must not be empty"));
        }

        self.validate_readiness()?;

        let valid_comparisons = ["legacy", "union"];
        if !valid_comparisons.contains(&self.assertions.comparison.as_str()) {
            return Err(invalid(
                "assertions.comparison",
                format!("must be one of: {}", valid_comparisons.join(", ")),
            ));
        }

        self.validate_resources()?;

        for (id, target) in &self.targets {
            if target.handler.trim().is_empty() {
                return Err(invalid(
                    &format!("targets.{id}.handler"),
                    "must not be empty",
                ));
            }
        }

        if self.suites.iter().any(|s| s.trim().is_empty()) {
            return Err(invalid("suites", "suite names must not be empty"));
        }

        Ok(())
    }

    fn validate_readiness(&self) -> Result<(), StagehandError> {
        let readiness = &self.readiness;
        match readiness.mode.as_str() {
            "unbounded" => Ok(()),
            "bounded" => {
                if readiness.initial_backoff_ms == 0 {
                    return Err(invalid(
                        "readiness.initial_backoff_ms",
                        "must be greater than 0",
                    ));
                }
                if readiness.max_backoff_ms < readiness.initial_backoff_ms {
                    return Err(invalid(
                        "readiness.max_backoff_ms",
                        "must be greater than or equal to initial_backoff_ms",
                    ));
                }
                if readiness.timeout_secs == 0 {
                    return Err(invalid("readiness.timeout_secs", "must be greater than 0"));
                }
                Ok(())
            }
            _ => Err(invalid(
                "readiness.mode",
                "must be one of: bounded, unbounded",
            )),
        }
    }

    fn validate_resources(&self) -> Result<(), StagehandError> {
        // 바인딩 키는 실행 전체에서 유일해야 함
        let mut seen = HashSet::new();
        let bindings = self
            .queues
            .iter()
            .map(|q| ("queues", q.binding.as_str()))
            .chain(self.buckets.iter().map(|b| ("buckets", b.binding.as_str())))
            .chain(self.tables.iter().map(|t| ("tables", t.binding.as_str())));
        for (section, binding) in bindings {
            if binding.trim().is_empty() {
                return Err(invalid(
                    &format!("{section}.binding"),
                    "must not be empty",
                ));
            }
            if !seen.insert(binding) {
                return Err(invalid(
                    &format!("{section}.binding"),
                    format!("binding '{binding}' is declared more than once"),
                ));
            }
        }

        for table in &self.tables {
            validate_key_schema(table)?;
        }

        Ok(())
    }

    /// 선언된 리소스를 생성 순서(큐 → 버킷 → 테이블)대로 반환합니다.
    ///
    /// 버킷 리전이 생략되면 `aws.region`을 사용합니다.
    pub fn resource_specs(&self) -> Vec<ResourceSpec> {
        let queues = self.queues.iter().map(|q| ResourceSpec {
            name: q.name.clone(),
            binding: q.binding.clone(),
            params: ResourceParams::Queue { fifo: q.fifo },
        });
        let buckets = self.buckets.iter().map(|b| ResourceSpec {
            name: b.name.clone(),
            binding: b.binding.clone(),
            params: ResourceParams::Bucket {
                region: b.region.clone().unwrap_or_else(|| self.aws.region.clone()),
            },
        });
        let tables = self.tables.iter().map(|t| ResourceSpec {
            name: t.name.clone(),
            binding: t.binding.clone(),
            params: ResourceParams::Table {
                attributes: t.attributes.clone(),
                keys: t.keys.clone(),
            },
        });
        queues.chain(buckets).chain(tables).collect()
    }

    /// 준비 상태 첫 대기 간격
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.readiness.initial_backoff_ms)
    }

    /// 준비 상태 최대 대기 간격
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.readiness.max_backoff_ms)
    }

    /// 준비 상태 대기 총 한도
    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_secs(self.readiness.timeout_secs)
    }
}

fn validate_key_schema(table: &TableConfig) -> Result<(), StagehandError> {
    let field = |suffix: &str| format!("tables.{}.{suffix}", table.binding);

    let valid_types = ["S", "N", "B"];
    for attr in &table.attributes {
        if !valid_types.contains(&attr.attribute_type.as_str()) {
            return Err(invalid(
                &field("attributes"),
                format!(
                    "attribute '{}' has type '{}', must be one of: {}",
                    attr.name,
                    attr.attribute_type,
                    valid_types.join(", ")
                ),
            ));
        }
    }

    match table.keys.as_slice() {
        [hash] | [hash, _] if hash.key_type != KeyType::Hash => {
            return Err(invalid(&field("keys"), "first key must be HASH"));
        }
        [_, range] if range.key_type != KeyType::Range => {
            return Err(invalid(&field("keys"), "second key must be RANGE"));
        }
        [_] | [_, _] => {}
        _ => {
            return Err(invalid(
                &field("keys"),
                "must declare one HASH key and at most one RANGE key",
            ));
        }
    }

    for key in &table.keys {
        if !table.attributes.iter().any(|a| a.name == key.name) {
            return Err(invalid(
                &field("keys"),
                format!("key '{}' has no attribute definition", key.name),
            ));
        }
    }

    Ok(())
}

fn invalid(field: &str, reason: impl Into<String>) -> StagehandError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// JSON 실행 보고서 저장 경로
    pub report_path: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            report_path: None,
        }
    }
}

/// AWS 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// 기본 리전
    pub region: String,
    /// 엔드포인트 오버라이드 (localstack 등)
    pub endpoint_url: Option<String>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: "eu-central-1".to_owned(),
            endpoint_url: None,
        }
    }
}

/// 준비 상태 대기 정책 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// 대기 방식 (bounded, unbounded)
    pub mode: String,
    /// 첫 대기 간격 (밀리초)
    pub initial_backoff_ms: u64,
    /// 최대 대기 간격 (밀리초)
    pub max_backoff_ms: u64,
    /// 총 대기 한도 (초)
    pub timeout_secs: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            mode: "bounded".to_owned(),
            initial_backoff_ms: 200,
            max_backoff_ms: 5_000,
            timeout_secs: 300,
        }
    }
}

/// 단언 비교 방식 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssertionsConfig {
    /// 비교 방향 (legacy: 종류별 기본값, union: 양쪽 필드 합집합)
    pub comparison: String,
}

impl Default for AssertionsConfig {
    fn default() -> Self {
        Self {
            comparison: "legacy".to_owned(),
        }
    }
}

/// 큐 선언
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// 명시적 큐 이름
    #[serde(default)]
    pub name: Option<String>,
    /// 큐 URL을 바인딩할 키
    pub binding: String,
    /// FIFO 큐 여부
    #[serde(default)]
    pub fifo: bool,
}

/// 버킷 선언
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// 명시적 버킷 이름
    #[serde(default)]
    pub name: Option<String>,
    /// 버킷 이름을 바인딩할 키
    pub binding: String,
    /// 버킷 리전 (생략 시 `aws.region`)
    #[serde(default)]
    pub region: Option<String>,
}

/// 테이블 선언
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// 명시적 테이블 이름
    #[serde(default)]
    pub name: Option<String>,
    /// 테이블 이름을 바인딩할 키
    pub binding: String,
    /// 속성 정의
    #[serde(default)]
    pub attributes: Vec<AttributeDefinition>,
    /// 키 스키마
    #[serde(default)]
    pub keys: Vec<KeyDefinition>,
}

/// 타깃 선언
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// 등록된 핸들러 이름
    pub handler: String,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        // 빈 값은 설정 해제로 취급
        *target = if val.is_empty() { None } else { Some(val) };
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResourceKind;

    fn table(keys: &[(&str, KeyType)], attributes: &[(&str, &str)]) -> TableConfig {
        TableConfig {
            name: None,
            binding: "testTable".to_owned(),
            attributes: attributes
                .iter()
                .map(|(name, ty)| AttributeDefinition {
                    name: (*name).to_owned(),
                    attribute_type: (*ty).to_owned(),
                })
                .collect(),
            keys: keys
                .iter()
                .map(|(name, key_type)| KeyDefinition {
                    name: (*name).to_owned(),
                    key_type: *key_type,
                })
                .collect(),
        }
    }

    #[test]
    fn default_config_has_sane_values() {
        let config = StagehandConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.aws.region, "eu-central-1");
        assert_eq!(config.readiness.mode, "bounded");
        assert_eq!(config.readiness.timeout_secs, 300);
        assert_eq!(config.assertions.comparison, "legacy");
        assert!(config.queues.is_empty());
        assert!(config.targets.is_empty());
    }

    #[test]
    fn default_config_passes_validation() {
        StagehandConfig::default().validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = StagehandConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.aws.region, "eu-central-1");
    }

    #[test]
    fn from_str_full_toml() {
        let toml = r#"
suites = ["inventory"]

[general]
log_level = "debug"
log_format = "json"
report_path = "target/stagehand-report.json"

[aws]
region = "us-east-1"
endpoint_url = "http://localhost:4566"

[readiness]
mode = "unbounded"

[assertions]
comparison = "union"

[[queues]]
binding = "testSqsUrl"
fifo = true

[[buckets]]
name = "inventory-logs"
binding = "testBucket"

[[tables]]
binding = "testTable"
attributes = [{ name = "Products", type = "S" }]
keys = [{ name = "Products", key_type = "HASH" }]

[targets.updateInventory]
handler = "update_inventory"
"#;
        let config = StagehandConfig::parse(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.suites, vec!["inventory"]);
        assert_eq!(config.general.report_path.as_deref(), Some("target/stagehand-report.json"));
        assert_eq!(config.aws.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert_eq!(config.readiness.mode, "unbounded");
        assert!(config.queues[0].fifo);
        assert_eq!(config.buckets[0].name.as_deref(), Some("inventory-logs"));
        assert_eq!(config.tables[0].keys[0].key_type, KeyType::Hash);
        assert_eq!(config.targets["updateInventory"].handler, "update_inventory");
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let err = StagehandConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            StagehandError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn resource_specs_follow_queue_bucket_table_order() {
        let mut config = StagehandConfig::default();
        config.tables.push(table(&[("id", KeyType::Hash)], &[("id", "S")]));
        config.buckets.push(BucketConfig {
            name: None,
            binding: "testBucket".to_owned(),
            region: None,
        });
        config.queues.push(QueueConfig {
            name: None,
            binding: "testSqsUrl".to_owned(),
            fifo: false,
        });

        let kinds: Vec<_> = config.resource_specs().iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![ResourceKind::Queue, ResourceKind::Bucket, ResourceKind::Table]
        );
    }

    #[test]
    fn bucket_region_defaults_to_aws_region() {
        let mut config = StagehandConfig::default();
        config.aws.region = "ap-northeast-2".to_owned();
        config.buckets.push(BucketConfig {
            name: None,
            binding: "b".to_owned(),
            region: None,
        });
        let specs = config.resource_specs();
        assert_eq!(
            specs[0].params,
            ResourceParams::Bucket {
                region: "ap-northeast-2".to_owned()
            }
        );
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = StagehandConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_unknown_readiness_mode() {
        let mut config = StagehandConfig::default();
        config.readiness.mode = "forever".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("readiness.mode"));
    }

    #[test]
    fn validate_rejects_zero_timeout_when_bounded() {
        let mut config = StagehandConfig::default();
        config.readiness.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn validate_accepts_zero_timeout_when_unbounded() {
        let mut config = StagehandConfig::default();
        config.readiness.mode = "unbounded".to_owned();
        config.readiness.timeout_secs = 0;
        // unbounded 모드에서는 backoff 값 검증을 건너뜀
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_max_backoff_below_initial() {
        let mut config = StagehandConfig::default();
        config.readiness.initial_backoff_ms = 1_000;
        config.readiness.max_backoff_ms = 10;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_backoff_ms"));
    }

    #[test]
    fn validate_rejects_unknown_comparison() {
        let mut config = StagehandConfig::default();
        config.assertions.comparison = "strict".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("comparison"));
    }

    #[test]
    fn validate_rejects_duplicate_binding_across_kinds() {
        let mut config = StagehandConfig::default();
        config.queues.push(QueueConfig {
            name: None,
            binding: "shared".to_owned(),
            fifo: false,
        });
        config.buckets.push(BucketConfig {
            name: None,
            binding: "shared".to_owned(),
            region: None,
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("declared more than once"));
    }

    #[test]
    fn validate_rejects_range_key_first() {
        let mut config = StagehandConfig::default();
        config
            .tables
            .push(table(&[("id", KeyType::Range)], &[("id", "S")]));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("first key must be HASH"));
    }

    #[test]
    fn validate_rejects_key_without_attribute() {
        let mut config = StagehandConfig::default();
        config
            .tables
            .push(table(&[("id", KeyType::Hash)], &[("other", "S")]));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no attribute definition"));
    }

    #[test]
    fn validate_rejects_empty_key_schema() {
        let mut config = StagehandConfig::default();
        config.tables.push(table(&[], &[("id", "S")]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_hash_and_range() {
        let mut config = StagehandConfig::default();
        config.tables.push(table(
            &[("pk", KeyType::Hash), ("sk", KeyType::Range)],
            &[("pk", "S"), ("sk", "N")],
        ));
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_empty_handler() {
        let mut config = StagehandConfig::default();
        config.targets.insert(
            "fn".to_owned(),
            TargetConfig {
                handler: " ".to_owned(),
            },
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("targets.fn.handler"));
    }

    #[test]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_STAGEHAND_STR", "overridden") };
        override_string(&mut val, "TEST_STAGEHAND_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_STAGEHAND_STR") };
    }

    #[test]
    fn env_override_empty_clears_optional() {
        let mut val = Some("report.json".to_owned());
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_STAGEHAND_OPT", "") };
        override_opt_string(&mut val, "TEST_STAGEHAND_OPT");
        assert!(val.is_none());
        unsafe { std::env::remove_var("TEST_STAGEHAND_OPT") };
    }

    #[test]
    fn env_override_u64_invalid_keeps_original() {
        let mut val = 300;
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_STAGEHAND_U64_BAD", "soon") };
        override_u64(&mut val, "TEST_STAGEHAND_U64_BAD");
        assert_eq!(val, 300); // 원래 값 유지
        unsafe { std::env::remove_var("TEST_STAGEHAND_U64_BAD") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "keep".to_owned();
        override_string(&mut val, "TEST_STAGEHAND_DEFINITELY_NOT_SET");
        assert_eq!(val, "keep");
    }
}
