//! 도메인 타입: 시스템 전역에서 사용되는 공통 타입
//!
//! 리소스 선언([`ResourceSpec`]), 관찰 결과([`ObservedRecord`]),
//! 실행 결과([`SuiteResult`], [`TestResult`], [`RunReport`])를 정의합니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ─── 리소스 선언 ──────────────────────────────────────────────────────

/// 리소스 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// 메시지 큐 (SQS)
    Queue,
    /// 오브젝트 스토어 버킷 (S3)
    Bucket,
    /// 테이블 스토어 (DynamoDB)
    Table,
}

impl ResourceKind {
    /// 메트릭 레이블 등에 쓰이는 소문자 이름
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queue => "queue",
            Self::Bucket => "bucket",
            Self::Table => "table",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 테이블 속성 정의 (`AttributeName` / `AttributeType`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// 속성 이름
    pub name: String,
    /// 속성 타입: `S`, `N`, `B`
    #[serde(rename = "type")]
    pub attribute_type: String,
}

/// 키 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyType {
    /// 파티션 키
    Hash,
    /// 정렬 키
    Range,
}

/// 테이블 키 스키마 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDefinition {
    /// 키 속성 이름
    pub name: String,
    /// 키 종류
    pub key_type: KeyType,
}

/// 리소스 종류별 생성 파라미터
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceParams {
    /// 큐 생성 파라미터
    Queue { fifo: bool },
    /// 버킷 생성 파라미터
    Bucket { region: String },
    /// 테이블 생성 파라미터
    Table {
        attributes: Vec<AttributeDefinition>,
        keys: Vec<KeyDefinition>,
    },
}

/// 하나의 리소스에 대한 선언
///
/// 설정에서 한 번 읽히며 실행 동안 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    /// 명시적 이름 (없으면 생성됨)
    pub name: Option<String>,
    /// 주소를 바인딩할 키
    pub binding: String,
    /// 생성 파라미터
    pub params: ResourceParams,
}

impl ResourceSpec {
    /// 리소스 종류를 반환합니다.
    pub fn kind(&self) -> ResourceKind {
        match self.params {
            ResourceParams::Queue { .. } => ResourceKind::Queue,
            ResourceParams::Bucket { .. } => ResourceKind::Bucket,
            ResourceParams::Table { .. } => ResourceKind::Table,
        }
    }

    /// FIFO 큐 여부 (큐가 아니면 `false`)
    pub fn is_fifo(&self) -> bool {
        matches!(self.params, ResourceParams::Queue { fifo: true })
    }
}

/// 서비스가 보고하는 리소스 준비 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessState {
    /// 생성 중
    Creating,
    /// 사용 가능
    Active,
    /// 변경/삭제 중
    Transitioning,
    /// 알 수 없음
    Unknown,
}

// ─── 테이블 값 ────────────────────────────────────────────────────────

/// 테이블 속성 값
///
/// 스칼라 타입만 지원합니다. 문자열/숫자는 서비스와 동일하게 텍스트로 보관합니다.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttributeValue {
    /// 문자열 (`S`)
    S(String),
    /// 숫자 (`N`), 텍스트 표현
    N(String),
    /// 불리언 (`BOOL`)
    Bool(bool),
    /// 널 (`NULL`)
    Null,
}

impl AttributeValue {
    /// 문자열 값을 생성합니다.
    pub fn s(value: impl Into<String>) -> Self {
        Self::S(value.into())
    }

    /// 숫자 값을 생성합니다.
    pub fn n(value: impl ToString) -> Self {
        Self::N(value.to_string())
    }

    /// 타입 태그를 벗긴 스칼라 텍스트
    pub fn as_scalar(&self) -> String {
        match self {
            Self::S(s) | Self::N(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Null => "null".to_owned(),
        }
    }
}

/// 테이블 아이템/키 (속성 이름 → 값)
pub type AttributeMap = BTreeMap<String, AttributeValue>;

// ─── 관찰 결과 ────────────────────────────────────────────────────────

/// 서비스에서 읽어온 상태의 통일된 표현 (필드 이름 → 스칼라 텍스트)
///
/// 오브젝트 내용, 테이블 행, 큐 메시지 모두 이 형태로 비교됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObservedRecord {
    fields: BTreeMap<String, String>,
}

impl ObservedRecord {
    /// 빈 레코드를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 필드를 추가합니다.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// 테이블 아이템에서 타입 태그를 벗겨 레코드를 만듭니다.
    pub fn from_item(item: &AttributeMap) -> Self {
        item.iter()
            .map(|(name, value)| (name.clone(), value.as_scalar()))
            .collect()
    }

    /// 필드 값을 조회합니다.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// 필드 순회 (이름 순)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 필드 개수
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 필드가 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ObservedRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for ObservedRecord {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl fmt::Display for ObservedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v:?}")?;
        }
        write!(f, "}}")
    }
}

// ─── 실행 결과 ────────────────────────────────────────────────────────

/// 개별 테스트 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// 테스트 이름
    pub name: String,
    /// 소요 시간 (초)
    pub elapsed_secs: f64,
    /// 실패 메시지 (성공 시 `None`)
    pub failure: Option<String>,
}

impl TestResult {
    /// 통과 여부
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// 스위트 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteResult {
    /// 스위트 이름
    pub name: String,
    /// 정의 위치 (소스 파일)
    pub location: String,
    /// 전체 소요 시간 (초)
    pub elapsed_secs: f64,
    /// 통과한 테스트 수
    pub passed: usize,
    /// 실패한 테스트 수
    pub failed: usize,
    /// 테스트 결과 (실행 순서)
    pub tests: Vec<TestResult>,
    /// 훅 실패로 중단된 경우 그 사유
    pub aborted: Option<String>,
}

impl SuiteResult {
    /// 수집된 테스트 결과로 스위트 결과를 확정합니다.
    pub fn finalize(
        name: impl Into<String>,
        location: impl Into<String>,
        elapsed_secs: f64,
        tests: Vec<TestResult>,
        aborted: Option<String>,
    ) -> Self {
        let passed = tests.iter().filter(|t| t.passed()).count();
        let failed = tests.len() - passed;
        Self {
            name: name.into(),
            location: location.into(),
            elapsed_secs,
            passed,
            failed,
            tests,
            aborted,
        }
    }
}

/// 실행 전체 결과
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// 실행 ID
    pub run_id: String,
    /// 실행 시작 시각 (RFC 3339)
    pub started_at: String,
    /// 스위트 결과 (실행 순서)
    pub suites: Vec<SuiteResult>,
    /// 실행을 중단시킨 치명적 에러
    pub fatal: Option<String>,
}

impl RunReport {
    /// 전체 통과 테스트 수
    pub fn passed(&self) -> usize {
        self.suites.iter().map(|s| s.passed).sum()
    }

    /// 전체 실패 테스트 수
    pub fn failed(&self) -> usize {
        self.suites.iter().map(|s| s.failed).sum()
    }

    /// 중단된 스위트 수
    pub fn aborted(&self) -> usize {
        self.suites.iter().filter(|s| s.aborted.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_kind_display() {
        assert_eq!(ResourceKind::Queue.to_string(), "queue");
        assert_eq!(ResourceKind::Bucket.to_string(), "bucket");
        assert_eq!(ResourceKind::Table.to_string(), "table");
    }

    #[test]
    fn spec_kind_follows_params() {
        let spec = ResourceSpec {
            name: None,
            binding: "testSqsUrl".to_owned(),
            params: ResourceParams::Queue { fifo: true },
        };
        assert_eq!(spec.kind(), ResourceKind::Queue);
        assert!(spec.is_fifo());

        let bucket = ResourceSpec {
            name: Some("logs".to_owned()),
            binding: "testBucket".to_owned(),
            params: ResourceParams::Bucket {
                region: "eu-central-1".to_owned(),
            },
        };
        assert_eq!(bucket.kind(), ResourceKind::Bucket);
        assert!(!bucket.is_fifo());
    }

    #[test]
    fn observed_record_flattens_attribute_values() {
        let mut item = AttributeMap::new();
        item.insert("Products".to_owned(), AttributeValue::s("table"));
        item.insert("quantity".to_owned(), AttributeValue::n(20));
        item.insert("archived".to_owned(), AttributeValue::Bool(false));

        let record = ObservedRecord::from_item(&item);
        assert_eq!(record.get("Products"), Some("table"));
        assert_eq!(record.get("quantity"), Some("20"));
        assert_eq!(record.get("archived"), Some("false"));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn observed_record_display_is_sorted() {
        let record = ObservedRecord::new().with("b", "2").with("a", "1");
        assert_eq!(record.to_string(), r#"{a: "1", b: "2"}"#);
    }

    #[test]
    fn suite_result_counts_passed_and_failed() {
        let tests = vec![
            TestResult {
                name: "ok".to_owned(),
                elapsed_secs: 0.1,
                failure: None,
            },
            TestResult {
                name: "bad".to_owned(),
                elapsed_secs: 0.2,
                failure: Some("boom".to_owned()),
            },
        ];
        let suite = SuiteResult::finalize("suite", "suites/a.rs", 0.3, tests, None);
        assert_eq!(suite.passed, 1);
        assert_eq!(suite.failed, 1);
    }

    #[test]
    fn run_report_aggregates_suites() {
        let suite = SuiteResult::finalize("s", "l", 0.0, Vec::new(), Some("hook".to_owned()));
        let report = RunReport {
            run_id: "r".to_owned(),
            started_at: "2026-01-01T00:00:00Z".to_owned(),
            suites: vec![suite.clone(), suite],
            fatal: None,
        };
        assert_eq!(report.passed(), 0);
        assert_eq!(report.failed(), 0);
        assert_eq!(report.aborted(), 2);
    }

    #[test]
    fn key_type_deserializes_uppercase() {
        let key: KeyDefinition = toml::from_str("name = \"Products\"\nkey_type = \"HASH\"").unwrap();
        assert_eq!(key.key_type, KeyType::Hash);
    }
}
