//! 에러 타입: 도메인별 에러 정의
//!
//! 실행을 중단시키는 에러([`StagehandError`])와 개별 테스트만 실패시키는
//! 에러([`CheckError`])를 구분합니다.

use crate::types::ResourceKind;

/// Stagehand 최상위 에러 타입
///
/// 이 에러가 발생하면 실행(run)을 계속할 수 없습니다.
#[derive(Debug, thiserror::Error)]
pub enum StagehandError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 리소스 생성/삭제 에러
    #[error("provision error: {0}")]
    Provision(#[from] ProvisionError),

    /// 외부 서비스 호출 에러
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StagehandError {
    /// 에러가 발생한 위치 라벨을 반환합니다.
    ///
    /// 치명적 에러 출력 시 메시지 앞줄에 표시됩니다.
    pub fn location(&self) -> &str {
        match self {
            Self::Config(_) => "Loading configuration:",
            Self::Provision(e) => e.location(),
            Self::Service(_) => "Calling cloud service:",
            Self::Io(_) => "Reading or writing files:",
        }
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// 등록되지 않은 핸들러를 참조하는 타깃
    #[error("target '{target}' refers to unknown handler '{handler}'")]
    UnknownHandler { target: String, handler: String },

    /// 등록되지 않은 스위트 이름
    #[error("unknown suite '{0}'")]
    UnknownSuite(String),
}

/// 리소스 수명주기 에러
///
/// 모든 variant는 실행을 중단시키는 치명적 에러입니다.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// 명시적으로 지정된 이름이 명명 규칙을 위반함
    #[error("{rule}")]
    InvalidName {
        /// 작업 컨텍스트 라벨
        location: String,
        /// 위반한 규칙 설명
        rule: String,
    },

    /// 서비스가 생성 요청을 거부함
    #[error("could not create {kind} '{name}': {reason}")]
    CreateRejected {
        /// 작업 컨텍스트 라벨
        location: String,
        /// 리소스 종류
        kind: ResourceKind,
        /// 리소스 이름
        name: String,
        /// 서비스가 돌려준 원인
        reason: String,
    },

    /// 준비 상태 대기 시간 초과
    #[error("{kind} '{name}' was not ready after {waited_ms} ms ({polls} polls)")]
    ReadinessTimeout {
        kind: ResourceKind,
        name: String,
        waited_ms: u64,
        polls: u64,
    },

    /// 바인딩 키 충돌
    #[error("binding '{key}' is already bound")]
    DuplicateBinding { key: String },

    /// 준비 상태 조회 실패
    #[error("readiness check failed: {0}")]
    Readiness(#[from] ServiceError),

    /// 실행 종료 시 teardown 실패
    #[error("teardown failed for {} resource(s): {}", failures.len(), failures.join("; "))]
    TeardownFailed { failures: Vec<String> },
}

impl ProvisionError {
    /// 에러 위치 라벨
    pub fn location(&self) -> &str {
        match self {
            Self::InvalidName { location, .. } | Self::CreateRejected { location, .. } => location,
            Self::ReadinessTimeout { .. } | Self::Readiness(_) => "Waiting for resource readiness:",
            Self::DuplicateBinding { .. } => "Binding resource addresses:",
            Self::TeardownFailed { .. } => "Tearing down resources:",
        }
    }
}

/// 외부 서비스 호출 실패
///
/// "리소스 없음"은 에러가 아니라 `Option::None`으로 표현되므로
/// 이 타입은 그 외의 실패만 담습니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} on '{resource}' failed: {reason}")]
pub struct ServiceError {
    /// 서비스 작업명 (예: `get_object`)
    pub operation: String,
    /// 대상 리소스
    pub resource: String,
    /// 하위 원인
    pub reason: String,
}

impl ServiceError {
    /// 새 서비스 에러를 생성합니다.
    pub fn new(
        operation: impl Into<String>,
        resource: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self {
            operation: operation.into(),
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }
}

/// 테스트 본문과 훅에서 반환하는 에러
///
/// `Fatal`을 제외한 모든 variant는 해당 테스트만 실패로 기록합니다.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// 단언 실패
    #[error("{0}")]
    Assertion(String),

    /// 관찰 중 서비스 호출 실패
    #[error("{0}")]
    Service(#[from] ServiceError),

    /// 테스트 대상 함수가 에러를 반환함
    #[error("target '{target}' returned an error: {reason}")]
    Target { target: String, reason: String },

    /// 실행 전체를 중단해야 하는 에러 (미등록 타깃, 미바인딩 키 등)
    #[error("{location} {reason}")]
    Fatal { location: String, reason: String },
}

impl CheckError {
    /// 단언 실패 에러를 생성합니다.
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    /// 실행 전체를 중단해야 하는지 여부
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}
