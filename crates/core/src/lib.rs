//! Stagehand 공통 크레이트
//!
//! 에러 분류, `stagehand.toml` 설정, 리소스/결과 데이터 모델, 메트릭 이름을
//! 정의합니다. 다른 모든 크레이트가 이 크레이트에 의존합니다.

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{CheckError, ConfigError, ProvisionError, ServiceError, StagehandError};

// 설정
pub use config::StagehandConfig;

// 도메인 타입
pub use types::{
    AttributeMap, AttributeValue, ObservedRecord, ReadinessState, ResourceKind, ResourceParams,
    ResourceSpec, RunReport, SuiteResult, TestResult,
};
