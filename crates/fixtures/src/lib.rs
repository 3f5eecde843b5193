//! Stagehand 리소스 수명주기와 소비형 읽기 단언
//!
//! # Module Structure
//!
//! - [`backend`]: 클라우드 서비스 추상화 (`ObjectStore`, `TableStore`, `MessageQueue`)
//! - [`aws`]: 실제 AWS 백엔드 (`AwsBackend`)
//! - [`memory`]: 메모리 백엔드 (`MemoryBackend`, 테스트 더블 겸 드라이런 대상)
//! - [`naming`]: 리소스 명명 규칙과 이름 생성
//! - [`readiness`]: 준비 상태 대기 정책 (`ReadinessPolicy`)
//! - [`bindings`]: 실행 전역 바인딩 테이블 (`Bindings`)
//! - [`provision`]: 리소스 생성 (`Provisioner`)
//! - [`teardown`]: 리소스 삭제 (`Deprovisioner`, `TeardownMode`)
//! - [`probe`]: 소비형 읽기 단언 (`BucketProbe`, `TableProbe`, `QueueProbe`)
//!
//! # Architecture
//!
//! ```text
//! [ResourceSpec] --> Provisioner --create/poll--> Backend
//!                         |
//!                     Bindings (key -> name / url)
//!                         |
//!              suites --> probes --read/delete--> Backend
//!                         |
//!                   Deprovisioner --delete--> Backend
//! ```

pub mod aws;
pub mod backend;
pub mod bindings;
pub mod memory;
pub mod naming;
pub mod probe;
pub mod provision;
pub mod readiness;
pub mod teardown;

// --- Public API Re-exports ---

// Backends
pub use aws::AwsBackend;
pub use backend::{Backend, MessageQueue, ObjectStore, OutgoingMessage, ReceivedMessage, TableStore};
pub use memory::MemoryBackend;

// Lifecycle
pub use bindings::Bindings;
pub use provision::{ProvisionState, ProvisionedResource, Provisioner};
pub use readiness::ReadinessPolicy;
pub use teardown::{Deprovisioner, TeardownMode};

// Probes
pub use probe::{
    BucketProbe, ComparisonMode, ComparisonPolicy, Observed, Presence, QueueProbe, ReadMode,
    RecordObservation, TableProbe,
};
