//! Stagehand 스위트 실행 엔진
//!
//! # Module Structure
//!
//! - [`suite`]: BDD 스타일 스위트 실행 (`Engine`, `Suite`, `SuiteContext`)
//! - [`invoker`]: 테스트 대상 함수 등록과 호출 (`TargetRegistry`, `Target`)
//! - [`harness`]: 테스트 본문에 전달되는 핸들 (`Harness`)
//! - [`catalog`]: 스위트 등록부 (`SuiteCatalog`, `SuitePack`)
//! - [`run`]: 실행 오케스트레이션 (provision → suites → teardown)
//! - [`error`]: 실행 중단 에러 (`RunAbort`, `SuiteAbort`)
//!
//! # Architecture
//!
//! ```text
//! config ──> TargetRegistry::resolve ──> Provisioner ──> Bindings
//!                                                          │
//!                       ┌──────────────────────────────────┘
//!                       ▼
//!                    Harness ──> Engine::describe(suite) ──> SuiteResult
//!                                                          │
//!                                        Deprovisioner <───┘ (항상 실행)
//! ```

use std::future::Future;
use std::pin::Pin;

pub mod catalog;
pub mod error;
pub mod harness;
pub mod invoker;
pub mod run;
pub mod suite;

/// 힙에 할당된 `Send` 퓨처
///
/// 훅, 테스트 본문, 핸들러처럼 동적으로 저장되는 async 클로저의 반환 타입입니다.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// --- Public API Re-exports ---

pub use catalog::{SuiteBody, SuiteCatalog, SuitePack};
pub use error::{RegistryError, RunAbort, SuiteAbort};
pub use harness::Harness;
pub use invoker::{
    Handler, Invocation, InvocationContext, ResolvedTargets, Target, TargetError, TargetRegistry,
};
pub use run::{RunOptions, run, teardown_only};
pub use suite::{Engine, Hook, Suite, SuiteContext};
