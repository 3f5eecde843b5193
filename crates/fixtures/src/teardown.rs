//! 리소스 삭제
//!
//! 삭제 순서는 버킷 → 테이블 → 큐 입니다.
//!
//! - 버킷: 객체를 모두 지운 뒤 버킷 삭제
//! - 테이블: 삭제 전 안정(`Active`) 상태까지 대기
//! - 큐: URL을 확인한 뒤 삭제
//!
//! [`TeardownMode::RunEnd`]는 실패를 모아 [`ProvisionError::TeardownFailed`]로
//! 보고하고, [`TeardownMode::Explicit`]는 경고만 남기고 계속 진행합니다.

use stagehand_core::error::{ProvisionError, StagehandError};
use stagehand_core::metrics as m;
use stagehand_core::types::{ReadinessState, ResourceKind, ResourceSpec};
use tracing::{error, info, warn};

use crate::backend::Backend;
use crate::provision::ProvisionedResource;
use crate::readiness::ReadinessPolicy;

/// 삭제 실패 처리 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownMode {
    /// 실행 종료 시 삭제: 실패를 수집해 에러로 반환
    RunEnd,
    /// 명시적 삭제 명령 또는 롤백: 실패는 경고로 기록
    Explicit,
}

/// 삭제 대상
#[derive(Debug, Clone, PartialEq, Eq)]
struct TeardownTarget {
    kind: ResourceKind,
    name: String,
    /// 이미 알고 있는 큐 URL
    address: Option<String>,
    /// 이번 실행에서 생성이 확인된 리소스인지 여부
    known: bool,
}

fn kind_rank(kind: ResourceKind) -> u8 {
    match kind {
        ResourceKind::Bucket => 0,
        ResourceKind::Table => 1,
        ResourceKind::Queue => 2,
    }
}

/// 삭제 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Removal {
    Deleted,
    Missing,
}

/// 리소스 삭제기
pub struct Deprovisioner<'a, B: Backend> {
    backend: &'a B,
    policy: ReadinessPolicy,
    mode: TeardownMode,
}

impl<'a, B: Backend> Deprovisioner<'a, B> {
    /// 새 삭제기를 생성합니다.
    pub fn new(backend: &'a B, policy: ReadinessPolicy, mode: TeardownMode) -> Self {
        Self {
            backend,
            policy,
            mode,
        }
    }

    /// 이번 실행에서 생성한 리소스를 삭제합니다.
    pub async fn teardown_resources(
        &self,
        resources: &[ProvisionedResource],
    ) -> Result<(), ProvisionError> {
        let targets = resources
            .iter()
            .map(|r| TeardownTarget {
                kind: r.kind(),
                name: r.name().to_owned(),
                address: r.known_address().map(str::to_owned),
                known: true,
            })
            .collect();
        self.run(targets).await
    }

    /// 설정에 선언된 (이름이 고정된) 리소스를 삭제합니다.
    ///
    /// 이름 없이 선언된 리소스는 삭제할 대상을 알 수 없으므로 건너뜁니다.
    pub async fn teardown_specs(&self, specs: &[ResourceSpec]) -> Result<(), ProvisionError> {
        let targets = specs
            .iter()
            .filter_map(|spec| match &spec.name {
                Some(name) => Some(TeardownTarget {
                    kind: spec.kind(),
                    name: name.clone(),
                    address: None,
                    known: false,
                }),
                None => {
                    warn!(
                        kind = %spec.kind(),
                        binding = spec.binding.as_str(),
                        "resource has no fixed name, skipping teardown"
                    );
                    None
                }
            })
            .collect();
        self.run(targets).await
    }

    async fn run(&self, mut targets: Vec<TeardownTarget>) -> Result<(), ProvisionError> {
        targets.sort_by_key(|t| kind_rank(t.kind));

        let mut failures = Vec::new();
        for target in &targets {
            match self.remove(target).await {
                Ok(Removal::Deleted) => {
                    info!(kind = %target.kind, name = target.name.as_str(), "resource deleted");
                }
                Ok(Removal::Missing) => {
                    warn!(
                        kind = %target.kind,
                        name = target.name.as_str(),
                        "resource not found, skipping"
                    );
                }
                Err(err) => {
                    metrics::counter!(m::TEARDOWN_FAILURES_TOTAL, m::LABEL_KIND => target.kind.as_str())
                        .increment(1);
                    match self.mode {
                        TeardownMode::RunEnd => {
                            error!(kind = %target.kind, name = target.name.as_str(), error = %err, "teardown failed");
                            failures.push(format!("{} '{}': {err}", target.kind, target.name));
                        }
                        TeardownMode::Explicit => {
                            warn!(kind = %target.kind, name = target.name.as_str(), error = %err, "teardown failed");
                        }
                    }
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ProvisionError::TeardownFailed { failures })
        }
    }

    async fn remove(&self, target: &TeardownTarget) -> Result<Removal, StagehandError> {
        match target.kind {
            ResourceKind::Bucket => self.remove_bucket(target).await,
            ResourceKind::Table => self.remove_table(target).await,
            ResourceKind::Queue => self.remove_queue(target).await,
        }
    }

    async fn remove_bucket(&self, target: &TeardownTarget) -> Result<Removal, StagehandError> {
        let name = target.name.as_str();
        if !target.known && !self.backend.bucket_exists(name).await? {
            return Ok(Removal::Missing);
        }
        let keys = self.backend.list_objects(name).await?;
        for key in &keys {
            self.backend.delete_object(name, key).await?;
        }
        self.backend.delete_bucket(name).await?;
        Ok(Removal::Deleted)
    }

    async fn remove_table(&self, target: &TeardownTarget) -> Result<Removal, StagehandError> {
        let backend = self.backend;
        let name = target.name.as_str();
        // 생성/변경 중인 테이블은 Active까지 대기 (없으면 Missing)
        let waited = self
            .policy
            .wait(ResourceKind::Table, name, || async move {
                Ok(match backend.table_status(name).await? {
                    None => Some(false),
                    Some(ReadinessState::Active) => Some(true),
                    Some(_) => None,
                })
            })
            .await;
        match waited {
            Ok(true) => {}
            Ok(false) => return Ok(Removal::Missing),
            // 끝내 안정되지 않은 테이블도 삭제 요청은 보냄
            Err(ProvisionError::ReadinessTimeout { polls, .. }) => {
                warn!(name, polls, "table never settled, deleting anyway");
            }
            Err(err) => return Err(err.into()),
        }
        self.backend.delete_table(name).await?;
        Ok(Removal::Deleted)
    }

    async fn remove_queue(&self, target: &TeardownTarget) -> Result<Removal, StagehandError> {
        let backend = self.backend;
        let name = target.name.as_str();
        let url = match (&target.address, self.mode) {
            (Some(url), _) => Some(url.clone()),
            (None, TeardownMode::Explicit) => backend.queue_url(name).await?,
            (None, TeardownMode::RunEnd) => Some(
                self.policy
                    .wait(ResourceKind::Queue, name, || backend.queue_url(name))
                    .await?,
            ),
        };
        let Some(url) = url else {
            return Ok(Removal::Missing);
        };
        self.backend.delete_queue(&url).await?;
        Ok(Removal::Deleted)
    }
}
