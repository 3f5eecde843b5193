//! 리소스 프로비저닝
//!
//! 선언된 [`ResourceSpec`] 하나당 다음 상태를 차례로 거칩니다:
//!
//! ```text
//! Requested → Validating → Creating → Polling → Active → Bound
//! ```
//!
//! - 모든 이름은 첫 생성 호출 전에 검증됩니다 (하나라도 실패하면 아무것도 생성하지 않음).
//! - 생성 순서는 큐 → 버킷 → 테이블입니다.
//! - `Active`에 도달하기 전에는 주소를 노출하지 않습니다.
//! - 중간에 실패하면 이미 생성된 리소스를 삭제(롤백)한 뒤 에러를 반환합니다.

use std::collections::HashSet;
use std::fmt;

use stagehand_core::error::ProvisionError;
use stagehand_core::metrics as m;
use stagehand_core::types::{ReadinessState, ResourceKind, ResourceParams, ResourceSpec};
use tracing::{debug, error, info};

use crate::backend::Backend;
use crate::bindings::Bindings;
use crate::naming;
use crate::readiness::ReadinessPolicy;
use crate::teardown::{Deprovisioner, TeardownMode};

/// 리소스별 프로비저닝 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProvisionState {
    /// 선언만 됨
    Requested,
    /// 이름 확정 및 검증 중
    Validating,
    /// 생성 요청 중
    Creating,
    /// 생성 요청 성공, 준비 상태 대기 중
    Polling,
    /// 사용 가능
    Active,
    /// 바인딩 테이블에 주소 게시 완료
    Bound,
}

impl fmt::Display for ProvisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Requested => "requested",
            Self::Validating => "validating",
            Self::Creating => "creating",
            Self::Polling => "polling",
            Self::Active => "active",
            Self::Bound => "bound",
        };
        f.write_str(s)
    }
}

/// 실행 중인 리소스의 런타임 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedResource {
    kind: ResourceKind,
    binding: String,
    name: String,
    fifo: bool,
    state: ProvisionState,
    address: Option<String>,
}

impl ProvisionedResource {
    fn requested(spec: &ResourceSpec) -> Self {
        Self {
            kind: spec.kind(),
            binding: spec.binding.clone(),
            name: String::new(),
            fifo: spec.is_fifo(),
            state: ProvisionState::Requested,
            address: None,
        }
    }

    fn advance(&mut self, next: ProvisionState) {
        debug!(
            kind = %self.kind,
            name = self.name.as_str(),
            from = %self.state,
            to = %next,
            "provision state transition"
        );
        self.state = next;
    }

    /// 리소스 종류
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// 바인딩 키
    pub fn binding(&self) -> &str {
        &self.binding
    }

    /// 확정된 이름
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 현재 상태
    pub fn state(&self) -> ProvisionState {
        self.state
    }

    /// 바인딩할 주소 (버킷/테이블 이름 또는 큐 URL)
    ///
    /// `Active` 또는 `Bound` 상태에서만 값을 반환합니다.
    pub fn address(&self) -> Option<&str> {
        match self.state {
            ProvisionState::Active | ProvisionState::Bound => self.address.as_deref(),
            _ => None,
        }
    }

    /// 생성 요청이 성공했는지 여부 (롤백 대상 판별)
    pub fn was_created(&self) -> bool {
        self.state >= ProvisionState::Polling
    }

    /// 상태와 무관하게 알려진 주소 (삭제 시 사용)
    pub(crate) fn known_address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

fn kind_rank(kind: ResourceKind) -> u8 {
    match kind {
        ResourceKind::Queue => 0,
        ResourceKind::Bucket => 1,
        ResourceKind::Table => 2,
    }
}

/// 리소스 생성기
pub struct Provisioner<'a, B: Backend> {
    backend: &'a B,
    policy: ReadinessPolicy,
}

impl<'a, B: Backend> Provisioner<'a, B> {
    /// 새 프로비저너를 생성합니다.
    pub fn new(backend: &'a B, policy: ReadinessPolicy) -> Self {
        Self { backend, policy }
    }

    /// 선언된 모든 리소스를 생성하고 주소를 바인딩합니다.
    ///
    /// 반환 시점에 모든 리소스는 `Bound` 상태이며 `bindings`는 완성되어 있습니다.
    pub async fn provision_all(
        &self,
        specs: &[ResourceSpec],
        bindings: &mut Bindings,
    ) -> Result<Vec<ProvisionedResource>, ProvisionError> {
        let mut ordered: Vec<&ResourceSpec> = specs.iter().collect();
        ordered.sort_by_key(|spec| kind_rank(spec.kind()));

        // 생성 호출 전에 모든 이름과 바인딩 키를 검증
        let mut pending = Vec::with_capacity(ordered.len());
        let mut keys = HashSet::new();
        for spec in ordered {
            let mut resource = ProvisionedResource::requested(spec);
            resource.advance(ProvisionState::Validating);
            if bindings.contains(&spec.binding) || !keys.insert(spec.binding.as_str()) {
                return Err(ProvisionError::DuplicateBinding {
                    key: spec.binding.clone(),
                });
            }
            resource.name = naming::resolve_name(spec.kind(), spec.name.as_deref(), spec.is_fifo())?;
            pending.push((spec, resource));
        }

        let mut provisioned: Vec<ProvisionedResource> = Vec::with_capacity(pending.len());
        for (spec, resource) in pending {
            provisioned.push(resource);
            let Some(current) = provisioned.last_mut() else {
                break;
            };
            if let Err(err) = self.bring_up(spec, current, bindings).await {
                error!(
                    kind = %current.kind,
                    name = current.name.as_str(),
                    error = %err,
                    "provisioning failed, rolling back created resources"
                );
                let created: Vec<ProvisionedResource> = provisioned
                    .iter()
                    .filter(|r| r.was_created())
                    .cloned()
                    .collect();
                Deprovisioner::new(self.backend, self.policy, TeardownMode::Explicit)
                    .teardown_resources(&created)
                    .await
                    .ok();
                return Err(err);
            }
        }

        info!(count = provisioned.len(), "all resources provisioned and bound");
        Ok(provisioned)
    }

    /// Creating → Polling → Active → Bound
    async fn bring_up(
        &self,
        spec: &ResourceSpec,
        resource: &mut ProvisionedResource,
        bindings: &mut Bindings,
    ) -> Result<(), ProvisionError> {
        resource.advance(ProvisionState::Creating);
        info!(
            kind = %resource.kind,
            name = resource.name.as_str(),
            binding = resource.binding.as_str(),
            "creating resource"
        );
        self.create(spec, resource).await?;
        resource.advance(ProvisionState::Polling);

        let address = self.await_ready(resource).await?;
        resource.address = Some(address);
        resource.advance(ProvisionState::Active);

        if let Some(address) = resource.address() {
            bindings.bind(resource.binding.clone(), address)?;
        }
        resource.advance(ProvisionState::Bound);
        metrics::counter!(m::RESOURCES_PROVISIONED_TOTAL, m::LABEL_KIND => resource.kind.as_str())
            .increment(1);
        info!(
            kind = %resource.kind,
            name = resource.name.as_str(),
            binding = resource.binding.as_str(),
            "resource bound"
        );
        Ok(())
    }

    async fn create(
        &self,
        spec: &ResourceSpec,
        resource: &mut ProvisionedResource,
    ) -> Result<(), ProvisionError> {
        let name = resource.name.as_str();
        let result = match &spec.params {
            ResourceParams::Queue { fifo } => self
                .backend
                .create_queue(name, *fifo)
                .await
                .map(|url| resource.address = Some(url)),
            ResourceParams::Bucket { region } => self.backend.create_bucket(name, region).await,
            ResourceParams::Table { attributes, keys } => {
                self.backend.create_table(name, attributes, keys).await
            }
        };
        result.map_err(|e| ProvisionError::CreateRejected {
            location: naming::creation_location(resource.kind).to_owned(),
            kind: resource.kind,
            name: resource.name.clone(),
            reason: e.reason,
        })
    }

    /// 준비 상태까지 대기하고 바인딩할 주소를 반환합니다.
    async fn await_ready(&self, resource: &ProvisionedResource) -> Result<String, ProvisionError> {
        let backend = self.backend;
        let name = resource.name.as_str();
        match resource.kind {
            ResourceKind::Queue => {
                self.policy
                    .wait(ResourceKind::Queue, name, || backend.queue_url(name))
                    .await
            }
            ResourceKind::Bucket => {
                self.policy
                    .wait(ResourceKind::Bucket, name, || async move {
                        Ok(backend
                            .bucket_exists(name)
                            .await?
                            .then(|| name.to_owned()))
                    })
                    .await
            }
            ResourceKind::Table => {
                self.policy
                    .wait(ResourceKind::Table, name, || async move {
                        let status = backend.table_status(name).await?;
                        Ok((status == Some(ReadinessState::Active)).then(|| name.to_owned()))
                    })
                    .await
            }
        }
    }
}
