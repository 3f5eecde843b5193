//! 테스트 본문과 훅에 전달되는 실행 핸들

use std::sync::Arc;

use stagehand_core::error::CheckError;
use stagehand_core::types::ResourceKind;
use stagehand_fixtures::{
    Backend, Bindings, BucketProbe, ComparisonPolicy, QueueProbe, ReadinessPolicy, TableProbe,
};

use crate::invoker::{ResolvedTargets, Target};

/// 한 실행(run) 동안 공유되는 읽기 전용 핸들
///
/// 바인딩은 스위트 시작 전에 모두 확정되며 이후 변경되지 않습니다.
pub struct Harness<B: Backend> {
    backend: Arc<B>,
    bindings: Arc<Bindings>,
    targets: ResolvedTargets<B>,
    readiness: ReadinessPolicy,
    comparison: ComparisonPolicy,
}

impl<B: Backend> Harness<B> {
    pub fn new(
        backend: Arc<B>,
        bindings: Bindings,
        targets: ResolvedTargets<B>,
        readiness: ReadinessPolicy,
        comparison: ComparisonPolicy,
    ) -> Self {
        Self {
            backend,
            bindings: Arc::new(bindings),
            targets,
            readiness,
            comparison,
        }
    }

    /// 서비스 백엔드 (시드 데이터 작성 등)
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 전체 바인딩 테이블
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// 바인딩된 값을 조회합니다.
    ///
    /// 바인딩되지 않은 키는 실행 전체를 중단시킵니다.
    pub fn binding(&self, key: &str) -> Result<&str, CheckError> {
        self.bindings.get(key).ok_or_else(|| CheckError::Fatal {
            location: "Reading binding:".to_owned(),
            reason: format!("binding '{key}' is not set"),
        })
    }

    /// 버킷 관찰자
    pub fn bucket(&self, bucket: &str) -> BucketProbe<'_, B> {
        BucketProbe::new(&*self.backend, bucket)
    }

    /// 테이블 관찰자 (전역 비교 정책 적용)
    pub fn table(&self, table: &str) -> TableProbe<'_, B> {
        TableProbe::new(&*self.backend, table, self.readiness)
            .with_comparison(self.comparison.mode_for(ResourceKind::Table))
    }

    /// 큐 관찰자 (전역 비교 정책 적용)
    pub fn queue(&self, url: &str) -> QueueProbe<'_, B> {
        QueueProbe::new(&*self.backend, url)
            .with_comparison(self.comparison.mode_for(ResourceKind::Queue))
    }

    /// 설정에 선언된 타깃
    ///
    /// 선언되지 않은 ID는 실행 전체를 중단시킵니다.
    pub fn target(&self, id: &str) -> Result<Target<B>, CheckError> {
        let handler = self.targets.get(id).ok_or_else(|| CheckError::Fatal {
            location: "Invoking target:".to_owned(),
            reason: format!("target '{id}' is not declared"),
        })?;
        Ok(Target::new(
            id,
            Arc::clone(handler),
            Arc::clone(&self.backend),
            Arc::clone(&self.bindings),
        ))
    }
}
