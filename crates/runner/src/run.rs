//! 실행 오케스트레이션
//!
//! 한 번의 실행은 다음 순서를 따릅니다.
//!
//! 1. 타깃 핸들러 확인 (프로비저닝 전에 설정 오류를 드러냄)
//! 2. 스위트 선택
//! 3. 리소스 생성과 바인딩 (실패 시 이미 만든 리소스는 롤백)
//! 4. 스위트 순차 실행
//! 5. 리소스 삭제 (치명적 에러로 중단된 경우에도 실행)

use std::sync::Arc;

use stagehand_core::config::StagehandConfig;
use stagehand_core::error::StagehandError;
use stagehand_core::types::RunReport;
use stagehand_fixtures::{
    Backend, Bindings, ComparisonPolicy, Deprovisioner, Provisioner, ReadinessPolicy,
    TeardownMode,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{error, info};

use crate::catalog::SuiteCatalog;
use crate::harness::Harness;
use crate::invoker::TargetRegistry;
use crate::suite::Engine;

/// 실행 옵션 (CLI에서 전달)
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// 실행할 스위트 이름. 비어 있으면 설정의 `suites`를 따릅니다.
    pub suites: Vec<String>,
    /// 테스트 결과를 콘솔에 출력할지 여부
    pub console: bool,
}

/// 설정에 선언된 리소스로 선택된 스위트를 실행합니다.
///
/// 테스트 실패는 `Ok(report)`에 담깁니다. `Err`는 설정 오류, 프로비저닝
/// 실패, 실행 종료 시 삭제 실패처럼 실행 자체가 성립하지 않은 경우입니다.
pub async fn run<B: Backend>(
    config: &StagehandConfig,
    backend: Arc<B>,
    registry: &TargetRegistry<B>,
    catalog: SuiteCatalog<B>,
    options: &RunOptions,
) -> Result<RunReport, StagehandError> {
    let mut report = RunReport {
        run_id: uuid::Uuid::new_v4().to_string(),
        started_at: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
        ..RunReport::default()
    };
    info!(run_id = report.run_id.as_str(), "run started");

    let targets = registry.resolve(&config.targets)?;
    let requested = if options.suites.is_empty() {
        &config.suites
    } else {
        &options.suites
    };
    let selected = catalog.select(requested)?;
    info!(suites = selected.len(), "suites selected");

    let readiness = ReadinessPolicy::from_config(config);
    let mut bindings = Bindings::new();
    let resources = Provisioner::new(&*backend, readiness)
        .provision_all(&config.resource_specs(), &mut bindings)
        .await?;

    let harness = Arc::new(Harness::new(
        Arc::clone(&backend),
        bindings,
        targets,
        readiness,
        ComparisonPolicy::from_config(config),
    ));
    let engine = Engine::new(harness).with_console(options.console);

    for entry in selected {
        match engine.describe(entry.suite, entry.body).await {
            Ok(suite) => report.suites.push(suite),
            Err(abort) => {
                error!(location = abort.location.as_str(), error = %abort.reason, "run aborted");
                report.fatal = Some(abort.to_string());
                break;
            }
        }
    }

    let teardown = Deprovisioner::new(&*backend, readiness, TeardownMode::RunEnd)
        .teardown_resources(&resources)
        .await;
    if let Err(err) = teardown {
        error!(
            passed = report.passed(),
            failed = report.failed(),
            error = %err,
            "teardown failed after run"
        );
        return Err(err.into());
    }

    info!(
        run_id = report.run_id.as_str(),
        passed = report.passed(),
        failed = report.failed(),
        aborted = report.aborted(),
        "run finished"
    );
    Ok(report)
}

/// 설정에 이름이 명시된 리소스를 삭제합니다.
///
/// 이미 없는 리소스와 삭제 실패는 경고만 남깁니다. 이름 없이 선언된
/// 리소스는 찾을 수 없으므로 건너뜁니다.
pub async fn teardown_only<B: Backend>(
    config: &StagehandConfig,
    backend: &B,
) -> Result<(), StagehandError> {
    Deprovisioner::new(
        backend,
        ReadinessPolicy::from_config(config),
        TeardownMode::Explicit,
    )
    .teardown_specs(&config.resource_specs())
    .await?;
    Ok(())
}
