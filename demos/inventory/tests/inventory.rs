//! 통합 테스트 -- 재고 스위트 전체 실행
//!
//! 데모 설정 파일로 메모리 백엔드에 리소스를 만들고 스위트를 돌린 뒤
//! 모든 리소스가 삭제되었는지 확인합니다.

use std::sync::Arc;

use inventory_demo::InventorySuites;
use inventory_demo::suites::SUITE_NAME;
use stagehand_core::StagehandConfig;
use stagehand_core::types::ResourceKind;
use stagehand_fixtures::MemoryBackend;
use stagehand_runner::{RunOptions, SuiteCatalog, SuitePack, TargetRegistry, run};

fn config() -> StagehandConfig {
    let mut config = StagehandConfig::parse(include_str!("../stagehand.toml")).unwrap();
    config.readiness.initial_backoff_ms = 1;
    config.readiness.max_backoff_ms = 5;
    config.validate().unwrap();
    config
}

fn registered() -> (TargetRegistry<MemoryBackend>, SuiteCatalog<MemoryBackend>) {
    let mut targets = TargetRegistry::new();
    let mut suites = SuiteCatalog::new();
    InventorySuites.register(&mut targets, &mut suites).unwrap();
    (targets, suites)
}

#[tokio::test]
async fn inventory_suite_passes_and_leaves_nothing_behind() {
    let backend = Arc::new(MemoryBackend::new().with_settle_polls(2));
    let (targets, suites) = registered();

    let report = run(
        &config(),
        Arc::clone(&backend),
        &targets,
        suites,
        &RunOptions::default(),
    )
    .await
    .unwrap();

    assert!(report.fatal.is_none());
    assert_eq!(report.suites.len(), 1);
    let suite = &report.suites[0];
    assert_eq!(suite.name, SUITE_NAME);
    assert!(suite.aborted.is_none());
    for test in &suite.tests {
        assert!(test.passed(), "{}: {:?}", test.name, test.failure);
    }
    assert_eq!(report.passed(), 2);

    let mut created: Vec<ResourceKind> = backend
        .create_calls()
        .await
        .into_iter()
        .map(|(kind, _)| kind)
        .collect();
    created.sort();
    assert_eq!(
        created,
        [ResourceKind::Queue, ResourceKind::Bucket, ResourceKind::Table]
    );
    assert!(backend.bucket_names().await.is_empty());
    assert!(backend.table_names().await.is_empty());
    assert!(backend.queue_names().await.is_empty());
}

#[tokio::test]
async fn unknown_handler_fails_before_any_resource_is_created() {
    let backend = Arc::new(MemoryBackend::new());
    let (targets, suites) = registered();
    let mut config = config();
    config.targets.get_mut("inventory-lambda").unwrap().handler = "update_stock".to_owned();

    let err = run(&config, Arc::clone(&backend), &targets, suites, &RunOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("update_stock"));
    assert!(backend.create_calls().await.is_empty());
}
