//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! 레코더가 설치되지 않으면 모든 호출은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `stagehand_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (passed, failed)
pub const LABEL_RESULT: &str = "result";

/// 리소스 종류 레이블 키 (queue, bucket, table)
pub const LABEL_KIND: &str = "kind";

// ─── 리소스 수명주기 메트릭 ─────────────────────────────────────────

/// 생성 완료된 리소스 수 (counter, label: kind)
pub const RESOURCES_PROVISIONED_TOTAL: &str = "stagehand_resources_provisioned_total";

/// 준비 상태 조회 횟수 (counter, label: kind)
pub const READINESS_POLLS_TOTAL: &str = "stagehand_readiness_polls_total";

/// 삭제 실패 수 (counter, label: kind)
pub const TEARDOWN_FAILURES_TOTAL: &str = "stagehand_teardown_failures_total";

// ─── 테스트 실행 메트릭 ─────────────────────────────────────────────

/// 실행된 테스트 수 (counter, label: result)
pub const TESTS_TOTAL: &str = "stagehand_tests_total";

/// 스위트 소요 시간 (histogram, 초)
pub const SUITE_DURATION_SECONDS: &str = "stagehand_suite_duration_seconds";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        RESOURCES_PROVISIONED_TOTAL,
        "Total number of resources created and bound"
    );
    describe_counter!(
        READINESS_POLLS_TOTAL,
        "Total number of readiness status queries"
    );
    describe_counter!(
        TEARDOWN_FAILURES_TOTAL,
        "Total number of resources that failed to delete"
    );
    describe_counter!(TESTS_TOTAL, "Total number of tests executed by result");
    describe_histogram!(SUITE_DURATION_SECONDS, "Suite wall-clock time in seconds");
}
