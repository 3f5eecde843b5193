//! 레코드 비교 방향
//!
//! 테이블과 큐의 내용 비교는 서로 다른 필드 집합을 순회합니다.
//! 테이블은 관찰된 행의 필드를, 큐는 기대 메시지의 필드를 검사합니다.
//! [`ComparisonMode::Union`]은 양쪽 필드를 모두 검사합니다.

use std::collections::BTreeSet;

use stagehand_core::config::StagehandConfig;
use stagehand_core::types::{ObservedRecord, ResourceKind};

/// 비교 시 검사할 필드 집합
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMode {
    /// 관찰된 레코드의 필드만 검사
    Observed,
    /// 기대 레코드의 필드만 검사
    Expected,
    /// 양쪽 필드의 합집합을 검사
    Union,
}

/// 전역 비교 정책 (`[assertions] comparison`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonPolicy {
    /// 리소스 종류별 기존 방향 (테이블: Observed, 큐: Expected)
    #[default]
    Legacy,
    /// 모든 종류에 Union
    Union,
}

impl ComparisonPolicy {
    /// 설정에서 정책을 읽습니다.
    pub fn from_config(config: &StagehandConfig) -> Self {
        if config.assertions.comparison == "union" {
            Self::Union
        } else {
            Self::Legacy
        }
    }

    /// 리소스 종류에 적용할 비교 방향
    pub fn mode_for(self, kind: ResourceKind) -> ComparisonMode {
        match (self, kind) {
            (Self::Union, _) => ComparisonMode::Union,
            (Self::Legacy, ResourceKind::Table) => ComparisonMode::Observed,
            (Self::Legacy, ResourceKind::Queue | ResourceKind::Bucket) => ComparisonMode::Expected,
        }
    }
}

/// 한 필드의 기대값과 실제값
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldDiff<'a> {
    pub field: &'a str,
    pub expected: Option<&'a str>,
    pub actual: Option<&'a str>,
}

fn checked_fields<'a>(
    expected: &'a ObservedRecord,
    actual: &'a ObservedRecord,
    mode: ComparisonMode,
) -> BTreeSet<&'a str> {
    match mode {
        ComparisonMode::Observed => actual.iter().map(|(k, _)| k).collect(),
        ComparisonMode::Expected => expected.iter().map(|(k, _)| k).collect(),
        ComparisonMode::Union => expected
            .iter()
            .chain(actual.iter())
            .map(|(k, _)| k)
            .collect(),
    }
}

fn diffs<'a>(
    expected: &'a ObservedRecord,
    actual: &'a ObservedRecord,
    mode: ComparisonMode,
) -> impl Iterator<Item = FieldDiff<'a>> {
    checked_fields(expected, actual, mode)
        .into_iter()
        .map(|field| FieldDiff {
            field,
            expected: expected.get(field),
            actual: actual.get(field),
        })
}

/// 값이 다른 첫 필드 (필드 이름 순으로 검사)
pub(crate) fn first_mismatch<'a>(
    expected: &'a ObservedRecord,
    actual: &'a ObservedRecord,
    mode: ComparisonMode,
) -> Option<FieldDiff<'a>> {
    diffs(expected, actual, mode).find(|d| d.expected != d.actual)
}

/// 값이 같은 첫 필드 (양쪽 모두 값이 있는 경우만)
pub(crate) fn first_match<'a>(
    expected: &'a ObservedRecord,
    actual: &'a ObservedRecord,
    mode: ComparisonMode,
) -> Option<FieldDiff<'a>> {
    diffs(expected, actual, mode).find(|d| d.actual.is_some() && d.expected == d.actual)
}

/// 메시지 출력용 값
pub(crate) fn display_value(value: Option<&str>) -> &str {
    value.unwrap_or("<absent>")
}
