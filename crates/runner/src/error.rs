//! 실행 엔진 에러
//!
//! - [`RunAbort`]: 스위트 안에서 발생한 치명적 에러. 실행 전체를 멈춥니다.
//! - [`SuiteAbort`]: 훅 실패. 해당 스위트만 중단하고 다음 스위트로 넘어갑니다.
//! - [`RegistryError`]: 타깃/스위트 등록 충돌.

use stagehand_core::error::CheckError;

/// 실행 전체를 중단시키는 에러 (미등록 타깃, 미바인딩 키 등)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{location} {reason}")]
pub struct RunAbort {
    /// 작업 컨텍스트 라벨
    pub location: String,
    /// 원인
    pub reason: String,
}

/// 스위트 실행 중단 사유
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuiteAbort {
    /// `before`/`after` 훅 실패
    #[error("{hook} hook failed: {reason}")]
    Hook { hook: &'static str, reason: String },

    /// 치명적 에러
    #[error(transparent)]
    Fatal(#[from] RunAbort),
}

impl SuiteAbort {
    /// 훅이 반환한 에러를 분류합니다.
    ///
    /// [`CheckError::Fatal`]은 실행 전체 중단으로 승격됩니다.
    pub(crate) fn from_hook(hook: &'static str, err: CheckError) -> Self {
        match err {
            CheckError::Fatal { location, reason } => Self::Fatal(RunAbort { location, reason }),
            other => Self::Hook {
                hook,
                reason: other.to_string(),
            },
        }
    }
}

/// 등록 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// 같은 이름의 핸들러가 이미 등록됨
    #[error("handler '{0}' is already registered")]
    DuplicateHandler(String),

    /// 같은 이름의 스위트가 이미 등록됨
    #[error("suite '{0}' is already registered")]
    DuplicateSuite(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_hook_error_becomes_run_abort() {
        let err = SuiteAbort::from_hook(
            "before",
            CheckError::Fatal {
                location: "Invoking target:".to_owned(),
                reason: "unknown target 'x'".to_owned(),
            },
        );
        assert_eq!(
            err,
            SuiteAbort::Fatal(RunAbort {
                location: "Invoking target:".to_owned(),
                reason: "unknown target 'x'".to_owned(),
            })
        );
    }

    #[test]
    fn assertion_in_hook_aborts_suite_only() {
        let err = SuiteAbort::from_hook("before", CheckError::assertion("seed failed"));
        assert_eq!(err.to_string(), "before hook failed: seed failed");
    }
}
