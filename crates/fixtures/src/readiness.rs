//! 준비 상태 대기 정책
//!
//! 생성 직후와 삭제 직전에 리소스가 안정 상태에 도달할 때까지 상태를 반복
//! 조회합니다. 기본은 지수 백오프 + 총 대기 한도([`ReadinessPolicy::Bounded`])이며,
//! 지연 없이 무한히 재조회하는 [`ReadinessPolicy::Unbounded`]는 설정으로만 선택됩니다.

use std::future::Future;
use std::time::Duration;

use stagehand_core::config::StagehandConfig;
use stagehand_core::error::{ProvisionError, ServiceError};
use stagehand_core::metrics as m;
use stagehand_core::types::ResourceKind;
use tokio::time::Instant;
use tracing::{debug, warn};

/// 상태 조회 반복 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessPolicy {
    /// 지연 없이, 횟수 제한 없이 재조회합니다.
    ///
    /// 준비되지 않는 리소스는 실행을 무기한 멈춥니다.
    Unbounded,
    /// 지수 백오프(2배씩, 상한 있음)로 재조회하고 총 대기 시간을 제한합니다.
    Bounded {
        initial_backoff: Duration,
        max_backoff: Duration,
        timeout: Duration,
    },
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self::Bounded {
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            timeout: Duration::from_secs(300),
        }
    }
}

impl ReadinessPolicy {
    /// `[readiness]` 설정에서 정책을 만듭니다.
    pub fn from_config(config: &StagehandConfig) -> Self {
        if config.readiness.mode == "unbounded" {
            Self::Unbounded
        } else {
            Self::Bounded {
                initial_backoff: config.initial_backoff(),
                max_backoff: config.max_backoff(),
                timeout: config.readiness_timeout(),
            }
        }
    }

    /// `probe`가 `Some`을 반환할 때까지 반복 조회합니다.
    ///
    /// - `Ok(Some(v))`: 준비 완료, `v` 반환
    /// - `Ok(None)`: 아직 준비되지 않음, 정책에 따라 재조회
    /// - `Err(e)`: 조회 실패, 즉시 [`ProvisionError::Readiness`]
    pub async fn wait<T, F, Fut>(
        &self,
        kind: ResourceKind,
        name: &str,
        mut probe: F,
    ) -> Result<T, ProvisionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, ServiceError>>,
    {
        let started = Instant::now();
        let mut polls: u64 = 0;
        let mut delay = match self {
            Self::Unbounded => Duration::ZERO,
            Self::Bounded {
                initial_backoff, ..
            } => *initial_backoff,
        };

        loop {
            polls += 1;
            metrics::counter!(m::READINESS_POLLS_TOTAL, m::LABEL_KIND => kind.as_str())
                .increment(1);

            if let Some(ready) = probe().await? {
                debug!(kind = %kind, name, polls, "resource ready");
                return Ok(ready);
            }

            match self {
                Self::Unbounded => tokio::task::yield_now().await,
                Self::Bounded {
                    max_backoff,
                    timeout,
                    ..
                } => {
                    let elapsed = started.elapsed();
                    if elapsed >= *timeout {
                        let waited_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
                        warn!(kind = %kind, name, polls, waited_ms, "resource readiness timed out");
                        return Err(ProvisionError::ReadinessTimeout {
                            kind,
                            name: name.to_owned(),
                            waited_ms,
                            polls,
                        });
                    }
                    let sleep_for = delay.min(*timeout - elapsed);
                    debug!(
                        kind = %kind,
                        name,
                        polls,
                        backoff_ms = u64::try_from(sleep_for.as_millis()).unwrap_or(u64::MAX),
                        "resource not ready, backing off"
                    );
                    tokio::time::sleep(sleep_for).await;
                    delay = delay.saturating_mul(2).min(*max_backoff);
                }
            }
        }
    }
}
