//! 테스트 대상 함수 호출
//!
//! 핸들러는 이름으로 [`TargetRegistry`]에 정적으로 등록되고, 설정의
//! `[targets.<id>] handler = "<name>"` 선언은 실행 시작 시(프로비저닝 전)
//! [`TargetRegistry::resolve`]로 한 번에 확인됩니다.
//!
//! ```ignore
//! let mut registry = TargetRegistry::new();
//! registry.register("update_inventory", |event, ctx| Box::pin(update_inventory(event, ctx)))?;
//! let targets = registry.resolve(&config.targets)?;
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use stagehand_core::config::TargetConfig;
use stagehand_core::error::{CheckError, ConfigError};
use stagehand_fixtures::{Backend, Bindings};
use tracing::{debug, info};

use crate::BoxFuture;
use crate::error::RegistryError;

/// 핸들러가 반환하는 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TargetError(pub String);

impl TargetError {
    pub fn new(reason: impl fmt::Display) -> Self {
        Self(reason.to_string())
    }
}

/// 등록된 핸들러
pub type Handler<B> =
    Arc<dyn Fn(Value, InvocationContext<B>) -> BoxFuture<'static, Result<Value, TargetError>> + Send + Sync>;

/// 핸들러에 전달되는 실행 컨텍스트
///
/// 백엔드와 바인딩 테이블, 호출자가 넘긴 임의의 컨텍스트 값을 담습니다.
pub struct InvocationContext<B> {
    backend: Arc<B>,
    bindings: Arc<Bindings>,
    context: Value,
}

impl<B> Clone for InvocationContext<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            bindings: Arc::clone(&self.bindings),
            context: self.context.clone(),
        }
    }
}

impl<B: Backend> InvocationContext<B> {
    pub fn new(backend: Arc<B>, bindings: Arc<Bindings>, context: Value) -> Self {
        Self {
            backend,
            bindings,
            context,
        }
    }

    /// 서비스 백엔드
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 바인딩된 값 (리소스 이름 또는 큐 URL)
    pub fn binding(&self, key: &str) -> Result<&str, TargetError> {
        self.bindings
            .get(key)
            .ok_or_else(|| TargetError(format!("binding '{key}' is not set")))
    }

    /// 호출자가 넘긴 컨텍스트 값
    pub fn context(&self) -> &Value {
        &self.context
    }
}

/// 핸들러 이름 → 핸들러
pub struct TargetRegistry<B> {
    handlers: BTreeMap<String, Handler<B>>,
}

impl<B> Default for TargetRegistry<B> {
    fn default() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }
}

impl<B: Backend> TargetRegistry<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 핸들러를 등록합니다.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(Value, InvocationContext<B>) -> BoxFuture<'static, Result<Value, TargetError>>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        if self.handlers.contains_key(&name) {
            return Err(RegistryError::DuplicateHandler(name));
        }
        debug!(handler = name.as_str(), "handler registered");
        self.handlers.insert(name, Arc::new(handler));
        Ok(())
    }

    /// 등록된 핸들러 이름
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// 설정의 타깃 선언을 핸들러에 연결합니다.
    ///
    /// 등록되지 않은 핸들러 이름은 [`ConfigError::UnknownHandler`]입니다.
    pub fn resolve(
        &self,
        targets: &BTreeMap<String, TargetConfig>,
    ) -> Result<ResolvedTargets<B>, ConfigError> {
        let mut resolved = BTreeMap::new();
        for (id, target) in targets {
            let handler = self.handlers.get(&target.handler).ok_or_else(|| {
                ConfigError::UnknownHandler {
                    target: id.clone(),
                    handler: target.handler.clone(),
                }
            })?;
            resolved.insert(id.clone(), Arc::clone(handler));
        }
        info!(targets = resolved.len(), "targets resolved");
        Ok(ResolvedTargets { targets: resolved })
    }
}

/// 타깃 ID → 핸들러 (실행 시작 시 확정)
pub struct ResolvedTargets<B> {
    targets: BTreeMap<String, Handler<B>>,
}

impl<B> Default for ResolvedTargets<B> {
    fn default() -> Self {
        Self {
            targets: BTreeMap::new(),
        }
    }
}

impl<B: Backend> ResolvedTargets<B> {
    pub(crate) fn get(&self, id: &str) -> Option<&Handler<B>> {
        self.targets.get(id)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// 호출 가능한 타깃 하나
pub struct Target<B> {
    id: String,
    handler: Handler<B>,
    backend: Arc<B>,
    bindings: Arc<Bindings>,
}

impl<B: Backend> Target<B> {
    pub(crate) fn new(id: &str, handler: Handler<B>, backend: Arc<B>, bindings: Arc<Bindings>) -> Self {
        Self {
            id: id.to_owned(),
            handler,
            backend,
            bindings,
        }
    }

    /// 이벤트와 컨텍스트로 핸들러를 호출합니다.
    ///
    /// 핸들러가 에러를 반환하면 [`CheckError::Target`] (테스트 실패)입니다.
    pub async fn execute(&self, event: Value, context: Value) -> Result<Invocation, CheckError> {
        let ctx = InvocationContext::new(
            Arc::clone(&self.backend),
            Arc::clone(&self.bindings),
            context,
        );
        debug!(target_id = self.id.as_str(), "invoking target");
        let value = (self.handler)(event, ctx)
            .await
            .map_err(|e| CheckError::Target {
                target: self.id.clone(),
                reason: e.0,
            })?;
        Ok(Invocation {
            target: self.id.clone(),
            value,
        })
    }
}

/// 호출 결과
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    target: String,
    value: Value,
}

impl Invocation {
    /// 반환값
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// 반환값이 `expected`와 정확히 같아야 함
    pub fn has_return_value(&self, expected: impl Into<Value>) -> Result<(), CheckError> {
        let expected = expected.into();
        if self.value == expected {
            return Ok(());
        }
        Err(CheckError::Assertion(format!(
            "The target {} returned:\n{}\nexpected:\n{}",
            self.target, self.value, expected
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stagehand_fixtures::MemoryBackend;

    fn echo_registry() -> TargetRegistry<MemoryBackend> {
        let mut registry = TargetRegistry::new();
        registry
            .register("echo", |event, _ctx| {
                Box::pin(async move { Ok::<_, TargetError>(event) })
            })
            .unwrap();
        registry
            .register("fail", |_event, _ctx| {
                Box::pin(async { Err::<Value, _>(TargetError::new("boom")) })
            })
            .unwrap();
        registry
            .register("bucket", |_event, ctx: InvocationContext<MemoryBackend>| {
                Box::pin(async move { Ok::<_, TargetError>(json!(ctx.binding("testBucket")?)) })
            })
            .unwrap();
        registry
    }

    fn targets(pairs: &[(&str, &str)]) -> BTreeMap<String, TargetConfig> {
        pairs
            .iter()
            .map(|(id, handler)| {
                (
                    (*id).to_owned(),
                    TargetConfig {
                        handler: (*handler).to_owned(),
                    },
                )
            })
            .collect()
    }

    fn target(id: &str, registry: &TargetRegistry<MemoryBackend>, bindings: Bindings) -> Target<MemoryBackend> {
        let resolved = registry.resolve(&targets(&[(id, id)])).unwrap();
        Target::new(
            id,
            Arc::clone(resolved.get(id).unwrap()),
            Arc::new(MemoryBackend::new()),
            Arc::new(bindings),
        )
    }

    #[test]
    fn duplicate_handler_is_rejected() {
        let mut registry = echo_registry();
        let err = registry
            .register("echo", |event, _ctx| {
                Box::pin(async move { Ok::<_, TargetError>(event) })
            })
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateHandler("echo".to_owned()));
    }

    #[test]
    fn unknown_handler_fails_resolution() {
        let registry = echo_registry();
        let err = registry
            .resolve(&targets(&[("inventory-lambda", "missing")]))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ConfigError::UnknownHandler { target, handler }
                if target == "inventory-lambda" && handler == "missing"
        ));
    }

    #[tokio::test]
    async fn return_value_is_compared_strictly() {
        let registry = echo_registry();
        let invocation = target("echo", &registry, Bindings::new())
            .execute(json!({"statusCode": 200}), Value::Null)
            .await
            .unwrap();
        invocation.has_return_value(json!({"statusCode": 200})).unwrap();

        let message = invocation
            .has_return_value(json!({"statusCode": "200"}))
            .unwrap_err()
            .to_string();
        assert!(message.contains(r#"{"statusCode":200}"#));
        assert!(message.contains(r#"{"statusCode":"200"}"#));
    }

    #[tokio::test]
    async fn handler_error_is_a_test_failure() {
        let registry = echo_registry();
        let err = target("fail", &registry, Bindings::new())
            .execute(Value::Null, Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::Target { ref target, .. } if target == "fail"));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn handler_reads_bindings() {
        let registry = echo_registry();
        let mut bindings = Bindings::new();
        bindings.bind("testBucket", "logs").unwrap();
        target("bucket", &registry, bindings)
            .execute(Value::Null, Value::Null)
            .await
            .unwrap()
            .has_return_value("logs")
            .unwrap();
    }
}
