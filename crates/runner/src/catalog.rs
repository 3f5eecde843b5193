//! 스위트 등록부
//!
//! 스위트는 빌드 시점에 [`SuitePack`] 구현으로 등록되고, 실행 시작 시
//! 설정(`suites = [...]`) 또는 CLI 필터로 선택됩니다.

use stagehand_core::error::ConfigError;
use stagehand_fixtures::Backend;
use tracing::debug;

use crate::BoxFuture;
use crate::error::{RegistryError, SuiteAbort};
use crate::invoker::TargetRegistry;
use crate::suite::{Suite, SuiteContext};

/// 등록된 스위트 본문
pub type SuiteBody<B> = Box<
    dyn for<'a> Fn(&'a mut SuiteContext<B>) -> BoxFuture<'a, Result<(), SuiteAbort>> + Send + Sync,
>;

/// 실행 가능한 스위트 하나
pub(crate) struct CatalogEntry<B: Backend> {
    pub(crate) suite: Suite<B>,
    pub(crate) body: SuiteBody<B>,
}

/// 등록 순서를 유지하는 스위트 목록
pub struct SuiteCatalog<B: Backend> {
    entries: Vec<CatalogEntry<B>>,
}

impl<B: Backend> Default for SuiteCatalog<B> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<B: Backend> SuiteCatalog<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 스위트를 등록합니다. 이름은 카탈로그 안에서 유일해야 합니다.
    pub fn add<F>(&mut self, suite: Suite<B>, body: F) -> Result<(), RegistryError>
    where
        F: for<'a> Fn(&'a mut SuiteContext<B>) -> BoxFuture<'a, Result<(), SuiteAbort>>
            + Send
            + Sync
            + 'static,
    {
        if self.entries.iter().any(|e| e.suite.name() == suite.name()) {
            return Err(RegistryError::DuplicateSuite(suite.name().to_owned()));
        }
        debug!(suite = suite.name(), "suite registered");
        self.entries.push(CatalogEntry {
            suite,
            body: Box::new(body),
        });
        Ok(())
    }

    /// 등록된 스위트 이름 (등록 순)
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.suite.name())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 실행할 스위트를 고릅니다.
    ///
    /// `requested`가 비어 있으면 전체, 아니면 이름이 일치하는 스위트만
    /// 등록 순서대로 반환합니다. 없는 이름은 [`ConfigError::UnknownSuite`]입니다.
    pub(crate) fn select(self, requested: &[String]) -> Result<Vec<CatalogEntry<B>>, ConfigError> {
        if requested.is_empty() {
            return Ok(self.entries);
        }
        if let Some(unknown) = requested
            .iter()
            .find(|name| !self.entries.iter().any(|e| e.suite.name() == name.as_str()))
        {
            return Err(ConfigError::UnknownSuite(unknown.clone()));
        }
        Ok(self
            .entries
            .into_iter()
            .filter(|e| requested.iter().any(|name| name == e.suite.name()))
            .collect())
    }
}

/// 타깃 핸들러와 스위트를 한 번에 등록하는 묶음
///
/// 테스트 대상 프로젝트가 구현하고 CLI의 `launch`에 넘깁니다. 백엔드 타입은
/// 실행 시점(`--backend`)에 정해지므로 메서드가 백엔드에 대해 제네릭입니다.
pub trait SuitePack {
    fn register<B: Backend>(
        &self,
        targets: &mut TargetRegistry<B>,
        suites: &mut SuiteCatalog<B>,
    ) -> Result<(), RegistryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_fixtures::MemoryBackend;

    fn catalog(names: &[&str]) -> SuiteCatalog<MemoryBackend> {
        let mut catalog = SuiteCatalog::new();
        for name in names {
            catalog
                .add(Suite::new(*name), |_ctx| {
                    Box::pin(async { Ok::<_, SuiteAbort>(()) })
                })
                .unwrap();
        }
        catalog
    }

    fn selected(entries: Vec<CatalogEntry<MemoryBackend>>) -> Vec<String> {
        entries.iter().map(|e| e.suite.name().to_owned()).collect()
    }

    #[test]
    fn empty_filter_selects_everything_in_order() {
        let entries = catalog(&["b", "a"]).select(&[]).unwrap();
        assert_eq!(selected(entries), ["b", "a"]);
    }

    #[test]
    fn filter_keeps_registration_order() {
        let entries = catalog(&["a", "b", "c"])
            .select(&["c".to_owned(), "a".to_owned()])
            .unwrap();
        assert_eq!(selected(entries), ["a", "c"]);
    }

    #[test]
    fn unknown_suite_is_a_config_error() {
        let err = catalog(&["a"]).select(&["zzz".to_owned()]).err().unwrap();
        assert!(matches!(err, ConfigError::UnknownSuite(name) if name == "zzz"));
    }

    #[test]
    fn duplicate_suite_name_is_rejected() {
        let mut catalog = catalog(&["a"]);
        let err = catalog
            .add(Suite::new("a"), |_ctx| Box::pin(async { Ok::<_, SuiteAbort>(()) }))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateSuite("a".to_owned()));
    }
}
