//! 실행 전역 바인딩 테이블
//!
//! 프로비저닝된 리소스의 주소(버킷 이름, 테이블 이름, 큐 URL)를 설정에 선언된
//! 키로 보관합니다. 프로세스 환경변수는 변경하지 않으며, 스위트와 타깃은 이
//! 테이블을 명시적으로 전달받습니다.

use std::collections::BTreeMap;

use serde::Serialize;
use stagehand_core::error::ProvisionError;

/// 바인딩 키 → 값
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Bindings {
    entries: BTreeMap<String, String>,
}

impl Bindings {
    /// 빈 바인딩 테이블을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 키에 값을 한 번만 바인딩합니다.
    ///
    /// 이미 바인딩된 키는 [`ProvisionError::DuplicateBinding`]을 반환합니다.
    pub fn bind(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ProvisionError> {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return Err(ProvisionError::DuplicateBinding { key });
        }
        self.entries.insert(key, value.into());
        Ok(())
    }

    /// 바인딩된 값을 조회합니다.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// 키가 바인딩되어 있는지 여부
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 바인딩 순회 (키 순)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 바인딩 개수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
