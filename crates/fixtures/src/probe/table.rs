use stagehand_core::error::{CheckError, ProvisionError, ServiceError};
use stagehand_core::types::{AttributeMap, ObservedRecord, ReadinessState, ResourceKind};
use tracing::debug;

use super::{ComparisonMode, Observed, Presence, ReadMode, RecordObservation};
use crate::backend::TableStore;
use crate::readiness::ReadinessPolicy;

/// 테이블과 행을 관찰합니다.
///
/// 행을 읽기 전에 항상 테이블이 `Active`가 될 때까지 기다립니다.
pub struct TableProbe<'a, B: TableStore> {
    backend: &'a B,
    table: String,
    policy: ReadinessPolicy,
    comparison: ComparisonMode,
}

impl<'a, B: TableStore> TableProbe<'a, B> {
    pub fn new(backend: &'a B, table: impl Into<String>, policy: ReadinessPolicy) -> Self {
        Self {
            backend,
            table: table.into(),
            policy,
            comparison: ComparisonMode::Observed,
        }
    }

    /// 내용 비교 방향을 지정합니다.
    pub fn with_comparison(mut self, mode: ComparisonMode) -> Self {
        self.comparison = mode;
        self
    }

    /// 테이블 존재 여부
    pub async fn table(&self) -> Result<Presence, CheckError> {
        let present = self.backend.table_status(&self.table).await?.is_some();
        Ok(Presence::new(
            present,
            format!("The dynamo db table {} does not exist", self.table),
            format!("The dynamo db table {} does exist", self.table),
        ))
    }

    /// `key`에 해당하는 행의 존재 여부
    pub async fn row(&self, key: &AttributeMap, mode: ReadMode) -> Result<Presence, CheckError> {
        let observed = self.read_row(key, mode).await?;
        Ok(Presence::new(
            !observed.is_empty(),
            format!("The table({}) does not have an item at the given key", self.table),
            format!("The table({}) does have an item at the given key", self.table),
        ))
    }

    /// `key`에 해당하는 행의 내용
    ///
    /// 행이 없으면 바로 단언 실패를 반환합니다.
    pub async fn content(
        &self,
        key: &AttributeMap,
        expected: impl Into<ObservedRecord>,
        mode: ReadMode,
    ) -> Result<RecordObservation, CheckError> {
        match self.read_row(key, mode).await? {
            Observed::Record(actual) => Ok(RecordObservation::table(
                &self.table,
                expected.into(),
                actual,
                self.comparison,
            )),
            Observed::Empty => Err(CheckError::Assertion(format!(
                "The table({}) does not have an item at the given key",
                self.table
            ))),
        }
    }

    async fn read_row(&self, key: &AttributeMap, mode: ReadMode) -> Result<Observed, CheckError> {
        self.wait_until_ready().await?;
        let Some(item) = self.backend.get_item(&self.table, key).await? else {
            debug!(table = self.table.as_str(), "row not found");
            return Ok(Observed::Empty);
        };
        if mode == ReadMode::Consume {
            self.backend.delete_item(&self.table, key).await?;
            debug!(table = self.table.as_str(), "row consumed");
        }
        Ok(Observed::Record(ObservedRecord::from_item(&item)))
    }

    async fn wait_until_ready(&self) -> Result<(), CheckError> {
        let backend = self.backend;
        let table = self.table.as_str();
        self.policy
            .wait(ResourceKind::Table, table, || async move {
                match backend.table_status(table).await? {
                    Some(ReadinessState::Active) => Ok(Some(())),
                    Some(_) => Ok(None),
                    None => Err(ServiceError::new(
                        "describe_table",
                        table,
                        "ResourceNotFoundException: table does not exist",
                    )),
                }
            })
            .await
            .map_err(|err| match err {
                ProvisionError::Readiness(service) => CheckError::Service(service),
                other => CheckError::Service(ServiceError::new("describe_table", table, other)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use stagehand_core::types::{AttributeValue, KeyDefinition, KeyType};

    fn key(product: &str) -> AttributeMap {
        AttributeMap::from([("Products".to_owned(), AttributeValue::s(product))])
    }

    async fn inventory() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend
            .create_table(
                "Inventory",
                &[],
                &[KeyDefinition {
                    name: "Products".to_owned(),
                    key_type: KeyType::Hash,
                }],
            )
            .await
            .unwrap();
        let mut item = key("Apple");
        item.insert("quantity".to_owned(), AttributeValue::n(20));
        backend.put_item("Inventory", item).await.unwrap();
        backend
    }

    #[tokio::test]
    async fn table_existence() {
        let backend = inventory().await;
        let policy = ReadinessPolicy::default();
        TableProbe::new(&backend, "Inventory", policy)
            .table()
            .await
            .unwrap()
            .exists()
            .unwrap();
        let missing = TableProbe::new(&backend, "Other", policy).table().await.unwrap();
        assert_eq!(
            missing.exists().unwrap_err().to_string(),
            "The dynamo db table Other does not exist"
        );
    }

    #[tokio::test]
    async fn consuming_content_read_deletes_row() {
        let backend = inventory().await;
        let probe = TableProbe::new(&backend, "Inventory", ReadinessPolicy::default());

        probe
            .content(
                &key("Apple"),
                [("Products", "Apple"), ("quantity", "20")],
                ReadMode::Consume,
            )
            .await
            .unwrap()
            .equals()
            .unwrap();
        assert_eq!(backend.item_count("Inventory").await, 0);
        probe
            .row(&key("Apple"), ReadMode::Consume)
            .await
            .unwrap()
            .not_exists()
            .unwrap();
    }

    #[tokio::test]
    async fn preserving_read_keeps_row() {
        let backend = inventory().await;
        let probe = TableProbe::new(&backend, "Inventory", ReadinessPolicy::default());
        probe
            .row(&key("Apple"), ReadMode::Preserve)
            .await
            .unwrap()
            .exists()
            .unwrap();
        assert_eq!(backend.item_count("Inventory").await, 1);
    }

    #[tokio::test]
    async fn content_of_absent_row_fails() {
        let backend = inventory().await;
        let err = TableProbe::new(&backend, "Inventory", ReadinessPolicy::default())
            .content(&key("Pear"), [("Products", "Pear")], ReadMode::Consume)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::Assertion(_)));
    }

    #[tokio::test]
    async fn union_mode_catches_missing_observed_field() {
        let backend = inventory().await;
        let expected = [("Products", "Apple"), ("quantity", "20"), ("owner", "ops")];

        TableProbe::new(&backend, "Inventory", ReadinessPolicy::default())
            .content(&key("Apple"), expected, ReadMode::Preserve)
            .await
            .unwrap()
            .equals()
            .unwrap();

        let err = TableProbe::new(&backend, "Inventory", ReadinessPolicy::default())
            .with_comparison(ComparisonMode::Union)
            .content(&key("Apple"), expected, ReadMode::Preserve)
            .await
            .unwrap()
            .equals()
            .unwrap_err();
        assert!(err.to_string().contains("expected value at owner is: ops"));
    }

    #[tokio::test]
    async fn missing_table_is_a_service_error() {
        let backend = MemoryBackend::new();
        let err = TableProbe::new(&backend, "Nope", ReadinessPolicy::default())
            .row(&key("Apple"), ReadMode::Consume)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::Service(_)));
    }
}
