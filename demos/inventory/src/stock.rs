//! 재고 테이블
//!
//! 파티션 키는 `Products`, 수량은 숫자 속성 `quantity`입니다.

use anyhow::{Context, Result};
use stagehand_core::types::{AttributeMap, AttributeValue};
use stagehand_fixtures::TableStore;

pub const KEY_ATTRIBUTE: &str = "Products";
pub const QUANTITY_ATTRIBUTE: &str = "quantity";

/// 상품 행의 기본 키
pub fn product_key(product: &str) -> AttributeMap {
    AttributeMap::from([(KEY_ATTRIBUTE.to_owned(), AttributeValue::s(product))])
}

/// 현재 수량에 `amount`를 더해 저장하고 새 수량을 반환합니다.
///
/// 행이 없으면 0에서 시작합니다. 합이 `i64` 범위를 넘으면 저장하지 않고
/// 에러를 반환합니다.
pub async fn adjust_quantity<B: TableStore>(
    backend: &B,
    table: &str,
    product: &str,
    amount: i64,
) -> Result<i64> {
    let key = product_key(product);
    let item = backend
        .get_item(table, &key)
        .await
        .with_context(|| format!("reading stock of '{product}'"))?;

    let current = match item.as_ref().and_then(|item| item.get(QUANTITY_ATTRIBUTE)) {
        Some(value) => value
            .as_scalar()
            .parse::<i64>()
            .with_context(|| format!("stored quantity of '{product}' is not an integer"))?,
        None => 0,
    };
    let quantity = current
        .checked_add(amount)
        .with_context(|| format!("quantity of '{product}' overflows"))?;

    let mut row = key;
    row.insert(QUANTITY_ATTRIBUTE.to_owned(), AttributeValue::n(quantity));
    backend
        .put_item(table, row)
        .await
        .with_context(|| format!("writing stock of '{product}'"))?;
    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_core::types::{KeyDefinition, KeyType};
    use stagehand_fixtures::MemoryBackend;

    async fn backend() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend
            .create_table(
                "stock",
                &[],
                &[KeyDefinition {
                    name: KEY_ATTRIBUTE.to_owned(),
                    key_type: KeyType::Hash,
                }],
            )
            .await
            .unwrap();
        backend
    }

    #[tokio::test]
    async fn missing_row_starts_from_zero() {
        let backend = backend().await;
        assert_eq!(adjust_quantity(&backend, "stock", "table", 20).await.unwrap(), 20);
        assert_eq!(adjust_quantity(&backend, "stock", "table", -5).await.unwrap(), 15);

        let row = backend
            .get_item("stock", &product_key("table"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row[QUANTITY_ATTRIBUTE], AttributeValue::N("15".to_owned()));
    }

    #[tokio::test]
    async fn non_numeric_quantity_is_an_error() {
        let backend = backend().await;
        let mut row = product_key("lamp");
        row.insert(QUANTITY_ATTRIBUTE.to_owned(), AttributeValue::s("lots"));
        backend.put_item("stock", row).await.unwrap();

        let err = adjust_quantity(&backend, "stock", "lamp", 1).await.unwrap_err();
        assert!(format!("{err:#}").contains("stored quantity of 'lamp' is not an integer"));
    }

    #[tokio::test]
    async fn overflowing_quantity_is_an_error() {
        let backend = backend().await;
        adjust_quantity(&backend, "stock", "table", 20).await.unwrap();

        let err = adjust_quantity(&backend, "stock", "table", i64::MAX)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("quantity of 'table' overflows"));

        let row = backend
            .get_item("stock", &product_key("table"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row[QUANTITY_ATTRIBUTE], AttributeValue::N("20".to_owned()));
    }
}
