//! "Update inventory lambda" 스위트
//!
//! 두 테스트는 같은 리소스를 순서대로 씁니다. 첫 테스트가 로그 파일을
//! 소비하므로 두 번째 테스트의 파일에는 변경 내역 한 줄만 남습니다.

use serde_json::{Value, json};
use stagehand_core::error::CheckError;
use stagehand_fixtures::probe::{FIELD_BODY, FIELD_GROUP_ID};
use stagehand_fixtures::{Backend, ReadMode};
use stagehand_runner::{Harness, RegistryError, Suite, SuiteAbort, SuiteCatalog};

use crate::changelog::{BAD_REQUEST_MESSAGE, todays_log_file};
use crate::notify::MESSAGE_GROUP;
use crate::stock::{KEY_ATTRIBUTE, QUANTITY_ATTRIBUTE, product_key};
use crate::{BUCKET_BINDING, QUEUE_BINDING, TABLE_BINDING};

pub const SUITE_NAME: &str = "Update inventory lambda";

/// 설정의 `[targets.inventory-lambda]`
pub const TARGET_ID: &str = "inventory-lambda";

pub fn register<B: Backend>(suites: &mut SuiteCatalog<B>) -> Result<(), RegistryError> {
    suites.add(Suite::new(SUITE_NAME).located(file!()), |ctx| {
        Box::pin(async move {
            ctx.it("should return 400 when body is wrong", |h| {
                Box::pin(rejects_incomplete_body(h))
            })
            .await?;
            ctx.it(
                "should return 200 when body is correct and should create file",
                |h| Box::pin(records_inventory_change(h)),
            )
            .await?;
            Ok::<_, SuiteAbort>(())
        })
    })
}

async fn rejects_incomplete_body<B: Backend>(h: &Harness<B>) -> Result<(), CheckError> {
    let file = log_file()?;
    h.target(TARGET_ID)?
        .execute(
            json!({ "body": r#"{"action": "20","user": "Philipp"}"# }),
            Value::Null,
        )
        .await?
        .has_return_value(400)?;

    let bucket = h.bucket(h.binding(BUCKET_BINDING)?);
    bucket.file(&file, ReadMode::Preserve).await?.exists()?;
    bucket
        .file_content(&file, BAD_REQUEST_MESSAGE, ReadMode::Consume)
        .await?
        .equals()?;

    h.table(h.binding(TABLE_BINDING)?).table().await?.exists()?;
    h.queue(h.binding(QUEUE_BINDING)?).message().await?.not_exists()
}

async fn records_inventory_change<B: Backend>(h: &Harness<B>) -> Result<(), CheckError> {
    let file = log_file()?;
    h.target(TARGET_ID)?
        .execute(
            json!({ "body": r#"{"product": "table", "action": "20","user": "Philipp"}"# }),
            Value::Null,
        )
        .await?
        .has_return_value(200)?;

    let change = "The user Philipp has changed table with the action 20";
    h.bucket(h.binding(BUCKET_BINDING)?)
        .file_content(&file, change, ReadMode::Consume)
        .await?
        .equals()?;

    let table = h.table(h.binding(TABLE_BINDING)?);
    table.table().await?.exists()?;
    table
        .content(
            &product_key("table"),
            [(KEY_ATTRIBUTE, "table"), (QUANTITY_ATTRIBUTE, "20")],
            ReadMode::Consume,
        )
        .await?
        .equals()?;

    h.queue(h.binding(QUEUE_BINDING)?)
        .message_content([(FIELD_BODY, change), (FIELD_GROUP_ID, MESSAGE_GROUP)])
        .await?
        .equals()
}

fn log_file() -> Result<String, CheckError> {
    todays_log_file().map_err(|e| CheckError::assertion(format!("{e:#}")))
}
