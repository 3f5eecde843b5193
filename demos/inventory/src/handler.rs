//! 재고 갱신 함수
//!
//! 성공하면 `200`, 요청 형식이 틀리면 로그 파일에 내역을 남기고 `400`을
//! 반환합니다. 서비스 호출 실패는 [`TargetError`]로 올라갑니다.

use anyhow::Result;
use serde_json::{Value, json};
use stagehand_fixtures::Backend;
use stagehand_runner::{InvocationContext, TargetError};
use tracing::{info, warn};

use crate::changelog::{self, BAD_REQUEST_MESSAGE};
use crate::request::InventoryRequest;
use crate::{BUCKET_BINDING, QUEUE_BINDING, TABLE_BINDING, notify, stock};

pub async fn update_inventory<B: Backend>(
    event: Value,
    ctx: InvocationContext<B>,
) -> Result<Value, TargetError> {
    handle(&event, &ctx)
        .await
        .map_err(|e| TargetError::new(format!("{e:#}")))
}

async fn handle<B: Backend>(event: &Value, ctx: &InvocationContext<B>) -> Result<Value> {
    let bucket = ctx.binding(BUCKET_BINDING)?;

    let Some(request) = InventoryRequest::from_event(event) else {
        warn!("inventory request is missing parameters");
        changelog::append(ctx.backend(), bucket, BAD_REQUEST_MESSAGE).await?;
        return Ok(json!(400));
    };

    let table = ctx.binding(TABLE_BINDING)?;
    let queue_url = ctx.binding(QUEUE_BINDING)?;

    let quantity =
        stock::adjust_quantity(ctx.backend(), table, &request.product, request.amount).await?;
    let message = request.change_message();
    changelog::append(ctx.backend(), bucket, &message).await?;
    notify::publish(ctx.backend(), queue_url, &message).await?;

    info!(
        product = %request.product,
        user = %request.user,
        quantity,
        "inventory updated"
    );
    Ok(json!(200))
}
