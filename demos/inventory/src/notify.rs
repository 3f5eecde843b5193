//! 변경 알림
//!
//! FIFO 큐에 그룹 `inventory`로 보내고, 중복 제거 ID는 매번 새로 만듭니다.

use anyhow::{Context, Result};
use stagehand_fixtures::{MessageQueue, OutgoingMessage};
use uuid::Uuid;

pub const MESSAGE_GROUP: &str = "inventory";

pub async fn publish<B: MessageQueue>(backend: &B, queue_url: &str, text: &str) -> Result<()> {
    let message = OutgoingMessage::new(text)
        .with_group(MESSAGE_GROUP)
        .with_deduplication_id(Uuid::new_v4().to_string());
    backend
        .send_message(queue_url, message)
        .await
        .context("sending inventory notification")
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_fixtures::MemoryBackend;

    #[tokio::test]
    async fn publishes_to_fifo_queue_with_group() {
        let backend = MemoryBackend::new();
        let url = backend.create_queue("changes.fifo", true).await.unwrap();

        publish(&backend, &url, "hello").await.unwrap();

        let received = backend.receive_message(&url).await.unwrap().unwrap();
        assert_eq!(received.body, "hello");
        assert_eq!(received.group_id.as_deref(), Some(MESSAGE_GROUP));
        assert!(received.deduplication_id.is_some());
    }
}
