use stagehand_core::error::CheckError;
use stagehand_core::types::ObservedRecord;
use tracing::{debug, warn};

use super::{ComparisonMode, Presence, RecordObservation};
use crate::backend::{MessageQueue, ReceivedMessage};

/// 큐 메시지 필드 이름
pub const FIELD_BODY: &str = "body";
pub const FIELD_DEDUPLICATION_ID: &str = "messageDeduplicationId";
pub const FIELD_GROUP_ID: &str = "messageGroupId";

/// 큐에서 메시지 하나를 받아 관찰합니다.
///
/// 받은 메시지는 읽기 모드와 관계없이 항상 삭제됩니다. 삭제 호출이 실패하면
/// [`CheckError::Service`]를 반환합니다.
pub struct QueueProbe<'a, B: MessageQueue> {
    backend: &'a B,
    url: String,
    comparison: ComparisonMode,
}

impl<'a, B: MessageQueue> QueueProbe<'a, B> {
    pub fn new(backend: &'a B, url: impl Into<String>) -> Self {
        Self {
            backend,
            url: url.into(),
            comparison: ComparisonMode::Expected,
        }
    }

    /// 내용 비교 방향을 지정합니다.
    pub fn with_comparison(mut self, mode: ComparisonMode) -> Self {
        self.comparison = mode;
        self
    }

    /// 메시지 존재 여부
    pub async fn message(&self) -> Result<Presence, CheckError> {
        let received = self.receive().await?;
        Ok(Presence::new(
            received.is_some(),
            format!("The sqs queue {} does not have a message", self.url),
            format!("The sqs queue {} does have a message", self.url),
        ))
    }

    /// 메시지 내용
    ///
    /// `expected`의 필드 이름은 `body`, `messageDeduplicationId`, `messageGroupId`입니다.
    /// 메시지가 없으면 바로 단언 실패를 반환합니다.
    pub async fn message_content(
        &self,
        expected: impl Into<ObservedRecord>,
    ) -> Result<RecordObservation, CheckError> {
        let Some(actual) = self.receive().await? else {
            return Err(CheckError::Assertion(format!(
                "The sqs queue {} does not have a message",
                self.url
            )));
        };
        Ok(RecordObservation::queue(
            &self.url,
            expected.into(),
            actual,
            self.comparison,
        ))
    }

    async fn receive(&self) -> Result<Option<ObservedRecord>, CheckError> {
        let Some(message) = self.backend.receive_message(&self.url).await? else {
            debug!(url = self.url.as_str(), "queue is empty");
            return Ok(None);
        };
        match message.receipt_handle.as_deref() {
            Some(handle) => self.backend.delete_message(&self.url, handle).await?,
            None => {
                warn!(
                    url = self.url.as_str(),
                    "could not delete message because receipt handle was undefined"
                );
            }
        }
        Ok(Some(message_record(message)))
    }
}

fn message_record(message: ReceivedMessage) -> ObservedRecord {
    let mut record = ObservedRecord::new().with(FIELD_BODY, message.body);
    if let Some(id) = message.deduplication_id {
        record = record.with(FIELD_DEDUPLICATION_ID, id);
    }
    if let Some(id) = message.group_id {
        record = record.with(FIELD_GROUP_ID, id);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::OutgoingMessage;
    use crate::memory::MemoryBackend;

    async fn fifo_queue() -> (MemoryBackend, String) {
        let backend = MemoryBackend::new();
        let url = backend.create_queue("events.fifo", true).await.unwrap();
        (backend, url)
    }

    #[tokio::test]
    async fn receiving_deletes_the_message() {
        let (backend, url) = fifo_queue().await;
        backend
            .send_message(
                &url,
                OutgoingMessage::new("hello")
                    .with_group("inventory")
                    .with_deduplication_id("1"),
            )
            .await
            .unwrap();

        let probe = QueueProbe::new(&backend, url.as_str());
        probe.message().await.unwrap().exists().unwrap();
        probe.message().await.unwrap().not_exists().unwrap();
        assert_eq!(backend.queue_depth(&url).await, 0);
    }

    #[tokio::test]
    async fn failed_delete_is_a_service_error() {
        let backend = MemoryBackend::new().failing_message_deletes();
        let url = backend.create_queue("events.fifo", true).await.unwrap();
        backend
            .send_message(
                &url,
                OutgoingMessage::new("hello")
                    .with_group("inventory")
                    .with_deduplication_id("1"),
            )
            .await
            .unwrap();

        let err = QueueProbe::new(&backend, url.as_str())
            .message()
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::Service(_)));
        assert!(err.to_string().contains("AccessDenied"));
    }

    #[tokio::test]
    async fn content_compares_expected_fields_only() {
        let (backend, url) = fifo_queue().await;
        backend
            .send_message(
                &url,
                OutgoingMessage::new("hello")
                    .with_group("inventory")
                    .with_deduplication_id("abc"),
            )
            .await
            .unwrap();

        let observation = QueueProbe::new(&backend, url.as_str())
            .message_content([(FIELD_BODY, "hello"), (FIELD_GROUP_ID, "inventory")])
            .await
            .unwrap();
        observation.equals().unwrap();
        assert_eq!(observation.actual().get(FIELD_DEDUPLICATION_ID), Some("abc"));
    }

    #[tokio::test]
    async fn content_mismatch_message() {
        let (backend, url) = fifo_queue().await;
        backend
            .send_message(
                &url,
                OutgoingMessage::new("actual")
                    .with_group("g")
                    .with_deduplication_id("d"),
            )
            .await
            .unwrap();

        let err = QueueProbe::new(&backend, url.as_str())
            .message_content([(FIELD_BODY, "expected")])
            .await
            .unwrap()
            .equals()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "The sqs queue({url}) message is not equal to the expected message:\nexpected value at body is:\nexpected\nreal value is actual"
            )
        );
    }

    #[tokio::test]
    async fn content_on_empty_queue_fails() {
        let (backend, url) = fifo_queue().await;
        let err = QueueProbe::new(&backend, url.as_str())
            .message_content([(FIELD_BODY, "x")])
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("The sqs queue {url} does not have a message")
        );
    }
}
