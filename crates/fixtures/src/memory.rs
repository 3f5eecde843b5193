//! In-memory backend.
//!
//! 실제 클라우드 계정 없이 전체 수명주기와 단언을 실행하기 위한 백엔드입니다.
//! 테스트 더블이자 `--backend memory` 드라이런 대상입니다.
//!
//! 서비스의 관찰 가능한 동작을 흉내 냅니다:
//! - 생성 직후 일정 횟수의 상태 조회 동안 "준비 중"으로 보고 (`with_settle_polls`)
//! - 비어 있지 않은 버킷 삭제 거부
//! - FIFO 큐는 그룹 ID와 중복 제거 ID를 요구
//! - 수신한 메시지는 삭제 전까지 in-flight 상태로 보관

use std::collections::{BTreeMap, HashSet, VecDeque};

use bytes::Bytes;
use stagehand_core::error::ServiceError;
use stagehand_core::types::{
    AttributeDefinition, AttributeMap, KeyDefinition, ReadinessState, ResourceKind,
};
use tokio::sync::Mutex;

use crate::backend::{
    MessageQueue, ObjectStore, OutgoingMessage, ReceivedMessage, TableStore,
};

const QUEUE_URL_PREFIX: &str = "https://sqs.memory.local/000000000000/";

/// 메모리 기반 백엔드
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    /// 생성 후 "준비 중"으로 보고할 상태 조회 횟수
    settle_polls: u32,
    /// 준비 상태에 도달하지 않음
    never_ready: bool,
    /// 생성 요청을 거부할 리소스 종류
    rejected_creates: HashSet<ResourceKind>,
    /// 삭제 요청을 실패시킬 리소스 종류
    failing_deletes: HashSet<ResourceKind>,
    /// 메시지 삭제 요청을 실패시킴
    failing_message_deletes: bool,
}

#[derive(Default)]
struct MemoryState {
    buckets: BTreeMap<String, MemoryBucket>,
    tables: BTreeMap<String, MemoryTable>,
    queues: BTreeMap<String, MemoryQueue>,
    create_calls: Vec<(ResourceKind, String)>,
    next_receipt: u64,
}

struct MemoryBucket {
    objects: BTreeMap<String, Bytes>,
    pending_polls: u32,
}

struct MemoryTable {
    key_names: Vec<String>,
    items: BTreeMap<AttributeMap, AttributeMap>,
    pending_polls: u32,
}

impl MemoryTable {
    /// 아이템(또는 키)에서 기본 키 속성만 추출합니다.
    fn primary_key(&self, item: &AttributeMap) -> Option<AttributeMap> {
        let key: AttributeMap = self
            .key_names
            .iter()
            .filter_map(|name| item.get(name).map(|v| (name.clone(), v.clone())))
            .collect();
        (key.len() == self.key_names.len()).then_some(key)
    }
}

struct MemoryQueue {
    url: String,
    fifo: bool,
    messages: VecDeque<OutgoingMessage>,
    in_flight: BTreeMap<String, OutgoingMessage>,
    pending_polls: u32,
}

/// 상태 조회 한 번을 소모하고 아직 준비 중인지 반환합니다.
fn consume_poll(pending: &mut u32) -> bool {
    if *pending == 0 {
        return false;
    }
    if *pending != u32::MAX {
        *pending -= 1;
    }
    true
}

impl MemoryBackend {
    /// 즉시 준비되는 빈 백엔드를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 생성된 리소스가 `polls`번의 상태 조회 동안 준비 중으로 보이도록 설정합니다.
    pub fn with_settle_polls(mut self, polls: u32) -> Self {
        self.settle_polls = polls;
        self
    }

    /// 생성된 리소스가 절대 준비되지 않도록 설정합니다.
    pub fn never_ready(mut self) -> Self {
        self.never_ready = true;
        self
    }

    /// 해당 종류의 생성 요청을 거부하도록 설정합니다.
    pub fn rejecting_creates(mut self, kind: ResourceKind) -> Self {
        self.rejected_creates.insert(kind);
        self
    }

    /// 해당 종류의 삭제 요청이 실패하도록 설정합니다.
    pub fn failing_deletes(mut self, kind: ResourceKind) -> Self {
        self.failing_deletes.insert(kind);
        self
    }

    /// 받은 메시지의 삭제 요청이 실패하도록 설정합니다.
    pub fn failing_message_deletes(mut self) -> Self {
        self.failing_message_deletes = true;
        self
    }

    fn initial_pending(&self) -> u32 {
        if self.never_ready {
            u32::MAX
        } else {
            self.settle_polls
        }
    }

    fn check_create(&self, kind: ResourceKind, operation: &str, name: &str) -> Result<(), ServiceError> {
        if self.rejected_creates.contains(&kind) {
            return Err(ServiceError::new(
                operation,
                name,
                "AccessDenied: creation rejected",
            ));
        }
        Ok(())
    }

    fn check_delete(&self, kind: ResourceKind, operation: &str, name: &str) -> Result<(), ServiceError> {
        if self.failing_deletes.contains(&kind) {
            return Err(ServiceError::new(
                operation,
                name,
                "AccessDenied: deletion rejected",
            ));
        }
        Ok(())
    }

    // ─── 검사용 헬퍼 ─────────────────────────────────────────────────

    /// 존재하는 버킷 이름
    pub async fn bucket_names(&self) -> Vec<String> {
        self.state.lock().await.buckets.keys().cloned().collect()
    }

    /// 존재하는 테이블 이름
    pub async fn table_names(&self) -> Vec<String> {
        self.state.lock().await.tables.keys().cloned().collect()
    }

    /// 존재하는 큐 이름
    pub async fn queue_names(&self) -> Vec<String> {
        self.state.lock().await.queues.keys().cloned().collect()
    }

    /// 발행된 생성 요청 (순서대로)
    pub async fn create_calls(&self) -> Vec<(ResourceKind, String)> {
        self.state.lock().await.create_calls.clone()
    }

    /// 큐에 남아 있는 (수신 전) 메시지 수
    pub async fn queue_depth(&self, url: &str) -> usize {
        let state = self.state.lock().await;
        state
            .queues
            .values()
            .find(|q| q.url == url)
            .map_or(0, |q| q.messages.len())
    }

    /// 테이블의 행 수
    pub async fn item_count(&self, table: &str) -> usize {
        let state = self.state.lock().await;
        state.tables.get(table).map_or(0, |t| t.items.len())
    }
}

fn no_such_bucket(operation: &str, bucket: &str) -> ServiceError {
    ServiceError::new(operation, bucket, "NoSuchBucket: the specified bucket does not exist")
}

fn no_such_table(operation: &str, table: &str) -> ServiceError {
    ServiceError::new(
        operation,
        table,
        "ResourceNotFoundException: requested resource not found",
    )
}

fn no_such_queue(operation: &str, url: &str) -> ServiceError {
    ServiceError::new(
        operation,
        url,
        "QueueDoesNotExist: the specified queue does not exist",
    )
}

impl ObjectStore for MemoryBackend {
    async fn create_bucket(&self, name: &str, _region: &str) -> Result<(), ServiceError> {
        self.check_create(ResourceKind::Bucket, "create_bucket", name)?;
        let mut state = self.state.lock().await;
        state
            .create_calls
            .push((ResourceKind::Bucket, name.to_owned()));
        if state.buckets.contains_key(name) {
            return Err(ServiceError::new(
                "create_bucket",
                name,
                "BucketAlreadyOwnedByYou",
            ));
        }
        state.buckets.insert(
            name.to_owned(),
            MemoryBucket {
                objects: BTreeMap::new(),
                pending_polls: self.initial_pending(),
            },
        );
        Ok(())
    }

    async fn bucket_exists(&self, name: &str) -> Result<bool, ServiceError> {
        let mut state = self.state.lock().await;
        Ok(match state.buckets.get_mut(name) {
            Some(bucket) => !consume_poll(&mut bucket.pending_polls),
            None => false,
        })
    }

    async fn delete_bucket(&self, name: &str) -> Result<(), ServiceError> {
        self.check_delete(ResourceKind::Bucket, "delete_bucket", name)?;
        let mut state = self.state.lock().await;
        let Some(bucket) = state.buckets.get(name) else {
            return Err(no_such_bucket("delete_bucket", name));
        };
        if !bucket.objects.is_empty() {
            return Err(ServiceError::new(
                "delete_bucket",
                name,
                "BucketNotEmpty: the bucket you tried to delete is not empty",
            ));
        }
        state.buckets.remove(name);
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, ServiceError> {
        let state = self.state.lock().await;
        state
            .buckets
            .get(bucket)
            .map(|b| b.objects.keys().cloned().collect())
            .ok_or_else(|| no_such_bucket("list_objects", bucket))
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Bytes>, ServiceError> {
        let state = self.state.lock().await;
        let bucket = state
            .buckets
            .get(bucket)
            .ok_or_else(|| no_such_bucket("get_object", bucket))?;
        Ok(bucket.objects.get(key).cloned())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        let bucket = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket("put_object", bucket))?;
        bucket.objects.insert(key.to_owned(), body);
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        let bucket = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket("delete_object", bucket))?;
        bucket.objects.remove(key);
        Ok(())
    }
}

impl TableStore for MemoryBackend {
    async fn create_table(
        &self,
        name: &str,
        _attributes: &[AttributeDefinition],
        keys: &[KeyDefinition],
    ) -> Result<(), ServiceError> {
        self.check_create(ResourceKind::Table, "create_table", name)?;
        let mut state = self.state.lock().await;
        state
            .create_calls
            .push((ResourceKind::Table, name.to_owned()));
        if state.tables.contains_key(name) {
            return Err(ServiceError::new(
                "create_table",
                name,
                "ResourceInUseException: table already exists",
            ));
        }
        state.tables.insert(
            name.to_owned(),
            MemoryTable {
                key_names: keys.iter().map(|k| k.name.clone()).collect(),
                items: BTreeMap::new(),
                pending_polls: self.initial_pending(),
            },
        );
        Ok(())
    }

    async fn table_status(&self, name: &str) -> Result<Option<ReadinessState>, ServiceError> {
        let mut state = self.state.lock().await;
        Ok(state.tables.get_mut(name).map(|table| {
            if consume_poll(&mut table.pending_polls) {
                ReadinessState::Creating
            } else {
                ReadinessState::Active
            }
        }))
    }

    async fn delete_table(&self, name: &str) -> Result<(), ServiceError> {
        self.check_delete(ResourceKind::Table, "delete_table", name)?;
        let mut state = self.state.lock().await;
        state
            .tables
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| no_such_table("delete_table", name))
    }

    async fn get_item(
        &self,
        table: &str,
        key: &AttributeMap,
    ) -> Result<Option<AttributeMap>, ServiceError> {
        let state = self.state.lock().await;
        let table_state = state
            .tables
            .get(table)
            .ok_or_else(|| no_such_table("get_item", table))?;
        let key = table_state.primary_key(key).ok_or_else(|| {
            ServiceError::new(
                "get_item",
                table,
                "ValidationException: the provided key does not match the schema",
            )
        })?;
        Ok(table_state.items.get(&key).cloned())
    }

    async fn put_item(&self, table: &str, item: AttributeMap) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        let table_state = state
            .tables
            .get_mut(table)
            .ok_or_else(|| no_such_table("put_item", table))?;
        let key = table_state.primary_key(&item).ok_or_else(|| {
            ServiceError::new(
                "put_item",
                table,
                "ValidationException: missing the key attributes in the item",
            )
        })?;
        table_state.items.insert(key, item);
        Ok(())
    }

    async fn delete_item(&self, table: &str, key: &AttributeMap) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        let table_state = state
            .tables
            .get_mut(table)
            .ok_or_else(|| no_such_table("delete_item", table))?;
        if let Some(key) = table_state.primary_key(key) {
            table_state.items.remove(&key);
        }
        Ok(())
    }
}

impl MessageQueue for MemoryBackend {
    async fn create_queue(&self, name: &str, fifo: bool) -> Result<String, ServiceError> {
        self.check_create(ResourceKind::Queue, "create_queue", name)?;
        let pending_polls = self.initial_pending();
        let mut state = self.state.lock().await;
        state
            .create_calls
            .push((ResourceKind::Queue, name.to_owned()));
        // SQS create_queue는 같은 속성이면 멱등
        let queue = state
            .queues
            .entry(name.to_owned())
            .or_insert_with(|| MemoryQueue {
                url: format!("{QUEUE_URL_PREFIX}{name}"),
                fifo,
                messages: VecDeque::new(),
                in_flight: BTreeMap::new(),
                pending_polls,
            });
        if queue.fifo != fifo {
            return Err(ServiceError::new(
                "create_queue",
                name,
                "QueueNameExists: a queue with this name and different attributes exists",
            ));
        }
        Ok(queue.url.clone())
    }

    async fn queue_url(&self, name: &str) -> Result<Option<String>, ServiceError> {
        let mut state = self.state.lock().await;
        Ok(match state.queues.get_mut(name) {
            Some(queue) => (!consume_poll(&mut queue.pending_polls)).then(|| queue.url.clone()),
            None => None,
        })
    }

    async fn delete_queue(&self, url: &str) -> Result<(), ServiceError> {
        self.check_delete(ResourceKind::Queue, "delete_queue", url)?;
        let mut state = self.state.lock().await;
        let before = state.queues.len();
        state.queues.retain(|_, q| q.url != url);
        if state.queues.len() == before {
            return Err(no_such_queue("delete_queue", url));
        }
        Ok(())
    }

    async fn send_message(&self, url: &str, message: OutgoingMessage) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        let queue = state
            .queues
            .values_mut()
            .find(|q| q.url == url)
            .ok_or_else(|| no_such_queue("send_message", url))?;
        if queue.fifo && (message.group_id.is_none() || message.deduplication_id.is_none()) {
            return Err(ServiceError::new(
                "send_message",
                url,
                "MissingParameter: FIFO queues require MessageGroupId and MessageDeduplicationId",
            ));
        }
        queue.messages.push_back(message);
        Ok(())
    }

    async fn receive_message(&self, url: &str) -> Result<Option<ReceivedMessage>, ServiceError> {
        let mut state = self.state.lock().await;
        let receipt = state.next_receipt;
        let queue = state
            .queues
            .values_mut()
            .find(|q| q.url == url)
            .ok_or_else(|| no_such_queue("receive_message", url))?;
        let Some(message) = queue.messages.pop_front() else {
            return Ok(None);
        };
        let handle = format!("receipt-{receipt}");
        queue.in_flight.insert(handle.clone(), message.clone());
        state.next_receipt += 1;
        Ok(Some(ReceivedMessage {
            body: message.body,
            receipt_handle: Some(handle),
            group_id: message.group_id,
            deduplication_id: message.deduplication_id,
        }))
    }

    async fn delete_message(&self, url: &str, receipt_handle: &str) -> Result<(), ServiceError> {
        if self.failing_message_deletes {
            return Err(ServiceError::new(
                "delete_message",
                url,
                "AccessDenied: deletion rejected",
            ));
        }
        let mut state = self.state.lock().await;
        let queue = state
            .queues
            .values_mut()
            .find(|q| q.url == url)
            .ok_or_else(|| no_such_queue("delete_message", url))?;
        queue
            .in_flight
            .remove(receipt_handle)
            .map(|_| ())
            .ok_or_else(|| {
                ServiceError::new(
                    "delete_message",
                    url,
                    "ReceiptHandleIsInvalid: the receipt handle is not valid",
                )
            })
    }
}
