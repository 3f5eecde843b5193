//! Cloud service abstraction for testability.
//!
//! The [`ObjectStore`], [`TableStore`] and [`MessageQueue`] traits abstract the
//! three services a fixture can live in. Production code uses
//! [`AwsBackend`](crate::aws::AwsBackend) while tests and dry runs use
//! [`MemoryBackend`](crate::memory::MemoryBackend).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌─────────┐
//! │ Provisioner │   │  Teardown   │   │ Probes  │
//! └──────┬──────┘   └──────┬──────┘   └────┬────┘
//!        └─────────────────┼───────────────┘
//!                          ▼
//!                   ┌─────────────┐
//!                   │   Backend   │ (trait)
//!                   └─────────────┘
//!                      │       │
//!                      ▼       ▼
//!                  ┌─────┐ ┌────────┐
//!                  │ AWS │ │ Memory │
//!                  └─────┘ └────────┘
//! ```
//!
//! # Not-found handling
//!
//! A missing object, row, message or queue is legitimate data, not a failure:
//! lookups return `Ok(None)`. [`ServiceError`] is reserved for everything else
//! (throttling, permissions, transport).

use std::future::Future;

use bytes::Bytes;
use stagehand_core::error::ServiceError;
use stagehand_core::types::{
    AttributeDefinition, AttributeMap, KeyDefinition, ReadinessState,
};

/// Object storage operations (S3-like).
pub trait ObjectStore: Send + Sync + 'static {
    /// Creates a bucket in the given region.
    fn create_bucket(
        &self,
        name: &str,
        region: &str,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Returns whether the bucket exists and is reachable.
    fn bucket_exists(&self, name: &str) -> impl Future<Output = Result<bool, ServiceError>> + Send;

    /// Deletes an empty bucket.
    fn delete_bucket(&self, name: &str) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Lists every object key in the bucket.
    fn list_objects(
        &self,
        bucket: &str,
    ) -> impl Future<Output = Result<Vec<String>, ServiceError>> + Send;

    /// Fetches an object body.
    ///
    /// Returns `Ok(None)` when the key does not exist. An existing empty object
    /// is `Ok(Some(Bytes::new()))`.
    fn get_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = Result<Option<Bytes>, ServiceError>> + Send;

    /// Writes (or replaces) an object.
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Deletes an object. Deleting a missing key succeeds.
    fn delete_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;
}

/// Table storage operations (DynamoDB-like).
pub trait TableStore: Send + Sync + 'static {
    /// Issues the create call for a table with one HASH and optional RANGE key.
    fn create_table(
        &self,
        name: &str,
        attributes: &[AttributeDefinition],
        keys: &[KeyDefinition],
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Reports the table status, or `None` when the table does not exist.
    fn table_status(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<ReadinessState>, ServiceError>> + Send;

    /// Deletes a table.
    fn delete_table(&self, name: &str) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Fetches one row by primary key, or `None` when no row matches.
    fn get_item(
        &self,
        table: &str,
        key: &AttributeMap,
    ) -> impl Future<Output = Result<Option<AttributeMap>, ServiceError>> + Send;

    /// Writes (or replaces) a row.
    fn put_item(
        &self,
        table: &str,
        item: AttributeMap,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Deletes a row by primary key. Deleting a missing row succeeds.
    fn delete_item(
        &self,
        table: &str,
        key: &AttributeMap,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;
}

/// A message to enqueue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Message body
    pub body: String,
    /// FIFO group id
    pub group_id: Option<String>,
    /// FIFO deduplication id
    pub deduplication_id: Option<String>,
}

impl OutgoingMessage {
    /// Creates a message with only a body.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// Sets the FIFO group id.
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Sets the FIFO deduplication id.
    pub fn with_deduplication_id(mut self, id: impl Into<String>) -> Self {
        self.deduplication_id = Some(id.into());
        self
    }
}

/// A message handed out by a receive call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Message body
    pub body: String,
    /// Handle required to delete this delivery
    pub receipt_handle: Option<String>,
    /// FIFO group id
    pub group_id: Option<String>,
    /// FIFO deduplication id
    pub deduplication_id: Option<String>,
}

/// Message queue operations (SQS-like).
pub trait MessageQueue: Send + Sync + 'static {
    /// Creates a queue and returns its URL.
    fn create_queue(
        &self,
        name: &str,
        fifo: bool,
    ) -> impl Future<Output = Result<String, ServiceError>> + Send;

    /// Resolves a queue name to its URL, or `None` when the queue does not exist.
    fn queue_url(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, ServiceError>> + Send;

    /// Deletes a queue by URL.
    fn delete_queue(&self, url: &str) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Enqueues a message.
    fn send_message(
        &self,
        url: &str,
        message: OutgoingMessage,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Receives at most one message, including its group and deduplication ids.
    fn receive_message(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Option<ReceivedMessage>, ServiceError>> + Send;

    /// Deletes a received message.
    fn delete_message(
        &self,
        url: &str,
        receipt_handle: &str,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;
}

/// All three services behind one handle.
///
/// Implemented automatically for any type that implements every service trait.
pub trait Backend: ObjectStore + TableStore + MessageQueue {}

impl<T> Backend for T where T: ObjectStore + TableStore + MessageQueue {}
