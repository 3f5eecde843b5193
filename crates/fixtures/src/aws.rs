//! AWS backend (S3, DynamoDB, SQS).
//!
//! Not-found responses are mapped to `Ok(None)` / `Ok(false)`; every other SDK
//! error becomes a [`ServiceError`] carrying the full error context.

use std::collections::HashMap;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::types as ddb;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_sqs::types::{MessageSystemAttributeName, QueueAttributeName};
use bytes::Bytes;
use stagehand_core::error::ServiceError;
use stagehand_core::types::{
    AttributeDefinition, AttributeMap, AttributeValue, KeyDefinition, KeyType, ReadinessState,
};
use tracing::{debug, info};

use crate::backend::{MessageQueue, ObjectStore, OutgoingMessage, ReceivedMessage, TableStore};

/// Region that rejects an explicit location constraint on bucket creation.
const DEFAULT_S3_REGION: &str = "us-east-1";

/// Real AWS services behind the [`Backend`](crate::backend::Backend) traits.
#[derive(Clone)]
pub struct AwsBackend {
    s3: aws_sdk_s3::Client,
    dynamodb: aws_sdk_dynamodb::Client,
    sqs: aws_sdk_sqs::Client,
}

fn service_error<E>(operation: &str, resource: &str, err: E) -> ServiceError
where
    E: std::error::Error,
{
    ServiceError::new(operation, resource, DisplayErrorContext(err))
}

impl AwsBackend {
    /// Loads the default credential chain for `region`.
    ///
    /// An `endpoint_url` (e.g. a local emulator) also switches S3 to path-style
    /// addressing.
    pub async fn connect(region: &str, endpoint_url: Option<&str>) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_owned()));
        if let Some(endpoint) = endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let mut s3_builder = aws_sdk_s3::config::Builder::from(&shared);
        if endpoint_url.is_some() {
            s3_builder = s3_builder.force_path_style(true);
        }

        info!(region, endpoint = endpoint_url.unwrap_or("default"), "aws backend connected");
        Self {
            s3: aws_sdk_s3::Client::from_conf(s3_builder.build()),
            dynamodb: aws_sdk_dynamodb::Client::new(&shared),
            sqs: aws_sdk_sqs::Client::new(&shared),
        }
    }
}

// ─── S3 ──────────────────────────────────────────────────────────────

impl ObjectStore for AwsBackend {
    async fn create_bucket(&self, name: &str, region: &str) -> Result<(), ServiceError> {
        let mut request = self.s3.create_bucket().bucket(name);
        if region != DEFAULT_S3_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }
        request
            .send()
            .await
            .map_err(|e| service_error("create_bucket", name, e))?;
        Ok(())
    }

    async fn bucket_exists(&self, name: &str) -> Result<bool, ServiceError> {
        match self.s3.head_bucket().bucket(name).send().await {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(service_error("head_bucket", name, e)),
        }
    }

    async fn delete_bucket(&self, name: &str) -> Result<(), ServiceError> {
        self.s3
            .delete_bucket()
            .bucket(name)
            .send()
            .await
            .map_err(|e| service_error("delete_bucket", name, e))?;
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, ServiceError> {
        let mut keys = Vec::new();
        let mut pages = self
            .s3
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| service_error("list_objects_v2", bucket, e))?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_owned)),
            );
        }
        Ok(keys)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Bytes>, ServiceError> {
        let output = match self.s3.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => {
                debug!(bucket, key, "object not found");
                return Ok(None);
            }
            Err(e) => return Err(service_error("get_object", bucket, e)),
        };
        let body = output
            .body
            .collect()
            .await
            .map_err(|e| service_error("get_object", bucket, e))?;
        Ok(Some(body.into_bytes()))
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), ServiceError> {
        self.s3
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| service_error("put_object", bucket, e))?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ServiceError> {
        self.s3
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| service_error("delete_object", bucket, e))?;
        Ok(())
    }
}

// ─── DynamoDB ────────────────────────────────────────────────────────

fn to_sdk_value(value: &AttributeValue) -> ddb::AttributeValue {
    match value {
        AttributeValue::S(s) => ddb::AttributeValue::S(s.clone()),
        AttributeValue::N(n) => ddb::AttributeValue::N(n.clone()),
        AttributeValue::Bool(b) => ddb::AttributeValue::Bool(*b),
        AttributeValue::Null => ddb::AttributeValue::Null(true),
    }
}

fn from_sdk_value(value: &ddb::AttributeValue) -> AttributeValue {
    match value {
        ddb::AttributeValue::S(s) => AttributeValue::S(s.clone()),
        ddb::AttributeValue::N(n) => AttributeValue::N(n.clone()),
        ddb::AttributeValue::Bool(b) => AttributeValue::Bool(*b),
        ddb::AttributeValue::Null(_) => AttributeValue::Null,
        // 집합/리스트/맵/바이너리는 디버그 표현으로 평탄화
        other => AttributeValue::S(format!("{other:?}")),
    }
}

fn to_sdk_map(map: &AttributeMap) -> HashMap<String, ddb::AttributeValue> {
    map.iter()
        .map(|(k, v)| (k.clone(), to_sdk_value(v)))
        .collect()
}

fn table_state(status: &ddb::TableStatus) -> ReadinessState {
    match status {
        ddb::TableStatus::Active => ReadinessState::Active,
        ddb::TableStatus::Creating => ReadinessState::Creating,
        ddb::TableStatus::Updating
        | ddb::TableStatus::Deleting
        | ddb::TableStatus::Archiving => ReadinessState::Transitioning,
        _ => ReadinessState::Unknown,
    }
}

impl TableStore for AwsBackend {
    async fn create_table(
        &self,
        name: &str,
        attributes: &[AttributeDefinition],
        keys: &[KeyDefinition],
    ) -> Result<(), ServiceError> {
        let attribute_definitions = attributes
            .iter()
            .map(|a| {
                ddb::AttributeDefinition::builder()
                    .attribute_name(&a.name)
                    .attribute_type(ddb::ScalarAttributeType::from(a.attribute_type.as_str()))
                    .build()
                    .map_err(|e| service_error("create_table", name, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let key_schema = keys
            .iter()
            .map(|k| {
                let key_type = match k.key_type {
                    KeyType::Hash => ddb::KeyType::Hash,
                    KeyType::Range => ddb::KeyType::Range,
                };
                ddb::KeySchemaElement::builder()
                    .attribute_name(&k.name)
                    .key_type(key_type)
                    .build()
                    .map_err(|e| service_error("create_table", name, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let throughput = ddb::ProvisionedThroughput::builder()
            .read_capacity_units(1)
            .write_capacity_units(1)
            .build()
            .map_err(|e| service_error("create_table", name, e))?;

        self.dynamodb
            .create_table()
            .table_name(name)
            .set_attribute_definitions(Some(attribute_definitions))
            .set_key_schema(Some(key_schema))
            .provisioned_throughput(throughput)
            .send()
            .await
            .map_err(|e| service_error("create_table", name, e))?;
        Ok(())
    }

    async fn table_status(&self, name: &str) -> Result<Option<ReadinessState>, ServiceError> {
        match self.dynamodb.describe_table().table_name(name).send().await {
            Ok(output) => Ok(Some(
                output
                    .table()
                    .and_then(|t| t.table_status())
                    .map_or(ReadinessState::Unknown, table_state),
            )),
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception()) =>
            {
                Ok(None)
            }
            Err(e) => Err(service_error("describe_table", name, e)),
        }
    }

    async fn delete_table(&self, name: &str) -> Result<(), ServiceError> {
        self.dynamodb
            .delete_table()
            .table_name(name)
            .send()
            .await
            .map_err(|e| service_error("delete_table", name, e))?;
        Ok(())
    }

    async fn get_item(
        &self,
        table: &str,
        key: &AttributeMap,
    ) -> Result<Option<AttributeMap>, ServiceError> {
        let output = self
            .dynamodb
            .get_item()
            .table_name(table)
            .set_key(Some(to_sdk_map(key)))
            .send()
            .await
            .map_err(|e| service_error("get_item", table, e))?;
        Ok(output.item().map(|item| {
            item.iter()
                .map(|(k, v)| (k.clone(), from_sdk_value(v)))
                .collect()
        }))
    }

    async fn put_item(&self, table: &str, item: AttributeMap) -> Result<(), ServiceError> {
        self.dynamodb
            .put_item()
            .table_name(table)
            .set_item(Some(to_sdk_map(&item)))
            .send()
            .await
            .map_err(|e| service_error("put_item", table, e))?;
        Ok(())
    }

    async fn delete_item(&self, table: &str, key: &AttributeMap) -> Result<(), ServiceError> {
        self.dynamodb
            .delete_item()
            .table_name(table)
            .set_key(Some(to_sdk_map(key)))
            .send()
            .await
            .map_err(|e| service_error("delete_item", table, e))?;
        Ok(())
    }
}

// ─── SQS ─────────────────────────────────────────────────────────────

impl MessageQueue for AwsBackend {
    async fn create_queue(&self, name: &str, fifo: bool) -> Result<String, ServiceError> {
        let mut request = self.sqs.create_queue().queue_name(name);
        if fifo {
            request = request.attributes(QueueAttributeName::FifoQueue, "true");
        }
        let output = request
            .send()
            .await
            .map_err(|e| service_error("create_queue", name, e))?;
        output
            .queue_url()
            .map(str::to_owned)
            .ok_or_else(|| ServiceError::new("create_queue", name, "response had no queue url"))
    }

    async fn queue_url(&self, name: &str) -> Result<Option<String>, ServiceError> {
        match self.sqs.get_queue_url().queue_name(name).send().await {
            Ok(output) => Ok(output.queue_url().map(str::to_owned)),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_queue_does_not_exist()) => {
                Ok(None)
            }
            Err(e) => Err(service_error("get_queue_url", name, e)),
        }
    }

    async fn delete_queue(&self, url: &str) -> Result<(), ServiceError> {
        self.sqs
            .delete_queue()
            .queue_url(url)
            .send()
            .await
            .map_err(|e| service_error("delete_queue", url, e))?;
        Ok(())
    }

    async fn send_message(&self, url: &str, message: OutgoingMessage) -> Result<(), ServiceError> {
        self.sqs
            .send_message()
            .queue_url(url)
            .message_body(message.body)
            .set_message_group_id(message.group_id)
            .set_message_deduplication_id(message.deduplication_id)
            .send()
            .await
            .map_err(|e| service_error("send_message", url, e))?;
        Ok(())
    }

    async fn receive_message(&self, url: &str) -> Result<Option<ReceivedMessage>, ServiceError> {
        let output = self
            .sqs
            .receive_message()
            .queue_url(url)
            .max_number_of_messages(1)
            .message_system_attribute_names(MessageSystemAttributeName::MessageDeduplicationId)
            .message_system_attribute_names(MessageSystemAttributeName::MessageGroupId)
            .send()
            .await
            .map_err(|e| service_error("receive_message", url, e))?;
        let Some(message) = output.messages().first() else {
            return Ok(None);
        };
        let attribute = |name: MessageSystemAttributeName| {
            message
                .attributes()
                .and_then(|attrs| attrs.get(&name))
                .cloned()
        };
        Ok(Some(ReceivedMessage {
            body: message.body().unwrap_or_default().to_owned(),
            receipt_handle: message.receipt_handle().map(str::to_owned),
            group_id: attribute(MessageSystemAttributeName::MessageGroupId),
            deduplication_id: attribute(MessageSystemAttributeName::MessageDeduplicationId),
        }))
    }

    async fn delete_message(&self, url: &str, receipt_handle: &str) -> Result<(), ServiceError> {
        self.sqs
            .delete_message()
            .queue_url(url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| service_error("delete_message", url, e))?;
        Ok(())
    }
}
