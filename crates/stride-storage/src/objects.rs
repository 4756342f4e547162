use aws_sdk_s3::Client;
use aws_smithy_types::byte_stream::ByteStream;

use crate::error::StorageError;

/// An object body together with the ETag it was read at.
pub struct VersionedObject {
    pub body: Vec<u8>,
    pub etag: String,
}

/// Whether a write may replace whatever is currently stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteCondition<'a> {
    /// Last writer wins.
    Always,
    /// Only replace the version with this ETag.
    IfMatch(&'a str),
}

/// Fetch an object and its ETag.
pub async fn get_object(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<VersionedObject, StorageError> {
    let resp = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| {
            let err = e.into_service_error();
            if err.is_no_such_key() {
                StorageError::NotFound {
                    key: key.to_string(),
                }
            } else {
                StorageError::GetObject(err.to_string())
            }
        })?;

    let etag = resp
        .e_tag()
        .map(str::to_string)
        .ok_or_else(|| StorageError::GetObject(format!("no ETag returned for {key}")))?;
    let body = resp
        .body
        .collect()
        .await
        .map_err(|e| StorageError::GetObject(e.to_string()))?
        .into_bytes()
        .to_vec();

    Ok(VersionedObject { body, etag })
}

/// Write an object. Returns the new ETag.
///
/// Under [`WriteCondition::IfMatch`] a write that lost to another writer
/// fails with `StorageError::PreconditionFailed`.
pub async fn put_object(
    client: &Client,
    bucket: &str,
    key: &str,
    body: Vec<u8>,
    content_type: &str,
    condition: WriteCondition<'_>,
) -> Result<String, StorageError> {
    let mut req = client
        .put_object()
        .bucket(bucket)
        .key(key)
        .content_type(content_type)
        .body(ByteStream::from(body));

    if let WriteCondition::IfMatch(etag) = condition {
        req = req.if_match(etag);
    }

    let resp = req.send().await.map_err(|e| {
        let status = e.raw_response().map(|r| r.status().as_u16());
        let message = e.into_service_error().to_string();
        if condition != WriteCondition::Always && is_lost_race(status, &message) {
            StorageError::PreconditionFailed {
                key: key.to_string(),
            }
        } else {
            StorageError::PutObject(message)
        }
    })?;

    Ok(resp.e_tag().unwrap_or_default().to_string())
}

/// Whether a failed conditional write lost to a concurrent writer.
///
/// S3 answers 412 for a stale ETag and 409 while another conditional write
/// to the same key is in flight.
pub fn is_lost_race(status: Option<u16>, message: &str) -> bool {
    matches!(status, Some(412 | 409))
        || message.contains("PreconditionFailed")
        || message.contains("ConditionalRequestConflict")
}

/// Every key under `prefix`, across all result pages.
pub async fn list_keys(
    client: &Client,
    bucket: &str,
    prefix: &str,
) -> Result<Vec<String>, StorageError> {
    let mut pages = client
        .list_objects_v2()
        .bucket(bucket)
        .prefix(prefix)
        .into_paginator()
        .send();

    let mut keys = Vec::new();
    while let Some(page) = pages.next().await {
        let page = page.map_err(|e| StorageError::ListObjects(e.into_service_error().to_string()))?;
        keys.extend(page.contents().iter().filter_map(|o| o.key()).map(str::to_string));
    }

    Ok(keys)
}
