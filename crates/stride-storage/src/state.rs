//! JSON records on top of [`crate::objects`].

use aws_sdk_s3::Client;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::StorageError;
use crate::objects::{self, WriteCondition};

const JSON: &str = "application/json";

/// A decoded record and the ETag it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub value: T,
    pub etag: String,
}

pub async fn load_versioned<T: DeserializeOwned>(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<Versioned<T>, StorageError> {
    let object = objects::get_object(client, bucket, key).await?;
    Ok(Versioned {
        value: serde_json::from_slice(&object.body)?,
        etag: object.etag,
    })
}

/// A missing key is `Ok(None)`.
pub async fn load_optional<T: DeserializeOwned>(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match load_versioned(client, bucket, key).await {
        Ok(record) => Ok(Some(record.value)),
        Err(StorageError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Upsert. Returns the new ETag.
pub async fn save<T: Serialize + Sync>(
    client: &Client,
    bucket: &str,
    key: &str,
    value: &T,
) -> Result<String, StorageError> {
    let body = serde_json::to_vec(value)?;
    objects::put_object(client, bucket, key, body, JSON, WriteCondition::Always).await
}

/// Replace the record only if it is still at `etag`.
pub async fn save_if_match<T: Serialize + Sync>(
    client: &Client,
    bucket: &str,
    key: &str,
    value: &T,
    etag: &str,
) -> Result<String, StorageError> {
    let body = serde_json::to_vec(value)?;
    objects::put_object(client, bucket, key, body, JSON, WriteCondition::IfMatch(etag)).await
}
