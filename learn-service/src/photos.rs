use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mongodb::bson::oid::ObjectId;
use store::Error;
use tracing::info;

use crate::error::ApiError;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

/// A captured identity photo as sent by the browser.
#[derive(Clone, Debug, PartialEq)]
pub struct Photo {
    pub content_type: &'static str,
    /// Decoded image bytes.
    pub body: Vec<u8>,
}

impl Photo {
    /// Accepts `data:image/jpeg;base64,...` and `data:image/png;base64,...`.
    ///
    /// The payload must decode to an image of the declared type.
    pub fn from_data_url(data_url: String) -> Result<Self, Error> {
        let Some(rest) = data_url.strip_prefix("data:") else {
            return Err(Error::Validation("image must be a data URL".to_string()));
        };
        let Some((mime, payload)) = rest.split_once(";base64,") else {
            return Err(Error::Validation("image must be base64 encoded".to_string()));
        };
        let (content_type, magic) = match mime {
            "image/jpeg" => ("image/jpeg", JPEG_MAGIC),
            "image/png" => ("image/png", PNG_MAGIC),
            other => {
                return Err(Error::Validation(format!(
                    "unsupported image type {other}"
                )));
            }
        };
        if payload.is_empty() {
            return Err(Error::Validation("image is empty".to_string()));
        }

        let body = STANDARD
            .decode(payload)
            .map_err(|e| Error::Validation(format!("image is not valid base64: {e}")))?;
        if !body.starts_with(magic) {
            return Err(Error::Validation(format!("image is not a valid {content_type}")));
        }

        Ok(Photo { content_type, body })
    }
}

/// `<userId>/<courseId>/<millis>`
pub fn photo_key(user_id: &ObjectId, course_id: &ObjectId) -> String {
    let now = chrono::Utc::now().timestamp_millis();
    format!("{user_id}/{course_id}/{now}")
}

#[async_trait]
pub trait PhotoStorage: Send + Sync {
    async fn put_photo(&self, key: &str, photo: Photo) -> Result<(), ApiError>;
    async fn delete_photo(&self, key: &str) -> Result<(), ApiError>;
}

pub struct S3Photos {
    client: aws_sdk_s3::Client,
    bucket_name: String,
}

impl S3Photos {
    pub fn new(client: aws_sdk_s3::Client, bucket_name: String) -> Self {
        S3Photos {
            client,
            bucket_name,
        }
    }
}

#[async_trait]
impl PhotoStorage for S3Photos {
    async fn put_photo(&self, key: &str, photo: Photo) -> Result<(), ApiError> {
        let put_object_output = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(photo.content_type)
            .body(photo.body.into())
            .send()
            .await
            .map_err(|e| ApiError::Upload(format!("{e:?}")))?;

        let expiry = put_object_output.expiration;
        info!(key, "Photo stored. Object expiry: {expiry:?}");

        Ok(())
    }

    async fn delete_photo(&self, key: &str) -> Result<(), ApiError> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| ApiError::Upload(format!("{e:?}")))?;
        info!(key, "Photo deleted");
        Ok(())
    }
}
