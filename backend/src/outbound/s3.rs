//! Presigned S3 upload URLs for listing photos.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;

use crate::domain::ports::{UploadError, UploadUrlSigner};

const UPLOAD_URL_TTL: Duration = Duration::from_secs(3600);

/// [`UploadUrlSigner`] producing presigned `PUT` URLs against one bucket.
pub struct S3UploadSigner {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3UploadSigner {
    /// Build a signer from the ambient AWS configuration (region and
    /// credentials come from the environment/instance profile).
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            client: aws_sdk_s3::Client::new(&config),
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl UploadUrlSigner for S3UploadSigner {
    async fn presign_upload(&self, key: &str) -> Result<String, UploadError> {
        let presigning = PresigningConfig::expires_in(UPLOAD_URL_TTL)
            .map_err(|err| UploadError::Signing(err.to_string()))?;
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|err| UploadError::Signing(err.to_string()))?;
        Ok(presigned.uri().to_string())
    }
}
