//! Port for obtaining time-limited upload URLs.

use async_trait::async_trait;

use crate::domain::error::Error;

/// Signing failures raised by upload URL adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// The object store rejected the signing request.
    #[error("upload URL signing failed: {0}")]
    Signing(String),
}

impl From<UploadError> for Error {
    fn from(err: UploadError) -> Self {
        Self::upstream(err.to_string())
    }
}

/// Port producing a time-limited URL a client can PUT an object to.
#[async_trait]
pub trait UploadUrlSigner: Send + Sync {
    /// Obtain an upload URL for `key`.
    async fn presign_upload(&self, key: &str) -> Result<String, UploadError>;
}

/// Deterministic signer for tests and storage-less runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUploadUrlSigner;

#[async_trait]
impl UploadUrlSigner for FixtureUploadUrlSigner {
    async fn presign_upload(&self, key: &str) -> Result<String, UploadError> {
        Ok(format!("https://uploads.invalid/{key}?signature=fixture"))
    }
}
