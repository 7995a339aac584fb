//! # contract: interface to the remote file store
//!
//! This module defines the two traits the upload flow talks to, plus the plain
//! data types that cross them:
//!
//! - [`Authenticator`] turns decoded service-account credentials into a client.
//! - [`DriveClient`] lists, deletes and creates files on behalf of that account.
//!
//! The concrete Google Drive implementation lives in the `gdrive-upload` binary
//! crate. Both traits are annotated for `mockall`, so tests can drive the whole
//! flow without a network.
//!
//! ## Error Handling
//! All methods return the boxed [`ClientError`]. The orchestrator wraps it in
//! the phase-specific [`crate::error::UploadError`] variant.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs::File;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::credentials::ServiceCredentials;

/// Error returned by any remote operation.
pub type ClientError = Box<dyn std::error::Error + Send + Sync>;

/// A file as reported by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    /// Parent folder ids. Listing only returns them when explicitly requested.
    #[serde(default)]
    pub parents: Vec<String>,
}

/// Metadata sent when creating a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    /// Display name of the new file.
    pub name: String,
    /// Folder ids the file is created under.
    pub parents: Vec<String>,
}

/// Operations on the remote store, scoped to one authenticated account.
///
/// `list_files` returns a single page. Callers relying on a complete listing
/// must not assume more than the first page is returned.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DriveClient: Send + Sync {
    /// List files visible to the account (first page only).
    async fn list_files(&self) -> Result<Vec<DriveFile>, ClientError>;

    /// Delete a file by id.
    async fn delete_file(&self, file_id: &str) -> Result<(), ClientError>;

    /// Create a new file with the given metadata, streaming `content` as its body.
    async fn create_file(
        &self,
        metadata: FileMetadata,
        content: File,
    ) -> Result<DriveFile, ClientError>;
}

/// Exchanges service-account credentials for a [`DriveClient`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(
        &self,
        credentials: &ServiceCredentials,
    ) -> Result<Box<dyn DriveClient>, ClientError>;
}
