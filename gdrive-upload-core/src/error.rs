//! Error types for the upload flow.
//!
//! Every variant is terminal: the binary prints its `Display` form as a single
//! `::error::` workflow command and exits non-zero. The messages name the phase
//! that failed and carry the underlying cause.

use thiserror::Error;

use crate::contract::{ClientError, FileMetadata};
use crate::credentials::CredentialsError;
use crate::inputs::ParseBoolError;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("missing input '{0}'")]
    MissingInput(&'static str),

    #[error("error input '{name}': {source}")]
    InvalidInput {
        name: &'static str,
        #[source]
        source: ParseBoolError,
    },

    #[error("base64 decoding of 'credentials' failed with error: {0}")]
    CredentialsDecode(#[source] base64::DecodeError),

    #[error("fetching JWT credentials failed with error: {0}")]
    Credentials(#[source] CredentialsError),

    #[error("authenticating with Google Drive failed with error: {0}")]
    Authenticate(#[source] ClientError),

    #[error("opening file with filename: {filename} failed with error: {source}")]
    OpenFile {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("list files failed with error: {0}")]
    ListFiles(#[source] ClientError),

    #[error("delete file: {id} failed with error: {source}")]
    DeleteFile {
        id: String,
        #[source]
        source: ClientError,
    },

    #[error("creating file: {metadata:?} failed with error: {source}")]
    CreateFile {
        metadata: FileMetadata,
        #[source]
        source: ClientError,
    },

    #[error("setting output '{name}' failed with error: {source}")]
    Output {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}
