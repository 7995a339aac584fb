//! The upload flow: validate → authenticate → open → (delete*)? → create → emit.
//!
//! Every step either succeeds or returns the phase-specific [`UploadError`];
//! nothing is retried, and remote deletions that already happened are not
//! undone when a later step fails. The `downloadURL` output is only written
//! once the new file exists.

use std::path::Path;

use tokio::fs::File;
use tracing::{error, info, warn};

use crate::actions::ActionRuntime;
use crate::contract::{Authenticator, DriveClient, FileMetadata};
use crate::credentials::decode_credentials;
use crate::error::UploadError;
use crate::inputs::InvocationInputs;

/// Name of the step output carrying the download link.
pub const DOWNLOAD_URL_OUTPUT: &str = "downloadURL";

/// Outcome of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub file_id: String,
    pub name: String,
    pub download_url: String,
    /// Ids of remote files removed because of `overwrite`.
    pub deleted_ids: Vec<String>,
}

/// Public download link for a Drive file id. The id is inserted as-is.
pub fn download_url(file_id: &str) -> String {
    format!("https://drive.google.com/uc?id={file_id}&export=download")
}

/// The explicit name if given, else the base name of `filename`.
pub fn display_name(filename: &str, name: &str) -> String {
    if !name.is_empty() {
        return name.to_string();
    }
    Path::new(filename)
        .file_name()
        .map(|base| base.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}

/// Run one complete invocation against the given runtime and authenticator.
pub async fn upload<R, A>(runtime: &R, authenticator: &A) -> Result<UploadReport, UploadError>
where
    R: ActionRuntime + ?Sized,
    A: Authenticator + ?Sized,
{
    let inputs = InvocationInputs::read(runtime)?;
    let credentials = decode_credentials(&inputs.credentials, runtime)?;

    let client = authenticator
        .authenticate(&credentials)
        .await
        .map_err(|e| {
            error!(error = %e, "Authentication failed");
            UploadError::Authenticate(e)
        })?;
    info!("Authenticated with Google Drive");

    let file = File::open(&inputs.filename)
        .await
        .map_err(|source| UploadError::OpenFile {
            filename: inputs.filename.clone(),
            source,
        })?;

    let name = display_name(&inputs.filename, &inputs.name);

    let deleted_ids = if inputs.overwrite {
        delete_existing(client.as_ref(), &inputs.filename).await?
    } else {
        Vec::new()
    };

    let metadata = FileMetadata {
        name: name.clone(),
        parents: vec![inputs.folder_id.clone()],
    };
    info!(name = %metadata.name, folder_id = %inputs.folder_id, "Uploading file");
    let created = client
        .create_file(metadata.clone(), file)
        .await
        .map_err(|source| {
            error!(error = %source, name = %metadata.name, "Create file failed");
            UploadError::CreateFile { metadata, source }
        })?;
    info!(file_id = %created.id, "File uploaded");

    let url = download_url(&created.id);
    runtime
        .set_output(DOWNLOAD_URL_OUTPUT, &url)
        .map_err(|source| UploadError::Output {
            name: DOWNLOAD_URL_OUTPUT,
            source,
        })?;

    Ok(UploadReport {
        file_id: created.id,
        name,
        download_url: url,
        deleted_ids,
    })
}

/// Delete every listed file whose name equals `filename`, returning the
/// deleted ids. Stops at the first failure.
///
/// Matching is against the literal `filename` input, not the display name the
/// file is uploaded under, so a custom `name` is never matched here.
pub async fn delete_existing(
    client: &dyn DriveClient,
    filename: &str,
) -> Result<Vec<String>, UploadError> {
    let files = client.list_files().await.map_err(|e| {
        error!(error = %e, "List files failed");
        UploadError::ListFiles(e)
    })?;
    info!(count = files.len(), "Listed remote files");

    let mut deleted = Vec::new();
    for file in files.into_iter().filter(|f| f.name == filename) {
        client
            .delete_file(&file.id)
            .await
            .map_err(|source| {
                warn!(file_id = %file.id, deleted = deleted.len(), "Delete failed, earlier deletions are kept");
                UploadError::DeleteFile {
                    id: file.id.clone(),
                    source,
                }
            })?;
        info!(file_id = %file.id, name = %file.name, "Deleted existing remote file");
        deleted.push(file.id);
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_url_keeps_reserved_characters() {
        assert_eq!(
            download_url("a&b=c?d/e#f"),
            "https://drive.google.com/uc?id=a&b=c?d/e#f&export=download"
        );
    }

    #[test]
    fn display_name_prefers_explicit_name() {
        assert_eq!(display_name("dist/app.zip", "release.zip"), "release.zip");
    }

    #[test]
    fn display_name_defaults_to_base_name() {
        assert_eq!(display_name("dist/build/app.zip", ""), "app.zip");
        assert_eq!(display_name("report.csv", ""), "report.csv");
    }

    #[test]
    fn display_name_falls_back_to_raw_filename() {
        assert_eq!(display_name("..", ""), "..");
    }
}
