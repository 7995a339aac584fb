//! Command-line and environment interface for gdrive-upload.
//!
//! When run as a GitHub Actions step, the runner passes every `with:` input as
//! an `INPUT_<NAME>` environment variable; each flag below falls back to that
//! variable, so the same binary works from a workflow and from a shell.
//!
//! All flow logic lives in `gdrive-upload-core`. This module only collects the
//! inputs, builds the runtime and the Drive authenticator, and calls
//! [`upload`].

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use gdrive_upload_core::actions::GithubActions;
use gdrive_upload_core::inputs::{
    CREDENTIALS_INPUT, FILENAME_INPUT, FOLDER_ID_INPUT, NAME_INPUT, OVERWRITE_INPUT,
};
use gdrive_upload_core::masking::SecretRegistry;
use gdrive_upload_core::upload::{upload, UploadReport};

use crate::drive::{ServiceAccountAuthenticator, DEFAULT_API_URL};

/// Upload a file to Google Drive and output its download URL.
#[derive(Parser)]
#[clap(
    name = "gdrive-upload",
    version,
    about = "Upload a file to a Google Drive folder and publish its download URL as a step output"
)]
pub struct Cli {
    /// Local path of the file to upload
    #[clap(long, env = "INPUT_FILENAME", default_value = "")]
    pub filename: String,

    /// Name of the file in Drive (defaults to the file's base name)
    #[clap(long, env = "INPUT_NAME", default_value = "")]
    pub name: String,

    /// Id of the Drive folder to upload into
    #[clap(long = "folder-id", env = "INPUT_FOLDERID", default_value = "")]
    pub folder_id: String,

    /// Base64-encoded service account key (JSON)
    #[clap(long, env = "INPUT_CREDENTIALS", default_value = "", hide_env_values = true)]
    pub credentials: String,

    /// Delete remote files with the same name before uploading
    #[clap(long, env = "INPUT_OVERWRITE", default_value = "")]
    pub overwrite: String,

    /// File the runner reads step outputs from
    #[clap(long, env = "GITHUB_OUTPUT")]
    pub github_output: Option<PathBuf>,

    #[clap(long, env = "GDRIVE_API_URL", default_value = DEFAULT_API_URL, hide = true)]
    pub drive_api_url: String,
}

impl Cli {
    /// Workflow-command runtime seeded with this invocation's inputs.
    pub fn actions(&self, secrets: SecretRegistry) -> GithubActions {
        let inputs = HashMap::from([
            (FILENAME_INPUT.to_string(), self.filename.clone()),
            (NAME_INPUT.to_string(), self.name.clone()),
            (FOLDER_ID_INPUT.to_string(), self.folder_id.clone()),
            (CREDENTIALS_INPUT.to_string(), self.credentials.clone()),
            (OVERWRITE_INPUT.to_string(), self.overwrite.clone()),
        ]);
        GithubActions::new(inputs, self.github_output.clone(), secrets)
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: &Cli, actions: &GithubActions) -> Result<UploadReport> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "gdrive-upload starting");

    let authenticator = ServiceAccountAuthenticator::new(cli.drive_api_url.as_str())
        .map_err(|e| anyhow::anyhow!("building HTTP client failed with error: {e}"))?;

    match upload(actions, &authenticator).await {
        Ok(report) => {
            tracing::info!(
                file_id = %report.file_id,
                name = %report.name,
                deleted = report.deleted_ids.len(),
                "Upload complete"
            );
            Ok(report)
        }
        Err(e) => {
            tracing::error!(error = %e, "Upload failed");
            Err(anyhow::Error::new(e))
        }
    }
}
