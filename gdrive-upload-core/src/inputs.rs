use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::actions::ActionRuntime;
use crate::error::UploadError;

pub const FILENAME_INPUT: &str = "filename";
pub const NAME_INPUT: &str = "name";
pub const FOLDER_ID_INPUT: &str = "folderId";
pub const CREDENTIALS_INPUT: &str = "credentials";
pub const OVERWRITE_INPUT: &str = "overwrite";

/// Validated step inputs for one invocation.
#[derive(Clone)]
pub struct InvocationInputs {
    /// Local path of the file to upload.
    pub filename: String,
    /// Display name in Drive. Empty means "use the file's base name".
    pub name: String,
    pub folder_id: String,
    /// Base64-encoded service-account key. Secret.
    pub credentials: String,
    pub overwrite: bool,
}

impl InvocationInputs {
    /// Read and validate all inputs. Fails on the first missing required input,
    /// in the order filename, folderId, credentials.
    pub fn read<R>(runtime: &R) -> Result<Self, UploadError>
    where
        R: ActionRuntime + ?Sized,
    {
        let filename = required(runtime, FILENAME_INPUT)?;
        let name = runtime.get_input(NAME_INPUT);
        let folder_id = required(runtime, FOLDER_ID_INPUT)?;
        let credentials = required(runtime, CREDENTIALS_INPUT)?;

        let overwrite = match runtime.get_input(OVERWRITE_INPUT).as_str() {
            "" => false,
            raw => parse_bool(raw).map_err(|source| UploadError::InvalidInput {
                name: OVERWRITE_INPUT,
                source,
            })?,
        };

        info!(
            filename = %filename,
            name = %name,
            folder_id = %folder_id,
            overwrite,
            "Step inputs validated"
        );

        Ok(Self {
            filename,
            name,
            folder_id,
            credentials,
            overwrite,
        })
    }
}

impl fmt::Debug for InvocationInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationInputs")
            .field("filename", &self.filename)
            .field("name", &self.name)
            .field("folder_id", &self.folder_id)
            .field("credentials", &"<redacted>")
            .field("overwrite", &self.overwrite)
            .finish()
    }
}

fn required<R>(runtime: &R, name: &'static str) -> Result<String, UploadError>
where
    R: ActionRuntime + ?Sized,
{
    let value = runtime.get_input(name);
    if value.is_empty() {
        debug!(input = name, "Required input is empty");
        return Err(UploadError::MissingInput(name));
    }
    Ok(value)
}

/// Error for a value outside the accepted boolean spellings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid boolean {value:?} (expected one of 1, t, T, TRUE, true, True, 0, f, F, FALSE, false, False)")]
pub struct ParseBoolError {
    pub value: String,
}

/// Parse a boolean the way the Actions ecosystem historically accepts them.
pub fn parse_bool(raw: &str) -> Result<bool, ParseBoolError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(ParseBoolError {
            value: other.to_string(),
        }),
    }
}
