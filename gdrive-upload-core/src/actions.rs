//! GitHub Actions runtime: step inputs, outputs and workflow commands.
//!
//! The runner reads `::command::data` lines from the step's stdout. Outputs go
//! to the file named by `GITHUB_OUTPUT` when the runner provides one, and fall
//! back to the legacy `::set-output` command otherwise.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use tracing::{debug, info, warn};

use crate::masking::SecretRegistry;

/// The CI facilities the upload flow needs.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait ActionRuntime: Send + Sync {
    /// Value of a step input, trimmed. Empty when the input was not supplied.
    fn get_input(&self, name: &str) -> String;

    /// Publish a step output.
    fn set_output(&self, name: &str, value: &str) -> io::Result<()>;

    /// Register a secret so the runner and our own logs hide it.
    fn add_mask(&self, secret: &str);
}

/// [`ActionRuntime`] speaking the GitHub Actions workflow-command protocol.
pub struct GithubActions {
    inputs: HashMap<String, String>,
    output_file: Option<PathBuf>,
    secrets: SecretRegistry,
    stdout: Mutex<Box<dyn Write + Send>>,
}

impl GithubActions {
    /// Build a runtime from already-collected inputs, keyed by input name
    /// (`filename`, `folderId`, ...).
    pub fn new(
        inputs: HashMap<String, String>,
        output_file: Option<PathBuf>,
        secrets: SecretRegistry,
    ) -> Self {
        Self {
            inputs,
            output_file: output_file.filter(|p| !p.as_os_str().is_empty()),
            secrets,
            stdout: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Redirect workflow commands to `writer` instead of stdout.
    pub fn with_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.stdout = Mutex::new(Box::new(writer));
        self
    }

    pub fn secrets(&self) -> &SecretRegistry {
        &self.secrets
    }

    /// Report a fatal error to the runner. The message is masked first.
    /// Callers are expected to exit non-zero afterwards.
    pub fn fail(&self, message: &str) {
        let message = self.secrets.redact(message);
        // Nothing sensible left to do if stdout is gone.
        let _ = self.command("error", &escape_data(&message));
    }

    fn command(&self, name: &str, data: &str) -> io::Result<()> {
        let mut out = self.stdout.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(out, "::{name}::{data}")?;
        out.flush()
    }

    fn append_output_file(&self, path: &Path, name: &str, value: &str) -> io::Result<()> {
        let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
        if name.contains(&delimiter) || value.contains(&delimiter) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("output '{name}' contains the delimiter {delimiter}"),
            ));
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        write!(file, "{name}<<{delimiter}\n{value}\n{delimiter}\n")
    }
}

impl ActionRuntime for GithubActions {
    fn get_input(&self, name: &str) -> String {
        self.inputs
            .get(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    fn set_output(&self, name: &str, value: &str) -> io::Result<()> {
        match &self.output_file {
            Some(path) => {
                debug!(output = name, path = %path.display(), "Writing step output to file");
                self.append_output_file(path, name, value)?;
            }
            None => {
                let data = format!(
                    "set-output name={}::{}",
                    escape_property(name),
                    escape_data(&self.secrets.redact(value))
                );
                let mut out = self.stdout.lock().unwrap_or_else(|e| e.into_inner());
                writeln!(out, "::{data}")?;
                out.flush()?;
            }
        }
        info!(output = name, "Step output set");
        Ok(())
    }

    fn add_mask(&self, secret: &str) {
        if secret.is_empty() {
            return;
        }
        self.secrets.add(secret);
        // Our own writers still mask it through the registry.
        if let Err(e) = self.command("add-mask", &escape_data(secret)) {
            warn!(error = %e, "Could not register secret with the runner");
        }
    }
}

/// Escape the data part of a workflow command.
pub fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

/// Escape a workflow command property value.
pub fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}
