//! Tracing setup. Logs go to stderr so stdout stays reserved for workflow
//! commands, and every line is passed through the secret registry first.

use std::io::{self, Write};

use gdrive_upload_core::masking::SecretRegistry;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Writer that masks registered secrets before forwarding to `inner`.
pub struct MaskingWriter<W> {
    secrets: SecretRegistry,
    inner: W,
}

impl<W: Write> MaskingWriter<W> {
    pub fn new(secrets: SecretRegistry, inner: W) -> Self {
        Self { secrets, inner }
    }
}

impl<W: Write> Write for MaskingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        self.inner.write_all(self.secrets.redact(&text).as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// [`MakeWriter`] producing masked stderr writers.
#[derive(Clone)]
pub struct MaskedStderr {
    secrets: SecretRegistry,
}

impl MaskedStderr {
    pub fn new(secrets: SecretRegistry) -> Self {
        Self { secrets }
    }
}

impl<'a> MakeWriter<'a> for MaskedStderr {
    type Writer = MaskingWriter<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        MaskingWriter::new(self.secrets.clone(), io::stderr())
    }
}

/// Install the global subscriber. Level comes from `RUST_LOG`, default `info`.
pub fn init(secrets: SecretRegistry) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(MaskedStderr::new(secrets))
        .with_ansi(false)
        .try_init();
    if let Err(e) = installed {
        eprintln!("tracing subscriber already installed: {e}");
    }
}
