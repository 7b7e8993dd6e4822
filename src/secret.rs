//! File-based secret loading.
//!
//! Credentials are mounted as files (Docker/Kubernetes secrets) and referenced
//! through `*_FILE` environment variables. A secret that cannot be read is
//! fatal: startup cannot proceed without credentials.

use std::path::Path;

/// Failure to read a credential file. The message deliberately carries the
/// path and I/O cause but never the file contents.
#[derive(Debug, thiserror::Error)]
#[error("Failed to read secret file {path}: {source}")]
pub struct SecretError {
    path: String,
    #[source]
    source: std::io::Error,
}

/// Read a secret from `path`, trimming surrounding whitespace.
///
/// Mounted secret files commonly end with a trailing newline; that newline is
/// not part of the credential.
pub fn read_secret<P: AsRef<Path>>(path: P) -> Result<String, SecretError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| SecretError {
        path: path.display().to_string(),
        source,
    })?;
    Ok(contents.trim().to_string())
}
