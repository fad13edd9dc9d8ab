//! Error types for the adapter layer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use dcsm_core::RenderError;

/// Errors from infrastructure operations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The cipher binary could not be launched at all (missing from PATH,
    /// not executable).
    #[error("failed to launch {binary}: {source}")]
    CipherSpawn {
        binary: String,
        #[source]
        source: io::Error,
    },

    /// The cipher binary ran and exited non-zero. Carries its stderr so the
    /// operator sees the tool's own diagnostic.
    #[error("age {operation} failed: {stderr}")]
    CipherFailed {
        operation: &'static str,
        stderr: String,
    },

    /// The decrypted bundle is not parseable YAML (or not UTF-8).
    #[error("decrypted secrets are not a valid YAML document: {source}")]
    SecretsParse {
        #[from]
        source: serde_yaml::Error,
    },

    /// The decrypted document is not a mapping at the top level.
    #[error("secrets document must be a mapping, found a {found}")]
    SecretsNotMapping { found: &'static str },

    /// A top-level key in the secrets document is not a string.
    #[error("secret key {key} is not a string")]
    NonStringKey { key: String },

    /// Rendering a template file failed; names the file so the operator can
    /// fix the template or the mapping.
    #[error("error processing {}: {source}", .path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: RenderError,
    },

    /// An I/O operation on a specific path failed.
    #[error("failed to {operation} {}: {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Walking a template directory failed.
    #[error("failed to walk template directory {}: {source}", .dir.display())]
    Walk {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Encrypt guard: the encrypted bundle is at least as new as the
    /// plaintext source.
    #[error("encrypted secrets are newer than secrets source; will not overwrite")]
    BundleNewerThanSource { bundle: PathBuf, source_path: PathBuf },

    /// Decrypt guard: the plaintext source is at least as new as the
    /// encrypted bundle.
    #[error("secret source file is newer than encrypted secrets file; will not overwrite")]
    SourceNewerThanBundle { bundle: PathBuf, source_path: PathBuf },

    /// Keygen refuses to clobber an existing key file.
    #[error("key file {} already exists", .path.display())]
    KeyfileExists { path: PathBuf },
}

/// Convenience result alias for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;
