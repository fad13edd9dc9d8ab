//! Invocation of the external `age` encryption tool.
//!
//! DCSM implements no cryptography itself: `age` is an opaque collaborator
//! that either succeeds (producing bytes) or fails (producing a diagnostic
//! on stderr). Commands run with a cleared environment so nothing from the
//! caller's environment leaks into the child process.

use std::path::Path;
use std::process::Command;

use tracing::{debug, instrument};

use crate::error::{AdapterError, Result};

/// The encrypt/decrypt/keygen seam.
///
/// [`AgeClient`] is the production implementation; tests substitute a fake
/// so adapter logic can be exercised without the binaries installed.
pub trait Cipher {
    /// Decrypt `input` with the identity in `keyfile`, returning plaintext.
    fn decrypt_to_memory(&self, keyfile: &Path, input: &Path) -> Result<Vec<u8>>;

    /// Decrypt `input` into `output` on disk.
    fn decrypt_to_file(&self, keyfile: &Path, input: &Path, output: &Path) -> Result<()>;

    /// Encrypt `input` into `output` for the identity in `keyfile`.
    fn encrypt_to_file(&self, keyfile: &Path, input: &Path, output: &Path) -> Result<()>;

    /// Generate a new identity file at `output`.
    fn keygen(&self, output: &Path) -> Result<()>;
}

/// Production cipher that shells out to `age` / `age-keygen`.
#[derive(Debug, Clone)]
pub struct AgeClient {
    age_bin: String,
    keygen_bin: String,
}

impl AgeClient {
    pub fn new() -> Self {
        Self {
            age_bin: "age".to_string(),
            keygen_bin: "age-keygen".to_string(),
        }
    }

    /// Override the binary names, e.g. for absolute paths.
    pub fn with_binaries(age_bin: impl Into<String>, keygen_bin: impl Into<String>) -> Self {
        Self {
            age_bin: age_bin.into(),
            keygen_bin: keygen_bin.into(),
        }
    }

    /// Run a prepared command, mapping launch failures and non-zero exits.
    fn run(&self, binary: &str, mut cmd: Command, operation: &'static str) -> Result<Vec<u8>> {
        debug!(binary, operation, "invoking cipher binary");

        cmd.env_clear();
        // PATH survives the scrub so a bare binary name still resolves.
        if let Some(path) = std::env::var_os("PATH") {
            cmd.env("PATH", path);
        }

        let output = cmd
            .output()
            .map_err(|source| AdapterError::CipherSpawn {
                binary: binary.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(AdapterError::CipherFailed {
                operation,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

impl Default for AgeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Cipher for AgeClient {
    #[instrument(skip_all, fields(input = %input.display()))]
    fn decrypt_to_memory(&self, keyfile: &Path, input: &Path) -> Result<Vec<u8>> {
        let mut cmd = Command::new(&self.age_bin);
        cmd.arg("--decrypt")
            .arg("--identity")
            .arg(keyfile)
            .arg(input);
        self.run(&self.age_bin, cmd, "decryption")
    }

    #[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
    fn decrypt_to_file(&self, keyfile: &Path, input: &Path, output: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.age_bin);
        cmd.arg("--decrypt")
            .arg("--identity")
            .arg(keyfile)
            .arg("--output")
            .arg(output)
            .arg(input);
        self.run(&self.age_bin, cmd, "decryption").map(|_| ())
    }

    #[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
    fn encrypt_to_file(&self, keyfile: &Path, input: &Path, output: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.age_bin);
        cmd.arg("--encrypt")
            .arg("--identity")
            .arg(keyfile)
            .arg("--output")
            .arg(output)
            .arg(input);
        self.run(&self.age_bin, cmd, "encryption").map(|_| ())
    }

    #[instrument(skip_all, fields(output = %output.display()))]
    fn keygen(&self, output: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.keygen_bin);
        cmd.arg("--output").arg(output);
        self.run(&self.keygen_bin, cmd, "key generation").map(|_| ())
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
