//! Encrypted-bundle operations with modification-time guards.
//!
//! `encrypt` and `decrypt` are symmetric: each refuses to overwrite its
//! output when that output carries data at least as new as the input, so a
//! forgotten re-encrypt can never silently lose edits. The guards compare
//! the [`FileInfo`] snapshots taken at startup.

use tracing::{info, instrument};

use crate::age::Cipher;
use crate::error::{AdapterError, Result};
use crate::fileinfo::FileInfo;

/// Encrypt the plaintext source into the bundle.
///
/// Proceeds when the bundle does not exist yet, or when the source is
/// strictly newer than the bundle. `force` skips the guard entirely.
#[instrument(skip_all, fields(source = %source.path().display(), bundle = %bundle.path().display()))]
pub fn encrypt_source(
    cipher: &dyn Cipher,
    keyfile: &FileInfo,
    bundle: &FileInfo,
    source: &FileInfo,
    force: bool,
) -> Result<()> {
    let source_is_newer = force || !bundle.exists() || source.is_newer_than(bundle);
    if !source_is_newer {
        return Err(AdapterError::BundleNewerThanSource {
            bundle: bundle.path().to_path_buf(),
            source_path: source.path().to_path_buf(),
        });
    }

    cipher.encrypt_to_file(keyfile.path(), source.path(), bundle.path())?;
    info!("source encrypted into bundle");
    Ok(())
}

/// Decrypt the bundle back out to the plaintext source.
///
/// Proceeds when the source does not exist yet, or when the bundle is
/// strictly newer than the source. `force` skips the guard entirely.
#[instrument(skip_all, fields(bundle = %bundle.path().display(), source = %source.path().display()))]
pub fn decrypt_bundle(
    cipher: &dyn Cipher,
    keyfile: &FileInfo,
    bundle: &FileInfo,
    source: &FileInfo,
    force: bool,
) -> Result<()> {
    let bundle_is_newer = force || !source.exists() || bundle.is_newer_than(source);
    if !bundle_is_newer {
        return Err(AdapterError::SourceNewerThanBundle {
            bundle: bundle.path().to_path_buf(),
            source_path: source.path().to_path_buf(),
        });
    }

    cipher.decrypt_to_file(keyfile.path(), bundle.path(), source.path())?;
    info!("bundle decrypted to source");
    Ok(())
}

/// Generate a fresh key file. Refuses to overwrite an existing one.
#[instrument(skip_all, fields(keyfile = %keyfile.path().display()))]
pub fn generate_keyfile(cipher: &dyn Cipher, keyfile: &FileInfo) -> Result<()> {
    if keyfile.exists() {
        return Err(AdapterError::KeyfileExists {
            path: keyfile.path().to_path_buf(),
        });
    }

    cipher.keygen(keyfile.path())?;
    info!("key file generated");
    Ok(())
}

// ── tests ─────────────────────────────────────────────────────────────────────
