//! Template file discovery and processing.
//!
//! Every file under a configured directory whose name ends in `.template`
//! is rendered and written alongside itself with the suffix stripped:
//! `app.conf.template` → `app.conf`. Ownership and permission bits are
//! copied from the template to the rendered file so a root-owned
//! `0600` template produces a root-owned `0600` secret.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use dcsm_core::{Recognizer, RenderMode, Secrets};

use crate::error::{AdapterError, Result};

/// Filename suffix that marks a file as a template.
pub const TEMPLATE_SUFFIX: &str = ".template";

/// Renders template files against a secrets mapping.
pub struct TemplateProcessor<'a> {
    recognizer: &'a Recognizer,
    mode: RenderMode,
    dry_run: bool,
}

impl<'a> TemplateProcessor<'a> {
    pub fn new(recognizer: &'a Recognizer) -> Self {
        Self {
            recognizer,
            mode: RenderMode::Strict,
            dry_run: false,
        }
    }

    /// Switch between strict and lenient rendering.
    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Render without writing any destination files.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process every template file under `dir`, recursively.
    ///
    /// Returns the number of templates processed. Fail-fast: the first
    /// file that fails aborts the walk, and that file's destination is
    /// never written.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn process_dir(&self, dir: &Path, secrets: &Secrets) -> Result<usize> {
        let mut processed = 0;

        for entry in WalkDir::new(dir) {
            let entry = entry.map_err(|source| AdapterError::Walk {
                dir: dir.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(dest) = destination_for(entry.path()) else {
                continue;
            };

            self.process_file(entry.path(), &dest, secrets)?;
            processed += 1;
        }

        info!(processed, dir = %dir.display(), "template directory processed");
        Ok(processed)
    }

    /// Render one template file into `dest`.
    ///
    /// The output is staged in a temp file in the destination directory and
    /// persisted only after the render and the metadata copy both succeed,
    /// so a failure never leaves a partial destination behind; the temp
    /// file is removed on every early-return path when it drops.
    #[instrument(skip_all, fields(source = %source.display()))]
    pub fn process_file(&self, source: &Path, dest: &Path, secrets: &Secrets) -> Result<()> {
        let text = fs::read_to_string(source).map_err(|e| io_err("read", source, e))?;

        let rendered = self
            .recognizer
            .render(&text, secrets, self.mode)
            .map_err(|e| AdapterError::Render {
                path: source.to_path_buf(),
                source: e,
            })?;

        if self.dry_run {
            debug!(dest = %dest.display(), "dry run, skipping write");
            return Ok(());
        }

        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        let mut staged = NamedTempFile::new_in(dir).map_err(|e| io_err("stage", dest, e))?;
        staged
            .write_all(rendered.as_bytes())
            .map_err(|e| io_err("write", dest, e))?;

        copy_metadata(source, staged.path())?;

        staged
            .persist(dest)
            .map_err(|e| io_err("persist", dest, e.error))?;

        debug!(dest = %dest.display(), "template rendered");
        Ok(())
    }
}

/// The destination for a template path, or `None` if the file is not a
/// template. A file named exactly `.template` has no destination name and
/// is skipped.
pub fn destination_for(source: &Path) -> Option<PathBuf> {
    let name = source.file_name()?.to_str()?;
    let stem = name.strip_suffix(TEMPLATE_SUFFIX)?;
    if stem.is_empty() {
        return None;
    }
    Some(source.with_file_name(stem))
}

/// Copy ownership and permission bits from `source` onto `target`.
#[cfg(unix)]
fn copy_metadata(source: &Path, target: &Path) -> Result<()> {
    use std::os::unix::fs::MetadataExt;

    let meta = fs::metadata(source).map_err(|e| io_err("stat", source, e))?;
    std::os::unix::fs::chown(target, Some(meta.uid()), Some(meta.gid()))
        .map_err(|e| io_err("chown", target, e))?;
    fs::set_permissions(target, meta.permissions()).map_err(|e| io_err("chmod", target, e))?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_metadata(source: &Path, _target: &Path) -> Result<()> {
    // Ownership and mode bits are Unix concepts.
    tracing::warn!(source = %source.display(), "skipping ownership/permission copy on this platform");
    Ok(())
}

fn io_err(operation: &'static str, path: &Path, source: std::io::Error) -> AdapterError {
    AdapterError::Io {
        operation,
        path: path.to_path_buf(),
        source,
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
