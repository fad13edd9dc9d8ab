//! Comprehensive error handling for the DCSM CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Proper error chaining
//! - Exit code mapping

use std::error::Error;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

use dcsm_adapters::AdapterError;
use dcsm_core::CompileError;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Comprehensive CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// A required setting was neither in the environment nor the config file.
    #[error("variable {var} is required")]
    MissingSetting { var: &'static str },

    /// A configured path does not point at an existing file.
    #[error("{var} {} does not exist", .path.display())]
    SettingFileMissing { var: &'static str, path: PathBuf },

    /// A configured template directory does not exist.
    #[error("template directory {} ({origin}) does not exist", .dir.display())]
    TemplateDirMissing { origin: String, dir: PathBuf },

    // ── Config errors ──────────────────────────────────────────────────────
    /// A configuration file could not be read or parsed.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The configured placeholder marker was rejected by the engine.
    #[error("invalid placeholder marker: {0}")]
    InvalidMarker(#[from] CompileError),

    // ── Adapter errors ─────────────────────────────────────────────────────
    /// An error propagated from `dcsm-adapters`.
    ///
    /// Wrapped here so that the CLI can attach suggestions drawn from the
    /// adapter error's shape without touching adapter internals.
    #[error("{0}")]
    Adapter(#[from] AdapterError),

    // ── System errors ──────────────────────────────────────────────────────
    /// An I/O operation failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingSetting { var } => vec![
                format!("Set the {} environment variable", var),
                "Or add the equivalent key to the config file".into(),
                "Variables: DCSM_KEYFILE, DCSM_SECRETS_FILE, DCSM_SOURCE_FILE, DCSM_TEMPLATE_*"
                    .into(),
            ],

            Self::SettingFileMissing { var, path } => vec![
                format!("{} points at '{}', which is not a file", var, path.display()),
                "Check the path for typos".into(),
                "Run 'dcsm keygen' first if the key file was never created".into(),
            ],

            Self::TemplateDirMissing { origin, dir } => vec![
                format!("{} names '{}', which is not a directory", origin, dir.display()),
                "Create the directory or fix the variable".into(),
            ],

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {}", message),
                "Check your config file syntax (TOML)".into(),
            ],

            Self::InvalidMarker(_) => vec![
                "Markers must be '$' followed by letters, digits, or underscores".into(),
                "The default marker is $DCSM".into(),
            ],

            Self::Adapter(err) => adapter_suggestions(err),

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {}", message),
                "Check file permissions".into(),
                "Check available disk space".into(),
            ],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingSetting { .. } => ErrorCategory::Configuration,
            Self::SettingFileMissing { .. } => ErrorCategory::NotFound,
            Self::TemplateDirMissing { .. } => ErrorCategory::NotFound,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::InvalidMarker(_) => ErrorCategory::Configuration,
            Self::Adapter(err) => match err {
                AdapterError::Render { .. }
                | AdapterError::SecretsParse { .. }
                | AdapterError::SecretsNotMapping { .. }
                | AdapterError::NonStringKey { .. }
                | AdapterError::BundleNewerThanSource { .. }
                | AdapterError::SourceNewerThanBundle { .. }
                | AdapterError::KeyfileExists { .. } => ErrorCategory::UserError,
                AdapterError::CipherSpawn { .. }
                | AdapterError::CipherFailed { .. }
                | AdapterError::Io { .. }
                | AdapterError::Walk { .. } => ErrorCategory::Internal,
            },
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        // Error header
        output.push_str(&format!(
            "\n{} {}\n\n",
            "✗".red().bold(),
            "Error:".red().bold()
        ));

        // Main error message
        output.push_str(&format!("  {}\n", self.to_string().red()));

        // Error chain (if verbose)
        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!(
                    "\n  {} {}\n",
                    "→".dimmed(),
                    err.to_string().dimmed()
                ));
                source = err.source();
            }
        }

        // Suggestions
        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {suggestion}\n"));
            }
        }

        // Hint to re-run with -v
        if !verbose {
            output.push('\n');
            output.push_str(&format!(
                "{} {}\n",
                "\u{2139}".blue(), // ℹ
                "Use -v / --verbose for more details.".dimmed(),
            ));
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`] — no ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("\nError: {self}\n"));

        if verbose {
            let mut src = std::error::Error::source(self);
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

fn adapter_suggestions(err: &AdapterError) -> Vec<String> {
    match err {
        AdapterError::CipherSpawn { binary, .. } => vec![
            format!("'{}' could not be launched", binary),
            "Ensure age is installed and in your PATH".into(),
            "https://age-encryption.org".into(),
        ],
        AdapterError::CipherFailed { .. } => vec![
            "The age diagnostic above has the details".into(),
            "Check that the key file matches the bundle".into(),
        ],
        AdapterError::SecretsParse { .. }
        | AdapterError::SecretsNotMapping { .. }
        | AdapterError::NonStringKey { .. } => vec![
            "The decrypted bundle must be a YAML mapping with string keys".into(),
            "Run 'dcsm decrypt' to inspect the plaintext".into(),
        ],
        AdapterError::Render { .. } => vec![
            "Fix the template or add the missing secret to the source file".into(),
            "Use 'dcsm run --lenient --dry-run' to see all unresolved placeholders".into(),
        ],
        AdapterError::BundleNewerThanSource { .. } => vec![
            "The encrypted bundle has newer data than the source file".into(),
            "Run 'dcsm decrypt' first, or use --force to overwrite (destructive)".into(),
        ],
        AdapterError::SourceNewerThanBundle { .. } => vec![
            "The source file has newer data than the encrypted bundle".into(),
            "Run 'dcsm encrypt' first, or use --force to overwrite (destructive)".into(),
        ],
        AdapterError::KeyfileExists { path } => vec![
            format!("A key file already exists at '{}'", path.display()),
            "Move it aside if you really want a new key".into(),
            "Secrets encrypted with the old key will be unreadable with a new one".into(),
        ],
        AdapterError::Io { .. } | AdapterError::Walk { .. } => vec![
            "Check file permissions".into(),
            "Ensure the paths involved exist".into(),
        ],
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User input error (validation, invalid arguments).
    UserError,
    /// Resource not found.
    NotFound,
    /// Configuration error.
    Configuration,
    /// Internal/system error.
    Internal,
}
