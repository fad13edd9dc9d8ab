//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. Environment variables (`DCSM_*`, the primary interface)
//! 2. Config file (`--config` or the default location)
//! 3. Built-in defaults (only the marker has one)
//!
//! An environment variable set to the empty string counts as unset.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{CliError, CliResult};

pub const KEYFILE_VAR: &str = "DCSM_KEYFILE";
pub const SECRETS_VAR: &str = "DCSM_SECRETS_FILE";
pub const SOURCE_VAR: &str = "DCSM_SOURCE_FILE";
pub const MARKER_VAR: &str = "DCSM_MARKER";
/// Any variable with this prefix names a template directory.
pub const TEMPLATE_VAR_PREFIX: &str = "DCSM_TEMPLATE_";

/// A directory to scan for templates, plus where the setting came from
/// (the variable name, or "config file") for error messages.
#[derive(Debug, Clone)]
pub struct TemplateDir {
    pub origin: String,
    pub dir: PathBuf,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub keyfile: Option<PathBuf>,
    pub secrets_file: Option<PathBuf>,
    pub source_file: Option<PathBuf>,
    pub template_dirs: Vec<TemplateDir>,
    pub marker: String,
}

/// The on-disk config file shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub keyfile: Option<PathBuf>,
    pub secrets_file: Option<PathBuf>,
    pub source_file: Option<PathBuf>,
    pub marker: Option<String>,
    #[serde(default)]
    pub template_dirs: Vec<PathBuf>,
}

impl AppConfig {
    /// Load configuration: config file first, then the environment on top.
    ///
    /// `config_file` is the path the user passed via `--config`.  An
    /// explicit path must exist; the default location is optional.
    pub fn load(config_file: Option<&PathBuf>) -> CliResult<Self> {
        let file = Self::read_file(config_file)?;
        Ok(Self::from_sources(file, std::env::vars()))
    }

    fn read_file(explicit: Option<&PathBuf>) -> CliResult<FileConfig> {
        let path = match explicit {
            Some(p) => p.clone(),
            None => {
                let p = Self::config_path();
                if !p.is_file() {
                    return Ok(FileConfig::default());
                }
                p
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|e| CliError::ConfigError {
            message: format!("cannot read {}", path.display()),
            source: Some(Box::new(e)),
        })?;
        let parsed = toml::from_str(&text).map_err(|e| CliError::ConfigError {
            message: format!("cannot parse {}", path.display()),
            source: Some(Box::new(e)),
        })?;

        debug!(path = %path.display(), "config file loaded");
        Ok(parsed)
    }

    /// Merge a parsed config file with an environment snapshot.
    ///
    /// Takes the variables as an iterator instead of reading the process
    /// environment so tests can feed synthetic sets.
    pub fn from_sources(
        file: FileConfig,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let mut keyfile = file.keyfile;
        let mut secrets_file = file.secrets_file;
        let mut source_file = file.source_file;
        let mut marker = file.marker;

        let mut template_dirs: Vec<TemplateDir> = file
            .template_dirs
            .into_iter()
            .map(|dir| TemplateDir {
                origin: "config file".to_string(),
                dir,
            })
            .collect();

        // BTreeMap so DCSM_TEMPLATE_* directories are processed in a
        // stable order regardless of how the environment iterates.
        let mut env_templates = BTreeMap::new();

        for (key, value) in vars {
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                KEYFILE_VAR => keyfile = Some(PathBuf::from(&value)),
                SECRETS_VAR => secrets_file = Some(PathBuf::from(&value)),
                SOURCE_VAR => source_file = Some(PathBuf::from(&value)),
                MARKER_VAR => marker = Some(value),
                _ if key.starts_with(TEMPLATE_VAR_PREFIX) => {
                    env_templates.insert(key, PathBuf::from(&value));
                }
                _ => {}
            }
        }

        template_dirs.extend(
            env_templates
                .into_iter()
                .map(|(origin, dir)| TemplateDir { origin, dir }),
        );

        Self {
            keyfile,
            secrets_file,
            source_file,
            template_dirs,
            marker: marker.unwrap_or_else(|| dcsm_core::DEFAULT_MARKER.to_string()),
        }
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.dcsm.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "dcsm", "dcsm")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".dcsm.toml"))
    }

    // ── per-operation requirements ────────────────────────────────────────

    pub fn keyfile_required(&self) -> CliResult<&Path> {
        required(&self.keyfile, KEYFILE_VAR)
    }

    pub fn keyfile_existing(&self) -> CliResult<&Path> {
        existing(&self.keyfile, KEYFILE_VAR)
    }

    pub fn secrets_required(&self) -> CliResult<&Path> {
        required(&self.secrets_file, SECRETS_VAR)
    }

    pub fn secrets_existing(&self) -> CliResult<&Path> {
        existing(&self.secrets_file, SECRETS_VAR)
    }

    pub fn source_required(&self) -> CliResult<&Path> {
        required(&self.source_file, SOURCE_VAR)
    }

    pub fn source_existing(&self) -> CliResult<&Path> {
        existing(&self.source_file, SOURCE_VAR)
    }
}

/// The setting must be present.
fn required<'a>(setting: &'a Option<PathBuf>, var: &'static str) -> CliResult<&'a Path> {
    setting
        .as_deref()
        .ok_or(CliError::MissingSetting { var })
}

/// The setting must be present *and* name an existing file.
fn existing<'a>(setting: &'a Option<PathBuf>, var: &'static str) -> CliResult<&'a Path> {
    let path = required(setting, var)?;
    if !path.is_file() {
        return Err(CliError::SettingFileMissing {
            var,
            path: path.to_path_buf(),
        });
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = AppConfig::from_sources(FileConfig::default(), env(&[]));
        assert!(cfg.keyfile.is_none());
        assert!(cfg.template_dirs.is_empty());
        assert_eq!(cfg.marker, "$DCSM");
    }

    #[test]
    fn env_vars_populate_paths() {
        let cfg = AppConfig::from_sources(
            FileConfig::default(),
            env(&[
                ("DCSM_KEYFILE", "/run/key.txt"),
                ("DCSM_SECRETS_FILE", "/run/secrets.age"),
                ("DCSM_SOURCE_FILE", "/run/secrets.yaml"),
            ]),
        );
        assert_eq!(cfg.keyfile.as_deref(), Some(Path::new("/run/key.txt")));
        assert_eq!(
            cfg.secrets_file.as_deref(),
            Some(Path::new("/run/secrets.age"))
        );
        assert_eq!(
            cfg.source_file.as_deref(),
            Some(Path::new("/run/secrets.yaml"))
        );
    }

    #[test]
    fn env_overrides_file() {
        let file = FileConfig {
            keyfile: Some(PathBuf::from("/from/file")),
            ..Default::default()
        };
        let cfg = AppConfig::from_sources(file, env(&[("DCSM_KEYFILE", "/from/env")]));
        assert_eq!(cfg.keyfile.as_deref(), Some(Path::new("/from/env")));
    }

    #[test]
    fn empty_env_value_counts_as_unset() {
        let file = FileConfig {
            keyfile: Some(PathBuf::from("/from/file")),
            ..Default::default()
        };
        let cfg = AppConfig::from_sources(file, env(&[("DCSM_KEYFILE", "")]));
        assert_eq!(cfg.keyfile.as_deref(), Some(Path::new("/from/file")));
    }

    #[test]
    fn template_vars_collect_in_stable_order() {
        let cfg = AppConfig::from_sources(
            FileConfig::default(),
            env(&[
                ("DCSM_TEMPLATE_ZED", "/srv/zed"),
                ("DCSM_TEMPLATE_APP", "/srv/app"),
                ("UNRELATED", "/elsewhere"),
            ]),
        );
        let origins: Vec<_> = cfg.template_dirs.iter().map(|t| t.origin.as_str()).collect();
        assert_eq!(origins, vec!["DCSM_TEMPLATE_APP", "DCSM_TEMPLATE_ZED"]);
    }

    #[test]
    fn file_template_dirs_come_before_env_ones() {
        let file = FileConfig {
            template_dirs: vec![PathBuf::from("/from/file")],
            ..Default::default()
        };
        let cfg = AppConfig::from_sources(file, env(&[("DCSM_TEMPLATE_A", "/from/env")]));
        assert_eq!(cfg.template_dirs.len(), 2);
        assert_eq!(cfg.template_dirs[0].origin, "config file");
        assert_eq!(cfg.template_dirs[1].origin, "DCSM_TEMPLATE_A");
    }

    #[test]
    fn marker_can_be_overridden() {
        let cfg =
            AppConfig::from_sources(FileConfig::default(), env(&[("DCSM_MARKER", "$SECRET")]));
        assert_eq!(cfg.marker, "$SECRET");
    }

    #[test]
    fn required_reports_the_variable_name() {
        let cfg = AppConfig::from_sources(FileConfig::default(), env(&[]));
        match cfg.keyfile_required() {
            Err(CliError::MissingSetting { var }) => assert_eq!(var, "DCSM_KEYFILE"),
            other => panic!("expected MissingSetting, got {other:?}"),
        }
    }

    #[test]
    fn existing_rejects_absent_files() {
        let cfg = AppConfig::from_sources(
            FileConfig::default(),
            env(&[("DCSM_SECRETS_FILE", "/definitely/not/here.age")]),
        );
        assert!(matches!(
            cfg.secrets_existing(),
            Err(CliError::SettingFileMissing { .. })
        ));
    }

    #[test]
    fn existing_accepts_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.txt");
        std::fs::write(&path, "AGE-SECRET-KEY-1").unwrap();

        let cfg = AppConfig::from_sources(
            FileConfig::default(),
            env(&[("DCSM_KEYFILE", path.to_str().unwrap())]),
        );
        assert!(cfg.keyfile_existing().is_ok());
    }

    #[test]
    fn file_config_parses_toml() {
        let parsed: FileConfig = toml::from_str(
            r#"
            keyfile = "/etc/dcsm/key.txt"
            marker = "$APP"
            template_dirs = ["/etc/app", "/etc/other"]
            "#,
        )
        .unwrap();
        assert_eq!(parsed.keyfile.as_deref(), Some(Path::new("/etc/dcsm/key.txt")));
        assert_eq!(parsed.marker.as_deref(), Some("$APP"));
        assert_eq!(parsed.template_dirs.len(), 2);
    }

    #[test]
    fn config_path_is_non_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}
