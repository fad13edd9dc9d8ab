//! Implementation of the `dcsm run` command.
//!
//! Responsibility: validate configuration, load the secrets mapping, and
//! fan the template processor out over every configured directory. The
//! substitution semantics live in `dcsm-core`; the file handling in
//! `dcsm-adapters`.

use tracing::{debug, info, instrument};

use dcsm_adapters::{AgeClient, TemplateProcessor, secrets::load_secrets};
use dcsm_core::{Recognizer, RenderMode};

use crate::{
    cli::{OutputFormat, RunArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `dcsm run` command.
///
/// Dispatch sequence:
/// 1. Validate that the key file and bundle exist and that every
///    configured template directory is present
/// 2. Compile the recognizer for the configured marker
/// 3. Decrypt and parse the secrets bundle
/// 4. Process each template directory in order (fail-fast)
/// 5. Report the processed count
#[instrument(skip_all)]
pub fn execute(args: RunArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    // 1. Configuration checks, before any decryption happens.
    let keyfile = config.keyfile_existing()?;
    let bundle = config.secrets_existing()?;
    for template_dir in &config.template_dirs {
        if !template_dir.dir.is_dir() {
            return Err(CliError::TemplateDirMissing {
                origin: template_dir.origin.clone(),
                dir: template_dir.dir.clone(),
            });
        }
    }

    if config.template_dirs.is_empty() {
        output.warning("no DCSM_TEMPLATE_* directories configured; nothing to process")?;
    }

    // 2. Recognizer for the configured marker.
    let recognizer = Recognizer::compile(&config.marker)?;

    // 3. Load secrets.
    let cipher = AgeClient::new();
    let secrets = load_secrets(&cipher, keyfile, bundle)?;
    debug!(count = secrets.len(), "secrets mapping loaded");

    // 4. Process every directory.
    let mode = if args.lenient {
        RenderMode::Lenient
    } else {
        RenderMode::Strict
    };
    let processor = TemplateProcessor::new(&recognizer)
        .with_mode(mode)
        .with_dry_run(args.dry_run);

    let mut processed = 0;
    for template_dir in &config.template_dirs {
        processed += processor.process_dir(&template_dir.dir, &secrets)?;
    }

    info!(processed, dry_run = args.dry_run, "run completed");

    // 5. Summary.
    if output.format() == OutputFormat::Json {
        let summary = serde_json::json!({
            "processed": processed,
            "directories": config.template_dirs.len(),
            "dry_run": args.dry_run,
        });
        output.print(&summary.to_string())?;
    } else if args.dry_run {
        output.success(&format!("validated {processed} template files (dry run)"))?;
    } else {
        output.success(&format!("successfully processed {processed} template files"))?;
    }

    Ok(())
}
