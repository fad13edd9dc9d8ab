//! Implementation of the `dcsm keygen` command.

use tracing::instrument;

use dcsm_adapters::{AgeClient, FileInfo, bundle::generate_keyfile};

use crate::{
    cli::KeygenArgs,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Generate a fresh age identity file at the configured key file path.
#[instrument(skip_all)]
pub fn execute(_args: KeygenArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let keyfile = FileInfo::capture(config.keyfile_required()?);

    generate_keyfile(&AgeClient::new(), &keyfile)?;

    output.success(&format!("successfully generated key file {keyfile}"))?;
    Ok(())
}
