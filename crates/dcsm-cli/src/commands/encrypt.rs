//! Implementation of the `dcsm encrypt` command.

use tracing::instrument;

use dcsm_adapters::{AgeClient, FileInfo, bundle::encrypt_source};

use crate::{
    cli::EncryptArgs,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Encrypt the plaintext source file into the bundle, unless the bundle
/// already carries newer data.
#[instrument(skip_all)]
pub fn execute(args: EncryptArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    // The bundle only needs to be *named*; it may not exist yet.
    let bundle = FileInfo::capture(config.secrets_required()?);
    let keyfile = FileInfo::capture(config.keyfile_existing()?);
    let source = FileInfo::capture(config.source_existing()?);

    encrypt_source(&AgeClient::new(), &keyfile, &bundle, &source, args.force)?;

    output.success(&format!(
        "successfully encrypted source file {source} => {bundle}"
    ))?;
    Ok(())
}
