//! Implementation of the `dcsm decrypt` command.

use tracing::instrument;

use dcsm_adapters::{AgeClient, FileInfo, bundle::decrypt_bundle};

use crate::{
    cli::DecryptArgs,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Decrypt the bundle back out to the plaintext source file, unless the
/// source already carries newer data.
#[instrument(skip_all)]
pub fn execute(args: DecryptArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    // The source only needs to be *named*; it may not exist yet.
    let source = FileInfo::capture(config.source_required()?);
    let keyfile = FileInfo::capture(config.keyfile_existing()?);
    let bundle = FileInfo::capture(config.secrets_existing()?);

    decrypt_bundle(&AgeClient::new(), &keyfile, &bundle, &source, args.force)?;

    output.success(&format!(
        "successfully decrypted secrets file {bundle} -> {source}"
    ))?;
    output.warning("don't forget to re-encrypt and remove the source file!")?;
    Ok(())
}
