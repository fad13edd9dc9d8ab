//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "dcsm",
    bin_name = "dcsm",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{1f510} Decrypt-and-substitute secrets manager",
    long_about = "DCSM decrypts an age-encrypted secrets bundle and substitutes \
                  the values into *.template files under configured directories.",
    after_help = "ENVIRONMENT:\n\
        \x20 DCSM_KEYFILE        age identity file\n\
        \x20 DCSM_SECRETS_FILE   encrypted secrets bundle\n\
        \x20 DCSM_SOURCE_FILE    plaintext secrets source (encrypt/decrypt)\n\
        \x20 DCSM_TEMPLATE_*     directories to scan for *.template files\n\n\
        EXAMPLES:\n\
        \x20 dcsm keygen\n\
        \x20 dcsm encrypt\n\
        \x20 dcsm run\n\
        \x20 dcsm completions bash > /usr/share/bash-completion/completions/dcsm",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decrypt the bundle and process every template directory.
    #[command(
        visible_alias = "r",
        about = "Render all *.template files from the encrypted bundle",
        after_help = "EXAMPLES:\n\
            \x20 DCSM_TEMPLATE_APP=/etc/app dcsm run\n\
            \x20 dcsm run --dry-run      # validate without writing\n\
            \x20 dcsm run --lenient      # leave unknown placeholders in place"
    )]
    Run(RunArgs),

    /// Encrypt the plaintext source into the bundle.
    #[command(
        about = "Encrypt the secrets source file into the bundle",
        after_help = "Refuses to overwrite a bundle that is newer than the source."
    )]
    Encrypt(EncryptArgs),

    /// Decrypt the bundle back out to the plaintext source.
    #[command(
        about = "Decrypt the bundle back to the secrets source file",
        after_help = "Refuses to overwrite a source that is newer than the bundle."
    )]
    Decrypt(DecryptArgs),

    /// Generate a new age identity file.
    #[command(
        about = "Generate a key file",
        after_help = "Refuses to overwrite an existing key file."
    )]
    Keygen(KeygenArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 dcsm completions bash > ~/.local/share/bash-completion/completions/dcsm\n\
            \x20 dcsm completions zsh  > ~/.zfunc/_dcsm\n\
            \x20 dcsm completions fish > ~/.config/fish/completions/dcsm.fish"
    )]
    Completions(CompletionsArgs),
}

// ── run ───────────────────────────────────────────────────────────────────────

/// Arguments for `dcsm run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Leave unresolved placeholders verbatim instead of failing.
    #[arg(
        long = "lenient",
        help = "Pass unknown or malformed placeholders through unchanged"
    )]
    pub lenient: bool,

    /// Render every template but write nothing.
    #[arg(long = "dry-run", help = "Validate templates without writing output")]
    pub dry_run: bool,
}

// ── encrypt / decrypt / keygen ────────────────────────────────────────────────

/// Arguments for `dcsm encrypt`.
#[derive(Debug, Args)]
pub struct EncryptArgs {
    /// Skip the modification-time guard (destructive).
    #[arg(long = "force", help = "Overwrite the bundle even if it is newer")]
    pub force: bool,
}

/// Arguments for `dcsm decrypt`.
#[derive(Debug, Args)]
pub struct DecryptArgs {
    /// Skip the modification-time guard (destructive).
    #[arg(long = "force", help = "Overwrite the source even if it is newer")]
    pub force: bool,
}

/// Arguments for `dcsm keygen`.
#[derive(Debug, Args)]
pub struct KeygenArgs {}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `dcsm completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_run_command() {
        let cli = Cli::parse_from(["dcsm", "run"]);
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn run_flags_default_off() {
        let cli = Cli::parse_from(["dcsm", "run"]);
        if let Commands::Run(args) = cli.command {
            assert!(!args.lenient);
            assert!(!args.dry_run);
        } else {
            panic!("expected Run command");
        }
    }

    #[test]
    fn run_alias() {
        let cli = Cli::parse_from(["dcsm", "r", "--dry-run"]);
        if let Commands::Run(args) = cli.command {
            assert!(args.dry_run);
        } else {
            panic!("expected Run command");
        }
    }

    #[test]
    fn parse_encrypt_with_force() {
        let cli = Cli::parse_from(["dcsm", "encrypt", "--force"]);
        if let Commands::Encrypt(args) = cli.command {
            assert!(args.force);
        } else {
            panic!("expected Encrypt command");
        }
    }

    #[test]
    fn parse_completions_shell() {
        let cli = Cli::parse_from(["dcsm", "completions", "zsh"]);
        if let Commands::Completions(args) = cli.command {
            assert!(matches!(args.shell, Shell::Zsh));
        } else {
            panic!("expected Completions command");
        }
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        // clap should reject --quiet --verbose together
        let result = Cli::try_parse_from(["dcsm", "--quiet", "--verbose", "run"]);
        assert!(result.is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["dcsm"]).is_err());
    }
}
