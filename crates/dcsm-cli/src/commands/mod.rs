//! One module per subcommand.
//!
//! Handlers share a shape: `execute(args, config, output) -> CliResult<()>`.
//! They translate configuration into adapter calls and display results;
//! no substitution or crypto logic lives here.

pub mod completions;
pub mod decrypt;
pub mod encrypt;
pub mod keygen;
pub mod run;
