//! Command-line argument parsing

use clap::Parser;

/// The protocol allows exactly one argument. Clap's own help and version
/// flags are disabled so every answer goes through the protocol's stdout
/// conventions.
#[derive(Parser, Debug)]
#[command(name = "docker-credential-acr")]
#[command(about = "Docker credential helper for Azure Container Registry")]
#[command(disable_help_flag = true, disable_version_flag = true, disable_help_subcommand = true)]
pub struct Args {
    /// Credential helper action
    #[arg(
        value_name = "ACTION",
        allow_hyphen_values = true,
        help = "One of: get, store, erase, list, version"
    )]
    pub action: String,
}

impl Args {
    /// Parse an argument list, `None` when it does not hold exactly one action
    pub fn try_parse_args<I, T>(args: I) -> Option<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Args::try_parse_from(args).ok()
    }
}
