//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// imgdigest - resolve container image tags to manifest digests
#[derive(Parser, Debug)]
#[command(name = "imgdigest")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve an image reference to its manifest digest
    Resolve(ResolveArgs),

    /// Show how an image reference is normalized
    Parse(ParseArgs),

    /// Show version information
    Version(VersionArgs),
}

/// When the lookup is retried with the legacy manifest media type
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FallbackMode {
    /// After any failure
    #[default]
    Always,
    /// Only when the registry answered with an error
    Negotiation,
    /// Never
    Never,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Image name including any tag, e.g. `alpine:latest`
    pub name: String,

    /// Disable verification of the registry's TLS certificate
    #[arg(long, env = "IMGDIGEST_INSECURE_SKIP_VERIFY")]
    pub insecure_skip_verify: bool,

    /// Docker config.json to read registry credentials from
    #[arg(long, env = "IMGDIGEST_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Registry username (overrides the config file for this image's registry)
    #[arg(long, env = "IMGDIGEST_USERNAME", requires = "password")]
    pub username: Option<String>,

    /// Registry password or token
    #[arg(
        long,
        env = "IMGDIGEST_PASSWORD",
        hide_env_values = true,
        requires = "username"
    )]
    pub password: Option<String>,

    /// Request timeout in seconds (0 waits indefinitely)
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,

    /// Talk plain HTTP to the registry
    #[arg(long)]
    pub plain_http: bool,

    /// When to retry with the legacy manifest media type
    #[arg(long, value_enum, default_value_t = FallbackMode::Always)]
    pub fallback: FallbackMode,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Image name including any tag
    pub name: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
