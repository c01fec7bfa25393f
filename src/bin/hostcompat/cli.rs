//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use hostcompat::core::{DataValue, NamespacedKey};
use hostcompat::host::HolderId;
use hostcompat::util::diagnostic::suggestions;

/// hostcompat - run plugin code against any supported host version
#[derive(Parser)]
#[command(name = "hostcompat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Version string the simulated host reports
    #[arg(long, global = true, env = "HOSTCOMPAT_HOST_VERSION")]
    pub host_version: Option<String>,

    /// Host state file, loaded before and saved after each command
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// Project config file (defaults to ./hostcompat.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect the shim registry
    Shims(ShimsArgs),

    /// Select and construct the shim for the configured host
    Resolve,

    /// Read and write persistent data
    Data(DataArgs),

    /// Read and write an item's custom model index
    Model(ModelArgs),

    /// Render rich text for the host
    Text(TextArgs),

    /// Run the bundled application modules through their lifecycle
    Boot(BootArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BootArgs {
    /// Print how long each lifecycle phase took
    #[arg(long)]
    pub profile: bool,

    /// Write the phase timings as JSON to FILE
    #[arg(long, value_name = "FILE")]
    pub profile_json: Option<PathBuf>,
}

#[derive(Args)]
pub struct ShimsArgs {
    #[command(subcommand)]
    pub command: ShimsCommands,
}

#[derive(Subcommand)]
pub enum ShimsCommands {
    /// List registered shims in match order
    List,

    /// Show which shim a host version would select
    Match(MatchArgs),
}

#[derive(Args)]
pub struct MatchArgs {
    /// Host version string, e.g. `1.21.4-R0.1-SNAPSHOT`
    pub version: String,
}

#[derive(Args)]
pub struct DataArgs {
    #[command(subcommand)]
    pub command: DataCommands,
}

#[derive(Subcommand)]
pub enum DataCommands {
    /// Print a value
    Get {
        #[arg(value_parser = parse_holder)]
        holder: HolderId,
        #[arg(value_parser = parse_key)]
        key: NamespacedKey,
    },

    /// Store a value, e.g. `int:3` or `string:hello`
    Set {
        #[arg(value_parser = parse_holder)]
        holder: HolderId,
        #[arg(value_parser = parse_key)]
        key: NamespacedKey,
        #[arg(value_parser = parse_value, allow_hyphen_values = true)]
        value: DataValue,
    },

    /// Remove a value
    Remove {
        #[arg(value_parser = parse_holder)]
        holder: HolderId,
        #[arg(value_parser = parse_key)]
        key: NamespacedKey,
    },

    /// List every value on a holder
    List {
        #[arg(value_parser = parse_holder)]
        holder: HolderId,
    },
}

#[derive(Args)]
pub struct ModelArgs {
    #[command(subcommand)]
    pub command: ModelCommands,
}

#[derive(Subcommand)]
pub enum ModelCommands {
    /// Print the model index
    Get {
        #[arg(value_parser = parse_holder)]
        item: HolderId,
    },

    /// Set the model index
    Set {
        #[arg(value_parser = parse_holder)]
        item: HolderId,
        #[arg(allow_negative_numbers = true)]
        index: i32,
    },

    /// Remove the model index
    Clear {
        #[arg(value_parser = parse_holder)]
        item: HolderId,
    },
}

#[derive(Args)]
pub struct TextArgs {
    #[command(subcommand)]
    pub command: TextCommands,
}

#[derive(Subcommand)]
pub enum TextCommands {
    /// Render markup as host JSON
    Render {
        /// Markup, e.g. `<red>Hello <bold>world`
        markup: String,

        /// Print plain text instead of JSON
        #[arg(long)]
        plain: bool,
    },

    /// Set an item's display name from markup
    Name {
        #[arg(value_parser = parse_holder)]
        item: HolderId,
        markup: String,
    },
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

fn parse_holder(s: &str) -> Result<HolderId, String> {
    s.parse()
        .map_err(|e| format!("{}\n  help: {}", e, suggestions::HOLDER_FORMAT))
}

fn parse_key(s: &str) -> Result<NamespacedKey, String> {
    NamespacedKey::parse(s).map_err(|e| format!("{}\n  help: {}", e, suggestions::KEY_FORMAT))
}

fn parse_value(s: &str) -> Result<DataValue, String> {
    DataValue::parse(s).map_err(|e| format!("{}\n  help: {}", e, suggestions::VALUE_FORMAT))
}
