use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tagstore",
    about = "Inspect and manage tagstore record files",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the tag tree stored in a record file
    Dump(DumpArgs),
    /// List the stored keys of a record type
    Keys(KeysArgs),
    /// Delete one stored record
    Rm(RmArgs),
}

/// Where the store lives: a base directory, or a config file naming one.
#[derive(Args, Clone, Debug)]
pub struct StoreLocation {
    #[arg(long, conflicts_with = "config")]
    pub base: Option<PathBuf>,
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct DumpArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct KeysArgs {
    #[command(flatten)]
    pub location: StoreLocation,
    pub type_name: String,
}

#[derive(Args)]
pub struct RmArgs {
    #[command(flatten)]
    pub location: StoreLocation,
    pub type_name: String,
    pub key: String,
}
