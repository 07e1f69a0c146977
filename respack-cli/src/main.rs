mod cat;
mod config;
mod pack;
mod unpack;

use clap::{Args, Parser, Subcommand};
use respack_core::pack::CompressionType;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pack a directory of assets into a pack file
    Pack(PackCommand),
    /// List the assets of a pack file
    List(ListCommand),
    /// Unpack every asset of a pack file
    Unpack(UnpackCommand),
    /// Write a single asset to stdout
    Cat(CatCommand),
}

#[derive(Debug, Args)]
struct PackCommand {
    /// Input directory path
    input: String,
    /// Output pack file path
    #[arg(short, long)]
    output: Option<String>,
    /// Encryption key, leave empty for a plain pack
    #[arg(short, long, default_value = "")]
    key: String,
    /// Compression applied to every asset: none, deflate or zstd
    #[arg(short, long, default_value = "zstd")]
    compression: CompressionType,
    /// Override existing output file
    #[arg(long, default_value_t = false)]
    r#override: bool,
}

#[derive(Debug, Args)]
struct ListCommand {
    /// Input pack file path
    input: String,
    #[arg(short, long, default_value = "")]
    key: String,
    /// Print the asset database as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, Args)]
struct UnpackCommand {
    /// Input pack file path
    input: String,
    /// Output directory path
    #[arg(short, long)]
    output: Option<String>,
    #[arg(short, long, default_value = "")]
    key: String,
    /// Override existing files
    #[arg(long, default_value_t = false)]
    r#override: bool,
    /// Skip assets that fail instead of stopping
    #[arg(long, default_value_t = false)]
    ignore_error: bool,
}

#[derive(Debug, Args)]
struct CatCommand {
    /// Asset name
    name: String,
    /// Asset type label, e.g. "texture" or "audioClip"
    asset_type: String,
    /// Pack file to read from
    #[arg(short, long, conflicts_with = "config", required_unless_present = "config")]
    pack: Option<String>,
    #[arg(short, long, default_value = "")]
    key: String,
    /// JSON file listing the packs to chain
    #[arg(long)]
    config: Option<String>,
    /// Read the asset incrementally
    #[arg(long, default_value_t = false)]
    stream: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match &cli.command {
        Command::Pack(cmd) => pack::package(cmd),
        Command::List(cmd) => unpack::list(cmd),
        Command::Unpack(cmd) => unpack::unpack_parallel(cmd),
        Command::Cat(cmd) => cat::cat(cmd),
    }
}
