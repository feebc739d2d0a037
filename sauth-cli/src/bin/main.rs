use clap::Parser;
use sauth_cli::{Command, Runner};
use std::fmt::Debug;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON config file to read settings from instead of the environment
    #[arg(short, long, env = "SAUTH_CONFIG")]
    config: Option<PathBuf>,
    /// Debug print
    #[arg(short, long)]
    debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    Ok(Runner::new(args.config, args.debug).await?.run(args.command).await?)
}
