mod serve;

use std::path::PathBuf;

use anyhow::Result;
use boltguard::config::PathSet;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about)]
pub struct App {
    #[command(subcommand)]
    pub commands: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Serve(serve::ServeArgs),
}

impl App {
    pub async fn run(&self) -> Result<()> {
        match &self.commands {
            Commands::Serve(args) => args.run().await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// The config directory. Default is `$BOLTGUARD_CONFIG`, or
    /// `~/.config/boltguard` if that is not set.
    #[arg(short, long)]
    pub config_path: Option<String>,
}

impl ConfigArgs {
    pub fn build_path_set(&self) -> Result<PathSet> {
        PathSet::new(self.config_path.as_ref().map(PathBuf::from))
    }
}
