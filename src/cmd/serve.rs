use anyhow::{Context, Result};
use boltguard::config::CommonConfig;
use boltguard::logs;
use boltguard::server::config::ServerConfig;
use boltguard::server::factory::ServerFactory;
use clap::Args;
use log::debug;

use super::ConfigArgs;

/// Start the authorization server. Every configured route is protected by its
/// guard chain, requests to other paths get 404.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Print server configuration data (JSON) and exit.
    #[arg(long)]
    pub print_config: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

impl ServeArgs {
    pub async fn run(&self) -> Result<()> {
        let ps = self.config.build_path_set()?;
        let cfg: ServerConfig = ps.load_config("server", ServerConfig::default)?;

        if self.print_config {
            println!("{}", serde_json::to_string_pretty(&cfg)?);
            return Ok(());
        }

        logs::init(&cfg.log_level)?;
        debug!("Use config: {cfg:?}");

        let srv = ServerFactory::new(cfg)
            .build_server()
            .context("build server")?;
        srv.run().await
    }
}
