mod cmd;

use std::process::ExitCode;

use clap::Parser;
use console::style;

use crate::cmd::App;

#[tokio::main]
async fn main() -> ExitCode {
    let app = App::parse();
    match app.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}: {err:#}", style("error").red().bold());
            ExitCode::FAILURE
        }
    }
}
