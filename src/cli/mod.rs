use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::api;
use crate::core::CalendarConfig;

#[derive(Subcommand)]
enum Command {
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "8000")]
        port: String,

        /// Path to the calendar configuration file
        #[arg(long, default_value = "config.ini")]
        config: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    match args.command {
        Some(Command::Serve { host, port, config }) => {
            let config = CalendarConfig::load(&config)?;
            api::serve(host, port, config).await;
        }
        None => {
            // Default to serving on localhost with the local config file
            let config = CalendarConfig::load("config.ini")?;
            api::serve("127.0.0.1".to_string(), "8000".to_string(), config).await;
        }
    }

    Ok(())
}
