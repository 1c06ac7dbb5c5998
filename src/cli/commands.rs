use crate::config::AppConfig;
use crate::registry::{build_route_table, build_service};
use crate::runtime_config::RuntimeConfig;
use crate::server::HttpServer;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Command-line interface of the demo service
#[derive(Parser, Debug)]
#[command(name = "brrtbind")]
#[command(about = "Schema-validated demo API on may_minihttp", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the demo API
    Serve {
        /// Listen address; overrides the config file and `BRRTB_ADDR`
        #[arg(long)]
        addr: Option<String>,

        /// YAML configuration file
        #[arg(short, long, env = "BRRTB_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the registered routes and exit
    Routes,
}

/// Parse the process arguments and run the selected command.
pub fn run_cli() -> anyhow::Result<()> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { addr, config } => {
            let mut app_config = AppConfig::load(config.as_deref())?;
            if let Some(addr) = addr {
                app_config.http.addr = addr;
            }

            let runtime = RuntimeConfig::from_env();
            runtime.apply();

            let service = build_service(&app_config)?;
            info!(
                routes = service.routes().len(),
                stack_size = runtime.stack_size,
                "Service ready"
            );
            let handle = HttpServer(service)
                .start(app_config.http.addr.as_str())
                .with_context(|| format!("failed to bind {}", app_config.http.addr))?;
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("server thread panicked"))
        }
        Commands::Routes => {
            build_route_table()?.dump_routes();
            Ok(())
        }
    }
}
