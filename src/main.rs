//! Resource filter server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ timeout ─▶ mount redirect
//!                                                            │
//!                                                            ▼
//!                                                   FilterPath::relative_path
//!                                                            │
//!                                                            ▼
//!                                                     RequestMapper
//!                                               ┌────────────┴────────────┐
//!                                               ▼                         ▼
//!                                        SharedResources           AutoCompleteBehaviors
//!                                               │                         │
//!                                               ▼                         ▼
//!                                   responder (blocking pool)      suggestion list
//!     Client Response                           │                         │
//!     ◀─────────────────────────────────────────┴─────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use resource_filter::config::{load_config, AppConfig};
use resource_filter::filter::web_xml::unique_filter_path_from_file;

#[derive(Parser)]
#[command(name = "resource-filter")]
#[command(about = "Serves cached shared resources below a filter mount", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// TOML configuration file; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the filter path a deployment descriptor maps a filter to
    FilterPath {
        /// Deployment descriptor (web.xml)
        #[arg(long)]
        web_xml: PathBuf,

        /// Filter or servlet name
        #[arg(long)]
        name: String,

        /// Look up a servlet-mapping instead of a filter-mapping
        #[arg(long)]
        servlet: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            let app_config = match &config {
                Some(path) => load_config(path)?,
                None => AppConfig::default(),
            };
            resource_filter::lifecycle::run(app_config, config.as_deref()).await?;
        }
        Commands::FilterPath { web_xml, name, servlet } => {
            let path = unique_filter_path_from_file(servlet, &name, &web_xml)?;
            println!("/{}", path);
        }
    }

    Ok(())
}
