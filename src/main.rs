use clap::{Parser, Subcommand};
use realtime_fusion::config::ConfigManager;
use realtime_fusion::logging;
use realtime_fusion::samples::sample_registry;
use realtime_fusion::web::{build_services, WebServer};
use tracing::info;

#[derive(Parser)]
#[command(name = "realtime-fusion")]
#[command(about = "Realtime Fusion - hub and persistent connection host", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve hubs and connections in the foreground
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
        /// Path hubs are mapped at (overrides the config file)
        #[arg(long)]
        path: Option<String>,
    },
    /// List the hubs this host serves
    Hubs,
    /// Show the active configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, path } => {
            let manager = ConfigManager::new()?;
            let mut config = manager.get_config();
            if let Some(port) = port {
                config = config.with_port(port);
            }
            if let Some(path) = path {
                config = config.with_hub_path(&path);
            }

            logging::init_tracing(&config)?;

            println!("Serving hubs at http://{}{}", config.bind_addr(), config.hub_path);
            println!("Press Ctrl+C to stop.\n");

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                info!("Starting Realtime Fusion host...");
                WebServer::new(build_services(config))?.run().await
            })?;
        }
        Commands::Hubs => {
            let registry = sample_registry();

            println!("=== Hubs ({}) ===\n", registry.len());
            for descriptor in registry.descriptors() {
                let handler = descriptor
                    .hub_type
                    .as_ref()
                    .map(|hub_type| hub_type.name())
                    .unwrap_or("<none>");
                println!("  {} -> {}", descriptor.name, handler);
            }
        }
        Commands::Config => {
            let manager = ConfigManager::new()?;
            println!("Config file: {:?}\n", manager.config_file());
            print!("{}", manager.get_config().to_toml_string()?);
        }
    }

    Ok(())
}
