use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "contesta")]
#[command(about = "Contesta — WhatsApp auto-responder for small businesses", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the webhook server (verification handshake, delivery, health).
    /// Credentials are read from the environment; a .env file is honored.
    Serve {
        /// Listen port (default: PORT env or 3000)
        #[arg(long, short)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("contesta {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { port }) => {
            if let Err(e) = run_serve(port).await {
                log::error!("serve failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_serve(port: Option<u16>) -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("loaded environment from {}", path.display()),
        Err(_) => log::debug!("no .env file found, using process environment"),
    }
    let mut config = lib::config::Config::from_env()?;
    if let Some(p) = port {
        config.port = p;
    }
    log::info!("starting webhook server on {}:{}", config.bind, config.port);
    lib::webhook::run_server(config).await
}
