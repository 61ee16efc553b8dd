use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use estate_server::config::AppConfig;
use estate_server::startup::{build_router, build_state};

#[derive(Parser, Debug)]
#[command(name = "estate-server")]
#[command(about = "Real-estate marketplace API server")]
struct Args {
    /// Configuration file path (default: config.yaml)
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Port to listen on (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides config file)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let using_defaults = args.config == "config.yaml" && !Path::new("config.yaml").exists();
    let mut app_config = if using_defaults {
        AppConfig::default_config()
    } else {
        AppConfig::load_from_file(&args.config)?
    };

    if let Some(port) = args.port {
        app_config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        app_config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&app_config.server.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if using_defaults {
        tracing::warn!(
            "no config.yaml found, using in-memory SQLite and a per-process signing key"
        );
    } else {
        tracing::info!(path = %args.config, "configuration loaded");
    }

    let host: std::net::IpAddr = app_config.server.host.parse().unwrap_or_else(|_| {
        tracing::warn!(host = %app_config.server.host, "invalid host address, using 127.0.0.1");
        [127, 0, 0, 1].into()
    });
    let addr = SocketAddr::from((host, app_config.server.port));

    tracing::info!(database = %app_config.database.db_type, "setting up backend");
    let state = build_state(app_config).await?;
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "estate server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
