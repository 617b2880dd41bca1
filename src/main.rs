use anyhow::Result;
use clap::Parser;
use mirai_news_api::app::App;
use mirai_news_api::models::{Config, SERVICE_NAME};
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "mirai-news-api")]
#[command(about = "Gateway between the future-newspaper front-end and AI providers")]
struct CliArgs {
    /// Port to listen on; overrides PORT from the environment.
    #[arg(long, value_parser = parse_port_arg)]
    port: Option<u16>,
}

fn parse_port_arg(input: &str) -> std::result::Result<u16, String> {
    input
        .parse::<u16>()
        .map_err(|_| format!("Invalid port '{}'. Expected a number from 0 to 65535", input))
}

fn provider_status(configured: bool, missing: &str) -> String {
    if configured {
        "OK".to_string()
    } else {
        format!("MISSING({})", missing)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mirai_news_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(port) = args.port {
        config.port = port;
    }

    let app = match App::from_config(&config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("[{}] listening on http://localhost:{}", SERVICE_NAME, config.port);
    info!(
        "[{}] env: image={}, text={}",
        SERVICE_NAME,
        provider_status(config.image_configured(), "NANOBANANA_ENDPOINT"),
        provider_status(config.text_configured(), "GEMINI_API_KEY")
    );

    axum::serve(listener, app.router()).await?;
    Ok(())
}
