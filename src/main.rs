use anyhow::Result;
use clap::Parser;
use resume_formatter::cli::{handle_command, Cli};
use resume_formatter::AppConfig;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    Registry::default()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("resume_formatter=info,rocket::server=off")),
        )
        .init();

    let config = cli.apply_overrides(AppConfig::load()?);
    info!("Environment: {}", config.environment);

    handle_command(cli.command, config).await
}
