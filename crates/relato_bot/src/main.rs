//! relato bot - Main entry point.
//!
//! Exit codes:
//! - 0: Success (dispatcher stopped cleanly)
//! - 1: Missing/invalid configuration or runtime failure

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use teloxide::Bot;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod telegram;

use relato_chat::ConversationEngine;
use relato_core::{AppConfig, BaseCatalog};
use relato_portal::ReportClient;
use telegram::{TelegramChannel, TelegramGateway};

/// Telegram bot that generates portal reports on request.
///
/// Credentials come from the environment (EMAIL_CONTROL_SERVICES,
/// PASSWORD_CONTROL_SERVICES, TELEGRAM_BOT_TOKEN); flags override the
/// operational defaults.
#[derive(Parser)]
#[command(name = "relato-bot", version)]
struct Args {
    /// Directory the browser downloads reports into.
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// WebDriver endpoint (chromedriver).
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Run the browser headless.
    #[arg(long)]
    headless: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("relato=info,info")),
        )
        .try_init();

    let args = Args::parse();

    // Hard precondition: no credentials, no process.
    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Erro: {}", e);
            return ExitCode::from(1);
        }
    };

    if let Some(dir) = args.download_dir {
        config = config.download_dir(dir);
    }
    if let Some(url) = args.webdriver_url {
        config = config.webdriver_url(url);
    }
    if args.headless {
        config = config.headless(true);
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Erro: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.download_dir)?;
    info!(
        download_dir = %config.download_dir.display(),
        webdriver_url = %config.webdriver_url,
        max_concurrent = config.max_concurrent_reports,
        "Starting relato"
    );

    let bot = Bot::new(config.telegram_token.clone());
    let gateway = Arc::new(TelegramGateway::new(bot.clone()));
    let client = Arc::new(ReportClient::from_config(&config));

    let engine = ConversationEngine::new(BaseCatalog::standard(), gateway, client)
        .max_concurrent_reports(config.max_concurrent_reports)
        .require_ordered_range(config.require_ordered_range);

    Arc::new(TelegramChannel::new(bot, Arc::new(engine)))
        .run()
        .await;
    Ok(())
}
