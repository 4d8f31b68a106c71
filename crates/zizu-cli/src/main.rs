use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod config;

use config::ZizuConfig;
use zizu_gateway::{OpenAiGenerator, TextGenerator};
use zizu_notify::{Notifier, NoopNotifier, SmtpNotifier};
use zizu_server::AppState;
use zizu_store::ZizuStore;

#[derive(Parser)]
#[command(name = "zizu", version, about = "Zizu lead-capture chat service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Start the HTTP API server")]
    Start {
        #[arg(long, help = "Override the PORT environment variable")]
        port: Option<u16>,
    },
    #[command(about = "Check environment configuration and exit")]
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Validate => {
            let config = ZizuConfig::from_env()?;
            println!(
                "Config valid. model={} api_base={} port={} snapshot={} mail={}",
                config.model,
                config.api_base,
                config.port,
                config
                    .snapshot_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "off".into()),
                if config.smtp.is_some() { "on" } else { "off" },
            );
        }
        Commands::Start { port } => {
            let mut config = ZizuConfig::from_env()?;
            if let Some(port) = port {
                config.port = port;
            }
            let _guard = init_tracing(&config.log_dir)?;
            start(config).await?;
        }
    }

    Ok(())
}

fn init_tracing(log_dir: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "zizu.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    Ok(guard)
}

async fn start(config: ZizuConfig) -> Result<()> {
    let store = match &config.snapshot_path {
        Some(path) => {
            let store = ZizuStore::with_snapshot(path).await?;
            tracing::info!("state mirrored to {}", path.display());
            store
        }
        None => ZizuStore::new(),
    };

    let generator: Arc<dyn TextGenerator> = Arc::new(OpenAiGenerator::new(
        config.api_key.clone(),
        config.api_base.clone(),
        config.model.clone(),
    ));

    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpNotifier::new(smtp)?),
        None => {
            tracing::warn!("SMTP not configured; lead notifications disabled");
            Arc::new(NoopNotifier)
        }
    };

    let state = AppState::new(Arc::new(store), generator, notifier);
    let addr = format!("0.0.0.0:{}", config.port);
    zizu_server::serve(state, &addr).await
}
