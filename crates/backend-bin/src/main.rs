use std::io::BufRead;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use teamgate_backend::{
    auth::password::{hash_password_secure, DEFAULT_COST},
    config::{Settings, DEFAULT_CONFIG_FILE},
    directory::FlatFileDirectory,
    router, AppState,
};
use tokio::net::TcpListener;
use tokio::time::{interval, Duration};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "teamgate", about = "Credential sign-in and session service for the member directory")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print a bcrypt hash for a directory record. Reads the password from
    /// stdin when not given as an argument.
    HashPassword {
        #[arg(long, default_value_t = DEFAULT_COST)]
        cost: u32,
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&cli.config).await,
        Command::HashPassword { cost, password } => {
            let mut plain = match password {
                Some(password) => password,
                None => read_password_line()?,
            };
            let hash = hash_password_secure(&mut plain, cost)?;
            println!("{hash}");
            Ok(())
        },
    }
}

async fn serve(config: &Path) -> anyhow::Result<()> {
    let settings = Settings::load_from(config)
        .with_context(|| format!("failed to load settings from {}", config.display()))?;
    init_tracing(&settings);

    // One directory handle for the whole process
    let directory = Arc::new(FlatFileDirectory::new(&settings.directory_path)?);
    let addr = settings.bind_addr;
    let state = Arc::new(AppState::new(directory, settings)?);

    // Setup a background task for auth rate limiter cleanup
    let auth_rate_limiter = state.auth_rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(60 * 60));
        loop {
            interval.tick().await;
            tracing::debug!("running scheduled auth rate limiter cleanup");
            auth_rate_limiter.cleanup();
        }
    });

    let app = router::create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    axum_serve(listener, app).await
}

async fn axum_serve(listener: TcpListener, app: axum::Router) -> anyhow::Result<()> {
    // Peer addresses feed the sign-in throttle
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for shutdown signal");
            }
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if settings.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_password_line() -> anyhow::Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    let trimmed = line.trim_end_matches(['\r', '\n']).to_string();
    anyhow::ensure!(!trimmed.is_empty(), "empty password");
    Ok(trimmed)
}
