use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use labwatch_core::{User, UserId};
use labwatch_server::{
    AppState, AuthConfig, Config, MockProber, Prober, ProberConfig, Reconciler, RegistryConfig,
    SessionStore, TcpProber, api,
    password::{generate_salt, hash_password},
    registry::{
        ComputerRegistry, MaintenanceLogStore, ScheduleStore, UserStore,
        memory::{
            InMemoryComputerRegistry, InMemoryLogStore, InMemoryScheduleStore, InMemoryUserStore,
        },
        sqlite::{SqliteComputerRegistry, SqliteLogStore, SqliteScheduleStore, SqliteUserStore},
    },
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use ulid::Ulid;

#[derive(Parser)]
#[command(name = "labwatch")]
#[command(about = "LabWatch")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "labwatch.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tracing=info,labwatch_server=info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        info!(path = ?cli.config, "Loading configuration");
        Config::load(&cli.config)?
    } else {
        info!("No configuration file found, using defaults");
        Config::default()
    };

    info!(listen_addr = %config.server.listen_addr, "Starting labwatch");

    match config.registry {
        RegistryConfig::Memory => {
            info!("Using in-memory stores");
            let computers = InMemoryComputerRegistry::new();
            let schedule = InMemoryScheduleStore::new();
            let logs = InMemoryLogStore::new();
            let users = InMemoryUserStore::new();
            run_server(computers, schedule, logs, users, config).await?;
        }
        RegistryConfig::Sqlite { ref path } => {
            info!(path = ?path, "Using SQLite stores");
            let path_str = path.to_string_lossy();
            let computers = SqliteComputerRegistry::new(&path_str).await?;
            let schedule = SqliteScheduleStore::new(&path_str).await?;
            let logs = SqliteLogStore::new(&path_str).await?;
            let users = SqliteUserStore::new(&path_str).await?;
            run_server(computers, schedule, logs, users, config).await?;
        }
    }

    Ok(())
}

async fn run_server<C, S, L, U>(
    computers: C,
    schedule: S,
    logs: L,
    users: U,
    config: Config,
) -> color_eyre::Result<()>
where
    C: ComputerRegistry + Clone,
    S: ScheduleStore + Clone,
    L: MaintenanceLogStore + Clone,
    U: UserStore + Clone,
{
    let cancel = CancellationToken::new();

    let prober: Arc<dyn Prober> = match config.prober {
        ProberConfig::Tcp { port, timeout_ms } => {
            info!(port, timeout_ms, "Using TCP prober");
            Arc::new(TcpProber::new(port, Duration::from_millis(timeout_ms)))
        }
        ProberConfig::Mock { alive } => {
            info!(alive, "Using mock prober");
            Arc::new(MockProber::new(alive))
        }
    };

    bootstrap_user(&users, &config.auth).await?;

    let reconciler = Reconciler::new(
        computers.clone(),
        schedule.clone(),
        logs.clone(),
        prober,
        Duration::from_secs(config.reconciler.interval_secs),
    );
    let cancel_for_reconciler = cancel.clone();
    let reconciler_handle = tokio::spawn(async move {
        reconciler.run(cancel_for_reconciler).await;
    });

    let state = AppState {
        computers,
        schedule,
        logs,
        users,
        sessions: SessionStore::new(),
    };

    let app = api::router(state, &config.server.static_dir);

    let listener = TcpListener::bind(config.server.listen_addr).await?;
    info!(listen_addr = %config.server.listen_addr, "HTTP server listening");

    let cancel_for_http = cancel.clone();
    tokio::select! {
        result = axum::serve(listener, app).with_graceful_shutdown(async move {
            cancel_for_http.cancelled().await;
        }) => {
            if let Err(e) = result {
                error!(error = ?e, "HTTP server error");
            }
            info!("HTTP server shut down");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    cancel.cancel();
    let _ = reconciler_handle.await;

    info!("labwatch shut down complete");
    Ok(())
}

/// Create the configured bootstrap account unless the username already
/// exists, so a fresh deployment has something to log in with.
async fn bootstrap_user<U: UserStore>(users: &U, auth: &AuthConfig) -> color_eyre::Result<()> {
    if users.find_by_username(&auth.bootstrap_user).await?.is_some() {
        return Ok(());
    }

    let salt = generate_salt();
    let password_hash = hash_password(&auth.bootstrap_password, &salt);
    users
        .add(User {
            id: UserId(Ulid::new()),
            username: auth.bootstrap_user.clone().into_boxed_str(),
            salt,
            password_hash,
        })
        .await?;

    info!(username = %auth.bootstrap_user, "Created bootstrap user");
    Ok(())
}
