#![forbid(unsafe_code)]

use showwork_server::{build_router, ApiConfig, AppState};
use std::env;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("SHOWWORK_LOG_JSON", true) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let config = ApiConfig {
        bind_addr: env::var("SHOWWORK_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        db_path: env::var("SHOWWORK_DB").ok().map(PathBuf::from),
        max_body_bytes: env_usize("SHOWWORK_MAX_BODY_BYTES", 64 * 1024),
        default_page_size: env_usize("SHOWWORK_DEFAULT_PAGE_SIZE", 20),
        max_page_size: env_usize("SHOWWORK_MAX_PAGE_SIZE", 50),
        view_dedup_max_entries: env_usize("SHOWWORK_VIEW_DEDUP_MAX_ENTRIES", 100_000),
    };

    let conn = match &config.db_path {
        Some(path) => showwork_store::open(path).map_err(|e| format!("open database: {e}"))?,
        None => {
            // No SHOWWORK_DB means dev mode: everything is gone on restart.
            showwork_store::open_in_memory().map_err(|e| format!("open database: {e}"))?
        }
    };
    showwork_store::bootstrap(&conn).map_err(|e| format!("bootstrap schema: {e}"))?;
    showwork_store::seed_default_skills(&conn).map_err(|e| format!("seed skills: {e}"))?;

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(conn, config);
    let app = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr}: {e}"))?;
    info!("showwork-server listening on {bind_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))
}
