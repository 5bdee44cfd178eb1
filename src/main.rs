use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use hris::api::{AppState, create_router};
use hris::config::{AppConfig, ConfigLoader};
use hris::db::{self, SharedDb};
use hris::psgc::{HttpPsgcSource, PsgcCache};
use hris::wage::{ActivationOutcome, run_daily_activation};

const DEFAULT_CONFIG_PATH: &str = "config/hris.yaml";

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
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

/// Checks the activation flag every `check_interval_minutes` and activates
/// newly effective wage rates once per local day.
fn spawn_wage_activation(db: SharedDb, config: &AppConfig) {
    let flag_path = PathBuf::from(&config.wage_rates.activation_flag_file);
    let period = Duration::from_secs(config.wage_rates.check_interval_minutes.saturating_mul(60));
    let timezone = config.server.timezone();

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let today = Utc::now().with_timezone(&timezone).date_naive();
            let result = {
                let conn = db::lock(&db);
                run_daily_activation(&conn, &flag_path, today)
            };
            match result {
                Ok(ActivationOutcome::Skipped { last_run }) => {
                    debug!(last_run = %last_run, "Wage activation already ran today");
                }
                Ok(ActivationOutcome::Ran { .. }) => {}
                Err(err) => error!(error = %err, "Wage activation failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!(error = %err, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = env::var("HRIS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = ConfigLoader::load(&config_path)?.into_config();
    init_tracing(config.logging.json);
    info!(config = %config_path, "Configuration loaded");

    let db = db::shared(db::open_db(&config.database.path)?);
    let source = HttpPsgcSource::new(&config.psgc)?;
    let psgc = PsgcCache::new(Arc::new(source), &config.psgc);

    spawn_wage_activation(Arc::clone(&db), &config);

    let bind = config.server.bind.clone();
    let state = AppState::new(db, config, psgc);
    let app = create_router(state);

    let listener = TcpListener::bind(&bind).await?;
    info!(address = %bind, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
