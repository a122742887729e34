use crate::components::{google_calendar, GoogleCalendarHandle};
use crate::config::Config;
use crate::error::Error;
use crate::server::{self, AppState};
use crate::shutdown;
use chrono_tz::Tz;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and validate the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Start the calendar component and serve HTTP until a shutdown signal
pub async fn start_server(config: Config) -> miette::Result<()> {
    let timezone = config.tz()?;
    let calendar = google_calendar::start(&config)?;

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await.map_err(Error::from)?;
    info!("Server is running on http://{}", address);

    serve(listener, calendar, timezone, shutdown::handle_signals()).await
}

/// Serve until `signal` resolves. Open requests are drained before the
/// calendar actor is stopped.
pub async fn serve<F>(
    listener: TcpListener,
    calendar: GoogleCalendarHandle,
    timezone: Tz,
    signal: F,
) -> miette::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = server::router(AppState::new(calendar.clone(), timezone));

    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await
        .map_err(Error::from)?;
    info!("Server stopped");

    if let Err(e) = calendar.shutdown().await {
        error!("Error shutting down Google Calendar actor: {:?}", e);
    } else {
        info!("Google Calendar actor shut down successfully");
    }

    Ok(())
}
