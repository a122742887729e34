use calendar_todo::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting calendar-todo");

    // Load configuration
    let config = startup::load_config()?;

    // Serve the API and the task page
    startup::start_server(config).await
}
