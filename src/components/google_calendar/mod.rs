pub mod actor;
pub mod api;
mod handle;
pub mod models;
pub mod time;
pub mod token;

pub use api::{CalendarApi, GoogleApi};
pub use handle::GoogleCalendarHandle;
pub use models::{CalendarEvent, EventDateTime, EventPatch, TokenPair};

use crate::config::Config;
use crate::error::AppResult;
use std::sync::Arc;
use tracing::info;

/// Spawn the calendar actor backed by the real Google API
pub fn start(config: &Config) -> AppResult<GoogleCalendarHandle> {
    let api = GoogleApi::new(config)?;
    info!(
        calendar_id = %config.google_calendar_id,
        max_events = config.max_events,
        "Starting Google Calendar component"
    );
    Ok(GoogleCalendarHandle::new(Arc::new(api), config.max_events))
}
