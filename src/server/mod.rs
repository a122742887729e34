pub mod error;
pub mod handlers;
pub mod requests;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use chrono_tz::Tz;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::components::GoogleCalendarHandle;
use handlers::{
    add_event_handler, auth_callback_handler, auth_status_handler, auth_url_handler,
    delete_event_handler, get_events_handler, health_handler, index_handler,
    update_event_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Calendar actor holding the OAuth session
    pub calendar: GoogleCalendarHandle,
    /// Timezone attached to event times written by the service
    pub timezone: Tz,
}

impl AppState {
    pub fn new(calendar: GoogleCalendarHandle, timezone: Tz) -> Self {
        Self { calendar, timezone }
    }
}

/// Build the router with every endpoint and middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/auth-url", get(auth_url_handler))
        .route("/auth-callback", get(auth_callback_handler))
        .route("/auth-status", get(auth_status_handler))
        .route("/get-events", get(get_events_handler))
        .route("/add-event", post(add_event_handler))
        .route("/update-event", put(update_event_handler))
        .route("/delete-event", delete(delete_event_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
