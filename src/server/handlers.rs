use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use serde::Serialize;
use tracing::{error, info};

use super::error::{failure, ApiError};
use super::requests::{
    AddEventRequest, AuthCallbackParams, DeleteEventRequest, JsonBody, UpdateEventRequest,
};
use super::AppState;
use crate::components::google_calendar::CalendarEvent;
use crate::error::{google_calendar_error, Error};

const AUTH_SUCCESS_PAGE: &str = include_str!("../../assets/auth_success.html");
const AUTH_FAILURE_PAGE: &str = include_str!("../../assets/auth_failure.html");

const FAILED_AUTH_URL: &str = "Failed to build authorization URL.";
const FAILED_STATUS: &str = "Failed to read authorization status.";
const FAILED_FETCH: &str = "Error fetching events.";
const FAILED_ADD: &str = "Failed to add event.";
const FAILED_UPDATE: &str = "Failed to update event.";
const FAILED_DELETE: &str = "Failed to delete event.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

#[derive(Debug, Serialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAddedResponse {
    pub message: &'static str,
    pub event_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventUpdatedResponse {
    pub message: &'static str,
    pub event: CalendarEvent,
}

/// Handler for the Task UI page
pub async fn index_handler() -> impl IntoResponse {
    Html(include_str!("../../assets/index.html"))
}

// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}

/// GET /auth-url - Consent URL for the Google OAuth flow
pub async fn auth_url_handler(
    State(state): State<AppState>,
) -> Result<Json<AuthUrlResponse>, ApiError> {
    let auth_url = state
        .calendar
        .authorization_url()
        .map_err(failure(FAILED_AUTH_URL))?;

    Ok(Json(AuthUrlResponse { auth_url }))
}

/// GET /auth-callback - Exchange the authorization code for tokens
pub async fn auth_callback_handler(
    State(state): State<AppState>,
    Query(params): Query<AuthCallbackParams>,
) -> impl IntoResponse {
    let result = match (params.code, params.error) {
        (Some(code), _) if !code.is_empty() => state.calendar.authorize(code).await,
        (_, Some(reason)) => Err(google_calendar_error(&format!("Consent denied: {}", reason))),
        _ => Err(google_calendar_error("No authorization code in callback")),
    };

    match result {
        Ok(()) => {
            info!("Google Calendar authorization completed");
            (StatusCode::OK, Html(AUTH_SUCCESS_PAGE))
        }
        Err(e) => {
            error!("Error during authentication: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(AUTH_FAILURE_PAGE))
        }
    }
}

/// GET /auth-status - Whether a token pair is currently held
pub async fn auth_status_handler(
    State(state): State<AppState>,
) -> Result<Json<AuthStatusResponse>, ApiError> {
    let authenticated = state
        .calendar
        .is_authenticated()
        .await
        .map_err(failure(FAILED_STATUS))?;

    Ok(Json(AuthStatusResponse { authenticated }))
}

/// GET /get-events - Upcoming events straight from Google
pub async fn get_events_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<CalendarEvent>>, ApiError> {
    let events = state.calendar.list_events().await.map_err(failure(FAILED_FETCH))?;
    Ok(Json(events))
}

/// POST /add-event - Create an event from the task form
pub async fn add_event_handler(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AddEventRequest>,
) -> Result<(StatusCode, Json<EventAddedResponse>), ApiError> {
    let event = request.into_event(state.timezone).map_err(failure(FAILED_ADD))?;
    let created = state.calendar.add_event(event).await.map_err(failure(FAILED_ADD))?;

    Ok((
        StatusCode::CREATED,
        Json(EventAddedResponse {
            message: "Event added successfully",
            event_id: created.id,
        }),
    ))
}

/// PUT /update-event - Merge changes into an existing event
pub async fn update_event_handler(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UpdateEventRequest>,
) -> Result<Json<EventUpdatedResponse>, ApiError> {
    let update_failure = |e: Error| ApiError::new(e, FAILED_UPDATE).with_detail();

    let patch = request.into_patch(state.timezone).map_err(update_failure)?;
    let event = state.calendar.update_event(patch).await.map_err(update_failure)?;

    Ok(Json(EventUpdatedResponse {
        message: "Event updated successfully",
        event,
    }))
}

/// DELETE /delete-event - Remove an event by id
pub async fn delete_event_handler(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<DeleteEventRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let event_id = request.into_event_id().map_err(failure(FAILED_DELETE))?;
    state
        .calendar
        .delete_event(event_id)
        .await
        .map_err(failure(FAILED_DELETE))?;

    Ok(Json(MessageResponse {
        message: "Event deleted successfully",
    }))
}
