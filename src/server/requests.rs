use super::error::ApiError;
use crate::components::google_calendar::time::parse_event_range;
use crate::components::google_calendar::{CalendarEvent, EventPatch};
use crate::error::{validation_error, AppResult};
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

pub const EVENT_ID_REQUIRED: &str = "Event ID is required";
pub const TIMES_REQUIRED: &str = "Start and end time are required";
pub const INVALID_BODY: &str = "Invalid request body";

/// JSON request body. A missing or blank body reads as `T::default()`, so the
/// field checks below report what is missing. Unreadable bodies are a 400.
#[derive(Debug, Clone, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            debug!("Could not read request body: {}", e);
            invalid_body()
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        serde_json::from_slice(&bytes).map(Self).map_err(|e| {
            debug!("Rejected request body: {}", e);
            invalid_body()
        })
    }
}

fn invalid_body() -> ApiError {
    ApiError::new(validation_error(INVALID_BODY), INVALID_BODY)
}

/// Query parameters Google appends to the redirect URI
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthCallbackParams {
    pub code: Option<String>,
    /// Set instead of `code` when the user denies consent
    pub error: Option<String>,
}

/// Body of `POST /add-event`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEventRequest {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Body of `PUT /update-event`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub event_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Body of `DELETE /delete-event`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEventRequest {
    pub event_id: Option<String>,
}

fn required(value: Option<String>, message: &str) -> AppResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| validation_error(message))
}

impl AddEventRequest {
    /// Validate the request and build the event to insert
    pub fn into_event(self, tz: Tz) -> AppResult<CalendarEvent> {
        let start_time = required(self.start_time, TIMES_REQUIRED)?;
        let end_time = required(self.end_time, TIMES_REQUIRED)?;
        let (start, end) = parse_event_range(&start_time, &end_time, tz)?;

        Ok(CalendarEvent {
            summary: self.summary,
            description: self.description,
            start: Some(start),
            end: Some(end),
            ..Default::default()
        })
    }
}

impl UpdateEventRequest {
    /// Validate the request. Runs before anything is sent to Google.
    pub fn into_patch(self, tz: Tz) -> AppResult<EventPatch> {
        let event_id = required(self.event_id, EVENT_ID_REQUIRED)?;
        let start_time = required(self.start_time, TIMES_REQUIRED)?;
        let end_time = required(self.end_time, TIMES_REQUIRED)?;
        let (start, end) = parse_event_range(&start_time, &end_time, tz)?;

        Ok(EventPatch {
            event_id,
            summary: self.summary,
            description: self.description,
            start,
            end,
        })
    }
}

impl DeleteEventRequest {
    pub fn into_event_id(self) -> AppResult<String> {
        required(self.event_id, EVENT_ID_REQUIRED)
    }
}
