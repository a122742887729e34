use super::actor::{GoogleCalendarActor, GoogleCalendarActorHandle};
use super::api::CalendarApi;
use super::models::{CalendarEvent, EventPatch};
use crate::error::AppResult;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    api: Arc<dyn CalendarApi>,
    actor_handle: GoogleCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(api: Arc<dyn CalendarApi>, max_events: u32) -> Self {
        let (mut actor, handle) = GoogleCalendarActor::new(Arc::clone(&api), max_events);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            api,
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Consent URL. Needs no session state, so it skips the actor.
    pub fn authorization_url(&self) -> AppResult<String> {
        self.api.authorization_url()
    }

    pub async fn authorize(&self, code: String) -> AppResult<()> {
        self.actor_handle.authorize(code).await
    }

    pub async fn is_authenticated(&self) -> AppResult<bool> {
        self.actor_handle.is_authenticated().await
    }

    /// Get upcoming events from the calendar
    pub async fn list_events(&self) -> AppResult<Vec<CalendarEvent>> {
        self.actor_handle.list_events().await
    }

    pub async fn add_event(&self, event: CalendarEvent) -> AppResult<CalendarEvent> {
        self.actor_handle.add_event(event).await
    }

    pub async fn update_event(&self, patch: EventPatch) -> AppResult<CalendarEvent> {
        self.actor_handle.update_event(patch).await
    }

    pub async fn delete_event(&self, event_id: String) -> AppResult<()> {
        self.actor_handle.delete_event(event_id).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        self.actor_handle.shutdown().await
    }
}
