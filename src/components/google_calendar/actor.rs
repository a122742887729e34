use super::api::CalendarApi;
use super::models::{CalendarEvent, EventPatch};
use super::token::{TokenSession, TokenState};
use crate::error::{other_error, AppResult, Error};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

/// Mailbox size for the calendar actor
const MAILBOX_SIZE: usize = 32;

/// The Google Calendar actor that owns the token session
pub struct GoogleCalendarActor {
    api: Arc<dyn CalendarApi>,
    session: TokenSession,
    max_events: u32,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    Authorize(String, oneshot::Sender<AppResult<()>>),
    IsAuthenticated(oneshot::Sender<bool>),
    ListEvents(oneshot::Sender<AppResult<Vec<CalendarEvent>>>),
    AddEvent(CalendarEvent, oneshot::Sender<AppResult<CalendarEvent>>),
    UpdateEvent(EventPatch, oneshot::Sender<AppResult<CalendarEvent>>),
    DeleteEvent(String, oneshot::Sender<AppResult<()>>),
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    /// Send a command and wait for the actor's reply
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> GoogleCalendarCommand,
    ) -> AppResult<T> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(command(response_tx))
            .await
            .map_err(|e| other_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .await
            .map_err(|_| other_error("Response channel closed"))
    }

    /// Exchange an authorization code and store the resulting tokens
    pub async fn authorize(&self, code: String) -> AppResult<()> {
        self.request(|tx| GoogleCalendarCommand::Authorize(code, tx)).await?
    }

    pub async fn is_authenticated(&self) -> AppResult<bool> {
        self.request(GoogleCalendarCommand::IsAuthenticated).await
    }

    /// Get upcoming events from the calendar
    pub async fn list_events(&self) -> AppResult<Vec<CalendarEvent>> {
        self.request(GoogleCalendarCommand::ListEvents).await?
    }

    pub async fn add_event(&self, event: CalendarEvent) -> AppResult<CalendarEvent> {
        self.request(|tx| GoogleCalendarCommand::AddEvent(event, tx)).await?
    }

    pub async fn update_event(&self, patch: EventPatch) -> AppResult<CalendarEvent> {
        self.request(|tx| GoogleCalendarCommand::UpdateEvent(patch, tx)).await?
    }

    pub async fn delete_event(&self, event_id: String) -> AppResult<()> {
        self.request(|tx| GoogleCalendarCommand::DeleteEvent(event_id, tx)).await?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(api: Arc<dyn CalendarApi>, max_events: u32) -> (Self, GoogleCalendarActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(MAILBOX_SIZE);

        let actor = Self {
            api,
            session: TokenSession::new(),
            max_events,
            command_rx,
        };

        let handle = GoogleCalendarActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::Authorize(code, response_tx) => {
                    let _ = response_tx.send(self.authorize(&code).await);
                }
                GoogleCalendarCommand::IsAuthenticated(response_tx) => {
                    let _ = response_tx.send(self.session.is_authenticated());
                }
                GoogleCalendarCommand::ListEvents(response_tx) => {
                    let _ = response_tx.send(self.list_events().await);
                }
                GoogleCalendarCommand::AddEvent(event, response_tx) => {
                    let _ = response_tx.send(self.add_event(&event).await);
                }
                GoogleCalendarCommand::UpdateEvent(patch, response_tx) => {
                    let _ = response_tx.send(self.update_event(&patch).await);
                }
                GoogleCalendarCommand::DeleteEvent(event_id, response_tx) => {
                    let _ = response_tx.send(self.delete_event(&event_id).await);
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }

    async fn authorize(&mut self, code: &str) -> AppResult<()> {
        let tokens = self.api.exchange_code(code).await?;
        self.session.store(tokens);
        Ok(())
    }

    /// Access token for the next call, refreshing it first when it is about to expire
    async fn access_token(&mut self) -> AppResult<String> {
        match self.session.state_at(Utc::now()) {
            TokenState::Missing => Err(Error::Unauthorized),
            TokenState::Valid(access_token) => Ok(access_token),
            TokenState::NeedsRefresh(tokens) if tokens.refresh_token.is_none() => {
                warn!("Access token expired and no refresh token is available");
                self.session.clear();
                Err(Error::Unauthorized)
            }
            TokenState::NeedsRefresh(tokens) => {
                info!("Access token expiring, refreshing");
                let refreshed = match self.api.refresh_access_token(&tokens).await {
                    Ok(refreshed) => refreshed,
                    // Revoked or invalid grant, only a new consent helps
                    Err(Error::Upstream { status: 400 | 401, message }) => {
                        warn!("Refresh token rejected, clearing session: {}", message);
                        self.session.clear();
                        return Err(Error::Unauthorized);
                    }
                    Err(e) => {
                        error!("Error refreshing token: {}", e);
                        return Err(e);
                    }
                };
                let access_token = refreshed.access_token.clone();
                self.session.store_refreshed(refreshed);
                Ok(access_token)
            }
        }
    }

    async fn list_events(&mut self) -> AppResult<Vec<CalendarEvent>> {
        let access_token = self.access_token().await?;
        self.api
            .list_upcoming_events(&access_token, self.max_events)
            .await
    }

    async fn add_event(&mut self, event: &CalendarEvent) -> AppResult<CalendarEvent> {
        let access_token = self.access_token().await?;
        let created = self.api.insert_event(&access_token, event).await?;
        info!(event_id = ?created.id, "Event added");
        Ok(created)
    }

    /// Fetch the stored event, merge the patch into it and write it back
    async fn update_event(&mut self, patch: &EventPatch) -> AppResult<CalendarEvent> {
        let access_token = self.access_token().await?;
        let current = self.api.get_event(&access_token, &patch.event_id).await?;
        let merged = patch.apply_to(current);

        let updated = self
            .api
            .update_event(&access_token, &patch.event_id, &merged)
            .await?;
        info!(event_id = %patch.event_id, "Event updated");
        Ok(updated)
    }

    async fn delete_event(&mut self, event_id: &str) -> AppResult<()> {
        let access_token = self.access_token().await?;
        self.api.delete_event(&access_token, event_id).await?;
        info!(event_id, "Event deleted");
        Ok(())
    }
}
