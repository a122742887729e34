#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use calendar_todo::components::google_calendar::{CalendarApi, CalendarEvent, EventDateTime, TokenPair};
use calendar_todo::components::GoogleCalendarHandle;
use calendar_todo::error::{AppResult, Error};
use calendar_todo::server::{self, AppState};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};
use tower::ServiceExt;

/// Authorization code the mock accepts
pub const VALID_CODE: &str = "valid-code";

/// In-memory stand-in for the Google Calendar API
#[derive(Debug)]
pub struct MockCalendarApi {
    events: RwLock<HashMap<String, CalendarEvent>>,
    next_id: AtomicUsize,
    calendar_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    token_lifetime: Duration,
    issue_refresh_token: bool,
    reject_refresh: bool,
    last_access_token: RwLock<Option<String>>,
    list_gate: Option<Arc<Notify>>,
    list_entered: Notify,
}

impl Default for MockCalendarApi {
    fn default() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
            calendar_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            token_lifetime: Duration::hours(1),
            issue_refresh_token: true,
            reject_refresh: false,
            last_access_token: RwLock::new(None),
            list_gate: None,
            list_entered: Notify::new(),
        }
    }
}

impl MockCalendarApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock whose access tokens are already expired when issued
    pub fn with_expired_tokens() -> Self {
        Self {
            token_lifetime: Duration::seconds(0),
            ..Self::default()
        }
    }

    /// Expired tokens issued without a refresh token
    pub fn without_refresh_token() -> Self {
        Self {
            issue_refresh_token: false,
            ..Self::with_expired_tokens()
        }
    }

    /// Expired tokens whose refresh token Google no longer accepts
    pub fn with_revoked_refresh_token() -> Self {
        Self {
            reject_refresh: true,
            ..Self::with_expired_tokens()
        }
    }

    /// Listing blocks until `gate` is notified
    pub fn with_list_gate(gate: Arc<Notify>) -> Self {
        Self {
            list_gate: Some(gate),
            ..Self::default()
        }
    }

    /// Wait until a gated listing call has started
    pub async fn list_started(&self) {
        self.list_entered.notified().await;
    }

    /// Store an event as if it already existed in the calendar
    pub async fn seed(&self, id: &str, summary: &str, start: &str, end: &str) {
        let event = CalendarEvent {
            id: Some(id.to_string()),
            summary: Some(summary.to_string()),
            description: Some(format!("{} description", summary)),
            start: Some(EventDateTime {
                date_time: Some(start.to_string()),
                ..Default::default()
            }),
            end: Some(EventDateTime {
                date_time: Some(end.to_string()),
                ..Default::default()
            }),
            color_id: Some("7".to_string()),
            ..Default::default()
        };
        self.events.write().await.insert(id.to_string(), event);
    }

    pub async fn stored(&self, id: &str) -> Option<CalendarEvent> {
        self.events.read().await.get(id).cloned()
    }

    /// Number of calendar (non-token) calls made so far
    pub fn calendar_calls(&self) -> usize {
        self.calendar_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub async fn last_access_token(&self) -> Option<String> {
        self.last_access_token.read().await.clone()
    }

    async fn record_call(&self, access_token: &str) {
        self.calendar_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_access_token.write().await = Some(access_token.to_string());
    }

    fn not_found() -> Error {
        Error::Upstream {
            status: 404,
            message: "Not Found".to_string(),
        }
    }
}

#[async_trait]
impl CalendarApi for MockCalendarApi {
    fn authorization_url(&self) -> AppResult<String> {
        Ok("https://accounts.google.com/o/oauth2/v2/auth?client_id=test&access_type=offline".to_string())
    }

    async fn exchange_code(&self, code: &str) -> AppResult<TokenPair> {
        if code != VALID_CODE {
            return Err(Error::Upstream {
                status: 400,
                message: "invalid_grant: Bad Request".to_string(),
            });
        }

        Ok(TokenPair {
            access_token: "access-1".to_string(),
            refresh_token: self.issue_refresh_token.then(|| "refresh-1".to_string()),
            expires_at: Some(Utc::now() + self.token_lifetime),
            scope: None,
            token_type: Some("Bearer".to_string()),
        })
    }

    async fn refresh_access_token(&self, _tokens: &TokenPair) -> AppResult<TokenPair> {
        let n = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.reject_refresh {
            return Err(Error::Upstream {
                status: 400,
                message: "invalid_grant: Token has been expired or revoked.".to_string(),
            });
        }

        Ok(TokenPair {
            access_token: format!("access-refreshed-{}", n),
            refresh_token: None,
            expires_at: Some(Utc::now() + Duration::hours(1)),
            scope: None,
            token_type: Some("Bearer".to_string()),
        })
    }

    async fn list_upcoming_events(&self, access_token: &str, max_results: u32) -> AppResult<Vec<CalendarEvent>> {
        self.record_call(access_token).await;
        if let Some(gate) = &self.list_gate {
            self.list_entered.notify_one();
            gate.notified().await;
        }

        let mut events: Vec<CalendarEvent> = self.events.read().await.values().cloned().collect();
        events.sort_by_key(|e| e.start.as_ref().and_then(|s| s.date_time.clone()));
        events.truncate(max_results as usize);
        Ok(events)
    }

    async fn get_event(&self, access_token: &str, event_id: &str) -> AppResult<CalendarEvent> {
        self.record_call(access_token).await;
        self.stored(event_id).await.ok_or_else(Self::not_found)
    }

    async fn insert_event(&self, access_token: &str, event: &CalendarEvent) -> AppResult<CalendarEvent> {
        self.record_call(access_token).await;

        let id = format!("event-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut created = event.clone();
        created.id = Some(id.clone());
        self.events.write().await.insert(id, created.clone());
        Ok(created)
    }

    async fn update_event(
        &self,
        access_token: &str,
        event_id: &str,
        event: &CalendarEvent,
    ) -> AppResult<CalendarEvent> {
        self.record_call(access_token).await;

        let mut events = self.events.write().await;
        if !events.contains_key(event_id) {
            return Err(Self::not_found());
        }
        let mut updated = event.clone();
        updated.id = Some(event_id.to_string());
        events.insert(event_id.to_string(), updated.clone());
        Ok(updated)
    }

    async fn delete_event(&self, access_token: &str, event_id: &str) -> AppResult<()> {
        self.record_call(access_token).await;

        match self.events.write().await.remove(event_id) {
            Some(_) => Ok(()),
            None => Err(Self::not_found()),
        }
    }
}

/// Router wired to the given mock
pub fn app_with(api: Arc<MockCalendarApi>) -> Router {
    let calendar = GoogleCalendarHandle::new(api, 10);
    server::router(AppState::new(calendar, chrono_tz::Asia::Kolkata))
}

/// Send one request through the router and return status plus raw body
pub async fn send_raw(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Like `send_raw` but parses the body as JSON
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, text) = send_raw(app, method, uri, body).await;
    let json = serde_json::from_str(&text).unwrap_or(Value::Null);
    (status, json)
}

/// Complete the OAuth callback with the accepted code
pub async fn authorize(app: &Router) {
    let (status, _) = send_raw(app, Method::GET, &format!("/auth-callback?code={}", VALID_CODE), None).await;
    assert_eq!(status, StatusCode::OK);
}
