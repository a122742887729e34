use super::models::{
    CalendarEvent, EventList, TokenErrorResponse, TokenPair, TokenResponse,
};
use crate::config::{Config, GoogleEndpoints};
use crate::error::{google_calendar_error, AppResult, Error};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Scopes requested on the consent screen
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/calendar.readonly",
    "https://www.googleapis.com/auth/calendar",
];

/// Remote calendar provider operations used by the actor
#[async_trait]
pub trait CalendarApi: Send + Sync + 'static {
    /// Consent URL for offline read/write calendar access
    fn authorization_url(&self) -> AppResult<String>;

    /// Exchange an authorization code for a token pair
    async fn exchange_code(&self, code: &str) -> AppResult<TokenPair>;

    /// Get a new access token for `tokens`
    async fn refresh_access_token(&self, tokens: &TokenPair) -> AppResult<TokenPair>;

    /// Upcoming single-instance events ordered by start time
    async fn list_upcoming_events(&self, access_token: &str, max_results: u32) -> AppResult<Vec<CalendarEvent>>;

    async fn get_event(&self, access_token: &str, event_id: &str) -> AppResult<CalendarEvent>;

    async fn insert_event(&self, access_token: &str, event: &CalendarEvent) -> AppResult<CalendarEvent>;

    /// Full replacement of the event with `event_id`
    async fn update_event(
        &self,
        access_token: &str,
        event_id: &str,
        event: &CalendarEvent,
    ) -> AppResult<CalendarEvent>;

    async fn delete_event(&self, access_token: &str, event_id: &str) -> AppResult<()>;
}

/// Google Calendar v3 client over reqwest
#[derive(Clone)]
pub struct GoogleApi {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    calendar_id: String,
    endpoints: GoogleEndpoints,
}

impl GoogleApi {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: config.google_redirect_uri.clone(),
            calendar_id: config.google_calendar_id.clone(),
            endpoints: config.google.clone(),
        })
    }

    /// URL of the calendar's events collection, or of one event in it
    fn events_url(&self, event_id: Option<&str>) -> AppResult<Url> {
        let mut url = Url::parse(&self.endpoints.api_base_url)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| google_calendar_error("API base URL cannot be a base"))?;
            segments
                .pop_if_empty()
                .push("calendars")
                .push(&self.calendar_id)
                .push("events");
            if let Some(id) = event_id {
                segments.push(id);
            }
        }

        Ok(url)
    }

    /// POST a form to the token endpoint
    async fn request_token(&self, params: &[(&str, &str)]) -> AppResult<TokenResponse> {
        let response = self
            .client
            .post(&self.endpoints.token_url)
            .form(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(Error::Upstream { status, message });
        }

        Ok(response.json::<TokenResponse>().await?)
    }
}

/// Turn a non-success Calendar API response into an upstream error
async fn check_status(response: Response) -> AppResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response".to_string());

    // Google wraps errors as {"error": {"code": ..., "message": ...}}
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body);

    Err(Error::Upstream { status, message })
}

#[async_trait]
impl CalendarApi for GoogleApi {
    fn authorization_url(&self) -> AppResult<String> {
        let mut url = Url::parse(&self.endpoints.auth_url)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("scope", &SCOPES.join(" "));

        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> AppResult<TokenPair> {
        let response = self
            .request_token(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .await?;

        Ok(TokenPair::from_response(response, Utc::now()))
    }

    async fn refresh_access_token(&self, tokens: &TokenPair) -> AppResult<TokenPair> {
        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .ok_or_else(|| google_calendar_error("No refresh token in token data"))?;

        let response = self
            .request_token(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .await?;

        Ok(TokenPair::from_response(response, Utc::now()))
    }

    async fn list_upcoming_events(&self, access_token: &str, max_results: u32) -> AppResult<Vec<CalendarEvent>> {
        let mut url = self.events_url(None)?;
        url.query_pairs_mut()
            .append_pair("timeMin", &Utc::now().to_rfc3339())
            .append_pair("maxResults", &max_results.to_string())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        debug!(%url, "Listing upcoming events");
        let response = self.client.get(url).bearer_auth(access_token).send().await?;
        let list: EventList = check_status(response).await?.json().await?;

        Ok(list.items)
    }

    async fn get_event(&self, access_token: &str, event_id: &str) -> AppResult<CalendarEvent> {
        let url = self.events_url(Some(event_id))?;
        let response = self.client.get(url).bearer_auth(access_token).send().await?;

        Ok(check_status(response).await?.json().await?)
    }

    async fn insert_event(&self, access_token: &str, event: &CalendarEvent) -> AppResult<CalendarEvent> {
        let url = self.events_url(None)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    async fn update_event(
        &self,
        access_token: &str,
        event_id: &str,
        event: &CalendarEvent,
    ) -> AppResult<CalendarEvent> {
        let url = self.events_url(Some(event_id))?;
        let response = self
            .client
            .put(url)
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    async fn delete_event(&self, access_token: &str, event_id: &str) -> AppResult<()> {
        let url = self.events_url(Some(event_id))?;
        let response = self.client.delete(url).bearer_auth(access_token).send().await?;
        check_status(response).await?;

        Ok(())
    }
}
