use crate::error::{config_error, env_error, AppResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Default location of the optional settings file
pub const DEFAULT_CONFIG_FILE: &str = "config/server.toml";
/// Calendar used when none is configured
pub const DEFAULT_CALENDAR_ID: &str = "primary";
/// Timezone attached to every event the service writes
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
/// Number of upcoming events returned by the list endpoint
pub const DEFAULT_MAX_EVENTS: u32 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Google OAuth and Calendar API endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleEndpoints {
    /// Consent screen URL
    pub auth_url: String,
    /// Token exchange and refresh URL
    pub token_url: String,
    /// Calendar API v3 base URL
    pub api_base_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            api_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
        }
    }
}

/// Non-secret settings that may come from the TOML file.
/// Environment variables take precedence over every field here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub calendar_id: Option<String>,
    pub timezone: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_events: Option<u32>,
    pub request_timeout_secs: Option<u64>,
}

/// Main configuration structure for the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google OAuth client ID
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Redirect URI registered for the OAuth client
    pub google_redirect_uri: String,
    /// Google Calendar ID to read and write
    pub google_calendar_id: String,
    /// IANA timezone for event times
    pub timezone: String,
    /// Address to bind the HTTP server on
    pub host: String,
    /// Port to bind the HTTP server on
    pub port: u16,
    /// Maximum number of upcoming events to list
    pub max_events: u32,
    /// Timeout for requests to Google, in seconds
    pub request_timeout_secs: u64,
    pub google: GoogleEndpoints,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let path = env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let settings = FileSettings::load(Path::new(&path))?;

        Self::from_lookup(|key| env::var(key).ok(), settings)
    }

    /// Build the configuration from a variable lookup and file settings
    pub fn from_lookup<F>(lookup: F, settings: FileSettings) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| env_error(key))
        };

        let google_client_id = required("CLIENT_ID")?;
        let google_client_secret = required("CLIENT_SECRET")?;
        let google_redirect_uri = required("REDIRECT_URI")?;

        let google_calendar_id = lookup("CALENDAR_ID")
            .or(settings.calendar_id)
            .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string());

        let timezone = lookup("TIMEZONE")
            .or(settings.timezone)
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        let host = lookup("HOST")
            .or(settings.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| config_error("Invalid PORT format"))?,
            None => settings.port.unwrap_or(DEFAULT_PORT),
        };

        let max_events = match lookup("MAX_EVENTS") {
            Some(value) => value
                .parse::<u32>()
                .map_err(|_| config_error("Invalid MAX_EVENTS format"))?,
            None => settings.max_events.unwrap_or(DEFAULT_MAX_EVENTS),
        };

        let request_timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| config_error("Invalid REQUEST_TIMEOUT_SECS format"))?,
            None => settings
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let config = Config {
            google_client_id,
            google_client_secret,
            google_redirect_uri,
            google_calendar_id,
            timezone,
            host,
            port,
            max_events,
            request_timeout_secs,
            google: GoogleEndpoints::default(),
        };

        // Fail at startup rather than on the first event write
        config.tz()?;

        Ok(config)
    }

    /// Parsed event timezone
    pub fn tz(&self) -> AppResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", self.timezone)))
    }

    /// Socket address string for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl FileSettings {
    /// Read settings from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings = toml::from_str::<FileSettings>(&content)?;
        Ok(settings)
    }
}
