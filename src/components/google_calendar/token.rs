use super::models::TokenPair;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

/// Access tokens this close to expiry are renewed before use
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// What the session needs before a calendar call can go out
#[derive(Debug, Clone, PartialEq)]
pub enum TokenState {
    /// No token pair has been stored yet
    Missing,
    /// Access token can be used as is
    Valid(String),
    /// Access token is expired or about to be, carries the pair to refresh
    NeedsRefresh(TokenPair),
}

/// Holder of the single OAuth token pair.
///
/// Owned by the calendar actor, so reads, refreshes and writes never
/// interleave. Lives as long as the actor does.
#[derive(Debug, Default)]
pub struct TokenSession {
    tokens: Option<TokenPair>,
}

impl TokenSession {
    pub fn new() -> Self {
        Self { tokens: None }
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_some()
    }

    /// Current token pair, if any
    pub fn tokens(&self) -> Option<&TokenPair> {
        self.tokens.as_ref()
    }

    /// Store a token pair from the authorization callback
    pub fn store(&mut self, tokens: TokenPair) {
        info!(
            expires_at = ?tokens.expires_at,
            has_refresh_token = tokens.refresh_token.is_some(),
            "Storing Google OAuth token pair"
        );
        self.tokens = Some(tokens);
    }

    /// Replace the token pair after a refresh.
    /// Google usually omits the refresh token here, so the old one is kept.
    pub fn store_refreshed(&mut self, mut refreshed: TokenPair) {
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = self
                .tokens
                .as_ref()
                .and_then(|current| current.refresh_token.clone());
        }
        info!(expires_at = ?refreshed.expires_at, "Access token refreshed");
        self.tokens = Some(refreshed);
    }

    /// Forget the stored token pair
    pub fn clear(&mut self) {
        if self.tokens.take().is_some() {
            warn!("Google OAuth token pair cleared");
        }
    }

    /// Decide whether the stored token can be used at `now`
    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        let Some(tokens) = &self.tokens else {
            return TokenState::Missing;
        };

        match tokens.expires_at {
            Some(expires_at) if expires_at - Duration::seconds(REFRESH_MARGIN_SECS) <= now => {
                TokenState::NeedsRefresh(tokens.clone())
            }
            _ => TokenState::Valid(tokens.access_token.clone()),
        }
    }
}
