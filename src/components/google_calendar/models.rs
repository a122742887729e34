use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Start or end of a Google Calendar event
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// All-day events carry a date instead of a date-time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// Google Calendar event resource.
///
/// Fields the service touches are typed; everything else the provider sends
/// is kept in `extra` so it round-trips untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Page of events returned by `events.list`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EventList {
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
}

/// Changes requested for an existing event
#[derive(Debug, Clone, PartialEq)]
pub struct EventPatch {
    pub event_id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

impl EventPatch {
    /// Merge the patch into the event currently held by the provider.
    /// Empty text fields count as absent and keep the stored value.
    pub fn apply_to(&self, current: CalendarEvent) -> CalendarEvent {
        let mut merged = current;

        if let Some(summary) = non_empty(&self.summary) {
            merged.summary = Some(summary);
        }
        if let Some(description) = non_empty(&self.description) {
            merged.description = Some(description);
        }
        merged.start = Some(self.start.clone());
        merged.end = Some(self.end.clone());

        merged
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// Response body of the OAuth token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Error body of the OAuth token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Access token plus the data needed to renew it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

impl TokenPair {
    /// Build a token pair from a token endpoint response received at `now`
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            // An out-of-range lifetime is treated as no expiry
            expires_at: response
                .expires_in
                .and_then(chrono::Duration::try_seconds)
                .and_then(|lifetime| now.checked_add_signed(lifetime)),
            scope: response.scope,
            token_type: response.token_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored_event() -> CalendarEvent {
        serde_json::from_value(json!({
            "id": "evt1",
            "summary": "Water plants",
            "description": "Balcony too",
            "start": { "dateTime": "2025-01-01T10:00:00+05:30", "timeZone": "Asia/Kolkata" },
            "end": { "dateTime": "2025-01-01T11:00:00+05:30", "timeZone": "Asia/Kolkata" },
            "reminders": { "useDefault": false, "overrides": [{ "method": "popup", "minutes": 10 }] },
            "colorId": "5",
            "location": "Home",
            "htmlLink": "https://calendar.google.com/event?eid=abc"
        }))
        .unwrap()
    }

    fn patch(summary: Option<&str>, description: Option<&str>) -> EventPatch {
        EventPatch {
            event_id: "evt1".to_string(),
            summary: summary.map(str::to_string),
            description: description.map(str::to_string),
            start: EventDateTime {
                date_time: Some("2025-01-02T09:00:00+05:30".to_string()),
                time_zone: Some("Asia/Kolkata".to_string()),
                ..Default::default()
            },
            end: EventDateTime {
                date_time: Some("2025-01-02T10:00:00+05:30".to_string()),
                time_zone: Some("Asia/Kolkata".to_string()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let event = stored_event();
        assert_eq!(event.extra.get("location"), Some(&json!("Home")));

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["htmlLink"], json!("https://calendar.google.com/event?eid=abc"));
        assert_eq!(value["colorId"], json!("5"));
        assert_eq!(value["start"]["dateTime"], json!("2025-01-01T10:00:00+05:30"));
    }

    #[test]
    fn test_patch_without_summary_keeps_stored_summary() {
        let merged = patch(None, Some("")).apply_to(stored_event());

        assert_eq!(merged.summary.as_deref(), Some("Water plants"));
        assert_eq!(merged.description.as_deref(), Some("Balcony too"));
        assert_eq!(
            merged.start.unwrap().date_time.as_deref(),
            Some("2025-01-02T09:00:00+05:30")
        );
    }

    #[test]
    fn test_patch_keeps_reminders_color_and_extra_fields() {
        let merged = patch(Some("Water all plants"), None).apply_to(stored_event());

        assert_eq!(merged.summary.as_deref(), Some("Water all plants"));
        assert_eq!(merged.color_id.as_deref(), Some("5"));
        assert!(merged.reminders.is_some());
        assert_eq!(merged.extra.get("location"), Some(&json!("Home")));
    }

    #[test]
    fn test_token_pair_expiry_from_response() {
        let now = Utc::now();
        let response: TokenResponse = serde_json::from_value(json!({
            "access_token": "ya29.a",
            "refresh_token": "1//r",
            "expires_in": 3599,
            "token_type": "Bearer"
        }))
        .unwrap();

        let pair = TokenPair::from_response(response, now);
        assert_eq!(pair.expires_at, Some(now + chrono::Duration::seconds(3599)));
        assert_eq!(pair.refresh_token.as_deref(), Some("1//r"));
    }

    #[test]
    fn test_token_pair_with_absurd_lifetime_has_no_expiry() {
        let response: TokenResponse = serde_json::from_value(json!({
            "access_token": "ya29.a",
            "expires_in": i64::MAX
        }))
        .unwrap();

        let pair = TokenPair::from_response(response, Utc::now());
        assert!(pair.expires_at.is_none());
    }
}
