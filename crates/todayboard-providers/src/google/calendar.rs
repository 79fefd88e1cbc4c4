//! Google Calendar v3 client.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use todayboard_core::{CalendarEvent, EventTime, TimeWindow};
use tracing::{debug, warn};

use crate::api::{BoxFuture, CalendarApi};
use crate::credential::Credential;
use crate::error::ProviderResult;

use super::http::{check_status, read_json, send_error};

const API: &str = "calendar";

/// Page size requested from events.list.
const PAGE_SIZE: u32 = 250;

/// Lists events through the Google Calendar REST API.
#[derive(Debug, Clone)]
pub struct GoogleCalendar {
    http_client: reqwest::Client,
    base_url: String,
}

impl GoogleCalendar {
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    async fn fetch_events(
        &self,
        credential: &Credential,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> ProviderResult<Vec<CalendarEvent>> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list_events_page(credential, calendar_id, window, page_token.as_deref())
                .await?;

            events.extend(page.items.into_iter().filter_map(convert_event));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = events.len(), calendar_id, "fetched today's events");
        Ok(events)
    }

    async fn list_events_page(
        &self,
        credential: &Credential,
        calendar_id: &str,
        window: &TimeWindow,
        page_token: Option<&str>,
    ) -> ProviderResult<EventListResponse> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        );

        let mut request = self
            .http_client
            .get(&url)
            .bearer_auth(&credential.access_token)
            .query(&[
                ("timeMin", window.start.to_rfc3339()),
                ("timeMax", window.end.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("maxResults", PAGE_SIZE.to_string()),
            ]);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await.map_err(|e| send_error(e, API))?;
        let response = check_status(response, API).await?;
        read_json(response, API).await
    }
}

impl CalendarApi for GoogleCalendar {
    fn list_events<'a>(
        &'a self,
        credential: &'a Credential,
        calendar_id: &'a str,
        window: &'a TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>> {
        Box::pin(self.fetch_events(credential, calendar_id, window))
    }
}

/// Converts an API event, dropping cancelled or unparseable ones.
fn convert_event(event: ApiEvent) -> Option<CalendarEvent> {
    if event.status.as_deref() == Some("cancelled") {
        return None;
    }

    let id = event.id?;
    let Some(start) = convert_time(&event.start) else {
        warn!(event_id = %id, "skipping event with unusable start time");
        return None;
    };
    let Some(end) = convert_time(&event.end) else {
        warn!(event_id = %id, "skipping event with unusable end time");
        return None;
    };

    Some(CalendarEvent::new(id, event.summary, start, end))
}

fn convert_time(time: &ApiEventTime) -> Option<EventTime> {
    match (&time.date_time, &time.date) {
        (Some(dt), _) => DateTime::parse_from_rfc3339(dt)
            .ok()
            .map(|parsed| EventTime::from_utc(parsed.with_timezone(&Utc))),
        (None, Some(date)) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .map(EventTime::from_date),
        (None, None) => None,
    }
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: Option<String>,
    summary: Option<String>,
    #[serde(default)]
    start: ApiEventTime,
    #[serde(default)]
    end: ApiEventTime,
    status: Option<String>,
}

/// Either `dateTime` (timed event) or `date` (all-day event) is set.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
}
