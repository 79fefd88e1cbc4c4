//! One-shot dashboard rendering.

use chrono::{DateTime, Utc};
use todayboard_core::{DashboardSnapshot, OutputFormat, render_json, render_text};
use todayboard_providers::{CredentialStore, TodaySync};

use super::{LOGIN_HINT, google_sync, open_store};
use crate::config::{ClientConfig, CredentialOverrides};
use crate::error::ClientResult;

/// Print today's events and tasks.
///
/// Without a stored credential this prints the unauthenticated board and
/// never needs the OAuth client configuration.
pub async fn show(
    config: &ClientConfig,
    overrides: &CredentialOverrides,
    format: OutputFormat,
) -> ClientResult<()> {
    let store = open_store(config)?;
    let now = Utc::now();

    let snapshot = if store.is_present() {
        let sync = google_sync(config, overrides)?;
        snapshot(&sync, &store, now).await?
    } else {
        DashboardSnapshot::unauthenticated(now)
    };

    print!("{}", render(&snapshot, format)?);
    Ok(())
}

pub(crate) async fn snapshot(
    sync: &TodaySync,
    store: &CredentialStore,
    now: DateTime<Utc>,
) -> ClientResult<DashboardSnapshot> {
    Ok(sync.refresh_from(store, now).await?)
}

/// Renders a snapshot in the requested format, newline-terminated.
pub fn render(snapshot: &DashboardSnapshot, format: OutputFormat) -> ClientResult<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", render_json(snapshot)?)),
        OutputFormat::Tty => {
            let mut out = render_text(snapshot);
            if !snapshot.authenticated {
                out.push_str(LOGIN_HINT);
                out.push('\n');
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use todayboard_core::{NO_EVENTS_TEXT, NOT_AUTHENTICATED_TEXT, RawTask};

    use super::*;
    use crate::commands::testing::{Fixture, store_in};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn logged_out_board_skips_remote_calls() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = Fixture::new(vec![]);
        let store = store_in(dir.path(), false);

        let snapshot = snapshot(&fixture.sync, &store, now()).await.unwrap();
        assert!(!snapshot.authenticated);
        assert_eq!(fixture.remote_calls(), 0);

        let text = render(&snapshot, OutputFormat::Tty).unwrap();
        assert!(text.starts_with(NOT_AUTHENTICATED_TEXT));
        assert!(text.contains(LOGIN_HINT));
    }

    #[tokio::test]
    async fn logged_in_board() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = Fixture::new(vec![
            RawTask::new("t1", "Buy milk").with_due("2024-03-15T00:00:00.000Z"),
            RawTask::new("t2", "Tomorrow").with_due("2024-03-16T00:00:00.000Z"),
        ]);
        let store = store_in(dir.path(), true);

        let snapshot = snapshot(&fixture.sync, &store, now()).await.unwrap();
        let text = render(&snapshot, OutputFormat::Tty).unwrap();
        assert!(text.contains("Standup"));
        assert!(text.contains("Buy milk"));
        assert!(!text.contains("Tomorrow"));
        assert!(!text.contains(NO_EVENTS_TEXT));
        assert!(!text.contains(LOGIN_HINT));
    }

    #[tokio::test]
    async fn json_output() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = Fixture::new(vec![]);
        let store = store_in(dir.path(), true);

        let snapshot = snapshot(&fixture.sync, &store, now()).await.unwrap();
        let out = render(&snapshot, OutputFormat::Json).unwrap();
        assert!(out.ends_with('\n'));

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["authenticated"], true);
        assert_eq!(value["date"], "2024-03-15");
        assert_eq!(value["events"][0]["title"], "Standup");
        assert!(value["tasks"].as_array().unwrap().is_empty());
    }
}
