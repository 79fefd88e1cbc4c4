//! Terminal watch mode: re-render the dashboard on every scheduler tick.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use todayboard_core::OutputFormat;
use todayboard_providers::{BoxFuture, CredentialStore, TodaySync};
use todayboard_server::{Scheduler, SchedulerConfig};
use tracing::{debug, info, warn};

use super::show::render;
use super::{google_sync, open_store};
use crate::config::{ClientConfig, CredentialOverrides};
use crate::error::{ClientError, ClientResult};

/// Refresh and print the dashboard until Ctrl-C.
pub async fn watch(
    config: &ClientConfig,
    overrides: &CredentialOverrides,
    format: OutputFormat,
    interval_secs: Option<u64>,
) -> ClientResult<()> {
    let interval = interval_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.refresh_interval());
    if interval.is_zero() {
        return Err(ClientError::Config(
            "refresh interval must be greater than zero".to_string(),
        ));
    }

    let store = Arc::new(open_store(config)?);
    let sync = google_sync(config, overrides)?;

    let scheduler = Scheduler::new(SchedulerConfig::new(interval).with_refresh_on_start(true));
    let handle = scheduler.handle();
    let runner = tokio::spawn(scheduler.run(refresh_cycle(sync, store, format, |out| {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(out.as_bytes());
        let _ = stdout.flush();
    })));

    tokio::signal::ctrl_c().await?;
    info!("stopping watch");
    if handle.stop().await.is_err() {
        debug!("scheduler already stopped");
    }
    if let Err(e) = runner.await {
        warn!(error = %e, "scheduler task failed");
    }
    Ok(())
}

/// Builds the per-tick refresh: reload the credential file, fetch a snapshot,
/// render it, hand it to `write`.
///
/// Failures are returned as messages so the scheduler can log them and wait
/// for the next tick.
pub(crate) fn refresh_cycle<W>(
    sync: TodaySync,
    store: Arc<CredentialStore>,
    format: OutputFormat,
    write: W,
) -> impl Fn() -> BoxFuture<'static, Result<(), String>> + Send + Sync + 'static
where
    W: Fn(String) + Send + Sync + 'static,
{
    let write = Arc::new(write);
    move || {
        let sync = sync.clone();
        let store = store.clone();
        let write = write.clone();
        let cycle: BoxFuture<'static, Result<(), String>> = Box::pin(async move {
            store.load().map_err(|e| e.to_string())?;
            let now = Utc::now();
            let snapshot = sync
                .refresh_from(&store, now)
                .await
                .map_err(|e| e.to_string())?;
            let body = render(&snapshot, format).map_err(|e| e.to_string())?;

            let out = match format {
                OutputFormat::Tty => format!("\n[updated {}]\n{}", now.format("%H:%M:%S UTC"), body),
                OutputFormat::Json => body,
            };
            (*write)(out);
            Ok::<_, String>(())
        });
        cycle
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use todayboard_core::NOT_AUTHENTICATED_TEXT;

    use super::*;
    use crate::commands::LOGIN_HINT;
    use crate::commands::testing::{Fixture, store_in};

    type Sink = Arc<Mutex<Vec<String>>>;

    fn collect(sink: &Sink) -> impl Fn(String) + Send + Sync + 'static {
        let sink = sink.clone();
        move |out| sink.lock().unwrap().push(out)
    }

    #[tokio::test(start_paused = true)]
    async fn renders_on_start_and_every_tick() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = Fixture::new(vec![]);
        let store = Arc::new(store_in(dir.path(), true));
        let sink = Sink::default();

        let scheduler = Scheduler::new(
            SchedulerConfig::new(Duration::from_secs(60)).with_refresh_on_start(true),
        );
        let handle = scheduler.handle();
        let runner = tokio::spawn(scheduler.run(refresh_cycle(
            fixture.sync.clone(),
            store,
            OutputFormat::Json,
            collect(&sink),
        )));

        tokio::time::sleep(Duration::from_secs(150)).await;
        handle.stop().await.unwrap();
        runner.await.unwrap();

        let outputs = sink.lock().unwrap().clone();
        assert_eq!(outputs.len(), 3);
        for out in &outputs {
            let value: serde_json::Value = serde_json::from_str(out).unwrap();
            assert_eq!(value["authenticated"], true);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn picks_up_login_and_logout_from_other_process() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = Fixture::new(vec![]);
        let store = Arc::new(store_in(dir.path(), false));
        let sink = Sink::default();

        let scheduler = Scheduler::new(
            SchedulerConfig::new(Duration::from_secs(300)).with_refresh_on_start(false),
        );
        let handle = scheduler.handle();
        let runner = tokio::spawn(scheduler.run(refresh_cycle(
            fixture.sync.clone(),
            store,
            OutputFormat::Json,
            collect(&sink),
        )));

        // `auth login` in another shell
        store_in(dir.path(), true);
        handle.sync_now().await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        // `auth logout` in another shell
        CredentialStore::persistent(dir.path().join("token.json"))
            .clear()
            .unwrap();
        handle.sync_now().await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        handle.stop().await.unwrap();
        runner.await.unwrap();

        let outputs = sink.lock().unwrap().clone();
        assert_eq!(outputs.len(), 2);
        let first: serde_json::Value = serde_json::from_str(&outputs[0]).unwrap();
        let second: serde_json::Value = serde_json::from_str(&outputs[1]).unwrap();
        assert_eq!(first["authenticated"], true);
        assert_eq!(second["authenticated"], false);
    }

    #[tokio::test(start_paused = true)]
    async fn sync_now_renders_logged_out_board() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = Fixture::new(vec![]);
        let store = Arc::new(store_in(dir.path(), false));
        let sink = Sink::default();

        let scheduler = Scheduler::new(
            SchedulerConfig::new(Duration::from_secs(300)).with_refresh_on_start(false),
        );
        let handle = scheduler.handle();
        let runner = tokio::spawn(scheduler.run(refresh_cycle(
            fixture.sync.clone(),
            store,
            OutputFormat::Tty,
            collect(&sink),
        )));

        handle.sync_now().await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.stop().await.unwrap();
        runner.await.unwrap();

        let outputs = sink.lock().unwrap().clone();
        assert_eq!(outputs.len(), 1);
        assert!(outputs[0].contains("[updated "));
        assert!(outputs[0].contains(NOT_AUTHENTICATED_TEXT));
        assert!(outputs[0].contains(LOGIN_HINT));
        assert_eq!(fixture.remote_calls(), 0);
    }
}
