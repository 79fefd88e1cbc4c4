//! Periodic refresh trigger.
//!
//! The scheduler calls a refresh function once at start and then every
//! `refresh_interval`. Each cycle runs to completion before the next one is
//! scheduled. A failed cycle is recorded and logged; the next tick is simply
//! awaited, there is no retry or backoff.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between two refresh cycles.
    pub refresh_interval: Duration,
    /// Whether to run a cycle immediately on start.
    pub refresh_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(300),
            refresh_on_start: true,
        }
    }
}

impl SchedulerConfig {
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            refresh_interval,
            ..Default::default()
        }
    }

    pub fn with_refresh_on_start(mut self, refresh_on_start: bool) -> Self {
        self.refresh_on_start = refresh_on_start;
        self
    }
}

/// Commands that can be sent to a running scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCommand {
    /// Run a cycle now.
    SyncNow,
    /// Skip timer ticks until resumed. Manual syncs still run.
    Pause,
    Resume,
    Stop,
}

/// Bookkeeping about past cycles.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    pub paused: bool,
    pub cycles: u64,
    pub consecutive_failures: u32,
    pub last_success: Option<DateTime<Utc>>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl SchedulerState {
    pub fn record_success(&mut self) {
        let now = Utc::now();
        self.cycles += 1;
        self.consecutive_failures = 0;
        self.last_success = Some(now);
        self.last_attempt = Some(now);
        self.last_error = None;
    }

    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.cycles += 1;
        self.consecutive_failures += 1;
        self.last_attempt = Some(Utc::now());
        self.last_error = Some(error.into());
    }
}

pub type SharedSchedulerState = Arc<RwLock<SchedulerState>>;

/// Drives refresh cycles from a timer and a command channel.
pub struct Scheduler {
    config: SchedulerConfig,
    state: SharedSchedulerState,
    command_tx: mpsc::Sender<SchedulerCommand>,
    command_rx: mpsc::Receiver<SchedulerCommand>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(16);
        Self {
            config,
            state: Arc::new(RwLock::new(SchedulerState::default())),
            command_tx,
            command_rx,
        }
    }

    /// Returns a handle for sending commands to the scheduler.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            command_tx: self.command_tx.clone(),
            state: self.state.clone(),
        }
    }

    pub fn state(&self) -> SharedSchedulerState {
        self.state.clone()
    }

    /// Runs until [`SchedulerCommand::Stop`] is received or every handle is
    /// dropped.
    ///
    /// `refresh_fn` returns Ok(()) on success or a message describing the
    /// failure.
    pub async fn run<F, Fut>(self, refresh_fn: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), String>> + Send,
    {
        let Self {
            config,
            state,
            command_tx,
            mut command_rx,
        } = self;
        // Only external handles keep the channel open.
        drop(command_tx);

        info!(
            interval_secs = config.refresh_interval.as_secs(),
            "scheduler started"
        );

        if config.refresh_on_start {
            run_cycle(&state, &refresh_fn).await;
        }

        loop {
            tokio::select! {
                _ = tokio::time::sleep(config.refresh_interval) => {
                    if state.read().await.paused {
                        debug!("scheduler paused, skipping tick");
                        continue;
                    }
                    run_cycle(&state, &refresh_fn).await;
                }
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(SchedulerCommand::SyncNow) => {
                            debug!("received SyncNow command");
                            run_cycle(&state, &refresh_fn).await;
                        }
                        Some(SchedulerCommand::Pause) => {
                            info!("scheduler paused");
                            state.write().await.paused = true;
                        }
                        Some(SchedulerCommand::Resume) => {
                            info!("scheduler resumed");
                            state.write().await.paused = false;
                        }
                        Some(SchedulerCommand::Stop) | None => {
                            info!("scheduler stopping");
                            break;
                        }
                    }
                }
            }
        }
    }
}

async fn run_cycle<F, Fut>(state: &SharedSchedulerState, refresh_fn: &F)
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<(), String>>,
{
    debug!("starting refresh cycle");
    match refresh_fn().await {
        Ok(()) => {
            debug!("refresh cycle completed");
            state.write().await.record_success();
        }
        Err(e) => {
            warn!(error = %e, "refresh cycle failed");
            state.write().await.record_failure(e);
        }
    }
}

/// Handle for sending commands to a running scheduler.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    command_tx: mpsc::Sender<SchedulerCommand>,
    state: SharedSchedulerState,
}

impl SchedulerHandle {
    pub async fn sync_now(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::SyncNow).await
    }

    pub async fn pause(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::Resume).await
    }

    pub async fn stop(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::Stop).await
    }

    /// Returns a copy of the current scheduler state.
    pub async fn state(&self) -> SchedulerState {
        self.state.read().await.clone()
    }

    pub async fn is_paused(&self) -> bool {
        self.state.read().await.paused
    }
}
