// src/session/timer.rs

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::{
    sync::{Mutex, oneshot},
    task::JoinHandle,
    time::{MissedTickBehavior, interval_at, Instant},
};

use crate::{error::AppError, services::attempts::submit_attempt};

use super::state::{Submission, TestSession, TickOutcome};

/// Receives the automatic submission produced when the clock runs out.
#[async_trait]
pub trait AutoSubmit: Send + Sync {
    async fn submit(&self, submission: Submission) -> Result<i64, AppError>;
}

/// Submits straight into the store through the scoring service.
pub struct StoreSubmitter {
    pub pool: SqlitePool,
    pub test_id: i64,
    pub username: String,
}

#[async_trait]
impl AutoSubmit for StoreSubmitter {
    async fn submit(&self, submission: Submission) -> Result<i64, AppError> {
        submit_attempt(&self.pool, self.test_id, &self.username, &submission.answers).await
    }
}

/// Owner of a running countdown.
pub struct CountdownHandle {
    session: Arc<Mutex<TestSession>>,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl CountdownHandle {
    /// Stops the clock and closes the session without submitting.
    /// Safe to call after the countdown already finished.
    pub async fn teardown(mut self) {
        self.session.lock().await.teardown();
        if let Some(stop) = self.stop.take() {
            // The loop may already be gone; nothing to notify then.
            let _ = stop.send(());
        }
        if let Err(e) = self.task.await {
            tracing::warn!("Countdown task ended abnormally: {:?}", e);
        }
    }

    /// Waits for the countdown to end on its own (expiry or closed session).
    pub async fn finished(self) {
        // Dropping the sender would read as a stop request, so hold it.
        let CountdownHandle { stop, task, .. } = self;
        if let Err(e) = task.await {
            tracing::warn!("Countdown task ended abnormally: {:?}", e);
        }
        drop(stop);
    }
}

/// Ticks `session` once per second. On expiry the submission is handed to
/// `submitter` exactly once and the loop ends. The loop also ends as soon
/// as the session is closed by other means.
pub fn spawn_countdown(
    session: Arc<Mutex<TestSession>>,
    submitter: Arc<dyn AutoSubmit>,
) -> CountdownHandle {
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
    let shared = Arc::clone(&session);

    let task = tokio::spawn(async move {
        let period = Duration::from_secs(1);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut stop_rx => break,
                _ = ticker.tick() => {}
            }

            let outcome = shared.lock().await.tick();
            match outcome {
                TickOutcome::Running { .. } => continue,
                TickOutcome::Halted => break,
                TickOutcome::Expired(submission) => {
                    match submitter.submit(submission).await {
                        Ok(score) => tracing::info!(score, "Time is up, test auto-submitted"),
                        Err(e) => tracing::error!("Auto-submission failed: {}", e),
                    }
                    break;
                }
            }
        }
    });

    CountdownHandle {
        session,
        stop: Some(stop_tx),
        task,
    }
}
