//! Janitor
//!
//! Periodic sweep deleting expired sessions, expired verification and
//! reset tokens, and stale unverified accounts. Each delete is a pure
//! "where expired/stale" predicate, so running a sweep twice back to back
//! deletes nothing the second time, and overlapping runs are merely
//! redundant.
//!
//! The task is explicitly owned: started once during process
//! initialization with an injected store handle, stopped during shutdown.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::application::config::AuthConfig;
use crate::domain::repository::{
    ResetTokenRepository, SessionRepository, UserRepository, VerificationTokenRepository,
};
use crate::error::AuthResult;

/// Row counts removed by one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub sessions: u64,
    pub verification_tokens: u64,
    pub reset_tokens: u64,
    pub stale_users: u64,
}

impl SweepReport {
    pub fn total(&self) -> u64 {
        self.sessions + self.verification_tokens + self.reset_tokens + self.stale_users
    }
}

/// Run the four bulk deletes once against a point-in-time clock reading.
pub async fn run_sweep<S>(store: &S, config: &AuthConfig) -> AuthResult<SweepReport>
where
    S: UserRepository
        + SessionRepository
        + VerificationTokenRepository
        + ResetTokenRepository
        + Sync,
{
    let now = Utc::now();
    let stale_cutoff = now - config.unverified_max_age;

    let report = SweepReport {
        sessions: SessionRepository::delete_expired(store, now).await?,
        verification_tokens: VerificationTokenRepository::delete_expired(store, now).await?,
        reset_tokens: ResetTokenRepository::delete_expired(store, now).await?,
        stale_users: UserRepository::delete_unverified_before(store, stale_cutoff).await?,
    };

    Ok(report)
}

/// Handle to the running janitor task
pub struct Janitor {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl Janitor {
    /// Spawn the periodic sweep. The first tick fires after one full
    /// interval; callers wanting an immediate pass run [`run_sweep`] at
    /// startup.
    pub fn start<S>(store: Arc<S>, config: Arc<AuthConfig>) -> Self
    where
        S: UserRepository
            + SessionRepository
            + VerificationTokenRepository
            + ResetTokenRepository
            + Send
            + Sync
            + 'static,
    {
        let (shutdown, mut signal) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.janitor_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // interval fires immediately; the startup sweep already ran
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match run_sweep(store.as_ref(), &config).await {
                            Ok(report) => {
                                tracing::info!(
                                    sessions = report.sessions,
                                    verification_tokens = report.verification_tokens,
                                    reset_tokens = report.reset_tokens,
                                    stale_users = report.stale_users,
                                    "Janitor sweep completed"
                                );
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Janitor sweep failed");
                            }
                        }
                    }
                    _ = signal.changed() => break,
                }
            }
        });

        Self { handle, shutdown }
    }

    /// Stop the task and wait for it to finish
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
