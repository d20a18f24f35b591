//! Moves queued logs to the log service and keeps the merged view current.
//!
//! Every log is written to the [`LocalLogStore`] first. With a credential the
//! coordinator tries an immediate create and retires the local copy when it
//! succeeds; otherwise the log waits for a sync round. Rounds are
//! single-flight and never fail loudly: their outcome is published on a
//! `watch` channel instead. A round skips entries whose immediate create is
//! still in flight.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{Local, Utc};
use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;

use crate::auth::AuthSession;
use crate::db::KeyValueStore;
use crate::error::{Error, ErrorKind, Result};
use crate::gateway::{Credential, RemoteLogGateway};
use crate::models::{
    ExportPermission, LocalId, LogEntry, NewLog, PendingLogEntry, RemoteLogId, Summary,
    TimeWindow,
};
use crate::projection::{project, LogRef, LogView, ViewSource};
use crate::session::SessionContext;
use crate::state::{SkipReason, SyncOutcome, SyncReport, SyncState};
use crate::store::LocalLogStore;

/// What happened to a newly recorded log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Accepted by the log service straight away
    Confirmed(LogEntry),
    /// Kept in the offline queue for a later sync round
    Queued(PendingLogEntry),
}

/// Last remote list loaded for the active window
#[derive(Debug, Default)]
struct ViewCache {
    window: TimeWindow,
    remote: Option<Vec<LogEntry>>,
}

/// Clears the in-flight flag when a round ends, however it ends.
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SyncCoordinator<G, K> {
    gateway: G,
    store: LocalLogStore<K>,
    session: SessionContext,
    view: Mutex<ViewCache>,
    in_flight: AtomicBool,
    /// Local ids with an immediate create outstanding
    claimed: Mutex<HashSet<LocalId>>,
    report: watch::Sender<SyncReport>,
    sync_on_resume: bool,
}

impl<G: RemoteLogGateway, K: KeyValueStore> SyncCoordinator<G, K> {
    pub fn new(gateway: G, store: LocalLogStore<K>, session: SessionContext) -> Self {
        let (report, _) = watch::channel(SyncReport::default());
        Self {
            gateway,
            store,
            session,
            view: Mutex::new(ViewCache::default()),
            in_flight: AtomicBool::new(false),
            claimed: Mutex::new(HashSet::new()),
            report,
            sync_on_resume: true,
        }
    }

    /// Whether [`Self::resume`] runs a sync round before reloading.
    #[must_use]
    pub fn with_sync_on_resume(mut self, enabled: bool) -> Self {
        self.sync_on_resume = enabled;
        self
    }

    pub const fn store(&self) -> &LocalLogStore<K> {
        &self.store
    }

    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Watch the sync state and the result of the latest round.
    pub fn subscribe(&self) -> watch::Receiver<SyncReport> {
        self.report.subscribe()
    }

    pub fn last_report(&self) -> SyncReport {
        self.report.borrow().clone()
    }

    /// Validate and record a log.
    ///
    /// The log is queued locally before any network call. Remote failures
    /// leave it queued and are only logged; validation and storage failures
    /// are returned.
    pub async fn record_log(&self, log: NewLog) -> Result<RecordOutcome> {
        let log = log.validated()?;

        let Some(credential) = self.session.credential().await else {
            let queued = self.store.append(log).await?;
            tracing::debug!(local_id = %queued.local_id, "Signed out; log stays queued");
            return Ok(RecordOutcome::Queued(queued));
        };

        // Claimed under the same lock a round lists under, so no round
        // can pick the entry up between the append and the claim.
        let queued = {
            let mut claimed = self.claimed.lock().await;
            let queued = self.store.append(log).await?;
            claimed.insert(queued.local_id.clone());
            queued
        };

        let outcome = match self.gateway.create_log(&credential, &queued.log).await {
            Ok(entry) => {
                self.retire_confirmed(&queued.local_id).await;
                self.fold_into_view(&entry).await;
                tracing::debug!(id = %entry.id, "Log confirmed by the log service");
                RecordOutcome::Confirmed(entry)
            }
            Err(error) => {
                tracing::warn!(
                    local_id = %queued.local_id,
                    error = %error,
                    "Immediate create failed; log stays queued"
                );
                RecordOutcome::Queued(queued.clone())
            }
        };
        self.claimed.lock().await.remove(&queued.local_id);
        Ok(outcome)
    }

    /// Drop the local copy of a log the service already holds. Failures are
    /// logged, not returned: the log exists remotely either way.
    async fn retire_confirmed(&self, local_id: &LocalId) {
        let Err(error) = self.store.remove(local_id).await else {
            return;
        };
        tracing::warn!(%local_id, error = %error, "Could not drop confirmed log; marking it synced");
        if let Err(error) = self.store.mark_synced(std::slice::from_ref(local_id)).await {
            tracing::warn!(
                %local_id,
                error = %error,
                "Confirmed log is still queued and will be submitted again"
            );
        }
    }

    /// Run one sync round unless one is already running.
    ///
    /// Never returns an error; the outcome is also published to subscribers.
    pub async fn sync_pending(&self) -> SyncOutcome {
        let Some(_flight) = FlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("Sync round already running");
            return SyncOutcome::skipped(SkipReason::AlreadyRunning);
        };

        self.report
            .send_modify(|report| report.state = SyncState::Syncing);
        let outcome = self.run_round().await;
        self.report.send_modify(|report| {
            report.state = SyncState::Idle;
            report.last_outcome = Some(outcome.clone());
            report.last_attempt_at = Some(Utc::now());
        });
        outcome
    }

    async fn run_round(&self) -> SyncOutcome {
        let Some(credential) = self.session.credential().await else {
            return SyncOutcome::skipped(SkipReason::NoCredential);
        };

        let pending = {
            let claimed = self.claimed.lock().await;
            match self.store.list_unsynced().await {
                Ok(pending) => pending
                    .into_iter()
                    .filter(|entry| !claimed.contains(&entry.local_id))
                    .collect::<Vec<_>>(),
                Err(error) => return round_failed(&error),
            }
        };
        if pending.is_empty() {
            return SyncOutcome::skipped(SkipReason::NothingPending);
        }

        let payload = pending
            .iter()
            .map(PendingLogEntry::to_new_log)
            .collect::<Vec<_>>();
        let accepted = match self.gateway.sync_logs(&credential, &payload).await {
            Ok(accepted) => accepted,
            Err(error) => return round_failed(&error),
        };
        if accepted != payload.len() {
            tracing::warn!(
                submitted = payload.len(),
                accepted,
                "Log service accepted a different number of logs than submitted"
            );
        }

        let local_ids = pending
            .into_iter()
            .map(|entry| entry.local_id)
            .collect::<Vec<_>>();
        if let Err(error) = self.retire(&local_ids).await {
            return round_failed(&error);
        }

        self.reload_cached_view(&credential).await;
        tracing::info!(count = local_ids.len(), "Synced queued logs");
        SyncOutcome::Synced {
            count: local_ids.len(),
        }
    }

    async fn retire(&self, local_ids: &[LocalId]) -> Result<()> {
        self.store.mark_synced(local_ids).await?;
        self.store.purge_synced().await?;
        Ok(())
    }

    /// Load `window` for display and make it the active window.
    ///
    /// Signed out, the whole local queue is shown. A remote failure also
    /// falls back to the queue and explains itself in [`LogView::notice`].
    /// Storage failures are returned as errors.
    pub async fn load_view(&self, window: TimeWindow) -> Result<LogView> {
        let Some(credential) = self.session.credential().await else {
            self.cache(window, None).await;
            return self.local_view(window, None).await;
        };

        match self.gateway.list_logs(&credential, window).await {
            Ok(remote) => {
                let queued = self.store.list_all().await?;
                let entries = project(Some(&remote), &queued);
                self.cache(window, Some(remote)).await;
                Ok(LogView {
                    window,
                    source: ViewSource::Remote,
                    entries,
                    notice: None,
                })
            }
            Err(error) => {
                tracing::warn!(%window, error = %error, "Showing local logs only");
                self.cache(window, None).await;
                self.local_view(window, Some(fallback_notice(&error))).await
            }
        }
    }

    /// The active window as last loaded, merged with the current queue.
    /// Makes no network calls.
    pub async fn current_view(&self) -> Result<LogView> {
        let queued = self.store.list_all().await?;
        let cache = self.view.lock().await;
        let (source, entries) = match cache.remote.as_deref() {
            Some(remote) => (ViewSource::Remote, project(Some(remote), &queued)),
            None => (ViewSource::LocalFallback, project(None, &queued)),
        };
        Ok(LogView {
            window: cache.window,
            source,
            entries,
            notice: None,
        })
    }

    /// Explicit refresh: a sync round, then a fresh load of `window`.
    pub async fn refresh(&self, window: TimeWindow) -> Result<LogView> {
        let outcome = self.sync_pending().await;
        tracing::debug!(?outcome, "Refresh sync round finished");
        self.load_view(window).await
    }

    /// The client came back to the foreground: sync (when enabled) and
    /// reload the active window.
    pub async fn resume(&self) -> Result<LogView> {
        if self.sync_on_resume {
            self.sync_pending().await;
        }
        let window = self.view.lock().await.window;
        self.load_view(window).await
    }

    /// Run a sync round every `every` until `shutdown` resolves.
    pub async fn run_periodic(&self, every: Duration, shutdown: impl Future<Output = ()>) {
        let mut ticker = tokio::time::interval(every.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut shutdown = std::pin::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::debug!("Periodic sync stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let outcome = self.sync_pending().await;
                    tracing::debug!(?outcome, "Periodic sync round finished");
                }
            }
        }
    }

    /// Delete a displayed log.
    ///
    /// Queued logs are removed locally without a network call. Logs known to
    /// the service need a credential. Returns whether anything was deleted.
    pub async fn delete(&self, target: &LogRef) -> Result<bool> {
        match target {
            LogRef::Local(local_id) => {
                let removed = self.store.remove(local_id).await?;
                tracing::debug!(%local_id, removed, "Removed queued log");
                Ok(removed)
            }
            LogRef::Remote(id) => {
                let credential = self.require_credential("deleting a synced log").await?;
                let deleted = self.gateway.delete_log(&credential, id).await?;
                self.forget_remote(id).await;
                self.reload_cached_view(&credential).await;
                tracing::debug!(%id, deleted, "Deleted remote log");
                Ok(deleted)
            }
        }
    }

    /// Adopt `session` and push whatever is queued.
    pub async fn sign_in(&self, session: AuthSession) -> Result<SyncOutcome> {
        self.session.sign_in(session).await?;
        Ok(self.sync_pending().await)
    }

    /// Drop the credential and the cached remote list. Queued logs stay.
    pub async fn sign_out(&self) -> Result<()> {
        self.session.sign_out().await?;
        self.view.lock().await.remote = None;
        Ok(())
    }

    pub async fn generate_summary(&self, window: TimeWindow) -> Result<Summary> {
        let credential = self.require_credential("generating a summary").await?;
        self.gateway.generate_summary(&credential, window).await
    }

    pub async fn export_permission(&self) -> Result<ExportPermission> {
        let credential = self.require_credential("checking export access").await?;
        self.gateway.can_export(&credential).await
    }

    async fn require_credential(&self, action: &'static str) -> Result<Credential> {
        self.session
            .credential()
            .await
            .ok_or(Error::AuthRequired(action))
    }

    async fn local_view(&self, window: TimeWindow, notice: Option<String>) -> Result<LogView> {
        let queued = self.store.list_all().await?;
        Ok(LogView {
            window,
            source: ViewSource::LocalFallback,
            entries: project(None, &queued),
            notice,
        })
    }

    async fn cache(&self, window: TimeWindow, remote: Option<Vec<LogEntry>>) {
        let mut cache = self.view.lock().await;
        cache.window = window;
        cache.remote = remote;
    }

    async fn fold_into_view(&self, entry: &LogEntry) {
        let today = Local::now().date_naive();
        let mut cache = self.view.lock().await;
        let window = cache.window;
        if let Some(remote) = cache.remote.as_mut() {
            if window.contains(entry.date, today) && !remote.iter().any(|known| known.id == entry.id)
            {
                remote.push(entry.clone());
            }
        }
    }

    async fn forget_remote(&self, id: &RemoteLogId) {
        if let Some(remote) = self.view.lock().await.remote.as_mut() {
            remote.retain(|entry| &entry.id != id);
        }
    }

    /// Refetch the active window if a remote list is cached. Failures keep
    /// the cached list.
    async fn reload_cached_view(&self, credential: &Credential) {
        let window = {
            let cache = self.view.lock().await;
            if cache.remote.is_none() {
                return;
            }
            cache.window
        };

        match self.gateway.list_logs(credential, window).await {
            Ok(remote) => {
                let mut cache = self.view.lock().await;
                if cache.window == window {
                    cache.remote = Some(remote);
                }
            }
            Err(error) => {
                tracing::warn!(%window, error = %error, "Could not refresh remote logs");
            }
        }
    }
}

fn round_failed(error: &Error) -> SyncOutcome {
    tracing::warn!(error = %error, "Sync round failed; logs stay queued");
    SyncOutcome::Failed {
        kind: error.kind(),
        message: error.to_string(),
    }
}

fn fallback_notice(error: &Error) -> String {
    match error.kind() {
        ErrorKind::Unauthorized => {
            "The log service rejected your session. Sign in again; showing logs saved on this device."
                .to_string()
        }
        ErrorKind::Network => {
            "Could not reach the log service. Showing logs saved on this device.".to_string()
        }
        _ => format!("The log service failed ({error}). Showing logs saved on this device."),
    }
}
