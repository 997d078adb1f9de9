//! One operator's editing session over the app layer and, optionally, one
//! project layer.
//!
//! # Commit state machine
//! ```text
//!            edit              save()             both scopes ok
//!   Idle ──────────> Dirty ──────────> Saving ──────────────────> Idle
//!    ^                 │                 │
//!    │    cancel()     │                 │ any scope failed
//!    └─────────────────┘                 v
//!    ^                                 Error ── save() ──> Saving
//!    └──────────── cancel() ─────────────┘
//! ```
//!
//! The flush runs on a spawned task. Dropping the `save()` future, or the
//! whole session, does not cancel a write that has started; its outcome is
//! applied by the next call that settles it.

use std::sync::Arc;

use futures_util::FutureExt;
use tokio::task::{JoinError, JoinHandle};

use autocoder_config::{SettingsStore, StoreFetchError, StoreWriteError, WriteCause};
use autocoder_types::{
    AppScope, ProjectId, ProjectScope, ProjectSnapshot, Scope, Setting, SettingKey, SettingsPatch,
    Snapshots,
};

use crate::buffer::PendingBuffer;
use crate::classify::{ChangeKind, classify};
use crate::error::{FlushFailure, SettingsError};
use crate::view::{EffectiveEntry, ResolveCascade, cascade, effective};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitState {
    Idle,
    Dirty,
    Saving,
    /// The last save failed for at least one scope; its edits are retained.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// UI-only key, written to the store already.
    AppliedImmediately,
    Buffered,
    /// The value matches the fetched one; any pending edit was dropped.
    Reverted,
}

/// Keys written by a successful save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub app: Vec<SettingKey>,
    pub project: Vec<SettingKey>,
}

impl SaveReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.app.is_empty() && self.project.is_empty()
    }
}

struct FlushOutcome {
    app: Result<(), StoreWriteError>,
    project: Result<(), StoreWriteError>,
    /// Only attempted when both writes succeeded.
    refreshed: Option<Result<Snapshots, StoreFetchError>>,
}

pub struct SettingsSession<S: ?Sized> {
    store: Arc<S>,
    project: Option<ProjectId>,
    /// `Err` holds the reason no snapshot is available.
    snapshots: Result<Snapshots, String>,
    app_pending: PendingBuffer<AppScope>,
    project_pending: PendingBuffer<ProjectScope>,
    state: CommitState,
    in_flight: Option<JoinHandle<FlushOutcome>>,
}

async fn fetch_snapshots<S: SettingsStore + ?Sized>(
    store: &S,
    project: Option<&ProjectId>,
) -> Result<Snapshots, StoreFetchError> {
    let app = store.fetch_app_settings().await?;
    let project = match project {
        Some(id) => Some(ProjectSnapshot {
            id: id.clone(),
            settings: store.fetch_project_settings(id).await?,
        }),
        None => None,
    };
    Ok(Snapshots { app, project })
}

async fn flush<S: SettingsStore + ?Sized>(
    store: Arc<S>,
    app: SettingsPatch,
    project: Option<(ProjectId, SettingsPatch)>,
) -> FlushOutcome {
    let app_result = if app.is_empty() {
        Ok(())
    } else {
        store.write_app_settings(&app).await
    };
    let project_result = match &project {
        Some((id, patch)) if !patch.is_empty() => store.write_project_settings(id, patch).await,
        _ => Ok(()),
    };

    let refreshed = if app_result.is_ok() && project_result.is_ok() {
        let id = project.as_ref().map(|(id, _)| id);
        Some(fetch_snapshots(&*store, id).await)
    } else {
        None
    };

    FlushOutcome {
        app: app_result,
        project: project_result,
        refreshed,
    }
}

impl<S: SettingsStore + ?Sized + 'static> SettingsSession<S> {
    /// Fetch both layers. On failure the session stays open but unavailable
    /// until [`refresh`](Self::refresh) succeeds.
    pub async fn open(store: Arc<S>, project: Option<ProjectId>) -> Self {
        let snapshots = fetch_snapshots(&*store, project.as_ref())
            .await
            .map_err(|e| {
                tracing::warn!(project = ?project, "Settings unavailable: {e}");
                e.to_string()
            });
        Self {
            store,
            project,
            snapshots,
            app_pending: PendingBuffer::new(),
            project_pending: PendingBuffer::new(),
            state: CommitState::Idle,
            in_flight: None,
        }
    }

    #[must_use]
    pub fn project(&self) -> Option<&ProjectId> {
        self.project.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> CommitState {
        self.state
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.snapshots.is_ok()
    }

    pub fn snapshots(&self) -> Result<&Snapshots, SettingsError> {
        self.snapshots
            .as_ref()
            .map_err(|reason| SettingsError::Unavailable(reason.clone()))
    }

    #[must_use]
    pub fn has_unsaved(&self) -> bool {
        !self.app_pending.is_empty() || !self.project_pending.is_empty()
    }

    #[must_use]
    pub fn pending(&self, scope: Scope) -> &SettingsPatch {
        match scope {
            Scope::App => self.app_pending.entries(),
            Scope::Project => self.project_pending.entries(),
        }
    }

    pub fn view(&self, key: SettingKey) -> Result<EffectiveEntry, SettingsError> {
        let snapshots = self.snapshots()?;
        Ok(effective(
            snapshots,
            &self.app_pending,
            &self.project_pending,
            key,
        ))
    }

    pub fn view_named(&self, raw_key: &str) -> Result<EffectiveEntry, SettingsError> {
        self.view(SettingKey::parse(raw_key)?)
    }

    /// Every key in schema order.
    pub fn view_all(&self) -> Result<Vec<EffectiveEntry>, SettingsError> {
        let snapshots = self.snapshots()?;
        Ok(SettingKey::ALL
            .iter()
            .map(|&key| effective(snapshots, &self.app_pending, &self.project_pending, key))
            .collect())
    }

    pub fn cascade(&self, key: SettingKey) -> Result<ResolveCascade, SettingsError> {
        let snapshots = self.snapshots()?;
        Ok(cascade(
            snapshots,
            &self.app_pending,
            &self.project_pending,
            key,
        ))
    }

    /// Re-fetch both layers. Pending edits survive; those that now match the
    /// fetched value are dropped.
    pub async fn refresh(&mut self) -> Result<(), SettingsError> {
        self.settle_finished()?;
        match fetch_snapshots(&*self.store, self.project.as_ref()).await {
            Ok(snapshots) => {
                self.snapshots = Ok(snapshots);
                self.reconcile_pending();
                self.sync_state();
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Settings refresh failed: {e}");
                self.snapshots = Err(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Route an edit: UI-only keys are written now, everything else is
    /// buffered for `scope`.
    pub async fn edit(&mut self, scope: Scope, setting: Setting) -> Result<EditOutcome, SettingsError> {
        self.settle_finished()?;
        let key = setting.key();
        key.check_scope(scope)?;
        self.snapshots()?;

        match classify(key) {
            ChangeKind::Immediate => self.apply_immediately(setting).await,
            ChangeKind::Buffered => self.buffer_edit(scope, setting),
        }
    }

    async fn apply_immediately(&mut self, setting: Setting) -> Result<EditOutcome, SettingsError> {
        let key = setting.key();
        let patch = SettingsPatch::from([(key, setting)]);
        if let Err(e) = self.store.write_app_settings(&patch).await {
            tracing::warn!(key = %key, "Immediate settings write failed: {e}");
            return Err(e.into());
        }
        if let Ok(snapshots) = &mut self.snapshots {
            snapshots.app.merge(&patch)?;
        }
        tracing::debug!(key = %key, "Applied setting immediately");
        Ok(EditOutcome::AppliedImmediately)
    }

    fn buffer_edit(&mut self, scope: Scope, setting: Setting) -> Result<EditOutcome, SettingsError> {
        let key = setting.key();
        let snapshots = self.snapshots()?;
        let unchanged = match scope {
            Scope::App => snapshots.app.get(key) == Some(&setting),
            Scope::Project => {
                let layer = snapshots
                    .project_settings()
                    .ok_or(SettingsError::NoProject)?;
                layer.get(key) == Some(&setting)
            }
        };

        let outcome = if unchanged {
            match scope {
                Scope::App => self.app_pending.unset(key),
                Scope::Project => self.project_pending.unset(key),
            };
            EditOutcome::Reverted
        } else {
            match scope {
                Scope::App => self.app_pending.set(setting)?,
                Scope::Project => self.project_pending.set(setting)?,
            };
            EditOutcome::Buffered
        };
        self.sync_state();
        tracing::debug!(key = %key, scope = %scope, outcome = ?outcome, "Buffered settings edit");
        Ok(outcome)
    }

    /// Drop one pending edit. Returns whether there was one.
    pub fn discard(&mut self, scope: Scope, key: SettingKey) -> Result<bool, SettingsError> {
        self.settle_finished()?;
        let removed = match scope {
            Scope::App => self.app_pending.unset(key),
            Scope::Project => self.project_pending.unset(key),
        };
        self.sync_state();
        Ok(removed.is_some())
    }

    /// Flush both buffers, app first. Each scope succeeds or fails on its own:
    /// a scope that was written is cleared, a scope that failed keeps its edits
    /// and the session moves to [`CommitState::Error`].
    ///
    /// With nothing pending no store call is made.
    pub async fn save(&mut self) -> Result<SaveReport, SettingsError> {
        self.settle_finished()?;
        self.snapshots()?;
        if !self.has_unsaved() {
            tracing::debug!("No settings changes to save");
            return Ok(SaveReport::default());
        }

        let app = self.app_pending.entries().clone();
        let project = self
            .project
            .clone()
            .filter(|_| !self.project_pending.is_empty())
            .map(|id| (id, self.project_pending.entries().clone()));
        tracing::info!(
            app_keys = app.len(),
            project_keys = self.project_pending.len(),
            "Saving settings"
        );

        self.state = CommitState::Saving;
        self.in_flight = Some(tokio::spawn(flush(Arc::clone(&self.store), app, project)));
        Ok(self.settle().await?.unwrap_or_default())
    }

    /// Wait for an in-flight save and apply its outcome. `Ok(None)` if no save
    /// was running.
    pub async fn settle(&mut self) -> Result<Option<SaveReport>, SettingsError> {
        let Some(handle) = self.in_flight.as_mut() else {
            return Ok(None);
        };
        let joined = handle.await;
        self.in_flight = None;
        self.apply_flush(joined).map(Some)
    }

    /// Apply a finished background save; reject the call if it is still
    /// running.
    fn settle_finished(&mut self) -> Result<(), SettingsError> {
        let Some(handle) = self.in_flight.as_mut() else {
            return Ok(());
        };
        let Some(joined) = handle.now_or_never() else {
            return Err(SettingsError::InFlight);
        };
        self.in_flight = None;
        if let Err(e) = self.apply_flush(joined) {
            tracing::warn!("Background settings save failed: {e}");
        }
        Ok(())
    }

    fn apply_flush(&mut self, joined: Result<FlushOutcome, JoinError>) -> Result<SaveReport, SettingsError> {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                // Whether anything landed is unknown; keep every edit.
                let reason = e.to_string();
                let failures = [
                    (Scope::App, self.app_pending.entries()),
                    (Scope::Project, self.project_pending.entries()),
                ]
                .into_iter()
                .filter(|(_, entries)| !entries.is_empty())
                .map(|(scope, entries)| {
                    StoreWriteError::new(
                        scope,
                        entries.keys().copied(),
                        WriteCause::Join(reason.clone()),
                    )
                })
                .collect();
                self.state = CommitState::Error;
                return Err(FlushFailure { failures }.into());
            }
        };

        self.state = CommitState::Idle;
        let mut report = SaveReport::default();
        let mut failures = Vec::new();

        match outcome.app {
            Ok(()) => {
                let flushed = self.app_pending.take();
                if let Ok(snapshots) = &mut self.snapshots
                    && let Err(e) = snapshots.app.merge(&flushed)
                {
                    tracing::warn!("Saved app settings did not fit the snapshot: {e}");
                }
                report.app = flushed.into_keys().collect();
            }
            Err(e) => failures.push(e),
        }

        match outcome.project {
            Ok(()) => {
                let flushed = self.project_pending.take();
                if let Ok(snapshots) = &mut self.snapshots
                    && let Some(project) = snapshots.project.as_mut()
                    && let Err(e) = project.settings.merge(&flushed)
                {
                    tracing::warn!("Saved project settings did not fit the snapshot: {e}");
                }
                report.project = flushed.into_keys().collect();
            }
            Err(e) => failures.push(e),
        }

        if !failures.is_empty() {
            self.state = CommitState::Error;
            let failure = FlushFailure { failures };
            tracing::warn!("{failure}");
            return Err(failure.into());
        }

        match outcome.refreshed {
            Some(Ok(snapshots)) => self.snapshots = Ok(snapshots),
            Some(Err(e)) => {
                tracing::warn!("Settings saved but re-fetch failed; keeping merged snapshot: {e}");
            }
            None => {}
        }
        self.sync_state();
        tracing::info!(
            app_keys = report.app.len(),
            project_keys = report.project.len(),
            "Settings saved"
        );
        Ok(report)
    }

    /// Discard every pending edit without touching the store.
    pub fn cancel(&mut self) -> Result<usize, SettingsError> {
        self.settle_finished()?;
        let discarded = self.app_pending.clear() + self.project_pending.clear();
        self.state = CommitState::Idle;
        tracing::debug!(discarded, "Cancelled settings edits");
        Ok(discarded)
    }

    /// Remove one project override, pending or stored. Returns whether the
    /// store had an override; a key without one is a successful no-op.
    pub async fn reset(&mut self, key: SettingKey) -> Result<bool, SettingsError> {
        self.settle_finished()?;
        self.snapshots()?;
        let project = self.project.clone().ok_or(SettingsError::NoProject)?;
        key.check_scope(Scope::Project)?;

        let removed = self.project_pending.unset(key);
        match self.store.delete_project_setting(&project, key).await {
            Ok(existed) => {
                if let Ok(snapshots) = &mut self.snapshots
                    && let Some(layer) = snapshots.project.as_mut()
                {
                    layer.settings.remove(key);
                }
                self.sync_state();
                tracing::info!(project = %project, key = %key, existed, "Reset project setting");
                Ok(existed)
            }
            Err(e) => {
                if let Some(setting) = removed {
                    self.project_pending.restore(SettingsPatch::from([(key, setting)]));
                }
                tracing::warn!(project = %project, key = %key, "Reset failed: {e}");
                Err(e.into())
            }
        }
    }

    /// Clear a whole scope: every project override, or every app value
    /// (back to defaults). Pending edits for the scope are dropped on success
    /// and kept on failure.
    pub async fn reset_all(&mut self, scope: Scope) -> Result<usize, SettingsError> {
        self.settle_finished()?;
        self.snapshots()?;

        let result = match scope {
            Scope::App => {
                let taken = self.app_pending.take();
                match self.store.reset_app_settings().await {
                    Ok(cleared) => {
                        if let Ok(snapshots) = &mut self.snapshots {
                            snapshots.app.clear();
                        }
                        Ok(cleared)
                    }
                    Err(e) => {
                        self.app_pending.restore(taken);
                        Err(e)
                    }
                }
            }
            Scope::Project => {
                let project = self.project.clone().ok_or(SettingsError::NoProject)?;
                let taken = self.project_pending.take();
                match self.store.reset_project_settings(&project).await {
                    Ok(cleared) => {
                        if let Ok(snapshots) = &mut self.snapshots
                            && let Some(layer) = snapshots.project.as_mut()
                        {
                            layer.settings.clear();
                        }
                        Ok(cleared)
                    }
                    Err(e) => {
                        self.project_pending.restore(taken);
                        Err(e)
                    }
                }
            }
        };
        self.sync_state();

        match result {
            Ok(cleared) => {
                tracing::info!(scope = %scope, cleared, "Reset settings scope");
                Ok(cleared)
            }
            Err(e) => {
                tracing::warn!(scope = %scope, "Scope reset failed: {e}");
                Err(e.into())
            }
        }
    }

    fn reconcile_pending(&mut self) {
        let Ok(snapshots) = &self.snapshots else {
            return;
        };
        self.app_pending
            .retain(|setting| snapshots.app.get(setting.key()) != Some(setting));
        if let Some(layer) = snapshots.project_settings() {
            self.project_pending
                .retain(|setting| layer.get(setting.key()) != Some(setting));
        }
    }

    fn sync_state(&mut self) {
        self.state = match self.state {
            CommitState::Saving => CommitState::Saving,
            _ if !self.has_unsaved() => CommitState::Idle,
            CommitState::Error => CommitState::Error,
            CommitState::Idle | CommitState::Dirty => CommitState::Dirty,
        };
    }
}

impl<S: ?Sized> Drop for SettingsSession<S> {
    fn drop(&mut self) {
        if self.in_flight.is_some() {
            tracing::debug!("Settings session closed with a save in flight; the write continues");
        }
    }
}
