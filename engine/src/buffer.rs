//! Per-scope pending edits.
//!
//! A buffer only ever holds agent keys accepted at its scope. UI-only keys are
//! applied immediately and are refused here.

use std::marker::PhantomData;

use autocoder_types::{ScopeMarker, Setting, SettingKey, SettingsPatch};

use crate::SettingsError;
use crate::classify::{ChangeKind, classify};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PendingBuffer<S: ScopeMarker> {
    entries: SettingsPatch,
    _scope: PhantomData<S>,
}

impl<S: ScopeMarker> PendingBuffer<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: SettingsPatch::new(),
            _scope: PhantomData,
        }
    }

    /// Insert or overwrite the pending value for a key.
    pub fn set(&mut self, setting: Setting) -> Result<Option<Setting>, SettingsError> {
        let key = setting.key();
        if classify(key) == ChangeKind::Immediate {
            return Err(SettingsError::NotBuffered(key));
        }
        key.check_scope(S::SCOPE)?;
        Ok(self.entries.insert(key, setting))
    }

    /// Remove a pending entry. Idempotent.
    pub fn unset(&mut self, key: SettingKey) -> Option<Setting> {
        self.entries.remove(&key)
    }

    /// Drop every entry, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Empty the buffer, handing back its entries.
    pub fn take(&mut self) -> SettingsPatch {
        std::mem::take(&mut self.entries)
    }

    /// Put back entries removed by [`take`](Self::take). Entries set since
    /// then win.
    pub fn restore(&mut self, entries: SettingsPatch) {
        for (key, setting) in entries {
            self.entries.entry(key).or_insert(setting);
        }
    }

    #[must_use]
    pub fn entries(&self) -> &SettingsPatch {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, key: SettingKey) -> Option<&Setting> {
        self.entries.get(&key)
    }

    #[must_use]
    pub fn contains(&self, key: SettingKey) -> bool {
        self.entries.contains_key(&key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries whose value `keep` says no longer differs from the
    /// snapshot.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&Setting) -> bool) {
        self.entries.retain(|_, setting| keep(setting));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocoder_types::{AppScope, ProjectScope, Scope};

    #[test]
    fn set_overwrites_and_unset_is_idempotent() {
        let mut buffer = PendingBuffer::<ProjectScope>::new();
        assert_eq!(buffer.set(Setting::YoloMode(true)).unwrap(), None);
        assert_eq!(
            buffer.set(Setting::YoloMode(false)).unwrap(),
            Some(Setting::YoloMode(true))
        );
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.unset(SettingKey::YoloMode), Some(Setting::YoloMode(false)));
        assert_eq!(buffer.unset(SettingKey::YoloMode), None);
        assert!(buffer.is_empty());
    }

    #[test]
    fn ui_only_keys_never_enter_a_buffer() {
        let mut buffer = PendingBuffer::<AppScope>::new();
        let err = buffer.set(Setting::DarkMode(true)).unwrap_err();
        assert!(matches!(err, SettingsError::NotBuffered(SettingKey::DarkMode)));
        assert!(buffer.is_empty());
    }

    #[test]
    fn project_buffer_rejects_app_only_keys() {
        let mut buffer = PendingBuffer::<ProjectScope>::new();
        let err = buffer.set(Setting::AutoResume(false)).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Scope(e) if e.scope == Scope::Project && e.key == SettingKey::AutoResume
        ));
    }

    #[test]
    fn restore_does_not_clobber_newer_entries() {
        let mut buffer = PendingBuffer::<AppScope>::new();
        buffer.set(Setting::MaxConcurrency(2)).unwrap();
        buffer.set(Setting::AutoCommit(true)).unwrap();
        let taken = buffer.take();
        assert!(buffer.is_empty());

        buffer.set(Setting::MaxConcurrency(7)).unwrap();
        buffer.restore(taken);
        assert_eq!(
            buffer.get(SettingKey::MaxConcurrency),
            Some(&Setting::MaxConcurrency(7))
        );
        assert!(buffer.contains(SettingKey::AutoCommit));
        assert_eq!(buffer.clear(), 2);
    }
}
