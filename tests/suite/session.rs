//! Engine sessions over the file-backed store.

use autocoder_engine::{CommitState, EditOutcome, SettingsSession};
use autocoder_types::{Scope, Setting, SettingKey, Source};

use crate::common::Workspace;

#[tokio::test]
async fn saved_override_is_seen_by_a_fresh_session() {
    let ws = Workspace::new();
    ws.write_app_settings("yoloMode = false\nmaxConcurrency = 4\n");

    let mut session = SettingsSession::open(ws.store(), Some(Workspace::project_id())).await;
    assert!(session.is_available());
    assert_eq!(
        session
            .edit(Scope::Project, Setting::YoloMode(true))
            .await
            .unwrap(),
        EditOutcome::Buffered
    );
    assert_eq!(session.state(), CommitState::Dirty);
    assert!(Workspace::read(&ws.project_settings_path()).is_none());

    let report = session.save().await.unwrap();
    assert_eq!(report.project, vec![SettingKey::YoloMode]);
    assert!(report.app.is_empty());
    assert_eq!(session.state(), CommitState::Idle);

    let written = Workspace::read(&ws.project_settings_path()).unwrap();
    assert!(written.contains("yoloMode = true"), "{written}");

    let reopened = SettingsSession::open(ws.store(), Some(Workspace::project_id())).await;
    let entry = reopened.view(SettingKey::YoloMode).unwrap();
    assert_eq!(entry.value, Setting::YoloMode(true));
    assert_eq!(entry.source, Source::Project);
    assert!(!entry.is_dirty);

    let app_only = SettingsSession::open(ws.store(), None).await;
    let entry = app_only.view(SettingKey::YoloMode).unwrap();
    assert_eq!(entry.value, Setting::YoloMode(false));
    assert_eq!(entry.source, Source::App);
}

#[tokio::test]
async fn cancel_leaves_files_untouched() {
    let ws = Workspace::new();
    ws.write_app_settings("maxConcurrency = 4\n");
    let before = Workspace::read(&ws.app_settings_path());

    let mut session = SettingsSession::open(ws.store(), Some(Workspace::project_id())).await;
    session
        .edit(Scope::App, Setting::MaxConcurrency(8))
        .await
        .unwrap();
    session
        .edit(Scope::Project, Setting::AutoCommit(true))
        .await
        .unwrap();
    assert_eq!(session.cancel().unwrap(), 2);

    assert_eq!(Workspace::read(&ws.app_settings_path()), before);
    assert!(Workspace::read(&ws.project_settings_path()).is_none());
    assert_eq!(
        session.view(SettingKey::MaxConcurrency).unwrap().value,
        Setting::MaxConcurrency(4)
    );
}

#[tokio::test]
async fn ui_edit_is_written_without_save() {
    let ws = Workspace::new();
    let mut session = SettingsSession::open(ws.store(), None).await;

    assert_eq!(
        session
            .edit(Scope::App, Setting::Theme("dracula".into()))
            .await
            .unwrap(),
        EditOutcome::AppliedImmediately
    );
    assert_eq!(session.state(), CommitState::Idle);

    let written = Workspace::read(&ws.app_settings_path()).unwrap();
    assert!(written.contains("theme = \"dracula\""), "{written}");
}

#[tokio::test]
async fn reset_removes_override_from_disk() {
    let ws = Workspace::new();
    ws.write_project_settings("yoloMode = true\n# local tweaks\nautoCommit = true\n");

    let mut session = SettingsSession::open(ws.store(), Some(Workspace::project_id())).await;
    assert!(session.reset(SettingKey::YoloMode).await.unwrap());
    assert!(!session.reset(SettingKey::YoloMode).await.unwrap());

    let written = Workspace::read(&ws.project_settings_path()).unwrap();
    assert!(!written.contains("yoloMode"), "{written}");
    assert!(written.contains("autoCommit = true"), "{written}");
    assert!(written.contains("# local tweaks"), "{written}");

    assert_eq!(
        session.view(SettingKey::YoloMode).unwrap().source,
        Source::Default
    );
}

#[tokio::test]
async fn reset_all_app_restores_defaults() {
    let ws = Workspace::new();
    ws.write_app_settings("yoloMode = true\ntheme = \"dracula\"\n");

    let mut session = SettingsSession::open(ws.store(), None).await;
    assert_eq!(session.reset_all(Scope::App).await.unwrap(), 2);

    for entry in session.view_all().unwrap() {
        assert_eq!(entry.source, Source::Default, "{}", entry.key);
    }
    let reopened = SettingsSession::open(ws.store(), None).await;
    assert_eq!(
        reopened.view(SettingKey::Theme).unwrap().value,
        Setting::default_for(SettingKey::Theme)
    );
}

#[tokio::test]
async fn malformed_app_file_makes_session_unavailable() {
    let ws = Workspace::new();
    ws.write_app_settings("maxConcurrency = \"lots\"\n");

    let mut session = SettingsSession::open(ws.store(), None).await;
    assert!(!session.is_available());
    assert!(session.view(SettingKey::MaxConcurrency).is_err());

    ws.write_app_settings("maxConcurrency = 6\n");
    session.refresh().await.unwrap();
    assert_eq!(
        session.view(SettingKey::MaxConcurrency).unwrap().value,
        Setting::MaxConcurrency(6)
    );
}
