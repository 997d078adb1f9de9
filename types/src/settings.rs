//! The closed settings schema shared across crates.
//!
//! Every recognized setting is a [`SettingKey`] variant and every value travels
//! as a [`Setting`], a tagged union whose payload type is fixed per key. Untyped
//! input (CLI text, TOML/JSON values) enters through [`Setting::new`] or
//! [`Setting::parse`] at the parse boundary; past that point a value of the
//! wrong shape for its key is unrepresentable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Model used for every model setting when nothing else is configured.
pub const DEFAULT_MODEL: &str = "claude-opus-4-6";

/// Identifier of every recognized setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingKey {
    DefaultModel,
    CoderModel,
    TesterModel,
    InitializerModel,
    MaxConcurrency,
    YoloMode,
    AutoResume,
    PauseOnError,
    TestingAgentRatio,
    TestingDirectory,
    Theme,
    DarkMode,
    ShowDebugPanel,
    DebugPanelHeight,
    CelebrateOnComplete,
    KanbanColumns,
    AutoCommit,
    CommitMessagePrefix,
    CreatePullRequests,
}

/// Cosmetic keys. Edits apply immediately and never enter a pending buffer.
pub const UI_ONLY_KEYS: &[SettingKey] = &[
    SettingKey::Theme,
    SettingKey::DarkMode,
    SettingKey::ShowDebugPanel,
    SettingKey::DebugPanelHeight,
    SettingKey::CelebrateOnComplete,
    SettingKey::KanbanColumns,
];

/// Keys a project may override. Always a subset of the agent keys.
pub const PROJECT_KEYS: &[SettingKey] = &[
    SettingKey::CoderModel,
    SettingKey::TesterModel,
    SettingKey::InitializerModel,
    SettingKey::MaxConcurrency,
    SettingKey::YoloMode,
    SettingKey::TestingAgentRatio,
    SettingKey::TestingDirectory,
    SettingKey::AutoCommit,
];

/// Which half of the compile-time key partition a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// No effect on agents; applied immediately.
    UiOnly,
    /// Changes running or queued agent behavior; buffered until saved.
    Agent,
}

/// Grouping used when listing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Models,
    Agents,
    Ui,
    Git,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Models,
        Category::Agents,
        Category::Ui,
        Category::Git,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Models => "models",
            Category::Agents => "agents",
            Category::Ui => "ui",
            Category::Git => "git",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Category::Models => "Models",
            Category::Agents => "Agents",
            Category::Ui => "Interface",
            Category::Git => "Git",
        }
    }

    /// Keys in this category, in schema order.
    #[must_use]
    pub fn keys(self) -> Vec<SettingKey> {
        SettingKey::ALL
            .iter()
            .copied()
            .filter(|key| key.category() == self)
            .collect()
    }
}

/// Type shape of a key's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Integer,
    Text,
    Model,
}

impl ValueKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Integer => "integer",
            ValueKind::Text => "text",
            ValueKind::Model => "model id",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two editable layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    App,
    Project,
}

impl Scope {
    pub const ALL: [Scope; 2] = [Scope::App, Scope::Project];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Scope::App => "app",
            Scope::Project => "project",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of an effective value. Exactly one applies per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Project,
    App,
    Default,
}

impl Source {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Source::Project => "project",
            Source::App => "app",
            Source::Default => "default",
        }
    }
}

impl From<Scope> for Source {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::App => Source::App,
            Scope::Project => Source::Project,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown setting key '{raw}'")]
pub struct UnknownKeyError {
    raw: String,
}

impl UnknownKeyError {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for {key}: expected {expected}, got {found}")]
pub struct ValueShapeError {
    key: SettingKey,
    expected: ValueKind,
    found: String,
}

impl ValueShapeError {
    #[must_use]
    pub fn new(key: SettingKey, found: impl Into<String>) -> Self {
        Self {
            key,
            expected: key.kind(),
            found: found.into(),
        }
    }

    #[must_use]
    pub const fn key(&self) -> SettingKey {
        self.key
    }

    #[must_use]
    pub const fn expected(&self) -> ValueKind {
        self.expected
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{key} cannot be stored at {scope} scope")]
pub struct ScopeError {
    pub key: SettingKey,
    pub scope: Scope,
}

impl SettingKey {
    pub const ALL: [SettingKey; 19] = [
        SettingKey::DefaultModel,
        SettingKey::CoderModel,
        SettingKey::TesterModel,
        SettingKey::InitializerModel,
        SettingKey::MaxConcurrency,
        SettingKey::YoloMode,
        SettingKey::AutoResume,
        SettingKey::PauseOnError,
        SettingKey::TestingAgentRatio,
        SettingKey::TestingDirectory,
        SettingKey::Theme,
        SettingKey::DarkMode,
        SettingKey::ShowDebugPanel,
        SettingKey::DebugPanelHeight,
        SettingKey::CelebrateOnComplete,
        SettingKey::KanbanColumns,
        SettingKey::AutoCommit,
        SettingKey::CommitMessagePrefix,
        SettingKey::CreatePullRequests,
    ];

    /// Wire name (camelCase), as stored in settings files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SettingKey::DefaultModel => "defaultModel",
            SettingKey::CoderModel => "coderModel",
            SettingKey::TesterModel => "testerModel",
            SettingKey::InitializerModel => "initializerModel",
            SettingKey::MaxConcurrency => "maxConcurrency",
            SettingKey::YoloMode => "yoloMode",
            SettingKey::AutoResume => "autoResume",
            SettingKey::PauseOnError => "pauseOnError",
            SettingKey::TestingAgentRatio => "testingAgentRatio",
            SettingKey::TestingDirectory => "testingDirectory",
            SettingKey::Theme => "theme",
            SettingKey::DarkMode => "darkMode",
            SettingKey::ShowDebugPanel => "showDebugPanel",
            SettingKey::DebugPanelHeight => "debugPanelHeight",
            SettingKey::CelebrateOnComplete => "celebrateOnComplete",
            SettingKey::KanbanColumns => "kanbanColumns",
            SettingKey::AutoCommit => "autoCommit",
            SettingKey::CommitMessagePrefix => "commitMessagePrefix",
            SettingKey::CreatePullRequests => "createPullRequests",
        }
    }

    #[must_use]
    pub const fn kind(self) -> ValueKind {
        match self {
            SettingKey::DefaultModel
            | SettingKey::CoderModel
            | SettingKey::TesterModel
            | SettingKey::InitializerModel => ValueKind::Model,
            SettingKey::MaxConcurrency
            | SettingKey::TestingAgentRatio
            | SettingKey::DebugPanelHeight
            | SettingKey::KanbanColumns => ValueKind::Integer,
            SettingKey::TestingDirectory | SettingKey::Theme | SettingKey::CommitMessagePrefix => {
                ValueKind::Text
            }
            SettingKey::YoloMode
            | SettingKey::AutoResume
            | SettingKey::PauseOnError
            | SettingKey::DarkMode
            | SettingKey::ShowDebugPanel
            | SettingKey::CelebrateOnComplete
            | SettingKey::AutoCommit
            | SettingKey::CreatePullRequests => ValueKind::Bool,
        }
    }

    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            SettingKey::DefaultModel
            | SettingKey::CoderModel
            | SettingKey::TesterModel
            | SettingKey::InitializerModel => Category::Models,
            SettingKey::MaxConcurrency
            | SettingKey::YoloMode
            | SettingKey::AutoResume
            | SettingKey::PauseOnError
            | SettingKey::TestingAgentRatio
            | SettingKey::TestingDirectory => Category::Agents,
            SettingKey::Theme
            | SettingKey::DarkMode
            | SettingKey::ShowDebugPanel
            | SettingKey::DebugPanelHeight
            | SettingKey::CelebrateOnComplete
            | SettingKey::KanbanColumns => Category::Ui,
            SettingKey::AutoCommit
            | SettingKey::CommitMessagePrefix
            | SettingKey::CreatePullRequests => Category::Git,
        }
    }

    #[must_use]
    pub fn partition(self) -> Partition {
        if UI_ONLY_KEYS.contains(&self) {
            Partition::UiOnly
        } else {
            Partition::Agent
        }
    }

    #[must_use]
    pub fn is_ui_only(self) -> bool {
        matches!(self.partition(), Partition::UiOnly)
    }

    /// Whether a value for this key may be stored in `scope`.
    #[must_use]
    pub fn accepts(self, scope: Scope) -> bool {
        match scope {
            // Project-only keys have no app-level value.
            Scope::App => self != SettingKey::TestingDirectory,
            Scope::Project => PROJECT_KEYS.contains(&self),
        }
    }

    pub fn check_scope(self, scope: Scope) -> Result<(), ScopeError> {
        if self.accepts(scope) {
            Ok(())
        } else {
            Err(ScopeError { key: self, scope })
        }
    }

    /// `max_concurrency` for `maxConcurrency`.
    fn snake_case(self) -> String {
        let mut out = String::with_capacity(self.as_str().len() + 4);
        for c in self.as_str().chars() {
            if c.is_ascii_uppercase() {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        }
        out
    }

    /// Parse a wire name. Accepts the camelCase name or its snake_case form,
    /// ignoring ASCII case.
    pub fn parse(raw: &str) -> Result<Self, UnknownKeyError> {
        let raw = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|key| {
                key.as_str().eq_ignore_ascii_case(raw) || key.snake_case().eq_ignore_ascii_case(raw)
            })
            .ok_or_else(|| UnknownKeyError::new(raw))
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = UnknownKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A model identifier. Non-empty after trimming; membership in any model
/// catalogue is the settings store's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("model id must not be empty")]
pub struct EmptyModelIdError;

impl ModelId {
    pub fn new(raw: impl Into<String>) -> Result<Self, EmptyModelIdError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmptyModelIdError);
        }
        if trimmed.len() == raw.len() {
            Ok(Self(raw))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn default_model() -> Self {
        Self(DEFAULT_MODEL.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ModelId {
    type Error = EmptyModelIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModelId> for String {
    fn from(value: ModelId) -> Self {
        value.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Untyped value as it appears on the wire, before the per-key shape check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl SettingValue {
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "bool",
            SettingValue::Integer(_) => "integer",
            SettingValue::Text(_) => "text",
        }
    }

    fn describe(&self) -> String {
        match self {
            SettingValue::Bool(b) => format!("bool {b}"),
            SettingValue::Integer(i) => format!("integer {i}"),
            SettingValue::Text(s) => format!("text {s:?}"),
        }
    }
}

impl From<SettingValue> for serde_json::Value {
    fn from(value: SettingValue) -> Self {
        match value {
            SettingValue::Bool(b) => serde_json::Value::Bool(b),
            SettingValue::Integer(i) => serde_json::Value::Number(i.into()),
            SettingValue::Text(s) => serde_json::Value::String(s),
        }
    }
}

/// A setting key together with its typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    DefaultModel(ModelId),
    CoderModel(ModelId),
    TesterModel(ModelId),
    InitializerModel(ModelId),
    MaxConcurrency(u8),
    YoloMode(bool),
    AutoResume(bool),
    PauseOnError(bool),
    TestingAgentRatio(u8),
    /// Relative to the project root; empty means the root itself.
    TestingDirectory(String),
    Theme(String),
    DarkMode(bool),
    ShowDebugPanel(bool),
    DebugPanelHeight(u16),
    CelebrateOnComplete(bool),
    KanbanColumns(u8),
    AutoCommit(bool),
    CommitMessagePrefix(String),
    CreatePullRequests(bool),
}

fn expect_bool(key: SettingKey, value: SettingValue) -> Result<bool, ValueShapeError> {
    match value {
        SettingValue::Bool(b) => Ok(b),
        other => Err(ValueShapeError::new(key, other.describe())),
    }
}

fn expect_int<T: TryFrom<i64>>(key: SettingKey, value: SettingValue) -> Result<T, ValueShapeError> {
    match value {
        SettingValue::Integer(i) => {
            T::try_from(i).map_err(|_| ValueShapeError::new(key, format!("out-of-range integer {i}")))
        }
        other => Err(ValueShapeError::new(key, other.describe())),
    }
}

fn expect_text(key: SettingKey, value: SettingValue) -> Result<String, ValueShapeError> {
    match value {
        SettingValue::Text(s) => Ok(s),
        other => Err(ValueShapeError::new(key, other.describe())),
    }
}

fn expect_model(key: SettingKey, value: SettingValue) -> Result<ModelId, ValueShapeError> {
    let text = expect_text(key, value)?;
    ModelId::new(text).map_err(|_| ValueShapeError::new(key, "empty text"))
}

impl Setting {
    /// Build a typed setting from an untyped value, checking only type shape.
    pub fn new(key: SettingKey, value: SettingValue) -> Result<Self, ValueShapeError> {
        Ok(match key {
            SettingKey::DefaultModel => Setting::DefaultModel(expect_model(key, value)?),
            SettingKey::CoderModel => Setting::CoderModel(expect_model(key, value)?),
            SettingKey::TesterModel => Setting::TesterModel(expect_model(key, value)?),
            SettingKey::InitializerModel => Setting::InitializerModel(expect_model(key, value)?),
            SettingKey::MaxConcurrency => Setting::MaxConcurrency(expect_int(key, value)?),
            SettingKey::YoloMode => Setting::YoloMode(expect_bool(key, value)?),
            SettingKey::AutoResume => Setting::AutoResume(expect_bool(key, value)?),
            SettingKey::PauseOnError => Setting::PauseOnError(expect_bool(key, value)?),
            SettingKey::TestingAgentRatio => Setting::TestingAgentRatio(expect_int(key, value)?),
            SettingKey::TestingDirectory => Setting::TestingDirectory(expect_text(key, value)?),
            SettingKey::Theme => Setting::Theme(expect_text(key, value)?),
            SettingKey::DarkMode => Setting::DarkMode(expect_bool(key, value)?),
            SettingKey::ShowDebugPanel => Setting::ShowDebugPanel(expect_bool(key, value)?),
            SettingKey::DebugPanelHeight => Setting::DebugPanelHeight(expect_int(key, value)?),
            SettingKey::CelebrateOnComplete => {
                Setting::CelebrateOnComplete(expect_bool(key, value)?)
            }
            SettingKey::KanbanColumns => Setting::KanbanColumns(expect_int(key, value)?),
            SettingKey::AutoCommit => Setting::AutoCommit(expect_bool(key, value)?),
            SettingKey::CommitMessagePrefix => {
                Setting::CommitMessagePrefix(expect_text(key, value)?)
            }
            SettingKey::CreatePullRequests => Setting::CreatePullRequests(expect_bool(key, value)?),
        })
    }

    /// Parse operator-entered text for `key`.
    ///
    /// Booleans accept `true/false`, `on/off`, `yes/no` and `1/0`.
    pub fn parse(key: SettingKey, raw: &str) -> Result<Self, ValueShapeError> {
        let trimmed = raw.trim();
        let value = match key.kind() {
            ValueKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => SettingValue::Bool(true),
                "false" | "off" | "no" | "0" => SettingValue::Bool(false),
                _ => return Err(ValueShapeError::new(key, format!("text {trimmed:?}"))),
            },
            ValueKind::Integer => trimmed
                .parse::<i64>()
                .map(SettingValue::Integer)
                .map_err(|_| ValueShapeError::new(key, format!("text {trimmed:?}")))?,
            ValueKind::Model => SettingValue::Text(trimmed.to_string()),
            // Free text keeps inner whitespace as entered.
            ValueKind::Text => SettingValue::Text(raw.to_string()),
        };
        Self::new(key, value)
    }

    /// Built-in default for `key`.
    #[must_use]
    pub fn default_for(key: SettingKey) -> Self {
        match key {
            SettingKey::DefaultModel => Setting::DefaultModel(ModelId::default_model()),
            SettingKey::CoderModel => Setting::CoderModel(ModelId::default_model()),
            SettingKey::TesterModel => Setting::TesterModel(ModelId::default_model()),
            SettingKey::InitializerModel => Setting::InitializerModel(ModelId::default_model()),
            SettingKey::MaxConcurrency => Setting::MaxConcurrency(3),
            SettingKey::YoloMode => Setting::YoloMode(false),
            SettingKey::AutoResume => Setting::AutoResume(true),
            SettingKey::PauseOnError => Setting::PauseOnError(true),
            SettingKey::TestingAgentRatio => Setting::TestingAgentRatio(1),
            SettingKey::TestingDirectory => Setting::TestingDirectory(String::new()),
            SettingKey::Theme => Setting::Theme("twitter".to_string()),
            SettingKey::DarkMode => Setting::DarkMode(false),
            SettingKey::ShowDebugPanel => Setting::ShowDebugPanel(false),
            SettingKey::DebugPanelHeight => Setting::DebugPanelHeight(288),
            SettingKey::CelebrateOnComplete => Setting::CelebrateOnComplete(true),
            SettingKey::KanbanColumns => Setting::KanbanColumns(3),
            SettingKey::AutoCommit => Setting::AutoCommit(false),
            SettingKey::CommitMessagePrefix => Setting::CommitMessagePrefix("[autocoder]".to_string()),
            SettingKey::CreatePullRequests => Setting::CreatePullRequests(false),
        }
    }

    #[must_use]
    pub const fn key(&self) -> SettingKey {
        match self {
            Setting::DefaultModel(_) => SettingKey::DefaultModel,
            Setting::CoderModel(_) => SettingKey::CoderModel,
            Setting::TesterModel(_) => SettingKey::TesterModel,
            Setting::InitializerModel(_) => SettingKey::InitializerModel,
            Setting::MaxConcurrency(_) => SettingKey::MaxConcurrency,
            Setting::YoloMode(_) => SettingKey::YoloMode,
            Setting::AutoResume(_) => SettingKey::AutoResume,
            Setting::PauseOnError(_) => SettingKey::PauseOnError,
            Setting::TestingAgentRatio(_) => SettingKey::TestingAgentRatio,
            Setting::TestingDirectory(_) => SettingKey::TestingDirectory,
            Setting::Theme(_) => SettingKey::Theme,
            Setting::DarkMode(_) => SettingKey::DarkMode,
            Setting::ShowDebugPanel(_) => SettingKey::ShowDebugPanel,
            Setting::DebugPanelHeight(_) => SettingKey::DebugPanelHeight,
            Setting::CelebrateOnComplete(_) => SettingKey::CelebrateOnComplete,
            Setting::KanbanColumns(_) => SettingKey::KanbanColumns,
            Setting::AutoCommit(_) => SettingKey::AutoCommit,
            Setting::CommitMessagePrefix(_) => SettingKey::CommitMessagePrefix,
            Setting::CreatePullRequests(_) => SettingKey::CreatePullRequests,
        }
    }

    /// The untyped wire value.
    #[must_use]
    pub fn value(&self) -> SettingValue {
        match self {
            Setting::DefaultModel(m)
            | Setting::CoderModel(m)
            | Setting::TesterModel(m)
            | Setting::InitializerModel(m) => SettingValue::Text(m.as_str().to_string()),
            Setting::MaxConcurrency(n)
            | Setting::TestingAgentRatio(n)
            | Setting::KanbanColumns(n) => SettingValue::Integer(i64::from(*n)),
            Setting::DebugPanelHeight(n) => SettingValue::Integer(i64::from(*n)),
            Setting::TestingDirectory(s) | Setting::Theme(s) | Setting::CommitMessagePrefix(s) => {
                SettingValue::Text(s.clone())
            }
            Setting::YoloMode(b)
            | Setting::AutoResume(b)
            | Setting::PauseOnError(b)
            | Setting::DarkMode(b)
            | Setting::ShowDebugPanel(b)
            | Setting::CelebrateOnComplete(b)
            | Setting::AutoCommit(b)
            | Setting::CreatePullRequests(b) => SettingValue::Bool(*b),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        self.value().into()
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            SettingValue::Bool(b) => write!(f, "{b}"),
            SettingValue::Integer(i) => write!(f, "{i}"),
            SettingValue::Text(s) if s.is_empty() => f.write_str("\"\""),
            SettingValue::Text(s) => f.write_str(&s),
        }
    }
}
