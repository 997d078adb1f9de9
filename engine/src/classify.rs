use autocoder_types::{Partition, SettingKey};

/// How an edit to a key is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Written to the store as soon as it is made.
    Immediate,
    /// Held in a pending buffer until save or cancel.
    Buffered,
}

#[must_use]
pub fn classify(key: SettingKey) -> ChangeKind {
    match key.partition() {
        Partition::UiOnly => ChangeKind::Immediate,
        Partition::Agent => ChangeKind::Buffered,
    }
}
