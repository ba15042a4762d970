//! Change subscriptions

use std::sync::Arc;

use crate::domain::{SettingKey, SettingValue};

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Passed to observers after a setting was written.
///
/// Observers run outside the store lock, so concurrent writers may deliver
/// their changes out of order. `revision` follows write order: an observer
/// that mirrors values keeps the change with the highest revision, or reads
/// the current value back through the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingChange {
    pub key: SettingKey,
    pub old: SettingValue,
    pub new: SettingValue,
    /// False when the value only reached memory
    pub persisted: bool,
    /// Store-wide write counter, increasing with every set
    pub revision: u64,
}

impl SettingChange {
    pub fn changed(&self) -> bool {
        self.old != self.new
    }
}

pub(crate) type Callback = Arc<dyn Fn(&SettingChange) + Send + Sync>;

struct Entry {
    id: SubscriptionId,
    /// None observes every key
    key: Option<SettingKey>,
    callback: Callback,
}

#[derive(Default)]
pub(crate) struct Observers {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Observers {
    pub(crate) fn add(&mut self, key: Option<SettingKey>, callback: Callback) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push(Entry { id, key, callback });
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Callbacks interested in `key`, in subscription order
    pub(crate) fn matching(&self, key: SettingKey) -> Vec<Callback> {
        self.entries
            .iter()
            .filter(|e| e.key.is_none_or(|k| k == key))
            .map(|e| Arc::clone(&e.callback))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
