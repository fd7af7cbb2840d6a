//! Channel store: the mutable state of one run.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::state::{Snapshot, Update};

use super::channel::Channel;
use super::channel_error::ChannelError;
use super::reducer::Reducer;

#[derive(Clone)]
struct Slot {
    value: Value,
    reducer: Arc<dyn Reducer>,
}

/// Current value and reducer of every declared channel.
///
/// Created per run by [`ChannelStore::initialize`]; values only change through
/// reducers ([`apply_update`](Self::apply_update), [`apply_step`](Self::apply_step))
/// or by restoring a checkpoint. Every mutating operation is all-or-nothing.
#[derive(Clone)]
pub struct ChannelStore {
    slots: BTreeMap<String, Slot>,
}

impl ChannelStore {
    /// Seeds each channel with its default value.
    pub fn initialize(channels: &[Channel]) -> Self {
        let slots = channels
            .iter()
            .map(|c| {
                (
                    c.key().to_string(),
                    Slot {
                        value: c.default_value(),
                        reducer: Arc::clone(c.reducer()),
                    },
                )
            })
            .collect();
        Self { slots }
    }

    pub fn get(&self, key: &str) -> Result<&Value, ChannelError> {
        self.slots
            .get(key)
            .map(|s| &s.value)
            .ok_or_else(|| ChannelError::UnknownChannel(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Merges a single update (e.g. the caller's initial state).
    pub fn apply_update(&mut self, update: &Update) -> Result<(), ChannelError> {
        self.merge(std::iter::once(("", update)))
    }

    /// Merges the updates of one step, given in node registration order as `(node, update)`.
    ///
    /// Fails with `ConcurrentWriteConflict` when two nodes wrote the same non-additive
    /// channel; in that case neither value is applied.
    pub fn apply_step(&mut self, writes: &[(String, Update)]) -> Result<(), ChannelError> {
        let mut writers: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for (node, update) in writes {
            for key in update.keys() {
                writers.entry(key).or_default().push(node.clone());
            }
        }
        for (key, nodes) in writers {
            let slot = self
                .slots
                .get(key)
                .ok_or_else(|| ChannelError::UnknownChannel(key.to_string()))?;
            if nodes.len() > 1 && !slot.reducer.is_additive() {
                return Err(ChannelError::ConcurrentWriteConflict {
                    channel: key.to_string(),
                    nodes,
                });
            }
        }
        self.merge(writes.iter().map(|(node, update)| (node.as_str(), update)))
    }

    /// Folds updates in order into staged values, then commits them together.
    fn merge<'a, I>(&mut self, writes: I) -> Result<(), ChannelError>
    where
        I: IntoIterator<Item = (&'a str, &'a Update)>,
    {
        let mut staged: BTreeMap<&str, Value> = BTreeMap::new();
        for (_node, update) in writes {
            for (key, value) in update.iter() {
                let slot = self
                    .slots
                    .get(key)
                    .ok_or_else(|| ChannelError::UnknownChannel(key.to_string()))?;
                let current = staged.remove(key).unwrap_or_else(|| slot.value.clone());
                let merged = slot.reducer.reduce(current, value.clone()).map_err(|reason| {
                    ChannelError::InvalidUpdate {
                        channel: key.to_string(),
                        reason,
                    }
                })?;
                staged.insert(key, merged);
            }
        }
        for (key, value) in staged {
            if let Some(slot) = self.slots.get_mut(key) {
                slot.value = value;
            }
        }
        Ok(())
    }

    /// Installs values from a checkpoint verbatim. Channels missing from the snapshot keep
    /// their current value; keys that were never declared are rejected.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), ChannelError> {
        if let Some(unknown) = snapshot.keys().find(|k| !self.slots.contains_key(*k)) {
            return Err(ChannelError::UnknownChannel(unknown.to_string()));
        }
        for (key, value) in snapshot.iter() {
            if let Some(slot) = self.slots.get_mut(key) {
                slot.value = value.clone();
            }
        }
        Ok(())
    }

    /// Copy of all current values.
    pub fn snapshot(&self) -> Snapshot {
        self.slots
            .iter()
            .map(|(k, s)| (k.clone(), s.value.clone()))
            .collect()
    }
}
