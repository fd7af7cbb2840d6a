//! Run state as nodes see it ([`Snapshot`]) and as they change it ([`Update`]).
//!
//! Both are keyed by channel name and hold `serde_json::Value`s so any serializable
//! type can live in a channel. Typed access goes through [`Snapshot::get_as`] and
//! [`Snapshot::messages`].

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AgentError;
use crate::message::{Message, MessageUpdate};

/// Conventional key of the conversation channel.
pub const MESSAGES_KEY: &str = "messages";

/// Read-only copy of every channel value at one point of a run.
///
/// Produced by the channel store after each step; passed to nodes and routers,
/// persisted by checkpointers and returned to the caller at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    values: BTreeMap<String, Value>,
}

impl Snapshot {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Deserializes one channel into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, AgentError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| AgentError::MissingChannel(key.to_string()))?;
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Messages of the [`MESSAGES_KEY`] channel; `null` reads as an empty list.
    pub fn messages(&self) -> Result<Vec<Message>, AgentError> {
        self.messages_in(MESSAGES_KEY)
    }

    /// Messages of an arbitrary message-list channel.
    pub fn messages_in(&self, key: &str) -> Result<Vec<Message>, AgentError> {
        match self.values.get(key) {
            None => Err(AgentError::MissingChannel(key.to_string())),
            Some(Value::Null) => Ok(Vec::new()),
            Some(v) => Ok(serde_json::from_value(v.clone())?),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Partial update returned by a node: proposed values for a subset of channels.
///
/// Each value is handed to its channel's reducer; channels not present are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Update {
    writes: BTreeMap<String, Value>,
}

impl Update {
    /// Creates an empty update (a node that changes nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a write for `key` (builder style).
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.writes.insert(key.into(), value.into());
    }

    /// Adds a write of messages and/or tombstones for a message-list channel.
    pub fn with_messages<I, M>(self, key: impl Into<String>, messages: I) -> Result<Self, AgentError>
    where
        I: IntoIterator<Item = M>,
        M: Into<MessageUpdate>,
    {
        let entries: Vec<MessageUpdate> = messages.into_iter().map(Into::into).collect();
        let value = serde_json::to_value(entries)?;
        Ok(self.set(key, value))
    }

    /// Update that writes `messages` to the [`MESSAGES_KEY`] channel.
    pub fn messages<I, M>(messages: I) -> Result<Self, AgentError>
    where
        I: IntoIterator<Item = M>,
        M: Into<MessageUpdate>,
    {
        Self::new().with_messages(MESSAGES_KEY, messages)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.writes.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.writes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.writes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

impl FromIterator<(String, Value)> for Update {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            writes: iter.into_iter().collect(),
        }
    }
}

impl From<Snapshot> for Update {
    /// Turns every value of a snapshot into a write, e.g. to seed a fresh run.
    fn from(snapshot: Snapshot) -> Self {
        Self {
            writes: snapshot.values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// **Scenario**: get_as reads a typed value; a missing key is MissingChannel.
    #[test]
    fn snapshot_get_as_typed_and_missing() {
        let s: Snapshot = [("counter".to_string(), json!(3))].into_iter().collect();
        let n: i64 = s.get_as("counter").unwrap();
        assert_eq!(n, 3);
        match s.get_as::<i64>("flag") {
            Err(AgentError::MissingChannel(k)) => assert_eq!(k, "flag"),
            other => panic!("expected MissingChannel, got {:?}", other),
        }
    }

    /// **Scenario**: messages() treats null as empty and parses tagged messages.
    #[test]
    fn snapshot_messages_null_and_values() {
        let s: Snapshot = [(MESSAGES_KEY.to_string(), Value::Null)].into_iter().collect();
        assert!(s.messages().unwrap().is_empty());

        let s: Snapshot = [(
            MESSAGES_KEY.to_string(),
            json!([{ "role": "human", "content": "hi" }]),
        )]
        .into_iter()
        .collect();
        assert_eq!(s.messages().unwrap(), vec![Message::human("hi")]);
    }

    /// **Scenario**: Update::messages writes a JSON array under the messages key.
    #[test]
    fn update_messages_builder() {
        let u = Update::messages([Message::human("hi")]).unwrap().set("counter", 1);
        assert_eq!(u.len(), 2);
        assert_eq!(u.get(MESSAGES_KEY).unwrap()[0]["role"], "human");
        assert_eq!(u.get("counter"), Some(&json!(1)));
    }
}
