//! Channel definition: key, default factory, reducer.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::reducer::{AddMessages, Append, LastValue, Reducer};

/// Factory for a channel's initial value.
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Declaration of one state channel.
///
/// Passed to [`StateGraph::new`](crate::graph::StateGraph::new); the store calls
/// `default` once per run to seed the channel and routes every update through `reducer`.
#[derive(Clone)]
pub struct Channel {
    key: String,
    default: DefaultFn,
    reducer: Arc<dyn Reducer>,
}

impl Channel {
    /// Channel with an explicit default factory and reducer.
    pub fn new<F, R>(key: impl Into<String>, default: F, reducer: R) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
        R: Reducer + 'static,
    {
        Self {
            key: key.into(),
            default: Arc::new(default),
            reducer: Arc::new(reducer),
        }
    }

    /// Overwrite channel seeded with `default`.
    pub fn last_value(key: impl Into<String>, default: impl Into<Value>) -> Self {
        let default = default.into();
        Self::new(key, move || default.clone(), LastValue)
    }

    /// Append channel seeded with an empty list.
    pub fn append(key: impl Into<String>) -> Self {
        Self::new(key, || Value::Array(Vec::new()), Append)
    }

    /// Message-list channel seeded with an empty list.
    pub fn messages(key: impl Into<String>) -> Self {
        Self::new(key, || Value::Array(Vec::new()), AddMessages)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn reducer(&self) -> &Arc<dyn Reducer> {
        &self.reducer
    }

    pub fn default_value(&self) -> Value {
        (self.default)()
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("key", &self.key)
            .field("reducer", &self.reducer.name())
            .finish()
    }
}
