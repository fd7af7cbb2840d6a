//! Merge policies for channel values.

use serde_json::Value;

use crate::message::{add_messages, Message, MessageUpdate};

/// Merge function of a channel: `(current, update) -> new current`.
///
/// Implementations must be deterministic. `is_additive` tells the store whether
/// several writers in one step are allowed (their updates are then applied in node
/// registration order).
pub trait Reducer: Send + Sync {
    /// Short name for logs and debug output.
    fn name(&self) -> &'static str;

    /// Whether several updates in the same step can be folded in sequence.
    fn is_additive(&self) -> bool;

    /// Merges one update into the current value. `Err` carries a human-readable reason.
    fn reduce(&self, current: Value, update: Value) -> Result<Value, String>;
}

/// Overwrite: the update becomes the new value.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastValue;

impl Reducer for LastValue {
    fn name(&self) -> &'static str {
        "last_value"
    }

    fn is_additive(&self) -> bool {
        false
    }

    fn reduce(&self, _current: Value, update: Value) -> Result<Value, String> {
        Ok(update)
    }
}

/// Append: arrays are spliced onto the current list, any other value is pushed.
///
/// `null` reads as an empty list on either side; a non-array current value becomes
/// the first element.
#[derive(Debug, Clone, Copy, Default)]
pub struct Append;

fn into_sequence(value: Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    }
}

impl Reducer for Append {
    fn name(&self) -> &'static str {
        "append"
    }

    fn is_additive(&self) -> bool {
        true
    }

    fn reduce(&self, current: Value, update: Value) -> Result<Value, String> {
        let mut items = into_sequence(current);
        items.extend(into_sequence(update));
        Ok(Value::Array(items))
    }
}

/// Message-list merge (see [`add_messages`]).
///
/// The update is a single message / tombstone object or an array of them.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddMessages;

impl Reducer for AddMessages {
    fn name(&self) -> &'static str {
        "add_messages"
    }

    fn is_additive(&self) -> bool {
        true
    }

    fn reduce(&self, current: Value, update: Value) -> Result<Value, String> {
        let current: Vec<Message> = match current {
            Value::Null => Vec::new(),
            v => serde_json::from_value(v).map_err(|e| format!("current messages: {}", e))?,
        };
        let updates: Vec<MessageUpdate> = match update {
            Value::Null => Vec::new(),
            Value::Array(items) => items
                .into_iter()
                .map(serde_json::from_value::<MessageUpdate>)
                .collect::<Result<_, _>>()
                .map_err(|e| format!("message update: {}", e))?,
            single => vec![serde_json::from_value(single).map_err(|e| format!("message update: {}", e))?],
        };
        serde_json::to_value(add_messages(current, updates)).map_err(|e| e.to_string())
    }
}

/// Caller-supplied binary operator, e.g. a running sum. Treated as additive.
pub struct FnReducer<F> {
    f: F,
}

/// Wraps a closure `(current, update) -> new` as a [`Reducer`].
pub fn reducer_fn<F>(f: F) -> FnReducer<F>
where
    F: Fn(Value, Value) -> Value + Send + Sync,
{
    FnReducer { f }
}

impl<F> Reducer for FnReducer<F>
where
    F: Fn(Value, Value) -> Value + Send + Sync,
{
    fn name(&self) -> &'static str {
        "custom"
    }

    fn is_additive(&self) -> bool {
        true
    }

    fn reduce(&self, current: Value, update: Value) -> Result<Value, String> {
        Ok((self.f)(current, update))
    }
}
