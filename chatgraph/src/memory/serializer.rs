//! Serializer for checkpoint state (state <-> bytes).
//!
//! Aligns with LangGraph SerializerProtocol. Used by persistent Checkpointer
//! implementations.

use crate::memory::checkpointer::CheckpointError;

/// Serializes and deserializes state for checkpoint storage.
///
/// Used by persistent Checkpointer implementations (e.g. SqliteSaver). MemorySaver
/// stores checkpoints in memory and does not use a Serializer.
pub trait Serializer<S>: Send + Sync {
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError>;
    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError>;
}

/// JSON-based serializer. Requires S: Serialize + serde::de::DeserializeOwned.
pub struct JsonSerializer;

impl<S> Serializer<S> for JsonSerializer
where
    S: serde::Serialize + serde::de::DeserializeOwned,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError> {
        serde_json::to_vec(state).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError> {
        serde_json::from_slice(bytes).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::state::Snapshot;

    /// **Scenario**: A snapshot with messages survives serialize then deserialize.
    #[test]
    fn json_serializer_snapshot_roundtrip() {
        let snapshot: Snapshot = [
            ("counter".to_string(), serde_json::json!(2)),
            (
                "messages".to_string(),
                serde_json::to_value(vec![Message::human("hi").with_id("m1")]).unwrap(),
            ),
        ]
        .into_iter()
        .collect();
        let bytes = JsonSerializer.serialize(&snapshot).unwrap();
        let restored: Snapshot = JsonSerializer.deserialize(&bytes).unwrap();
        assert_eq!(snapshot, restored);
    }

    /// **Scenario**: Invalid JSON on deserialize returns CheckpointError::Serialization.
    #[test]
    fn json_serializer_invalid_json_deserialize_returns_checkpoint_error() {
        let result: Result<Snapshot, _> = JsonSerializer.deserialize(b"{ not valid json ]");
        match result {
            Err(CheckpointError::Serialization(s)) => assert!(!s.is_empty()),
            other => panic!("expected Serialization variant: {:?}", other),
        }
    }
}
