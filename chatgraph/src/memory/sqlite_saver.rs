//! SQLite-backed checkpointer (SqliteSaver). Persistent across process restarts.
//!
//! One row per checkpoint; channel values stored as a JSON blob.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use crate::memory::checkpoint::{
    Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource,
};
use crate::memory::checkpointer::{require_thread_id, CheckpointError, Checkpointer};
use crate::memory::config::RunnableConfig;
use crate::memory::serializer::{JsonSerializer, Serializer};
use crate::memory::thread_lock::{ThreadLease, ThreadLocks};
use crate::state::Snapshot;

fn storage(e: impl std::fmt::Display) -> CheckpointError {
    CheckpointError::Storage(e.to_string())
}

/// Raw row as read from the `checkpoints` table.
struct CheckpointRow {
    checkpoint_id: String,
    ts: String,
    step: i64,
    source: String,
    state: Option<Vec<u8>>,
}

impl CheckpointRow {
    fn metadata(&self) -> Result<CheckpointMetadata, CheckpointError> {
        let source = self
            .source
            .parse::<CheckpointSource>()
            .map_err(CheckpointError::Serialization)?;
        Ok(CheckpointMetadata {
            source,
            step: u64::try_from(self.step).map_err(storage)?,
            created_at: Checkpoint::created_at_from_ts(&self.ts),
        })
    }
}

/// SQLite-backed checkpointer. Key: (thread_id, checkpoint_id).
///
/// Persistent; for single-node and dev. Uses spawn_blocking for async.
///
/// **Interaction**: Used as `Arc<dyn Checkpointer>` when the graph is compiled with a checkpointer.
pub struct SqliteSaver {
    db_path: PathBuf,
    locks: ThreadLocks,
}

impl SqliteSaver {
    /// Opens (or creates) the database and ensures the table exists.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS checkpoints (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                thread_id TEXT NOT NULL,
                checkpoint_id TEXT NOT NULL,
                ts TEXT NOT NULL,
                step INTEGER NOT NULL,
                source TEXT NOT NULL,
                state BLOB NOT NULL,
                UNIQUE (thread_id, checkpoint_id)
            );
            CREATE INDEX IF NOT EXISTS checkpoints_thread ON checkpoints (thread_id, seq);
            "#,
        )
        .map_err(storage)?;
        Ok(Self {
            db_path,
            locks: ThreadLocks::new(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl Checkpointer for SqliteSaver {
    async fn save(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint,
    ) -> Result<String, CheckpointError> {
        let thread_id = require_thread_id(config)?.to_string();
        let state = JsonSerializer.serialize(&checkpoint.channel_values)?;
        let checkpoint_id = checkpoint.id.clone();
        let ts = checkpoint.ts.clone();
        let step = i64::try_from(checkpoint.metadata.step).map_err(storage)?;
        let source = checkpoint.metadata.source.as_str();
        let db_path = self.db_path.clone();

        let id = checkpoint_id.clone();
        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            conn.execute(
                "INSERT INTO checkpoints (thread_id, checkpoint_id, ts, step, source, state) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![thread_id, id, ts, step, source, state],
            )
            .map_err(storage)?;
            Ok::<(), CheckpointError>(())
        })
        .await
        .map_err(storage)??;

        Ok(checkpoint_id)
    }

    async fn load(&self, config: &RunnableConfig) -> Result<Option<Checkpoint>, CheckpointError> {
        let thread_id = require_thread_id(config)?.to_string();
        let wanted = config.checkpoint_id.clone();
        let db_path = self.db_path.clone();

        let lookup = wanted.clone();
        let row = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            let map_row = |r: &rusqlite::Row<'_>| -> rusqlite::Result<CheckpointRow> {
                Ok(CheckpointRow {
                    checkpoint_id: r.get(0)?,
                    ts: r.get(1)?,
                    step: r.get(2)?,
                    source: r.get(3)?,
                    state: Some(r.get(4)?),
                })
            };
            let row = match lookup {
                Some(id) => conn
                    .query_row(
                        "SELECT checkpoint_id, ts, step, source, state FROM checkpoints \
                         WHERE thread_id = ?1 AND checkpoint_id = ?2",
                        params![thread_id, id],
                        map_row,
                    )
                    .optional(),
                None => conn
                    .query_row(
                        "SELECT checkpoint_id, ts, step, source, state FROM checkpoints \
                         WHERE thread_id = ?1 ORDER BY seq DESC LIMIT 1",
                        params![thread_id],
                        map_row,
                    )
                    .optional(),
            }
            .map_err(storage)?;
            Ok::<Option<CheckpointRow>, CheckpointError>(row)
        })
        .await
        .map_err(storage)??;

        let row = match (row, wanted) {
            (Some(row), _) => row,
            (None, Some(id)) => return Err(CheckpointError::NotFound(id)),
            (None, None) => return Ok(None),
        };
        let metadata = row.metadata()?;
        let state = row.state.unwrap_or_default();
        let channel_values: Snapshot = JsonSerializer.deserialize(&state)?;
        Ok(Some(Checkpoint {
            id: row.checkpoint_id,
            ts: row.ts,
            channel_values,
            metadata,
        }))
    }

    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let thread_id = require_thread_id(config)?.to_string();
        let limit = limit
            .map(|n| i64::try_from(n).unwrap_or(i64::MAX))
            .unwrap_or(-1);
        let db_path = self.db_path.clone();

        let rows = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            let mut stmt = conn
                .prepare(
                    "SELECT checkpoint_id, ts, step, source FROM checkpoints \
                     WHERE thread_id = ?1 ORDER BY seq DESC LIMIT ?2",
                )
                .map_err(storage)?;
            let rows = stmt
                .query_map(params![thread_id, limit], |r| {
                    Ok(CheckpointRow {
                        checkpoint_id: r.get(0)?,
                        ts: r.get(1)?,
                        step: r.get(2)?,
                        source: r.get(3)?,
                        state: None,
                    })
                })
                .map_err(storage)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(storage)?;
            Ok::<Vec<CheckpointRow>, CheckpointError>(rows)
        })
        .await
        .map_err(storage)??;

        rows.into_iter()
            .map(|row| {
                Ok(CheckpointListItem {
                    metadata: row.metadata()?,
                    checkpoint_id: row.checkpoint_id,
                })
            })
            .collect()
    }

    async fn clear(&self, thread_id: &str) -> Result<(), CheckpointError> {
        let thread_id = thread_id.to_string();
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            conn.execute(
                "DELETE FROM checkpoints WHERE thread_id = ?1",
                params![thread_id],
            )
            .map_err(storage)?;
            Ok::<(), CheckpointError>(())
        })
        .await
        .map_err(storage)?
    }

    fn lease(&self, thread_id: &str) -> Result<ThreadLease, CheckpointError> {
        self.locks.try_acquire(thread_id)
    }
}
