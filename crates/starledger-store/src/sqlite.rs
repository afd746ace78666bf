//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use starledger_core::{Block, BlockHash, Clock, SystemClock};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InsertResult, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
    }
}

const SELECT_BLOCK: &str = "SELECT height, previous_hash, timestamp, payload, hash FROM blocks";

// Helper to convert a row to Block
fn row_to_block(row: &rusqlite::Row<'_>) -> rusqlite::Result<Block> {
    let height: i64 = row.get("height")?;
    let previous_hash: Vec<u8> = row.get("previous_hash")?;
    let timestamp: i64 = row.get("timestamp")?;
    let payload: Vec<u8> = row.get("payload")?;
    let hash: Vec<u8> = row.get("hash")?;

    let height = u64::try_from(height)
        .map_err(|_| rusqlite::Error::InvalidColumnType(0, "height".into(), Type::Integer))?;
    let previous_hash = BlockHash::try_from(previous_hash.as_slice())
        .map_err(|_| rusqlite::Error::InvalidColumnType(1, "previous_hash".into(), Type::Blob))?;
    let hash = BlockHash::try_from(hash.as_slice())
        .map_err(|_| rusqlite::Error::InvalidColumnType(4, "hash".into(), Type::Blob))?;

    Ok(Block::from_parts(height, previous_hash, timestamp, payload, hash))
}

fn height_param(height: u64) -> Result<i64> {
    i64::try_from(height).map_err(|_| StoreError::InvalidData(format!("height {height} exceeds i64")))
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_block(&self, block: &Block) -> Result<InsertResult> {
        let block = block.clone();

        self.with_conn(move |conn| {
            let height = height_param(block.height())?;

            let existing = conn
                .query_row(
                    &format!("{SELECT_BLOCK} WHERE height = ?1"),
                    params![height],
                    row_to_block,
                )
                .optional()?;

            if let Some(existing) = existing {
                if existing == block {
                    return Ok(InsertResult::AlreadyExists);
                }
                return Ok(InsertResult::Conflict {
                    existing: *existing.hash(),
                });
            }

            conn.execute(
                "INSERT INTO blocks (height, previous_hash, timestamp, payload, hash, stored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    height,
                    block.previous_hash().as_bytes().as_slice(),
                    block.timestamp(),
                    block.payload_bytes().as_ref(),
                    block.hash().as_bytes().as_slice(),
                    SystemClock.now(),
                ],
            )?;

            debug!(height = block.height(), hash = %block.hash(), "block persisted");
            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn get_block(&self, height: u64) -> Result<Option<Block>> {
        self.with_conn(move |conn| {
            let height = height_param(height)?;
            conn.query_row(
                &format!("{SELECT_BLOCK} WHERE height = ?1"),
                params![height],
                row_to_block,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn get_block_by_hash(&self, hash: &BlockHash) -> Result<Option<Block>> {
        let hash = *hash;
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("{SELECT_BLOCK} WHERE hash = ?1 ORDER BY height LIMIT 1"),
                params![hash.as_bytes().as_slice()],
                row_to_block,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn load_chain(&self) -> Result<Vec<Block>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_BLOCK} ORDER BY height"))?;
            let blocks = stmt
                .query_map([], row_to_block)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(blocks)
        })
        .await
    }

    async fn block_count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM blocks", [], |row| row.get(0))?;
            u64::try_from(count).map_err(|_| StoreError::InvalidData(format!("negative count {count}")))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_of(len: u64) -> Vec<Block> {
        let mut blocks = vec![Block::genesis(1_000).unwrap()];
        for height in 1..len {
            let prev = *blocks[height as usize - 1].hash();
            blocks.push(Block::seal(
                format!("payload {height}").into_bytes(),
                height,
                prev,
                1_000 + height as i64,
            ));
        }
        blocks
    }

    #[tokio::test]
    async fn test_sqlite_store_basic() {
        let store = SqliteStore::open_memory().unwrap();
        let genesis = Block::genesis(1_000).unwrap();

        let result = store.insert_block(&genesis).await.unwrap();
        assert_eq!(result, InsertResult::Inserted);

        let retrieved = store.get_block(0).await.unwrap().unwrap();
        assert_eq!(retrieved, genesis);
        assert!(retrieved.validate());
    }

    #[tokio::test]
    async fn test_sqlite_store_idempotent_and_conflict() {
        let store = SqliteStore::open_memory().unwrap();
        let genesis = Block::genesis(1_000).unwrap();
        let other = Block::genesis(2_000).unwrap();

        assert_eq!(store.insert_block(&genesis).await.unwrap(), InsertResult::Inserted);
        assert_eq!(store.insert_block(&genesis).await.unwrap(), InsertResult::AlreadyExists);
        assert_eq!(
            store.insert_block(&other).await.unwrap(),
            InsertResult::Conflict {
                existing: *genesis.hash()
            }
        );
    }

    #[tokio::test]
    async fn test_sqlite_load_chain() {
        let store = SqliteStore::open_memory().unwrap();
        let chain = chain_of(5);
        for block in chain.iter().rev() {
            store.insert_block(block).await.unwrap();
        }

        assert_eq!(store.block_count().await.unwrap(), 5);
        assert_eq!(store.load_chain().await.unwrap(), chain);
    }

    #[tokio::test]
    async fn test_sqlite_get_block_by_hash_uses_index() {
        let store = SqliteStore::open_memory().unwrap();
        let chain = chain_of(4);
        for block in &chain {
            store.insert_block(block).await.unwrap();
        }

        assert_eq!(store.get_block_by_hash(chain[2].hash()).await.unwrap(), Some(chain[2].clone()));
        assert_eq!(store.get_block_by_hash(&BlockHash::ZERO).await.unwrap(), None);

        let plan: Vec<String> = store
            .with_conn(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "EXPLAIN QUERY PLAN {SELECT_BLOCK} WHERE hash = ?1 ORDER BY height LIMIT 1"
                ))?;
                let details = stmt
                    .query_map(params![[0u8; 32].as_slice()], |row| row.get::<_, String>(3))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(details)
            })
            .await
            .unwrap();
        assert!(plan.iter().any(|detail| detail.contains("idx_blocks_hash")), "{plan:?}");
    }

    #[tokio::test]
    async fn test_sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        let chain = chain_of(3);

        {
            let store = SqliteStore::open(&path).unwrap();
            for block in &chain {
                store.insert_block(block).await.unwrap();
            }
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.load_chain().await.unwrap(), chain);
    }

    #[tokio::test]
    async fn test_sqlite_keeps_tampered_rows_verbatim() {
        let store = SqliteStore::open_memory().unwrap();
        let chain = chain_of(2);
        for block in &chain {
            store.insert_block(block).await.unwrap();
        }

        store
            .with_conn(|conn| {
                conn.execute("UPDATE blocks SET payload = ?1 WHERE height = 1", params![b"forged".as_slice()])?;
                Ok(())
            })
            .await
            .unwrap();

        let tampered = store.get_block(1).await.unwrap().unwrap();
        assert_eq!(tampered.hash(), chain[1].hash());
        assert!(!tampered.validate());
    }
}
