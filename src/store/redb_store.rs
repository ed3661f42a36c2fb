//! redb-backed storage engine
//!
//! One [`redb::Database`] per site file. redb supplies the transaction
//! discipline: a single write transaction at a time, snapshot reads, and an
//! exclusive file lock.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use redb::{Database, DatabaseError, ReadableTable};

use super::bucket::Bucket;
use super::codec::{self, Record};
use super::{ids, StoreEngine};
use crate::error::{AgassiError, Result};
use crate::model::{Coach, Player, Review};

/// How often to retry while another handle holds the file lock
const OPEN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Storage engine over a single redb file
///
/// ## Concurrency
///
/// - **Writes** (create, add_review): each runs in one redb write
///   transaction; redb admits one at a time, so the existence check and the
///   insert cannot interleave with another writer.
/// - **Reads** (list, get): each runs in one read transaction over a
///   consistent snapshot, concurrently with other reads and with a writer.
/// - **Close**: takes the handle out under the write side of `db`, so it
///   waits for in-flight operations and every later call sees `Closed`.
pub struct RedbStore {
    /// Backing file path
    path: PathBuf,

    /// `None` once closed
    db: RwLock<Option<Database>>,
}

impl RedbStore {
    /// Open or create the store file and provision its buckets
    ///
    /// Waits up to `timeout` for another handle to release the file.
    pub fn open(path: impl AsRef<Path>, timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        tracing::info!("Opening redb store {} (timeout {:?})", path.display(), timeout);

        let db = Self::open_database(&path, timeout)?;
        Self::provision_buckets(&db)?;

        tracing::debug!("redb store ready at {}", path.display());

        Ok(Self {
            path,
            db: RwLock::new(Some(db)),
        })
    }

    fn open_database(path: &Path, timeout: Duration) -> Result<Database> {
        let deadline = Instant::now().checked_add(timeout);

        loop {
            match Database::create(path) {
                Ok(db) => return Ok(db),
                Err(DatabaseError::DatabaseAlreadyOpen)
                    if deadline.map_or(true, |d| Instant::now() < d) =>
                {
                    thread::sleep(OPEN_POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(AgassiError::StoreUnavailable {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    })
                }
            }
        }
    }

    /// Create any missing top-level bucket, all in one write transaction
    ///
    /// A failure part way leaves nothing behind: the uncommitted transaction
    /// is aborted when dropped.
    fn provision_buckets(db: &Database) -> Result<()> {
        let txn = db
            .begin_write()
            .map_err(|e| transaction_error("provision buckets", e))?;

        for bucket in Bucket::ALL {
            txn.open_table(bucket.definition())
                .map_err(|e| storage_error("create bucket", bucket, e))?;
            tracing::debug!("Bucket {} provisioned", bucket);
        }

        txn.commit()
            .map_err(|e| transaction_error("provision buckets", e))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `close` has already run
    pub fn is_closed(&self) -> bool {
        self.db.read().is_none()
    }

    /// Run `f` against the open database, or fail with `Closed`
    fn with_db<T>(&self, f: impl FnOnce(&Database) -> Result<T>) -> Result<T> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(AgassiError::Closed)?;
        f(db)
    }

    /// Insert `record` unless its id is already taken
    fn create<R: Record>(&self, mut record: R) -> Result<String> {
        if record.id().is_empty() {
            record.set_id(ids::next_id());
        }
        let bucket = R::BUCKET;
        let key = record.id().to_string();

        self.with_db(|db| {
            let txn = db
                .begin_write()
                .map_err(|e| transaction_error("create", e))?;
            {
                let mut table = txn
                    .open_table(bucket.definition())
                    .map_err(|e| storage_error("open bucket", bucket, e))?;

                let exists = table
                    .get(key.as_str())
                    .map_err(|e| storage_error("lookup", bucket, e))?
                    .is_some();

                if exists {
                    drop(table);
                    txn.abort().map_err(|e| transaction_error("create", e))?;
                    return Err(AgassiError::DuplicateKey {
                        bucket: bucket.name(),
                        key: key.clone(),
                    });
                }

                let value = codec::encode(&record)?;
                table
                    .insert(key.as_str(), &value[..])
                    .map_err(|e| storage_error("insert", bucket, e))?;
            }
            txn.commit().map_err(|e| transaction_error("create", e))
        })?;

        tracing::debug!("Created {} {} in {}", R::KIND, key, bucket);
        Ok(key)
    }

    /// Every record of a bucket, in key order
    ///
    /// A single undecodable record fails the whole call.
    fn list<R: Record>(&self) -> Result<Vec<R>> {
        let bucket = R::BUCKET;

        self.with_db(|db| {
            let txn = db.begin_read().map_err(|e| transaction_error("list", e))?;
            let table = txn
                .open_table(bucket.definition())
                .map_err(|e| storage_error("open bucket", bucket, e))?;

            let mut records = Vec::new();
            for entry in table.iter().map_err(|e| storage_error("iterate", bucket, e))? {
                let (key, value) = entry.map_err(|e| storage_error("iterate", bucket, e))?;
                records.push(codec::decode::<R>(value.value(), key.value())?);
            }
            Ok(records)
        })
    }

    fn get<R: Record>(&self, id: &str) -> Result<Option<R>> {
        let bucket = R::BUCKET;

        self.with_db(|db| {
            let txn = db.begin_read().map_err(|e| transaction_error("get", e))?;
            let table = txn
                .open_table(bucket.definition())
                .map_err(|e| storage_error("open bucket", bucket, e))?;

            let found = match table
                .get(id)
                .map_err(|e| storage_error("lookup", bucket, e))?
            {
                Some(value) => Some(codec::decode::<R>(value.value(), id)?),
                None => None,
            };
            Ok(found)
        })
    }
}

impl StoreEngine for RedbStore {
    fn create_player(&self, player: Player) -> Result<String> {
        self.create(player)
    }

    fn create_coach(&self, coach: Coach) -> Result<String> {
        self.create(coach)
    }

    fn list_players(&self) -> Result<Vec<Player>> {
        self.list()
    }

    fn list_coaches(&self) -> Result<Vec<Coach>> {
        self.list()
    }

    fn get_player(&self, id: &str) -> Result<Option<Player>> {
        self.get(id)
    }

    fn get_coach(&self, id: &str) -> Result<Option<Coach>> {
        self.get(id)
    }

    /// Read-modify-write of the player record in one write transaction
    fn add_review(&self, player_id: &str, review: Review) -> Result<()> {
        let bucket = Bucket::Players;

        self.with_db(|db| {
            let txn = db
                .begin_write()
                .map_err(|e| transaction_error("add review", e))?;
            {
                let mut table = txn
                    .open_table(bucket.definition())
                    .map_err(|e| storage_error("open bucket", bucket, e))?;

                let existing = table
                    .get(player_id)
                    .map_err(|e| storage_error("lookup", bucket, e))?
                    .map(|value| codec::decode::<Player>(value.value(), player_id))
                    .transpose()?;

                let mut player = existing.ok_or_else(|| AgassiError::NotFound {
                    bucket: bucket.name(),
                    key: player_id.to_string(),
                })?;
                player.reviews.push(review);

                let value = codec::encode(&player)?;
                table
                    .insert(player_id, &value[..])
                    .map_err(|e| storage_error("insert", bucket, e))?;
            }
            txn.commit().map_err(|e| transaction_error("add review", e))
        })?;

        tracing::debug!("Added review to player {}", player_id);
        Ok(())
    }

    fn list_reviews(&self, player_id: &str) -> Result<Vec<Review>> {
        self.get::<Player>(player_id)?
            .map(|player| player.reviews)
            .ok_or_else(|| AgassiError::NotFound {
                bucket: Bucket::Players.name(),
                key: player_id.to_string(),
            })
    }

    /// Commit a final empty transaction, then drop the handle and its file lock
    ///
    /// The handle is released even when the final commit fails; that failure
    /// is reported as `Close`.
    fn close(&self) -> Result<()> {
        let db = self.db.write().take().ok_or(AgassiError::Closed)?;

        let flushed = db
            .begin_write()
            .map_err(|e| e.to_string())
            .and_then(|txn| txn.commit().map_err(|e| e.to_string()));
        drop(db);

        match flushed {
            Ok(()) => {
                tracing::info!("redb store {} closed", self.path.display());
                Ok(())
            }
            Err(reason) => Err(AgassiError::Close(reason)),
        }
    }
}

fn transaction_error(op: &'static str, e: impl Display) -> AgassiError {
    AgassiError::Transaction {
        op,
        reason: e.to_string(),
    }
}

fn storage_error(op: &'static str, bucket: Bucket, e: impl Display) -> AgassiError {
    AgassiError::Storage {
        op,
        bucket: bucket.name(),
        reason: e.to_string(),
    }
}
