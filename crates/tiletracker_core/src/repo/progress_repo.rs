//! Progress record repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the widget's three durable records (goal, layout, completed
//!   ids) as JSON values in the `preferences` table.
//! - Keep SQL and JSON encoding details inside the persistence boundary.
//!
//! # Invariants
//! - Layout writes validate the layout before any SQL mutation.
//! - A goal change replaces goal, layout and completed ids in a single
//!   transaction, so a reader never observes a layout stored against a
//!   stale goal.
//! - Read paths reject undecodable persisted records instead of masking
//!   them.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::tile::{LayoutValidationError, TileId, TileLayout};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Record key for the persisted goal (JSON integer).
pub const GOAL_KEY: &str = "goalData";
/// Record key for the persisted layout (JSON array of `{id, value}`).
pub const LAYOUT_KEY: &str = "tilesLayout";
/// Record key for the persisted completed ids (JSON array of integers).
pub const COMPLETED_KEY: &str = "completedTilesData";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for progress record persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(LayoutValidationError),
    Db(DbError),
    InvalidData {
        key: &'static str,
        message: String,
    },
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData { key, message } => {
                write!(f, "invalid persisted record `{key}`: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection not migrated: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LayoutValidationError> for RepoError {
    fn from(value: LayoutValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the widget's three durable records.
///
/// Each record is independently addressable; `replace_goal_state` is the
/// one compound write, covering the goal-change path.
pub trait ProgressRepository {
    /// Reads the persisted goal, `None` when no goal record exists yet.
    fn load_goal(&self) -> RepoResult<Option<i64>>;
    /// Writes the goal record.
    fn save_goal(&self, goal: i64) -> RepoResult<()>;
    /// Reads the persisted layout, `None` when no layout record exists yet.
    fn load_layout(&self) -> RepoResult<Option<TileLayout>>;
    /// Validates and writes the layout record.
    fn save_layout(&self, layout: &TileLayout) -> RepoResult<()>;
    /// Reads the persisted completed ids, `None` when absent.
    fn load_completed(&self) -> RepoResult<Option<Vec<TileId>>>;
    /// Writes the completed-ids record.
    fn save_completed(&self, completed: &BTreeSet<TileId>) -> RepoResult<()>;
    /// Replaces goal, layout and completed ids in one atomic write.
    fn replace_goal_state(&mut self, goal: i64, layout: &TileLayout) -> RepoResult<()>;
}

/// SQLite-backed progress repository over the `preferences` table.
pub struct SqliteProgressRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteProgressRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn read_record(&self, key: &'static str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl ProgressRepository for SqliteProgressRepository<'_> {
    fn load_goal(&self) -> RepoResult<Option<i64>> {
        self.read_record(GOAL_KEY)?
            .map(|raw| decode(GOAL_KEY, &raw))
            .transpose()
    }

    fn save_goal(&self, goal: i64) -> RepoResult<()> {
        upsert_record(self.conn, GOAL_KEY, &encode(GOAL_KEY, &goal)?)
    }

    fn load_layout(&self) -> RepoResult<Option<TileLayout>> {
        let layout: Option<TileLayout> = self
            .read_record(LAYOUT_KEY)?
            .map(|raw| decode(LAYOUT_KEY, &raw))
            .transpose()?;

        if let Some(layout) = &layout {
            layout.validate()?;
        }
        Ok(layout)
    }

    fn save_layout(&self, layout: &TileLayout) -> RepoResult<()> {
        layout.validate()?;
        upsert_record(self.conn, LAYOUT_KEY, &encode(LAYOUT_KEY, layout)?)
    }

    fn load_completed(&self) -> RepoResult<Option<Vec<TileId>>> {
        self.read_record(COMPLETED_KEY)?
            .map(|raw| decode(COMPLETED_KEY, &raw))
            .transpose()
    }

    fn save_completed(&self, completed: &BTreeSet<TileId>) -> RepoResult<()> {
        let ids: Vec<TileId> = completed.iter().copied().collect();
        upsert_record(self.conn, COMPLETED_KEY, &encode(COMPLETED_KEY, &ids)?)
    }

    fn replace_goal_state(&mut self, goal: i64, layout: &TileLayout) -> RepoResult<()> {
        layout.validate_for_goal(goal)?;

        let goal_json = encode(GOAL_KEY, &goal)?;
        let layout_json = encode(LAYOUT_KEY, layout)?;
        let completed_json = encode(COMPLETED_KEY, &Vec::<TileId>::new())?;

        let tx = self.conn.transaction()?;
        upsert_record(&tx, GOAL_KEY, &goal_json)?;
        upsert_record(&tx, LAYOUT_KEY, &layout_json)?;
        upsert_record(&tx, COMPLETED_KEY, &completed_json)?;
        tx.commit()?;

        Ok(())
    }
}

fn upsert_record(conn: &Connection, key: &str, value: &str) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO preferences (key, value, updated_at)
         VALUES (?1, ?2, strftime('%s', 'now') * 1000)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at;",
        params![key, value],
    )?;
    Ok(())
}

fn encode<T: Serialize>(key: &'static str, value: &T) -> RepoResult<String> {
    serde_json::to_string(value).map_err(|err| RepoError::InvalidData {
        key,
        message: err.to_string(),
    })
}

fn decode<T: DeserializeOwned>(key: &'static str, raw: &str) -> RepoResult<T> {
    serde_json::from_str(raw).map_err(|err| RepoError::InvalidData {
        key,
        message: err.to_string(),
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = latest_version();
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'preferences'
        );",
        [],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable("preferences"));
    }

    Ok(())
}
