//! FFI use-case API for widget-host calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to the embedding UI via FRB.
//! - Keep error semantics simple for widget integration.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every mutating call loads the store before acting and persists before
//!   returning, so hosts never observe a half-applied operation.

use std::path::PathBuf;
use std::sync::OnceLock;
use tiletracker_core::db::open_db;
use tiletracker_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ProgressService, SqliteProgressRepository,
};

const WIDGET_DB_FILE_NAME: &str = "tiletracker_widget.sqlite3";
static WIDGET_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Tile projection for widget rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetTile {
    /// Stable ordinal id within the current layout.
    pub id: u32,
    /// Tile denomination (or remainder) value.
    pub value: i64,
    /// Whether the user marked this tile complete.
    pub completed: bool,
}

/// Progress envelope returned by every widget state call.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetProgressResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Current goal amount.
    pub goal: i64,
    /// Full tile layout with completion flags.
    pub tiles: Vec<WidgetTile>,
    /// Sum of completed tile values.
    pub completed_sum: i64,
    /// Percentage of goal covered; hosts clamp to `[0, 100]` for display.
    pub progress_percent: f64,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl WidgetProgressResponse {
    fn from_service(
        service: &ProgressService<SqliteProgressRepository<'_>>,
        message: impl Into<String>,
    ) -> Self {
        let tiles = service
            .layout()
            .tiles()
            .iter()
            .map(|tile| WidgetTile {
                id: tile.id,
                value: tile.value,
                completed: service.completed().contains(&tile.id),
            })
            .collect();
        Self {
            ok: true,
            goal: service.goal(),
            tiles,
            completed_sum: service.derived_sum(),
            progress_percent: service.progress_percent(),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            goal: 0,
            tiles: Vec::new(),
            completed_sum: 0,
            progress_percent: 0.0,
            message: message.into(),
        }
    }
}

/// Loads the persisted widget state.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; storage failures degrade to in-memory defaults.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_load() -> WidgetProgressResponse {
    with_progress_service(|_service| Ok("Progress loaded.".to_string()))
}

/// Toggles completion of one tile.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Ids outside the current layout produce a failed envelope, never a
///   panic.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_toggle_tile(tile_id: u32) -> WidgetProgressResponse {
    with_progress_service(|service| match service.toggle(tile_id) {
        Ok(true) => Ok(format!("Tile {tile_id} completed.")),
        Ok(false) => Ok(format!("Tile {tile_id} reopened.")),
        Err(err) => Err(format!("widget_toggle_tile failed: {err}")),
    })
}

/// Replaces the savings goal and regenerates the tile layout.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Non-positive goals produce a failed envelope, never a panic.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_set_goal(goal: i64) -> WidgetProgressResponse {
    with_progress_service(|service| match service.set_goal(goal) {
        Ok(()) => Ok(format!("Goal updated to {goal}.")),
        Err(err) => Err(format!("widget_set_goal failed: {err}")),
    })
}

/// Clears all completed tiles; goal and layout stay untouched.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_reset() -> WidgetProgressResponse {
    with_progress_service(|service| match service.reset() {
        Ok(()) => Ok("Progress reset.".to_string()),
        Err(err) => Err(format!("widget_reset failed: {err}")),
    })
}

fn resolve_widget_db_path() -> PathBuf {
    WIDGET_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("TILETRACKER_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(WIDGET_DB_FILE_NAME)
        })
        .clone()
}

fn with_progress_service(
    f: impl FnOnce(&mut ProgressService<SqliteProgressRepository<'_>>) -> Result<String, String>,
) -> WidgetProgressResponse {
    let db_path = resolve_widget_db_path();
    let mut conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => return WidgetProgressResponse::failure(format!("widget DB open failed: {err}")),
    };
    let repo = match SqliteProgressRepository::try_new(&mut conn) {
        Ok(repo) => repo,
        Err(err) => {
            return WidgetProgressResponse::failure(format!("widget repo init failed: {err}"))
        }
    };

    let mut service = ProgressService::new(repo);
    service.load();

    match f(&mut service) {
        Ok(message) => WidgetProgressResponse::from_service(&service, message),
        Err(message) => WidgetProgressResponse::failure(message),
    }
}
