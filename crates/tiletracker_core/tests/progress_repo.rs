use std::collections::BTreeSet;
use tiletracker_core::db::migrations::latest_version;
use tiletracker_core::db::open_db_in_memory;
use tiletracker_core::{
    ProgressRepository, RepoError, SqliteProgressRepository, Tile, TileId, TileLayout,
};

fn layout_from_values(values: &[i64]) -> TileLayout {
    let tiles = values
        .iter()
        .enumerate()
        .map(|(position, &value)| Tile {
            id: position as TileId,
            value,
        })
        .collect();
    TileLayout::from_tiles(tiles)
}

#[test]
fn goal_record_roundtrip() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteProgressRepository::try_new(&mut conn).unwrap();

    assert_eq!(repo.load_goal().unwrap(), None);

    repo.save_goal(25_000).unwrap();
    assert_eq!(repo.load_goal().unwrap(), Some(25_000));

    repo.save_goal(50_000).unwrap();
    assert_eq!(repo.load_goal().unwrap(), Some(50_000));
}

#[test]
fn layout_record_roundtrip() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteProgressRepository::try_new(&mut conn).unwrap();

    assert_eq!(repo.load_layout().unwrap(), None);

    let layout = layout_from_values(&[500, 200, 100, 50, 20, 10, 5]);
    repo.save_layout(&layout).unwrap();
    assert_eq!(repo.load_layout().unwrap(), Some(layout));
}

#[test]
fn completed_record_roundtrip_is_sorted() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteProgressRepository::try_new(&mut conn).unwrap();

    assert_eq!(repo.load_completed().unwrap(), None);

    repo.save_completed(&BTreeSet::from([9, 2, 5])).unwrap();
    assert_eq!(repo.load_completed().unwrap(), Some(vec![2, 5, 9]));
}

#[test]
fn records_use_the_documented_keys_and_json_shapes() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let repo = SqliteProgressRepository::try_new(&mut conn).unwrap();
        repo.save_goal(25_000).unwrap();
        repo.save_layout(&layout_from_values(&[500, 200])).unwrap();
        repo.save_completed(&BTreeSet::from([1])).unwrap();
    }

    let raw_goal: String = conn
        .query_row(
            "SELECT value FROM preferences WHERE key = 'goalData';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(raw_goal, "25000");

    let raw_layout: String = conn
        .query_row(
            "SELECT value FROM preferences WHERE key = 'tilesLayout';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw_layout).unwrap();
    assert_eq!(parsed[0]["id"], 0);
    assert_eq!(parsed[0]["value"], 500);
    assert_eq!(parsed[1]["id"], 1);
    assert_eq!(parsed[1]["value"], 200);

    let raw_completed: String = conn
        .query_row(
            "SELECT value FROM preferences WHERE key = 'completedTilesData';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(raw_completed, "[1]");
}

#[test]
fn save_layout_rejects_invalid_layouts() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteProgressRepository::try_new(&mut conn).unwrap();

    let shifted = TileLayout::from_tiles(vec![Tile { id: 3, value: 500 }]);
    assert!(matches!(
        repo.save_layout(&shifted),
        Err(RepoError::Validation(_))
    ));
    assert_eq!(repo.load_layout().unwrap(), None);
}

#[test]
fn load_layout_rejects_undecodable_record() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO preferences (key, value) VALUES ('tilesLayout', 'not json');",
        [],
    )
    .unwrap();

    let repo = SqliteProgressRepository::try_new(&mut conn).unwrap();
    assert!(matches!(
        repo.load_layout(),
        Err(RepoError::InvalidData { key: "tilesLayout", .. })
    ));
}

#[test]
fn replace_goal_state_swaps_all_three_records() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProgressRepository::try_new(&mut conn).unwrap();

    repo.save_goal(1_000).unwrap();
    repo.save_layout(&layout_from_values(&[500, 500])).unwrap();
    repo.save_completed(&BTreeSet::from([0, 1])).unwrap();

    let new_layout = layout_from_values(&[500, 500, 500]);
    repo.replace_goal_state(1_500, &new_layout).unwrap();

    assert_eq!(repo.load_goal().unwrap(), Some(1_500));
    assert_eq!(repo.load_layout().unwrap(), Some(new_layout));
    assert_eq!(repo.load_completed().unwrap(), Some(Vec::new()));
}

#[test]
fn replace_goal_state_rejects_layout_goal_mismatch() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProgressRepository::try_new(&mut conn).unwrap();

    repo.save_goal(1_000).unwrap();
    repo.save_layout(&layout_from_values(&[500, 500])).unwrap();

    let mismatched = layout_from_values(&[500]);
    assert!(matches!(
        repo.replace_goal_state(1_500, &mismatched),
        Err(RepoError::Validation(_))
    ));

    // Rejected writes leave the stored records untouched.
    assert_eq!(repo.load_goal().unwrap(), Some(1_000));
    assert_eq!(
        repo.load_layout().unwrap(),
        Some(layout_from_values(&[500, 500]))
    );
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let mut conn = rusqlite::Connection::open_in_memory().unwrap();

    match SqliteProgressRepository::try_new(&mut conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn try_new_rejects_connection_without_preferences_table() {
    let mut conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteProgressRepository::try_new(&mut conn),
        Err(RepoError::MissingRequiredTable("preferences"))
    ));
}
