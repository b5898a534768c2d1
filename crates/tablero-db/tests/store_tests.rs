// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use tablero_app::DashboardId;
use tablero_db::{PersistedState, Store, validate_db_path};
use tablero_testkit::demo_collection;

#[test]
fn validate_db_path_rejects_uri_forms() {
    assert!(validate_db_path("file:test.db").is_err());
    assert!(validate_db_path("https://example.com/db.sqlite").is_err());
    assert!(validate_db_path("db.sqlite?mode=ro").is_err());
    assert!(validate_db_path("").is_err());
    assert!(validate_db_path("/tmp/tablero.db").is_ok());
    assert!(validate_db_path(":memory:").is_ok());
}

#[test]
fn bootstrap_creates_schema_and_load_state_starts_empty() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    assert!(store.load_state()?.is_none());
    Ok(())
}

#[test]
fn bootstrap_is_idempotent_on_an_existing_schema() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    store.bootstrap()?;
    Ok(())
}

#[test]
fn bootstrap_rejects_schema_missing_required_column() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    store.raw_connection().execute_batch(
        "
        ALTER TABLE app_state RENAME TO app_state_old;
        CREATE TABLE app_state (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );
        DROP TABLE app_state_old;
        ",
    )?;

    let err = store.bootstrap().expect_err("schema validation should fail");
    let message = err.to_string();
    assert!(message.contains("app_state"));
    assert!(message.contains("updated_at"));
    Ok(())
}

#[test]
fn state_blob_round_trips() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    let state = PersistedState {
        dashboards: demo_collection(11),
        active_dashboard_id: Some(DashboardId::new("marketing")),
    };
    store.save_state(&state)?;

    let loaded = store.load_state()?.expect("state present after save");
    assert_eq!(loaded, state);
    Ok(())
}

#[test]
fn save_state_overwrites_the_previous_blob() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    let first = PersistedState {
        dashboards: demo_collection(1),
        active_dashboard_id: Some(DashboardId::new("default")),
    };
    store.save_state(&first)?;

    let second = PersistedState {
        dashboards: demo_collection(2),
        active_dashboard_id: Some(DashboardId::new("marketing")),
    };
    store.save_state(&second)?;

    assert_eq!(store.load_state()?, Some(second));
    Ok(())
}

#[test]
fn clear_state_removes_the_blob() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    store.save_state(&PersistedState {
        dashboards: demo_collection(5),
        active_dashboard_id: None,
    })?;
    store.clear_state()?;

    assert!(store.load_state()?.is_none());
    Ok(())
}

#[test]
fn load_state_surfaces_a_corrupt_blob() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    store.raw_connection().execute(
        "INSERT INTO app_state (key, value, updated_at) VALUES ('dashboard.state', 'not json', '2026-01-01T00:00:00Z')",
        [],
    )?;

    let err = store.load_state().expect_err("corrupt blob should fail");
    assert!(err.to_string().contains("dashboard.state"));
    Ok(())
}

#[test]
fn state_survives_reopening_the_same_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tablero.db");

    let state = PersistedState {
        dashboards: demo_collection(9),
        active_dashboard_id: Some(DashboardId::new("default")),
    };

    {
        let store = Store::open(&path)?;
        store.bootstrap()?;
        store.save_state(&state)?;
    }

    let store = Store::open(&path)?;
    store.bootstrap()?;
    assert_eq!(store.load_state()?, Some(state));
    Ok(())
}
