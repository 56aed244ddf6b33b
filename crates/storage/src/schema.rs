use std::time::Duration;

use log::info;
use rusqlite::Connection;

use crate::config::StorageConfig;
use crate::error::StorageError;

pub const SCHEMA_VERSION: i32 = 1;

pub fn init_schema(conn: &Connection, config: &StorageConfig) -> Result<(), StorageError> {
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    conn.execute_batch(&format!(
        "
        PRAGMA journal_mode = {};
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = {};
        PRAGMA cache_size = -32000;
    ",
        config.journal_mode.as_str(),
        if config.foreign_keys { "ON" } else { "OFF" },
    ))?;
    conn.execute_batch(SCHEMA_SQL)?;
    info!("event=schema_init module=storage status=ok version={SCHEMA_VERSION}");
    Ok(())
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at INTEGER NOT NULL
);
INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, unixepoch());

CREATE TABLE IF NOT EXISTS performers (
    id BLOB PRIMARY KEY CHECK (length(id) = 16),
    name TEXT NOT NULL,
    disambiguation TEXT,
    gender TEXT,
    birthdate TEXT,
    ethnicity TEXT,
    country TEXT,
    eye_color TEXT,
    hair_color TEXT,
    height INTEGER,
    career_start_year INTEGER,
    career_end_year INTEGER,
    deleted INTEGER NOT NULL DEFAULT 0 CHECK (deleted IN (0, 1)),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_performers_name ON performers (name);
CREATE INDEX IF NOT EXISTS idx_performers_birthdate ON performers (birthdate);

CREATE TABLE IF NOT EXISTS performer_aliases (
    performer_id BLOB NOT NULL REFERENCES performers (id),
    alias TEXT NOT NULL,
    alias_key TEXT NOT NULL,
    UNIQUE (performer_id, alias_key)
);
CREATE INDEX IF NOT EXISTS idx_performer_aliases_key ON performer_aliases (alias_key);

CREATE TABLE IF NOT EXISTS performer_urls (
    performer_id BLOB NOT NULL REFERENCES performers (id),
    url TEXT NOT NULL,
    type TEXT NOT NULL,
    UNIQUE (performer_id, url, type)
);

CREATE TABLE IF NOT EXISTS performer_tattoos (
    performer_id BLOB NOT NULL REFERENCES performers (id),
    location TEXT NOT NULL,
    description TEXT
);
CREATE INDEX IF NOT EXISTS idx_performer_tattoos ON performer_tattoos (performer_id);

CREATE TABLE IF NOT EXISTS performer_piercings (
    performer_id BLOB NOT NULL REFERENCES performers (id),
    location TEXT NOT NULL,
    description TEXT
);
CREATE INDEX IF NOT EXISTS idx_performer_piercings ON performer_piercings (performer_id);

CREATE TABLE IF NOT EXISTS performer_redirects (
    source_id BLOB PRIMARY KEY REFERENCES performers (id),
    target_id BLOB NOT NULL REFERENCES performers (id)
);
CREATE INDEX IF NOT EXISTS idx_performer_redirects_target ON performer_redirects (target_id);

CREATE TABLE IF NOT EXISTS scene_performers (
    scene_id BLOB NOT NULL CHECK (length(scene_id) = 16),
    performer_id BLOB NOT NULL REFERENCES performers (id),
    PRIMARY KEY (scene_id, performer_id)
);
CREATE INDEX IF NOT EXISTS idx_scene_performers_performer ON scene_performers (performer_id);
";
