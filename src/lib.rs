/*
SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza
*/

use diesel::prelude::*;

use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod facts;
pub mod models;
pub mod registry;
pub mod schema;
pub mod store;
pub mod tagdict;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Convenient alias for your app.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Build a thread-safe SQLite connection pool.
/// `db_path` can be a file path or ":memory:".
pub fn establish_connection(db_path: &str) -> DbPool {
    let manager = ConnectionManager::<SqliteConnection>::new(db_path);

    // Tune pool size as needed.
    let pool = Pool::builder()
        .max_size(8)
        .build(manager)
        .unwrap_or_else(|e| panic!("Error creating SQLite pool for {}: {}", db_path, e));

    // Optional: set useful SQLite PRAGMAs once, then bring the schema up.
    {
        use diesel::RunQueryDsl;
        use diesel::sql_query;

        let mut conn = pool.get().expect("pool.get() failed to set PRAGMAs");
        let _ = sql_query("PRAGMA foreign_keys = ON").execute(&mut conn);
        let _ = sql_query("PRAGMA journal_mode = WAL").execute(&mut conn);
        let _ = sql_query("PRAGMA synchronous = NORMAL").execute(&mut conn);

        conn.run_pending_migrations(MIGRATIONS)
            .unwrap_or_else(|e| panic!("Error running migrations for {}: {}", db_path, e));
    }

    pool
}
