// SPDX-License-Identifier: MIT OR Apache-2.0
#![forbid(unsafe_code)]

//! SQLite persistence for profiles, projects and the engagement ledger.
//!
//! Every counter mutation is storage-level arithmetic
//! (`SET likes_count = likes_count + 1`), never a read-modify-write in
//! application code, and every toggle runs as a single IMMEDIATE
//! transaction so the existence-check-then-mutate pair is serialized per
//! (viewer, project).

use rusqlite::Connection;
use showwork_core::{CoreError, CoreErrorCode};
use std::path::Path;

pub const CRATE_NAME: &str = "showwork-store";

mod ledger;
mod profiles;
mod projects;
mod schema;
pub mod testing;

pub use ledger::{engagement_status, increment_views, toggle, toggle_like, toggle_save};
pub use profiles::{
    create_profile, delete_profile, get_profile, get_profile_by_username, issue_token,
    resolve_token, update_profile,
};
pub use projects::{
    create_project, delete_project, publish_project, resolve_project, update_project,
};
pub use schema::{bootstrap, seed_default_skills, seed_skills};

/// Opens a database file with the pragmas the rest of the crate assumes.
pub fn open(path: &Path) -> Result<Connection, CoreError> {
    let conn = Connection::open(path).map_err(storage_err)?;
    configure(&conn)?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(storage_err)?;
    Ok(conn)
}

/// In-memory database, used by tests and the server's default dev mode.
pub fn open_in_memory() -> Result<Connection, CoreError> {
    let conn = Connection::open_in_memory().map_err(storage_err)?;
    configure(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<(), CoreError> {
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(storage_err)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(storage_err)?;
    Ok(())
}

/// Maps a rusqlite failure onto the core taxonomy: lock/busy conditions are
/// retryable, unique-constraint hits are conflicts, everything else is
/// internal.
pub(crate) fn storage_err(err: rusqlite::Error) -> CoreError {
    if let rusqlite::Error::SqliteFailure(ffi_err, ref message) = err {
        match ffi_err.code {
            rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                return CoreError::new(
                    CoreErrorCode::TransientStorage,
                    message.clone().unwrap_or_else(|| "database busy".to_string()),
                );
            }
            rusqlite::ErrorCode::ConstraintViolation => {
                // 2067 = UNIQUE, 1555 = PRIMARY KEY
                if ffi_err.extended_code == 2067 || ffi_err.extended_code == 1555 {
                    return CoreError::new(
                        CoreErrorCode::Conflict,
                        message
                            .clone()
                            .unwrap_or_else(|| "uniqueness constraint violated".to_string()),
                    );
                }
            }
            _ => {}
        }
    }
    CoreError::new(CoreErrorCode::Internal, err.to_string())
}

pub(crate) const NOW_UTC_SQL: &str = "strftime('%Y-%m-%dT%H:%M:%fZ','now')";

#[cfg(test)]
mod projects_tests;
