// SPDX-License-Identifier: MIT OR Apache-2.0

//! The engagement ledger. The (viewer, project) record is the source of
//! truth; the project's counter is a cached derived value that moves in
//! the same transaction as the record.

use crate::storage_err;
use rusqlite::{params, Connection};
use showwork_core::{can_view, CoreError, EngagementKind, EngagementResult, EngagementStatus, ViewerContext};
use showwork_model::{ProfileId, ProjectId, Visibility};

const fn tables(kind: EngagementKind) -> (&'static str, &'static str) {
    match kind {
        EngagementKind::Like => ("project_likes", "likes_count"),
        EngagementKind::Save => ("project_saves", "saves_count"),
    }
}

/// Idempotent toggle. The existence check and the mutation run inside one
/// IMMEDIATE transaction, so two racing toggles from the same viewer
/// serialize to one net toggle and the counter never drifts from the
/// record set.
pub fn toggle(
    conn: &mut Connection,
    viewer: &ViewerContext,
    project_id: &ProjectId,
    kind: EngagementKind,
) -> Result<EngagementResult, CoreError> {
    let Some(profile_id) = viewer.profile_id().cloned() else {
        return Err(CoreError::authentication_required());
    };
    let (table, counter) = tables(kind);

    let tx = conn
        .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)
        .map_err(storage_err)?;

    let target: Option<(String, String)> = {
        use rusqlite::OptionalExtension;
        tx.query_row(
            "SELECT profile_id, visibility FROM projects WHERE id = ?1",
            [project_id.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(storage_err)?
    };
    // A hidden project and a missing one answer identically, also for
    // like/save attempts.
    let Some((owner_raw, visibility_raw)) = target else {
        return Err(CoreError::not_found("project"));
    };
    let owner = ProfileId::parse(&owner_raw)?;
    let visibility = Visibility::parse(&visibility_raw)?;
    if !can_view(viewer, &owner, visibility) {
        return Err(CoreError::not_found("project"));
    }

    let deleted = tx
        .execute(
            &format!("DELETE FROM {table} WHERE project_id = ?1 AND profile_id = ?2"),
            params![project_id.as_str(), profile_id.as_str()],
        )
        .map_err(storage_err)?;

    let engaged = if deleted > 0 {
        tx.execute(
            &format!("UPDATE projects SET {counter} = {counter} - 1 WHERE id = ?1"),
            [project_id.as_str()],
        )
        .map_err(storage_err)?;
        false
    } else {
        tx.execute(
            &format!("INSERT INTO {table} (project_id, profile_id) VALUES (?1, ?2)"),
            params![project_id.as_str(), profile_id.as_str()],
        )
        .map_err(storage_err)?;
        tx.execute(
            &format!("UPDATE projects SET {counter} = {counter} + 1 WHERE id = ?1"),
            [project_id.as_str()],
        )
        .map_err(storage_err)?;
        true
    };

    let count: i64 = tx
        .query_row(
            &format!("SELECT {counter} FROM projects WHERE id = ?1"),
            [project_id.as_str()],
            |row| row.get(0),
        )
        .map_err(storage_err)?;
    tx.commit().map_err(storage_err)?;

    Ok(EngagementResult {
        engaged,
        count: count.max(0) as u64,
    })
}

pub fn toggle_like(
    conn: &mut Connection,
    viewer: &ViewerContext,
    project_id: &ProjectId,
) -> Result<EngagementResult, CoreError> {
    toggle(conn, viewer, project_id, EngagementKind::Like)
}

pub fn toggle_save(
    conn: &mut Connection,
    viewer: &ViewerContext,
    project_id: &ProjectId,
) -> Result<EngagementResult, CoreError> {
    toggle(conn, viewer, project_id, EngagementKind::Save)
}

/// Initial like/save state for a project page.
pub fn engagement_status(
    conn: &Connection,
    viewer: &ViewerContext,
    project_id: &ProjectId,
) -> Result<EngagementStatus, CoreError> {
    let Some(profile_id) = viewer.profile_id() else {
        return Err(CoreError::authentication_required());
    };
    let exists = |table: &str| -> Result<bool, CoreError> {
        conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {table} WHERE project_id = ?1 AND profile_id = ?2)"
            ),
            params![project_id.as_str(), profile_id.as_str()],
            |row| row.get::<_, i64>(0),
        )
        .map(|v| v != 0)
        .map_err(storage_err)
    };
    Ok(EngagementStatus {
        liked: exists("project_likes")?,
        saved: exists("project_saves")?,
    })
}

/// Single atomic "add one" against the stored counter. Session dedup is
/// the caller's concern; this never reads the old value.
pub fn increment_views(conn: &Connection, project_id: &ProjectId) -> Result<(), CoreError> {
    let changed = conn
        .execute(
            "UPDATE projects SET views_count = views_count + 1 WHERE id = ?1",
            [project_id.as_str()],
        )
        .map_err(storage_err)?;
    if changed == 0 {
        return Err(CoreError::not_found("project"));
    }
    Ok(())
}
