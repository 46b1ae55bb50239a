// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{storage_err, NOW_UTC_SQL};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Row};
use showwork_core::{can_view, resolve_view, CoreError, ProjectView, ViewerContext};
use showwork_model::{
    derive_slug, Category, ProfileId, Project, ProjectAuthor, ProjectDraft, ProjectId,
    ProjectPatch, ProjectStatus, SkillName, Username, Visibility,
};
use tracing::debug;

const PROJECT_COLUMNS: &str = "id, profile_id, title, slug, short_desc, full_desc, \
     cover_image_url, github_url, live_url, visibility, status, category, \
     likes_count, saves_count, views_count, created_at, updated_at";

fn bad_row(e: impl std::fmt::Display) -> rusqlite::Error {
    rusqlite::Error::InvalidParameterName(e.to_string())
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    let id: String = row.get(0)?;
    let profile_id: String = row.get(1)?;
    let visibility: String = row.get(9)?;
    let status: String = row.get(10)?;
    let category: Option<String> = row.get(11)?;
    Ok(Project {
        id: ProjectId::parse(&id).map_err(bad_row)?,
        profile_id: ProfileId::parse(&profile_id).map_err(bad_row)?,
        title: row.get(2)?,
        slug: row.get(3)?,
        short_desc: row.get(4)?,
        full_desc: row.get(5)?,
        cover_image_url: row.get(6)?,
        github_url: row.get(7)?,
        live_url: row.get(8)?,
        visibility: Visibility::parse(&visibility).map_err(bad_row)?,
        status: ProjectStatus::parse(&status).map_err(bad_row)?,
        category: match category {
            Some(raw) => Some(Category::parse(&raw).map_err(bad_row)?),
            None => None,
        },
        likes_count: row.get::<_, i64>(12)?.max(0) as u64,
        saves_count: row.get::<_, i64>(13)?.max(0) as u64,
        views_count: row.get::<_, i64>(14)?.max(0) as u64,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

pub(crate) fn read_project(
    conn: &Connection,
    id: &ProjectId,
) -> Result<Option<Project>, CoreError> {
    conn.query_row(
        &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
        [id.as_str()],
        project_from_row,
    )
    .optional()
    .map_err(storage_err)
}

pub(crate) fn read_author(
    conn: &Connection,
    profile_id: &ProfileId,
) -> Result<ProjectAuthor, CoreError> {
    conn.query_row(
        "SELECT username, full_name, avatar_url FROM profiles WHERE id = ?1",
        [profile_id.as_str()],
        |row| {
            let username: String = row.get(0)?;
            Ok(ProjectAuthor {
                username: Username::parse(&username).map_err(bad_row)?,
                full_name: row.get(1)?,
                avatar_url: row.get(2)?,
            })
        },
    )
    .map_err(storage_err)
}

pub(crate) fn read_skills(conn: &Connection, id: &ProjectId) -> Result<Vec<String>, CoreError> {
    let mut stmt = conn
        .prepare(
            "SELECT s.name FROM project_skills ps
             JOIN skills s ON s.id = ps.skill_id
             WHERE ps.project_id = ?1
             ORDER BY s.name",
        )
        .map_err(storage_err)?;
    let names = stmt
        .query_map([id.as_str()], |row| row.get::<_, String>(0))
        .map_err(storage_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(storage_err)?;
    Ok(names)
}

/// Single-project fetch. Hidden and missing projects are indistinguishable
/// to the caller.
pub fn resolve_project(
    conn: &Connection,
    id: &ProjectId,
    viewer: &ViewerContext,
) -> Result<ProjectView, CoreError> {
    let Some(project) = read_project(conn, id)? else {
        return Err(CoreError::not_found("project"));
    };
    let author = read_author(conn, &project.profile_id)?;
    let skills = read_skills(conn, id)?;
    resolve_view(viewer, project, author, skills).ok_or_else(|| CoreError::not_found("project"))
}

/// Links a project to existing skills rows by name. Names with no skills
/// row are skipped: the tag vocabulary is curated, project writes never
/// extend it.
fn link_skills(conn: &Connection, id: &ProjectId, names: &[String]) -> Result<(), CoreError> {
    for raw in names {
        let name = SkillName::parse(raw)?;
        let skill_id: Option<i64> = conn
            .query_row(
                "SELECT id FROM skills WHERE name = ?1",
                [name.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(storage_err)?;
        match skill_id {
            Some(skill_id) => {
                conn.execute(
                    "INSERT OR IGNORE INTO project_skills (project_id, skill_id) VALUES (?1, ?2)",
                    params![id.as_str(), skill_id],
                )
                .map_err(storage_err)?;
            }
            None => {
                debug!(skill = name.as_str(), "skipping unknown skill name");
            }
        }
    }
    Ok(())
}

pub fn create_project(
    conn: &mut Connection,
    owner: &ViewerContext,
    draft: &ProjectDraft,
) -> Result<Project, CoreError> {
    let Some(profile_id) = owner.profile_id().cloned() else {
        return Err(CoreError::authentication_required());
    };
    draft.validate()?;

    let id = ProjectId::generate();
    let slug = derive_slug(&draft.title);
    let tx = conn
        .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)
        .map_err(storage_err)?;
    tx.execute(
        &format!(
            "INSERT INTO projects (id, profile_id, title, slug, short_desc, full_desc,
                                   cover_image_url, github_url, live_url,
                                   visibility, status, category, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, {NOW_UTC_SQL}, {NOW_UTC_SQL})"
        ),
        params![
            id.as_str(),
            profile_id.as_str(),
            draft.title,
            slug,
            draft.short_desc,
            draft.full_desc,
            draft.cover_image_url,
            draft.github_url,
            draft.live_url,
            draft.visibility.as_str(),
            draft.status.as_str(),
            draft.category.map(Category::as_str),
        ],
    )
    .map_err(storage_err)?;
    link_skills(&tx, &id, &draft.skills)?;
    let project =
        read_project(&tx, &id)?.ok_or_else(|| CoreError::not_found("project"))?;
    tx.commit().map_err(storage_err)?;
    Ok(project)
}

/// Ownership gate for owner-restricted writes. A project hidden from the
/// viewer stays a NotFound; a project the viewer can see but does not own
/// is an OwnershipViolation, since its existence is already known.
fn require_owned(
    conn: &Connection,
    id: &ProjectId,
    owner: &ViewerContext,
) -> Result<(Project, ProfileId), CoreError> {
    let Some(profile_id) = owner.profile_id().cloned() else {
        return Err(CoreError::authentication_required());
    };
    let Some(project) = read_project(conn, id)? else {
        return Err(CoreError::not_found("project"));
    };
    if project.profile_id != profile_id {
        if can_view(owner, &project.profile_id, project.visibility) {
            return Err(CoreError::ownership_violation());
        }
        return Err(CoreError::not_found("project"));
    }
    Ok((project, profile_id))
}

pub fn update_project(
    conn: &mut Connection,
    owner: &ViewerContext,
    id: &ProjectId,
    patch: &ProjectPatch,
) -> Result<Project, CoreError> {
    patch.validate()?;
    if patch.is_empty() {
        return Err(CoreError::validation("patch must change at least one field"));
    }

    let tx = conn
        .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)
        .map_err(storage_err)?;
    require_owned(&tx, id, owner)?;

    let mut set_parts: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    let mut push = |part: &'static str, value: Value, parts: &mut Vec<&str>| {
        parts.push(part);
        values.push(value);
    };
    if let Some(title) = &patch.title {
        push("title = ?", Value::Text(title.clone()), &mut set_parts);
        push(
            "slug = ?",
            Value::Text(derive_slug(title)),
            &mut set_parts,
        );
    }
    if let Some(short_desc) = &patch.short_desc {
        push("short_desc = ?", Value::Text(short_desc.clone()), &mut set_parts);
    }
    if let Some(full_desc) = &patch.full_desc {
        push("full_desc = ?", Value::Text(full_desc.clone()), &mut set_parts);
    }
    if let Some(cover) = &patch.cover_image_url {
        push("cover_image_url = ?", Value::Text(cover.clone()), &mut set_parts);
    }
    if let Some(github_url) = &patch.github_url {
        push("github_url = ?", Value::Text(github_url.clone()), &mut set_parts);
    }
    if let Some(live_url) = &patch.live_url {
        push("live_url = ?", Value::Text(live_url.clone()), &mut set_parts);
    }
    if let Some(visibility) = patch.visibility {
        push(
            "visibility = ?",
            Value::Text(visibility.as_str().to_string()),
            &mut set_parts,
        );
    }
    if let Some(status) = patch.status {
        push(
            "status = ?",
            Value::Text(status.as_str().to_string()),
            &mut set_parts,
        );
    }
    if let Some(category) = patch.category {
        push(
            "category = ?",
            Value::Text(category.as_str().to_string()),
            &mut set_parts,
        );
    }

    // A skills-only patch has no column assignments but still counts as an
    // edit, so updated_at moves unconditionally.
    let assignments: String = set_parts
        .iter()
        .map(|part| format!("{part}, "))
        .collect();
    let sql =
        format!("UPDATE projects SET {assignments}updated_at = {NOW_UTC_SQL} WHERE id = ?");
    values.push(Value::Text(id.as_str().to_string()));
    tx.execute(&sql, params_from_iter(values.iter()))
        .map_err(storage_err)?;

    if let Some(skills) = &patch.skills {
        tx.execute(
            "DELETE FROM project_skills WHERE project_id = ?1",
            [id.as_str()],
        )
        .map_err(storage_err)?;
        link_skills(&tx, id, skills)?;
    }

    let project = read_project(&tx, id)?.ok_or_else(|| CoreError::not_found("project"))?;
    tx.commit().map_err(storage_err)?;
    Ok(project)
}

/// One-click publish: flips visibility to PUBLIC.
pub fn publish_project(
    conn: &mut Connection,
    owner: &ViewerContext,
    id: &ProjectId,
) -> Result<Project, CoreError> {
    update_project(
        conn,
        owner,
        id,
        &ProjectPatch {
            visibility: Some(Visibility::Public),
            ..Default::default()
        },
    )
}

/// Owner-only delete. Engagement records and skill links go with the row
/// via the schema's cascades.
pub fn delete_project(
    conn: &mut Connection,
    owner: &ViewerContext,
    id: &ProjectId,
) -> Result<(), CoreError> {
    let tx = conn
        .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)
        .map_err(storage_err)?;
    require_owned(&tx, id, owner)?;
    tx.execute("DELETE FROM projects WHERE id = ?1", [id.as_str()])
        .map_err(storage_err)?;
    tx.commit().map_err(storage_err)
}
