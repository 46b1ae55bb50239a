#![forbid(unsafe_code)]

//! The directory: the read-side listing surface over PUBLIC projects,
//! plus the per-profile, saved and own-dashboard listings.

use rusqlite::{params_from_iter, types::Value, Connection, Row};
use serde::{Deserialize, Serialize};
use showwork_core::{can_view, CoreError, CoreErrorCode, ViewerContext};
use showwork_model::{
    Category, ProfileId, ProfileStats, ProjectAuthor, ProjectId, ProjectSummary, Username,
    Visibility,
};

pub const CRATE_NAME: &str = "showwork-query";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectorySort {
    Recent,
    Popular,
    /// A deliberate simplification: likes then views, no time decay.
    Trending,
}

impl DirectorySort {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Popular => "popular",
            Self::Trending => "trending",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw {
            "recent" => Ok(Self::Recent),
            "popular" => Ok(Self::Popular),
            "trending" => Ok(Self::Trending),
            _ => Err(CoreError::validation(
                "sort must be one of recent, popular, trending",
            )),
        }
    }

    /// Every ordering ends in `id DESC` so repeated offset reads stay
    /// stable under concurrent writes to unrelated rows.
    const fn order_by(self) -> &'static str {
        match self {
            Self::Recent => "p.created_at DESC, p.id DESC",
            Self::Popular => "p.likes_count DESC, p.created_at DESC, p.id DESC",
            Self::Trending => {
                "p.likes_count DESC, p.views_count DESC, p.created_at DESC, p.id DESC"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryFilter {
    pub category: Option<Category>,
    pub skill: Option<String>,
    pub sort: DirectorySort,
    pub limit: usize,
    pub offset: usize,
}

impl Default for DirectoryFilter {
    fn default() -> Self {
        Self {
            category: None,
            skill: None,
            sort: DirectorySort::Recent,
            limit: DirectoryLimits::default().default_limit,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryLimits {
    pub default_limit: usize,
    pub max_limit: usize,
    pub max_offset: usize,
}

impl Default for DirectoryLimits {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 50,
            max_offset: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryPage {
    pub rows: Vec<ProjectSummary>,
    pub has_more: bool,
    pub next_offset: Option<usize>,
}

fn storage_err(err: rusqlite::Error) -> CoreError {
    if let rusqlite::Error::SqliteFailure(ffi_err, _) = &err {
        if matches!(
            ffi_err.code,
            rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
        ) {
            return CoreError::new(CoreErrorCode::TransientStorage, err.to_string());
        }
    }
    CoreError::new(CoreErrorCode::Internal, err.to_string())
}

fn bad_row(e: impl std::fmt::Display) -> rusqlite::Error {
    rusqlite::Error::InvalidParameterName(e.to_string())
}

const SUMMARY_SELECT: &str = "SELECT p.id, p.title, p.slug, p.short_desc, p.cover_image_url, \
     p.visibility, p.category, p.likes_count, p.saves_count, p.views_count, p.created_at, \
     pr.username, pr.full_name, pr.avatar_url \
     FROM projects p JOIN profiles pr ON pr.id = p.profile_id";

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<ProjectSummary> {
    let id: String = row.get(0)?;
    let visibility: String = row.get(5)?;
    let category: Option<String> = row.get(6)?;
    let username: String = row.get(11)?;
    Ok(ProjectSummary {
        id: ProjectId::parse(&id).map_err(bad_row)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        short_desc: row.get(3)?,
        cover_image_url: row.get(4)?,
        visibility: Visibility::parse(&visibility).map_err(bad_row)?,
        category: match category {
            Some(raw) => Some(Category::parse(&raw).map_err(bad_row)?),
            None => None,
        },
        likes_count: row.get::<_, i64>(7)?.max(0) as u64,
        saves_count: row.get::<_, i64>(8)?.max(0) as u64,
        views_count: row.get::<_, i64>(9)?.max(0) as u64,
        created_at: row.get(10)?,
        author: ProjectAuthor {
            username: Username::parse(&username).map_err(bad_row)?,
            full_name: row.get(12)?,
            avatar_url: row.get(13)?,
        },
        skills: Vec::new(),
    })
}

fn attach_skills(conn: &Connection, rows: &mut [ProjectSummary]) -> Result<(), CoreError> {
    let mut stmt = conn
        .prepare(
            "SELECT s.name FROM project_skills ps
             JOIN skills s ON s.id = ps.skill_id
             WHERE ps.project_id = ?1
             ORDER BY s.name",
        )
        .map_err(storage_err)?;
    for summary in rows.iter_mut() {
        summary.skills = stmt
            .query_map([summary.id.as_str()], |row| row.get::<_, String>(0))
            .map_err(storage_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage_err)?;
    }
    Ok(())
}

fn validate_filter(filter: &DirectoryFilter, limits: &DirectoryLimits) -> Result<(), CoreError> {
    if filter.limit == 0 || filter.limit > limits.max_limit {
        return Err(CoreError::validation(format!(
            "limit must be between 1 and {}",
            limits.max_limit
        )));
    }
    if filter.offset > limits.max_offset {
        return Err(CoreError::validation(format!(
            "offset exceeds {}",
            limits.max_offset
        )));
    }
    Ok(())
}

/// Public directory listing. The query is hard-gated on
/// `visibility = 'PUBLIC'`; drafts and private projects never appear, for
/// any filter/sort combination.
pub fn list_public_projects(
    conn: &Connection,
    filter: &DirectoryFilter,
    limits: &DirectoryLimits,
) -> Result<DirectoryPage, CoreError> {
    validate_filter(filter, limits)?;

    let mut sql = format!("{SUMMARY_SELECT} WHERE p.visibility = 'PUBLIC'");
    let mut params: Vec<Value> = Vec::new();
    if let Some(category) = filter.category {
        sql.push_str(" AND p.category = ?");
        params.push(Value::Text(category.as_str().to_string()));
    }
    if let Some(skill) = &filter.skill {
        sql.push_str(
            " AND EXISTS (SELECT 1 FROM project_skills ps \
             JOIN skills s ON s.id = ps.skill_id \
             WHERE ps.project_id = p.id AND s.name = ?)",
        );
        params.push(Value::Text(skill.clone()));
    }
    sql.push_str(&format!(" ORDER BY {}", filter.sort.order_by()));
    sql.push_str(" LIMIT ? OFFSET ?");
    // limit+1 detects a further page without a COUNT(*) pass.
    params.push(Value::Integer(filter.limit as i64 + 1));
    params.push(Value::Integer(filter.offset as i64));

    let mut stmt = conn.prepare(&sql).map_err(storage_err)?;
    let mut rows: Vec<ProjectSummary> = stmt
        .query_map(params_from_iter(params.iter()), summary_from_row)
        .map_err(storage_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(storage_err)?;

    let has_more = rows.len() > filter.limit;
    if has_more {
        rows.truncate(filter.limit);
    }
    attach_skills(conn, &mut rows)?;
    let next_offset = has_more.then(|| filter.offset + rows.len());
    Ok(DirectoryPage {
        rows,
        has_more,
        next_offset,
    })
}

/// A single profile's projects. The SQL already narrows to PUBLIC for
/// strangers, and the resolver re-checks every row on the way out; the
/// owner sees DRAFT and PRIVATE items too.
pub fn list_profile_projects(
    conn: &Connection,
    profile_id: &ProfileId,
    viewer: &ViewerContext,
) -> Result<Vec<ProjectSummary>, CoreError> {
    let is_owner = viewer.is_owner_of(profile_id);
    let mut sql = format!("{SUMMARY_SELECT} WHERE p.profile_id = ?");
    if !is_owner {
        sql.push_str(" AND p.visibility = 'PUBLIC'");
    }
    sql.push_str(" ORDER BY p.created_at DESC, p.id DESC");

    let mut stmt = conn.prepare(&sql).map_err(storage_err)?;
    let mut rows: Vec<ProjectSummary> = stmt
        .query_map([profile_id.as_str()], summary_from_row)
        .map_err(storage_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(storage_err)?;
    rows.retain(|row| can_view(viewer, profile_id, row.visibility));
    attach_skills(conn, &mut rows)?;
    Ok(rows)
}

/// The owner's dashboard list: every visibility, newest first.
pub fn list_own_projects(
    conn: &Connection,
    owner: &ViewerContext,
) -> Result<Vec<ProjectSummary>, CoreError> {
    let Some(profile_id) = owner.profile_id() else {
        return Err(CoreError::authentication_required());
    };
    list_profile_projects(conn, profile_id, owner)
}

/// Projects the viewer saved, visibility-filtered: a project taken
/// private after being saved drops out of the list.
pub fn list_saved_projects(
    conn: &Connection,
    viewer: &ViewerContext,
) -> Result<Vec<ProjectSummary>, CoreError> {
    let Some(profile_id) = viewer.profile_id() else {
        return Err(CoreError::authentication_required());
    };
    let sql = format!(
        "{SUMMARY_SELECT} JOIN project_saves sv ON sv.project_id = p.id \
         WHERE sv.profile_id = ? ORDER BY p.created_at DESC, p.id DESC"
    );
    let mut stmt = conn.prepare(&sql).map_err(storage_err)?;
    let mut rows: Vec<ProjectSummary> = stmt
        .query_map([profile_id.as_str()], summary_from_row)
        .map_err(storage_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(storage_err)?;
    rows.retain(|row| {
        // Saved rows belong to arbitrary owners; only the resolver knows
        // which are still readable.
        let owner = owner_of(conn, &row.id);
        match owner {
            Some(owner) => can_view(viewer, &owner, row.visibility),
            None => false,
        }
    });
    attach_skills(conn, &mut rows)?;
    Ok(rows)
}

fn owner_of(conn: &Connection, project_id: &ProjectId) -> Option<ProfileId> {
    conn.query_row(
        "SELECT profile_id FROM projects WHERE id = ?1",
        [project_id.as_str()],
        |row| row.get::<_, String>(0),
    )
    .ok()
    .and_then(|raw| ProfileId::parse(&raw).ok())
}

/// Profile-page header aggregates, over PUBLIC projects only.
pub fn profile_stats(conn: &Connection, profile_id: &ProfileId) -> Result<ProfileStats, CoreError> {
    conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(likes_count), 0), COALESCE(SUM(views_count), 0)
         FROM projects WHERE profile_id = ?1 AND visibility = 'PUBLIC'",
        [profile_id.as_str()],
        |row| {
            Ok(ProfileStats {
                project_count: row.get::<_, i64>(0)?.max(0) as u64,
                total_likes: row.get::<_, i64>(1)?.max(0) as u64,
                total_views: row.get::<_, i64>(2)?.max(0) as u64,
            })
        },
    )
    .map_err(storage_err)
}

#[cfg(test)]
mod directory_tests;
