// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{storage_err, NOW_UTC_SQL};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Row};
use showwork_core::{CoreError, ViewerContext};
use showwork_model::{NewProfile, Profile, ProfileId, ProfilePatch, Username};

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    let id: String = row.get(0)?;
    let username: String = row.get(2)?;
    // Rows are validated at write time; re-parsing here only guards
    // against manual edits to the database file.
    Ok(Profile {
        id: ProfileId::parse(&id)
            .map_err(|e| rusqlite::Error::InvalidParameterName(e.to_string()))?,
        account_id: row.get(1)?,
        username: Username::parse(&username)
            .map_err(|e| rusqlite::Error::InvalidParameterName(e.to_string()))?,
        full_name: row.get(3)?,
        headline: row.get(4)?,
        bio: row.get(5)?,
        avatar_url: row.get(6)?,
        github_url: row.get(7)?,
        linkedin_url: row.get(8)?,
        website_url: row.get(9)?,
        open_to_work: row.get::<_, i64>(10)? != 0,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

const PROFILE_COLUMNS: &str = "id, account_id, username, full_name, headline, bio, avatar_url, \
     github_url, linkedin_url, website_url, open_to_work, created_at, updated_at";

/// Registers the profile for an externally authenticated account. A taken
/// username surfaces as a conflict.
pub fn create_profile(conn: &Connection, new: &NewProfile) -> Result<Profile, CoreError> {
    new.validate()?;
    let id = ProfileId::generate();
    conn.execute(
        &format!(
            "INSERT INTO profiles (id, account_id, username, full_name, headline, bio, avatar_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, {NOW_UTC_SQL}, {NOW_UTC_SQL})"
        ),
        params![
            id.as_str(),
            new.account_id,
            new.username.as_str(),
            new.full_name,
            new.headline,
            new.bio,
            new.avatar_url,
        ],
    )
    .map_err(storage_err)?;
    get_profile(conn, &id)?.ok_or_else(|| CoreError::not_found("profile"))
}

pub fn get_profile(conn: &Connection, id: &ProfileId) -> Result<Option<Profile>, CoreError> {
    conn.query_row(
        &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
        [id.as_str()],
        profile_from_row,
    )
    .optional()
    .map_err(storage_err)
}

pub fn get_profile_by_username(
    conn: &Connection,
    username: &Username,
) -> Result<Option<Profile>, CoreError> {
    conn.query_row(
        &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE username = ?1"),
        [username.as_str()],
        profile_from_row,
    )
    .optional()
    .map_err(storage_err)
}

/// Settings update for the caller's own profile. A username move that
/// lands on a taken handle surfaces as a conflict via the UNIQUE
/// constraint, inside the same transaction as the rest of the patch.
pub fn update_profile(
    conn: &mut Connection,
    owner: &ViewerContext,
    patch: &ProfilePatch,
) -> Result<Profile, CoreError> {
    let Some(profile_id) = owner.profile_id().cloned() else {
        return Err(CoreError::authentication_required());
    };
    patch.validate()?;
    if patch.is_empty() {
        return Err(CoreError::validation("patch must change at least one field"));
    }

    let tx = conn
        .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)
        .map_err(storage_err)?;

    let mut set_parts: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    let mut push = |part: &'static str, value: Value, parts: &mut Vec<&str>| {
        parts.push(part);
        values.push(value);
    };
    if let Some(username) = &patch.username {
        push("username = ?", Value::Text(username.clone()), &mut set_parts);
    }
    if let Some(full_name) = &patch.full_name {
        push("full_name = ?", Value::Text(full_name.clone()), &mut set_parts);
    }
    if let Some(headline) = &patch.headline {
        push("headline = ?", Value::Text(headline.clone()), &mut set_parts);
    }
    if let Some(bio) = &patch.bio {
        push("bio = ?", Value::Text(bio.clone()), &mut set_parts);
    }
    if let Some(avatar_url) = &patch.avatar_url {
        push("avatar_url = ?", Value::Text(avatar_url.clone()), &mut set_parts);
    }
    if let Some(github_url) = &patch.github_url {
        push("github_url = ?", Value::Text(github_url.clone()), &mut set_parts);
    }
    if let Some(linkedin_url) = &patch.linkedin_url {
        push(
            "linkedin_url = ?",
            Value::Text(linkedin_url.clone()),
            &mut set_parts,
        );
    }
    if let Some(website_url) = &patch.website_url {
        push(
            "website_url = ?",
            Value::Text(website_url.clone()),
            &mut set_parts,
        );
    }
    if let Some(open_to_work) = patch.open_to_work {
        push(
            "open_to_work = ?",
            Value::Integer(i64::from(open_to_work)),
            &mut set_parts,
        );
    }

    let sql = format!(
        "UPDATE profiles SET {}, updated_at = {NOW_UTC_SQL} WHERE id = ?",
        set_parts.join(", ")
    );
    values.push(Value::Text(profile_id.as_str().to_string()));
    let changed = tx
        .execute(&sql, params_from_iter(values.iter()))
        .map_err(storage_err)?;
    if changed == 0 {
        return Err(CoreError::not_found("profile"));
    }
    let profile =
        get_profile(&tx, &profile_id)?.ok_or_else(|| CoreError::not_found("profile"))?;
    tx.commit().map_err(storage_err)?;
    Ok(profile)
}

/// Account deletion. Cascades to owned projects, which in turn cascade to
/// engagement records and skill links; likes/saves this profile placed on
/// other projects are removed by the profile-side cascade.
pub fn delete_profile(conn: &Connection, id: &ProfileId) -> Result<(), CoreError> {
    let changed = conn
        .execute("DELETE FROM profiles WHERE id = ?1", [id.as_str()])
        .map_err(storage_err)?;
    if changed == 0 {
        return Err(CoreError::not_found("profile"));
    }
    Ok(())
}

/// Issues an opaque bearer token for a profile. Stand-in for the external
/// identity provider; production swaps this out behind the server's
/// `IdentityProvider` seam.
pub fn issue_token(conn: &Connection, profile_id: &ProfileId) -> Result<String, CoreError> {
    let token = uuid::Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO api_tokens (token, profile_id) VALUES (?1, ?2)",
        params![token, profile_id.as_str()],
    )
    .map_err(storage_err)?;
    Ok(token)
}

pub fn resolve_token(conn: &Connection, token: &str) -> Result<Option<ProfileId>, CoreError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT profile_id FROM api_tokens WHERE token = ?1",
            [token],
            |row| row.get(0),
        )
        .optional()
        .map_err(storage_err)?;
    match raw {
        Some(raw) => Ok(Some(ProfileId::parse(&raw)?)),
        None => Ok(None),
    }
}
