// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::storage_err;
use rusqlite::Connection;
use showwork_core::CoreError;

/// Creates all tables and indexes. Idempotent.
pub fn bootstrap(conn: &Connection) -> Result<(), CoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS profiles (
          id            TEXT PRIMARY KEY,
          account_id    TEXT NOT NULL UNIQUE,
          username      TEXT NOT NULL UNIQUE,
          full_name     TEXT NOT NULL,
          headline      TEXT,
          bio           TEXT,
          avatar_url    TEXT,
          github_url    TEXT,
          linkedin_url  TEXT,
          website_url   TEXT,
          open_to_work  INTEGER NOT NULL DEFAULT 0,
          created_at    TEXT NOT NULL,
          updated_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS projects (
          id              TEXT PRIMARY KEY,
          profile_id      TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
          title           TEXT NOT NULL,
          slug            TEXT NOT NULL,
          short_desc      TEXT NOT NULL,
          full_desc       TEXT NOT NULL DEFAULT '',
          cover_image_url TEXT,
          github_url      TEXT,
          live_url        TEXT,
          visibility      TEXT NOT NULL DEFAULT 'DRAFT',
          status          TEXT NOT NULL DEFAULT 'IN_PROGRESS',
          category        TEXT,
          likes_count     INTEGER NOT NULL DEFAULT 0,
          saves_count     INTEGER NOT NULL DEFAULT 0,
          views_count     INTEGER NOT NULL DEFAULT 0,
          created_at      TEXT NOT NULL,
          updated_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS skills (
          id   INTEGER PRIMARY KEY,
          name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS project_skills (
          project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
          skill_id   INTEGER NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
          PRIMARY KEY (project_id, skill_id)
        );

        CREATE TABLE IF NOT EXISTS project_likes (
          project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
          profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
          PRIMARY KEY (project_id, profile_id)
        );

        CREATE TABLE IF NOT EXISTS project_saves (
          project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
          profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
          PRIMARY KEY (project_id, profile_id)
        );

        CREATE TABLE IF NOT EXISTS api_tokens (
          token      TEXT PRIMARY KEY,
          profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_projects_profile
          ON projects(profile_id, created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_projects_directory_recent
          ON projects(visibility, created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_projects_directory_popular
          ON projects(visibility, likes_count DESC);
        CREATE INDEX IF NOT EXISTS idx_project_skills_skill
          ON project_skills(skill_id);
        CREATE INDEX IF NOT EXISTS idx_project_likes_profile
          ON project_likes(profile_id);
        CREATE INDEX IF NOT EXISTS idx_project_saves_profile
          ON project_saves(profile_id);
        ",
    )
    .map_err(storage_err)
}

/// The starter tag vocabulary. Tags are curated: project writes never
/// create skills rows, they only link to existing ones.
pub const DEFAULT_SKILLS: [&str; 16] = [
    "React",
    "TypeScript",
    "Next.js",
    "Rust",
    "Python",
    "Go",
    "Docker",
    "AWS",
    "PostgreSQL",
    "Firebase",
    "TensorFlow",
    "React Native",
    "D3.js",
    "OpenAI",
    "Tailwind",
    "Node.js",
];

pub fn seed_skills(conn: &Connection, names: &[&str]) -> Result<(), CoreError> {
    let mut stmt = conn
        .prepare("INSERT OR IGNORE INTO skills (name) VALUES (?1)")
        .map_err(storage_err)?;
    for name in names {
        stmt.execute([name]).map_err(storage_err)?;
    }
    Ok(())
}

pub fn seed_default_skills(conn: &Connection) -> Result<(), CoreError> {
    seed_skills(conn, &DEFAULT_SKILLS)
}
