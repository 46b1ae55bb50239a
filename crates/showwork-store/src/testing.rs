// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory fixtures shared by this crate's tests and by downstream
//! crates' integration tests.

use crate::{bootstrap, create_profile, create_project, seed_default_skills};
use rusqlite::Connection;
use showwork_core::ViewerContext;
use showwork_model::{
    NewProfile, Profile, Project, ProjectDraft, ProjectStatus, Username, Visibility,
};

pub fn setup_conn() -> Connection {
    let conn = crate::open_in_memory().expect("open memory db");
    bootstrap(&conn).expect("schema");
    seed_default_skills(&conn).expect("seed skills");
    conn
}

pub fn mk_profile(conn: &Connection, username: &str) -> Profile {
    create_profile(
        conn,
        &NewProfile {
            account_id: format!("acct-{username}"),
            username: Username::parse(username).expect("username"),
            full_name: format!("{username} surname"),
            headline: None,
            bio: None,
            avatar_url: None,
        },
    )
    .expect("create profile")
}

pub fn draft(title: &str, visibility: Visibility) -> ProjectDraft {
    ProjectDraft {
        title: title.to_string(),
        short_desc: format!("{title} in one line"),
        full_desc: format!("{title}, at length."),
        cover_image_url: None,
        github_url: None,
        live_url: None,
        visibility,
        status: ProjectStatus::Completed,
        category: None,
        skills: Vec::new(),
    }
}

pub fn mk_project(
    conn: &mut Connection,
    owner: &Profile,
    title: &str,
    visibility: Visibility,
) -> Project {
    create_project(
        conn,
        &ViewerContext::Authenticated(owner.id.clone()),
        &draft(title, visibility),
    )
    .expect("create project")
}
