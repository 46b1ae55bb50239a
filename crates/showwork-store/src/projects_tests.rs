use super::testing::{draft, mk_profile, mk_project, setup_conn};
use super::*;
use crate::projects::read_skills;
use showwork_core::{CoreErrorCode, ViewerContext};
use showwork_model::{ProjectPatch, Visibility};

#[test]
fn draft_resolves_for_owner_and_hides_from_others() {
    let mut conn = setup_conn();
    let alice = mk_profile(&conn, "alice");
    let bob = mk_profile(&conn, "bob");
    let project = mk_project(&mut conn, &alice, "X", Visibility::Draft);

    let err = resolve_project(&conn, &project.id, &ViewerContext::Anonymous)
        .expect_err("anonymous must not see draft");
    assert_eq!(err.code, CoreErrorCode::NotFound);

    let err = resolve_project(
        &conn,
        &project.id,
        &ViewerContext::Authenticated(bob.id.clone()),
    )
    .expect_err("stranger must not see draft");
    assert_eq!(err.code, CoreErrorCode::NotFound);

    let view = resolve_project(
        &conn,
        &project.id,
        &ViewerContext::Authenticated(alice.id.clone()),
    )
    .expect("owner override");
    assert!(view.is_owner);
    assert_eq!(view.project.title, "X");
}

#[test]
fn create_links_known_skills_and_skips_unknown_names() {
    let mut conn = setup_conn();
    let alice = mk_profile(&conn, "alice");
    let mut d = draft("Tagged", Visibility::Public);
    d.skills = vec![
        "Rust".to_string(),
        "Underwater Basket Weaving".to_string(),
        "React".to_string(),
    ];
    let project = create_project(&mut conn, &ViewerContext::Authenticated(alice.id.clone()), &d)
        .expect("create");

    let view = resolve_project(&conn, &project.id, &ViewerContext::Anonymous).expect("resolve");
    assert_eq!(view.skills, vec!["React".to_string(), "Rust".to_string()]);
}

#[test]
fn title_update_rederives_slug() {
    let mut conn = setup_conn();
    let alice = mk_profile(&conn, "alice");
    let owner = ViewerContext::Authenticated(alice.id.clone());
    let project = mk_project(&mut conn, &alice, "Old Name", Visibility::Public);
    assert_eq!(project.slug, "old-name");

    let updated = update_project(
        &mut conn,
        &owner,
        &project.id,
        &ProjectPatch {
            title: Some("New & Improved Name".to_string()),
            ..Default::default()
        },
    )
    .expect("update");
    assert_eq!(updated.slug, "new-improved-name");
    assert_eq!(updated.title, "New & Improved Name");
}

#[test]
fn non_owner_edit_of_public_project_is_ownership_violation() {
    let mut conn = setup_conn();
    let alice = mk_profile(&conn, "alice");
    let bob = mk_profile(&conn, "bob");
    let project = mk_project(&mut conn, &alice, "X", Visibility::Public);

    let err = update_project(
        &mut conn,
        &ViewerContext::Authenticated(bob.id.clone()),
        &project.id,
        &ProjectPatch {
            title: Some("Hijacked".to_string()),
            ..Default::default()
        },
    )
    .expect_err("non-owner must not edit");
    assert_eq!(err.code, CoreErrorCode::OwnershipViolation);
}

#[test]
fn non_owner_edit_of_private_project_stays_not_found() {
    let mut conn = setup_conn();
    let alice = mk_profile(&conn, "alice");
    let bob = mk_profile(&conn, "bob");
    let project = mk_project(&mut conn, &alice, "X", Visibility::Private);

    let err = delete_project(
        &mut conn,
        &ViewerContext::Authenticated(bob.id.clone()),
        &project.id,
    )
    .expect_err("hidden project must not leak via delete");
    assert_eq!(err.code, CoreErrorCode::NotFound);
}

#[test]
fn publish_flips_visibility_only() {
    let mut conn = setup_conn();
    let alice = mk_profile(&conn, "alice");
    let owner = ViewerContext::Authenticated(alice.id.clone());
    let project = mk_project(&mut conn, &alice, "Draft Thing", Visibility::Draft);

    let published = publish_project(&mut conn, &owner, &project.id).expect("publish");
    assert_eq!(published.visibility, Visibility::Public);
    assert_eq!(published.title, project.title);
}

#[test]
fn delete_cascades_engagement_records() {
    let mut conn = setup_conn();
    let alice = mk_profile(&conn, "alice");
    let bob = mk_profile(&conn, "bob");
    let owner = ViewerContext::Authenticated(alice.id.clone());
    let project = mk_project(&mut conn, &alice, "X", Visibility::Public);
    toggle_like(
        &mut conn,
        &ViewerContext::Authenticated(bob.id.clone()),
        &project.id,
    )
    .expect("like");

    delete_project(&mut conn, &owner, &project.id).expect("delete");
    let orphans: i64 = conn
        .query_row("SELECT COUNT(*) FROM project_likes", [], |row| row.get(0))
        .expect("count");
    assert_eq!(orphans, 0);
    let err = resolve_project(&conn, &project.id, &owner).expect_err("gone");
    assert_eq!(err.code, CoreErrorCode::NotFound);
}

#[test]
fn empty_patch_is_rejected_before_any_write() {
    let mut conn = setup_conn();
    let alice = mk_profile(&conn, "alice");
    let owner = ViewerContext::Authenticated(alice.id.clone());
    let project = mk_project(&mut conn, &alice, "X", Visibility::Public);

    let err = update_project(&mut conn, &owner, &project.id, &ProjectPatch::default())
        .expect_err("empty patch");
    assert_eq!(err.code, CoreErrorCode::Validation);
}

#[test]
fn duplicate_username_is_a_conflict() {
    let conn = setup_conn();
    mk_profile(&conn, "alice");
    let err = create_profile(
        &conn,
        &showwork_model::NewProfile {
            account_id: "acct-other".to_string(),
            username: showwork_model::Username::parse("alice").expect("username"),
            full_name: "Another Alice".to_string(),
            headline: None,
            bio: None,
            avatar_url: None,
        },
    )
    .expect_err("username is unique");
    assert_eq!(err.code, CoreErrorCode::Conflict);
}

#[test]
fn skills_only_patch_still_bumps_updated_at() {
    let mut conn = setup_conn();
    let alice = mk_profile(&conn, "alice");
    let owner = ViewerContext::Authenticated(alice.id.clone());
    let mut d = draft("Tagged", Visibility::Public);
    d.skills = vec!["Rust".to_string()];
    let project = create_project(&mut conn, &owner, &d).expect("create");

    conn.execute(
        "UPDATE projects SET updated_at = '2000-01-01T00:00:00.000Z' WHERE id = ?1",
        [project.id.as_str()],
    )
    .expect("age the row");

    let updated = update_project(
        &mut conn,
        &owner,
        &project.id,
        &ProjectPatch {
            skills: Some(vec!["Go".to_string()]),
            ..Default::default()
        },
    )
    .expect("replace skills");
    assert_ne!(updated.updated_at, "2000-01-01T00:00:00.000Z");
    let skills = read_skills(&conn, &project.id).expect("skills");
    assert_eq!(skills, vec!["Go".to_string()]);
}

#[test]
fn settings_update_edits_own_profile_fields() {
    let mut conn = setup_conn();
    let alice = mk_profile(&conn, "alice");
    let owner = ViewerContext::Authenticated(alice.id.clone());

    let updated = update_profile(
        &mut conn,
        &owner,
        &showwork_model::ProfilePatch {
            username: Some("alice-two".to_string()),
            headline: Some("builds things".to_string()),
            open_to_work: Some(true),
            ..Default::default()
        },
    )
    .expect("update settings");
    assert_eq!(updated.username.as_str(), "alice-two");
    assert_eq!(updated.headline.as_deref(), Some("builds things"));
    assert!(updated.open_to_work);

    let err = update_profile(
        &mut conn,
        &ViewerContext::Anonymous,
        &showwork_model::ProfilePatch {
            headline: Some("x".to_string()),
            ..Default::default()
        },
    )
    .expect_err("anonymous settings");
    assert_eq!(err.code, CoreErrorCode::AuthenticationRequired);

    let err = update_profile(&mut conn, &owner, &showwork_model::ProfilePatch::default())
        .expect_err("empty patch");
    assert_eq!(err.code, CoreErrorCode::Validation);
}

#[test]
fn username_move_onto_taken_handle_is_a_conflict() {
    let mut conn = setup_conn();
    let alice = mk_profile(&conn, "alice");
    mk_profile(&conn, "bob");

    let err = update_profile(
        &mut conn,
        &ViewerContext::Authenticated(alice.id.clone()),
        &showwork_model::ProfilePatch {
            username: Some("bob".to_string()),
            ..Default::default()
        },
    )
    .expect_err("handle is taken");
    assert_eq!(err.code, CoreErrorCode::Conflict);

    // The failed move must not have touched the row.
    let unchanged = get_profile(&conn, &alice.id)
        .expect("fetch")
        .expect("present");
    assert_eq!(unchanged.username.as_str(), "alice");
}

#[test]
fn profile_delete_takes_projects_and_placed_engagement_along() {
    let mut conn = setup_conn();
    let alice = mk_profile(&conn, "alice");
    let bob = mk_profile(&conn, "bob");
    let kept = mk_project(&mut conn, &alice, "Stays", Visibility::Public);
    mk_project(&mut conn, &bob, "Goes", Visibility::Public);
    toggle_like(
        &mut conn,
        &ViewerContext::Authenticated(bob.id.clone()),
        &kept.id,
    )
    .expect("like");

    delete_profile(&conn, &bob.id).expect("delete profile");

    let projects: i64 = conn
        .query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))
        .expect("count projects");
    assert_eq!(projects, 1);
    // Likes bob placed elsewhere are gone too; the counter cache is the
    // one thing the cascade cannot fix.
    let likes: i64 = conn
        .query_row("SELECT COUNT(*) FROM project_likes", [], |row| row.get(0))
        .expect("count likes");
    assert_eq!(likes, 0);
}

#[test]
fn tokens_resolve_to_their_profile() {
    let conn = setup_conn();
    let alice = mk_profile(&conn, "alice");
    let token = issue_token(&conn, &alice.id).expect("issue");
    let resolved = resolve_token(&conn, &token).expect("resolve");
    assert_eq!(resolved, Some(alice.id.clone()));
    assert_eq!(resolve_token(&conn, "nope").expect("resolve"), None);
}
