use super::*;
use rusqlite::Connection;
use showwork_core::ViewerContext;
use showwork_model::{ProjectPatch, Visibility};
use showwork_store::testing::{draft, mk_profile, mk_project, setup_conn};

fn seed_directory(conn: &mut Connection) -> (showwork_model::Profile, showwork_model::Profile) {
    let alice = mk_profile(conn, "alice");
    let bob = mk_profile(conn, "bob");

    // created_at granularity is milliseconds; rows inserted back to back
    // may tie, which is what the id tie-break is for.
    mk_project(conn, &alice, "Public One", Visibility::Public);
    mk_project(conn, &alice, "Hidden Draft", Visibility::Draft);
    mk_project(conn, &alice, "Hidden Private", Visibility::Private);
    mk_project(conn, &bob, "Public Two", Visibility::Public);
    (alice, bob)
}

#[test]
fn directory_never_leaks_non_public_rows() {
    let mut conn = setup_conn();
    seed_directory(&mut conn);

    for sort in [
        DirectorySort::Recent,
        DirectorySort::Popular,
        DirectorySort::Trending,
    ] {
        let page = list_public_projects(
            &conn,
            &DirectoryFilter {
                sort,
                ..Default::default()
            },
            &DirectoryLimits::default(),
        )
        .expect("list");
        assert_eq!(page.rows.len(), 2, "sort {}", sort.as_str());
        assert!(page
            .rows
            .iter()
            .all(|row| row.visibility == Visibility::Public));
    }
}

#[test]
fn popular_orders_by_likes_with_stable_ties() {
    let mut conn = setup_conn();
    let alice = mk_profile(&mut conn, "alice");
    let bob = mk_profile(&mut conn, "bob");
    let liked = mk_project(&mut conn, &alice, "Liked", Visibility::Public);
    mk_project(&mut conn, &alice, "Unliked", Visibility::Public);
    showwork_store::toggle_like(
        &mut conn,
        &ViewerContext::Authenticated(bob.id.clone()),
        &liked.id,
    )
    .expect("like");

    let page = list_public_projects(
        &conn,
        &DirectoryFilter {
            sort: DirectorySort::Popular,
            ..Default::default()
        },
        &DirectoryLimits::default(),
    )
    .expect("list");
    assert_eq!(page.rows[0].title, "Liked");
    assert_eq!(page.rows[0].likes_count, 1);
}

#[test]
fn trending_breaks_like_ties_by_views() {
    let mut conn = setup_conn();
    let alice = mk_profile(&mut conn, "alice");
    let viewed = mk_project(&mut conn, &alice, "Viewed", Visibility::Public);
    mk_project(&mut conn, &alice, "Quiet", Visibility::Public);
    showwork_store::increment_views(&conn, &viewed.id).expect("view");

    let page = list_public_projects(
        &conn,
        &DirectoryFilter {
            sort: DirectorySort::Trending,
            ..Default::default()
        },
        &DirectoryLimits::default(),
    )
    .expect("list");
    assert_eq!(page.rows[0].title, "Viewed");
}

#[test]
fn offset_pagination_covers_all_rows_without_repeats() {
    let mut conn = setup_conn();
    let alice = mk_profile(&mut conn, "alice");
    for i in 0..5 {
        mk_project(&mut conn, &alice, &format!("Project {i}"), Visibility::Public);
    }

    let limits = DirectoryLimits::default();
    let mut seen = std::collections::BTreeSet::new();
    let mut offset = 0;
    loop {
        let page = list_public_projects(
            &conn,
            &DirectoryFilter {
                limit: 2,
                offset,
                ..Default::default()
            },
            &limits,
        )
        .expect("page");
        for row in &page.rows {
            assert!(seen.insert(row.id.clone()), "row repeated across pages");
        }
        match page.next_offset {
            Some(next) => offset = next,
            None => break,
        }
    }
    assert_eq!(seen.len(), 5);
}

#[test]
fn category_and_skill_filters_narrow_results() {
    let mut conn = setup_conn();
    let alice = mk_profile(&mut conn, "alice");
    let owner = ViewerContext::Authenticated(alice.id.clone());
    let mut d = draft("Rust Backend", Visibility::Public);
    d.category = Some(showwork_model::Category::Backend);
    d.skills = vec!["Rust".to_string()];
    showwork_store::create_project(&mut conn, &owner, &d).expect("create");
    mk_project(&mut conn, &alice, "Untagged", Visibility::Public);

    let page = list_public_projects(
        &conn,
        &DirectoryFilter {
            category: Some(showwork_model::Category::Backend),
            ..Default::default()
        },
        &DirectoryLimits::default(),
    )
    .expect("by category");
    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0].skills, vec!["Rust".to_string()]);

    let page = list_public_projects(
        &conn,
        &DirectoryFilter {
            skill: Some("Rust".to_string()),
            ..Default::default()
        },
        &DirectoryLimits::default(),
    )
    .expect("by skill");
    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0].title, "Rust Backend");
}

#[test]
fn profile_listing_respects_viewer_identity() {
    let mut conn = setup_conn();
    let (alice, bob) = seed_directory(&mut conn);

    let as_stranger = list_profile_projects(
        &conn,
        &alice.id,
        &ViewerContext::Authenticated(bob.id.clone()),
    )
    .expect("stranger listing");
    assert_eq!(as_stranger.len(), 1);
    assert_eq!(as_stranger[0].title, "Public One");

    let as_owner = list_profile_projects(
        &conn,
        &alice.id,
        &ViewerContext::Authenticated(alice.id.clone()),
    )
    .expect("owner listing");
    assert_eq!(as_owner.len(), 3);
}

#[test]
fn saved_list_drops_projects_taken_private() {
    let mut conn = setup_conn();
    let alice = mk_profile(&mut conn, "alice");
    let bob = mk_profile(&mut conn, "bob");
    let owner = ViewerContext::Authenticated(alice.id.clone());
    let viewer = ViewerContext::Authenticated(bob.id.clone());
    let project = mk_project(&mut conn, &alice, "Saved Thing", Visibility::Public);
    showwork_store::toggle_save(&mut conn, &viewer, &project.id).expect("save");

    assert_eq!(list_saved_projects(&conn, &viewer).expect("saved").len(), 1);

    showwork_store::update_project(
        &mut conn,
        &owner,
        &project.id,
        &ProjectPatch {
            visibility: Some(Visibility::Private),
            ..Default::default()
        },
    )
    .expect("hide");
    assert!(list_saved_projects(&conn, &viewer).expect("saved").is_empty());
}

#[test]
fn profile_stats_count_public_projects_only() {
    let mut conn = setup_conn();
    let (alice, bob) = seed_directory(&mut conn);
    let public = list_profile_projects(&conn, &alice.id, &ViewerContext::Anonymous)
        .expect("public rows");
    showwork_store::toggle_like(
        &mut conn,
        &ViewerContext::Authenticated(bob.id.clone()),
        &public[0].id,
    )
    .expect("like");
    showwork_store::increment_views(&conn, &public[0].id).expect("view");

    let stats = profile_stats(&conn, &alice.id).expect("stats");
    assert_eq!(stats.project_count, 1);
    assert_eq!(stats.total_likes, 1);
    assert_eq!(stats.total_views, 1);
}

#[test]
fn invalid_limit_and_offset_are_rejected() {
    let conn = setup_conn();
    let limits = DirectoryLimits::default();
    let err = list_public_projects(
        &conn,
        &DirectoryFilter {
            limit: 0,
            ..Default::default()
        },
        &limits,
    )
    .expect_err("zero limit");
    assert_eq!(err.code, showwork_core::CoreErrorCode::Validation);

    let err = list_public_projects(
        &conn,
        &DirectoryFilter {
            offset: limits.max_offset + 1,
            ..Default::default()
        },
        &limits,
    )
    .expect_err("huge offset");
    assert_eq!(err.code, showwork_core::CoreErrorCode::Validation);
}
