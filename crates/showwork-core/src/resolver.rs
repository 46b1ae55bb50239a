use crate::viewer::ViewerContext;
use serde::{Deserialize, Serialize};
use showwork_model::{ProfileId, Project, ProjectAuthor, Visibility};

/// Whether `viewer` may read a project owned by `owner` with the given
/// visibility. Pure; the final authority for every single-project fetch
/// and for every row emitted by a listing that did not already filter at
/// the query level.
#[must_use]
pub fn can_view(viewer: &ViewerContext, owner: &ProfileId, visibility: Visibility) -> bool {
    visibility.is_public() || viewer.is_owner_of(owner)
}

/// The fully resolved, render-ready shape of a single project fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub author: ProjectAuthor,
    pub skills: Vec<String>,
    pub share_path: String,
    pub is_owner: bool,
}

/// Applies the visibility rule to an assembled project. `None` means the
/// caller must report "not found", never "forbidden", which would confirm
/// the project exists.
#[must_use]
pub fn resolve_view(
    viewer: &ViewerContext,
    project: Project,
    author: ProjectAuthor,
    skills: Vec<String>,
) -> Option<ProjectView> {
    if !can_view(viewer, &project.profile_id, project.visibility) {
        return None;
    }
    let share_path = format!("/project/{}", project.id.as_str());
    let is_owner = viewer.is_owner_of(&project.profile_id);
    Some(ProjectView {
        project,
        author,
        skills,
        share_path,
        is_owner,
    })
}
