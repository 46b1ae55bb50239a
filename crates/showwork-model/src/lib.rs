// SPDX-License-Identifier: MIT OR Apache-2.0
#![forbid(unsafe_code)]

pub const CRATE_NAME: &str = "showwork-model";

mod ids;
mod profile;
mod project;

pub use ids::{ParseError, ProfileId, ProjectId, SessionId, SkillName, Username};
pub use profile::{NewProfile, Profile, ProfilePatch, ProfileStats};
pub use project::{
    derive_slug, Category, Project, ProjectAuthor, ProjectDraft, ProjectPatch, ProjectStatus,
    ProjectSummary, Visibility, FULL_DESC_MAX_LEN, SHORT_DESC_MAX_LEN, TITLE_MAX_LEN, URL_MAX_LEN,
};
