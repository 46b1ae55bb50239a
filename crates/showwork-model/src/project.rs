// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::ids::{ParseError, ProfileId, ProjectId, Username};
use serde::{Deserialize, Serialize};

pub const TITLE_MAX_LEN: usize = 120;
pub const SHORT_DESC_MAX_LEN: usize = 160;
pub const FULL_DESC_MAX_LEN: usize = 20_000;
pub const URL_MAX_LEN: usize = 2048;

/// Access level on a project. DRAFT and PRIVATE are both owner-only; the
/// distinction is intent (work in progress vs intentionally unlisted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    Public,
    Draft,
    Private,
}

impl Visibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Draft => "DRAFT",
            Self::Private => "PRIVATE",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        match raw {
            "PUBLIC" => Ok(Self::Public),
            "DRAFT" => Ok(Self::Draft),
            "PRIVATE" => Ok(Self::Private),
            _ => Err(ParseError::InvalidFormat(
                "visibility",
                "expected PUBLIC, DRAFT or PRIVATE",
            )),
        }
    }

    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Completed,
    InProgress,
    OnHold,
}

impl ProjectStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "COMPLETED",
            Self::InProgress => "IN_PROGRESS",
            Self::OnHold => "ON_HOLD",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        match raw {
            "COMPLETED" => Ok(Self::Completed),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "ON_HOLD" => Ok(Self::OnHold),
            _ => Err(ParseError::InvalidFormat(
                "status",
                "expected COMPLETED, IN_PROGRESS or ON_HOLD",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fullstack,
    Frontend,
    Backend,
    Ml,
    Mobile,
    Devops,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fullstack => "fullstack",
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::Ml => "ml",
            Self::Mobile => "mobile",
            Self::Devops => "devops",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        match raw {
            "fullstack" => Ok(Self::Fullstack),
            "frontend" => Ok(Self::Frontend),
            "backend" => Ok(Self::Backend),
            "ml" => Ok(Self::Ml),
            "mobile" => Ok(Self::Mobile),
            "devops" => Ok(Self::Devops),
            _ => Err(ParseError::InvalidFormat(
                "category",
                "expected one of fullstack, frontend, backend, ml, mobile, devops",
            )),
        }
    }
}

/// Derives a URL slug from a title: lowercase, non-alphanumeric runs
/// collapse to a single '-', leading/trailing '-' stripped. Not unique
/// across profiles.
#[must_use]
pub fn derive_slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub profile_id: ProfileId,
    pub title: String,
    pub slug: String,
    pub short_desc: String,
    pub full_desc: String,
    pub cover_image_url: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub visibility: Visibility,
    pub status: ProjectStatus,
    pub category: Option<Category>,
    pub likes_count: u64,
    pub saves_count: u64,
    pub views_count: u64,
    pub created_at: String,
    pub updated_at: String,
}

/// Flat author record attached to directory rows. Always a single record,
/// never an array-of-one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectAuthor {
    pub username: Username,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub title: String,
    pub slug: String,
    pub short_desc: String,
    pub cover_image_url: Option<String>,
    pub visibility: Visibility,
    pub category: Option<Category>,
    pub likes_count: u64,
    pub saves_count: u64,
    pub views_count: u64,
    pub created_at: String,
    pub author: ProjectAuthor,
    pub skills: Vec<String>,
}

/// Payload for creating a project. `visibility` is the caller's choice:
/// publish sends PUBLIC, save-as-draft sends DRAFT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub title: String,
    pub short_desc: String,
    pub full_desc: String,
    pub cover_image_url: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub visibility: Visibility,
    pub status: ProjectStatus,
    pub category: Option<Category>,
    pub skills: Vec<String>,
}

impl ProjectDraft {
    pub fn validate(&self) -> Result<(), ParseError> {
        validate_title(&self.title)?;
        validate_short_desc(&self.short_desc)?;
        validate_full_desc(&self.full_desc)?;
        validate_url_opt("cover_image_url", self.cover_image_url.as_deref())?;
        validate_url_opt("github_url", self.github_url.as_deref())?;
        validate_url_opt("live_url", self.live_url.as_deref())?;
        Ok(())
    }
}

/// Partial update applied by the owner. Absent fields are left untouched;
/// a present `skills` replaces the full tag set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub short_desc: Option<String>,
    pub full_desc: Option<String>,
    pub cover_image_url: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub visibility: Option<Visibility>,
    pub status: Option<ProjectStatus>,
    pub category: Option<Category>,
    pub skills: Option<Vec<String>>,
}

impl ProjectPatch {
    pub fn validate(&self) -> Result<(), ParseError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(short_desc) = &self.short_desc {
            validate_short_desc(short_desc)?;
        }
        if let Some(full_desc) = &self.full_desc {
            validate_full_desc(full_desc)?;
        }
        validate_url_opt("cover_image_url", self.cover_image_url.as_deref())?;
        validate_url_opt("github_url", self.github_url.as_deref())?;
        validate_url_opt("live_url", self.live_url.as_deref())?;
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn validate_title(title: &str) -> Result<(), ParseError> {
    if title.trim().is_empty() {
        return Err(ParseError::Empty("title"));
    }
    if title.len() > TITLE_MAX_LEN {
        return Err(ParseError::TooLong("title", TITLE_MAX_LEN));
    }
    Ok(())
}

fn validate_short_desc(short_desc: &str) -> Result<(), ParseError> {
    if short_desc.trim().is_empty() {
        return Err(ParseError::Empty("short_desc"));
    }
    if short_desc.len() > SHORT_DESC_MAX_LEN {
        return Err(ParseError::TooLong("short_desc", SHORT_DESC_MAX_LEN));
    }
    Ok(())
}

fn validate_full_desc(full_desc: &str) -> Result<(), ParseError> {
    if full_desc.len() > FULL_DESC_MAX_LEN {
        return Err(ParseError::TooLong("full_desc", FULL_DESC_MAX_LEN));
    }
    Ok(())
}

fn validate_url_opt(name: &'static str, url: Option<&str>) -> Result<(), ParseError> {
    let Some(url) = url else { return Ok(()) };
    if url.len() > URL_MAX_LEN {
        return Err(ParseError::TooLong(name, URL_MAX_LEN));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ParseError::InvalidFormat(name, "must be an http(s) URL"));
    }
    Ok(())
}
