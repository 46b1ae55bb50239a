// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::ids::{ParseError, ProfileId, Username};
use crate::project::URL_MAX_LEN;
use serde::{Deserialize, Serialize};

pub const FULL_NAME_MAX_LEN: usize = 100;
pub const HEADLINE_MAX_LEN: usize = 160;
pub const BIO_MAX_LEN: usize = 4000;

/// The public-facing identity of an account. Exactly one per account; the
/// account id itself is opaque and owned by the external auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub id: ProfileId,
    pub account_id: String,
    pub username: Username,
    pub full_name: String,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub website_url: Option<String>,
    pub open_to_work: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub account_id: String,
    pub username: Username,
    pub full_name: String,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl NewProfile {
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.account_id.trim().is_empty() {
            return Err(ParseError::Empty("account_id"));
        }
        if self.full_name.trim().is_empty() {
            return Err(ParseError::Empty("full_name"));
        }
        if self.full_name.len() > FULL_NAME_MAX_LEN {
            return Err(ParseError::TooLong("full_name", FULL_NAME_MAX_LEN));
        }
        if let Some(headline) = &self.headline {
            if headline.len() > HEADLINE_MAX_LEN {
                return Err(ParseError::TooLong("headline", HEADLINE_MAX_LEN));
            }
        }
        if let Some(bio) = &self.bio {
            if bio.len() > BIO_MAX_LEN {
                return Err(ParseError::TooLong("bio", BIO_MAX_LEN));
            }
        }
        if let Some(avatar_url) = &self.avatar_url {
            if avatar_url.len() > URL_MAX_LEN {
                return Err(ParseError::TooLong("avatar_url", URL_MAX_LEN));
            }
        }
        Ok(())
    }
}

/// Settings-page update. Absent fields stay untouched; `username` moves
/// the globally unique handle and may therefore collide with another
/// profile's at write time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub website_url: Option<String>,
    pub open_to_work: Option<bool>,
}

impl ProfilePatch {
    pub fn validate(&self) -> Result<(), ParseError> {
        if let Some(username) = &self.username {
            Username::parse(username)?;
        }
        if let Some(full_name) = &self.full_name {
            if full_name.trim().is_empty() {
                return Err(ParseError::Empty("full_name"));
            }
            if full_name.len() > FULL_NAME_MAX_LEN {
                return Err(ParseError::TooLong("full_name", FULL_NAME_MAX_LEN));
            }
        }
        if let Some(headline) = &self.headline {
            if headline.len() > HEADLINE_MAX_LEN {
                return Err(ParseError::TooLong("headline", HEADLINE_MAX_LEN));
            }
        }
        if let Some(bio) = &self.bio {
            if bio.len() > BIO_MAX_LEN {
                return Err(ParseError::TooLong("bio", BIO_MAX_LEN));
            }
        }
        for (name, url) in [
            ("avatar_url", &self.avatar_url),
            ("github_url", &self.github_url),
            ("linkedin_url", &self.linkedin_url),
            ("website_url", &self.website_url),
        ] {
            if let Some(url) = url {
                if url.len() > URL_MAX_LEN {
                    return Err(ParseError::TooLong(name, URL_MAX_LEN));
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Aggregates shown on the profile page header, computed over the
/// profile's PUBLIC projects only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileStats {
    pub project_count: u64,
    pub total_likes: u64,
    pub total_views: u64,
}
