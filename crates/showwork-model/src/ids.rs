// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const ID_MAX_LEN: usize = 64;
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 39;
pub const SESSION_ID_MAX_LEN: usize = 128;
pub const SKILL_NAME_MAX_LEN: usize = 48;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    Empty(&'static str),
    Trimmed(&'static str),
    TooShort(&'static str, usize),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str, &'static str),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} must not be empty"),
            Self::Trimmed(name) => {
                write!(f, "{name} must not contain leading/trailing whitespace")
            }
            Self::TooShort(name, min) => write!(f, "{name} is shorter than min length {min}"),
            Self::TooLong(name, max) => write!(f, "{name} exceeds max length {max}"),
            Self::InvalidFormat(name, rule) => write!(f, "{name} is invalid: {rule}"),
        }
    }
}

impl std::error::Error for ParseError {}

fn check_opaque_id(name: &'static str, input: &str) -> Result<(), ParseError> {
    if input.is_empty() {
        return Err(ParseError::Empty(name));
    }
    if input.trim() != input {
        return Err(ParseError::Trimmed(name));
    }
    if input.len() > ID_MAX_LEN {
        return Err(ParseError::TooLong(name, ID_MAX_LEN));
    }
    if !input
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ParseError::InvalidFormat(
            name,
            "only ascii alphanumerics and '-' allowed",
        ));
    }
    Ok(())
}

/// Opaque identifier of a profile row. Distinct from the external auth
/// provider's account id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        check_opaque_id("profile_id", input)?;
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        check_opaque_id("project_id", input)?;
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Globally unique, mutable handle of a profile. Lowercase alphanumerics
/// and interior hyphens, GitHub-handle sized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty("username"));
        }
        if input.trim() != input {
            return Err(ParseError::Trimmed("username"));
        }
        if input.len() < USERNAME_MIN_LEN {
            return Err(ParseError::TooShort("username", USERNAME_MIN_LEN));
        }
        if input.len() > USERNAME_MAX_LEN {
            return Err(ParseError::TooLong("username", USERNAME_MAX_LEN));
        }
        if !input
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ParseError::InvalidFormat(
                "username",
                "only lowercase alphanumerics and '-' allowed",
            ));
        }
        if input.starts_with('-') || input.ends_with('-') {
            return Err(ParseError::InvalidFormat(
                "username",
                "must not start or end with '-'",
            ));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Client-generated identifier used only to deduplicate view counting.
/// Not an authentication construct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty("session_id"));
        }
        if input.trim() != input {
            return Err(ParseError::Trimmed("session_id"));
        }
        if input.len() > SESSION_ID_MAX_LEN {
            return Err(ParseError::TooLong("session_id", SESSION_ID_MAX_LEN));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A technology tag name. The vocabulary is curated: linking a project to
/// a name with no skills row silently skips that name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SkillName(String);

impl SkillName {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty("skill"));
        }
        if input.trim() != input {
            return Err(ParseError::Trimmed("skill"));
        }
        if input.len() > SKILL_NAME_MAX_LEN {
            return Err(ParseError::TooLong("skill", SKILL_NAME_MAX_LEN));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
