use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementKind {
    Like,
    Save,
}

impl EngagementKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Save => "save",
        }
    }
}

/// Outcome of a toggle. `engaged` is the resulting state for this viewer
/// and `count` the authoritative counter, so an optimistically updated
/// client can correct any drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngagementResult {
    pub engaged: bool,
    pub count: u64,
}

/// Initial button state for a project page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngagementStatus {
    pub liked: bool,
    pub saved: bool,
}
