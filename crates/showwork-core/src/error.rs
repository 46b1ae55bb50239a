use serde_json::Value;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CoreErrorCode {
    /// Absent, or present but not visible to the caller. The two cases are
    /// intentionally indistinguishable so private data cannot be enumerated.
    NotFound,
    AuthenticationRequired,
    OwnershipViolation,
    Validation,
    Conflict,
    /// The underlying store failed or timed out. Safe to retry after
    /// re-fetching authoritative state.
    TransientStorage,
    Internal,
}

impl CoreErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AuthenticationRequired => "authentication_required",
            Self::OwnershipViolation => "ownership_violation",
            Self::Validation => "validation_error",
            Self::Conflict => "conflict",
            Self::TransientStorage => "transient_storage_error",
            Self::Internal => "internal_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
    pub details: Option<Value>,
}

impl CoreError {
    #[must_use]
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub fn not_found(what: &str) -> Self {
        Self::new(CoreErrorCode::NotFound, format!("{what} not found"))
    }

    #[must_use]
    pub fn authentication_required() -> Self {
        Self::new(
            CoreErrorCode::AuthenticationRequired,
            "a signed-in profile is required for this action",
        )
    }

    #[must_use]
    pub fn ownership_violation() -> Self {
        Self::new(
            CoreErrorCode::OwnershipViolation,
            "only the owning profile may perform this action",
        )
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(CoreErrorCode::Validation, message)
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for CoreError {}

impl From<showwork_model::ParseError> for CoreError {
    fn from(err: showwork_model::ParseError) -> Self {
        Self::validation(err.to_string())
    }
}
