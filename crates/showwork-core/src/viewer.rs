use showwork_model::ProfileId;

/// Explicit caller identity, passed into every core operation. There is no
/// ambient "current user"; an access-control decision is auditable at the
/// call site that constructed this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerContext {
    Anonymous,
    Authenticated(ProfileId),
}

impl ViewerContext {
    #[must_use]
    pub fn profile_id(&self) -> Option<&ProfileId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(id) => Some(id),
        }
    }

    #[must_use]
    pub fn is_owner_of(&self, owner: &ProfileId) -> bool {
        self.profile_id() == Some(owner)
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}
