use async_trait::async_trait;
use rusqlite::Connection;
use showwork_core::CoreError;
use showwork_model::ProfileId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The seam to the external auth provider: "who is the current caller".
/// The shipped implementation reads the token table; production swaps in
/// the real provider here.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn profile_for_token(&self, token: &str) -> Result<Option<ProfileId>, CoreError>;
}

pub struct TokenIdentity {
    db: Arc<Mutex<Connection>>,
}

impl TokenIdentity {
    #[must_use]
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityProvider for TokenIdentity {
    async fn profile_for_token(&self, token: &str) -> Result<Option<ProfileId>, CoreError> {
        let conn = self.db.lock().await;
        showwork_store::resolve_token(&conn, token)
    }
}

/// Fixed token map for tests.
#[derive(Default)]
pub struct FakeIdentity {
    pub tokens: HashMap<String, ProfileId>,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn profile_for_token(&self, token: &str) -> Result<Option<ProfileId>, CoreError> {
        Ok(self.tokens.get(token).cloned())
    }
}
