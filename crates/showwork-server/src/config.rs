use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub bind_addr: String,
    /// None runs against an in-memory database (dev/test mode).
    pub db_path: Option<PathBuf>,
    pub max_body_bytes: usize,
    pub default_page_size: usize,
    pub max_page_size: usize,
    /// Upper bound on the in-process view-dedup set. Reaching it clears
    /// the set, so long-lived processes trade an occasional double count
    /// for bounded memory.
    pub view_dedup_max_entries: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            db_path: None,
            max_body_bytes: 64 * 1024,
            default_page_size: 20,
            max_page_size: 50,
            view_dedup_max_entries: 100_000,
        }
    }
}
