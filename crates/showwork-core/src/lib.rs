#![forbid(unsafe_code)]

pub const CRATE_NAME: &str = "showwork-core";

mod engagement;
mod error;
mod resolver;
mod viewer;

pub use engagement::{EngagementKind, EngagementResult, EngagementStatus};
pub use error::{CoreError, CoreErrorCode};
pub use resolver::{can_view, resolve_view, ProjectView};
pub use viewer::ViewerContext;
