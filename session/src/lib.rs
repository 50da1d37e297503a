//! Viewer session logic for GenStudio: deep-link routing, bulk-mode
//! coordination, optimistic remote mutations and cross-surface actions.

mod actions;
mod bulk;
mod compose;
mod deeplink;
mod optimistic;

pub use actions::{
    ActionDispatcher, ComposerSignal, Delivery, SurfaceChannel, DEFAULT_MOUNT_WAIT,
};
pub use bulk::{BulkAction, BulkCoordinator, BulkOutcome, PendingConfirmation};
pub use compose::Composer;
pub use deeplink::{
    job_path, parse_job_path, position_of, History, HistoryEntry, ViewerRouter,
    DEFAULT_FALLBACK_PATH, JOB_ROUTE_PREFIX,
};
pub use optimistic::{commit_item_patch, delete_item_everywhere, toggle_like};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Unknown item: {0}")]
    UnknownItem(String),
    #[error("Unknown model: {0}")]
    UnknownModel(String),
    #[error("Unknown folder: {0}")]
    UnknownFolder(String),
    #[error("No pending confirmation")]
    NoPendingConfirmation,
    #[error("Backend Error: {0}")]
    Backend(String),
}
