pub mod activity;
pub mod api;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod guard;
pub mod logging;
pub mod models;
pub mod permissions;
pub mod session;
pub mod ui;

pub use activity::{ActivityKind, ActivityTracker};
pub use api::{ApiClient, RenewalClient};
pub use error::{RenewalError, Result, StockError};
pub use guard::{GuardConfig, GuardState, SessionGuard};
pub use session::{FilesystemTokenStore, MemoryTokenStore, TokenStore};
