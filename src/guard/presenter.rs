use tracing::info;

/// Renders the "session about to expire" prompt.
///
/// `show_warning` is called on every check while the session is in the
/// warning range, so implementations should treat it as "show or update the
/// countdown".
pub trait WarningPresenter: Send + Sync {
    fn show_warning(&self, remaining_seconds: u64);
    fn hide_warning(&self);
}

/// Where the user lands once the session is gone.
pub trait LoginBoundary: Send + Sync {
    fn redirect_to_login(&self);
}

/// Presenter and boundary that only log. Used when the embedding
/// application has no UI to drive.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnly;

impl WarningPresenter for LogOnly {
    fn show_warning(&self, remaining_seconds: u64) {
        info!(remaining_seconds, "session about to expire");
    }

    fn hide_warning(&self) {}
}

impl LoginBoundary for LogOnly {
    fn redirect_to_login(&self) {
        info!("session ended, login required");
    }
}
