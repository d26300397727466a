//! Idle-session enforcement.
//!
//! The guard polls the idle window once per `check_interval`. Close to the
//! deadline it asks the [`WarningPresenter`] to show a countdown; at the
//! deadline it wipes the token store and hands control to the
//! [`LoginBoundary`]. A renewal from the warning prompt swaps in fresh tokens
//! and restarts the idle window.
//!
//! Every renewal failure ends the session. There is no retry.

mod config;
mod presenter;
mod state;

pub use config::{
    GuardConfig, DEFAULT_CHECK_INTERVAL_MS, DEFAULT_RENEWAL_TIMEOUT_SECS,
    DEFAULT_WARNING_THRESHOLD_SECS,
};
pub use presenter::{LogOnly, LoginBoundary, WarningPresenter};
pub use state::{remaining_seconds, GuardState};

use crate::activity::ActivityTracker;
use crate::api::RenewalClient;
use crate::clock::{Clock, SystemClock};
use crate::error::{RenewalError, Result, StockError};
use crate::models::TokenPair;
use crate::session::{store_tokens, TokenStore};
use chrono::Duration;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Side effect decided under the state lock and run after releasing it, so
/// presenters may call back into the guard.
enum Action {
    None,
    ShowWarning { remaining: u64, entered: bool },
    HideWarning,
    Expire { idle_secs: i64 },
}

struct Inner {
    config: GuardConfig,
    idle_timeout: Duration,
    warning_threshold: Duration,
    store: Arc<dyn TokenStore>,
    renewal: Arc<dyn RenewalClient>,
    activity: ActivityTracker,
    presenter: Arc<dyn WarningPresenter>,
    boundary: Arc<dyn LoginBoundary>,
    state: Mutex<GuardState>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, GuardState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn idle_for(&self) -> Duration {
        self.activity.clock().now() - self.activity.last_activity()
    }

    fn idle_window(&self) -> Duration {
        self.idle_timeout
            .checked_sub(&self.idle_for())
            .unwrap_or(Duration::zero())
    }

    fn check(&self) -> Option<GuardState> {
        if !self.store.has_session() {
            if *self.state() == GuardState::Warning {
                debug!("access token gone, hiding expiry warning");
                self.presenter.hide_warning();
            }
            return None;
        }

        let window = self.idle_window();
        let (next, action) = {
            let mut state = self.state();
            if *state == GuardState::Expired {
                return Some(GuardState::Expired);
            }

            let next = GuardState::classify(window, self.warning_threshold);
            let action = match (*state, next) {
                (prev, GuardState::Warning) => Action::ShowWarning {
                    remaining: remaining_seconds(window),
                    entered: prev != GuardState::Warning,
                },
                (GuardState::Warning, GuardState::Active) => Action::HideWarning,
                (_, GuardState::Expired) => Action::Expire {
                    idle_secs: self.idle_for().num_seconds(),
                },
                _ => Action::None,
            };
            *state = next;
            (next, action)
        };

        match action {
            Action::None => {}
            Action::ShowWarning { remaining, entered } => {
                if entered {
                    info!(remaining_seconds = remaining, "session about to expire through inactivity");
                }
                self.presenter.show_warning(remaining);
            }
            Action::HideWarning => {
                info!("activity detected, hiding expiry warning");
                self.presenter.hide_warning();
            }
            Action::Expire { idle_secs } => {
                info!(idle_secs, "session expired through inactivity");
                self.end_session();
            }
        }

        Some(next)
    }

    fn end_session(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not clear token store");
        }
        self.presenter.hide_warning();
        self.boundary.redirect_to_login();
    }

    fn stop(&self) {
        let handle = self
            .task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
            debug!("idle check stopped");
        }
    }

    async fn fetch_renewed(&self) -> std::result::Result<TokenPair, RenewalError> {
        let refresh = self
            .store
            .refresh_token()
            .ok_or(RenewalError::MissingRefreshToken)?;

        info!("renewing session");
        tokio::time::timeout(self.config.renewal_timeout, self.renewal.refresh(&refresh))
            .await
            .map_err(|_| RenewalError::TimedOut)?
    }

    /// Persist renewed tokens unless the session ended while the refresh
    /// call was in flight. The state lock is held across the write so a
    /// concurrent check cannot expire the session in between.
    fn commit_renewal(&self, tokens: &TokenPair) -> std::result::Result<bool, RenewalError> {
        let mut state = self.state();
        if *state == GuardState::Expired {
            return Ok(false);
        }
        store_tokens(self.store.as_ref(), tokens)
            .map_err(|e| RenewalError::Store(e.to_string()))?;
        self.activity.record_activity();
        *state = GuardState::Active;
        Ok(true)
    }
}

/// Enforces the idle timeout for one logged-in session at a time.
///
/// Dropping the guard cancels its polling task.
pub struct SessionGuard {
    inner: Arc<Inner>,
}

impl SessionGuard {
    pub fn builder() -> SessionGuardBuilder {
        SessionGuardBuilder::default()
    }

    /// Start polling. Returns `false`, and schedules nothing, when there is
    /// no access token to protect.
    ///
    /// Starting marks the beginning of a new session instance: the state goes
    /// back to `Active` and the idle window restarts. Must be called from
    /// within a tokio runtime.
    pub fn start(&self) -> bool {
        if !self.inner.store.has_session() {
            debug!("no access token, idle check not started");
            return false;
        }

        *self.inner.state() = GuardState::Active;
        self.inner.activity.record_activity();

        let inner = Arc::clone(&self.inner);
        let period = self.inner.config.check_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match inner.check() {
                    None => {
                        debug!("access token gone, stopping idle check");
                        break;
                    }
                    Some(GuardState::Expired) => break,
                    Some(_) => {}
                }
            }
        });

        let previous = self
            .inner
            .task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }

        info!(
            idle_timeout_secs = self.inner.config.idle_timeout.as_secs(),
            warning_threshold_secs = self.inner.config.warning_threshold.as_secs(),
            "idle check started"
        );
        true
    }

    pub fn stop(&self) {
        self.inner.stop();
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Run one check-and-act step. `None` means there is no session.
    pub fn check(&self) -> Option<GuardState> {
        self.inner.check()
    }

    /// Renew through the refresh endpoint. Any failure logs the user out.
    ///
    /// A session that is already `Expired`, or that expires while the refresh
    /// call is in flight, stays expired: the renewed tokens are discarded.
    pub async fn renew_session(&self) -> GuardState {
        if self.state() == GuardState::Expired {
            debug!("session already expired, not renewing");
            return GuardState::Expired;
        }

        let result = match self.inner.fetch_renewed().await {
            Ok(tokens) => self.inner.commit_renewal(&tokens),
            Err(e) => Err(e),
        };

        match result {
            Ok(true) => {
                self.inner.presenter.hide_warning();
                info!("session renewed");
                GuardState::Active
            }
            Ok(false) => {
                info!("session expired during renewal, discarding renewed tokens");
                GuardState::Expired
            }
            Err(_) if self.state() == GuardState::Expired => {
                debug!("session expired during renewal");
                GuardState::Expired
            }
            Err(e) => {
                warn!(error = %e, "session renewal failed, logging out");
                self.logout();
                GuardState::Expired
            }
        }
    }

    /// End the session: wipe the store, hide the warning, stop polling and
    /// go to login. Safe to call repeatedly.
    pub fn logout(&self) {
        info!("logging out");
        self.inner.stop();
        *self.inner.state() = GuardState::Expired;
        self.inner.end_session();
    }

    pub fn state(&self) -> GuardState {
        *self.inner.state()
    }

    pub fn idle_window(&self) -> Duration {
        self.inner.idle_window()
    }

    pub fn remaining_seconds(&self) -> u64 {
        remaining_seconds(self.inner.idle_window())
    }

    pub fn activity(&self) -> &ActivityTracker {
        &self.inner.activity
    }

    pub fn config(&self) -> &GuardConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.inner.store
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

#[derive(Default)]
pub struct SessionGuardBuilder {
    config: Option<GuardConfig>,
    store: Option<Arc<dyn TokenStore>>,
    renewal: Option<Arc<dyn RenewalClient>>,
    clock: Option<Arc<dyn Clock>>,
    activity: Option<ActivityTracker>,
    presenter: Option<Arc<dyn WarningPresenter>>,
    boundary: Option<Arc<dyn LoginBoundary>>,
}

impl SessionGuardBuilder {
    pub fn config(mut self, config: GuardConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn renewal(mut self, renewal: Arc<dyn RenewalClient>) -> Self {
        self.renewal = Some(renewal);
        self
    }

    /// Clock for a tracker created by the builder. Ignored when an
    /// [`ActivityTracker`] is supplied, which carries its own clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn activity(mut self, activity: ActivityTracker) -> Self {
        self.activity = Some(activity);
        self
    }

    pub fn presenter(mut self, presenter: Arc<dyn WarningPresenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    pub fn login_boundary(mut self, boundary: Arc<dyn LoginBoundary>) -> Self {
        self.boundary = Some(boundary);
        self
    }

    pub fn build(self) -> Result<SessionGuard> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let store = self
            .store
            .ok_or_else(|| StockError::Config("session guard needs a token store".to_string()))?;
        let renewal = self.renewal.ok_or_else(|| {
            StockError::Config("session guard needs a renewal client".to_string())
        })?;

        let idle_timeout = to_time_delta(config.idle_timeout, "idle timeout")?;
        let warning_threshold = to_time_delta(config.warning_threshold, "warning threshold")?;

        let activity = match self.activity {
            Some(activity) => activity,
            None => ActivityTracker::new(self.clock.unwrap_or_else(|| Arc::new(SystemClock))),
        };

        Ok(SessionGuard {
            inner: Arc::new(Inner {
                config,
                idle_timeout,
                warning_threshold,
                store,
                renewal,
                activity,
                presenter: self.presenter.unwrap_or_else(|| Arc::new(LogOnly)),
                boundary: self.boundary.unwrap_or_else(|| Arc::new(LogOnly)),
                state: Mutex::new(GuardState::Active),
                task: Mutex::new(None),
            }),
        })
    }
}

fn to_time_delta(value: std::time::Duration, what: &str) -> Result<Duration> {
    Duration::from_std(value).map_err(|_| StockError::Config(format!("{} is out of range", what)))
}
