//! Routes, navigation history and the protected-route guard.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::store::{Session, UiStore};

/// Message shown once when a protected route is visited without a session.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Login required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    RegisterSuccess,
    VerifyEmail,
    Dashboard,
    Deposit,
    WithdrawSettings,
    WithdrawRequest,
    Activity,
    Admin,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::RegisterSuccess => "/register-success",
            Route::VerifyEmail => "/verify-email",
            Route::Dashboard => "/dashboard",
            Route::Deposit => "/deposit",
            Route::WithdrawSettings => "/withdraw/settings",
            Route::WithdrawRequest => "/withdraw/request",
            Route::Activity => "/activity",
            Route::Admin => "/admin",
        }
    }

    /// Routes that require an authenticated session.
    pub fn is_protected(self) -> bool {
        matches!(
            self,
            Route::Dashboard
                | Route::Deposit
                | Route::WithdrawSettings
                | Route::WithdrawRequest
                | Route::Activity
                | Route::Admin
        )
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split('?').next().unwrap_or(path).trim_end_matches('/');
        [
            Route::Login,
            Route::Register,
            Route::RegisterSuccess,
            Route::VerifyEmail,
            Route::Dashboard,
            Route::Deposit,
            Route::WithdrawSettings,
            Route::WithdrawRequest,
            Route::Activity,
            Route::Admin,
        ]
        .into_iter()
        .find(|r| r.path() == path)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// One entry in the navigation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub route: Route,
    /// Path that was originally requested before a guard redirect.
    pub from: Option<String>,
    /// Extra state carried along, e.g. the email on register-success.
    pub state: Option<String>,
    /// Full reload rather than an in-app transition.
    pub hard: bool,
}

#[derive(Debug, Default)]
struct NavState {
    history: Vec<Location>,
    hard_redirects: usize,
}

/// Records where the application currently is.
#[derive(Debug, Default)]
pub struct Navigator {
    state: Mutex<NavState>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// In-app navigation.
    pub fn navigate(&self, route: Route) {
        self.push(Location {
            route,
            from: None,
            state: None,
            hard: false,
        });
    }

    pub fn navigate_with_state(&self, route: Route, state: impl Into<String>) {
        self.push(Location {
            route,
            from: None,
            state: Some(state.into()),
            hard: false,
        });
    }

    /// Guard redirect that keeps the requested path.
    pub fn redirect_from(&self, route: Route, from: impl Into<String>) {
        self.push(Location {
            route,
            from: Some(from.into()),
            state: None,
            hard: false,
        });
    }

    /// Full navigation: in-app history is discarded.
    pub fn hard_redirect(&self, route: Route) {
        let mut state = self.state.lock();
        info!(to = %route, "hard redirect");
        state.history.clear();
        state.history.push(Location {
            route,
            from: None,
            state: None,
            hard: true,
        });
        state.hard_redirects += 1;
    }

    pub fn current(&self) -> Option<Location> {
        self.state.lock().history.last().cloned()
    }

    pub fn current_route(&self) -> Option<Route> {
        self.current().map(|l| l.route)
    }

    pub fn hard_redirect_count(&self) -> usize {
        self.state.lock().hard_redirects
    }

    fn push(&self, location: Location) {
        debug!(to = %location.route, from = ?location.from, "navigate");
        self.state.lock().history.push(location);
    }
}

/// What a guarded route should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardView {
    Allow,
    Redirect { to: Route, from: String },
}

/// Guard for one mount of a protected route.
///
/// `render` is pure. `effect` runs after render and raises the login
/// notification at most once per mount; the flag resets once a session
/// appears.
#[derive(Debug)]
pub struct RouteGuard {
    route: Route,
    notified: AtomicBool,
}

impl RouteGuard {
    pub fn mount(route: Route) -> Self {
        Self {
            route,
            notified: AtomicBool::new(false),
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn render(&self, session: &Session) -> GuardView {
        if session.is_authenticated() {
            GuardView::Allow
        } else {
            GuardView::Redirect {
                to: Route::Login,
                from: self.route.path().to_string(),
            }
        }
    }

    pub fn effect(&self, session: &Session, ui: &UiStore) {
        if session.is_authenticated() {
            self.notified.store(false, Ordering::SeqCst);
        } else if !self.notified.swap(true, Ordering::SeqCst) {
            ui.error(LOGIN_REQUIRED_MESSAGE);
        }
    }

    /// Render, run the effect, and apply any redirect.
    pub fn check(&self, session: &Session, ui: &UiStore, navigator: &Navigator) -> GuardView {
        let view = self.render(session);
        self.effect(session, ui);
        if let GuardView::Redirect { to, from } = &view {
            navigator.redirect_from(*to, from.clone());
        }
        view
    }
}
