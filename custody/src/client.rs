use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::CustodyConfig;
use crate::error::{CustodyError, Result};
use crate::rest::ApiClient;
use crate::router::{GuardView, Navigator, Route, RouteGuard};
use crate::store::{ChainStore, FileStorage, SessionStore, Storage, ThemeStore, UiStore};
use crate::wallet::{NetworkGuard, WalletClient};

/// Application context shared by every page controller.
///
/// Cloning is cheap; all stores sit behind `Arc`s so concurrent requests see
/// the same session.
#[derive(Clone)]
pub struct Custody {
    /// Resolved configuration.
    pub config: Arc<CustodyConfig>,
    /// Session persisted across restarts.
    pub session: Arc<SessionStore>,
    /// Connected wallet and chain.
    pub chain: Arc<ChainStore>,
    /// Notifications and loading state.
    pub ui: Arc<UiStore>,
    pub theme: Arc<ThemeStore>,
    pub navigator: Arc<Navigator>,
    /// Backend client.
    pub api: ApiClient,
    /// Wallet JSON-RPC client.
    pub wallet: Arc<WalletClient>,
    pub network: Arc<NetworkGuard>,
}

impl Custody {
    /// Create a context whose state lives under `config.state_dir`.
    pub fn new(config: CustodyConfig) -> Result<Self> {
        let storage = FileStorage::open(&config.state_dir)?;
        Self::with_storage(config, Arc::new(storage))
    }

    /// Create a context on top of an arbitrary storage backend.
    pub fn with_storage(config: CustodyConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        let session = Arc::new(SessionStore::load(storage.clone()));
        let navigator = Arc::new(Navigator::new());
        let api = ApiClient::new(&config, session.clone(), navigator.clone())?;
        let wallet = Arc::new(WalletClient::new(&config)?);

        debug!(
            api = %config.api_base_url,
            wallet = %config.wallet_rpc_url,
            chain_id = config.expected_chain_id,
            "custody context ready"
        );

        Ok(Self {
            chain: Arc::new(ChainStore::new()),
            ui: Arc::new(UiStore::new(config.notification_ttl)),
            theme: Arc::new(ThemeStore::load(storage, false)),
            network: Arc::new(NetworkGuard::new(config.expected_chain_id)),
            config: Arc::new(config),
            session,
            navigator,
            api,
            wallet,
        })
    }

    /// Run the route guard for `route` once against the current session.
    ///
    /// # Errors
    ///
    /// Returns `CustodyError::NotAuthenticated` when the guard redirects.
    pub fn enter(&self, route: Route) -> Result<()> {
        if !route.is_protected() {
            self.navigator.navigate(route);
            return Ok(());
        }
        let guard = RouteGuard::mount(route);
        match guard.check(&self.session.snapshot(), &self.ui, &self.navigator) {
            GuardView::Allow => {
                self.navigator.navigate(route);
                Ok(())
            }
            GuardView::Redirect { .. } => Err(CustodyError::NotAuthenticated),
        }
    }

    /// Surface a failed operation as an error notification.
    ///
    /// Unauthorized responses were already handled by the API client and are
    /// not shown again.
    pub fn report(&self, err: &CustodyError) {
        if err.is_unauthorized() {
            return;
        }
        warn!(error = %err, "operation failed");
        self.ui.error(err.user_message());
    }

    /// Clear the session, forget the wallet binding and return to login.
    pub fn logout(&self) -> Result<()> {
        self.session.clear_session()?;
        self.chain.disconnect();
        self.ui.success("Logged out.");
        self.navigator.navigate(Route::Login);
        Ok(())
    }
}
