pub mod client;
pub mod config;
pub mod error;
pub mod flows;
pub mod pages;
pub mod rest;
pub mod router;
pub mod store;
pub mod types;
pub mod utils;
pub mod wallet;

// ---- Top-level re-exports for ergonomic usage ----

// Application context + config
pub use client::Custody;
pub use config::{CustodyConfig, SEPOLIA_CHAIN_ID};
pub use error::{ApiError, CustodyError, ErrorCode, Result};

// REST client
pub use rest::ApiClient;

// Stores
pub use store::{
    ChainState, ChainStore, FileStorage, MemoryStorage, Notification, NotificationKind, Session,
    SessionStore, Storage, ThemeStore, UiStore,
};

// Routing
pub use router::{GuardView, Location, Navigator, Route, RouteGuard};

// Wallet
pub use wallet::{NetworkCheck, NetworkGuard, TxReceipt, WalletClient};

// Flows
pub use flows::{ColdMoveEvent, ColdMoveState, WithdrawEvent, WithdrawReceipt, WithdrawState};

// Core enums
pub use types::{AccountStatus, Direction, OmnibusStatus, TransferKind};

// Auth + profile
pub use types::{AuthResponse, AuthUser, DailyBalance, ProfileResponse, RegisterResponse};

// Deposits + withdrawals
pub use types::{TxHistoryItem, WithdrawApproved, WithdrawExecuted, WithdrawSubmitted};

// Settings
pub use types::{DailyLimit, WhitelistEntry};

// Admin
pub use types::{AdminTransaction, AdminTransactions, AdminUser, PendingWithdrawals, VaultBalance};
