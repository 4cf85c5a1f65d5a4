//! Page controllers.
//!
//! Each controller owns the transient state of one screen and turns user
//! actions into backend calls, store mutations, notifications and
//! navigation. Failures are notified locally and returned to the caller.

pub mod activity;
pub mod admin;
pub mod dashboard;
pub mod deposit;
pub mod login;
pub mod register;
pub mod verify_email;
pub mod withdraw_request;
pub mod withdraw_settings;

pub use activity::ActivityPage;
pub use admin::{filter_transactions, AdminOverview, AdminPage, WithdrawalApproval};
pub use dashboard::{rebuild_balance_history, DashboardPage, DashboardView};
pub use deposit::{DepositOutcome, DepositPage, ReportStatus};
pub use login::{LoginOutcome, LoginPage};
pub use register::RegisterPage;
pub use verify_email::{VerifyEmailPage, VerifyOutcome};
pub use withdraw_request::{WithdrawForm, WithdrawRequestPage};
pub use withdraw_settings::WithdrawSettingsPage;

use alloy::primitives::B256;
use tracing::debug;

use crate::client::Custody;
use crate::error::{CustodyError, Result};
use crate::store::NewSession;
use crate::types::{AccountStatus, AuthResponse};
use crate::wallet::user_key_from_email;

pub(crate) const FROZEN_LOGIN_MESSAGE: &str =
    "Your account is frozen. Please contact customer support.";

/// Notify a validation failure and return it as an error.
pub(crate) fn invalid<T>(ctx: &Custody, message: &str) -> Result<T> {
    ctx.ui.error(message);
    Err(CustodyError::Validation(message.to_string()))
}

/// Store the session carried by a login or verification response.
///
/// Frozen accounts are refused: nothing is stored and `false` is returned.
pub(crate) fn accept_auth(ctx: &Custody, auth: &AuthResponse) -> Result<bool> {
    let status = auth.user.account_status();
    if status == AccountStatus::Frozen {
        ctx.ui.error(FROZEN_LOGIN_MESSAGE);
        return Ok(false);
    }

    ctx.session.set_session(NewSession {
        access_token: auth.access_token.clone(),
        user_id: auth.user.id.clone(),
        email: Some(auth.user.email.clone()),
        role: Some(auth.user.role.clone()),
        status: Some(status),
    })?;
    match user_key_from_email(&auth.user.email) {
        Ok(key) => ctx.session.set_user_key(key),
        Err(e) => debug!(error = %e, "no deposit key for this email"),
    }
    Ok(true)
}

/// Deposit key for the current session, derived from the email if needed.
pub(crate) fn session_user_key(ctx: &Custody) -> Option<B256> {
    let session = ctx.session.snapshot();
    session
        .user_key
        .or_else(|| session.email.as_deref().and_then(|e| user_key_from_email(e).ok()))
}
