use tracing::info;

use crate::client::Custody;
use crate::error::Result;
use crate::pages::{accept_auth, invalid};
use crate::router::Route;
use crate::store::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified(Session),
    /// Verified, but the account is frozen so no session was stored.
    Frozen,
}

pub struct VerifyEmailPage {
    ctx: Custody,
}

impl VerifyEmailPage {
    pub fn new(ctx: &Custody) -> Self {
        Self { ctx: ctx.clone() }
    }

    /// Verify with the token from the emailed link and sign in.
    pub async fn verify(&self, token: Option<&str>) -> Result<VerifyOutcome> {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return invalid(&self.ctx, "Invalid verification link: the token is missing.");
        };

        let _loading = self.ctx.ui.loading();
        let auth = match self.ctx.api.verify_email(token).await {
            Ok(auth) => auth,
            Err(e) => {
                self.ctx.report(&e);
                return Err(e);
            }
        };

        if !accept_auth(&self.ctx, &auth)? {
            return Ok(VerifyOutcome::Frozen);
        }

        info!(user_id = %auth.user.id, "email verified");
        let message = if auth.message.is_empty() {
            "Email verified."
        } else {
            auth.message.as_str()
        };
        self.ctx.ui.success(message);
        self.ctx.navigator.navigate(Route::Dashboard);
        Ok(VerifyOutcome::Verified(self.ctx.session.snapshot()))
    }

    pub async fn resend(&self, email: &str) -> Result<()> {
        resend(&self.ctx, email).await
    }
}

/// Ask the backend to send the verification mail again.
pub(crate) async fn resend(ctx: &Custody, email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        return invalid(ctx, "Enter your email address.");
    }
    match ctx.api.resend_verification(email).await {
        Ok(resp) => {
            let message = if resp.message.is_empty() {
                "Verification email sent."
            } else {
                resp.message.as_str()
            };
            ctx.ui.success(message);
            Ok(())
        }
        Err(e) => {
            ctx.report(&e);
            Err(e)
        }
    }
}
