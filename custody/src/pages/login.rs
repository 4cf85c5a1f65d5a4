use tracing::info;

use crate::client::Custody;
use crate::error::{CustodyError, ErrorCode, Result};
use crate::pages::{accept_auth, invalid, verify_email};
use crate::router::Route;
use crate::store::Session;

const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn(Session),
    /// Credentials were fine but the account is frozen; no session was stored.
    Frozen,
    /// The email has not been verified yet; resend is now offered.
    VerificationRequired,
}

pub struct LoginPage {
    ctx: Custody,
    show_resend: bool,
}

impl LoginPage {
    pub fn new(ctx: &Custody) -> Self {
        Self {
            ctx: ctx.clone(),
            show_resend: false,
        }
    }

    /// Whether the "resend verification" action is offered.
    pub fn show_resend(&self) -> bool {
        self.show_resend
    }

    pub async fn submit(&mut self, email: &str, password: &str) -> Result<LoginOutcome> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return invalid(&self.ctx, "Enter your email and password.");
        }

        let _loading = self.ctx.ui.loading();
        self.show_resend = false;

        let auth = match self.ctx.api.login(email, password).await {
            Ok(auth) => auth,
            Err(e) if is_email_not_verified(&e) => {
                self.show_resend = true;
                self.ctx.ui.warning(ErrorCode::EmailNotVerified.message());
                return Ok(LoginOutcome::VerificationRequired);
            }
            // Rejected credentials come back as 401, which the client never notifies.
            Err(CustodyError::Unauthorized) => {
                self.ctx.ui.error(INVALID_CREDENTIALS_MESSAGE);
                return Err(CustodyError::Unauthorized);
            }
            Err(e) => {
                self.ctx.report(&e);
                return Err(e);
            }
        };

        if !accept_auth(&self.ctx, &auth)? {
            return Ok(LoginOutcome::Frozen);
        }

        info!(user_id = %auth.user.id, "logged in");
        self.ctx.ui.success("Logged in.");
        self.ctx.navigator.navigate(Route::Dashboard);
        Ok(LoginOutcome::LoggedIn(self.ctx.session.snapshot()))
    }

    pub async fn resend_verification(&mut self, email: &str) -> Result<()> {
        verify_email::resend(&self.ctx, email).await?;
        self.show_resend = false;
        Ok(())
    }
}

/// Login rejected because the email is unverified, by code or by message.
fn is_email_not_verified(err: &CustodyError) -> bool {
    match err {
        CustodyError::Api(api) => {
            api.code == Some(ErrorCode::EmailNotVerified)
                || api.message.to_ascii_lowercase().contains("verif")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_not_verified_detection() {
        let by_code = CustodyError::Api(ApiError::from_body(
            403,
            r#"{"error":{"code":"EMAIL_NOT_VERIFIED","message":"nope"}}"#,
        ));
        assert!(is_email_not_verified(&by_code));

        let by_message = CustodyError::Api(ApiError::from_body(
            403,
            r#"{"message":"Email verification required"}"#,
        ));
        assert!(is_email_not_verified(&by_message));

        let other = CustodyError::Api(ApiError::from_body(401, r#"{"message":"bad password"}"#));
        assert!(!is_email_not_verified(&other));
        assert!(!is_email_not_verified(&CustodyError::Unauthorized));
    }
}
