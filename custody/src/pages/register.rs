use tracing::info;

use crate::client::Custody;
use crate::error::Result;
use crate::pages::invalid;
use crate::router::Route;
use crate::types::RegisterResponse;
use crate::utils::{validate_email, validate_password};

pub struct RegisterPage {
    ctx: Custody,
}

impl RegisterPage {
    pub fn new(ctx: &Custody) -> Self {
        Self { ctx: ctx.clone() }
    }

    /// Create the account and move to the register-success screen.
    pub async fn submit(
        &self,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<RegisterResponse> {
        let email = email.trim();
        if !validate_email(email) {
            return invalid(&self.ctx, "Enter a valid email address.");
        }
        if !validate_password(password) {
            return invalid(
                &self.ctx,
                "Password must be at least 8 characters and include a letter and a digit.",
            );
        }
        if password != confirm {
            return invalid(&self.ctx, "Passwords do not match.");
        }

        let _loading = self.ctx.ui.loading();
        match self.ctx.api.register(email, password).await {
            Ok(resp) => {
                info!(user_id = %resp.user.id, "registered");
                let message = if resp.message.is_empty() {
                    "Registration complete. Check your inbox to verify your email."
                } else {
                    resp.message.as_str()
                };
                self.ctx.ui.success(message);
                self.ctx
                    .navigator
                    .navigate_with_state(Route::RegisterSuccess, email);
                Ok(resp)
            }
            Err(e) => {
                self.ctx.report(&e);
                Err(e)
            }
        }
    }
}
