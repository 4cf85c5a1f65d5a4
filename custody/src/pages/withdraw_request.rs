use tracing::{debug, warn};

use crate::client::Custody;
use crate::error::{CustodyError, ErrorCode, Result};
use crate::flows::{WithdrawEvent, WithdrawState};
use crate::pages::invalid;
use crate::types::WithdrawSubmitRequest;
use crate::utils::{parse_address, to_checksum_address, truncate_tx_hash, validate_eth_amount};

/// Form input for a withdrawal.
#[derive(Debug, Clone, Default)]
pub struct WithdrawForm {
    pub to: String,
    pub amount: String,
    pub password: String,
}

/// Check the form against the loaded whitelist and return the checksummed
/// recipient. Advisory only; the backend enforces its own policy.
pub fn validate_form(
    form: &WithdrawForm,
    whitelist: &[String],
) -> std::result::Result<String, &'static str> {
    if form.to.trim().is_empty() || form.amount.trim().is_empty() || form.password.is_empty() {
        return Err("Fill in every field.");
    }
    let to = parse_address(form.to.trim())
        .map_err(|_| "Invalid address.")?
        .to_checksum(None);
    if !whitelist.is_empty() && !whitelist.contains(&to) {
        return Err("The address is not on your withdrawal whitelist.");
    }
    if !validate_eth_amount(&form.amount) {
        return Err("Enter a valid amount (up to 79 ETH, at most 6 decimal places).");
    }
    Ok(to)
}

pub struct WithdrawRequestPage {
    ctx: Custody,
    whitelist: Vec<String>,
    state: WithdrawState,
}

impl WithdrawRequestPage {
    pub fn new(ctx: &Custody) -> Self {
        Self {
            ctx: ctx.clone(),
            whitelist: Vec::new(),
            state: WithdrawState::default(),
        }
    }

    pub fn state(&self) -> &WithdrawState {
        &self.state
    }

    pub fn whitelist(&self) -> &[String] {
        &self.whitelist
    }

    /// Load the whitelist in checksum form. Failure means "no whitelist".
    pub async fn load(&mut self) {
        if !self.ctx.session.is_authenticated() {
            return;
        }
        match self.ctx.api.get_whitelist().await {
            Ok(entries) => {
                self.whitelist = entries
                    .iter()
                    .filter_map(|e| to_checksum_address(&e.to_address))
                    .collect();
                debug!(count = self.whitelist.len(), "whitelist loaded");
            }
            Err(e) => warn!(error = %e, "failed to load whitelist"),
        }
    }

    /// Run submit, approve and (unless a manager must sign) execute.
    pub async fn submit(&mut self, form: &WithdrawForm) -> Result<&WithdrawState> {
        if !matches!(self.state, WithdrawState::Form { .. }) {
            return Err(CustodyError::Validation(format!(
                "a withdrawal is already {}",
                self.state.name()
            )));
        }
        if self.ctx.session.snapshot().is_frozen() {
            self.ctx.ui.error(ErrorCode::FrozenAccount.message());
            return Err(CustodyError::AccountFrozen);
        }
        let to = match validate_form(form, &self.whitelist) {
            Ok(to) => to,
            Err(message) => return invalid(&self.ctx, message),
        };

        let ui = self.ctx.ui.clone();
        let _loading = ui.loading();
        self.transition(WithdrawEvent::Submit);

        match self.run(to, form).await {
            Ok(()) => Ok(&self.state),
            Err((prefix, e)) => {
                let message = match prefix {
                    Some(prefix) => format!("{prefix} {}", e.user_message()),
                    None => e.user_message(),
                };
                if !e.is_unauthorized() {
                    warn!(error = %e, "withdrawal failed");
                    self.ctx.ui.error(message.clone());
                }
                self.transition(WithdrawEvent::Failed { message });
                Err(e)
            }
        }
    }

    /// "New withdrawal" from a result screen.
    pub fn reset(&mut self) {
        self.transition(WithdrawEvent::Reset);
    }

    async fn run(
        &mut self,
        to: String,
        form: &WithdrawForm,
    ) -> std::result::Result<(), (Option<&'static str>, CustodyError)> {
        let req = WithdrawSubmitRequest {
            to,
            amount: form.amount.trim().to_string(),
            password: form.password.clone(),
        };
        let submitted = self
            .ctx
            .api
            .withdraw_submit(&req)
            .await
            .map_err(|e| (None, e))?;
        let Some(tx_id) = submitted.tx_id.filter(|id| !id.is_empty()) else {
            return Err((
                None,
                CustodyError::Validation(
                    "The withdrawal id was missing from the response.".into(),
                ),
            ));
        };
        self.ctx.ui.info(match &submitted.tx_hash {
            Some(h) => format!("Withdrawal submitted. Tx: {}", truncate_tx_hash(h)),
            None => "Withdrawal submitted.".to_string(),
        });
        self.transition(WithdrawEvent::Submitted {
            tx_id: tx_id.clone(),
            tx_hash: submitted.tx_hash,
        });

        let approved = self
            .ctx
            .api
            .withdraw_approve(&tx_id)
            .await
            .map_err(|e| (Some("Withdrawal approval failed."), e))?;
        let requires_manager_approval = approved.requires_manager_approval;
        self.transition(WithdrawEvent::Approved {
            requires_manager_approval,
            tx_hash: approved.tx_hash.clone(),
            manager_tx_hash: approved.manager_tx_hash,
        });
        if requires_manager_approval {
            self.ctx
                .ui
                .warning("This withdrawal needs manager approval and is now waiting for it.");
            return Ok(());
        }
        self.ctx.ui.info(match &approved.tx_hash {
            Some(h) => format!("Withdrawal approved. Tx: {}", truncate_tx_hash(h)),
            None => "Withdrawal approved.".to_string(),
        });

        let executed = self
            .ctx
            .api
            .withdraw_execute(&tx_id)
            .await
            .map_err(|e| (Some("Withdrawal execution failed."), e))?;
        self.transition(WithdrawEvent::Executed {
            tx_hash: executed.tx_hash,
        });
        self.ctx.ui.success("Withdrawal completed.");
        Ok(())
    }

    fn transition(&mut self, event: WithdrawEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(event);
    }
}
