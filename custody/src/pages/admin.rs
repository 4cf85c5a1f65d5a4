//! Administrator dashboard: vault balances, users, transaction log, omnibus
//! pause switch, cold-vault operations and pending withdrawal approvals.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::client::Custody;
use crate::error::{CustodyError, Result};
use crate::flows::{ColdMoveEvent, ColdMoveState};
use crate::pages::invalid;
use crate::router::Route;
use crate::types::*;
use crate::utils::truncate_tx_hash;

/// Entries requested from the transaction log.
pub const ADMIN_TX_LIMIT: u32 = 100;

/// Pending withdrawals requested per load.
pub const PENDING_WITHDRAWAL_LIMIT: u32 = 50;

const ADMIN_REQUIRED_MESSAGE: &str = "Administrator access is required.";

/// Everything the admin dashboard shows. Sections that failed to load hold
/// their empty defaults.
#[derive(Debug, Clone, Default)]
pub struct AdminOverview {
    pub omnibus: VaultBalance,
    pub cold: VaultBalance,
    pub paused: OmnibusPaused,
    pub users: Vec<AdminUser>,
    pub transactions: AdminTransactions,
    pub pending: PendingWithdrawals,
}

/// Result of approving a parked user withdrawal.
#[derive(Debug, Clone)]
pub enum WithdrawalApproval {
    Executed(AdminWithdrawalExecution),
    /// The manager approval went through but execution did not.
    ApprovedOnly { approval: ManagerApproval, error: String },
}

/// Keep transactions of `kind` (if given) whose email contains `email_query`,
/// ignoring case. A blank query matches everything.
pub fn filter_transactions(
    transactions: &[AdminTransaction],
    kind: Option<TransferKind>,
    email_query: &str,
) -> Vec<AdminTransaction> {
    let query = email_query.trim().to_lowercase();
    transactions
        .iter()
        .filter(|tx| kind.map_or(true, |k| tx.kind == k))
        .filter(|tx| {
            query.is_empty()
                || tx
                    .email
                    .as_deref()
                    .is_some_and(|e| e.to_lowercase().contains(&query))
        })
        .cloned()
        .collect()
}

pub struct AdminPage {
    ctx: Custody,
    overview: AdminOverview,
    cold_move: ColdMoveState,
}

impl AdminPage {
    pub fn new(ctx: &Custody) -> Self {
        Self {
            ctx: ctx.clone(),
            overview: AdminOverview::default(),
            cold_move: ColdMoveState::Idle,
        }
    }

    pub fn overview(&self) -> &AdminOverview {
        &self.overview
    }

    pub fn cold_move(&self) -> &ColdMoveState {
        &self.cold_move
    }

    /// Continue a cold move started elsewhere, e.g. by another admin.
    pub fn resume_cold_move(&mut self, state: ColdMoveState) {
        self.cold_move = state;
    }

    /// Check the role and load the dashboard. Non-admins are sent back to
    /// the user dashboard.
    pub async fn open(&mut self) -> Result<&AdminOverview> {
        self.require_admin()?;
        self.load().await;
        Ok(&self.overview)
    }

    /// Load every section concurrently, falling back to empty values.
    pub async fn load(&mut self) {
        let api = &self.ctx.api;
        let ui = self.ctx.ui.clone();
        let _loading = ui.loading();

        let (omnibus, cold, paused, users, transactions, pending) = tokio::join!(
            api.get_omnibus_balance(),
            api.get_cold_balance(),
            api.get_omnibus_paused(),
            api.get_all_users(),
            api.get_admin_transactions(Some(ADMIN_TX_LIMIT)),
            api.get_pending_withdrawals(Some(PENDING_WITHDRAWAL_LIMIT)),
        );

        self.overview = AdminOverview {
            omnibus: or_default(omnibus, "omnibus balance"),
            cold: or_default(cold, "cold balance"),
            paused: or_default(paused, "omnibus pause status"),
            users: or_default(users, "users"),
            transactions: or_default(transactions, "transactions"),
            pending: or_default(pending, "pending withdrawals"),
        };
    }

    pub fn filtered_transactions(
        &self,
        kind: Option<TransferKind>,
        email_query: &str,
    ) -> Vec<AdminTransaction> {
        filter_transactions(&self.overview.transactions.transactions, kind, email_query)
    }

    // --- Users ---

    pub async fn set_user_status(
        &mut self,
        user_id: &str,
        status: AccountStatus,
    ) -> Result<UserStatusUpdate> {
        self.require_admin()?;
        let update = self
            .ctx
            .api
            .update_user_status(user_id, status)
            .await
            .inspect_err(|e| self.ctx.report(e))?;
        let verb = match status {
            AccountStatus::Frozen => "frozen",
            AccountStatus::Active => "unfrozen",
        };
        info!(user_id, %status, "user status changed");
        self.ctx.ui.success(format!("User {verb}."));
        self.load().await;
        Ok(update)
    }

    /// Freeze an active user or unfreeze a frozen one.
    pub async fn toggle_user(&mut self, user: &AdminUser) -> Result<UserStatusUpdate> {
        self.set_user_status(&user.id, user.status.toggled()).await
    }

    // --- Omnibus ---

    pub async fn pause_omnibus(&mut self, paused: bool) -> Result<OmnibusPauseResult> {
        self.require_admin()?;
        let result = self
            .ctx
            .api
            .pause_omnibus(paused)
            .await
            .inspect_err(|e| self.ctx.report(e))?;
        let message = if result.message.is_empty() {
            let fallback = if paused { "Omnibus paused." } else { "Omnibus resumed." };
            fallback.to_string()
        } else {
            result.message.clone()
        };
        self.ctx.ui.success(message);
        if let Some(hash) = &result.tx_hash {
            self.notify_hash(hash);
        }
        self.load().await;
        Ok(result)
    }

    // --- Cold vault ---

    pub async fn cold_deposit(&mut self, amount_eth: &str) -> Result<ColdDeposit> {
        self.require_admin()?;
        let amount = self.positive_amount(amount_eth)?;
        let deposit = self
            .ctx
            .api
            .cold_deposit(&amount)
            .await
            .inspect_err(|e| self.ctx.report(e))?;
        self.ctx
            .ui
            .success(format!("Cold vault deposit complete ({amount} ETH)."));
        self.notify_hash(&deposit.tx_hash);
        self.load().await;
        Ok(deposit)
    }

    /// Request a cold → omnibus move. On failure the flow stays in Request.
    pub async fn cold_move_request(&mut self, amount_eth: &str) -> Result<ColdMoveRequested> {
        self.require_admin()?;
        let amount = self.positive_amount(amount_eth)?;
        if self.cold_move == ColdMoveState::Idle {
            self.cold_move_event(ColdMoveEvent::Start);
        }
        if self.cold_move != ColdMoveState::Request {
            return Err(CustodyError::Validation(format!(
                "a cold move is already in the {} step",
                self.cold_move.name()
            )));
        }

        match self.ctx.api.cold_request_move(&amount).await {
            Ok(requested) => {
                self.ctx.ui.success(format!(
                    "Move requested. Move ID: {}",
                    truncate_tx_hash(&requested.move_id)
                ));
                self.cold_move_event(ColdMoveEvent::Requested {
                    move_id: requested.move_id.clone(),
                });
                Ok(requested)
            }
            Err(e) => self.cold_move_failed(e),
        }
    }

    /// Record this admin's approval. Advances to Execute only once both
    /// admins have approved.
    pub async fn cold_move_approve(&mut self) -> Result<ColdMoveApproved> {
        self.require_admin()?;
        let ColdMoveState::Approve { move_id, .. } = &self.cold_move else {
            return invalid(&self.ctx, "There is no cold move awaiting approval.");
        };
        let move_id = move_id.clone();

        match self.ctx.api.cold_approve_move(&move_id).await {
            Ok(approved) => {
                if approved.is_executable != (approved.approved_admin1 && approved.approved_admin2)
                {
                    warn!(
                        is_executable = approved.is_executable,
                        approved_admin1 = approved.approved_admin1,
                        approved_admin2 = approved.approved_admin2,
                        "executable flag disagrees with approvals"
                    );
                }
                self.cold_move_event(ColdMoveEvent::Approved {
                    approved_admin1: approved.approved_admin1,
                    approved_admin2: approved.approved_admin2,
                });
                if matches!(self.cold_move, ColdMoveState::Execute { .. }) {
                    self.ctx
                        .ui
                        .success("Move approved by both admins and ready to execute.");
                } else {
                    let count = u8::from(approved.approved_admin1) + u8::from(approved.approved_admin2);
                    self.ctx.ui.info(format!("Approval recorded ({count}/2)."));
                }
                Ok(approved)
            }
            Err(e) => self.cold_move_failed(e),
        }
    }

    pub async fn cold_move_execute(&mut self) -> Result<ColdMoveExecuted> {
        self.require_admin()?;
        let ColdMoveState::Execute { move_id } = &self.cold_move else {
            return invalid(&self.ctx, "The cold move is not ready to execute.");
        };
        let move_id = move_id.clone();

        match self.ctx.api.cold_execute_move(&move_id).await {
            Ok(executed) => {
                self.ctx
                    .ui
                    .success(format!("Move executed ({} ETH).", executed.amount_eth));
                self.notify_hash(&executed.tx_hash);
                self.cold_move_event(ColdMoveEvent::Executed);
                self.load().await;
                Ok(executed)
            }
            Err(e) => self.cold_move_failed(e),
        }
    }

    pub fn cancel_cold_move(&mut self) {
        self.cold_move_event(ColdMoveEvent::Cancel);
    }

    // --- User withdrawals ---

    pub async fn withdrawal_info(&self, tx_id: &str) -> Result<WithdrawalRequestInfo> {
        self.require_admin()?;
        self.ctx
            .api
            .get_withdrawal_request(tx_id)
            .await
            .inspect_err(|e| self.ctx.report(e))
    }

    /// Manager-approve a parked withdrawal and then execute it.
    pub async fn approve_withdrawal(&mut self, tx_id: &str) -> Result<WithdrawalApproval> {
        self.require_admin()?;
        let approval = self
            .ctx
            .api
            .approve_user_withdrawal(tx_id)
            .await
            .inspect_err(|e| self.ctx.report(e))?;
        self.ctx.ui.success("Withdrawal approved.");

        let outcome = match self.ctx.api.execute_user_withdrawal(tx_id).await {
            Ok(execution) => {
                self.ctx.ui.success(format!(
                    "Withdrawal executed ({} ETH).",
                    execution.amount_eth
                ));
                if let Some(hash) = &execution.tx_hash {
                    self.notify_hash(hash);
                }
                WithdrawalApproval::Executed(execution)
            }
            Err(e) => {
                warn!(tx_id, error = %e, "approved withdrawal not executed");
                let error = e.user_message();
                if !e.is_unauthorized() {
                    self.ctx
                        .ui
                        .warning(format!("Withdrawal approved but not executed: {error}"));
                }
                WithdrawalApproval::ApprovedOnly { approval, error }
            }
        };
        self.load().await;
        Ok(outcome)
    }

    // --- helpers ---

    fn require_admin(&self) -> Result<()> {
        if self.ctx.session.snapshot().is_admin() {
            return Ok(());
        }
        self.ctx.ui.error(ADMIN_REQUIRED_MESSAGE);
        self.ctx.navigator.navigate(Route::Dashboard);
        Err(CustodyError::Validation(ADMIN_REQUIRED_MESSAGE.into()))
    }

    fn positive_amount(&self, amount: &str) -> Result<String> {
        let amount = amount.trim();
        match Decimal::from_str(amount) {
            Ok(v) if v > Decimal::ZERO => Ok(amount.to_string()),
            _ => invalid(&self.ctx, "Enter a valid amount."),
        }
    }

    fn notify_hash(&self, hash: &str) {
        self.ctx
            .ui
            .info(format!("Transaction hash: {}", truncate_tx_hash(hash)));
    }

    fn cold_move_event(&mut self, event: ColdMoveEvent) {
        let state = std::mem::take(&mut self.cold_move);
        self.cold_move = state.apply(event);
    }

    fn cold_move_failed<T>(&mut self, err: CustodyError) -> Result<T> {
        self.ctx.report(&err);
        self.cold_move_event(ColdMoveEvent::Failed {
            message: err.user_message(),
        });
        Err(err)
    }
}

fn or_default<T: Default>(result: Result<T>, section: &str) -> T {
    result.unwrap_or_else(|e| {
        warn!(section, error = %e, "admin section unavailable");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(kind: TransferKind, email: Option<&str>) -> AdminTransaction {
        AdminTransaction {
            kind,
            email: email.map(str::to_string),
            from: None,
            to: None,
            amount: "1".into(),
            timestamp: 0,
        }
    }

    #[test]
    fn test_filter_by_kind_and_email() {
        let txs = vec![
            tx(TransferKind::Deposit, Some("Alice@example.com")),
            tx(TransferKind::Withdraw, Some("bob@example.com")),
            tx(TransferKind::Deposit, None),
        ];

        assert_eq!(filter_transactions(&txs, None, "").len(), 3);
        assert_eq!(filter_transactions(&txs, Some(TransferKind::Deposit), "").len(), 2);

        let alice = filter_transactions(&txs, None, " alice ");
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].email.as_deref(), Some("Alice@example.com"));

        assert!(filter_transactions(&txs, Some(TransferKind::Withdraw), "alice").is_empty());
    }
}
