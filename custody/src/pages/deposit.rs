use alloy::primitives::{B256, U256};
use tracing::{info, warn};

use crate::client::Custody;
use crate::error::{CustodyError, Result};
use crate::pages::{invalid, session_user_key};
use crate::utils::{eth_to_wei, parse_eth_amount};

/// Where the backend report of the last deposit stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReportStatus {
    #[default]
    Idle,
    Pending,
    Reported(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct DepositOutcome {
    pub tx_hash: B256,
    pub block_number: Option<U256>,
    pub report: ReportStatus,
}

/// Deposit ETH from the connected wallet into the omnibus vault.
pub struct DepositPage {
    ctx: Custody,
    tx_hash: Option<B256>,
    report: ReportStatus,
}

impl DepositPage {
    pub fn new(ctx: &Custody) -> Self {
        Self {
            ctx: ctx.clone(),
            tx_hash: None,
            report: ReportStatus::Idle,
        }
    }

    pub fn report_status(&self) -> &ReportStatus {
        &self.report
    }

    /// Send the deposit, wait for it to be mined, then report it once.
    pub async fn deposit(&mut self, amount: &str) -> Result<DepositOutcome> {
        let chain = self.ctx.chain.snapshot();
        let Some(from) = chain.address.filter(|_| chain.connected) else {
            return invalid(&self.ctx, "Connect your wallet first.");
        };
        let expected = self.ctx.config.expected_chain_id;
        if !chain.is_on(expected) {
            self.ctx.ui.error("Switch your wallet to the Sepolia network.");
            return Err(CustodyError::WrongNetwork {
                expected,
                actual: chain.chain_id.unwrap_or_default(),
            });
        }
        if self.ctx.session.snapshot().email.is_none() {
            self.ctx
                .ui
                .error("Your session has no email. Please log in again.");
            return Err(CustodyError::NotAuthenticated);
        }
        let Some(user_key) = session_user_key(&self.ctx) else {
            return invalid(&self.ctx, "Your email cannot be used as a deposit key.");
        };
        let value = match parse_eth_amount(amount).and_then(eth_to_wei) {
            Ok(v) => v,
            Err(e) => {
                self.ctx.report(&e);
                return Err(e);
            }
        };

        let ui = self.ctx.ui.clone();
        let _loading = ui.loading();
        self.tx_hash = None;
        self.report = ReportStatus::Idle;

        let vault = self.ctx.config.omnibus_vault;
        let hash = match self.ctx.wallet.deposit_eth(from, vault, user_key, value).await {
            Ok(h) => h,
            Err(e) => {
                self.ctx.report(&e);
                return Err(e);
            }
        };
        self.tx_hash = Some(hash);
        self.ctx.ui.info("Transaction sent.");

        let receipt = match self.ctx.wallet.wait_for_receipt(hash).await {
            Ok(r) => r,
            Err(e) => {
                self.ctx.report(&e);
                return Err(e);
            }
        };
        info!(%hash, amount, "deposit confirmed");

        self.report_deposit().await;
        Ok(DepositOutcome {
            tx_hash: hash,
            block_number: receipt.block_number,
            report: self.report.clone(),
        })
    }

    /// Report the confirmed deposit. Runs at most once per transaction unless
    /// the previous attempt failed.
    pub async fn report_deposit(&mut self) -> &ReportStatus {
        let Some(hash) = self.tx_hash else {
            return &self.report;
        };
        if matches!(self.report, ReportStatus::Pending | ReportStatus::Reported(_)) {
            return &self.report;
        }

        self.report = ReportStatus::Pending;
        let tx_hash = hash.to_string();
        self.report = match self.ctx.api.report_deposit(&tx_hash).await {
            Ok(resp) => {
                let message = if resp.message.is_empty() {
                    "Deposit recorded.".to_string()
                } else {
                    resp.message
                };
                self.ctx.ui.success(message.clone());
                ReportStatus::Reported(message)
            }
            Err(e) => {
                warn!(error = %e, %hash, "deposit report failed");
                self.ctx.report(&e);
                ReportStatus::Failed(e.user_message())
            }
        };
        &self.report
    }

    /// Start over for another deposit.
    pub fn reset(&mut self) {
        self.tx_hash = None;
        self.report = ReportStatus::Idle;
    }
}
