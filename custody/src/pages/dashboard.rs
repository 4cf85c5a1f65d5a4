use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::client::Custody;
use crate::error::{CustodyError, Result};
use crate::store::ChainState;
use crate::types::{AccountStatus, DailyBalance, Direction, TxHistoryItem};
use crate::utils::{eth_to_wei, format_wei_to_eth, wei_to_eth};
use crate::wallet::NetworkCheck;

/// Days of balance history shown by default.
pub const DEFAULT_HISTORY_DAYS: u32 = 7;

/// Number of history entries shown as "recent activity".
const RECENT_ACTIVITY: usize = 5;

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub email: Option<String>,
    pub status: AccountStatus,
    /// Custodial balance in ETH.
    pub balance_eth: String,
    pub history: Vec<DailyBalance>,
    pub recent: Vec<TxHistoryItem>,
    pub wallet: ChainState,
}

pub struct DashboardPage {
    ctx: Custody,
    history_days: u32,
}

impl DashboardPage {
    pub fn new(ctx: &Custody) -> Self {
        Self {
            ctx: ctx.clone(),
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }

    pub fn set_history_days(&mut self, days: u32) {
        self.history_days = days.max(1);
    }

    /// Profile, balance history and recent transfers.
    ///
    /// Only the profile is required. When the backend has no balance history
    /// it is rebuilt from the transfer list; when neither is available the
    /// section is left empty.
    pub async fn load(&self) -> Result<DashboardView> {
        let _loading = self.ctx.ui.loading();

        let profile = match self.ctx.api.get_profile().await {
            Ok(p) => p,
            Err(e) => {
                self.ctx.report(&e);
                return Err(e);
            }
        };
        let status = profile.user.account_status();
        self.ctx.session.update_status(status)?;

        let balance_wei = profile.user.balance.as_deref().unwrap_or("0");
        let balance_eth = format_wei_to_eth(balance_wei)?;
        let today = Utc::now().date_naive();

        let (history, transfers) = tokio::join!(
            self.ctx.api.get_daily_balance_history(self.history_days),
            self.ctx.api.get_tx_history(None),
        );
        let history = match history {
            Ok(mut history) => {
                append_today(&mut history, today, balance_wei, &balance_eth);
                history
            }
            Err(e) => {
                warn!(error = %e, "balance history unavailable, rebuilding from transfers");
                match &transfers {
                    Ok(items) => wei_to_eth(balance_wei)
                        .and_then(|current| {
                            rebuild_balance_history(items, current, today, self.history_days)
                        })
                        .unwrap_or_else(|e| {
                            warn!(error = %e, "cannot rebuild balance history");
                            Vec::new()
                        }),
                    Err(_) => Vec::new(),
                }
            }
        };
        let mut recent = transfers.unwrap_or_else(|e| {
            warn!(error = %e, "transfer history unavailable");
            Vec::new()
        });
        recent.truncate(RECENT_ACTIVITY);

        Ok(DashboardView {
            email: Some(profile.user.email),
            status,
            balance_eth,
            history,
            recent,
            wallet: self.ctx.chain.snapshot(),
        })
    }

    /// Connect the wallet and make sure it is on the expected chain.
    pub async fn connect_wallet(&self) -> Result<ChainState> {
        let before = self.ctx.chain.snapshot();
        match self
            .ctx
            .network
            .ensure(&self.ctx.wallet, &self.ctx.chain, &self.ctx.ui)
            .await
        {
            Ok(check) => {
                let state = self.ctx.chain.snapshot();
                if before.address != state.address {
                    self.ctx.ui.success("Wallet connected.");
                }
                if let NetworkCheck::Switched { from } = check {
                    self.ctx
                        .ui
                        .info(format!("Switched wallet from chain {from} to Sepolia."));
                }
                Ok(state)
            }
            // The network guard has already raised its own warning.
            Err(e @ CustodyError::WrongNetwork { .. }) => Err(e),
            Err(e) => {
                self.ctx.report(&e);
                Err(e)
            }
        }
    }

    pub fn disconnect_wallet(&self) {
        self.ctx.chain.disconnect();
        self.ctx.ui.info("Wallet disconnected.");
    }

    pub fn logout(&self) -> Result<()> {
        self.disconnect_wallet();
        self.ctx.logout()
    }
}

/// Add today's balance when the backend history stops before today.
fn append_today(
    history: &mut Vec<DailyBalance>,
    today: NaiveDate,
    balance_wei: &str,
    balance_eth: &str,
) {
    let date = today.format("%Y-%m-%d").to_string();
    if history.iter().any(|day| day.date == date) {
        return;
    }
    history.push(DailyBalance {
        date,
        balance: balance_wei.to_string(),
        balance_eth: balance_eth.to_string(),
    });
}

/// End-of-day balances for the last `days` days, oldest first.
///
/// Walks back from `current` through each day's net transfers. Transfers
/// without a parseable timestamp or amount are ignored; balances never go
/// below zero.
pub fn rebuild_balance_history(
    transfers: &[TxHistoryItem],
    current: Decimal,
    today: NaiveDate,
    days: u32,
) -> Result<Vec<DailyBalance>> {
    let mut net: HashMap<NaiveDate, Decimal> = HashMap::new();
    for tx in transfers {
        let Some(date) = tx
            .created_at
            .as_deref()
            .and_then(|at| DateTime::parse_from_rfc3339(at).ok())
            .map(|at| at.with_timezone(&Utc).date_naive())
        else {
            continue;
        };
        let amount = match wei_to_eth(&tx.amount) {
            Ok(amount) => amount,
            Err(e) => {
                debug!(tx = %tx.tx_hash, error = %e, "skipping transfer");
                continue;
            }
        };
        let change = match tx.direction {
            Direction::In => amount,
            Direction::Out => -amount,
        };
        *net.entry(date).or_default() += change;
    }

    let mut history = Vec::with_capacity(days as usize);
    let mut running = current;
    for back in 0..u64::from(days) {
        let Some(date) = today.checked_sub_days(Days::new(back)) else {
            break;
        };
        let balance = running.max(Decimal::ZERO);
        history.push(DailyBalance {
            date: date.format("%Y-%m-%d").to_string(),
            balance: eth_to_wei(balance)?.to_string(),
            balance_eth: balance.normalize().to_string(),
        });
        running -= net.get(&date).copied().unwrap_or_default();
    }
    history.reverse();
    Ok(history)
}
