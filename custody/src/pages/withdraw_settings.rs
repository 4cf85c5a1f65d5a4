use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::warn;

use crate::client::Custody;
use crate::error::Result;
use crate::pages::invalid;
use crate::types::DailyLimit;
use crate::utils::to_checksum_address;

/// Withdrawal whitelist and daily limit.
pub struct WithdrawSettingsPage {
    ctx: Custody,
    whitelist: Vec<String>,
    daily_limit: Option<DailyLimit>,
}

impl WithdrawSettingsPage {
    pub fn new(ctx: &Custody) -> Self {
        Self {
            ctx: ctx.clone(),
            whitelist: Vec::new(),
            daily_limit: None,
        }
    }

    /// Whitelisted recipients, checksummed.
    pub fn whitelist(&self) -> &[String] {
        &self.whitelist
    }

    pub fn daily_limit(&self) -> Option<&DailyLimit> {
        self.daily_limit.as_ref()
    }

    /// Reload both settings. A daily-limit failure is not fatal.
    pub async fn load(&mut self) -> Result<()> {
        let entries = match self.ctx.api.get_whitelist().await {
            Ok(entries) => entries,
            Err(e) => {
                self.ctx.report(&e);
                return Err(e);
            }
        };
        self.whitelist = entries
            .iter()
            .filter_map(|e| to_checksum_address(&e.to_address))
            .collect();

        match self.ctx.api.get_daily_limit().await {
            Ok(limit) => self.daily_limit = Some(limit),
            Err(e) => warn!(error = %e, "daily limit unavailable"),
        }
        Ok(())
    }

    /// Whitelist an address. Returns `false` when it was already listed.
    pub async fn add_address(&mut self, address: &str) -> Result<bool> {
        let address = address.trim();
        if address.is_empty() {
            return invalid(&self.ctx, "Enter an address.");
        }
        let Some(checksummed) = to_checksum_address(address) else {
            return invalid(&self.ctx, "Invalid address.");
        };
        if self.whitelist.contains(&checksummed) {
            self.ctx.ui.warning("This address is already whitelisted.");
            return Ok(false);
        }

        if let Err(e) = self.ctx.api.add_whitelist(&checksummed).await {
            self.ctx.report(&e);
            return Err(e);
        }
        self.load().await?;
        self.ctx.ui.success("Address added.");
        Ok(true)
    }

    pub async fn remove_address(&mut self, address: &str) -> Result<()> {
        let address = address.trim();
        let target = to_checksum_address(address).unwrap_or_else(|| address.to_string());
        if let Err(e) = self.ctx.api.remove_whitelist(&target).await {
            self.ctx.report(&e);
            return Err(e);
        }
        self.load().await?;
        self.ctx.ui.success("Address removed.");
        Ok(())
    }

    /// Set the daily withdrawal limit in ETH; `0` removes the limit.
    pub async fn set_daily_limit(&mut self, input: &str) -> Result<()> {
        let input = input.trim();
        if input.is_empty() {
            return invalid(&self.ctx, "Enter a limit.");
        }
        let max_eth = match Decimal::from_str(input) {
            Ok(v) if v >= Decimal::ZERO => v,
            _ => return invalid(&self.ctx, "Enter a valid limit (0 or more)."),
        };

        if let Err(e) = self.ctx.api.set_daily_limit(max_eth).await {
            self.ctx.report(&e);
            return Err(e);
        }
        self.load().await?;
        if max_eth.is_zero() {
            self.ctx.ui.success("Daily withdrawal limit removed.");
        } else {
            self.ctx
                .ui
                .success(format!("Daily withdrawal limit set to {max_eth} ETH."));
        }
        Ok(())
    }
}
