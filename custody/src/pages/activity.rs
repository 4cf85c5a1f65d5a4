use crate::client::Custody;
use crate::error::Result;
use crate::types::{Direction, TxHistoryItem};

pub struct ActivityPage {
    ctx: Custody,
}

impl ActivityPage {
    pub fn new(ctx: &Custody) -> Self {
        Self { ctx: ctx.clone() }
    }

    /// Deposits and withdrawals, optionally only one direction.
    pub async fn load(&self, direction: Option<Direction>) -> Result<Vec<TxHistoryItem>> {
        let _loading = self.ctx.ui.loading();
        self.ctx.api.get_tx_history(direction).await.inspect_err(|e| {
            self.ctx.report(e);
        })
    }
}
