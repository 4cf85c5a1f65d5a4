use tracing::{info, warn};

use crate::error::{CustodyError, Result};
use crate::store::{ChainStore, UiStore};
use crate::wallet::WalletClient;

/// Outcome of a network check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkCheck {
    /// Already on the expected chain.
    Ok,
    /// Was elsewhere; the wallet accepted a switch.
    Switched { from: u64 },
}

/// Keeps the wallet on the expected chain.
pub struct NetworkGuard {
    expected_chain_id: u64,
}

impl NetworkGuard {
    pub fn new(expected_chain_id: u64) -> Self {
        Self { expected_chain_id }
    }

    pub fn expected_chain_id(&self) -> u64 {
        self.expected_chain_id
    }

    /// Verify the wallet chain, attempting one automatic switch on mismatch.
    ///
    /// If the wallet is still on the wrong chain afterwards a warning is
    /// raised and `WrongNetwork` returned; the chain store always reflects
    /// the last chain the wallet reported.
    pub async fn ensure(
        &self,
        wallet: &WalletClient,
        chain: &ChainStore,
        ui: &UiStore,
    ) -> Result<NetworkCheck> {
        let address = wallet.request_accounts().await?;
        let current = wallet.chain_id().await?;
        chain.set_chain(address, current);
        if current == self.expected_chain_id {
            return Ok(NetworkCheck::Ok);
        }

        info!(
            current,
            expected = self.expected_chain_id,
            "wallet on wrong chain, switching"
        );
        if let Err(e) = wallet.switch_chain(self.expected_chain_id).await {
            warn!(error = %e, "chain switch rejected");
        }

        let after = wallet.chain_id().await?;
        chain.set_chain(address, after);
        if after == self.expected_chain_id {
            return Ok(NetworkCheck::Switched { from: current });
        }

        let err = CustodyError::WrongNetwork {
            expected: self.expected_chain_id,
            actual: after,
        };
        ui.warning(err.user_message());
        Err(err)
    }
}
