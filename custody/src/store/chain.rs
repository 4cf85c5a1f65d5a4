use alloy::primitives::Address;
use parking_lot::Mutex;
use tracing::info;

/// Wallet binding as last reported by the wallet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainState {
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
    pub connected: bool,
}

impl ChainState {
    pub fn is_on(&self, chain_id: u64) -> bool {
        self.connected && self.chain_id == Some(chain_id)
    }
}

/// Connected wallet address and chain id. Not persisted.
#[derive(Debug, Default)]
pub struct ChainStore {
    state: Mutex<ChainState>,
}

impl ChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ChainState {
        *self.state.lock()
    }

    /// Record a connect, account change or chain change.
    pub fn set_chain(&self, address: Address, chain_id: u64) {
        let mut state = self.state.lock();
        if state.address != Some(address) || state.chain_id != Some(chain_id) {
            info!(%address, chain_id, "wallet bound");
        }
        *state = ChainState {
            address: Some(address),
            chain_id: Some(chain_id),
            connected: true,
        };
    }

    pub fn disconnect(&self) {
        *self.state.lock() = ChainState::default();
        info!("wallet disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_disconnect() {
        let store = ChainStore::new();
        assert!(!store.snapshot().connected);

        let addr = Address::repeat_byte(0xab);
        store.set_chain(addr, 11_155_111);
        let snap = store.snapshot();
        assert!(snap.connected);
        assert_eq!(snap.address, Some(addr));
        assert!(snap.is_on(11_155_111));
        assert!(!snap.is_on(1));

        store.disconnect();
        assert_eq!(store.snapshot(), ChainState::default());
    }
}
