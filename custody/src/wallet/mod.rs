//! Browser-wallet bridge over JSON-RPC 2.0.
//!
//! The wallet endpoint holds the user's keys; this client only asks it for
//! accounts, the active chain, chain switches and transaction submission.

pub mod network;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::CustodyConfig;
use crate::error::{CustodyError, Result};

pub use network::{NetworkCheck, NetworkGuard};

sol! {
    function depositETH(bytes32 userKey) external payable;
}

/// Deposit key for an account: the email as UTF-8, right-padded to 32 bytes.
pub fn user_key_from_email(email: &str) -> Result<B256> {
    let bytes = email.as_bytes();
    if bytes.is_empty() || bytes.len() > 32 {
        return Err(CustodyError::Validation(format!(
            "email must be 1..=32 bytes to form a deposit key, got {}",
            bytes.len()
        )));
    }
    let mut key = [0u8; 32];
    key[..bytes.len()].copy_from_slice(bytes);
    Ok(B256::from(key))
}

/// ABI-encoded `depositETH(userKey)` calldata.
pub fn encode_deposit(user_key: B256) -> Bytes {
    depositETHCall { userKey: user_key }.abi_encode().into()
}

/// Mined transaction receipt, as much of it as the dashboard needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U256>,
    /// `0x1` success, `0x0` reverted.
    #[serde(default)]
    pub status: Option<U256>,
}

impl TxReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.map_or(true, |s| s == U256::from(1))
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TxRequest {
    from: Address,
    to: Address,
    value: String,
    data: String,
}

/// JSON-RPC client for the user's wallet.
pub struct WalletClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
    receipt_timeout: Duration,
    poll_interval: Duration,
}

impl WalletClient {
    pub fn new(config: &CustodyConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.api_timeout).build()?;
        Ok(Self {
            client,
            url: config.wallet_rpc_url.clone(),
            next_id: AtomicU64::new(1),
            receipt_timeout: config.receipt_timeout,
            poll_interval: config.receipt_poll_interval,
        })
    }

    /// Ask the wallet for its accounts; the first one is the active account.
    pub async fn request_accounts(&self) -> Result<Address> {
        let accounts: Vec<Address> = self.call("eth_requestAccounts", json!([])).await?;
        accounts
            .into_iter()
            .next()
            .ok_or_else(|| CustodyError::Wallet("wallet returned no accounts".into()))
    }

    pub async fn chain_id(&self) -> Result<u64> {
        let hex_id: String = self.call("eth_chainId", json!([])).await?;
        parse_hex_u64(&hex_id)
    }

    pub async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        info!(chain_id, "requesting chain switch");
        let _: Value = self
            .call(
                "wallet_switchEthereumChain",
                json!([{ "chainId": format!("0x{chain_id:x}") }]),
            )
            .await?;
        Ok(())
    }

    /// Submit a transaction for the wallet to sign and broadcast.
    pub async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        value: U256,
        data: &Bytes,
    ) -> Result<B256> {
        let tx = TxRequest {
            from,
            to,
            value: format!("0x{value:x}"),
            data: format!("0x{}", hex::encode(data)),
        };
        let hash: B256 = self.call("eth_sendTransaction", json!([tx])).await?;
        info!(%hash, %to, %value, "transaction sent");
        Ok(hash)
    }

    /// `depositETH(userKey)` to `vault` carrying `value_wei`.
    pub async fn deposit_eth(
        &self,
        from: Address,
        vault: Address,
        user_key: B256,
        value_wei: U256,
    ) -> Result<B256> {
        let data = encode_deposit(user_key);
        self.send_transaction(from, vault, value_wei, &data).await
    }

    /// Poll for the receipt of `hash` until it is mined or the timeout elapses.
    pub async fn wait_for_receipt(&self, hash: B256) -> Result<TxReceipt> {
        let deadline = Instant::now() + self.receipt_timeout;
        loop {
            let receipt: Option<TxReceipt> = self
                .call("eth_getTransactionReceipt", json!([hash]))
                .await?;
            if let Some(receipt) = receipt {
                if !receipt.succeeded() {
                    warn!(%hash, "transaction reverted");
                    return Err(CustodyError::Wallet(format!("transaction {hash} reverted")));
                }
                info!(%hash, block = ?receipt.block_number, "transaction mined");
                return Ok(receipt);
            }
            if Instant::now() >= deadline {
                return Err(CustodyError::Wallet(format!(
                    "timed out waiting for receipt of {hash}"
                )));
            }
            debug!(%hash, "receipt not yet available");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "wallet rpc");
        let req = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let resp = self.client.post(&self.url).json(&req).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CustodyError::Wallet(format!(
                "wallet endpoint returned HTTP {status}: {body}"
            )));
        }

        let rpc: RpcResponse = resp.json().await?;
        if let Some(err) = rpc.error {
            return Err(CustodyError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(serde_json::from_value(rpc.result.unwrap_or(Value::Null))?)
    }
}

fn parse_hex_u64(value: &str) -> Result<u64> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u64::from_str_radix(digits, 16)
        .map_err(|e| CustodyError::Wallet(format!("invalid chain id {value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_key_is_right_padded_email() {
        let key = user_key_from_email("a@b.io").unwrap();
        assert_eq!(&key[..6], b"a@b.io");
        assert!(key[6..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_user_key_rejects_long_email() {
        let email = format!("{}@example.com", "x".repeat(30));
        assert!(matches!(
            user_key_from_email(&email),
            Err(CustodyError::Validation(_))
        ));
        assert!(user_key_from_email("").is_err());
    }

    #[test]
    fn test_deposit_calldata_layout() {
        let key = user_key_from_email("a@b.io").unwrap();
        let data = encode_deposit(key);
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], depositETHCall::SELECTOR.as_slice());
        assert_eq!(&data[4..], key.as_slice());
    }

    #[test]
    fn test_parse_hex_chain_id() {
        assert_eq!(parse_hex_u64("0xaa36a7").unwrap(), 11_155_111);
        assert_eq!(parse_hex_u64("0x1").unwrap(), 1);
        assert!(parse_hex_u64("0xzz").is_err());
    }

    #[test]
    fn test_receipt_status() {
        let ok: TxReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "11".repeat(32)),
            "blockNumber": "0x10",
            "status": "0x1"
        }))
        .unwrap();
        assert!(ok.succeeded());
        assert_eq!(ok.block_number, Some(U256::from(16)));

        let reverted: TxReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "11".repeat(32)),
            "status": "0x0"
        }))
        .unwrap();
        assert!(!reverted.succeeded());
    }
}
