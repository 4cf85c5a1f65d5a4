use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::Direction;
use crate::utils::format_wei_to_eth;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositReport {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawSubmitRequest {
    pub to: String,
    /// ETH decimal string.
    pub amount: String,
    /// Step-up password.
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawSubmitted {
    #[serde(default)]
    pub tx_id: Option<String>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawApproved {
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub manager_tx_hash: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_small_tx: bool,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub requires_manager_approval: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawExecuted {
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxHistoryItem {
    pub tx_hash: String,
    pub direction: Direction,
    pub status: String,
    /// Wei, as a decimal integer string.
    pub amount: String,
    #[serde(default)]
    pub created_at: Option<String>,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub block_number: Option<String>,
}

impl TxHistoryItem {
    /// Transferred amount in ETH.
    pub fn amount_eth(&self) -> Result<String> {
        format_wei_to_eth(&self.amount)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TxHashBody<'a> {
    pub tx_hash: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TxIdBody<'a> {
    pub tx_id: &'a str,
}
