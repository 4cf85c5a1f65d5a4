use serde::{Deserialize, Serialize};

use crate::types::{AccountStatus, OmnibusStatus, TransferKind};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultBalance {
    /// Wei.
    #[serde(default)]
    pub balance: String,
    #[serde(default)]
    pub balance_eth: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub status: AccountStatus,
    pub balance: String,
    pub balance_eth: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatusUpdate {
    pub id: String,
    pub status: AccountStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminTransaction {
    #[serde(rename = "type")]
    pub kind: TransferKind,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    pub amount: String,
    /// Unix seconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminTransactions {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub transactions: Vec<AdminTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmnibusPaused {
    pub paused: bool,
    pub status: OmnibusStatus,
}

impl Default for OmnibusPaused {
    fn default() -> Self {
        Self {
            paused: false,
            status: OmnibusStatus::Active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OmnibusPauseResult {
    pub paused: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColdDeposit {
    pub tx_hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    pub amount: String,
    pub amount_eth: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColdMoveRequested {
    pub tx_hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    /// bytes32 move id.
    pub move_id: String,
    pub amount: String,
    pub amount_eth: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColdMoveApproved {
    pub tx_hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(rename = "TSStxHash", default)]
    pub tss_tx_hash: Option<String>,
    #[serde(rename = "TSSblockNumber", default)]
    pub tss_block_number: Option<String>,
    pub move_id: String,
    pub approved_admin1: bool,
    pub approved_admin2: bool,
    #[serde(default)]
    pub is_executable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColdMoveExecuted {
    pub tx_hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    pub move_id: String,
    pub amount: String,
    pub amount_eth: String,
    pub executed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingWithdrawal {
    pub tx_id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub to: String,
    pub amount: String,
    pub amount_eth: String,
    pub approved_tss: bool,
    pub approved_manager: bool,
    pub executed: bool,
    pub requires_manager_approval: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingWithdrawals {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub requests: Vec<PendingWithdrawal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequestInfo {
    pub tx_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub to: String,
    pub amount: String,
    pub amount_eth: String,
    pub approved_tss: bool,
    pub approved_manager: bool,
    pub executed: bool,
    pub is_small_tx: bool,
    pub requires_manager_approval: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerApproval {
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
    pub tx_id: String,
    pub amount: String,
    pub amount_eth: String,
    pub approved_tss: bool,
    pub approved_manager: bool,
    pub executed: bool,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminWithdrawalExecution {
    #[serde(default)]
    pub tx_hash: Option<String>,
    pub status: String,
    pub amount: String,
    pub amount_eth: String,
    #[serde(default)]
    pub new_balance: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserStatusBody<'a> {
    pub user_id: &'a str,
    pub status: AccountStatus,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PauseBody {
    pub paused: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AmountEthBody<'a> {
    pub amount_eth: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MoveIdBody<'a> {
    pub move_id: &'a str,
}
