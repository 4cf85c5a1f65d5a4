use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub id: String,
    pub to_address: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLimitUpdate {
    #[serde(default)]
    pub tx_hash: Option<String>,
    pub max_eth: String,
    pub max_wei: String,
    pub is_unlimited: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLimit {
    pub max_eth: String,
    pub max_wei: String,
    pub spent_eth: String,
    pub spent_wei: String,
    #[serde(default)]
    pub remaining_eth: Option<String>,
    #[serde(default)]
    pub remaining_wei: Option<String>,
    pub day_key: u64,
    pub today_key: u64,
    pub is_unlimited: bool,
    pub is_new_day: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ToBody<'a> {
    pub to: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DailyLimitBody {
    /// Sent as a JSON number; `0` means unlimited.
    #[serde(with = "rust_decimal::serde::float")]
    pub max_eth: Decimal,
}
