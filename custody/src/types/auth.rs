use serde::{Deserialize, Serialize};

use crate::types::AccountStatus;

/// User record returned by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

impl AuthUser {
    pub fn account_status(&self) -> AccountStatus {
        AccountStatus::parse_lenient(self.status.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
    pub user: AuthUser,
}

/// Login and email-verification result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    pub user: AuthUser,
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub message: String,
    pub user: AuthUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBalance {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Wei.
    pub balance: String,
    pub balance_eth: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct EmailBody<'a> {
    pub email: &'a str,
}
