use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountStatus {
    #[default]
    Active,
    Frozen,
}

impl AccountStatus {
    /// Interpret a loosely formatted status field; anything that is not
    /// "frozen" (ignoring case and surrounding whitespace) counts as active.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("frozen") => AccountStatus::Frozen,
            _ => AccountStatus::Active,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            AccountStatus::Active => AccountStatus::Frozen,
            AccountStatus::Frozen => AccountStatus::Active,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "ACTIVE"),
            AccountStatus::Frozen => write!(f, "FROZEN"),
        }
    }
}

/// Direction of a user transfer as seen from the user's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "IN",
            Direction::Out => "OUT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of an entry in the admin transaction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferKind {
    Deposit,
    Withdraw,
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferKind::Deposit => write!(f, "DEPOSIT"),
            TransferKind::Withdraw => write!(f, "WITHDRAW"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OmnibusStatus {
    Active,
    Paused,
}
