use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Backend error codes with a fixed user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    FrozenAccount,
    PolicyCheckFail,
    InsufficientFunds,
    NonceConflict,
    InvalidAddress,
    InvalidAmount,
    DailyLimitExceeded,
    NotWhitelisted,
    Unauthorized,
    NetworkError,
    EmailNotVerified,
    Other(String),
}

impl ErrorCode {
    pub fn parse(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "FROZEN_ACCOUNT" => ErrorCode::FrozenAccount,
            "POLICY_CHECK_FAIL" => ErrorCode::PolicyCheckFail,
            "INSUFFICIENT_FUNDS" => ErrorCode::InsufficientFunds,
            "NONCE_CONFLICT" => ErrorCode::NonceConflict,
            "INVALID_ADDRESS" => ErrorCode::InvalidAddress,
            "INVALID_AMOUNT" => ErrorCode::InvalidAmount,
            "DAILY_LIMIT_EXCEEDED" => ErrorCode::DailyLimitExceeded,
            "NOT_WHITELISTED" => ErrorCode::NotWhitelisted,
            "UNAUTHORIZED" => ErrorCode::Unauthorized,
            "NETWORK_ERROR" => ErrorCode::NetworkError,
            "EMAIL_NOT_VERIFIED" => ErrorCode::EmailNotVerified,
            _ => ErrorCode::Other(code.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::FrozenAccount => "FROZEN_ACCOUNT",
            ErrorCode::PolicyCheckFail => "POLICY_CHECK_FAIL",
            ErrorCode::InsufficientFunds => "INSUFFICIENT_FUNDS",
            ErrorCode::NonceConflict => "NONCE_CONFLICT",
            ErrorCode::InvalidAddress => "INVALID_ADDRESS",
            ErrorCode::InvalidAmount => "INVALID_AMOUNT",
            ErrorCode::DailyLimitExceeded => "DAILY_LIMIT_EXCEEDED",
            ErrorCode::NotWhitelisted => "NOT_WHITELISTED",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            ErrorCode::Other(code) => code,
        }
    }

    /// Fixed user-facing message for this code.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::FrozenAccount => "Your account is frozen; withdrawals are disabled.",
            ErrorCode::PolicyCheckFail => {
                "Policy check failed. Review your whitelist and daily limit."
            }
            ErrorCode::InsufficientFunds => {
                "The vault has insufficient funds. Please try again later."
            }
            ErrorCode::NonceConflict => "The network is congested. Please try again shortly.",
            ErrorCode::InvalidAddress => "The address format is invalid.",
            ErrorCode::InvalidAmount => "The amount is invalid.",
            ErrorCode::DailyLimitExceeded => "The daily withdrawal limit has been exceeded.",
            ErrorCode::NotWhitelisted => "The address is not on your withdrawal whitelist.",
            ErrorCode::Unauthorized => "Authentication required. Please log in again.",
            ErrorCode::NetworkError => "A network error occurred. Please try again shortly.",
            ErrorCode::EmailNotVerified => "Email verification is required.",
            ErrorCode::Other(_) => GENERIC_ERROR_MESSAGE,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message used when neither the backend nor the code table has anything better.
pub const GENERIC_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// A non-2xx backend response, normalised from whatever shape the body had.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub code: Option<ErrorCode>,
    pub message: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested {
        error: NestedError,
        #[serde(default)]
        message: Option<String>,
    },
    Flat {
        #[serde(default)]
        error: Option<String>,
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
}

#[derive(Deserialize)]
struct NestedError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    /// Collapse a response body into a single error.
    ///
    /// The first present message wins, in order: top-level `message`,
    /// `error.message`, `error` as a string, then the raw body text.
    pub fn from_body(status: u16, body: &str) -> Self {
        let (code, message) = match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody::Nested { error, message }) => {
                (error.code, non_empty(message).or(non_empty(error.message)))
            }
            Ok(ErrorBody::Flat {
                error,
                code,
                message,
            }) => (code, non_empty(message).or(non_empty(error))),
            Err(_) => (None, non_empty(Some(body.trim().to_string()))),
        };

        let code = code.map(|c| ErrorCode::parse(&c));
        let message = message
            .or_else(|| code.as_ref().map(|c| c.message().to_string()))
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());

        Self {
            status,
            code,
            message,
        }
    }

    /// Message to show the user: the code table entry for known codes,
    /// otherwise the backend's own message.
    pub fn user_message(&self) -> String {
        match &self.code {
            Some(code) if !matches!(code, ErrorCode::Other(_)) => code.message().to_string(),
            _ => self.message.clone(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "HTTP {} [{}]: {}", self.status, code, self.message),
            None => write!(f, "HTTP {}: {}", self.status, self.message),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[derive(Error, Debug)]
pub enum CustodyError {
    #[error("{0}")]
    Api(ApiError),

    #[error("unauthorized: session cleared")]
    Unauthorized,

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("wrong network: expected chain {expected}, wallet is on {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("account is frozen")]
    AccountFrozen,

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl CustodyError {
    /// Best-effort human message for a notification.
    pub fn user_message(&self) -> String {
        match self {
            CustodyError::Api(err) => err.user_message(),
            CustodyError::Unauthorized => ErrorCode::Unauthorized.message().to_string(),
            CustodyError::Request(_) => ErrorCode::NetworkError.message().to_string(),
            CustodyError::AccountFrozen => ErrorCode::FrozenAccount.message().to_string(),
            CustodyError::NotAuthenticated => "Login required.".to_string(),
            CustodyError::Validation(msg) | CustodyError::Wallet(msg) => msg.clone(),
            CustodyError::Rpc { message, .. } => message.clone(),
            CustodyError::WrongNetwork { expected, .. } => {
                format!("Please switch your wallet to chain {expected}.")
            }
            CustodyError::Json(_) | CustodyError::Storage(_) | CustodyError::Config(_) => {
                self.to_string()
            }
        }
    }

    /// The backend error code, if this error came from the backend.
    pub fn code(&self) -> Option<&ErrorCode> {
        match self {
            CustodyError::Api(err) => err.code.as_ref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CustodyError::Unauthorized)
    }
}

pub type Result<T> = std::result::Result<T, CustodyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_error_shape() {
        let err = ApiError::from_body(
            400,
            r#"{"error":{"code":"DAILY_LIMIT_EXCEEDED","message":"limit hit"}}"#,
        );
        assert_eq!(err.code, Some(ErrorCode::DailyLimitExceeded));
        assert_eq!(err.message, "limit hit");
        assert_eq!(
            err.user_message(),
            "The daily withdrawal limit has been exceeded."
        );
    }

    #[test]
    fn test_top_level_message_wins() {
        let err = ApiError::from_body(
            400,
            r#"{"message":"bad password","error":{"message":"ignored"}}"#,
        );
        assert_eq!(err.message, "bad password");
        assert_eq!(err.code, None);
        assert_eq!(err.user_message(), "bad password");
    }

    #[test]
    fn test_string_error_and_plain_text() {
        let err = ApiError::from_body(500, r#"{"error":"boom"}"#);
        assert_eq!(err.message, "boom");

        let err = ApiError::from_body(502, "Bad Gateway");
        assert_eq!(err.message, "Bad Gateway");
        assert_eq!(err.code, None);
    }

    #[test]
    fn test_empty_body_falls_back_to_generic() {
        let err = ApiError::from_body(500, "");
        assert_eq!(err.message, GENERIC_ERROR_MESSAGE);

        let err = ApiError::from_body(400, r#"{"code":"NOT_WHITELISTED"}"#);
        assert_eq!(err.code, Some(ErrorCode::NotWhitelisted));
        assert_eq!(err.message, ErrorCode::NotWhitelisted.message());
    }

    #[test]
    fn test_unknown_code_uses_backend_message() {
        let err = ApiError::from_body(
            409,
            r#"{"error":{"code":"SOMETHING_NEW","message":"try later"}}"#,
        );
        assert_eq!(err.code, Some(ErrorCode::Other("SOMETHING_NEW".into())));
        assert_eq!(err.user_message(), "try later");
        assert_eq!(
            ErrorCode::parse("SOMETHING_NEW").message(),
            GENERIC_ERROR_MESSAGE
        );
    }

    #[test]
    fn test_code_parse_is_case_insensitive() {
        assert_eq!(ErrorCode::parse(" frozen_account "), ErrorCode::FrozenAccount);
        assert_eq!(ErrorCode::NonceConflict.to_string(), "NONCE_CONFLICT");
    }
}
