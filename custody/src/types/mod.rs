pub mod admin;
pub mod auth;
pub mod enums;
pub mod settings;
pub mod tx;

use serde::{Deserialize, Serialize};

pub use admin::*;
pub use auth::*;
pub use enums::*;
pub use settings::*;
pub use tx::*;

/// Standard `{ message, data }` response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub message: String,
    pub data: T,
}

/// Bare `{ message }` acknowledgement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}
