//! Authenticated session state with write-through persistence.

use std::sync::Arc;

use alloy::primitives::B256;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::store::storage::Storage;
use crate::types::AccountStatus;

/// Storage key holding the persisted session object.
pub const SESSION_STORAGE_KEY: &str = "custody-session";

/// Current session fields.
///
/// `user_key` is the bytes32 deposit key; it lives in memory only and is
/// never written to storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub status: Option<AccountStatus>,
    pub user_key: Option<B256>,
}

impl Session {
    /// True iff both a token and a user id are present.
    pub fn is_authenticated(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.access_token) && present(&self.user_id)
    }

    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.trim().eq_ignore_ascii_case("admin"))
    }

    pub fn is_frozen(&self) -> bool {
        self.status == Some(AccountStatus::Frozen)
    }
}

/// Fields supplied when a login or email verification succeeds.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub access_token: String,
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub status: Option<AccountStatus>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<AccountStatus>,
}

impl From<&Session> for PersistedSession {
    fn from(s: &Session) -> Self {
        Self {
            access_token: s.access_token.clone(),
            user_id: s.user_id.clone(),
            email: s.email.clone(),
            role: s.role.clone(),
            status: s.status,
        }
    }
}

/// Session store shared by pages, the route guard and the API client.
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    state: Mutex<Session>,
}

impl SessionStore {
    /// Restore the session persisted in `storage`, if any.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let persisted = read_persisted(storage.as_ref()).unwrap_or_default();
        let state = Session {
            access_token: persisted.access_token,
            user_id: persisted.user_id,
            email: persisted.email,
            role: persisted.role,
            status: persisted.status,
            user_key: None,
        };
        debug!(authenticated = state.is_authenticated(), "session restored");
        Self {
            storage,
            state: Mutex::new(state),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.state.lock().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.lock().is_authenticated()
    }

    /// Replace the session and persist it.
    pub fn set_session(&self, new: NewSession) -> Result<()> {
        let mut state = self.state.lock();
        *state = Session {
            access_token: Some(new.access_token),
            user_id: Some(new.user_id),
            email: new.email,
            role: new.role,
            status: Some(new.status.unwrap_or_default()),
            user_key: None,
        };
        info!(user_id = ?state.user_id, role = ?state.role, "session set");
        self.persist(&state)
    }

    pub fn update_status(&self, status: AccountStatus) -> Result<()> {
        let mut state = self.state.lock();
        state.status = Some(status);
        self.persist(&state)
    }

    /// Attach the in-memory deposit key. Not persisted.
    pub fn set_user_key(&self, user_key: B256) {
        self.state.lock().user_key = Some(user_key);
    }

    /// Erase every session field, in memory and in storage.
    pub fn clear_session(&self) -> Result<()> {
        let mut state = self.state.lock();
        *state = Session::default();
        info!("session cleared");
        self.storage.remove(SESSION_STORAGE_KEY)
    }

    /// Tear down the session after an unauthorized response.
    ///
    /// Returns `true` only for the call that actually removed credentials, so
    /// concurrent 401s produce a single redirect.
    pub fn invalidate(&self) -> bool {
        let mut state = self.state.lock();
        let stored = read_persisted(self.storage.as_ref())
            .map(|p| p.access_token.is_some() || p.user_id.is_some())
            .unwrap_or(false);
        let had_credentials =
            stored || state.access_token.is_some() || state.user_id.is_some();

        *state = Session::default();
        if let Err(e) = self.storage.remove(SESSION_STORAGE_KEY) {
            warn!(error = %e, "failed to remove stored session");
        }
        had_credentials
    }

    /// Token as currently stored, bypassing the in-memory copy.
    pub fn stored_token(&self) -> Option<String> {
        read_persisted(self.storage.as_ref())
            .and_then(|p| p.access_token)
            .filter(|t| !t.is_empty())
    }

    fn persist(&self, state: &Session) -> Result<()> {
        let raw = serde_json::to_string(&PersistedSession::from(state))?;
        self.storage.set(SESSION_STORAGE_KEY, &raw)
    }
}

fn read_persisted(storage: &dyn Storage) -> Option<PersistedSession> {
    let raw = storage.get(SESSION_STORAGE_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(p) => Some(p),
        Err(e) => {
            warn!(error = %e, "ignoring unreadable stored session");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::storage::MemoryStorage;

    fn new_session() -> NewSession {
        NewSession {
            access_token: "tok".into(),
            user_id: "u-1".into(),
            email: Some("alice@example.com".into()),
            role: Some("user".into()),
            status: None,
        }
    }

    #[test]
    fn test_authenticated_requires_token_and_user_id() {
        let mut session = Session {
            access_token: Some("tok".into()),
            user_id: Some("u-1".into()),
            ..Default::default()
        };
        assert!(session.is_authenticated());

        session.user_id = None;
        assert!(!session.is_authenticated());

        session.user_id = Some("u-1".into());
        session.access_token = None;
        assert!(!session.is_authenticated());

        session.access_token = Some(String::new());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_set_session_persists_and_reloads() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = SessionStore::load(Arc::clone(&storage));
        store.set_session(new_session()).unwrap();
        store.set_user_key(B256::repeat_byte(0x11));

        let reloaded = SessionStore::load(storage);
        let snap = reloaded.snapshot();
        assert!(snap.is_authenticated());
        assert_eq!(snap.email.as_deref(), Some("alice@example.com"));
        assert_eq!(snap.status, Some(AccountStatus::Active));
        assert_eq!(snap.user_key, None, "user key is never persisted");
    }

    #[test]
    fn test_clear_session_erases_everything() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = SessionStore::load(Arc::clone(&storage));
        store.set_session(new_session()).unwrap();
        store.clear_session().unwrap();
        assert_eq!(store.snapshot(), Session::default());
        assert_eq!(storage.get(SESSION_STORAGE_KEY), None);
    }

    #[test]
    fn test_invalidate_reports_only_first_teardown() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = SessionStore::load(storage);
        store.set_session(new_session()).unwrap();
        assert!(store.invalidate());
        assert!(!store.invalidate());
        assert!(!store.is_authenticated());
        assert_eq!(store.stored_token(), None);
    }

    #[test]
    fn test_stored_token_reads_storage_not_memory() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = SessionStore::load(Arc::clone(&storage));
        store.set_session(new_session()).unwrap();
        storage
            .set(SESSION_STORAGE_KEY, r#"{"accessToken":"rotated","userId":"u-1"}"#)
            .unwrap();
        assert_eq!(store.stored_token().as_deref(), Some("rotated"));
        assert_eq!(store.snapshot().access_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_admin_and_frozen_predicates() {
        let session = Session {
            role: Some(" Admin ".into()),
            status: Some(AccountStatus::Frozen),
            ..Default::default()
        };
        assert!(session.is_admin());
        assert!(session.is_frozen());
    }
}
