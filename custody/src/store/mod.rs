pub mod chain;
pub mod session;
pub mod storage;
pub mod theme;
pub mod ui;

pub use chain::{ChainState, ChainStore};
pub use session::{NewSession, Session, SessionStore, SESSION_STORAGE_KEY};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use theme::{ThemeStore, THEME_STORAGE_KEY};
pub use ui::{LoadingGuard, Notification, NotificationKind, UiStore};
