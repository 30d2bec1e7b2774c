//! Authenticated-session lifecycle.
//!
//! ```text
//!             initialize()
//! Unsettled ───────────────► Unauthenticated ◄── logout() / credential rejected ──┐
//!     │                            │                                              │
//!     │ initialize()               │ login() ok                                   │
//!     │ (valid stored credential)  ▼                                              │
//!     └──────────────────────► Authenticated ─────────────────────────────────────┘
//! ```

pub mod persist;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use persist::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use state::{Credential, Session, SessionPhase, SessionState};
pub use store::{LoginFailure, LoginOutcome, SessionStore, SessionWatcher};
