//! Login form: collects credentials and hands them to the session store.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

use crate::models::Identity;
use crate::session::{LoginOutcome, SessionStore};

/// What happened to one press of the submit button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    LoggedIn(Identity),
    /// The server (or the network) refused; the reason is also kept in
    /// [`LoginFlow::error`].
    Rejected(String),
    /// A required field was empty; nothing was sent.
    Invalid(String),
    /// A previous submission from this form is still outstanding.
    Busy,
    /// The flow was cancelled, or the session moved on, before the response
    /// arrived.
    Discarded,
}

/// One instance of the login screen.
///
/// The flow never touches the session directly: on success the session store
/// changes state and the route guard reacts to that.
pub struct LoginFlow {
    session: SessionStore,
    cancel: CancellationToken,
    submitting: AtomicBool,
    error: Mutex<Option<String>>,
}

impl LoginFlow {
    pub fn new(session: SessionStore) -> Self {
        Self {
            session,
            cancel: CancellationToken::new(),
            submitting: AtomicBool::new(false),
            error: Mutex::new(None),
        }
    }

    /// Whether the submit button should currently be disabled.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// The message from the last failed submission, if any.
    pub fn error(&self) -> Option<String> {
        self.error.lock().map(|e| e.clone()).unwrap_or(None)
    }

    /// Navigate away: any outstanding request's result will be ignored.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn submit(&self, username: &str, password: &str) -> SubmitResult {
        if let Some(message) = validate(username, password) {
            self.set_error(Some(message.clone()));
            return SubmitResult::Invalid(message);
        }

        if self.submitting.swap(true, Ordering::SeqCst) {
            return SubmitResult::Busy;
        }
        let _reset = ResetOnDrop(&self.submitting);
        self.set_error(None);

        match self
            .session
            .login_with_cancel(username, password, &self.cancel)
            .await
        {
            LoginOutcome::Success(identity) => SubmitResult::LoggedIn(identity),
            LoginOutcome::Failure(failure) => {
                self.set_error(Some(failure.reason.clone()));
                SubmitResult::Rejected(failure.reason)
            }
            LoginOutcome::Discarded => SubmitResult::Discarded,
        }
    }

    fn set_error(&self, message: Option<String>) {
        if let Ok(mut error) = self.error.lock() {
            *error = message;
        }
    }
}

impl Drop for LoginFlow {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct ResetOnDrop<'a>(&'a AtomicBool);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn validate(username: &str, password: &str) -> Option<String> {
    if username.trim().is_empty() {
        return Some("Username is required".to_string());
    }
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    None
}
