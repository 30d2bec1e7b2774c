use crate::models::Identity;

/// Opaque bearer token issued at login.
///
/// `Debug` never prints the token itself.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header and persistence only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(<{} chars>)", self.0.len())
    }
}

/// Current authentication state.
///
/// The authenticated variant carries both the credential and the identity,
/// so there is no way to hold one without the other.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Credential recovery has not finished yet.
    #[default]
    Unsettled,
    Unauthenticated,
    Authenticated {
        credential: Credential,
        identity: Identity,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unsettled,
    Unauthenticated,
    Authenticated,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Unsettled => write!(f, "unsettled"),
            SessionPhase::Unauthenticated => write!(f, "unauthenticated"),
            SessionPhase::Authenticated => write!(f, "authenticated"),
        }
    }
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            Self::Unsettled => SessionPhase::Unsettled,
            Self::Unauthenticated => SessionPhase::Unauthenticated,
            Self::Authenticated { .. } => SessionPhase::Authenticated,
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Unsettled)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn credential(&self) -> Option<&Credential> {
        match self {
            Self::Authenticated { credential, .. } => Some(credential),
            _ => None,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated { identity, .. } => Some(identity),
            _ => None,
        }
    }
}

/// Flat snapshot of the session record: `{credential, user, settled}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub credential: Option<Credential>,
    pub user: Option<Identity>,
    pub settled: bool,
}

impl From<&SessionState> for Session {
    fn from(state: &SessionState) -> Self {
        Self {
            credential: state.credential().cloned(),
            user: state.identity().cloned(),
            settled: state.is_settled(),
        }
    }
}
