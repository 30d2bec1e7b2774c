//! Route guard: gates protected views on session state.
//!
//! The decision is a pure function of the session state and the requested
//! route. `RouteGuard` only adds a subscription so callers can re-evaluate
//! whenever the session changes.

use std::str::FromStr;

use crate::session::{SessionState, SessionStore, SessionWatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Projects,
    Tasks,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Projects => "/projects",
            Self::Tasks => "/tasks",
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Self::Login)
    }

    /// Where the user lands after logging in.
    pub fn home() -> Self {
        Self::Dashboard
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('/');
        match trimmed {
            "" | "/dashboard" | "dashboard" => Ok(Self::Dashboard),
            "/login" | "login" => Ok(Self::Login),
            "/projects" | "projects" => Ok(Self::Projects),
            "/tasks" | "tasks" => Ok(Self::Tasks),
            _ => Err(format!("Unknown route: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Recovery still running; show a neutral loading indicator.
    Loading,
    Render(Route),
    Redirect(Route),
}

/// Decide what to show for `route` given the current session.
pub fn decide(state: &SessionState, route: Route) -> GuardDecision {
    if !route.is_protected() {
        return GuardDecision::Render(route);
    }
    match state {
        SessionState::Unsettled => GuardDecision::Loading,
        SessionState::Authenticated { .. } => GuardDecision::Render(route),
        SessionState::Unauthenticated => GuardDecision::Redirect(Route::Login),
    }
}

#[derive(Debug)]
pub struct RouteGuard {
    session: SessionStore,
    watcher: SessionWatcher,
}

impl RouteGuard {
    pub fn new(session: SessionStore) -> Self {
        let watcher = session.subscribe();
        Self { session, watcher }
    }

    pub fn evaluate(&self, route: Route) -> GuardDecision {
        decide(&self.session.state(), route)
    }

    /// Wait out the loading state, then decide.
    pub async fn resolve(&mut self, route: Route) -> GuardDecision {
        match self.watcher.settled().await {
            Some(state) => decide(&state, route),
            None => self.evaluate(route),
        }
    }

    /// Wait for the next session mutation and re-evaluate `route`.
    ///
    /// Returns `None` once the session store has been dropped.
    pub async fn next(&mut self, route: Route) -> Option<GuardDecision> {
        let state = self.watcher.changed().await?;
        let decision = decide(&state, route);
        tracing::debug!(route = %route, ?decision, "route re-evaluated");
        Some(decision)
    }
}
