//! Terminal client for a task management API.
//!
//! The core is the [`session`] store: it owns the authenticated session,
//! recovers it from disk on startup, and is the single thing the
//! [`guard`], the [`login`] flow and the [`api`] client agree on.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod errors;
pub mod guard;
pub mod http;
pub mod logging;
pub mod login;
pub mod models;
pub mod session;
pub mod ui;
pub mod views;
