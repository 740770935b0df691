//! Viewer-facing WebSocket gateway for live match events.
//!
//! The binary serves `/ws` plus a few diagnostics routes. The CRUD layer
//! links this crate, builds an [`app::AppState`], and calls
//! `state.emitter` after each committed mutation.

pub mod app;
pub mod http;
pub mod ws;
