//! HTTP layer: Axum router, handlers, and responses.
//!
//! Exposes the portfolio API (`/api/exhibitions`, `/api/links`, auth
//! endpoints) plus static biography and painting content.

mod auth;
mod error;
mod handlers;
mod responses;
mod state;


pub use handlers::router;
pub use state::{AppState, SessionStore};
