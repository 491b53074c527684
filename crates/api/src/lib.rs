//! Reelhouse API server library.
//!
//! Exposes config, state, routing and middleware so the binary entrypoint
//! and the integration tests build the same application.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod upload;
