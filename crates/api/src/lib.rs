//! StudioOS API server library.
//!
//! Exposes config, state, error handling, the LLM proxy and the module-row
//! routes so integration tests and the binary entrypoint share them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
