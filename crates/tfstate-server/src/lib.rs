//! HTTP transport for the Terraform remote-state backend.
//!
//! Maps Terraform's HTTP backend verbs (`GET`, `POST`, `DELETE`, `LOCK`,
//! `UNLOCK`) onto a shared [`tfstate_engine::Engine`] and exposes a health
//! projection of it.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{LogFormat, ServerConfig};
pub use error::{ApiError, ServerError, ServerResult};
pub use handler::AppState;
pub use router::build_router;
pub use server::StateServer;
