use tfstate_engine::Engine;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router_with_limit;

/// Remote-state backend server: one engine, one listener.
pub struct StateServer {
    config: ServerConfig,
    engine: Engine,
}

impl StateServer {
    pub fn new(config: ServerConfig) -> Self {
        let engine = Engine::new(config.write_policy);
        Self { config, engine }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        let state = AppState {
            engine: self.engine.clone(),
            reject_invalid_state: self.config.reject_invalid_state,
        };
        build_router_with_limit(state, self.config.max_body_bytes)
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            bind_addr = %self.config.bind_addr,
            write_policy = ?self.config.write_policy,
            "state backend listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down; in-memory state is discarded");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfstate_engine::WritePolicy;

    #[test]
    fn server_construction() {
        let server = StateServer::new(ServerConfig::default());
        assert_eq!(server.config().bind_addr, "127.0.0.1:8000".parse().unwrap());
        assert_eq!(server.engine().policy(), WritePolicy::Permissive);
    }

    #[test]
    fn engine_follows_configured_policy() {
        let config = ServerConfig {
            write_policy: WritePolicy::RequireLock,
            ..ServerConfig::default()
        };
        let server = StateServer::new(config);
        assert_eq!(server.engine().policy(), WritePolicy::RequireLock);
        let _router = server.router();
    }
}
