//! ServerBuilder for fluent assembly of the HTTP application

use crate::config::{AppConfig, PaginationConfig};
use crate::core::entity::Entity;
use crate::core::service::CrudService;
use crate::server::controller::CrudState;
use crate::server::principal::{PrincipalResolver, StaticPrincipalResolver};
use crate::server::router::crud_routes;
use anyhow::Result;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

type MountFn =
    Box<dyn FnOnce(Arc<dyn PrincipalResolver>, Arc<PaginationConfig>) -> Router + Send>;

/// Builder wiring per-entity service stacks into one HTTP application
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_resolver(StaticPrincipalResolver::new(principal))
///     .expose_entity::<UserAccount>(user_stack)
///     .build();
/// ```
pub struct ServerBuilder {
    resolver: Arc<dyn PrincipalResolver>,
    pagination: Arc<PaginationConfig>,
    mounts: Vec<MountFn>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a builder whose requests resolve to the anonymous principal
    pub fn new() -> Self {
        Self {
            resolver: Arc::new(StaticPrincipalResolver::default()),
            pagination: Arc::new(PaginationConfig::default()),
            mounts: Vec::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Replace the principal resolver applied to every exposed entity
    pub fn with_resolver(mut self, resolver: impl PrincipalResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Apply loaded configuration; list endpoints use its pagination limits
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.pagination = Arc::new(config.pagination.clone());
        self
    }

    /// Mount the CRUD surface for one entity under `/<EntityKind>`
    ///
    /// The service is usually a composed stack (permission over audit over
    /// storage), but any `CrudService` works. Exposing two entities with
    /// the same kind tag panics when the routers merge.
    pub fn expose_entity<E: Entity + Default>(
        mut self,
        service: Arc<dyn CrudService<E>>,
    ) -> Self {
        self.mounts.push(Box::new(move |resolver, pagination| {
            let state = CrudState {
                service,
                resolver,
                pagination,
            };
            Router::new().nest(&format!("/{}", E::kind()), crud_routes(state))
        }));
        self
    }

    /// Add routes that do not fit the CRUD pattern
    ///
    /// # Example
    ///
    /// ```ignore
    /// let auth_routes = Router::new()
    ///     .route("/login", post(login_handler))
    ///     .route("/logout", post(logout_handler));
    ///
    /// ServerBuilder::new()
    ///     .with_custom_routes(auth_routes)
    ///     .expose_entity::<UserAccount>(user_stack)
    ///     .build();
    /// ```
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the final router
    ///
    /// This merges:
    /// - Health probe routes
    /// - One nested CRUD router per exposed entity
    /// - Custom routes
    /// and applies request tracing plus a permissive CORS policy.
    pub fn build(self) -> Router {
        let mut app = Router::new()
            .route("/health", get(health_check))
            .route("/healthz", get(health_check));

        for mount in self.mounts {
            app = app.merge(mount(self.resolver.clone(), self.pagination.clone()));
        }

        for custom in self.custom_routes {
            app = app.merge(custom);
        }

        app.layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    /// Serve the application with graceful shutdown
    ///
    /// Binds the address, serves requests, and drains on SIGTERM or Ctrl+C.
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::new()
    ///     .expose_entity::<UserAccount>(user_stack)
    ///     .serve("127.0.0.1:3000")
    ///     .await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build();
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check endpoint handler
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "scaffold"
    }))
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::EntityKind;
    use crate::storage::memory::MemoryRepository;
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Ticket {
        id: Uuid,
        subject: String,
    }

    crate::impl_record!(Ticket {
        id: Uuid,
        subject: String,
    });

    impl Entity for Ticket {
        fn kind() -> EntityKind {
            EntityKind::new("ticket")
        }

        fn id(&self) -> Uuid {
            self.id
        }

        fn set_id(&mut self, id: Uuid) {
            self.id = id;
        }

        fn display_name(&self) -> &str {
            &self.subject
        }
    }

    // ── Constructor ──────────────────────────────────────────────────────

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ServerBuilder::new();
        assert!(builder.mounts.is_empty());
        assert!(builder.custom_routes.is_empty());
    }

    #[test]
    fn test_with_config_replaces_pagination_limits() {
        let mut config = AppConfig::default();
        config.pagination.max_size = 25;
        let builder = ServerBuilder::new().with_config(&config);
        assert_eq!(builder.pagination.max_size, 25);
    }

    #[test]
    fn test_default_is_same_as_new() {
        let builder = ServerBuilder::default();
        assert!(builder.mounts.is_empty());
        assert!(builder.custom_routes.is_empty());
    }

    // ── Registration ─────────────────────────────────────────────────────

    #[test]
    fn test_expose_entity_adds_mount() {
        let repo: Arc<dyn CrudService<Ticket>> = Arc::new(MemoryRepository::new());
        let builder = ServerBuilder::new().expose_entity::<Ticket>(repo);
        assert_eq!(builder.mounts.len(), 1);
    }

    #[test]
    fn test_with_custom_routes_appends_router() {
        let builder = ServerBuilder::new()
            .with_custom_routes(Router::new())
            .with_custom_routes(Router::new());
        assert_eq!(builder.custom_routes.len(), 2);
    }

    // ── Build ────────────────────────────────────────────────────────────

    #[test]
    fn test_build_produces_router() {
        let repo: Arc<dyn CrudService<Ticket>> = Arc::new(MemoryRepository::new());
        let router = ServerBuilder::new().expose_entity::<Ticket>(repo).build();
        let _ = router;
    }

    #[test]
    fn test_fluent_chaining_full_pipeline() {
        use axum::routing::get;

        let repo: Arc<dyn CrudService<Ticket>> = Arc::new(MemoryRepository::new());
        let custom = Router::new().route("/version", get(|| async { "0.1.0" }));
        let router = ServerBuilder::new()
            .with_resolver(StaticPrincipalResolver::default())
            .with_custom_routes(custom)
            .expose_entity::<Ticket>(repo)
            .build();
        let _ = router;
    }
}
