pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use state::AppState;

/// Build the HTTP router
///
/// Collection routes are registered with and without the trailing slash.
pub fn router(state: Arc<AppState>) -> Router {
    let customer_routes = Router::new()
        .route(
            "/customers",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route(
            "/customers/",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route("/customers/{customer_id}", get(handlers::get_customer))
        .route(
            "/customers/{customer_id}/accounts",
            get(handlers::list_customer_accounts).post(handlers::create_account),
        )
        .route(
            "/customers/{customer_id}/accounts/",
            get(handlers::list_customer_accounts).post(handlers::create_account),
        );

    let account_routes = Router::new()
        .route("/accounts", get(handlers::list_accounts))
        .route("/accounts/", get(handlers::list_accounts))
        .route("/accounts/transfer", post(handlers::create_transfer))
        .route("/accounts/{account_id}", get(handlers::get_account));

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1", customer_routes.merge(account_routes))
        .with_state(state)
        // OpenAPI / Swagger UI (stateless, added after with_state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start the HTTP gateway and serve until the process exits
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let backend = state.store.backend();
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} (port already in use?)", addr))?;

    tracing::info!(%addr, backend, "Gateway listening");
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .await
        .context("Gateway server error")?;
    Ok(())
}
