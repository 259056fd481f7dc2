use axum::{
    routing::{delete, get},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::storage::StoreService;

pub mod routes;

/// Server state
pub struct AppState {
    pub store: StoreService,
}

/// Build the API router. Every origin may call it.
pub fn create_router(store: StoreService) -> Router {
    let state = Arc::new(AppState { store });

    Router::new()
        .route("/api/contacts", get(routes::list_contacts).post(routes::add_contact))
        .route("/api/contacts/{id}", delete(routes::delete_contact))
        .route("/api/templates", get(routes::list_templates).post(routes::add_template))
        .route("/api/templates/{id}", delete(routes::delete_template))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Initialize the schema, then serve until the process is stopped.
///
/// A store that cannot be reached or initialized aborts startup.
pub async fn start_server(addr: SocketAddr, store: StoreService) -> anyhow::Result<()> {
    store.initialize().await?;
    tracing::info!("Using {} store at {}", store.target().backend(), store.target());

    let app = create_router(store);

    tracing::info!("Starting server on {}", addr);
    println!("🌍 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
