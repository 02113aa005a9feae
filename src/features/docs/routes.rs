use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::features::docs::handlers;
use crate::features::docs::services::DocService;

/// Create routes for the docs feature
pub fn routes(service: Arc<DocService>) -> Router {
    Router::new()
        .route("/api/docs", get(handlers::list_docs))
        .route("/api/docs/unique-slugs", get(handlers::list_unique_slugs))
        .route("/api/docs/with-code", get(handlers::list_docs_with_code))
        .route(
            "/api/docs/getDocByUniqueSlug/{unique_slug}",
            get(handlers::get_doc_by_slug),
        )
        .route("/api/docs/createDoc", post(handlers::create_doc))
        .route("/api/docs/updateDoc/{id}", put(handlers::update_doc))
        .route("/api/docs/deleteDoc/{id}", delete(handlers::delete_doc))
        .route("/api/docs/createVariant/{id}", post(handlers::create_variant))
        .route("/api/docs/{id}", get(handlers::get_doc))
        .with_state(service)
}
