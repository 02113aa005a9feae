pub mod categories;
pub mod docs;

use std::sync::Arc;

use axum::Router;

use crate::modules::store::CatalogStore;

/// Catalog API routes over one store
pub fn api_routes(store: Arc<dyn CatalogStore>) -> Router {
    let category_service = Arc::new(categories::CategoryService::new(Arc::clone(&store)));
    let doc_service = Arc::new(docs::DocService::new(store));

    Router::new()
        .merge(categories::routes::routes(category_service))
        .merge(docs::routes::routes(doc_service))
}
