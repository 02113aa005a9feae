#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use axum_test::TestServer;

#[cfg(test)]
use crate::features::api_routes;
#[cfg(test)]
use crate::modules::store::{CatalogStore, MemoryCatalogStore};

/// Test server over a fresh in-memory catalog
#[cfg(test)]
pub fn catalog_server() -> TestServer {
    catalog_server_with(Arc::new(MemoryCatalogStore::new()))
}

#[cfg(test)]
pub fn catalog_server_with(store: Arc<dyn CatalogStore>) -> TestServer {
    TestServer::new(api_routes(store)).expect("failed to start test server")
}
