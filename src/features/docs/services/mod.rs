mod doc_service;
pub mod grouping;

pub use doc_service::DocService;
