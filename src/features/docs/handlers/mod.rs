mod doc_handler;

pub use doc_handler::*;
