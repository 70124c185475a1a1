pub mod batch_service;
pub mod indexing_service;
pub mod library_api;
pub mod session_store;
