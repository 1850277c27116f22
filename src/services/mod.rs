pub mod document_store;
pub mod persistence;
pub mod sync_service;
