pub mod credentials;
pub mod document_store;
pub mod object_store;
