use crate::adapters::document_store::DocumentStore;
use crate::runtime::document::{
    content_fingerprint, CALENDAR_DOCUMENT_FORMAT, CALENDAR_DOCUMENT_TYPE, UPDATE_VERSION_MARKER,
};
use crate::runtime::error::StoreError;

/// Create/update/delete for change-calendar documents. Each operation is one
/// store call with no local idempotency guard.
pub struct DocumentStoreClient<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> DocumentStoreClient<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    pub fn create(&self, name: &str, content: &str) -> Result<(), StoreError> {
        self.store.create_document(
            name,
            content,
            CALENDAR_DOCUMENT_TYPE,
            CALENDAR_DOCUMENT_FORMAT,
        )?;
        tracing::info!(
            component = "document_store",
            event = "document_created",
            calendar_name = %name,
            content_sha256 = %content_fingerprint(content),
        );
        Ok(())
    }

    pub fn update(&self, name: &str, content: &str) -> Result<(), StoreError> {
        self.store.update_document(name, content, UPDATE_VERSION_MARKER)?;
        tracing::info!(
            component = "document_store",
            event = "document_updated",
            calendar_name = %name,
            content_sha256 = %content_fingerprint(content),
        );
        Ok(())
    }

    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.store.delete_document(name)?;
        tracing::info!(
            component = "document_store",
            event = "document_deleted",
            calendar_name = %name,
        );
        Ok(())
    }
}
