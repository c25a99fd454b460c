use crate::runtime::error::StoreError;

pub trait DocumentStore {
    fn create_document(
        &self,
        name: &str,
        content: &str,
        document_type: &str,
        document_format: &str,
    ) -> Result<(), StoreError>;

    fn update_document(
        &self,
        name: &str,
        content: &str,
        document_version: &str,
    ) -> Result<(), StoreError>;

    fn delete_document(&self, name: &str) -> Result<(), StoreError>;
}
