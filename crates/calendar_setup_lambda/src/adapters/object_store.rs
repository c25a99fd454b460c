use crate::adapters::credentials::BrokeredCredentials;
use crate::runtime::error::ResolutionError;

pub trait ObjectStore {
    /// Reads `bucket/key`. `None` credentials means the ambient identity.
    fn get_object(
        &self,
        bucket: &str,
        key: &str,
        credentials: Option<&BrokeredCredentials>,
    ) -> Result<Vec<u8>, ResolutionError>;
}
