use crate::adapters::credentials::CredentialBroker;
use crate::adapters::object_store::ObjectStore;
use crate::runtime::contract::CalendarSource;
use crate::runtime::document::ASSUME_ROLE_SESSION_NAME;
use crate::runtime::error::{ReconcileError, ResolutionError};

/// Produces the calendar body for `source`.
///
/// Inline sources make no remote calls. Remote objects are read with the
/// ambient identity, or with credentials brokered for `role_arn`; the role is
/// always assumed before the object is fetched.
pub fn resolve_content(
    source: &CalendarSource,
    broker: &dyn CredentialBroker,
    objects: &dyn ObjectStore,
) -> Result<String, ReconcileError> {
    match source {
        CalendarSource::Inline { body } => Ok(body.clone()),
        CalendarSource::RemoteObject {
            bucket,
            key,
            role_arn,
        } => {
            let credentials = match role_arn {
                Some(role_arn) => {
                    let credentials = broker.assume_role(role_arn, ASSUME_ROLE_SESSION_NAME)?;
                    tracing::debug!(
                        component = "content_resolver",
                        event = "role_assumed",
                        role_arn = %role_arn,
                    );
                    Some(credentials)
                }
                None => None,
            };

            let bytes = objects.get_object(bucket, key, credentials.as_ref())?;
            let content = String::from_utf8(bytes).map_err(|_| ResolutionError::Decode {
                bucket: bucket.clone(),
                key: key.clone(),
            })?;
            Ok(content)
        }
    }
}
