use serde_json::Value;

use crate::adapters::credentials::CredentialBroker;
use crate::adapters::document_store::DocumentStore;
use crate::adapters::object_store::ObjectStore;
use crate::handlers::content::resolve_content;
use crate::handlers::document::DocumentStoreClient;
use crate::runtime::contract::{
    decode_event, normalize_request, LifecycleAction, OnEventRequest, OnEventResponse,
    ReconciliationRequest,
};
use crate::runtime::document::content_fingerprint;
use crate::runtime::error::ReconcileError;

/// External services one invocation talks to.
#[derive(Clone, Copy)]
pub struct CalendarClients<'a> {
    pub credentials: &'a dyn CredentialBroker,
    pub objects: &'a dyn ObjectStore,
    pub documents: &'a dyn DocumentStore,
}

/// Entry point for raw provider-framework events.
pub fn handle_on_event(
    payload: Value,
    clients: &CalendarClients<'_>,
) -> Result<OnEventResponse, ReconcileError> {
    let event = decode_event(payload)?;
    reconcile(event, clients)
}

/// Dispatches one lifecycle event. Any failure is returned as-is; nothing is
/// retried or rolled back here.
pub fn reconcile(
    event: OnEventRequest,
    clients: &CalendarClients<'_>,
) -> Result<OnEventResponse, ReconcileError> {
    let old_calendar_name = event
        .old_resource_properties
        .as_ref()
        .map(|properties| properties.calendar_name.as_str());
    let span = tracing::info_span!(
        "on_event",
        request_type = %event.request_type.as_str(),
        request_id = event.request_id.as_deref().unwrap_or(""),
        logical_resource_id = event.logical_resource_id.as_deref().unwrap_or(""),
        physical_resource_id = event.physical_resource_id.as_deref().unwrap_or(""),
        stack_id = event.stack_id.as_deref().unwrap_or(""),
        resource_type = event.resource_type.as_deref().unwrap_or(""),
        old_calendar_name = old_calendar_name.unwrap_or(""),
    );
    let _entered = span.enter();

    let Some(action) = event.request_type.action() else {
        // Unknown event types are acknowledged with no collaborator calls.
        tracing::warn!(
            component = "lifecycle_dispatcher",
            event = "request_type_ignored",
            request_type = %event.request_type.as_str(),
        );
        return Ok(OnEventResponse::default());
    };

    let request = normalize_request(action, event.resource_properties)?;
    tracing::info!(
        component = "lifecycle_dispatcher",
        event = "request_received",
        calendar_name = %request.calendar_name,
        source_type = request.properties.source_type.as_deref().unwrap_or(""),
    );

    match dispatch(&request, clients) {
        Ok(()) => Ok(OnEventResponse::default()),
        Err(error) => {
            tracing::error!(
                component = "lifecycle_dispatcher",
                event = "request_failed",
                calendar_name = %request.calendar_name,
                error_kind = ?error.kind(),
                error = %error,
            );
            Err(error)
        }
    }
}

fn dispatch(
    request: &ReconciliationRequest,
    clients: &CalendarClients<'_>,
) -> Result<(), ReconcileError> {
    let store = DocumentStoreClient::new(clients.documents);
    match request.action {
        LifecycleAction::Create => {
            let content = resolve_request_content(request, clients)?;
            store.create(&request.calendar_name, &content)?;
        }
        LifecycleAction::Update => {
            let content = resolve_request_content(request, clients)?;
            store.update(&request.calendar_name, &content)?;
        }
        LifecycleAction::Delete => {
            store.delete(&request.calendar_name)?;
        }
    }
    Ok(())
}

fn resolve_request_content(
    request: &ReconciliationRequest,
    clients: &CalendarClients<'_>,
) -> Result<String, ReconcileError> {
    let source = request.source()?;
    let content = resolve_content(&source, clients.credentials, clients.objects)?;
    tracing::info!(
        component = "content_resolver",
        event = "content_resolved",
        calendar_name = %request.calendar_name,
        source_type = ?source.source_type(),
        content_bytes = content.len(),
        content_sha256 = %content_fingerprint(&content),
    );
    Ok(content)
}
