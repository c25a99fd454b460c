use std::collections::HashMap;
use std::sync::Mutex;

use crate::adapters::credentials::{BrokeredCredentials, CredentialBroker};
use crate::adapters::document_store::DocumentStore;
use crate::adapters::object_store::ObjectStore;
use crate::runtime::error::{AuthError, ResolutionError, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AssumeRole {
        role_arn: String,
        session_name: String,
    },
    GetObject {
        bucket: String,
        key: String,
        credentials: Option<BrokeredCredentials>,
    },
    CreateDocument {
        name: String,
        content: String,
        document_type: String,
        document_format: String,
    },
    UpdateDocument {
        name: String,
        content: String,
        document_version: String,
    },
    DeleteDocument {
        name: String,
    },
}

/// Records every collaborator call, in order, across all three seams.
#[derive(Default)]
pub struct RecordingCollaborators {
    calls: Mutex<Vec<Call>>,
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    documents: Mutex<HashMap<String, String>>,
    deny_assume_role: bool,
}

impl RecordingCollaborators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn denying_assume_role() -> Self {
        Self {
            deny_assume_role: true,
            ..Self::default()
        }
    }

    pub fn seed_object(&self, bucket: &str, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .insert((bucket.to_string(), key.to_string()), body.to_vec());
    }

    pub fn seed_document(&self, name: &str, content: &str) {
        self.documents
            .lock()
            .expect("poisoned mutex")
            .insert(name.to_string(), content.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("poisoned mutex").clone()
    }

    pub fn document(&self, name: &str) -> Option<String> {
        self.documents
            .lock()
            .expect("poisoned mutex")
            .get(name)
            .cloned()
    }

    pub fn temporary_credentials(role_arn: &str) -> BrokeredCredentials {
        BrokeredCredentials {
            access_key_id: format!("ASIA-{role_arn}"),
            secret_access_key: "secret".to_string(),
            session_token: "token".to_string(),
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("poisoned mutex").push(call);
    }
}

impl CredentialBroker for RecordingCollaborators {
    fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<BrokeredCredentials, AuthError> {
        self.record(Call::AssumeRole {
            role_arn: role_arn.to_string(),
            session_name: session_name.to_string(),
        });
        if self.deny_assume_role {
            return Err(AuthError::Rejected {
                role_arn: role_arn.to_string(),
                message: "not authorized to perform sts:AssumeRole".to_string(),
            });
        }
        Ok(Self::temporary_credentials(role_arn))
    }
}

impl ObjectStore for RecordingCollaborators {
    fn get_object(
        &self,
        bucket: &str,
        key: &str,
        credentials: Option<&BrokeredCredentials>,
    ) -> Result<Vec<u8>, ResolutionError> {
        self.record(Call::GetObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            credentials: credentials.cloned(),
        });
        self.objects
            .lock()
            .expect("poisoned mutex")
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| ResolutionError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}

impl DocumentStore for RecordingCollaborators {
    fn create_document(
        &self,
        name: &str,
        content: &str,
        document_type: &str,
        document_format: &str,
    ) -> Result<(), StoreError> {
        self.record(Call::CreateDocument {
            name: name.to_string(),
            content: content.to_string(),
            document_type: document_type.to_string(),
            document_format: document_format.to_string(),
        });
        let mut documents = self.documents.lock().expect("poisoned mutex");
        if documents.contains_key(name) {
            return Err(StoreError::AlreadyExists {
                name: name.to_string(),
            });
        }
        documents.insert(name.to_string(), content.to_string());
        Ok(())
    }

    fn update_document(
        &self,
        name: &str,
        content: &str,
        document_version: &str,
    ) -> Result<(), StoreError> {
        self.record(Call::UpdateDocument {
            name: name.to_string(),
            content: content.to_string(),
            document_version: document_version.to_string(),
        });
        let mut documents = self.documents.lock().expect("poisoned mutex");
        match documents.get_mut(name) {
            Some(existing) => {
                *existing = content.to_string();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    fn delete_document(&self, name: &str) -> Result<(), StoreError> {
        self.record(Call::DeleteDocument {
            name: name.to_string(),
        });
        self.documents
            .lock()
            .expect("poisoned mutex")
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
            })
    }
}
