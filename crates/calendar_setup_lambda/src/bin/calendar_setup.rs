use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ssm::types::{DocumentFormat, DocumentType};
use calendar_setup_lambda::adapters::credentials::{BrokeredCredentials, CredentialBroker};
use calendar_setup_lambda::adapters::document_store::DocumentStore;
use calendar_setup_lambda::adapters::object_store::ObjectStore;
use calendar_setup_lambda::handlers::on_event::{handle_on_event, CalendarClients};
use calendar_setup_lambda::runtime::contract::OnEventResponse;
use calendar_setup_lambda::runtime::error::{AuthError, ResolutionError, StoreError};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

const BROKERED_CREDENTIALS_PROVIDER: &str = "calendar-setup-assume-role";

struct StsCredentialBroker {
    sts_client: aws_sdk_sts::Client,
}

impl CredentialBroker for StsCredentialBroker {
    fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<BrokeredCredentials, AuthError> {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let output = self
                    .sts_client
                    .assume_role()
                    .role_arn(role_arn)
                    .role_session_name(session_name)
                    .send()
                    .await
                    .map_err(|error| AuthError::Rejected {
                        role_arn: role_arn.to_string(),
                        message: DisplayErrorContext(&error).to_string(),
                    })?;

                let credentials = output
                    .credentials()
                    .ok_or_else(|| AuthError::MissingCredentials {
                        role_arn: role_arn.to_string(),
                    })?;

                Ok::<_, AuthError>(BrokeredCredentials {
                    access_key_id: credentials.access_key_id().to_string(),
                    secret_access_key: credentials.secret_access_key().to_string(),
                    session_token: credentials.session_token().to_string(),
                })
            })
        })
    }
}

struct S3ObjectStore {
    aws_config: SdkConfig,
    s3_client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    fn client_for(&self, credentials: Option<&BrokeredCredentials>) -> aws_sdk_s3::Client {
        let Some(credentials) = credentials else {
            return self.s3_client.clone();
        };

        let provider = aws_sdk_s3::config::Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            Some(credentials.session_token.clone()),
            None,
            BROKERED_CREDENTIALS_PROVIDER,
        );
        let config = aws_sdk_s3::config::Builder::from(&self.aws_config)
            .credentials_provider(provider)
            .build();
        aws_sdk_s3::Client::from_conf(config)
    }
}

impl ObjectStore for S3ObjectStore {
    fn get_object(
        &self,
        bucket: &str,
        key: &str,
        credentials: Option<&BrokeredCredentials>,
    ) -> Result<Vec<u8>, ResolutionError> {
        let client = self.client_for(credentials);

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let output = client
                    .get_object()
                    .bucket(bucket)
                    .key(key)
                    .send()
                    .await
                    .map_err(|error| {
                        classify_object_error(
                            bucket,
                            key,
                            error.code(),
                            http_status(&error),
                            DisplayErrorContext(&error).to_string(),
                        )
                    })?;

                let body = output
                    .body
                    .collect()
                    .await
                    .map_err(|error| ResolutionError::Fetch {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                        message: format!("failed to read object body: {error}"),
                    })?;
                Ok::<_, ResolutionError>(body.into_bytes().to_vec())
            })
        })
    }
}

struct SsmDocumentStore {
    ssm_client: aws_sdk_ssm::Client,
}

impl DocumentStore for SsmDocumentStore {
    fn create_document(
        &self,
        name: &str,
        content: &str,
        document_type: &str,
        document_format: &str,
    ) -> Result<(), StoreError> {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                self.ssm_client
                    .create_document()
                    .name(name)
                    .content(content)
                    .document_type(DocumentType::from(document_type))
                    .document_format(DocumentFormat::from(document_format))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        classify_store_error(
                            name,
                            error.code(),
                            http_status(&error),
                            DisplayErrorContext(&error).to_string(),
                        )
                    })
            })
        })
    }

    fn update_document(
        &self,
        name: &str,
        content: &str,
        document_version: &str,
    ) -> Result<(), StoreError> {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                self.ssm_client
                    .update_document()
                    .name(name)
                    .content(content)
                    .document_version(document_version)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        classify_store_error(
                            name,
                            error.code(),
                            http_status(&error),
                            DisplayErrorContext(&error).to_string(),
                        )
                    })
            })
        })
    }

    fn delete_document(&self, name: &str) -> Result<(), StoreError> {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                self.ssm_client
                    .delete_document()
                    .name(name)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        classify_store_error(
                            name,
                            error.code(),
                            http_status(&error),
                            DisplayErrorContext(&error).to_string(),
                        )
                    })
            })
        })
    }
}

fn http_status<E>(error: &SdkError<E, HttpResponse>) -> Option<u16> {
    error
        .raw_response()
        .map(|response| response.status().as_u16())
}

fn classify_object_error(
    bucket: &str,
    key: &str,
    code: Option<&str>,
    status: Option<u16>,
    message: String,
) -> ResolutionError {
    let bucket = bucket.to_string();
    let key = key.to_string();
    match (code, status) {
        (Some("NoSuchKey" | "NoSuchBucket" | "NotFound"), _) | (_, Some(404)) => {
            ResolutionError::NotFound { bucket, key }
        }
        (Some("AccessDenied"), _) | (_, Some(403)) => {
            ResolutionError::AccessDenied { bucket, key }
        }
        _ => ResolutionError::Fetch {
            bucket,
            key,
            message,
        },
    }
}

/// SSM reports a missing document on update/delete as `InvalidDocument`.
fn classify_store_error(
    name: &str,
    code: Option<&str>,
    status: Option<u16>,
    message: String,
) -> StoreError {
    let name = name.to_string();
    match (code, status) {
        (Some("DocumentAlreadyExists"), _) => StoreError::AlreadyExists { name },
        (Some("InvalidDocument"), _) => StoreError::NotFound { name },
        (Some("ThrottlingException" | "TooManyUpdates"), _) | (_, Some(429)) => {
            StoreError::Throttled { name }
        }
        _ => StoreError::Other { name, message },
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<OnEventResponse, Error> {
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let credentials = StsCredentialBroker {
        sts_client: aws_sdk_sts::Client::new(&aws_config),
    };
    let objects = S3ObjectStore {
        s3_client: aws_sdk_s3::Client::new(&aws_config),
        aws_config: aws_config.clone(),
    };
    let documents = SsmDocumentStore {
        ssm_client: aws_sdk_ssm::Client::new(&aws_config),
    };

    let clients = CalendarClients {
        credentials: &credentials,
        objects: &objects,
        documents: &documents,
    };
    let response = handle_on_event(event.payload, &clients)?;
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .with_current_span(true)
        .init();

    lambda_runtime::run(service_fn(handle_request)).await
}
