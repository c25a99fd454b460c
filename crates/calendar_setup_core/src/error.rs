use thiserror::Error;

/// Malformed invocation payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Role assumption failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("assume role {role_arn} rejected: {message}")]
    Rejected { role_arn: String, message: String },

    #[error("assume role {role_arn} returned no credentials")]
    MissingCredentials { role_arn: String },
}

/// The calendar body could not be fetched or decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("calendar object s3://{bucket}/{key} does not exist")]
    NotFound { bucket: String, key: String },

    #[error("access denied reading calendar object s3://{bucket}/{key}")]
    AccessDenied { bucket: String, key: String },

    #[error("failed to fetch calendar object s3://{bucket}/{key}: {message}")]
    Fetch {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("calendar object s3://{bucket}/{key} is not valid UTF-8")]
    Decode { bucket: String, key: String },
}

/// Document store call failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document {name} already exists")]
    AlreadyExists { name: String },

    #[error("document {name} does not exist")]
    NotFound { name: String },

    #[error("document store throttled request for {name}")]
    Throttled { name: String },

    #[error("document store call for {name} failed: {message}")]
    Other { name: String, message: String },
}

/// Coarse failure classification for callers that branch on error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    Resolution,
    Store,
}

/// Any failure of a single reconciliation. None of these are recovered
/// locally; the invocation framework owns retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReconcileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::Validation,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Resolution(_) => ErrorKind::Resolution,
            Self::Store(_) => ErrorKind::Store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_wrapped_error() {
        let error = ReconcileError::from(StoreError::AlreadyExists {
            name: "biz-hours".to_string(),
        });
        assert_eq!(error.kind(), ErrorKind::Store);
        assert_eq!(error.to_string(), "document biz-hours already exists");

        let error = ReconcileError::from(AuthError::MissingCredentials {
            role_arn: "arn:aws:iam::123456789012:role/reader".to_string(),
        });
        assert_eq!(error.kind(), ErrorKind::Auth);
    }

    #[test]
    fn validation_error_is_prefixed_when_wrapped() {
        let error = ReconcileError::from(ValidationError::new("CalendarName cannot be empty"));
        assert_eq!(error.kind(), ErrorKind::Validation);
        assert_eq!(
            error.to_string(),
            "invalid request: CalendarName cannot be empty"
        );
    }
}
