use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

pub const SOURCE_TYPE_PATH: &str = "path";
pub const SOURCE_TYPE_S3_OBJECT: &str = "s3Object";

/// Lifecycle event type as sent by the provider framework. Values outside
/// Create/Update/Delete are kept verbatim instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestType {
    Create,
    Update,
    Delete,
    Unrecognized(String),
}

impl From<String> for RequestType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Create" => Self::Create,
            "Update" => Self::Update,
            "Delete" => Self::Delete,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<RequestType> for String {
    fn from(value: RequestType) -> Self {
        match value {
            RequestType::Create => "Create".to_string(),
            RequestType::Update => "Update".to_string(),
            RequestType::Delete => "Delete".to_string(),
            RequestType::Unrecognized(other) => other,
        }
    }
}

impl RequestType {
    pub fn action(&self) -> Option<LifecycleAction> {
        match self {
            Self::Create => Some(LifecycleAction::Create),
            Self::Update => Some(LifecycleAction::Update),
            Self::Delete => Some(LifecycleAction::Delete),
            Self::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Unrecognized(other) => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Create,
    Update,
    Delete,
}

/// Custom resource properties. The construct layer emits camelCase keys, the
/// handler contract uses PascalCase; both are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(alias = "sourceType")]
    pub source_type: Option<String>,
    #[serde(default, alias = "calendarName")]
    pub calendar_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(alias = "calendarBody")]
    pub calendar_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(alias = "bucketName")]
    pub bucket_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(alias = "roleArn")]
    pub role_arn: Option<String>,
}

impl ResourceProperties {
    /// Inline source whose body is read as UTF-8 from `dir/calendar_name`.
    pub fn from_local_path(dir: impl AsRef<Path>, calendar_name: &str) -> io::Result<Self> {
        let body = fs::read_to_string(dir.as_ref().join(calendar_name))?;
        Ok(Self {
            source_type: Some(SOURCE_TYPE_PATH.to_string()),
            calendar_name: calendar_name.to_string(),
            calendar_body: Some(body),
            bucket_name: None,
            role_arn: None,
        })
    }

    /// Remote source keyed by the calendar name, read through `role_arn` when set.
    pub fn s3_location(bucket: &str, calendar_name: &str, role_arn: Option<&str>) -> Self {
        Self {
            source_type: Some(SOURCE_TYPE_S3_OBJECT.to_string()),
            calendar_name: calendar_name.to_string(),
            calendar_body: None,
            bucket_name: Some(bucket.to_string()),
            role_arn: role_arn.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OnEventRequest {
    pub request_type: RequestType,
    #[serde(default)]
    pub resource_properties: ResourceProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<ResourceProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

impl OnEventRequest {
    /// Envelope for an event type the handler does not act on. Only string
    /// metadata is kept; the properties are never decoded.
    fn unrecognized(request_type: RequestType, object: &Map<String, Value>) -> Self {
        Self {
            request_type,
            resource_properties: ResourceProperties::default(),
            old_resource_properties: None,
            request_id: string_field(object, "RequestId"),
            logical_resource_id: string_field(object, "LogicalResourceId"),
            physical_resource_id: string_field(object, "PhysicalResourceId"),
            stack_id: string_field(object, "StackId"),
            resource_type: string_field(object, "ResourceType"),
        }
    }
}

/// Success response. Always serializes to `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnEventResponse {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    InlineContent,
    RemoteObject,
}

impl SourceType {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            SOURCE_TYPE_PATH => Ok(Self::InlineContent),
            SOURCE_TYPE_S3_OBJECT => Ok(Self::RemoteObject),
            other => Err(ValidationError::new(format!(
                "Unsupported SourceType '{other}', expected '{SOURCE_TYPE_PATH}' or '{SOURCE_TYPE_S3_OBJECT}'"
            ))),
        }
    }
}

/// Where the calendar body comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarSource {
    Inline {
        body: String,
    },
    RemoteObject {
        bucket: String,
        key: String,
        role_arn: Option<String>,
    },
}

impl CalendarSource {
    /// Picks the source variant from the resource properties. For remote
    /// objects the calendar name doubles as the object key.
    pub fn select(
        calendar_name: &str,
        properties: &ResourceProperties,
    ) -> Result<Self, ValidationError> {
        let source_type = properties
            .source_type
            .as_deref()
            .ok_or_else(|| ValidationError::new("SourceType is required"))?;

        match SourceType::parse(source_type)? {
            SourceType::InlineContent => {
                let Some(body) = properties.calendar_body.clone() else {
                    return Err(ValidationError::new(
                        "CalendarBody is required for path sources",
                    ));
                };
                Ok(Self::Inline { body })
            }
            SourceType::RemoteObject => {
                let Some(bucket) = non_blank(properties.bucket_name.as_deref()) else {
                    return Err(ValidationError::new(
                        "BucketName is required for s3Object sources",
                    ));
                };
                Ok(Self::RemoteObject {
                    bucket: bucket.to_string(),
                    key: calendar_name.to_string(),
                    role_arn: non_blank(properties.role_arn.as_deref()).map(str::to_string),
                })
            }
        }
    }

    pub fn source_type(&self) -> SourceType {
        match self {
            Self::Inline { .. } => SourceType::InlineContent,
            Self::RemoteObject { .. } => SourceType::RemoteObject,
        }
    }
}

/// A validated Create/Update/Delete request for one calendar document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationRequest {
    pub action: LifecycleAction,
    pub calendar_name: String,
    pub properties: ResourceProperties,
}

impl ReconciliationRequest {
    pub fn source(&self) -> Result<CalendarSource, ValidationError> {
        CalendarSource::select(&self.calendar_name, &self.properties)
    }
}

/// Decodes a provider-framework event. The event type is read first; events
/// the handler does not act on skip strict decoding of the properties.
pub fn decode_event(payload: Value) -> Result<OnEventRequest, ValidationError> {
    let Some(object) = payload.as_object() else {
        return Err(ValidationError::new(
            "Request payload must be a JSON object",
        ));
    };
    let Some(request_type) = object.get("RequestType") else {
        return Err(ValidationError::new("RequestType is required"));
    };
    let request_type = RequestType::deserialize(request_type).map_err(malformed)?;

    if request_type.action().is_none() {
        return Ok(OnEventRequest::unrecognized(request_type, object));
    }

    serde_json::from_value(payload).map_err(malformed)
}

pub fn normalize_request(
    action: LifecycleAction,
    properties: ResourceProperties,
) -> Result<ReconciliationRequest, ValidationError> {
    if properties.calendar_name.trim().is_empty() {
        return Err(ValidationError::new("CalendarName cannot be empty"));
    }

    Ok(ReconciliationRequest {
        action,
        calendar_name: properties.calendar_name.clone(),
        properties,
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

fn malformed(error: serde_json::Error) -> ValidationError {
    ValidationError::new(format!("Malformed request: {error}"))
}
