//! API error types for resource operations
//!
//! An [`ApiError`] carries a status category and one or more
//! [`ErrorDetail`] entries, so a batch request can report every offending
//! payload at once. It renders as
//!
//! ```json
//! {"statusCode": 403, "errors": [{"id": "…", "attribute": "id", "message": "…"}]}
//! ```
//!
//! with an `X-Number-Of-Errors` header holding the number of entries.
//!
//! ```rust
//! use entity_resource::handlers::{ApiError, ApiErrorKind, ErrorDetail};
//!
//! let error = ApiError::forbidden(vec![
//!     ErrorDetail::new("Not authorized to delete Person with ID 1.").with_id(1),
//!     ErrorDetail::new("Not authorized to delete Person with ID 2.").with_id(2),
//! ]);
//! assert_eq!(error.kind, ApiErrorKind::Forbidden);
//! assert_eq!(error.errors.len(), 2);
//! ```

use std::fmt;

use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};

/// Header carrying the number of entries in an error body
pub const NUMBER_OF_ERRORS_HEADER: &str = "x-number-of-errors";

/// Resource operation in progress when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// Listing a page of entities
    List,
    /// Getting a single entity by ID
    Get,
    /// Batch create or update
    Save,
    /// Deleting one entity
    Delete,
    /// Deleting every entity visible to the caller
    DeleteAll,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Get => write!(f, "get"),
            Self::Save => write!(f, "save"),
            Self::Delete => write!(f, "delete"),
            Self::DeleteAll => write!(f, "delete_all"),
        }
    }
}

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Invalid request body or parameters
    BadRequest,
    /// Authentication required
    Unauthorized,
    /// Caller may not act on the listed entities
    Forbidden,
    /// Entity was not found
    NotFound,
    /// Operation conflicts with current state
    Conflict,
    /// Internal server error
    InternalError,
    /// Store temporarily unavailable
    ServiceUnavailable,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => write!(f, "bad_request"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::InternalError => write!(f, "internal_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
        }
    }
}

impl ApiErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error code string for this error kind
    #[must_use]
    pub fn error_code(&self) -> String {
        self.to_string().to_uppercase()
    }
}

/// One entry of an error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Offending entity id, or its position in a batch for new entities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    /// Offending attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    pub message: String,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: None,
            attribute: None,
            message: message.into(),
        }
    }

    /// Attach the offending id (or batch index)
    ///
    /// Values that fail to serialize leave the id unset.
    #[must_use]
    pub fn with_id(mut self, id: impl Serialize) -> Self {
        self.id = serde_json::to_value(id).ok();
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
}

/// Structured API error with operation context
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// The operation being performed when the error occurred
    pub operation: ApiOperation,
    /// The category of error
    pub kind: ApiErrorKind,
    /// Never empty
    pub errors: Vec<ErrorDetail>,
}

impl ApiError {
    /// Create an error from a list of details
    ///
    /// An empty list is replaced by a single detail naming the error kind.
    pub fn new(operation: ApiOperation, kind: ApiErrorKind, errors: Vec<ErrorDetail>) -> Self {
        let errors = if errors.is_empty() {
            vec![ErrorDetail::new(kind.error_code())]
        } else {
            errors
        };
        Self {
            operation,
            kind,
            errors,
        }
    }

    /// Create an error with a single message
    pub fn message(operation: ApiOperation, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self::new(operation, kind, vec![ErrorDetail::new(message)])
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::message(ApiOperation::Save, ApiErrorKind::BadRequest, message)
    }

    pub fn forbidden(errors: Vec<ErrorDetail>) -> Self {
        Self::new(ApiOperation::Save, ApiErrorKind::Forbidden, errors)
    }

    /// Entity lookup miss
    pub fn not_found(detail: ErrorDetail) -> Self {
        Self::new(ApiOperation::Get, ApiErrorKind::NotFound, vec![detail])
    }

    pub fn conflict(errors: Vec<ErrorDetail>) -> Self {
        Self::new(ApiOperation::Save, ApiErrorKind::Conflict, errors)
    }

    /// Translate a store failure raised while persisting, keeping its message
    ///
    /// Conflicting writes become `Conflict` and everything else becomes
    /// `InternalError`. `summary` precedes the store's own message.
    pub fn persistence_failure(error: &RepositoryError, summary: &str) -> Self {
        let kind = if error.is_conflict() {
            ApiErrorKind::Conflict
        } else {
            ApiErrorKind::InternalError
        };
        let mut detail = ErrorDetail::new(format!("{summary}: {}", error.message));
        if let Some(id) = &error.entity_id {
            detail = detail.with_id(id);
        }
        Self::new(repository_operation_to_api_operation(error.operation), kind, vec![detail])
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: ApiOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Check if this error is retriable (transient errors that may succeed on retry)
    pub fn is_retriable(&self) -> bool {
        matches!(self.kind, ApiErrorKind::ServiceUnavailable)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API {} error during {}", self.kind, self.operation)?;
        if let Some(first) = self.errors.first() {
            write!(f, ": {}", first.message)?;
        }
        if self.errors.len() > 1 {
            write!(f, " (+{} more)", self.errors.len() - 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Response body for API errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub errors: Vec<ErrorDetail>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        // Log the error with structured context
        tracing::error!(
            operation = %self.operation,
            kind = %self.kind,
            code = %self.kind.error_code(),
            errors = self.errors.len(),
            retriable = self.is_retriable(),
            "API error: {}", self
        );

        let count = HeaderValue::from(self.errors.len());
        let body = ErrorResponse {
            status_code: status.as_u16(),
            errors: self.errors,
        };

        (
            status,
            [(HeaderName::from_static(NUMBER_OF_ERRORS_HEADER), count)],
            Json(body),
        )
            .into_response()
    }
}

/// Convert RepositoryOperation to ApiOperation
fn repository_operation_to_api_operation(op: RepositoryOperation) -> ApiOperation {
    match op {
        RepositoryOperation::FindAll | RepositoryOperation::Count => ApiOperation::List,
        RepositoryOperation::FindByIds
        | RepositoryOperation::Begin
        | RepositoryOperation::Merge
        | RepositoryOperation::Commit
        | RepositoryOperation::Rollback => ApiOperation::Save,
        RepositoryOperation::Remove => ApiOperation::Delete,
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        let operation = repository_operation_to_api_operation(err.operation);

        let kind = match err.kind {
            RepositoryErrorKind::NotFound => ApiErrorKind::NotFound,
            RepositoryErrorKind::AlreadyExists
            | RepositoryErrorKind::ConstraintViolation
            | RepositoryErrorKind::VersionConflict => ApiErrorKind::Conflict,
            RepositoryErrorKind::ValidationFailed => ApiErrorKind::BadRequest,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout => {
                ApiErrorKind::ServiceUnavailable
            }
            RepositoryErrorKind::TransactionFailed
            | RepositoryErrorKind::SerializationError
            | RepositoryErrorKind::Other => ApiErrorKind::InternalError,
        };

        tracing::warn!(error = %err, "Store error mapped to {kind}");

        // User-facing message (don't expose internal details for internal errors)
        let message = match kind {
            ApiErrorKind::ServiceUnavailable => "Service temporarily unavailable".to_string(),
            ApiErrorKind::InternalError => "An internal error occurred".to_string(),
            _ => err.message,
        };

        let mut detail = ErrorDetail::new(message);
        if kind != ApiErrorKind::InternalError && kind != ApiErrorKind::ServiceUnavailable {
            if let Some(id) = err.entity_id {
                detail = detail.with_id(id);
            }
        }

        Self::new(operation, kind, vec![detail])
    }
}
