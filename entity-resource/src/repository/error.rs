//! Store error types
//!
//! Every [`EntityStore`](super::EntityStore) and
//! [`StoreTransaction`](super::StoreTransaction) method reports failures as a
//! [`RepositoryError`], which records the store operation, a failure category
//! and optional entity context.
//!
//! ```rust
//! use entity_resource::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
//!
//! let error = RepositoryError::version_conflict("Person", "42", Some(3), 4);
//! assert_eq!(error.kind, RepositoryErrorKind::VersionConflict);
//! assert_eq!(error.operation, RepositoryOperation::Merge);
//! assert!(error.is_conflict());
//! ```

use std::fmt;

/// Store operation in progress when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Running a data plan
    FindAll,
    /// Running a count plan
    Count,
    /// Loading prior state for a set of ids
    FindByIds,
    /// Opening a transaction
    Begin,
    /// Inserting or updating an entity inside a transaction
    Merge,
    /// Removing an entity inside a transaction
    Remove,
    /// Committing a transaction
    Commit,
    /// Rolling back a transaction
    Rollback,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindAll => write!(f, "find_all"),
            Self::Count => write!(f, "count"),
            Self::FindByIds => write!(f, "find_by_ids"),
            Self::Begin => write!(f, "begin"),
            Self::Merge => write!(f, "merge"),
            Self::Remove => write!(f, "remove"),
            Self::Commit => write!(f, "commit"),
            Self::Rollback => write!(f, "rollback"),
        }
    }
}

/// Category of store error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Entity was not found
    NotFound,
    /// Entity already exists (duplicate key)
    AlreadyExists,
    /// Constraint violation reported by the store
    ConstraintViolation,
    /// Stored version differs from the version the writer expected
    VersionConflict,
    /// Validation failed before the store was touched
    ValidationFailed,
    /// Store unreachable
    ConnectionFailed,
    /// Operation timed out
    Timeout,
    /// Transaction could not be opened, committed or rolled back
    TransactionFailed,
    /// Serialization or deserialization error
    SerializationError,
    /// Other unclassified error
    Other,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::VersionConflict => write!(f, "version_conflict"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::TransactionFailed => write!(f, "transaction_failed"),
            Self::SerializationError => write!(f, "serialization_error"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured store error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of entity involved (e.g., "Person")
    pub entity_type: Option<String>,
    /// The ID of the entity involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create a new store error without entity context
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Entity missing from the store
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::FindAll,
            RepositoryErrorKind::NotFound,
            "Entity not found",
        )
        .with_entity(entity_type, entity_id)
    }

    /// Insert collided with an existing row
    pub fn already_exists(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Merge,
            RepositoryErrorKind::AlreadyExists,
            "Entity already exists",
        )
        .with_entity(entity_type, entity_id)
    }

    /// Writer held `expected` but the store holds `actual`
    pub fn version_conflict(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        expected: Option<u64>,
        actual: u64,
    ) -> Self {
        let message = match expected {
            Some(expected) => format!("Version check failed: expected {expected}, found {actual}"),
            None => format!("Version check failed: no version supplied, found {actual}"),
        };
        Self::new(
            RepositoryOperation::Merge,
            RepositoryErrorKind::VersionConflict,
            message,
        )
        .with_entity(entity_type, entity_id)
    }

    /// Create a validation failed error
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Merge,
            RepositoryErrorKind::ValidationFailed,
            message,
        )
    }

    /// Create a constraint violation error
    pub fn constraint_violation(
        operation: RepositoryOperation,
        message: impl Into<String>,
    ) -> Self {
        Self::new(operation, RepositoryErrorKind::ConstraintViolation, message)
    }

    /// Create a connection failed error
    pub fn connection_failed(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::ConnectionFailed, message)
    }

    /// Create a timeout error
    pub fn timeout(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::Timeout, message)
    }

    /// Create a transaction lifecycle error
    pub fn transaction_failed(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::TransactionFailed, message)
    }

    /// Create a serialization error
    pub fn serialization_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::SerializationError, message)
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Transient failures that may succeed on retry
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout
        )
    }

    /// Failures caused by concurrent or conflicting writes
    pub fn is_conflict(&self) -> bool {
        matches!(
            self.kind,
            RepositoryErrorKind::VersionConflict
                | RepositoryErrorKind::AlreadyExists
                | RepositoryErrorKind::ConstraintViolation
        )
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}
