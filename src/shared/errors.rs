use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("External service error: {0}")]
    External(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, value: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            field: "id",
            value: value.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Whether this error is likely transient (e.g. DB connection lost or an
    /// upstream API hiccup) and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Database(_) | DomainError::External(_))
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}

impl From<InfraError> for DomainError {
    fn from(e: InfraError) -> Self {
        match e {
            InfraError::Database(db) => DomainError::Database(db.to_string()),
            other => DomainError::External(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream {service} responded with {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl InfraError {
    /// Worth retrying: connection problems, timeouts, 429 and 5xx replies.
    pub fn is_transient(&self) -> bool {
        match self {
            InfraError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            InfraError::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Infra(#[from] InfraError),
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type for infrastructure adapters
pub type InfraResult<T> = Result<T, InfraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity() {
        let err = DomainError::not_found("Course", "c-1");
        assert_eq!(err.to_string(), "Not found: Course with id=c-1");
    }

    #[test]
    fn transient_errors() {
        assert!(DomainError::Database("locked".into()).is_transient());
        assert!(DomainError::External("502".into()).is_transient());
        assert!(!DomainError::validation("bad").is_transient());
    }

    #[test]
    fn infra_upstream_maps_to_external() {
        let err: DomainError = InfraError::Upstream {
            service: "stream",
            status: 500,
            body: "boom".into(),
        }
        .into();
        assert!(matches!(err, DomainError::External(_)));
    }
}
