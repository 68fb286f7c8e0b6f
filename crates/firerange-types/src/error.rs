use thiserror::Error;

/// Errors from repository operations (used by trait definitions in firerange-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors related to tenant operations.
#[derive(Debug, Error)]
pub enum TenantError {
    #[error("tenant not found")]
    NotFound,

    #[error("slug '{0}' already exists")]
    SlugConflict(String),

    #[error("slug '{0}' is reserved")]
    ReservedSlug(String),

    #[error("invalid tenant: {0}")]
    Invalid(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("client not found")]
    NotFound,

    #[error("invalid client: {0}")]
    Invalid(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors raised around the workflow engine (the engine itself never fails).
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("client not found")]
    ClientNotFound,

    #[error("step '{0}' not found")]
    StepNotFound(String),

    #[error("step '{0}' is not an appointment")]
    NotSchedulable(String),

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("invalid workflow template: {0}")]
    InvalidTemplate(String),

    #[error("workflow was modified concurrently, retries exhausted")]
    ConcurrentModification,

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to email templates and sending.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email template '{0}' not found")]
    TemplateNotFound(String),

    #[error("client not found")]
    ClientNotFound,

    #[error("invalid email template: {0}")]
    InvalidTemplate(String),

    #[error("client has no email address")]
    MissingRecipient,

    #[error("step '{0}' must be scheduled before this email can be sent")]
    ScheduleRequired(String),

    #[error("email '{0}' was already sent to this client")]
    AlreadySent(String),

    #[error("delivery failed: {0}")]
    Delivery(#[from] MailError),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors reported by a mailer adapter.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors related to client documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document not found")]
    NotFound,

    #[error("client not found")]
    ClientNotFound,

    #[error("invalid file name: {0}")]
    InvalidFilename(String),

    #[error("document exceeds maximum size of {max} bytes (got {actual} bytes)")]
    TooLarge { max: u64, actual: u64 },

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to issuing access keys.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("invalid access key request: {0}")]
    Invalid(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Authorization failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("action '{0}' is not allowed for this role")]
    Forbidden(String),

    #[error("access key is not valid for this tenant")]
    WrongTenant,

    #[error("access key is not valid for this client")]
    WrongClient,
}
