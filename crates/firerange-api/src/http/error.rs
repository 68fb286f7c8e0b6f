//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use firerange_types::error::{
    AccessError, ClientError, DocumentError, EmailError, KeyError, TenantError, WorkflowError,
};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Tenant(TenantError),
    Client(ClientError),
    Workflow(WorkflowError),
    Email(EmailError),
    Document(DocumentError),
    Access(AccessError),
    Key(KeyError),
    /// Authentication failure.
    Unauthorized(String),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

macro_rules! impl_from {
    ($($err:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$err> for AppError {
                fn from(e: $err) -> Self {
                    AppError::$variant(e)
                }
            }
        )*
    };
}

impl_from! {
    TenantError => Tenant,
    ClientError => Client,
    WorkflowError => Workflow,
    EmailError => Email,
    DocumentError => Document,
    AccessError => Access,
    KeyError => Key,
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        use StatusCode as S;
        match self {
            AppError::Tenant(e) => match e {
                TenantError::NotFound => (S::NOT_FOUND, "TENANT_NOT_FOUND"),
                TenantError::SlugConflict(_) => (S::CONFLICT, "SLUG_CONFLICT"),
                TenantError::ReservedSlug(_) | TenantError::Invalid(_) => {
                    (S::BAD_REQUEST, "VALIDATION_ERROR")
                }
                TenantError::StorageError(_) => (S::INTERNAL_SERVER_ERROR, "TENANT_ERROR"),
            },
            AppError::Client(e) => match e {
                ClientError::NotFound => (S::NOT_FOUND, "CLIENT_NOT_FOUND"),
                ClientError::Invalid(_) => (S::BAD_REQUEST, "VALIDATION_ERROR"),
                ClientError::StorageError(_) => (S::INTERNAL_SERVER_ERROR, "CLIENT_ERROR"),
            },
            AppError::Workflow(e) => match e {
                WorkflowError::ClientNotFound => (S::NOT_FOUND, "CLIENT_NOT_FOUND"),
                WorkflowError::StepNotFound(_) => (S::NOT_FOUND, "STEP_NOT_FOUND"),
                WorkflowError::NotSchedulable(_) | WorkflowError::InvalidSchedule(_) => {
                    (S::BAD_REQUEST, "VALIDATION_ERROR")
                }
                WorkflowError::ConcurrentModification => (S::CONFLICT, "CONCURRENT_MODIFICATION"),
                WorkflowError::InvalidTemplate(_) | WorkflowError::StorageError(_) => {
                    (S::INTERNAL_SERVER_ERROR, "WORKFLOW_ERROR")
                }
            },
            AppError::Email(e) => match e {
                EmailError::TemplateNotFound(_) => (S::NOT_FOUND, "TEMPLATE_NOT_FOUND"),
                EmailError::ClientNotFound => (S::NOT_FOUND, "CLIENT_NOT_FOUND"),
                EmailError::InvalidTemplate(_) => (S::BAD_REQUEST, "VALIDATION_ERROR"),
                EmailError::MissingRecipient => (S::UNPROCESSABLE_ENTITY, "MISSING_RECIPIENT"),
                EmailError::ScheduleRequired(_) => (S::UNPROCESSABLE_ENTITY, "SCHEDULE_REQUIRED"),
                EmailError::AlreadySent(_) => (S::CONFLICT, "ALREADY_SENT"),
                EmailError::Delivery(_) => (S::BAD_GATEWAY, "DELIVERY_FAILED"),
                EmailError::StorageError(_) => (S::INTERNAL_SERVER_ERROR, "EMAIL_ERROR"),
            },
            AppError::Document(e) => match e {
                DocumentError::NotFound => (S::NOT_FOUND, "DOCUMENT_NOT_FOUND"),
                DocumentError::ClientNotFound => (S::NOT_FOUND, "CLIENT_NOT_FOUND"),
                DocumentError::InvalidFilename(_) => (S::BAD_REQUEST, "VALIDATION_ERROR"),
                DocumentError::TooLarge { .. } => (S::PAYLOAD_TOO_LARGE, "DOCUMENT_TOO_LARGE"),
                DocumentError::StorageError(_) => (S::INTERNAL_SERVER_ERROR, "DOCUMENT_ERROR"),
            },
            AppError::Access(_) => (S::FORBIDDEN, "FORBIDDEN"),
            AppError::Key(e) => match e {
                KeyError::Access(_) => (S::FORBIDDEN, "FORBIDDEN"),
                KeyError::Invalid(_) => (S::BAD_REQUEST, "VALIDATION_ERROR"),
                KeyError::StorageError(_) => (S::INTERNAL_SERVER_ERROR, "KEY_ERROR"),
            },
            AppError::Unauthorized(_) => (S::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Validation(_) => (S::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Internal(_) => (S::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Tenant(e) => e.to_string(),
            AppError::Client(e) => e.to_string(),
            AppError::Workflow(e) => e.to_string(),
            AppError::Email(e) => e.to_string(),
            AppError::Document(e) => e.to_string(),
            AppError::Access(e) => e.to_string(),
            AppError::Key(e) => e.to_string(),
            AppError::Unauthorized(msg) | AppError::Validation(msg) | AppError::Internal(msg) => {
                msg.clone()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "request failed");
        }

        (status, Json(ApiResponse::error(code, &message))).into_response()
    }
}
