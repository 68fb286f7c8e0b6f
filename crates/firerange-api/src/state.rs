//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository/storage/mailer/hasher traits, but
//! AppState pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use firerange_core::service::access::AccessService;
use firerange_core::service::client::ClientService;
use firerange_core::service::document::DocumentService;
use firerange_core::service::email::EmailService;
use firerange_core::service::tenant::TenantService;
use firerange_core::service::workflow::WorkflowService;
use firerange_core::workflow::active_template;
use firerange_infra::config::{load_config, mail_offset};
use firerange_infra::crypto::hash::Sha256KeyHasher;
use firerange_infra::filesystem::{ensure_data_dir, outbox_dir, resolve_data_dir};
use firerange_infra::mail::OutboxMailer;
use firerange_infra::sqlite::access_key::SqliteAccessKeyRepository;
use firerange_infra::sqlite::client::SqliteClientRepository;
use firerange_infra::sqlite::document::SqliteDocumentRepository;
use firerange_infra::sqlite::email::SqliteEmailRepository;
use firerange_infra::sqlite::pool::{DatabasePool, database_url};
use firerange_infra::sqlite::tenant::SqliteTenantRepository;
use firerange_infra::sqlite::workflow::SqliteWorkflowRepository;
use firerange_infra::storage::LocalDocumentStore;
use firerange_types::config::AppConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteTenantService = TenantService<SqliteTenantRepository, SqliteEmailRepository>;

pub type ConcreteClientService =
    ClientService<SqliteClientRepository, SqliteWorkflowRepository, LocalDocumentStore>;

pub type ConcreteWorkflowService = WorkflowService<SqliteClientRepository, SqliteWorkflowRepository>;

pub type ConcreteEmailService = EmailService<
    SqliteClientRepository,
    SqliteWorkflowRepository,
    SqliteEmailRepository,
    OutboxMailer,
>;

pub type ConcreteDocumentService =
    DocumentService<SqliteClientRepository, SqliteDocumentRepository, LocalDocumentStore>;

pub type ConcreteAccessService =
    AccessService<SqliteAccessKeyRepository, SqliteClientRepository, Sha256KeyHasher>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub tenant_service: Arc<ConcreteTenantService>,
    pub client_service: Arc<ConcreteClientService>,
    pub workflow_service: Arc<ConcreteWorkflowService>,
    pub email_service: Arc<ConcreteEmailService>,
    pub document_service: Arc<ConcreteDocumentService>,
    pub access_service: Arc<ConcreteAccessService>,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state from the resolved data directory.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        ensure_data_dir(&data_dir).await?;

        let config = load_config(&data_dir).await;
        Self::open(data_dir, config).await
    }

    /// Connect to the database in `data_dir` and wire every service.
    pub async fn open(data_dir: PathBuf, config: AppConfig) -> anyhow::Result<Self> {
        ensure_data_dir(&data_dir).await?;
        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;

        // An invalid workflow override is a startup error, not a silent fallback.
        let template = active_template(config.workflow.as_ref())?;
        let offset = mail_offset(&config.mail);

        let tenant_service = TenantService::new(
            SqliteTenantRepository::new(db_pool.clone()),
            SqliteEmailRepository::new(db_pool.clone()),
            template.clone(),
        );

        let client_service = ClientService::new(
            SqliteClientRepository::new(db_pool.clone()),
            SqliteWorkflowRepository::new(db_pool.clone()),
            LocalDocumentStore::new(data_dir.clone()),
            template.clone(),
        );

        let workflow_service = WorkflowService::new(
            SqliteClientRepository::new(db_pool.clone()),
            SqliteWorkflowRepository::new(db_pool.clone()),
            template.clone(),
        );

        let mailer = OutboxMailer::new(
            outbox_dir(&data_dir),
            config.mail.from_address.clone(),
            config.mail.from_name.clone(),
        );
        let email_service = EmailService::new(
            SqliteClientRepository::new(db_pool.clone()),
            SqliteWorkflowRepository::new(db_pool.clone()),
            SqliteEmailRepository::new(db_pool.clone()),
            mailer,
            template,
            offset,
        );

        let document_service = DocumentService::new(
            SqliteClientRepository::new(db_pool.clone()),
            SqliteDocumentRepository::new(db_pool.clone()),
            LocalDocumentStore::new(data_dir.clone()),
            config.storage.max_document_bytes,
        );

        let access_service = AccessService::new(
            SqliteAccessKeyRepository::new(db_pool.clone()),
            SqliteClientRepository::new(db_pool),
            Sha256KeyHasher::new(),
        );

        Ok(Self {
            tenant_service: Arc::new(tenant_service),
            client_service: Arc::new(client_service),
            workflow_service: Arc::new(workflow_service),
            email_service: Arc::new(email_service),
            document_service: Arc::new(document_service),
            access_service: Arc::new(access_service),
            config: Arc::new(config),
            data_dir,
        })
    }
}
