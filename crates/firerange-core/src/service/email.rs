//! Email templates and the send flow.
//!
//! A send renders one tenant template for one client, hands it to the
//! `Mailer` and appends a send-log row. The log row is the only record of a
//! send; it is written after the mailer accepted the message, never before.

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use firerange_types::client::{Client, ClientId};
use firerange_types::email::{
    EmailSendLog, EmailStatus, EmailTemplate, UpsertEmailTemplateRequest, is_valid_template_key,
};
use firerange_types::error::{EmailError, RepositoryError};
use firerange_types::tenant::TenantId;
use firerange_types::workflow::WorkflowTemplate;

use crate::mail::{Mailer, render_email};
use crate::repository::client::ClientRepository;
use crate::repository::email::EmailRepository;
use crate::repository::workflow::WorkflowRepository;

/// Templates every new tenant starts with. Step links that the active
/// workflow template does not know are dropped.
pub fn default_templates(tenant_id: &TenantId, workflow: &WorkflowTemplate) -> Vec<EmailTemplate> {
    let now = Utc::now();
    let make = |key: &str, title: &str, subject: &str, body: &str, step: Option<&str>| {
        EmailTemplate {
            id: Uuid::now_v7(),
            tenant_id: tenant_id.clone(),
            key: key.to_string(),
            title: title.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            attachments: Vec::new(),
            step_id: step
                .filter(|id| workflow.step(id).is_some())
                .map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    };

    vec![
        make(
            "boas_vindas",
            "Boas-vindas",
            "Bem-vindo(a) ao clube, {{nome}}",
            "Olá, {{nome}}!\n\nSeu cadastro foi recebido e o seu processo de obtenção do CR já começou. \
             Acompanhe cada etapa pelo painel do clube.",
            None,
        ),
        make(
            "agendamento_psicologico",
            "Agendamento da avaliação psicológica",
            "Avaliação psicológica agendada",
            "Olá, {{nome}}!\n\nSua avaliação psicológica está marcada para {{data}} às {{hora}} \
             com {{examinador}}. Leve um documento com foto.",
            Some("laudo_psicologico"),
        ),
        make(
            "agendamento_tiro",
            "Agendamento do teste de tiro",
            "Teste de capacidade técnica agendado",
            "Olá, {{nome}}!\n\nSeu teste de capacidade técnica está marcado para {{data}} às {{hora}} \
             com o instrutor {{examinador}}.",
            Some("teste_tiro"),
        ),
        make(
            "cr_emitido",
            "CR emitido",
            "Seu Certificado de Registro foi emitido",
            "Parabéns, {{nome}}!\n\nSeu Certificado de Registro foi emitido.",
            Some("emissao_cr"),
        ),
    ]
}

/// Service for template administration and sending.
pub struct EmailService<C, W, E, M>
where
    C: ClientRepository,
    W: WorkflowRepository,
    E: EmailRepository,
    M: Mailer,
{
    client_repo: C,
    workflow_repo: W,
    email_repo: E,
    mailer: M,
    workflow_template: WorkflowTemplate,
    offset: FixedOffset,
}

impl<C, W, E, M> EmailService<C, W, E, M>
where
    C: ClientRepository,
    W: WorkflowRepository,
    E: EmailRepository,
    M: Mailer,
{
    /// - `offset`: time zone used to render appointment dates
    pub fn new(
        client_repo: C,
        workflow_repo: W,
        email_repo: E,
        mailer: M,
        workflow_template: WorkflowTemplate,
        offset: FixedOffset,
    ) -> Self {
        Self {
            client_repo,
            workflow_repo,
            email_repo,
            mailer,
            workflow_template,
            offset,
        }
    }

    // -----------------------------------------------------------------------
    // Templates
    // -----------------------------------------------------------------------

    pub async fn list_templates(&self, tenant_id: &TenantId) -> Result<Vec<EmailTemplate>, EmailError> {
        self.email_repo
            .list_templates(tenant_id)
            .await
            .map_err(|e| EmailError::StorageError(e.to_string()))
    }

    pub async fn get_template(
        &self,
        tenant_id: &TenantId,
        key: &str,
    ) -> Result<EmailTemplate, EmailError> {
        self.email_repo
            .get_template(tenant_id, key)
            .await
            .map_err(|e| EmailError::StorageError(e.to_string()))?
            .ok_or_else(|| EmailError::TemplateNotFound(key.to_string()))
    }

    /// Create or replace the template stored under `key`.
    pub async fn upsert_template(
        &self,
        tenant_id: &TenantId,
        key: &str,
        request: UpsertEmailTemplateRequest,
    ) -> Result<EmailTemplate, EmailError> {
        self.validate_template(key, &request)?;

        let now = Utc::now();
        let template = EmailTemplate {
            id: Uuid::now_v7(),
            tenant_id: tenant_id.clone(),
            key: key.to_string(),
            title: request.title.trim().to_string(),
            subject: request.subject.trim().to_string(),
            body: request.body,
            attachments: request.attachments,
            step_id: request.step_id.filter(|s| !s.trim().is_empty()),
            created_at: now,
            updated_at: now,
        };

        let saved = self
            .email_repo
            .upsert_template(&template)
            .await
            .map_err(|e| EmailError::StorageError(e.to_string()))?;
        info!(tenant_id = %tenant_id, key, "email template saved");
        Ok(saved)
    }

    fn validate_template(
        &self,
        key: &str,
        request: &UpsertEmailTemplateRequest,
    ) -> Result<(), EmailError> {
        if !is_valid_template_key(key) {
            return Err(EmailError::InvalidTemplate(format!(
                "key '{key}' must be 1-64 lowercase letters, digits, '_' or '-'"
            )));
        }
        if request.subject.trim().is_empty() {
            return Err(EmailError::InvalidTemplate("subject cannot be empty".to_string()));
        }
        if request.body.trim().is_empty() {
            return Err(EmailError::InvalidTemplate("body cannot be empty".to_string()));
        }
        for attachment in &request.attachments {
            if attachment.file_name.trim().is_empty() {
                return Err(EmailError::InvalidTemplate(
                    "attachment file name cannot be empty".to_string(),
                ));
            }
            if !(attachment.url.starts_with("https://") || attachment.url.starts_with("http://")) {
                return Err(EmailError::InvalidTemplate(format!(
                    "attachment '{}' must have an http(s) URL",
                    attachment.file_name
                )));
            }
        }
        if let Some(step_id) = request.step_id.as_deref().filter(|s| !s.trim().is_empty()) {
            if self.workflow_template.step(step_id).is_none() {
                return Err(EmailError::InvalidTemplate(format!(
                    "unknown workflow step '{step_id}'"
                )));
            }
        }
        Ok(())
    }

    pub async fn delete_template(&self, tenant_id: &TenantId, key: &str) -> Result<(), EmailError> {
        self.email_repo
            .delete_template(tenant_id, key)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => EmailError::TemplateNotFound(key.to_string()),
                other => EmailError::StorageError(other.to_string()),
            })?;
        info!(tenant_id = %tenant_id, key, "email template deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Sending
    // -----------------------------------------------------------------------

    async fn get_client(&self, tenant_id: &TenantId, client_id: &ClientId) -> Result<Client, EmailError> {
        self.client_repo
            .get(tenant_id, client_id)
            .await
            .map_err(|e| EmailError::StorageError(e.to_string()))?
            .ok_or(EmailError::ClientNotFound)
    }

    /// Render and send `key` to a client.
    ///
    /// Refuses with `AlreadySent` when the log already holds this template
    /// for the client, unless `resend` is set.
    pub async fn send(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        key: &str,
        resend: bool,
    ) -> Result<EmailSendLog, EmailError> {
        let template = self.get_template(tenant_id, key).await?;
        let client = self.get_client(tenant_id, client_id).await?;

        let to_address = client
            .email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or(EmailError::MissingRecipient)?;

        let schedule = match template.step_id.as_deref() {
            Some(step_id) => {
                let steps = match self
                    .workflow_repo
                    .load_workflow(tenant_id, client_id)
                    .await
                    .map_err(|e| EmailError::StorageError(e.to_string()))?
                {
                    Some(workflow) => workflow.steps,
                    None => self.workflow_template.instantiate(),
                };
                match steps.into_iter().find(|s| s.id == step_id) {
                    Some(step) if step.is_appointment() => Some(
                        step.schedule()
                            .cloned()
                            .ok_or_else(|| EmailError::ScheduleRequired(step_id.to_string()))?,
                    ),
                    _ => None,
                }
            }
            None => None,
        };

        let logs = self
            .email_repo
            .list_logs(tenant_id, client_id)
            .await
            .map_err(|e| EmailError::StorageError(e.to_string()))?;
        if !resend && logs.iter().any(|l| l.template_key == key) {
            return Err(EmailError::AlreadySent(key.to_string()));
        }

        let email = render_email(&template, &client, &to_address, schedule.as_ref(), self.offset);
        if let Err(e) = self.mailer.send(&email).await {
            warn!(tenant_id = %tenant_id, client_id = %client_id, key, error = %e, "email delivery failed");
            return Err(e.into());
        }

        let entry = EmailSendLog {
            id: Uuid::now_v7(),
            tenant_id: tenant_id.clone(),
            client_id: client_id.clone(),
            template_key: key.to_string(),
            recipient: to_address,
            sent_at: Utc::now(),
        };
        self.email_repo
            .append_log(&entry)
            .await
            .map_err(|e| EmailError::StorageError(e.to_string()))?;

        info!(tenant_id = %tenant_id, client_id = %client_id, key, resend, "email sent");
        Ok(entry)
    }

    /// Every template with the last time it was sent to the client.
    pub async fn email_status(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> Result<Vec<EmailStatus>, EmailError> {
        self.get_client(tenant_id, client_id).await?;
        let templates = self.list_templates(tenant_id).await?;
        let logs = self.history(tenant_id, client_id).await?;

        Ok(templates
            .into_iter()
            .map(|t| {
                let last_sent_at: Option<DateTime<Utc>> = logs
                    .iter()
                    .filter(|l| l.template_key == t.key)
                    .map(|l| l.sent_at)
                    .max();
                EmailStatus {
                    key: t.key,
                    title: t.title,
                    step_id: t.step_id,
                    last_sent_at,
                }
            })
            .collect())
    }

    /// Send log of one client, newest first.
    pub async fn history(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> Result<Vec<EmailSendLog>, EmailError> {
        self.email_repo
            .list_logs(tenant_id, client_id)
            .await
            .map_err(|e| EmailError::StorageError(e.to_string()))
    }
}
