//! SQLite email template and send-log repository implementation.

use firerange_core::repository::email::EmailRepository;
use firerange_types::client::ClientId;
use firerange_types::email::{Attachment, EmailSendLog, EmailTemplate};
use firerange_types::error::RepositoryError;
use firerange_types::tenant::TenantId;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_uuid};

/// SQLite-backed implementation of `EmailRepository`.
pub struct SqliteEmailRepository {
    pool: DatabasePool,
}

impl SqliteEmailRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct TemplateRow {
    id: String,
    tenant_id: String,
    template_key: String,
    title: String,
    subject: String,
    body: String,
    attachments: String,
    step_id: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TemplateRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            tenant_id: row.try_get("tenant_id")?,
            template_key: row.try_get("template_key")?,
            title: row.try_get("title")?,
            subject: row.try_get("subject")?,
            body: row.try_get("body")?,
            attachments: row.try_get("attachments")?,
            step_id: row.try_get("step_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_template(self) -> Result<EmailTemplate, RepositoryError> {
        let attachments: Vec<Attachment> = serde_json::from_str(&self.attachments)
            .map_err(|e| RepositoryError::Query(format!("invalid attachments JSON: {e}")))?;

        Ok(EmailTemplate {
            id: parse_uuid(&self.id)?,
            tenant_id: self
                .tenant_id
                .parse()
                .map_err(|e| RepositoryError::Query(format!("invalid tenant id: {e}")))?,
            key: self.template_key,
            title: self.title,
            subject: self.subject,
            body: self.body,
            attachments,
            step_id: self.step_id,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn map_template(row: &sqlx::sqlite::SqliteRow) -> Result<EmailTemplate, RepositoryError> {
    TemplateRow::from_row(row)
        .map_err(|e| RepositoryError::Query(e.to_string()))?
        .into_template()
}

fn map_log(row: &sqlx::sqlite::SqliteRow) -> Result<EmailSendLog, RepositoryError> {
    let get = |name: &str| -> Result<String, RepositoryError> {
        row.try_get(name)
            .map_err(|e: sqlx::Error| RepositoryError::Query(e.to_string()))
    };

    Ok(EmailSendLog {
        id: parse_uuid(&get("id")?)?,
        tenant_id: get("tenant_id")?
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid tenant id: {e}")))?,
        client_id: get("client_id")?
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid client id: {e}")))?,
        template_key: get("template_key")?,
        recipient: get("recipient")?,
        sent_at: parse_datetime(&get("sent_at")?)?,
    })
}

impl EmailRepository for SqliteEmailRepository {
    async fn list_templates(&self, tenant_id: &TenantId) -> Result<Vec<EmailTemplate>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM email_templates WHERE tenant_id = ? ORDER BY template_key")
            .bind(tenant_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(map_template).collect()
    }

    async fn get_template(
        &self,
        tenant_id: &TenantId,
        key: &str,
    ) -> Result<Option<EmailTemplate>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM email_templates WHERE tenant_id = ? AND template_key = ?")
            .bind(tenant_id.to_string())
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.as_ref().map(map_template).transpose()
    }

    async fn upsert_template(&self, template: &EmailTemplate) -> Result<EmailTemplate, RepositoryError> {
        let attachments_json = serde_json::to_string(&template.attachments)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let row = sqlx::query(
            "INSERT INTO email_templates (id, tenant_id, template_key, title, subject, body, attachments, step_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(tenant_id, template_key) DO UPDATE SET
                 title = excluded.title,
                 subject = excluded.subject,
                 body = excluded.body,
                 attachments = excluded.attachments,
                 step_id = excluded.step_id,
                 updated_at = excluded.updated_at
             RETURNING *",
        )
        .bind(template.id.to_string())
        .bind(template.tenant_id.to_string())
        .bind(&template.key)
        .bind(&template.title)
        .bind(&template.subject)
        .bind(&template.body)
        .bind(&attachments_json)
        .bind(&template.step_id)
        .bind(format_datetime(&template.created_at))
        .bind(format_datetime(&template.updated_at))
        .fetch_one(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        map_template(&row)
    }

    async fn delete_template(&self, tenant_id: &TenantId, key: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM email_templates WHERE tenant_id = ? AND template_key = ?")
            .bind(tenant_id.to_string())
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn append_log(&self, entry: &EmailSendLog) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO email_send_log (id, tenant_id, client_id, template_key, recipient, sent_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(entry.tenant_id.to_string())
        .bind(entry.client_id.to_string())
        .bind(&entry.template_key)
        .bind(&entry.recipient)
        .bind(format_datetime(&entry.sent_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list_logs(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> Result<Vec<EmailSendLog>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM email_send_log WHERE tenant_id = ? AND client_id = ?
             ORDER BY sent_at DESC, id DESC",
        )
        .bind(tenant_id.to_string())
        .bind(client_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(map_log).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::client::{make_client, SqliteClientRepository};
    use crate::sqlite::pool::test_pool;
    use crate::sqlite::tenant::{make_tenant, SqliteTenantRepository};
    use chrono::{Duration, Utc};
    use firerange_core::repository::client::ClientRepository;
    use firerange_core::repository::tenant::TenantRepository;
    use uuid::Uuid;

    async fn setup() -> (SqliteEmailRepository, SqliteClientRepository, TenantId) {
        let pool = test_pool().await;
        let tenant = make_tenant("alvo");
        SqliteTenantRepository::new(pool.clone())
            .create(&tenant)
            .await
            .unwrap();
        (
            SqliteEmailRepository::new(pool.clone()),
            SqliteClientRepository::new(pool),
            tenant.id,
        )
    }

    fn make_template(tenant_id: &TenantId, key: &str) -> EmailTemplate {
        let now = Utc::now();
        EmailTemplate {
            id: Uuid::now_v7(),
            tenant_id: tenant_id.clone(),
            key: key.to_string(),
            title: format!("Modelo {key}"),
            subject: "Olá {{nome}}".to_string(),
            body: "Seu agendamento: {{data}} às {{hora}}".to_string(),
            attachments: vec![Attachment {
                file_name: "orientacoes.pdf".to_string(),
                url: "https://example.com/orientacoes.pdf".to_string(),
            }],
            step_id: Some("laudo_psicologico".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_template_crud() {
        let (repo, _, tenant) = setup().await;
        let template = make_template(&tenant, "boas_vindas");
        let stored = repo.upsert_template(&template).await.unwrap();
        assert_eq!(stored.id, template.id);
        assert_eq!(stored.attachments.len(), 1);

        let loaded = repo.get_template(&tenant, "boas_vindas").await.unwrap().unwrap();
        assert_eq!(loaded.step_id.as_deref(), Some("laudo_psicologico"));
        assert!(repo.get_template(&TenantId::new(), "boas_vindas").await.unwrap().is_none());

        repo.upsert_template(&make_template(&tenant, "agendamento_tiro")).await.unwrap();
        let keys: Vec<String> = repo
            .list_templates(&tenant)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.key)
            .collect();
        assert_eq!(keys, vec!["agendamento_tiro", "boas_vindas"]);

        repo.delete_template(&tenant, "boas_vindas").await.unwrap();
        assert!(matches!(
            repo.delete_template(&tenant, "boas_vindas").await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_upsert_keeps_identity() {
        let (repo, _, tenant) = setup().await;
        let original = repo.upsert_template(&make_template(&tenant, "boas_vindas")).await.unwrap();

        let mut replacement = make_template(&tenant, "boas_vindas");
        replacement.subject = "Bem-vindo, {{nome}}".to_string();
        replacement.attachments.clear();
        replacement.step_id = None;
        let stored = repo.upsert_template(&replacement).await.unwrap();

        assert_eq!(stored.id, original.id);
        assert_eq!(stored.created_at, original.created_at);
        assert_eq!(stored.subject, "Bem-vindo, {{nome}}");
        assert!(stored.attachments.is_empty());
        assert!(stored.step_id.is_none());
        assert_eq!(repo.list_templates(&tenant).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_send_log_newest_first() {
        let (repo, clients, tenant) = setup().await;
        let client = make_client(&tenant, "Ana");
        clients.create(&client).await.unwrap();

        let base = Utc::now();
        for (i, key) in ["boas_vindas", "agendamento_tiro"].iter().enumerate() {
            repo.append_log(&EmailSendLog {
                id: Uuid::now_v7(),
                tenant_id: tenant.clone(),
                client_id: client.id.clone(),
                template_key: key.to_string(),
                recipient: "ana@example.com".to_string(),
                sent_at: base + Duration::minutes(i as i64),
            })
            .await
            .unwrap();
        }

        let logs = repo.list_logs(&tenant, &client.id).await.unwrap();
        let keys: Vec<&str> = logs.iter().map(|l| l.template_key.as_str()).collect();
        assert_eq!(keys, vec!["agendamento_tiro", "boas_vindas"]);
        assert!(repo.list_logs(&TenantId::new(), &client.id).await.unwrap().is_empty());

        clients.delete(&tenant, &client.id).await.unwrap();
        assert!(repo.list_logs(&tenant, &client.id).await.unwrap().is_empty());
    }
}
