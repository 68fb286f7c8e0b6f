//! SQLite workflow repository implementation.
//!
//! A workflow is stored as one `workflows` row (revision and timestamp) plus
//! one row per step and per sub-task. Saving replaces the whole step list in
//! a single transaction, guarded by the revision the caller loaded.

use std::collections::HashMap;

use chrono::Utc;
use firerange_core::repository::workflow::WorkflowRepository;
use firerange_types::client::ClientId;
use firerange_types::error::RepositoryError;
use firerange_types::tenant::TenantId;
use firerange_types::workflow::{ClientProgress, Progress, Schedule, Step, StepKind, SubTask, Workflow};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_optional_datetime};

/// SQLite-backed implementation of `WorkflowRepository`.
pub struct SqliteWorkflowRepository {
    pool: DatabasePool,
}

impl SqliteWorkflowRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct StepRow {
    step_id: String,
    title: String,
    kind: String,
    completed: bool,
    scheduled_at: Option<String>,
    examiner_name: Option<String>,
}

impl StepRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            step_id: row.try_get("step_id")?,
            title: row.try_get("title")?,
            kind: row.try_get("kind")?,
            completed: row.try_get("completed")?,
            scheduled_at: row.try_get("scheduled_at")?,
            examiner_name: row.try_get("examiner_name")?,
        })
    }

    fn into_step(self, sub_tasks: &mut HashMap<String, Vec<SubTask>>) -> Result<Step, RepositoryError> {
        let kind = match self.kind.as_str() {
            "task" => StepKind::Task,
            "checklist" => StepKind::Checklist {
                sub_tasks: sub_tasks.remove(&self.step_id).unwrap_or_default(),
            },
            "appointment" => {
                let scheduled_at = parse_optional_datetime(self.scheduled_at)?;
                let schedule = match (scheduled_at, self.examiner_name) {
                    (Some(scheduled_at), Some(examiner_name)) => Some(Schedule {
                        scheduled_at,
                        examiner_name,
                    }),
                    _ => None,
                };
                StepKind::Appointment { schedule }
            }
            other => {
                return Err(RepositoryError::Query(format!("invalid step kind '{other}'")));
            }
        };

        Ok(Step {
            id: self.step_id,
            title: self.title,
            completed: self.completed,
            kind,
        })
    }
}

fn kind_name(kind: &StepKind) -> &'static str {
    match kind {
        StepKind::Task => "task",
        StepKind::Checklist { .. } => "checklist",
        StepKind::Appointment { .. } => "appointment",
    }
}

fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

impl WorkflowRepository for SqliteWorkflowRepository {
    async fn load_workflow(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> Result<Option<Workflow>, RepositoryError> {
        // One read transaction so the three selects see the same save.
        let mut tx = self.pool.reader.begin().await.map_err(query_err)?;

        let header = sqlx::query(
            "SELECT revision, updated_at FROM workflows WHERE client_id = ? AND tenant_id = ?",
        )
        .bind(client_id.to_string())
        .bind(tenant_id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(query_err)?;

        let Some(header) = header else {
            return Ok(None);
        };
        let revision: i64 = header.try_get("revision").map_err(query_err)?;
        let updated_at: String = header.try_get("updated_at").map_err(query_err)?;

        let sub_task_rows = sqlx::query(
            "SELECT step_id, sub_task_id, label, completed FROM workflow_sub_tasks
             WHERE client_id = ? ORDER BY step_id, position",
        )
        .bind(client_id.to_string())
        .fetch_all(&mut *tx)
        .await
        .map_err(query_err)?;

        let mut sub_tasks: HashMap<String, Vec<SubTask>> = HashMap::new();
        for row in &sub_task_rows {
            let step_id: String = row.try_get("step_id").map_err(query_err)?;
            sub_tasks.entry(step_id).or_default().push(SubTask {
                id: row.try_get("sub_task_id").map_err(query_err)?,
                label: row.try_get("label").map_err(query_err)?,
                completed: row.try_get("completed").map_err(query_err)?,
            });
        }

        let step_rows = sqlx::query("SELECT * FROM workflow_steps WHERE client_id = ? ORDER BY position")
            .bind(client_id.to_string())
            .fetch_all(&mut *tx)
            .await
            .map_err(query_err)?;

        tx.commit().await.map_err(query_err)?;

        let steps = step_rows
            .iter()
            .map(|row| {
                StepRow::from_row(row)
                    .map_err(query_err)?
                    .into_step(&mut sub_tasks)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Workflow {
            tenant_id: tenant_id.clone(),
            client_id: client_id.clone(),
            steps,
            revision,
            updated_at: parse_datetime(&updated_at)?,
        }))
    }

    async fn save_workflow(&self, workflow: &Workflow) -> Result<Workflow, RepositoryError> {
        let client_id = workflow.client_id.to_string();
        let now = Utc::now();
        let revision = workflow.revision + 1;

        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        if workflow.revision == 0 {
            let result = sqlx::query(
                "INSERT INTO workflows (client_id, tenant_id, revision, updated_at) VALUES (?, ?, ?, ?)",
            )
            .bind(&client_id)
            .bind(workflow.tenant_id.to_string())
            .bind(revision)
            .bind(format_datetime(&now))
            .execute(&mut *tx)
            .await;

            match result {
                Ok(_) => {}
                Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                    return Err(RepositoryError::Conflict(format!(
                        "workflow of client {client_id} already exists"
                    )));
                }
                Err(e) => return Err(query_err(e)),
            }
        } else {
            let result = sqlx::query(
                "UPDATE workflows SET revision = ?, updated_at = ?
                 WHERE client_id = ? AND tenant_id = ? AND revision = ?",
            )
            .bind(revision)
            .bind(format_datetime(&now))
            .bind(&client_id)
            .bind(workflow.tenant_id.to_string())
            .bind(workflow.revision)
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::Conflict(format!(
                    "workflow of client {client_id} is not at revision {}",
                    workflow.revision
                )));
            }
        }

        // Sub-task rows cascade with their steps.
        sqlx::query("DELETE FROM workflow_steps WHERE client_id = ?")
            .bind(&client_id)
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        for (position, step) in workflow.steps.iter().enumerate() {
            let schedule = step.schedule();
            sqlx::query(
                "INSERT INTO workflow_steps (client_id, step_id, position, title, kind, completed, scheduled_at, examiner_name)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&client_id)
            .bind(&step.id)
            .bind(position as i64)
            .bind(&step.title)
            .bind(kind_name(&step.kind))
            .bind(step.completed)
            .bind(schedule.map(|s| format_datetime(&s.scheduled_at)))
            .bind(schedule.map(|s| s.examiner_name.clone()))
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

            for (sub_position, sub_task) in step.sub_tasks().iter().enumerate() {
                sqlx::query(
                    "INSERT INTO workflow_sub_tasks (client_id, step_id, sub_task_id, position, label, completed)
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(&client_id)
                .bind(&step.id)
                .bind(&sub_task.id)
                .bind(sub_position as i64)
                .bind(&sub_task.label)
                .bind(sub_task.completed)
                .execute(&mut *tx)
                .await
                .map_err(query_err)?;
            }
        }

        tx.commit().await.map_err(query_err)?;

        tracing::debug!(client_id = %workflow.client_id, revision, "workflow saved");

        Ok(Workflow {
            revision,
            updated_at: now,
            ..workflow.clone()
        })
    }

    async fn progress_by_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<ClientProgress>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT c.id AS client_id, c.name AS client_name,
                    COUNT(s.step_id) AS total,
                    COALESCE(SUM(s.completed), 0) AS completed
             FROM clients c
             LEFT JOIN workflow_steps s ON s.client_id = c.id
             WHERE c.tenant_id = ?
             GROUP BY c.id, c.name
             ORDER BY c.name COLLATE NOCASE, c.created_at",
        )
        .bind(tenant_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        rows.iter()
            .map(|row| {
                let client_id: String = row.try_get("client_id").map_err(query_err)?;
                let total: i64 = row.try_get("total").map_err(query_err)?;
                let completed: i64 = row.try_get("completed").map_err(query_err)?;
                Ok(ClientProgress {
                    client_id: client_id
                        .parse()
                        .map_err(|e| RepositoryError::Query(format!("invalid client id: {e}")))?,
                    client_name: row.try_get("client_name").map_err(query_err)?,
                    progress: Progress::new(completed as usize, total as usize),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::client::{make_client, SqliteClientRepository};
    use crate::sqlite::pool::test_pool;
    use crate::sqlite::tenant::{make_tenant, SqliteTenantRepository};
    use chrono::TimeZone;
    use firerange_core::repository::client::ClientRepository;
    use firerange_core::repository::tenant::TenantRepository;
    use firerange_core::workflow::{builtin_template, WorkflowEngine};

    struct Fixture {
        repo: SqliteWorkflowRepository,
        clients: SqliteClientRepository,
        tenant: TenantId,
    }

    async fn fixture() -> Fixture {
        let pool = test_pool().await;
        let tenant = make_tenant("alvo");
        SqliteTenantRepository::new(pool.clone())
            .create(&tenant)
            .await
            .unwrap();
        Fixture {
            repo: SqliteWorkflowRepository::new(pool.clone()),
            clients: SqliteClientRepository::new(pool),
            tenant: tenant.id,
        }
    }

    impl Fixture {
        async fn client(&self, name: &str) -> ClientId {
            let client = make_client(&self.tenant, name);
            self.clients.create(&client).await.unwrap();
            client.id
        }

        fn fresh(&self, client_id: &ClientId) -> Workflow {
            Workflow {
                tenant_id: self.tenant.clone(),
                client_id: client_id.clone(),
                steps: builtin_template().instantiate(),
                revision: 0,
                updated_at: Utc::now(),
            }
        }
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let f = fixture().await;
        let client = f.client("Ana").await;
        assert!(f.repo.load_workflow(&f.tenant, &client).await.unwrap().is_none());

        let saved = f.repo.save_workflow(&f.fresh(&client)).await.unwrap();
        assert_eq!(saved.revision, 1);

        let mut engine = WorkflowEngine::new(saved.steps.clone());
        engine.toggle_sub_task("documentacao", "rg");
        engine.toggle_step("cadastro");
        let at = Utc.with_ymd_and_hms(2026, 3, 10, 17, 30, 0).unwrap();
        engine.schedule_step("laudo_psicologico", at, "Dra. Marta");

        let saved = f
            .repo
            .save_workflow(&Workflow {
                steps: engine.into_steps(),
                ..saved
            })
            .await
            .unwrap();
        assert_eq!(saved.revision, 2);

        let loaded = f.repo.load_workflow(&f.tenant, &client).await.unwrap().unwrap();
        assert_eq!(loaded.revision, 2);
        assert_eq!(loaded.steps, saved.steps);

        let laudo = loaded.step("laudo_psicologico").unwrap();
        let schedule = laudo.schedule().unwrap();
        assert_eq!(schedule.scheduled_at, at);
        assert_eq!(schedule.examiner_name, "Dra. Marta");

        let ids: Vec<&str> = loaded.steps.iter().map(|s| s.id.as_str()).collect();
        let expected: Vec<String> = builtin_template().steps.into_iter().map(|b| b.id).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_stale_revision_conflicts() {
        let f = fixture().await;
        let client = f.client("Ana").await;
        let saved = f.repo.save_workflow(&f.fresh(&client)).await.unwrap();

        // A second insert at revision 0 loses.
        assert!(matches!(
            f.repo.save_workflow(&f.fresh(&client)).await,
            Err(RepositoryError::Conflict(_))
        ));

        let first = f.repo.save_workflow(&saved).await.unwrap();
        assert_eq!(first.revision, 2);
        // Same base revision again: rejected, nothing overwritten.
        assert!(matches!(
            f.repo.save_workflow(&saved).await,
            Err(RepositoryError::Conflict(_))
        ));
        let loaded = f.repo.load_workflow(&f.tenant, &client).await.unwrap().unwrap();
        assert_eq!(loaded.revision, 2);
    }

    #[tokio::test]
    async fn test_workflow_is_tenant_scoped() {
        let f = fixture().await;
        let client = f.client("Ana").await;
        let saved = f.repo.save_workflow(&f.fresh(&client)).await.unwrap();

        let other = TenantId::new();
        assert!(f.repo.load_workflow(&other, &client).await.unwrap().is_none());
        assert!(matches!(
            f.repo
                .save_workflow(&Workflow {
                    tenant_id: other,
                    ..saved
                })
                .await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_progress_by_tenant() {
        let f = fixture().await;
        let bruno = f.client("Bruno").await;
        let ana = f.client("Ana").await;
        let carla = f.client("Carla").await;

        let saved = f.repo.save_workflow(&f.fresh(&bruno)).await.unwrap();
        let mut engine = WorkflowEngine::new(saved.steps.clone());
        engine.toggle_step("cadastro");
        engine.toggle_step("filiacao");
        f.repo
            .save_workflow(&Workflow {
                steps: engine.into_steps(),
                ..saved
            })
            .await
            .unwrap();
        f.repo.save_workflow(&f.fresh(&ana)).await.unwrap();

        let rows = f.repo.progress_by_tenant(&f.tenant).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.client_name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bruno", "Carla"]);

        assert_eq!(rows[0].progress.completed, 0);
        assert_eq!(rows[0].progress.total, 8);
        assert_eq!(rows[1].client_id, bruno);
        assert_eq!(rows[1].progress.completed, 2);
        // Never-stored workflow reports zero steps.
        assert_eq!(rows[2].client_id, carla);
        assert_eq!(rows[2].progress.total, 0);
    }

    #[tokio::test]
    async fn test_delete_client_cascades_workflow() {
        let f = fixture().await;
        let client = f.client("Ana").await;
        f.repo.save_workflow(&f.fresh(&client)).await.unwrap();

        f.clients.delete(&f.tenant, &client).await.unwrap();
        assert!(f.repo.load_workflow(&f.tenant, &client).await.unwrap().is_none());
        let leftover: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM workflow_sub_tasks")
            .fetch_one(&f.repo.pool.reader)
            .await
            .unwrap();
        assert_eq!(leftover.0, 0);
    }
}
