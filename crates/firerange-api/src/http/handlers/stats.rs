//! Tenant dashboard statistics endpoint.
//!
//! GET /api/v1/{tenant}/stats - Per-client progress plus aggregate counts.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use firerange_types::access::Action;
use firerange_types::workflow::ClientProgress;

use crate::http::error::AppError;
use crate::http::extractors::auth::TenantContext;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TenantStats {
    pub total_clients: usize,
    /// Clients whose every step is complete.
    pub completed_clients: usize,
    /// Mean progress percentage across clients (0 with no clients).
    pub average_percent: f64,
    pub clients: Vec<ClientProgress>,
}

impl TenantStats {
    pub fn from_progress(clients: Vec<ClientProgress>) -> Self {
        let total_clients = clients.len();
        let completed_clients = clients.iter().filter(|c| c.progress.is_complete()).count();
        let average_percent = if total_clients == 0 {
            0.0
        } else {
            clients.iter().map(|c| c.progress.percent).sum::<f64>() / total_clients as f64
        };
        Self {
            total_clients,
            completed_clients,
            average_percent,
            clients,
        }
    }
}

/// GET /api/v1/{tenant}/stats
pub async fn get_stats(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> Result<Json<ApiResponse<TenantStats>>, AppError> {
    let timer = RequestTimer::start();
    ctx.principal.authorize(&ctx.tenant.id, Action::ViewStats)?;

    let progress = state
        .workflow_service
        .progress_overview(&ctx.tenant.id)
        .await?;
    Ok(Json(timer.finish(TenantStats::from_progress(progress))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use firerange_types::client::ClientId;
    use firerange_types::workflow::Progress;

    fn row(name: &str, completed: usize) -> ClientProgress {
        ClientProgress {
            client_id: ClientId::new(),
            client_name: name.to_string(),
            progress: Progress::new(completed, 8),
        }
    }

    #[test]
    fn test_stats_aggregates() {
        let stats = TenantStats::from_progress(vec![row("Ana", 8), row("Bruno", 2)]);
        assert_eq!(stats.total_clients, 2);
        assert_eq!(stats.completed_clients, 1);
        assert!((stats.average_percent - 62.5).abs() < f64::EPSILON);

        let empty = TenantStats::from_progress(Vec::new());
        assert_eq!(empty.average_percent, 0.0);
    }
}
