//! Access key authentication extractors.
//!
//! Keys are read from:
//! - `Authorization: Bearer <key>` header
//! - `X-API-Key: <key>` header
//!
//! and resolved to a [`Principal`] through the access service, which compares
//! SHA-256 hashes against the `access_keys` table.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use firerange_types::access::Principal;
use firerange_types::tenant::Tenant;

use crate::http::error::AppError;
use crate::state::AppState;

/// Authenticated caller. Extracting this validates the access key.
pub struct Authenticated(pub Principal);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = extract_access_key(parts)?;

        let principal = state
            .access_service
            .authenticate(&key)
            .await
            .map_err(|e| AppError::Internal(format!("Database error: {e}")))?
            .ok_or_else(|| {
                AppError::Unauthorized(
                    "Invalid access key. Provide a valid key via 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header.".to_string(),
                )
            })?;

        Ok(Authenticated(principal))
    }
}

/// Authenticated caller plus the tenant named by the first path segment.
///
/// Authentication runs first, so an anonymous request to an unknown tenant
/// gets 401 rather than 404. Whether the principal may act on the tenant is
/// checked by each handler against its own action.
pub struct TenantContext {
    pub tenant: Tenant,
    pub principal: Principal,
}

impl FromRequestParts<AppState> for TenantContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Authenticated(principal) = Authenticated::from_request_parts(parts, state).await?;
        let tenant = state.tenant_service.resolve_path(parts.uri.path()).await?;
        Ok(TenantContext { tenant, principal })
    }
}

/// Extract the access key from request headers.
fn extract_access_key(parts: &Parts) -> Result<String, AppError> {
    if let Some(auth) = parts.headers.get("authorization") {
        let auth_str = auth.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        if let Some(key) = auth_str.strip_prefix("Bearer ") {
            return Ok(key.trim().to_string());
        }
    }

    if let Some(key) = parts.headers.get("x-api-key") {
        let key_str = key.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid X-API-Key header encoding".to_string())
        })?;
        return Ok(key_str.trim().to_string());
    }

    Err(AppError::Unauthorized(
        "Missing access key. Provide via 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header.".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: (&str, &str)) -> Parts {
        let (parts, _) = Request::builder()
            .header(header.0, header.1)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_extract_bearer_and_header_keys() {
        assert_eq!(
            extract_access_key(&parts(("authorization", "Bearer frk_abc "))).unwrap(),
            "frk_abc"
        );
        assert_eq!(
            extract_access_key(&parts(("x-api-key", "frk_def"))).unwrap(),
            "frk_def"
        );
        assert!(matches!(
            extract_access_key(&parts(("authorization", "Basic xyz"))),
            Err(AppError::Unauthorized(_))
        ));
    }
}
