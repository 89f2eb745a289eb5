// src/admin/handlers.rs

use axum::{extract::Extension, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};
use crate::services::SettingsService;

#[derive(Debug, Deserialize)]
pub struct UpdateSetting {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateSettingResponse {
    pub success: bool,
    pub message: String,
}

/// Admin-gated upsert of one runtime configuration value, recording which
/// operator changed it
async fn apply_setting(
    settings: &SettingsService,
    authed: &AuthedUser,
    body: &UpdateSetting,
) -> Result<UpdateSettingResponse, ApiError> {
    if !authed.is_admin() {
        return Err(ApiError::Forbidden("admin privileges required".to_string()));
    }

    let key = body.key.trim().to_lowercase();
    if key.is_empty() {
        return Err(ApiError::ValidationError("key must not be empty".to_string()));
    }

    settings
        .set_setting(&key, &body.value, Some(&authed.email))
        .await
        .map_err(|e| {
            error!(error = %e, key = %key, "Failed to update setting");
            ApiError::InternalServer("could not update setting".to_string())
        })?;

    info!(key = %key, updated_by = %authed.email, "Setting updated");

    Ok(UpdateSettingResponse {
        success: true,
        message: format!("setting '{}' updated", key),
    })
}

/// PUT /api/admin/settings - Upsert a runtime configuration value
pub async fn update_setting(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<UpdateSetting>,
) -> Result<Json<UpdateSettingResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let response = apply_setting(&state.settings_service, &authed, &body).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserRole;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> SettingsService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::common::migrations::run_migrations(&pool).await.unwrap();
        SettingsService::new(pool)
    }

    fn admin() -> AuthedUser {
        AuthedUser {
            id: "U_ADMIN1".to_string(),
            email: "ops@example.com".to_string(),
            role: UserRole::Admin,
        }
    }

    #[tokio::test]
    async fn test_admin_can_update_setting() {
        let settings = setup().await;
        let body = UpdateSetting {
            key: "OpenAI_Model_Resume_Parsing".to_string(),
            value: "gpt-4o".to_string(),
        };

        let response = apply_setting(&settings, &admin(), &body).await.unwrap();
        assert!(response.success);

        // Key is folded to lowercase before storage
        let stored = settings
            .get_setting("openai_model_resume_parsing")
            .await
            .unwrap();
        assert_eq!(stored.as_deref(), Some("gpt-4o"));
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let settings = setup().await;
        let hr = AuthedUser {
            id: "U_HR0001".to_string(),
            email: "hr@example.com".to_string(),
            role: UserRole::Hr,
        };
        let body = UpdateSetting {
            key: "openai_base_url".to_string(),
            value: "https://api.example.com".to_string(),
        };

        let err = apply_setting(&settings, &hr, &body).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_blank_key_is_rejected() {
        let settings = setup().await;
        let body = UpdateSetting {
            key: "   ".to_string(),
            value: "x".to_string(),
        };

        let err = apply_setting(&settings, &admin(), &body).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }
}
