// src/services/settings.rs
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
struct CachedSetting {
    value: String,
    expires_at: DateTime<Utc>,
}

/// DB-backed configuration with a short-lived in-memory cache.
/// Falls back to the upper-cased environment variable when a key is
/// missing from the database.
#[derive(Debug)]
pub struct SettingsService {
    db_pool: SqlitePool,
    cache: Arc<RwLock<HashMap<String, CachedSetting>>>,
    cache_ttl: Duration,
}

impl SettingsService {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self {
            db_pool,
            cache: Arc::new(RwLock::new(HashMap::new())),
            cache_ttl: Duration::minutes(5),
        }
    }

    /// Get a setting value by key
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, SettingsError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(key) {
                if cached.expires_at > Utc::now() {
                    debug!(key = %key, "Setting retrieved from cache");
                    return Ok(Some(cached.value.clone()));
                }
            }
        }

        let result = sqlx::query_as::<_, (String, String)>(
            "SELECT key, value FROM system_settings WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.db_pool)
        .await?;

        if let Some((_, value)) = result {
            {
                let mut cache = self.cache.write().await;
                cache.insert(
                    key.to_string(),
                    CachedSetting {
                        value: value.clone(),
                        expires_at: Utc::now() + self.cache_ttl,
                    },
                );
            }

            debug!(key = %key, "Setting retrieved from database");
            Ok(Some(value))
        } else {
            if let Ok(env_value) = env::var(key.to_uppercase()) {
                debug!(key = %key, "Setting retrieved from environment variable");
                return Ok(Some(env_value));
            }

            debug!(key = %key, "Setting not found");
            Ok(None)
        }
    }

    /// Set a setting value, replacing any existing one
    pub async fn set_setting(
        &self,
        key: &str,
        value: &str,
        updated_by: Option<&str>,
    ) -> Result<(), SettingsError> {
        sqlx::query(
            r#"
            INSERT INTO system_settings (key, value, updated_at, updated_by)
            VALUES (?, ?, datetime('now'), ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at,
                updated_by = excluded.updated_by
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(updated_by.unwrap_or("system"))
        .execute(&self.db_pool)
        .await?;

        let mut cache = self.cache.write().await;
        cache.insert(
            key.to_string(),
            CachedSetting {
                value: value.to_string(),
                expires_at: Utc::now() + self.cache_ttl,
            },
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[tokio::test]
    async fn test_set_then_get_round_trips() {
        let service = setup().await;

        service
            .set_setting("openai_model_resume_parsing", "gpt-4o-mini", Some("admin"))
            .await
            .unwrap();

        let value = service
            .get_setting("openai_model_resume_parsing")
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some("gpt-4o-mini"));
    }

    #[tokio::test]
    async fn test_set_replaces_existing_value() {
        let service = setup().await;

        service.set_setting("openai_base_url", "https://a", None).await.unwrap();
        service.set_setting("openai_base_url", "https://b", None).await.unwrap();

        let value = service.get_setting("openai_base_url").await.unwrap();
        assert_eq!(value.as_deref(), Some("https://b"));
    }

    #[tokio::test]
    async fn test_missing_key_falls_back_to_env() {
        let service = setup().await;

        std::env::set_var("SETTINGS_FALLBACK_SAMPLE", "from-env");
        let value = service.get_setting("settings_fallback_sample").await.unwrap();
        std::env::remove_var("SETTINGS_FALLBACK_SAMPLE");

        assert_eq!(value.as_deref(), Some("from-env"));
    }

    #[tokio::test]
    async fn test_unknown_key_is_none() {
        let service = setup().await;
        let value = service.get_setting("definitely_not_configured").await.unwrap();
        assert_eq!(value, None);
    }
}
