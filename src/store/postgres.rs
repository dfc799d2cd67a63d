use super::ArticleStore;
use crate::error::{TranslationError, TranslationResult};
use crate::model::{Article, ArticleFields, LanguageLocale, NewSettings, SettingsRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;

const SCHEMA: [&str; 7] = [
    "CREATE TABLE IF NOT EXISTS language_locales (
        id TEXT PRIMARY KEY,
        code TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS knowledge_articles (
        id TEXT PRIMARY KEY,
        title TEXT,
        keywords TEXT,
        description TEXT,
        content TEXT,
        is_primary BOOLEAN NOT NULL DEFAULT FALSE,
        is_root_article BOOLEAN NOT NULL DEFAULT FALSE,
        language_locale_id TEXT REFERENCES language_locales(id),
        parent_article_id TEXT REFERENCES knowledge_articles(id)
    )",
    "CREATE TABLE IF NOT EXISTS translation_settings (
        id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::text,
        client_id TEXT,
        client_secret TEXT,
        is_auto_translation_enabled BOOLEAN,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    // At most one settings row, whatever its contents
    "CREATE UNIQUE INDEX IF NOT EXISTS translation_settings_singleton
        ON translation_settings ((TRUE))",
    "CREATE TABLE IF NOT EXISTS organization (
        id INTEGER PRIMARY KEY,
        language_code INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS user_settings (
        user_id TEXT PRIMARY KEY,
        ui_language_id INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS web_resources (
        name TEXT PRIMARY KEY,
        content TEXT NOT NULL
    )",
];

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and create the schema if it does not exist yet
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .with_context(|| format!("Failed to apply schema statement: {}", statement))?;
        }

        info!("✓ Database schema ready");
        Ok(Self { pool })
    }
}

fn article_from_row(row: &PgRow) -> Result<Article, sqlx::Error> {
    Ok(Article {
        id: row.try_get("id")?,
        is_primary: row.try_get("is_primary")?,
        is_root_article: row.try_get("is_root_article")?,
        language_locale_id: row.try_get("language_locale_id")?,
        parent_article_id: row.try_get("parent_article_id")?,
        fields: ArticleFields {
            title: row.try_get("title")?,
            keywords: row.try_get("keywords")?,
            description: row.try_get("description")?,
            content: row.try_get("content")?,
        },
    })
}

#[async_trait]
impl ArticleStore for PgStore {
    async fn retrieve_article(&self, id: &str) -> TranslationResult<Article> {
        let row = sqlx::query(
            "SELECT id, title, keywords, description, content, is_primary, is_root_article,
                    language_locale_id, parent_article_id
             FROM knowledge_articles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| TranslationError::not_found("knowledge article", id))?;

        Ok(article_from_row(&row)?)
    }

    async fn retrieve_locale(&self, id: &str) -> TranslationResult<LanguageLocale> {
        let row = sqlx::query("SELECT id, code FROM language_locales WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| TranslationError::not_found("language locale", id))?;

        Ok(LanguageLocale {
            id: row.try_get("id")?,
            code: row.try_get("code")?,
        })
    }

    async fn update_article(&self, article: &Article) -> TranslationResult<()> {
        let result = sqlx::query(
            "UPDATE knowledge_articles
             SET title = $2, keywords = $3, description = $4, content = $5
             WHERE id = $1",
        )
        .bind(&article.id)
        .bind(&article.fields.title)
        .bind(&article.fields.keywords)
        .bind(&article.fields.description)
        .bind(&article.fields.content)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TranslationError::not_found("knowledge article", &article.id));
        }
        Ok(())
    }

    async fn list_settings(&self) -> TranslationResult<Vec<SettingsRecord>> {
        let rows = sqlx::query(
            "SELECT id, client_id, client_secret, is_auto_translation_enabled
             FROM translation_settings ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .iter()
            .map(|row| {
                Ok(SettingsRecord {
                    id: row.try_get("id")?,
                    client_id: row.try_get("client_id")?,
                    client_secret: row.try_get("client_secret")?,
                    auto_translation_enabled: row.try_get("is_auto_translation_enabled")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(records)
    }

    async fn insert_settings(&self, settings: &NewSettings) -> TranslationResult<String> {
        let result = sqlx::query_scalar::<_, String>(
            "INSERT INTO translation_settings (client_id, client_secret, is_auto_translation_enabled)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(&settings.client_id)
        .bind(&settings.client_secret)
        .bind(settings.auto_translation_enabled)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(id),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(TranslationError::SingletonViolation(
                    "translation settings record already exists".to_string(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn organization_language(&self) -> TranslationResult<i32> {
        sqlx::query_scalar::<_, i32>("SELECT language_code FROM organization ORDER BY id LIMIT 1")
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| TranslationError::not_found("organization", "base language"))
    }

    async fn user_ui_language(&self, user_id: &str) -> TranslationResult<Option<i32>> {
        Ok(sqlx::query_scalar::<_, i32>(
            "SELECT ui_language_id FROM user_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn web_resource(&self, name: &str) -> TranslationResult<Option<String>> {
        Ok(
            sqlx::query_scalar::<_, String>("SELECT content FROM web_resources WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?,
        )
    }
}
