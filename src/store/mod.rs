//! Data store seam.
//!
//! The orchestrators only talk to [`ArticleStore`]; `PgStore` backs the
//! server binary and `MemoryStore` backs tests and local runs.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::TranslationResult;
use crate::model::{Article, LanguageLocale, NewSettings, SettingsRecord};
use async_trait::async_trait;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Fetch a knowledge article by id, failing with `NotFound` if absent
    async fn retrieve_article(&self, id: &str) -> TranslationResult<Article>;

    /// Fetch a language locale by id, failing with `NotFound` if absent
    async fn retrieve_locale(&self, id: &str) -> TranslationResult<LanguageLocale>;

    /// Persist the translatable fields of an existing article
    async fn update_article(&self, article: &Article) -> TranslationResult<()>;

    /// All translation settings records (normally zero or one)
    async fn list_settings(&self) -> TranslationResult<Vec<SettingsRecord>>;

    /// Insert the translation settings record, returning its id.
    /// Fails with `SingletonViolation` if one already exists.
    async fn insert_settings(&self, settings: &NewSettings) -> TranslationResult<String>;

    /// LCID of the organisation's base language
    async fn organization_language(&self) -> TranslationResult<i32>;

    /// LCID of a user's UI language, if the user has settings
    async fn user_ui_language(&self, user_id: &str) -> TranslationResult<Option<i32>>;

    /// Base64 content of a named resource file
    async fn web_resource(&self, name: &str) -> TranslationResult<Option<String>>;
}
