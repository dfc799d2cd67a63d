use super::ArticleStore;
use crate::error::{TranslationError, TranslationResult};
use crate::model::{Article, LanguageLocale, NewSettings, SettingsRecord};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    articles: HashMap<String, Article>,
    locales: HashMap<String, LanguageLocale>,
    settings: Vec<SettingsRecord>,
    organization_language: i32,
    user_languages: HashMap<String, i32>,
    web_resources: HashMap<String, String>,
    updates: Vec<Article>,
    faults: HashSet<&'static str>,
    next_settings_id: u32,
}

/// In-process store with fault injection.
///
/// Operations are named after the trait methods; [`MemoryStore::fail`] makes
/// the named operation return a `Platform` fault.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let store = Self::default();
        store.lock().organization_language = 1033;
        store
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn put_article(&self, article: Article) {
        self.lock().articles.insert(article.id.clone(), article);
    }

    pub fn put_locale(&self, id: &str, code: &str) {
        self.lock().locales.insert(
            id.to_string(),
            LanguageLocale {
                id: id.to_string(),
                code: code.to_string(),
            },
        );
    }

    /// Add a settings row directly, bypassing the singleton check
    pub fn put_settings_record(&self, record: SettingsRecord) {
        self.lock().settings.push(record);
    }

    pub fn set_organization_language(&self, lcid: i32) {
        self.lock().organization_language = lcid;
    }

    pub fn set_user_language(&self, user_id: &str, lcid: i32) {
        self.lock().user_languages.insert(user_id.to_string(), lcid);
    }

    pub fn put_web_resource(&self, name: &str, base64_content: &str) {
        self.lock()
            .web_resources
            .insert(name.to_string(), base64_content.to_string());
    }

    pub fn fail(&self, operation: &'static str) {
        self.lock().faults.insert(operation);
    }

    pub fn article(&self, id: &str) -> Option<Article> {
        self.lock().articles.get(id).cloned()
    }

    /// Every article passed to `update_article`, in call order
    pub fn updates(&self) -> Vec<Article> {
        self.lock().updates.clone()
    }

    pub fn settings_records(&self) -> Vec<SettingsRecord> {
        self.lock().settings.clone()
    }

    fn check(state: &State, operation: &'static str) -> TranslationResult<()> {
        if state.faults.contains(operation) {
            return Err(TranslationError::Platform(format!(
                "injected fault in {}",
                operation
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn retrieve_article(&self, id: &str) -> TranslationResult<Article> {
        let state = self.lock();
        Self::check(&state, "retrieve_article")?;
        state
            .articles
            .get(id)
            .cloned()
            .ok_or_else(|| TranslationError::not_found("knowledge article", id))
    }

    async fn retrieve_locale(&self, id: &str) -> TranslationResult<LanguageLocale> {
        let state = self.lock();
        Self::check(&state, "retrieve_locale")?;
        state
            .locales
            .get(id)
            .cloned()
            .ok_or_else(|| TranslationError::not_found("language locale", id))
    }

    async fn update_article(&self, article: &Article) -> TranslationResult<()> {
        let mut state = self.lock();
        Self::check(&state, "update_article")?;
        if !state.articles.contains_key(&article.id) {
            return Err(TranslationError::not_found("knowledge article", &article.id));
        }
        state.articles.insert(article.id.clone(), article.clone());
        state.updates.push(article.clone());
        Ok(())
    }

    async fn list_settings(&self) -> TranslationResult<Vec<SettingsRecord>> {
        let state = self.lock();
        Self::check(&state, "list_settings")?;
        Ok(state.settings.clone())
    }

    async fn insert_settings(&self, settings: &NewSettings) -> TranslationResult<String> {
        let mut state = self.lock();
        Self::check(&state, "insert_settings")?;
        if !state.settings.is_empty() {
            return Err(TranslationError::SingletonViolation(
                "translation settings record already exists".to_string(),
            ));
        }
        state.next_settings_id += 1;
        let id = format!("settings-{}", state.next_settings_id);
        state.settings.push(SettingsRecord {
            id: id.clone(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            auto_translation_enabled: Some(settings.auto_translation_enabled),
        });
        Ok(id)
    }

    async fn organization_language(&self) -> TranslationResult<i32> {
        let state = self.lock();
        Self::check(&state, "organization_language")?;
        Ok(state.organization_language)
    }

    async fn user_ui_language(&self, user_id: &str) -> TranslationResult<Option<i32>> {
        let state = self.lock();
        Self::check(&state, "user_ui_language")?;
        Ok(state.user_languages.get(user_id).copied())
    }

    async fn web_resource(&self, name: &str) -> TranslationResult<Option<String>> {
        let state = self.lock();
        Self::check(&state, "web_resource")?;
        Ok(state.web_resources.get(name).cloned())
    }
}
