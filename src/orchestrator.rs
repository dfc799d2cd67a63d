//! Automatic (on create) and manual (explicit action) article translation.
//!
//! Both paths share the same guard and field loop. They differ in two ways:
//! the automatic path also requires auto-translation to be enabled and only
//! rewrites the in-flight change-delta, while the manual path works on the
//! stored record and persists it once every field is translated.

use crate::auth::Credentials;
use crate::error::{HostFault, TranslationResult};
use crate::language::{resolve_languages, LanguagePair};
use crate::model::{
    ArticleChange, ArticleFields, EntityReference, LocalizedArticle, NewSettings,
    TranslatableField, KNOWLEDGE_ARTICLE,
};
use crate::settings::{self, TranslationSettings};
use crate::store::ArticleStore;
use crate::translator::MachineTranslator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Payload of an inbound event, resolved at the ingestion boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    /// Change-delta of an article being created
    FullRecord(ArticleChange),
    /// Reference to a stored article, from an explicit translate action
    ReferenceOnly(EntityReference),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Acting user
    pub user_id: String,
    pub target: Target,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Primary or root articles are the translation source, never a target
    NotLocalizedVariant,
    AutoTranslationDisabled,
    UnsupportedEntity(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TranslationOutcome {
    Skipped {
        reason: SkipReason,
    },
    Translated {
        source: String,
        target: String,
        fields: Vec<TranslatableField>,
    },
}

impl TranslationOutcome {
    fn skipped(reason: SkipReason) -> Self {
        TranslationOutcome::Skipped { reason }
    }
}

/// Result of [`ArticleTranslationService::handle_event`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResult {
    pub outcome: TranslationOutcome,
    /// The change-delta after translation, for full-record events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<ArticleChange>,
}

#[derive(Clone)]
pub struct ArticleTranslationService {
    store: Arc<dyn ArticleStore>,
    translator: Arc<dyn MachineTranslator>,
}

impl ArticleTranslationService {
    pub fn new(store: Arc<dyn ArticleStore>, translator: Arc<dyn MachineTranslator>) -> Self {
        Self { store, translator }
    }

    /// Entry point for the host: dispatch on the target shape and flatten
    /// any failure into a message-only [`HostFault`].
    pub async fn handle_event(&self, context: ExecutionContext) -> Result<EventResult, HostFault> {
        match context.target {
            Target::FullRecord(mut change) => {
                let outcome = self
                    .auto_translate(&mut change)
                    .await
                    .map_err(|e| HostFault::from(&e))?;
                Ok(EventResult {
                    outcome,
                    change: Some(change),
                })
            }
            Target::ReferenceOnly(reference) => {
                let outcome = self
                    .translate_article(&reference)
                    .await
                    .map_err(|e| HostFault::from(&e))?;
                Ok(EventResult {
                    outcome,
                    change: None,
                })
            }
        }
    }

    /// Translate a change-delta in place when auto-translation is enabled.
    ///
    /// Only fields present on the delta are translated. The caller persists
    /// the delta; on failure the delta is left untouched.
    pub async fn auto_translate(
        &self,
        change: &mut ArticleChange,
    ) -> TranslationResult<TranslationOutcome> {
        let settings = settings::get_settings(self.store.as_ref()).await;

        if !settings.auto_translation_enabled {
            return Ok(TranslationOutcome::skipped(SkipReason::AutoTranslationDisabled));
        }
        if !change.is_localized_variant() {
            return Ok(TranslationOutcome::skipped(SkipReason::NotLocalizedVariant));
        }

        let result = self.translate_change(change, &settings).await;
        if let Err(e) = &result {
            error!(
                "AutomaticKnowledgeArticleTranslation failed ({:?}): {}",
                e.kind(),
                e
            );
        }
        result
    }

    async fn translate_change(
        &self,
        change: &mut ArticleChange,
        settings: &TranslationSettings,
    ) -> TranslationResult<TranslationOutcome> {
        let credentials = settings.credentials()?;
        let languages = resolve_languages(self.store.as_ref(), &*change).await?;
        let fields = self
            .translate_fields(change, &languages, &credentials)
            .await?;

        Ok(TranslationOutcome::Translated {
            source: languages.source,
            target: languages.target,
            fields,
        })
    }

    /// Translate a stored article and persist it.
    ///
    /// Unlike [`auto_translate`](Self::auto_translate) this does not look at
    /// the auto-translation flag: an explicit request always translates a
    /// localized variant when credentials are configured.
    pub async fn translate_article(
        &self,
        reference: &EntityReference,
    ) -> TranslationResult<TranslationOutcome> {
        if reference.logical_name != KNOWLEDGE_ARTICLE {
            return Ok(TranslationOutcome::skipped(SkipReason::UnsupportedEntity(
                reference.logical_name.clone(),
            )));
        }

        let result = self.translate_stored(&reference.id).await;
        if let Err(e) = &result {
            error!("KnowledgeArticleTranslation failed ({:?}): {}", e.kind(), e);
        }
        result
    }

    async fn translate_stored(&self, id: &str) -> TranslationResult<TranslationOutcome> {
        let mut article = self.store.retrieve_article(id).await?;
        let settings = settings::get_settings(self.store.as_ref()).await;

        if !article.is_localized_variant() {
            return Ok(TranslationOutcome::skipped(SkipReason::NotLocalizedVariant));
        }

        let credentials = settings.credentials()?;
        let languages = resolve_languages(self.store.as_ref(), &article).await?;
        let fields = self
            .translate_fields(&mut article, &languages, &credentials)
            .await?;

        self.store.update_article(&article).await?;
        info!("Persisted translated article {}", article.id);

        Ok(TranslationOutcome::Translated {
            source: languages.source,
            target: languages.target,
            fields,
        })
    }

    /// Create the translation settings record, rejecting a second one
    pub async fn create_settings(
        &self,
        user_id: &str,
        new_settings: &NewSettings,
    ) -> TranslationResult<String> {
        settings::create_settings(self.store.as_ref(), user_id, new_settings).await
    }

    /// Translate every present field, one authenticate+translate round trip
    /// each, and apply the results only if all of them succeed.
    async fn translate_fields<A: LocalizedArticle + Send>(
        &self,
        article: &mut A,
        languages: &LanguagePair,
        credentials: &Credentials,
    ) -> TranslationResult<Vec<TranslatableField>> {
        let mut translated: ArticleFields = article.fields().clone();
        let mut done = Vec::new();

        for field in TranslatableField::ALL {
            let Some(text) = article.fields().get(field) else {
                continue;
            };

            let result = self
                .translator
                .translate(text, &languages.source, &languages.target, credentials)
                .await?;

            if field == TranslatableField::Title {
                info!(
                    "Translated <title> via {}: {}",
                    self.translator.provider_name(),
                    result
                );
            }

            translated.set(field, result);
            done.push(field);
        }

        *article.fields_mut() = translated;
        Ok(done)
    }
}
