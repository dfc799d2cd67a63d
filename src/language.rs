use crate::error::{TranslationError, TranslationResult};
use crate::model::LocalizedArticle;
use crate::store::ArticleStore;
use tracing::info;

/// Source and destination language codes for one article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

/// Resolve `(source, target)` language codes for a localized article.
///
/// The source is the language of the parent article's locale, the target is
/// the language of the article's own locale. Missing references or records
/// are `NotFound`; nothing is defaulted.
pub async fn resolve_languages<A: LocalizedArticle + ?Sized>(
    store: &dyn ArticleStore,
    article: &A,
) -> TranslationResult<LanguagePair> {
    let parent_id = article
        .parent_article_id()
        .ok_or_else(|| TranslationError::not_found("parent article reference", "<none>"))?;
    let target_locale_id = article
        .language_locale_id()
        .ok_or_else(|| TranslationError::not_found("language locale reference", "<none>"))?;

    let parent = store.retrieve_article(parent_id).await?;
    let source_locale_id = parent.language_locale_id.as_deref().ok_or_else(|| {
        TranslationError::not_found("language locale reference of parent article", parent_id)
    })?;

    let source = store.retrieve_locale(source_locale_id).await?.code;
    let target = store.retrieve_locale(target_locale_id).await?.code;

    info!("knowledgeArticleId of the parent article: {}", parent_id);
    info!("Translating from <{}> to <{}>", source, target);

    Ok(LanguagePair { source, target })
}
