//! Translate one stored article on demand, like the explicit "translate"
//! action, without going through the HTTP surface.
//!
//! Usage:
//!   cargo run --bin translate-article -- <article-id>
//!
//! Required environment variables:
//! - DATABASE_URL
//!
//! Translator credentials come from the translation settings record.

use anyhow::{Context, Result};
use kb_article_translator::{
    config::Config,
    model::{EntityReference, KNOWLEDGE_ARTICLE},
    orchestrator::{ArticleTranslationService, TranslationOutcome},
    store::PgStore,
    translator::MicrosoftTranslator,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kb_article_translator=info".parse()?),
        )
        .init();

    let article_id = std::env::args()
        .nth(1)
        .context("Usage: translate-article <article-id>")?;

    let config = Config::from_env()?;
    let store = PgStore::connect(&config.database_url).await?;
    let translator = MicrosoftTranslator::from_config(&config, config.http_client()?);
    let service = ArticleTranslationService::new(Arc::new(store), Arc::new(translator));

    let reference = EntityReference {
        logical_name: KNOWLEDGE_ARTICLE.to_string(),
        id: article_id,
    };

    match service.translate_article(&reference).await? {
        TranslationOutcome::Translated {
            source,
            target,
            fields,
        } => {
            let names: Vec<_> = fields.iter().map(|f| f.name()).collect();
            info!(
                "Translated article {} from {} to {}: {}",
                reference.id,
                source,
                target,
                names.join(", ")
            );
        }
        TranslationOutcome::Skipped { reason } => {
            info!("Article {} not translated: {:?}", reference.id, reason);
        }
    }

    Ok(())
}
