use anyhow::Result;
use kb_article_translator::{
    config::Config,
    orchestrator::ArticleTranslationService,
    server::{self, AppState},
    store::PgStore,
    translator::MicrosoftTranslator,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kb_article_translator=info".parse()?),
        )
        .init();

    info!("Starting knowledge article translation service");

    let config = Config::from_env()?;

    let store = PgStore::connect(&config.database_url).await?;
    let client = config.http_client()?;
    let translator = MicrosoftTranslator::from_config(&config, client);

    if config.reuse_access_token {
        info!("Translator tokens are reused until they expire");
    }

    let service = ArticleTranslationService::new(Arc::new(store), Arc::new(translator));
    let state = AppState {
        service,
        api_key: config.api_key.as_deref().map(Arc::from),
    };

    server::serve(state, config.port).await
}
