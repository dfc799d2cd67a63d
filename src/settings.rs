use crate::auth::Credentials;
use crate::error::{TranslationError, TranslationResult};
use crate::model::NewSettings;
use crate::resources;
use crate::store::ArticleStore;
use tracing::{error, info, warn};

/// Resource id of the message shown when a second settings record is created
pub const SINGLETON_MESSAGE_ID: &str = "ErrorMessage";

/// Used when the localized message cannot be loaded
pub const SINGLETON_FALLBACK_MESSAGE: &str =
    "Only one automatic knowledge article translation settings record can exist.";

/// Translator settings read from the single settings record.
///
/// The default value is "disabled, no credentials", which is also what a
/// missing or unreadable record yields.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TranslationSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub auto_translation_enabled: bool,
}

impl std::fmt::Debug for TranslationSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("auto_translation_enabled", &self.auto_translation_enabled)
            .finish()
    }
}

impl TranslationSettings {
    pub fn credentials(&self) -> TranslationResult<Credentials> {
        match (&self.client_id, &self.client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(Credentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            }),
            _ => Err(TranslationError::Auth(
                "translation settings are missing the client id or secret".to_string(),
            )),
        }
    }
}

/// Read the translation settings. Never fails: read errors are logged and
/// produce the disabled default, exactly like "no settings".
pub async fn get_settings(store: &dyn ArticleStore) -> TranslationSettings {
    let records = match store.list_settings().await {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to read translation settings: {}", e);
            return TranslationSettings::default();
        }
    };

    match records.as_slice() {
        [record] => TranslationSettings {
            client_id: record.client_id.clone(),
            client_secret: record.client_secret.clone(),
            auto_translation_enabled: record.auto_translation_enabled.unwrap_or(false),
        },
        [] => TranslationSettings::default(),
        _ => {
            warn!(
                "Found {} translation settings records, treating translation as disabled",
                records.len()
            );
            TranslationSettings::default()
        }
    }
}

/// Number of settings records; read errors are logged and count as zero
pub async fn count_settings_records(store: &dyn ArticleStore) -> usize {
    match store.list_settings().await {
        Ok(records) => records.len(),
        Err(e) => {
            error!("Failed to count translation settings records: {}", e);
            0
        }
    }
}

/// Reject creation of a settings record when one already exists.
///
/// The rejection carries the message localized for the acting user.
pub async fn ensure_singleton(store: &dyn ArticleStore, user_id: &str) -> TranslationResult<()> {
    if count_settings_records(store).await == 0 {
        return Ok(());
    }

    Err(TranslationError::SingletonViolation(
        singleton_message(store, user_id).await,
    ))
}

async fn singleton_message(store: &dyn ArticleStore, user_id: &str) -> String {
    match resources::localized_message(store, user_id, SINGLETON_MESSAGE_ID).await {
        Ok(message) => message,
        Err(e) => {
            warn!("Falling back to default singleton message: {}", e);
            SINGLETON_FALLBACK_MESSAGE.to_string()
        }
    }
}

/// Create the settings record, enforcing that it stays the only one
pub async fn create_settings(
    store: &dyn ArticleStore,
    user_id: &str,
    settings: &NewSettings,
) -> TranslationResult<String> {
    ensure_singleton(store, user_id).await?;

    match store.insert_settings(settings).await {
        Ok(id) => {
            info!("Created translation settings record {}", id);
            Ok(id)
        }
        // Lost a race with a concurrent insert; report it like the guard does
        Err(TranslationError::SingletonViolation(_)) => Err(TranslationError::SingletonViolation(
            singleton_message(store, user_id).await,
        )),
        Err(e) => Err(e),
    }
}
