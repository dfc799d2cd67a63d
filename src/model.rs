use serde::{Deserialize, Serialize};

/// Logical name of knowledge article records in the host data store
pub const KNOWLEDGE_ARTICLE: &str = "knowledgearticle";

/// Article fields that are sent to the translator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslatableField {
    Title,
    Keywords,
    Description,
    Content,
}

impl TranslatableField {
    /// Translation order used by both orchestrators
    pub const ALL: [TranslatableField; 4] = [
        TranslatableField::Title,
        TranslatableField::Keywords,
        TranslatableField::Description,
        TranslatableField::Content,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TranslatableField::Title => "title",
            TranslatableField::Keywords => "keywords",
            TranslatableField::Description => "description",
            TranslatableField::Content => "content",
        }
    }
}

/// Free-text article fields. `None` means the field is not part of the record
/// or change-delta and must be left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ArticleFields {
    pub fn get(&self, field: TranslatableField) -> Option<&str> {
        match field {
            TranslatableField::Title => self.title.as_deref(),
            TranslatableField::Keywords => self.keywords.as_deref(),
            TranslatableField::Description => self.description.as_deref(),
            TranslatableField::Content => self.content.as_deref(),
        }
    }

    pub fn set(&mut self, field: TranslatableField, value: String) {
        let slot = match field {
            TranslatableField::Title => &mut self.title,
            TranslatableField::Keywords => &mut self.keywords,
            TranslatableField::Description => &mut self.description,
            TranslatableField::Content => &mut self.content,
        };
        *slot = Some(value);
    }
}

/// A knowledge article as persisted in the data store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub is_primary: bool,
    pub is_root_article: bool,
    pub language_locale_id: Option<String>,
    pub parent_article_id: Option<String>,
    #[serde(flatten)]
    pub fields: ArticleFields,
}

/// The subset of an article carried by a create/update event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub is_primary: bool,
    pub is_root_article: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_locale_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_article_id: Option<String>,
    #[serde(flatten)]
    pub fields: ArticleFields,
}

/// Common view over full records and change-deltas used by the orchestrators
pub trait LocalizedArticle {
    fn is_primary(&self) -> bool;
    fn is_root_article(&self) -> bool;
    fn language_locale_id(&self) -> Option<&str>;
    fn parent_article_id(&self) -> Option<&str>;
    fn fields(&self) -> &ArticleFields;
    fn fields_mut(&mut self) -> &mut ArticleFields;

    /// Only non-root localized variants are ever translated
    fn is_localized_variant(&self) -> bool {
        !self.is_primary() && !self.is_root_article()
    }
}

macro_rules! impl_localized_article {
    ($ty:ty) => {
        impl LocalizedArticle for $ty {
            fn is_primary(&self) -> bool {
                self.is_primary
            }
            fn is_root_article(&self) -> bool {
                self.is_root_article
            }
            fn language_locale_id(&self) -> Option<&str> {
                self.language_locale_id.as_deref()
            }
            fn parent_article_id(&self) -> Option<&str> {
                self.parent_article_id.as_deref()
            }
            fn fields(&self) -> &ArticleFields {
                &self.fields
            }
            fn fields_mut(&mut self) -> &mut ArticleFields {
                &mut self.fields
            }
        }
    };
}

impl_localized_article!(Article);
impl_localized_article!(ArticleChange);

/// Read-only language reference data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageLocale {
    pub id: String,
    pub code: String,
}

/// Pointer to a record by logical name and id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReference {
    pub logical_name: String,
    pub id: String,
}

/// Raw translation settings row; every column is nullable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsRecord {
    pub id: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub auto_translation_enabled: Option<bool>,
}

/// Payload for creating the translation settings record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    #[serde(default)]
    pub auto_translation_enabled: bool,
}
