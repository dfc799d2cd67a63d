//! Localized user-facing messages stored as resource files in the data store.
//!
//! A resource file is base64 text holding an XML document of the form
//! `<root><data name="Id"><value>text</value></data></root>`.

use crate::error::{TranslationError, TranslationResult};
use crate::store::ArticleStore;
use base64::Engine;
use quick_xml::events::Event;
use quick_xml::Reader;

pub const DEFAULT_RESOURCE_FILE: &str = "msdyn_localizedString.en_US";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Resource file for a language LCID, if that language ships one
pub fn resource_file_for(lcid: i32) -> Option<&'static str> {
    match lcid {
        1033 => Some("msdyn_localizedString.en_US"),
        1041 => Some("msdyn_localizedString.ja_JP"),
        1031 => Some("msdyn_localizedString.de_DE"),
        1036 => Some("msdyn_localizedString.fr_FR"),
        1034 => Some("msdyn_localizedString.es_ES"),
        1049 => Some("msdyn_localizedString.ru_RU"),
        1025 => Some("msdyn_localizedString.ar_AR"),
        _ => None,
    }
}

/// Pick the user's UI language file, else the organisation's, else English
pub fn language_resource_file(organization_lcid: i32, user_lcid: Option<i32>) -> &'static str {
    user_lcid
        .and_then(resource_file_for)
        .or_else(|| resource_file_for(organization_lcid))
        .unwrap_or(DEFAULT_RESOURCE_FILE)
}

/// Decode a base64 resource blob into its XML text, dropping any UTF-8 BOM
pub fn decode_resource(content: &str) -> TranslationResult<String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(content.trim())
        .map_err(|e| TranslationError::Platform(format!("resource is not valid base64: {}", e)))?;

    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);

    String::from_utf8(bytes.to_vec())
        .map_err(|e| TranslationError::Platform(format!("resource is not valid UTF-8: {}", e)))
}

/// Text of `/root/data[@name=resource_id]/value`
pub fn localized_string(xml: &str, resource_id: &str) -> TranslationResult<String> {
    let mut reader = Reader::from_str(xml);
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut in_matching_data = false;
    let mut value: Option<String> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            TranslationError::Platform(format!("resource is not valid XML: {}", e))
        })?;

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if path.len() == 1 && path[0] == b"root" && name == b"data" {
                    in_matching_data = data_name_matches(&e, resource_id)?;
                }
                if in_matching_data && path.len() == 2 && name == b"value" {
                    value = Some(String::new());
                }
                path.push(name);
            }
            Event::Text(t) if in_matching_data && path.len() == 3 => {
                if let Some(v) = value.as_mut() {
                    let text = t.unescape().map_err(|e| {
                        TranslationError::Platform(format!("resource is not valid XML: {}", e))
                    })?;
                    v.push_str(&text);
                }
            }
            Event::End(_) => {
                path.pop();
                if path.len() == 2 && in_matching_data && value.is_some() {
                    break;
                }
                if path.len() == 1 {
                    in_matching_data = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    value.ok_or_else(|| TranslationError::not_found("resource id", resource_id))
}

fn data_name_matches(
    element: &quick_xml::events::BytesStart<'_>,
    resource_id: &str,
) -> TranslationResult<bool> {
    let attr = element
        .try_get_attribute("name")
        .map_err(|e| TranslationError::Platform(format!("bad resource attribute: {}", e)))?;

    match attr {
        Some(attr) => {
            let name = attr
                .unescape_value()
                .map_err(|e| TranslationError::Platform(format!("bad resource attribute: {}", e)))?;
            Ok(name == resource_id)
        }
        None => Ok(false),
    }
}

/// Look up a localized string for the acting user
pub async fn localized_message(
    store: &dyn ArticleStore,
    user_id: &str,
    resource_id: &str,
) -> TranslationResult<String> {
    let organization_lcid = store.organization_language().await?;
    let user_lcid = store.user_ui_language(user_id).await?;
    let file = language_resource_file(organization_lcid, user_lcid);

    let content = store
        .web_resource(file)
        .await?
        .ok_or_else(|| TranslationError::not_found("web resource", file))?;

    let xml = decode_resource(&content)?;
    localized_string(&xml, resource_id)
}
