//! Translation client for the `TranslateArray` XML endpoint.
//!
//! Each call acquires a bearer token, posts a `TranslateArrayRequest`
//! envelope carrying a single text, and concatenates every
//! `TranslatedText` segment found in the response in document order.

use crate::auth::{Credentials, TokenProvider};
use crate::config::Config;
use crate::error::{TranslationError, TranslationResult};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use tracing::debug;

/// Namespace of the request options and of the response elements
pub const MT_SERVICE_NS: &str = "http://schemas.datacontract.org/2004/07/Microsoft.MT.Web.Service.V2";

/// Namespace of the `<string>` entries inside `<Texts>`
pub const ARRAYS_NS: &str = "http://schemas.microsoft.com/2003/10/Serialization/Arrays";

/// Abstraction over the machine translation backend
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate `text` from `source_lang` to `target_lang` with the given credentials
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        credentials: &Credentials,
    ) -> TranslationResult<String>;

    /// Name used in logs
    fn provider_name(&self) -> &str;
}

/// Escape text for embedding in the request envelope.
///
/// `<` and `>` become `&lt;`/`&gt;`; `&` and quotes are escaped too so the
/// envelope stays well-formed for any input.
pub fn escape_text(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

/// Build the `TranslateArrayRequest` body for one text
pub fn build_translate_array_request(
    text: &str,
    source_lang: &str,
    target_lang: &str,
    content_type: &str,
) -> String {
    format!(
        concat!(
            "<TranslateArrayRequest>",
            "<AppId />",
            "<From>{from}</From>",
            "<Options>",
            "<Category xmlns=\"{ns}\" />",
            "<ContentType xmlns=\"{ns}\">{content_type}</ContentType>",
            "<ReservedFlags xmlns=\"{ns}\" />",
            "<State xmlns=\"{ns}\" />",
            "<Uri xmlns=\"{ns}\" />",
            "<User xmlns=\"{ns}\" />",
            "</Options>",
            "<Texts>",
            "<string xmlns=\"{arrays}\">{text}</string>",
            "</Texts>",
            "<To>{to}</To>",
            "</TranslateArrayRequest>"
        ),
        from = escape_text(source_lang),
        ns = MT_SERVICE_NS,
        content_type = escape_text(content_type),
        arrays = ARRAYS_NS,
        text = escape_text(text),
        to = escape_text(target_lang),
    )
}

/// Concatenate every `TranslatedText` directly under a `TranslateArrayResponse`
/// element of the service namespace, in document order.
pub fn parse_translate_array_response(xml: &str) -> TranslationResult<String> {
    let mut reader = NsReader::from_str(xml);
    let mut result = String::new();

    let mut depth = 0usize;
    let mut saw_root = false;
    // Depths of currently open TranslateArrayResponse elements
    let mut responses: Vec<usize> = Vec::new();
    // Depth of the TranslatedText element being read, if any
    let mut capturing: Option<usize> = None;

    loop {
        let (ns, event) = reader.read_resolved_event().map_err(parse_error)?;
        let in_service_ns = is_service_ns(&ns);

        match event {
            Event::Start(e) => {
                if depth == 0 {
                    saw_root = true;
                }
                depth += 1;
                match e.local_name().as_ref() {
                    b"TranslateArrayResponse" if in_service_ns => responses.push(depth),
                    b"TranslatedText"
                        if in_service_ns && responses.last() == Some(&(depth - 1)) =>
                    {
                        capturing = Some(depth)
                    }
                    _ => {}
                }
            }
            Event::Text(t) if capturing.is_some() => {
                let text = t.unescape().map_err(parse_error)?;
                result.push_str(&text);
            }
            Event::CData(c) if capturing.is_some() => {
                let text = std::str::from_utf8(&c).map_err(|e| {
                    TranslationError::TranslationApi(format!("invalid UTF-8 in response: {}", e))
                })?;
                result.push_str(text);
            }
            Event::Empty(_) if depth == 0 => saw_root = true,
            Event::End(_) => {
                if capturing == Some(depth) {
                    capturing = None;
                }
                if responses.last() == Some(&depth) {
                    responses.pop();
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(TranslationError::TranslationApi(
            "unreadable response: no root element".to_string(),
        ));
    }
    if depth != 0 {
        return Err(TranslationError::TranslationApi(format!(
            "unreadable response: document truncated with {} unclosed element(s)",
            depth
        )));
    }

    Ok(result)
}

fn is_service_ns(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(n) if n.as_ref() == MT_SERVICE_NS.as_bytes())
}

fn parse_error(err: quick_xml::Error) -> TranslationError {
    TranslationError::TranslationApi(format!("unreadable response: {}", err))
}

/// Translator backed by the `TranslateArray` HTTP endpoint
pub struct MicrosoftTranslator {
    client: reqwest::Client,
    tokens: TokenProvider,
    translate_url: String,
    content_type: String,
}

impl MicrosoftTranslator {
    pub fn new(
        client: reqwest::Client,
        tokens: TokenProvider,
        translate_url: &str,
        content_type: &str,
    ) -> Self {
        Self {
            client,
            tokens,
            translate_url: translate_url.to_string(),
            content_type: content_type.to_string(),
        }
    }

    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        let policy = if config.reuse_access_token {
            crate::auth::TokenPolicy::ReuseUntilExpiry
        } else {
            crate::auth::TokenPolicy::PerCall
        };
        let tokens =
            TokenProvider::new(client.clone(), &config.token_url, &config.token_scope).with_policy(policy);

        Self::new(
            client,
            tokens,
            &config.translator_url,
            &config.translator_content_type,
        )
    }
}

#[async_trait]
impl MachineTranslator for MicrosoftTranslator {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        credentials: &Credentials,
    ) -> TranslationResult<String> {
        let token = self.tokens.acquire_token(credentials).await?;

        let body =
            build_translate_array_request(text, source_lang, target_lang, &self.content_type);

        debug!(
            "Posting {} bytes to translator ({} -> {})",
            body.len(),
            source_lang,
            target_lang
        );

        let response = self
            .client
            .post(&self.translate_url)
            .header("Content-Type", "text/xml")
            .header("Authorization", token.header_value())
            .body(body)
            .send()
            .await
            .map_err(|e| {
                TranslationError::TranslationApi(format!("failed to reach translator: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::TranslationApi(format!(
                "translator returned {}: {}",
                status, body
            )));
        }

        let xml = response.text().await.map_err(|e| {
            TranslationError::TranslationApi(format!("failed to read translator response: {}", e))
        })?;

        parse_translate_array_response(&xml)
    }

    fn provider_name(&self) -> &str {
        "Microsoft Translator"
    }
}
