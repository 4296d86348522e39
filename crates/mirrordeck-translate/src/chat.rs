//! Chat-completions translation client
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. A slide
//! is translated in a single request: every element goes out as one JSON
//! list and the model answers with one JSON object keyed by element id.

use std::time::Duration;

use mirrordeck_pptx::{
    ContextMap, ElementContent, ElementContext, ElementKind, SlideElement, SlideStructure,
    Translation, TranslationResult,
};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::error::{Result, TranslateError};
use crate::translator::Translator;

/// Default API base URL
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Connection settings for a chat-completions provider
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// API base URL; `/chat/completions` is appended
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// Bearer token
    pub api_key: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token limit
    pub max_tokens: u32,
    /// Request timeout
    pub timeout: Duration,
    /// Language of the deck
    pub source_language: String,
    /// Language to translate into
    pub target_language: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: 0.3,
            max_tokens: 2000,
            timeout: Duration::from_secs(60),
            source_language: "English".to_string(),
            target_language: "Arabic".to_string(),
        }
    }
}

/// Translator backed by a chat-completions API
#[derive(Debug, Clone)]
pub struct ChatTranslator {
    config: ChatConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SlideReply {
    translations: TranslationResult,
}

#[derive(Debug, Deserialize)]
struct BatchReply {
    translations: Vec<String>,
}

impl ChatTranslator {
    /// Create a client; fails only if the HTTP client cannot be built
    pub fn new(config: ChatConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Connection settings
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    /// Send one system + user exchange and return the reply text
    fn complete(&self, system: String, user: String) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let mut builder = self.client.post(self.completions_url()).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TranslateError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json()?;
        reply_content(body)
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are a professional translator specializing in consulting and business presentations.\n\
             Translate from {} to {} while maintaining:\n\
             - Professional consulting tone and terminology\n\
             - Cultural appropriateness for the target business audience\n\
             - Concise, impactful language suitable for executive presentations\n\
             - Appropriate formality based on element type (titles are impactful, body text is clear)",
            self.config.source_language, self.config.target_language
        )
    }
}

impl Translator for ChatTranslator {
    fn name(&self) -> &str {
        "chat"
    }

    fn translate(&self, text: &str, context: &ElementContext) -> Result<String> {
        let slide = SlideStructure {
            elements: vec![SlideElement {
                id: context.element_id.clone(),
                kind: context.kind,
                content: ElementContent::Text {
                    text: text.to_string(),
                },
                position: None,
                shape_id: 0,
                shape_index: 0,
            }],
            ..Default::default()
        };
        let contexts = ContextMap::build(&slide);
        match self.translate_slide(&slide, &contexts)?.get(&context.element_id) {
            Some(Translation::Text(out)) => Ok(out.clone()),
            _ => Err(TranslateError::untranslated(text)),
        }
    }

    fn translate_slide(
        &self,
        slide: &SlideStructure,
        contexts: &ContextMap,
    ) -> Result<TranslationResult> {
        if slide.is_empty() {
            return Ok(TranslationResult::new());
        }
        info!(
            slide = slide.slide_index,
            elements = slide.elements.len(),
            model = %self.config.model,
            "translating slide in one request"
        );

        let user = slide_prompt(slide, contexts, &self.config)?;
        let content = self.complete(self.system_prompt(), user)?;
        let result = parse_slide_reply(&content)?;

        debug!(
            slide = slide.slide_index,
            translated = result.len(),
            "received slide translations"
        );
        Ok(result)
    }

    fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let system = format!(
            "You are a professional translator for PowerPoint slide layouts and templates.\n\
             Translate from {} to {} while maintaining professional business tone.",
            self.config.source_language, self.config.target_language
        );
        let content = self.complete(system, batch_prompt(texts, &self.config))?;
        parse_batch_reply(&content)
    }
}

fn reply_content(body: ChatResponse) -> Result<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| TranslateError::InvalidResponse("reply has no message content".into()))
}

/// Wire name of an element kind in the prompt
fn prompt_type(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Title => "title",
        ElementKind::BulletGroup => "bullets",
        _ => "text",
    }
}

/// User prompt listing every element of a slide
fn slide_prompt(
    slide: &SlideStructure,
    contexts: &ContextMap,
    config: &ChatConfig,
) -> Result<String> {
    let elements: Vec<serde_json::Value> = slide
        .elements
        .iter()
        .map(|element| {
            let content = match &element.content {
                ElementContent::Text { text } => json!(text),
                ElementContent::Bullets { bullets } => {
                    json!(bullets.iter().map(|b| b.text.as_str()).collect::<Vec<_>>())
                }
            };
            json!({
                "id": element.id,
                "type": prompt_type(element.kind),
                "instruction": contexts.instruction(&element.id),
                "content": content,
            })
        })
        .collect();

    Ok(format!(
        r#"Translate ALL elements from this slide from {src} to {dst}.

Elements to translate:
{elements}

Return a JSON object with this exact structure:
{{
  "translations": {{
    "element_id_1": "translated text or array of translated items",
    "element_id_2": "translated text or array of translated items"
  }}
}}

Requirements:
- For "title" type: Translate as impactful, professional title
- For "text" type: Translate as clear, professional body text
- For "bullets" type: Return an array with exactly one translated item per source item, in order
- Preserve the element IDs exactly as given
- Return ONLY the JSON object, no additional text"#,
        src = config.source_language,
        dst = config.target_language,
        elements = serde_json::to_string_pretty(&elements)?,
    ))
}

/// User prompt for a numbered list of layout texts
fn batch_prompt(texts: &[String], config: &ChatConfig) -> String {
    let numbered: Vec<String> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{}. {}", i + 1, text))
        .collect();
    format!(
        r#"Translate these layout/background texts from {src} to {dst}:

{numbered}

Return ONLY a JSON object with this structure:
{{
  "translations": ["translation 1", "translation 2", ...]
}}

Preserve the order. Return ONLY the JSON, no additional text."#,
        src = config.source_language,
        dst = config.target_language,
        numbered = numbered.join("\n"),
    )
}

fn parse_slide_reply(content: &str) -> Result<TranslationResult> {
    let reply: SlideReply = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| TranslateError::InvalidResponse(e.to_string()))?;
    Ok(reply.translations)
}

fn parse_batch_reply(content: &str) -> Result<Vec<String>> {
    let reply: BatchReply = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| TranslateError::InvalidResponse(e.to_string()))?;
    Ok(reply.translations)
}

/// Some models wrap JSON in a markdown fence even in JSON mode
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrordeck_pptx::Bullet;

    fn slide() -> SlideStructure {
        SlideStructure {
            slide_index: 2,
            container_width: 9_144_000,
            elements: vec![
                SlideElement {
                    id: "shape_0".into(),
                    kind: ElementKind::Title,
                    content: ElementContent::Text {
                        text: "Our Approach".into(),
                    },
                    position: None,
                    shape_id: 2,
                    shape_index: 0,
                },
                SlideElement {
                    id: "shape_1".into(),
                    kind: ElementKind::BulletGroup,
                    content: ElementContent::Bullets {
                        bullets: vec![Bullet::new("Grow", 0), Bullet::new("Expand", 1)],
                    },
                    position: None,
                    shape_id: 3,
                    shape_index: 1,
                },
            ],
        }
    }

    #[test]
    fn test_slide_prompt_lists_elements() {
        let slide = slide();
        let prompt = slide_prompt(&slide, &ContextMap::build(&slide), &ChatConfig::default()).unwrap();

        assert!(prompt.contains("from English to Arabic"));
        assert!(prompt.contains(r#""id": "shape_0""#));
        assert!(prompt.contains(r#""type": "bullets""#));
        assert!(prompt.contains(r#""Expand""#));
        assert!(prompt.contains("Translate as a professional, impactful title"));
    }

    #[test]
    fn test_parse_slide_reply() {
        let content = r#"{"translations": {"shape_0": "نهجنا", "shape_1": ["النمو", "التوسع"]}}"#;
        let result = parse_slide_reply(content).unwrap();

        assert_eq!(result.get("shape_0"), Some(&Translation::Text("نهجنا".into())));
        assert_eq!(
            result.get("shape_1"),
            Some(&Translation::Bullets(vec!["النمو".into(), "التوسع".into()]))
        );
    }

    #[test]
    fn test_parse_reply_inside_code_fence() {
        let content = "```json\n{\"translations\": [\"سري\"]}\n```";
        assert_eq!(parse_batch_reply(content).unwrap(), vec!["سري"]);
    }

    #[test]
    fn test_invalid_reply_is_retryable() {
        let err = parse_slide_reply("Sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, TranslateError::InvalidResponse(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_reply_without_choices() {
        let err = reply_content(ChatResponse { choices: vec![] }).unwrap_err();
        assert!(matches!(err, TranslateError::InvalidResponse(_)));
    }

    #[test]
    fn test_batch_prompt_numbers_texts() {
        let prompt = batch_prompt(
            &["Confidential".to_string(), "Draft".to_string()],
            &ChatConfig::default(),
        );
        assert!(prompt.contains("1. Confidential\n2. Draft"));
    }

    #[test]
    fn test_completions_url() {
        let translator = ChatTranslator::new(ChatConfig {
            endpoint: "http://localhost:8080/v1/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            translator.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
        assert_eq!(translator.name(), "chat");
    }

    #[test]
    fn test_empty_slide_needs_no_request() {
        let translator = ChatTranslator::new(ChatConfig {
            endpoint: "http://127.0.0.1:9".into(),
            ..Default::default()
        })
        .unwrap();
        let result = translator
            .translate_slide(&SlideStructure::default(), &ContextMap::default())
            .unwrap();
        assert!(result.is_empty());
        assert!(translator.translate_batch(&[]).unwrap().is_empty());
    }
}
