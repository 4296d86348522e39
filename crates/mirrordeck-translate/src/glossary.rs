//! Offline exact-match glossary provider.
//!
//! A glossary is a flat table of source text to translated text, kept in
//! TOML or JSON:
//!
//! ```toml
//! "Our Approach" = "نهجنا"
//! "Key Findings" = "النتائج الرئيسية"
//! ```

use std::collections::HashMap;
use std::path::Path;

use mirrordeck_pptx::ElementContext;
use tracing::debug;

use crate::error::{Result, TranslateError};
use crate::translator::Translator;

/// Exact-match translator backed by a table
#[derive(Debug, Clone, Default)]
pub struct GlossaryTranslator {
    entries: HashMap<String, String>,
}

impl GlossaryTranslator {
    /// Glossary from explicit entries
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Parse a TOML table of strings
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(Self::new(toml::from_str(content)?))
    }

    /// Parse a JSON object of strings
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(content)?))
    }

    /// Load a glossary file; `.json` is read as JSON, anything else as TOML
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let glossary = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&content)?,
            _ => Self::from_toml_str(&content)?,
        };
        debug!(path = %path.display(), entries = glossary.len(), "loaded glossary");
        Ok(glossary)
    }

    /// Add or replace an entry
    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.entries.insert(source.into(), target.into());
    }

    /// Translation of a text, trying it as given and then trimmed
    pub fn lookup(&self, text: &str) -> Option<&str> {
        self.entries
            .get(text)
            .or_else(|| self.entries.get(text.trim()))
            .map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the glossary is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Translator for GlossaryTranslator {
    fn name(&self) -> &str {
        "glossary"
    }

    fn translate(&self, text: &str, _context: &ElementContext) -> Result<String> {
        self.lookup(text)
            .map(str::to_string)
            .ok_or_else(|| TranslateError::untranslated(text))
    }

    /// Unknown layout texts are returned unchanged rather than failing
    fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>> {
        Ok(texts
            .iter()
            .map(|t| self.lookup(t).unwrap_or(t.as_str()).to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrordeck_pptx::{ElementKind, ElementRole};

    fn context() -> ElementContext {
        ElementContext::new("shape_0", ElementKind::Title, ElementRole::SlideTitle)
    }

    #[test]
    fn test_toml_glossary() {
        let glossary = GlossaryTranslator::from_toml_str(
            r#"
"Our Approach" = "نهجنا"
"Key Findings" = "النتائج الرئيسية"
"#,
        )
        .unwrap();

        assert_eq!(glossary.len(), 2);
        assert_eq!(glossary.translate("Our Approach", &context()).unwrap(), "نهجنا");
        assert_eq!(glossary.translate("  Key Findings ", &context()).unwrap(), "النتائج الرئيسية");
    }

    #[test]
    fn test_unknown_text_is_untranslated() {
        let glossary = GlossaryTranslator::default();
        let err = glossary.translate("Missing", &context()).unwrap_err();
        assert!(matches!(err, TranslateError::Untranslated { ref text } if text == "Missing"));
    }

    #[test]
    fn test_batch_keeps_unknown_texts() {
        let mut glossary = GlossaryTranslator::default();
        glossary.insert("Confidential", "سري");
        let out = glossary
            .translate_batch(&["Confidential".to_string(), "Draft".to_string()])
            .unwrap();
        assert_eq!(out, vec!["سري", "Draft"]);
    }

    #[test]
    fn test_from_path_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json = dir.path().join("terms.json");
        std::fs::write(&json, r#"{"Revenue": "الإيرادات"}"#).unwrap();
        let glossary = GlossaryTranslator::from_path(&json).unwrap();
        assert_eq!(glossary.lookup("Revenue"), Some("الإيرادات"));

        let toml = dir.path().join("terms.toml");
        std::fs::write(&toml, "Growth = \"النمو\"\n").unwrap();
        let glossary = GlossaryTranslator::from_path(&toml).unwrap();
        assert_eq!(glossary.lookup("Growth"), Some("النمو"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let err = GlossaryTranslator::from_toml_str("not = [valid").unwrap_err();
        assert!(matches!(err, TranslateError::Toml(_)));
    }
}
