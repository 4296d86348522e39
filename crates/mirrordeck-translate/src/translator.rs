//! The translation provider seam.

use std::collections::HashMap;

use mirrordeck_pptx::{
    is_translatable_layout_text, ContextMap, ElementContent, ElementContext, ElementKind,
    ElementRole, SlideStructure, Translation, TranslationResult,
};
use tracing::{debug, warn};

use crate::error::Result;

/// A translation provider.
///
/// Implementations must be shareable across the slide worker pool.
/// Only [`Translator::translate`] is required; the slide and batch
/// methods fall back to one call per text.
pub trait Translator: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Translate one text in its slide context
    fn translate(&self, text: &str, context: &ElementContext) -> Result<String>;

    /// Translate every element of a slide.
    ///
    /// Bullet groups come back as lists of the same length, in order.
    fn translate_slide(
        &self,
        slide: &SlideStructure,
        contexts: &ContextMap,
    ) -> Result<TranslationResult> {
        let mut result = TranslationResult::new();
        for element in &slide.elements {
            let context = contexts.get(&element.id).cloned().unwrap_or_else(|| {
                ElementContext::new(&element.id, element.kind, ElementRole::GenericText)
            });
            let translation = match &element.content {
                ElementContent::Text { text } => Translation::Text(self.translate(text, &context)?),
                ElementContent::Bullets { bullets } => Translation::Bullets(
                    bullets
                        .iter()
                        .map(|b| self.translate(&b.text, &context))
                        .collect::<Result<Vec<_>>>()?,
                ),
            };
            result.insert(element.id.clone(), translation);
        }
        Ok(result)
    }

    /// Translate free-standing texts (layout text), same order and length
    fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>> {
        let context =
            ElementContext::new("layout", ElementKind::TextBox, ElementRole::SupportingText);
        texts.iter().map(|t| self.translate(t, &context)).collect()
    }
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn translate(&self, text: &str, context: &ElementContext) -> Result<String> {
        (**self).translate(text, context)
    }

    fn translate_slide(
        &self,
        slide: &SlideStructure,
        contexts: &ContextMap,
    ) -> Result<TranslationResult> {
        (**self).translate_slide(slide, contexts)
    }

    fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>> {
        (**self).translate_batch(texts)
    }
}

/// Translate layout texts in one batch.
///
/// Texts shorter than two characters or already in Arabic script are
/// skipped. Returns source -> translation for the texts that changed.
/// A provider answering with fewer items than asked leaves the rest
/// untranslated.
pub fn translate_layout_texts(
    translator: &dyn Translator,
    texts: &[String],
) -> Result<HashMap<String, String>> {
    let pending: Vec<String> = texts
        .iter()
        .filter(|t| is_translatable_layout_text(t))
        .cloned()
        .collect();
    if pending.is_empty() {
        return Ok(HashMap::new());
    }

    let translated = translator.translate_batch(&pending)?;
    if translated.len() != pending.len() {
        warn!(
            provider = translator.name(),
            expected = pending.len(),
            actual = translated.len(),
            "layout translation count mismatch"
        );
    }

    let map: HashMap<String, String> = pending
        .into_iter()
        .zip(translated)
        .filter(|(source, target)| source != target && !target.trim().is_empty())
        .collect();
    debug!(provider = translator.name(), translated = map.len(), "translated layout texts");
    Ok(map)
}
