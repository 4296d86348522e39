//! Content replacement.
//!
//! Swaps the source paragraphs of each element's shape for translated
//! ones. Every element is validated before anything is written, so a
//! failing element leaves its shape exactly as it was. Replacement
//! paragraphs keep the source paragraph and run formatting, keep the
//! source bullet levels, and are marked right-to-left with the target
//! font again, since the paragraphs the transform marked are discarded.

use mirrordeck_ooxml::{qualify, XmlDocument, XmlElement, XmlNode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::constants::{AUTOFIT_INSET_EMU, DEFAULT_TARGET_FONT};
use crate::direction::{mark_rtl, set_level};
use crate::error::{PptxError, Result};
use crate::font::{apply_font, is_run};
use crate::shape::{
    nth_shape, nth_shape_mut, paragraph_text, paragraphs, shape_id, shape_tree, shape_tree_mut,
    text_body, text_body_mut,
};
use crate::slide::{ElementContent, SlideElement, SlideStructure, Translation, TranslationResult};

/// `a:bodyPr` children that follow the autofit choice
const AFTER_AUTOFIT: &[&str] = &["scene3d", "sp3d", "flatTx", "extLst"];

/// Autofit variants, only one of which may be present
const AUTOFIT_KINDS: &[&str] = &["noAutofit", "normAutofit", "spAutoFit"];

/// An element whose text could not be replaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementFailure {
    /// Element id
    pub element: String,
    /// Diagnostic code
    pub code: &'static str,
    /// What went wrong
    pub message: String,
}

/// Outcome of replacing the text of one slide
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaceReport {
    /// Elements now holding translated text
    pub replaced: Vec<String>,
    /// Elements left untouched
    pub failures: Vec<ElementFailure>,
}

impl ReplaceReport {
    /// Whether every element was replaced
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Writes translated text into slide shapes
#[derive(Debug, Clone)]
pub struct ContentReplacer {
    target_font: String,
    autofit: bool,
}

impl Default for ContentReplacer {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_FONT)
    }
}

/// Formatting carried from a source paragraph to its replacement
struct Template {
    paragraph_props: Option<XmlElement>,
    run_props: Option<XmlElement>,
}

impl ContentReplacer {
    /// Replacer applying `target_font` to the new runs
    pub fn new(target_font: impl Into<String>) -> Self {
        Self {
            target_font: target_font.into(),
            autofit: true,
        }
    }

    /// Enable or disable word wrap, shrink-on-overflow and tight insets
    pub fn with_autofit(mut self, autofit: bool) -> Self {
        self.autofit = autofit;
        self
    }

    /// Replace the text of every element of `structure`.
    ///
    /// Failures are isolated per element and returned in the report.
    pub fn replace(
        &self,
        slide: &mut XmlDocument,
        structure: &SlideStructure,
        translations: &TranslationResult,
    ) -> ReplaceReport {
        let mut report = ReplaceReport::default();

        for element in &structure.elements {
            match self.replace_element(slide, element, translations.get(&element.id)) {
                Ok(()) => report.replaced.push(element.id.clone()),
                Err(err) => {
                    warn!(
                        slide = structure.slide_index,
                        element = %element.id,
                        code = err.code(),
                        "text not replaced: {}",
                        err
                    );
                    report.failures.push(ElementFailure {
                        element: element.id.clone(),
                        code: err.code(),
                        message: err.to_string(),
                    });
                }
            }
        }

        for (id, _) in translations.iter() {
            if structure.element(id).is_none() {
                debug!(element = id, "translation for unknown element ignored");
            }
        }

        report
    }

    /// Replace the text of one element, or fail without touching the slide
    pub fn replace_element(
        &self,
        slide: &mut XmlDocument,
        element: &SlideElement,
        translation: Option<&Translation>,
    ) -> Result<()> {
        let translation =
            translation.ok_or_else(|| PptxError::missing_translation(&element.id))?;

        let texts: Vec<&str> = match (&element.content, translation) {
            (ElementContent::Text { .. }, Translation::Text(text)) => vec![text.as_str()],
            (ElementContent::Bullets { bullets }, Translation::Bullets(items)) => {
                if items.len() != bullets.len() {
                    return Err(PptxError::bullet_count_mismatch(
                        &element.id,
                        bullets.len(),
                        items.len(),
                    ));
                }
                items.iter().map(String::as_str).collect()
            }
            (content, other) => {
                return Err(PptxError::TranslationShapeMismatch {
                    element: element.id.clone(),
                    expected: content.shape_name(),
                    actual: other.shape_name(),
                })
            }
        };

        let not_found = || PptxError::ShapeNotFound {
            element: element.id.clone(),
            shape_id: element.shape_id,
        };

        // Build everything from the read-only tree first
        let new_paragraphs = {
            let tree = shape_tree(&slide.root).ok_or_else(not_found)?;
            let shape = nth_shape(tree, element.shape_index)
                .filter(|shape| shape_id(shape).unwrap_or(0) == element.shape_id)
                .ok_or_else(not_found)?;
            let body = text_body(shape).ok_or_else(|| {
                PptxError::malformed_shape(&element.id, "shape has no text body")
            })?;
            let prefix = drawing_prefix(body);

            match &element.content {
                ElementContent::Text { .. } => {
                    let template = Template::from_source(paragraphs(body).next());
                    vec![self.build_paragraph(&prefix, &template, texts[0], None)]
                }
                ElementContent::Bullets { bullets } => {
                    let sources: Vec<&XmlElement> = paragraphs(body)
                        .filter(|p| !paragraph_text(p).trim().is_empty())
                        .collect();
                    bullets
                        .iter()
                        .zip(&texts)
                        .enumerate()
                        .map(|(i, (bullet, text))| {
                            let template = Template::from_source(sources.get(i).copied());
                            self.build_paragraph(&prefix, &template, text, Some(bullet.level))
                        })
                        .collect::<Vec<_>>()
                }
            }
        };

        let shape = shape_tree_mut(&mut slide.root)
            .and_then(|tree| nth_shape_mut(tree, element.shape_index))
            .ok_or_else(not_found)?;
        let body = text_body_mut(shape)
            .ok_or_else(|| PptxError::malformed_shape(&element.id, "shape has no text body"))?;

        body.retain_children(|n| !n.as_element().is_some_and(|e| e.local_name() == "p"));
        for paragraph in new_paragraphs {
            body.push_child(paragraph);
        }
        if self.autofit {
            apply_autofit(body);
        }

        debug!(element = %element.id, shape = element.shape_id, "replaced text");
        Ok(())
    }

    fn build_paragraph(
        &self,
        prefix: &str,
        template: &Template,
        text: &str,
        level: Option<u32>,
    ) -> XmlElement {
        let mut paragraph = XmlElement::new(qualify(prefix, "p"));
        if let Some(ppr) = &template.paragraph_props {
            paragraph.push_child(ppr.clone());
        }

        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                let mut br = XmlElement::new(qualify(prefix, "br"));
                if let Some(rpr) = &template.run_props {
                    br.push_child(rpr.clone());
                }
                paragraph.push_child(br);
            }
            let mut run = XmlElement::new(qualify(prefix, "r"));
            if let Some(rpr) = &template.run_props {
                run.push_child(rpr.clone());
            }
            let mut t = XmlElement::new(qualify(prefix, "t"));
            t.set_text(line);
            run.push_child(t);
            paragraph.push_child(run);
        }

        if let Some(level) = level {
            set_level(&mut paragraph, level);
        }
        mark_rtl(&mut paragraph);
        apply_font(&mut paragraph, &self.target_font);
        paragraph
    }
}

impl Template {
    fn from_source(paragraph: Option<&XmlElement>) -> Self {
        let Some(paragraph) = paragraph else {
            return Self {
                paragraph_props: None,
                run_props: None,
            };
        };
        let run_props = paragraph
            .elements()
            .filter(|e| is_run(e))
            .find_map(|run| run.child_local("rPr"))
            .cloned();
        Self {
            paragraph_props: paragraph.child_local("pPr").cloned(),
            run_props,
        }
    }
}

/// DrawingML prefix used inside a text body
fn drawing_prefix(body: &XmlElement) -> String {
    body.child_local("bodyPr")
        .or_else(|| body.child_local("p"))
        .map(|e| e.prefix().to_string())
        .unwrap_or_else(|| "a".to_string())
}

/// Word wrap, shrink text on overflow and 0.03in insets on `a:bodyPr`
fn apply_autofit(body: &mut XmlElement) {
    let prefix = drawing_prefix(body);
    let body_pr = body.ensure_child(&qualify(&prefix, "bodyPr"), |_| 0);
    body_pr.set_attr("wrap", "square");
    let inset = AUTOFIT_INSET_EMU.to_string();
    for side in ["lIns", "tIns", "rIns", "bIns"] {
        body_pr.set_attr(side, inset.as_str());
    }

    body_pr.retain_children(|n| {
        !n.as_element()
            .is_some_and(|e| AUTOFIT_KINDS.contains(&e.local_name()))
    });
    let at = body_pr
        .position_of_any(AFTER_AUTOFIT)
        .unwrap_or(body_pr.children().len());
    body_pr.insert_child(at, XmlNode::Element(XmlElement::new(qualify(&prefix, "normAutofit"))));
}
