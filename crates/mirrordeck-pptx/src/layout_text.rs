//! Static text on slide layouts.
//!
//! Layouts carry text of their own (footers, labels, sample prompts)
//! that is not part of any slide element. It is collected as a flat list
//! of `a:t` strings, translated in one batch, and written back by exact
//! match.

use std::collections::HashMap;

use mirrordeck_ooxml::{XmlDocument, XmlElement};
use tracing::debug;

/// Arabic block; text containing it is treated as already translated
const ARABIC: std::ops::RangeInclusive<char> = '\u{0600}'..='\u{06FF}';

/// Whether a layout string should be sent for translation.
///
/// Strings shorter than two characters after trimming, and strings that
/// already contain Arabic script, are skipped.
pub fn is_translatable_layout_text(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.chars().count() >= 2 && !trimmed.chars().any(|c| ARABIC.contains(&c))
}

/// Distinct translatable `a:t` strings of a layout, in document order
pub fn collect_layout_texts(layout: &XmlDocument) -> Vec<String> {
    let mut texts: Vec<String> = Vec::new();
    visit_text_runs(&layout.root, &mut |t| {
        let text = t.text();
        if is_translatable_layout_text(&text) && !texts.contains(&text) {
            texts.push(text);
        }
    });
    texts
}

/// Replace every `a:t` whose text has a translation; returns how many changed
pub fn apply_layout_translations(
    layout: &mut XmlDocument,
    translations: &HashMap<String, String>,
) -> usize {
    let mut replaced = 0;
    visit_text_runs_mut(&mut layout.root, &mut |t| {
        if let Some(translated) = translations.get(&t.text()) {
            t.set_text(translated.clone());
            replaced += 1;
        }
    });
    debug!(replaced, "applied layout translations");
    replaced
}

fn visit_text_runs(element: &XmlElement, f: &mut impl FnMut(&XmlElement)) {
    for child in element.elements() {
        if child.local_name() == "t" {
            f(child);
        } else {
            visit_text_runs(child, f);
        }
    }
}

fn visit_text_runs_mut(element: &mut XmlElement, f: &mut impl FnMut(&mut XmlElement)) {
    for child in element.elements_mut() {
        if child.local_name() == "t" {
            f(child);
        } else {
            visit_text_runs_mut(child, f);
        }
    }
}
