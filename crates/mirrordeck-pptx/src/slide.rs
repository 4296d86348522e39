//! Parsed slide structure and translation results.
//!
//! A [`SlideStructure`] is the element list produced by the parser and
//! read by context building and translation. Element ids are assigned
//! once at parse time and key everything downstream, including the
//! [`TranslationResult`] consumed by the content replacer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::Position;

/// Kind of text element, resolved once at parse time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Title placeholder
    Title,
    /// Text near the top of the slide acting as a key message
    Header,
    /// Multi-paragraph or levelled text
    BulletGroup,
    /// Any other text frame
    TextBox,
}

impl ElementKind {
    /// Name used in serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Header => "header",
            Self::BulletGroup => "bullet_group",
            Self::TextBox => "text_box",
        }
    }
}

/// One list item of a bullet group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bullet {
    /// Trimmed paragraph text
    pub text: String,
    /// Zero-based nesting depth
    pub level: u32,
}

impl Bullet {
    /// Create a bullet
    pub fn new(text: impl Into<String>, level: u32) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}

/// Text of an element: a single string or ordered bullets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementContent {
    /// Title, header and text box content
    Text { text: String },
    /// Bullet group content, in visual order
    Bullets { bullets: Vec<Bullet> },
}

impl ElementContent {
    /// Short description used in error messages
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "a single text",
            Self::Bullets { .. } => "a bullet list",
        }
    }
}

/// One addressable unit of text on a slide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideElement {
    /// Stable id, unique within the slide (`shape_<n>`)
    pub id: String,
    /// Element kind
    pub kind: ElementKind,
    /// Text or bullets
    #[serde(flatten)]
    pub content: ElementContent,
    /// Position on the slide, when it could be determined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// `p:cNvPr/@id` of the shape holding the text
    pub shape_id: u32,
    /// Position of that shape among the slide's `p:sp` elements in
    /// document order, groups included
    #[serde(default)]
    pub shape_index: usize,
}

impl SlideElement {
    /// Text content, if this is not a bullet group
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            ElementContent::Text { text } => Some(text),
            ElementContent::Bullets { .. } => None,
        }
    }

    /// Bullets, if this is a bullet group
    pub fn bullets(&self) -> Option<&[Bullet]> {
        match &self.content {
            ElementContent::Bullets { bullets } => Some(bullets),
            ElementContent::Text { .. } => None,
        }
    }

    /// All source strings of the element, in order
    pub fn source_texts(&self) -> Vec<&str> {
        match &self.content {
            ElementContent::Text { text } => vec![text.as_str()],
            ElementContent::Bullets { bullets } => bullets.iter().map(|b| b.text.as_str()).collect(),
        }
    }
}

/// Text elements of one slide
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlideStructure {
    /// Zero-based slide index in presentation order
    pub slide_index: usize,
    /// Slide width in EMU
    pub container_width: i64,
    /// Elements in document order
    pub elements: Vec<SlideElement>,
}

impl SlideStructure {
    /// Look up an element by id
    pub fn element(&self, id: &str) -> Option<&SlideElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Whether the slide has no text elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Translation of a single element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Translation {
    /// Translation of a title, header or text box
    Text(String),
    /// Translations of each bullet, in source order
    Bullets(Vec<String>),
}

impl Translation {
    /// Short description used in error messages
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "a single text",
            Self::Bullets(_) => "a bullet list",
        }
    }
}

/// Element id to translated text for one slide
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationResult {
    entries: BTreeMap<String, Translation>,
}

impl TranslationResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a translation for an element
    pub fn insert(&mut self, id: impl Into<String>, translation: Translation) {
        self.entries.insert(id.into(), translation);
    }

    /// Builder-style single text insert
    pub fn with_text(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(id, Translation::Text(text.into()));
        self
    }

    /// Builder-style bullet list insert
    pub fn with_bullets<S: Into<String>>(
        mut self,
        id: impl Into<String>,
        bullets: impl IntoIterator<Item = S>,
    ) -> Self {
        let bullets = bullets.into_iter().map(Into::into).collect();
        self.insert(id, Translation::Bullets(bullets));
        self
    }

    /// Translation for an element
    pub fn get(&self, id: &str) -> Option<&Translation> {
        self.entries.get(id)
    }

    /// Number of translated elements
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was translated
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in element id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Translation)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
