//! Translation context per element.
//!
//! Gives each element a role on the slide so the translator can pick a
//! register: the first title is the slide title, the first header is the
//! key message, bullet groups keep their hierarchy, and so on.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::slide::{ElementKind, SlideStructure};

/// Role of an element on its slide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementRole {
    /// First title on the slide
    SlideTitle,
    /// First header on the slide
    Header,
    /// Any bullet group
    BulletGroup,
    /// Any text box
    SupportingText,
    /// Everything else (second title, second header)
    GenericText,
}

impl ElementRole {
    /// Snake-case name, as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SlideTitle => "slide_title",
            Self::Header => "header",
            Self::BulletGroup => "bullet_group",
            Self::SupportingText => "supporting_text",
            Self::GenericText => "generic_text",
        }
    }

    /// Translation priority, 1 is highest
    pub fn priority(&self) -> u8 {
        match self {
            Self::SlideTitle => 1,
            Self::Header => 2,
            Self::BulletGroup => 3,
            Self::SupportingText => 4,
            Self::GenericText => 5,
        }
    }

    /// What the element is, in a sentence
    pub fn context(&self) -> &'static str {
        match self {
            Self::SlideTitle => {
                "Main title of the consulting slide - translate with professional, impactful language"
            }
            Self::Header => "Key message or insight statement - maintain executive summary tone",
            Self::BulletGroup => {
                "Supporting evidence or sub-points - maintain hierarchy and conciseness"
            }
            Self::SupportingText => "Additional information or notes",
            Self::GenericText => "Text element",
        }
    }

    /// How to translate the element
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::SlideTitle => {
                "Translate as a professional, impactful title. Keep it concise and executive-level."
            }
            Self::Header => {
                "Translate as a key insight or finding. Maintain consulting tone and clarity."
            }
            Self::BulletGroup => {
                "Translate each bullet point concisely. Maintain hierarchy and professional language."
            }
            Self::SupportingText => {
                "Translate supporting text while maintaining context and clarity."
            }
            Self::GenericText => "Translate accurately while preserving meaning.",
        }
    }
}

/// Context of one element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementContext {
    /// Element id
    pub element_id: String,
    /// Element kind
    pub kind: ElementKind,
    /// Role on the slide
    pub role: ElementRole,
    /// Translation priority, 1 is highest
    pub priority: u8,
    /// Description of the element
    pub context: String,
    /// Translation instruction
    pub instruction: String,
    /// Number of bullets for bullet groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullet_count: Option<usize>,
}

impl ElementContext {
    /// Context for an element with the given role
    pub fn new(element_id: impl Into<String>, kind: ElementKind, role: ElementRole) -> Self {
        Self {
            element_id: element_id.into(),
            kind,
            role,
            priority: role.priority(),
            context: role.context().to_string(),
            instruction: role.instruction().to_string(),
            bullet_count: None,
        }
    }
}

/// Context for every element of a slide, in element order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContextMap {
    entries: Vec<ElementContext>,
}

impl ContextMap {
    /// Assign roles to the elements of a slide
    pub fn build(slide: &SlideStructure) -> Self {
        let mut has_title = false;
        let mut has_header = false;

        let entries: Vec<ElementContext> = slide
            .elements
            .iter()
            .map(|element| {
                let role = match element.kind {
                    ElementKind::Title if !has_title => {
                        has_title = true;
                        ElementRole::SlideTitle
                    }
                    ElementKind::Header if !has_header => {
                        has_header = true;
                        ElementRole::Header
                    }
                    ElementKind::BulletGroup => ElementRole::BulletGroup,
                    ElementKind::TextBox => ElementRole::SupportingText,
                    _ => ElementRole::GenericText,
                };
                let mut context = ElementContext::new(&element.id, element.kind, role);
                context.bullet_count = element.bullets().map(<[_]>::len);
                context
            })
            .collect();

        debug!(
            slide = slide.slide_index,
            elements = entries.len(),
            "built context map"
        );
        Self { entries }
    }

    /// Context for an element
    pub fn get(&self, element_id: &str) -> Option<&ElementContext> {
        self.entries.iter().find(|c| c.element_id == element_id)
    }

    /// Role of an element, if known
    pub fn role(&self, element_id: &str) -> Option<ElementRole> {
        self.get(element_id).map(|c| c.role)
    }

    /// Translation instruction, with a generic fallback for unknown ids
    pub fn instruction(&self, element_id: &str) -> &str {
        self.get(element_id)
            .map(|c| c.instruction.as_str())
            .unwrap_or("Translate accurately")
    }

    /// Entries in element order
    pub fn iter(&self) -> impl Iterator<Item = &ElementContext> {
        self.entries.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
