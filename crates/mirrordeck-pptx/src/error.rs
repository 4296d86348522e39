//! Error types for slide transformation and content replacement.

use mirrordeck_ooxml::OoxmlError;
use thiserror::Error;

/// Result type for PPTX operations
pub type Result<T> = std::result::Result<T, PptxError>;

/// Errors that can occur while transforming a presentation
#[derive(Error, Debug)]
pub enum PptxError {
    /// Shape claims a text frame but its properties cannot be edited safely
    #[error("Malformed shape {shape}: {reason}")]
    MalformedShape { shape: String, reason: String },

    /// Translated bullet count differs from the source bullet count
    #[error(
        "Bullet count mismatch for {element}: source has {expected} bullets, translation has {actual}"
    )]
    BulletCountMismatch {
        element: String,
        expected: usize,
        actual: usize,
    },

    /// No translation supplied for an element present on the slide
    #[error("Missing translation for element {element}")]
    MissingTranslation { element: String },

    /// Single string supplied for a bullet group, or a list for a text element
    #[error("Translation for {element} is {actual} but the element holds {expected}")]
    TranslationShapeMismatch {
        element: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Element refers to a shape id that is not on the slide
    #[error("Shape {shape_id} for element {element} not found on slide")]
    ShapeNotFound { element: String, shape_id: u32 },

    /// Required package part not found
    #[error("Required part not found: {path}")]
    MissingPart { path: String },

    /// Slide index beyond the end of the deck
    #[error("Slide index {index} out of range (presentation has {count} slides)")]
    SlideIndexOutOfRange { index: usize, count: usize },

    /// Package or XML tree error
    #[error(transparent)]
    Ooxml(#[from] OoxmlError),

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),
}

impl PptxError {
    /// Create a malformed shape error
    pub fn malformed_shape(shape: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedShape {
            shape: shape.into(),
            reason: reason.into(),
        }
    }

    /// Create a bullet count mismatch error
    pub fn bullet_count_mismatch(element: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::BulletCountMismatch {
            element: element.into(),
            expected,
            actual,
        }
    }

    /// Create a missing translation error
    pub fn missing_translation(element: impl Into<String>) -> Self {
        Self::MissingTranslation {
            element: element.into(),
        }
    }

    /// Create a missing part error
    pub fn missing_part(path: impl Into<String>) -> Self {
        Self::MissingPart { path: path.into() }
    }

    /// Whether the error is confined to one element and the slide can continue
    pub fn is_element_failure(&self) -> bool {
        matches!(
            self,
            Self::MalformedShape { .. }
                | Self::BulletCountMismatch { .. }
                | Self::MissingTranslation { .. }
                | Self::TranslationShapeMismatch { .. }
                | Self::ShapeNotFound { .. }
        )
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedShape { .. } => "RTL001",
            Self::BulletCountMismatch { .. } => "RTL002",
            Self::MissingTranslation { .. } => "RTL003",
            Self::TranslationShapeMismatch { .. } => "RTL004",
            Self::ShapeNotFound { .. } => "RTL005",
            Self::MissingPart { .. } => "RTL006",
            Self::SlideIndexOutOfRange { .. } => "RTL007",
            Self::Ooxml(_) => "RTL008",
            Self::XmlError(_) => "RTL009",
        }
    }
}
