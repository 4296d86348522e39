//! # mirrordeck-pptx
//!
//! Right-to-left conversion of PowerPoint (PPTX) slides.
//!
//! A left-to-right deck becomes a right-to-left one in three passes over
//! each slide part:
//!
//! - **Parse**: [`SlideParser`] extracts the text-bearing shapes as
//!   [`SlideElement`]s (title, header, bullet group, text box).
//! - **Transform**: [`LayoutTransformer`] mirrors shape offsets across
//!   the slide width, marks paragraphs right-to-left and sets the Latin
//!   and complex-script fonts of every run.
//! - **Replace**: [`ContentReplacer`] writes translated text back into
//!   the shapes, keeping formatting and bullet levels.
//!
//! Slide layouts and masters get a text-only pass
//! ([`LayoutTransformer::transform_layout`]) and their static text can be
//! translated through [`layout_text`]. [`QualityChecker`] reports what is
//! still likely to render badly once a slide is converted.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mirrordeck_pptx::{ContentReplacer, LayoutTransformer, Presentation, SlideParser};
//!
//! let mut deck = Presentation::open("deck.pptx")?;
//! let mut slide = deck.slide_part(0)?;
//! let geometry = deck.placeholder_geometry(&slide)?;
//!
//! let structure = SlideParser::new(deck.container_width())
//!     .with_inherited(&geometry)
//!     .parse(&slide, 0);
//! LayoutTransformer::default().transform(&mut slide.xml, deck.container_width(), Some(&geometry));
//! ContentReplacer::default().replace(&mut slide.xml, &structure, &translations);
//!
//! deck.put_part(&slide.path, &slide.xml)?;
//! deck.save("deck_rtl.pptx")?;
//! ```

pub mod context;
pub mod direction;
pub mod error;
pub mod font;
pub mod geometry;
pub mod layout_text;
pub mod parser;
pub mod placeholder;
pub mod presentation;
pub mod quality;
pub mod replace;
pub mod shape;
pub mod slide;
pub mod transform;

// Re-exports
pub use mirrordeck_ooxml::XmlDocument;

pub use context::{ContextMap, ElementContext, ElementRole};
pub use direction::{is_rtl, mark_rtl, paragraph_level};
pub use error::{PptxError, Result};
pub use font::{apply_font, has_font};
pub use geometry::{mirror_offset, Position};
pub use layout_text::{apply_layout_translations, collect_layout_texts, is_translatable_layout_text};
pub use parser::SlideParser;
pub use placeholder::{PlaceholderGeometry, PlaceholderType};
pub use presentation::{LayoutPart, MasterPart, Presentation, SlidePart};
pub use quality::{IssueKind, QualityChecker, QualityIssue, Severity};
pub use replace::{ContentReplacer, ElementFailure, ReplaceReport};
pub use slide::{
    Bullet, ElementContent, ElementKind, SlideElement, SlideStructure, Translation,
    TranslationResult,
};
pub use transform::{LayoutPolicy, LayoutTransformer, ShapeWarning, TransformReport};

/// PPTX-related constants
pub mod constants {
    /// Default slide width in EMU (914400 EMU = 1 inch, standard 10" width)
    pub const DEFAULT_SLIDE_WIDTH_EMU: i64 = 9_144_000;

    /// Default slide height in EMU (standard 7.5" height for 4:3)
    pub const DEFAULT_SLIDE_HEIGHT_EMU: i64 = 6_858_000;

    /// EMU per inch
    pub const EMU_PER_INCH: i64 = 914_400;

    /// EMU per point
    pub const EMU_PER_POINT: i64 = 12_700;

    /// DrawingML namespace
    pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    /// Font applied to translated runs unless configured otherwise
    pub const DEFAULT_TARGET_FONT: &str = "Arial";

    /// Non-placeholder text above this offset (~2.2") may be a header
    pub const HEADER_ZONE_EMU: i64 = 2_000_000;

    /// Text body inset applied with autofit (0.03")
    pub const AUTOFIT_INSET_EMU: i64 = 27_432;
}
