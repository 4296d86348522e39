//! Placeholder position inheritance.
//!
//! A slide placeholder without its own `a:xfrm` takes its position from
//! the matching placeholder on its layout, and failing that from the
//! slide master. Layout placeholders match by `idx` first, then by type;
//! master placeholders match by type class (a title-ish placeholder uses
//! the master title, content-ish ones use the master body).

use mirrordeck_ooxml::XmlDocument;

use crate::geometry::Position;
use crate::shape::{placeholder, read_xfrm, shape_tree, visit_shapes, PlaceholderRef, ShapeScope, Xfrm};

/// Types of placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderType {
    /// Title placeholder
    Title,
    /// Center title (for title slides)
    CenterTitle,
    /// Subtitle
    Subtitle,
    /// Body content
    Body,
    /// Object (content); the default when `type` is omitted
    Object,
    /// Date/time
    DateTime,
    /// Footer
    Footer,
    /// Slide number
    SlideNumber,
    /// Picture, chart, table, media and anything else
    Other,
}

impl PlaceholderType {
    /// Parse from the OOXML `type` attribute
    pub fn from_ooxml_type(s: Option<&str>) -> Self {
        match s {
            Some("title") => Self::Title,
            Some("ctrTitle") => Self::CenterTitle,
            Some("subTitle") => Self::Subtitle,
            Some("body") => Self::Body,
            None | Some("obj") => Self::Object,
            Some("dt") => Self::DateTime,
            Some("ftr") => Self::Footer,
            Some("sldNum") => Self::SlideNumber,
            Some(_) => Self::Other,
        }
    }

    /// Whether the placeholder holds a slide title
    pub fn is_title(&self) -> bool {
        matches!(self, Self::Title | Self::CenterTitle)
    }

    /// Type of the master placeholder this one falls back to
    fn master_class(&self) -> Self {
        match self {
            Self::Title | Self::CenterTitle => Self::Title,
            Self::Subtitle | Self::Body | Self::Object => Self::Body,
            other => *other,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    ph_type: PlaceholderType,
    idx: Option<u32>,
    position: Position,
}

/// Positions of the placeholders a slide can inherit from
#[derive(Debug, Clone, Default)]
pub struct PlaceholderGeometry {
    layout: Vec<Entry>,
    master: Vec<Entry>,
}

impl PlaceholderGeometry {
    /// Index the explicitly positioned placeholders of a layout and master
    pub fn from_parts(layout: Option<&XmlDocument>, master: Option<&XmlDocument>) -> Self {
        Self {
            layout: layout.map(collect).unwrap_or_default(),
            master: master.map(collect).unwrap_or_default(),
        }
    }

    /// Whether nothing can be inherited
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty() && self.master.is_empty()
    }

    /// Inherited position for a slide placeholder
    pub fn resolve(&self, ph: &PlaceholderRef) -> Option<Position> {
        let ph_type = PlaceholderType::from_ooxml_type(ph.ph_type.as_deref());

        let by_idx = ph
            .idx
            .and_then(|idx| self.layout.iter().find(|e| e.idx == Some(idx)));
        let by_type = || self.layout.iter().find(|e| e.ph_type == ph_type);
        let from_master = || {
            self.master
                .iter()
                .find(|e| e.ph_type.master_class() == ph_type.master_class())
        };

        by_idx
            .or_else(by_type)
            .or_else(from_master)
            .map(|e| e.position)
    }
}

fn collect(doc: &XmlDocument) -> Vec<Entry> {
    let mut entries = Vec::new();
    if let Some(tree) = shape_tree(&doc.root) {
        visit_shapes(tree, &mut |shape, scope| {
            if scope != ShapeScope::TopLevel {
                return;
            }
            let (Some(ph), Xfrm::Explicit(position)) = (placeholder(shape), read_xfrm(shape)) else {
                return;
            };
            entries.push(Entry {
                ph_type: PlaceholderType::from_ooxml_type(ph.ph_type.as_deref()),
                idx: ph.idx,
                position,
            });
        });
    }
    entries
}
