//! Layout transform: right-to-left direction, target font and mirrored
//! positions for every text-bearing shape.
//!
//! Shapes without a text body (pictures, decorative rectangles,
//! connectors, tables) are never touched. Shapes inside groups get
//! direction and font but keep their position, since their offsets are
//! relative to the group. A shape whose `a:xfrm` is unusable is skipped
//! and reported; the rest of the slide is still transformed.

use mirrordeck_ooxml::{XmlDocument, XmlElement};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{DEFAULT_TARGET_FONT, NS_DRAWING};
use crate::direction::mark_rtl;
use crate::error::PptxError;
use crate::font::apply_font;
use crate::geometry::mirror_offset;
use crate::placeholder::PlaceholderGeometry;
use crate::shape::{
    insert_xfrm, placeholder, read_xfrm, shape_label, shape_tree_mut, text_body_mut,
    visit_shapes_mut, write_offset_x, ShapeScope, Xfrm,
};

/// Whether layout and master parts are mirrored too
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutPolicy {
    /// Direction and font only; shared layouts keep their positions
    #[default]
    TextOnly,
    /// Also mirror layout placeholders
    Mirror,
}

/// A shape that could not be fully transformed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeWarning {
    /// Diagnostic code of the underlying error
    pub code: &'static str,
    /// Shape name or id
    pub shape: String,
    /// What went wrong
    pub message: String,
}

impl ShapeWarning {
    fn from_error(shape: String, error: &PptxError) -> Self {
        Self {
            code: error.code(),
            shape,
            message: error.to_string(),
        }
    }
}

/// Outcome of transforming one part
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformReport {
    /// Text shapes that received direction and font
    pub shapes_marked: usize,
    /// Text shapes whose position was mirrored
    pub shapes_mirrored: usize,
    /// Shapes skipped or only partly transformed
    pub warnings: Vec<ShapeWarning>,
}

/// Applies right-to-left direction, font and mirroring to slide parts
#[derive(Debug, Clone)]
pub struct LayoutTransformer {
    target_font: String,
    layout_policy: LayoutPolicy,
}

impl Default for LayoutTransformer {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_FONT)
    }
}

impl LayoutTransformer {
    /// Transformer applying `target_font` to every run
    pub fn new(target_font: impl Into<String>) -> Self {
        Self {
            target_font: target_font.into(),
            layout_policy: LayoutPolicy::default(),
        }
    }

    /// Set the layout/master policy
    pub fn with_layout_policy(mut self, policy: LayoutPolicy) -> Self {
        self.layout_policy = policy;
        self
    }

    /// Target font
    pub fn target_font(&self) -> &str {
        &self.target_font
    }

    /// Transform a slide in place.
    ///
    /// `inherited` supplies positions for placeholders without their own
    /// `a:xfrm`; such shapes get an explicit, mirrored `a:xfrm`.
    pub fn transform(
        &self,
        slide: &mut XmlDocument,
        container_width: i64,
        inherited: Option<&PlaceholderGeometry>,
    ) -> TransformReport {
        self.run(slide, container_width, true, inherited)
    }

    /// Transform a slide layout or master in place.
    ///
    /// Positions are only mirrored under [`LayoutPolicy::Mirror`].
    pub fn transform_layout(&self, layout: &mut XmlDocument, container_width: i64) -> TransformReport {
        let mirror = self.layout_policy == LayoutPolicy::Mirror;
        self.run(layout, container_width, mirror, None)
    }

    fn run(
        &self,
        doc: &mut XmlDocument,
        container_width: i64,
        mirror: bool,
        inherited: Option<&PlaceholderGeometry>,
    ) -> TransformReport {
        let drawing_prefix = doc.prefix_for(NS_DRAWING).unwrap_or("a").to_string();
        let mut report = TransformReport::default();

        let Some(tree) = shape_tree_mut(&mut doc.root) else {
            debug!("part has no shape tree");
            return report;
        };

        visit_shapes_mut(tree, &mut |shape, scope| {
            if text_body_mut(shape).is_none() {
                return;
            }
            let mirror_here = mirror && scope == ShapeScope::TopLevel;

            let xfrm = read_xfrm(shape);
            if let (true, Xfrm::Malformed(reason)) = (mirror_here, &xfrm) {
                let label = shape_label(shape);
                let err = PptxError::malformed_shape(&label, reason.as_str());
                warn!(shape = %label, code = err.code(), "skipping shape: {}", reason);
                report.warnings.push(ShapeWarning::from_error(label, &err));
                return;
            }

            self.mark_paragraphs(shape);
            report.shapes_marked += 1;

            if !mirror_here {
                return;
            }
            match xfrm {
                Xfrm::Explicit(pos) => {
                    let new_x = mirror_offset(container_width, pos.offset_x, pos.width);
                    if write_offset_x(shape, new_x) {
                        report.shapes_mirrored += 1;
                    }
                }
                Xfrm::Absent => {
                    let resolved = placeholder(shape)
                        .and_then(|ph| inherited.and_then(|geometry| geometry.resolve(&ph)));
                    match resolved {
                        Some(pos) => {
                            insert_xfrm(shape, &drawing_prefix, pos.mirrored(container_width));
                            report.shapes_mirrored += 1;
                        }
                        None => {
                            let label = shape_label(shape);
                            let err = PptxError::malformed_shape(
                                &label,
                                "no position on the shape or its layout; not mirrored",
                            );
                            warn!(shape = %label, code = err.code(), "shape position unknown");
                            report.warnings.push(ShapeWarning::from_error(label, &err));
                        }
                    }
                }
                Xfrm::Malformed(_) => {}
            }
        });

        debug!(
            marked = report.shapes_marked,
            mirrored = report.shapes_mirrored,
            warnings = report.warnings.len(),
            "transformed part"
        );
        report
    }

    fn mark_paragraphs(&self, shape: &mut XmlElement) {
        if let Some(body) = text_body_mut(shape) {
            for paragraph in body.children_local_mut("p") {
                mark_rtl(paragraph);
                apply_font(paragraph, &self.target_font);
            }
        }
    }
}
