//! Slide parsing into text elements.
//!
//! Walks the shape tree in document order (groups included) and emits
//! one [`SlideElement`] per text-bearing `p:sp` with non-empty text.
//! Tables, pictures and connectors carry no `p:sp` text body and are not
//! emitted.

use tracing::debug;

use crate::constants::HEADER_ZONE_EMU;
use crate::direction::paragraph_level;
use crate::geometry::Position;
use crate::placeholder::{PlaceholderGeometry, PlaceholderType};
use crate::presentation::SlidePart;
use crate::shape::{
    paragraph_text, paragraphs, placeholder, read_xfrm, shape_id, shape_tree, text_body,
    visit_shapes, Xfrm,
};
use crate::slide::{Bullet, ElementContent, ElementKind, SlideElement, SlideStructure};

/// Extracts [`SlideStructure`]s from slide parts
#[derive(Debug, Clone)]
pub struct SlideParser<'a> {
    container_width: i64,
    inherited: Option<&'a PlaceholderGeometry>,
}

impl<'a> SlideParser<'a> {
    /// Parser for a deck of the given slide width
    pub fn new(container_width: i64) -> Self {
        Self {
            container_width,
            inherited: None,
        }
    }

    /// Report layout positions for placeholders without their own `a:xfrm`
    pub fn with_inherited(mut self, geometry: &'a PlaceholderGeometry) -> Self {
        self.inherited = Some(geometry);
        self
    }

    /// Parse one slide
    pub fn parse(&self, part: &SlidePart, slide_index: usize) -> SlideStructure {
        let mut elements: Vec<SlideElement> = Vec::new();

        if let Some(tree) = shape_tree(&part.xml.root) {
            let mut visited = 0;
            visit_shapes(tree, &mut |shape, _| {
                let shape_index = visited;
                visited += 1;
                let Some(body) = text_body(shape) else {
                    return;
                };

                let paras: Vec<(String, u32)> = paragraphs(body)
                    .map(|p| (paragraph_text(p), paragraph_level(p)))
                    .collect();

                let ph = placeholder(shape);
                let position = match read_xfrm(shape) {
                    Xfrm::Explicit(position) => Some(position),
                    Xfrm::Absent => ph
                        .as_ref()
                        .and_then(|ph| self.inherited.and_then(|g| g.resolve(ph))),
                    Xfrm::Malformed(_) => None,
                };

                let ph_type = ph
                    .as_ref()
                    .map(|ph| PlaceholderType::from_ooxml_type(ph.ph_type.as_deref()));
                let kind = classify(ph_type, &paras, position, elements.len());

                let content = if kind == ElementKind::BulletGroup {
                    let bullets: Vec<Bullet> = paras
                        .iter()
                        .filter(|(text, _)| !text.trim().is_empty())
                        .map(|(text, level)| Bullet::new(text.trim(), *level))
                        .collect();
                    if bullets.is_empty() {
                        return;
                    }
                    ElementContent::Bullets { bullets }
                } else {
                    let joined = paras
                        .iter()
                        .map(|(text, _)| text.as_str())
                        .collect::<Vec<_>>()
                        .join("\n");
                    let text = joined.trim();
                    if text.is_empty() {
                        return;
                    }
                    ElementContent::Text {
                        text: text.to_string(),
                    }
                };

                elements.push(SlideElement {
                    id: format!("shape_{}", elements.len()),
                    kind,
                    content,
                    position,
                    shape_id: shape_id(shape).unwrap_or(0),
                    shape_index,
                });
            });
        }

        debug!(
            slide = slide_index,
            part = %part.path,
            elements = elements.len(),
            "parsed slide"
        );

        SlideStructure {
            slide_index,
            container_width: self.container_width,
            elements,
        }
    }
}

/// Decide the element kind of a text shape.
///
/// `emitted` is the number of elements already emitted on the slide;
/// only the first two can be headers.
fn classify(
    ph_type: Option<PlaceholderType>,
    paras: &[(String, u32)],
    position: Option<Position>,
    emitted: usize,
) -> ElementKind {
    match ph_type {
        Some(t) if t.is_title() => return ElementKind::Title,
        Some(PlaceholderType::Body) => return ElementKind::BulletGroup,
        _ => {}
    }

    let multi_paragraph = paras.len() > 1;
    let has_bullets = paras
        .iter()
        .any(|(text, level)| *level > 0 || (multi_paragraph && !text.trim().is_empty()));
    if has_bullets || paras.len() > 2 {
        return ElementKind::BulletGroup;
    }

    match position {
        Some(pos) if emitted <= 1 && pos.offset_y < HEADER_ZONE_EMU => ElementKind::Header,
        _ => ElementKind::TextBox,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrordeck_ooxml::test_utils::{
        bullet, graphic_shape, layout_xml, paragraph, picture_shape, placeholder_shape,
        slide_xml, text_shape,
    };
    use mirrordeck_ooxml::XmlDocument;

    fn part(shapes: &str) -> SlidePart {
        SlidePart {
            path: "ppt/slides/slide1.xml".to_string(),
            layout_path: None,
            xml: XmlDocument::parse(slide_xml(shapes).as_bytes()).unwrap(),
        }
    }

    fn parse(shapes: &str) -> SlideStructure {
        SlideParser::new(9_144_000).parse(&part(shapes), 0)
    }

    #[test]
    fn test_title_and_bullets() {
        let shapes = format!(
            "{}{}",
            placeholder_shape(2, Some("title"), None, Some((500_000, 300_000, 8_000_000, 900_000)), &paragraph("Our Approach")),
            placeholder_shape(
                3,
                Some("body"),
                Some(1),
                Some((500_000, 1_500_000, 8_000_000, 4_000_000)),
                &format!("{}{}{}", bullet("First", 0), paragraph(""), bullet("Detail", 1))
            )
        );
        let slide = parse(&shapes);

        assert_eq!(slide.elements.len(), 2);
        let title = &slide.elements[0];
        assert_eq!(title.id, "shape_0");
        assert_eq!(title.kind, ElementKind::Title);
        assert_eq!(title.text(), Some("Our Approach"));
        assert_eq!(title.shape_id, 2);

        let group = &slide.elements[1];
        assert_eq!(group.id, "shape_1");
        assert_eq!(group.kind, ElementKind::BulletGroup);
        assert_eq!(
            group.bullets().unwrap(),
            &[Bullet::new("First", 0), Bullet::new("Detail", 1)]
        );
    }

    #[test]
    fn test_header_then_text_box() {
        let shapes = format!(
            "{}{}{}",
            text_shape(2, (100, 200_000, 5_000, 5_000), &paragraph("Key message")),
            text_shape(3, (100, 5_000_000, 5_000, 5_000), &paragraph("Footnote")),
            text_shape(4, (100, 100_000, 5_000, 5_000), &paragraph("Third near top"))
        );
        let slide = parse(&shapes);
        let kinds: Vec<ElementKind> = slide.elements.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![ElementKind::Header, ElementKind::TextBox, ElementKind::TextBox]
        );
    }

    #[test]
    fn test_ids_skip_empty_and_non_text_shapes() {
        let shapes = format!(
            "{}{}{}{}",
            text_shape(2, (0, 3_000_000, 10, 10), &paragraph("   ")),
            graphic_shape(3, (0, 0, 10, 10)),
            picture_shape(4, (0, 0, 10, 10)),
            text_shape(5, (0, 3_000_000, 10, 10), &paragraph("Kept"))
        );
        let slide = parse(&shapes);
        assert_eq!(slide.elements.len(), 1);
        assert_eq!(slide.elements[0].id, "shape_0");
        assert_eq!(slide.elements[0].shape_id, 5);
    }

    #[test]
    fn test_two_paragraphs_make_a_bullet_group() {
        let shapes = text_shape(
            2,
            (0, 3_000_000, 10, 10),
            &format!("{}{}", paragraph("Only text"), paragraph("")),
        );
        let slide = parse(&shapes);
        assert_eq!(slide.elements[0].kind, ElementKind::BulletGroup);
        assert_eq!(slide.elements[0].bullets().unwrap().len(), 1);
    }

    #[test]
    fn test_grouped_shapes_are_parsed() {
        let shapes = format!(
            r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="9" name="Group"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:grpSp>"#,
            text_shape(10, (0, 3_000_000, 10, 10), &paragraph("Inside"))
        );
        let slide = parse(&shapes);
        assert_eq!(slide.elements.len(), 1);
        assert_eq!(slide.elements[0].shape_id, 10);
    }

    #[test]
    fn test_inherited_position_for_placeholder() {
        let layout = XmlDocument::parse(
            layout_xml(&placeholder_shape(2, Some("title"), None, Some((1, 2, 3, 4)), "")).as_bytes(),
        )
        .unwrap();
        let geometry = PlaceholderGeometry::from_parts(Some(&layout), None);
        let shapes = placeholder_shape(2, Some("title"), None, None, &paragraph("Inherited"));

        let slide = SlideParser::new(9_144_000)
            .with_inherited(&geometry)
            .parse(&part(&shapes), 3);
        assert_eq!(slide.slide_index, 3);
        assert_eq!(slide.elements[0].position, Some(Position::new(1, 2, 3, 4)));

        let without = parse(&shapes);
        assert_eq!(without.elements[0].position, None);
    }
}
