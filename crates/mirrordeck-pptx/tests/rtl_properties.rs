//! Right-to-left conversion properties
//!
//! Exercises the public surface the way the workflow does: open a
//! package, parse a slide, transform it, replace its text, save, reopen.
//!
//! Test Categories:
//! 1. Geometry
//! 2. Paragraph marking
//! 3. Transform scope
//! 4. Replacement
//! 5. End to end

use mirrordeck_ooxml::test_utils::{
    bullet, graphic_shape, paragraph, picture_shape, placeholder_shape, slide_xml, text_shape,
    PptxFixture,
};
use mirrordeck_ooxml::{XmlDocument, XmlElement};
use mirrordeck_pptx::shape::{
    find_shape, nth_shape, paragraph_text, paragraphs, read_xfrm, shape_tree, text_body, Xfrm,
};
use mirrordeck_pptx::{
    apply_font, has_font, is_rtl, mark_rtl, mirror_offset, paragraph_level, ContentReplacer,
    LayoutTransformer, Position, Presentation, PptxError, SlideParser, Translation,
    TranslationResult,
};

const WIDTH: i64 = 9_144_000;

fn parse_slide(shapes: &str) -> XmlDocument {
    XmlDocument::parse(slide_xml(shapes).as_bytes()).unwrap()
}

fn shape<'a>(doc: &'a XmlDocument, id: u32) -> &'a XmlElement {
    find_shape(shape_tree(&doc.root).unwrap(), id).unwrap()
}

fn shape_paragraphs(doc: &XmlDocument, id: u32) -> Vec<&XmlElement> {
    paragraphs(text_body(shape(doc, id)).unwrap()).collect()
}

// =============================================================================
// PART 1: GEOMETRY
// =============================================================================

mod geometry {
    use super::*;

    #[test]
    fn test_mirror_example() {
        assert_eq!(mirror_offset(WIDTH, 1_000_000, 3_000_000), 5_144_000);
    }

    #[test]
    fn test_double_flip_returns_original_up_to_clamping() {
        let step = WIDTH / 12;
        for width in (0..=WIDTH).step_by(step as usize) {
            for offset in (0..=WIDTH).step_by(step as usize) {
                let twice = mirror_offset(WIDTH, mirror_offset(WIDTH, offset, width), width);
                assert_eq!(
                    twice,
                    offset.min(WIDTH - width),
                    "offset {} width {}",
                    offset,
                    width
                );
            }
        }
    }

    #[test]
    fn test_result_stays_inside_the_slide() {
        for (offset, width) in [(0, WIDTH), (WIDTH, 10), (-500, 1_000), (200, WIDTH + 1)] {
            let mirrored = Position::new(offset, 0, width, 10).mirrored(WIDTH);
            assert!(mirrored.offset_x >= 0);
            assert!(mirrored.offset_x + width.min(WIDTH) <= WIDTH);
        }
    }
}

// =============================================================================
// PART 2: PARAGRAPH MARKING
// =============================================================================

mod marking {
    use super::*;

    fn paragraph_element(inner: &str) -> XmlElement {
        let doc = parse_slide(&text_shape(2, (0, 0, 10, 10), inner));
        shape_paragraphs(&doc, 2)[0].clone()
    }

    #[test]
    fn test_direction_marking_is_idempotent() {
        let mut once = paragraph_element(&bullet("Item", 2));
        mark_rtl(&mut once);
        let mut twice = once.clone();
        mark_rtl(&mut twice);

        assert_eq!(once, twice);
        assert!(is_rtl(&twice));
        assert_eq!(paragraph_level(&twice), 2);
    }

    #[test]
    fn test_every_run_gets_both_font_entries() {
        let mut p = paragraph_element(concat!(
            r#"<a:p><a:r><a:rPr lang="en-US"><a:latin typeface="Calibri" panose="020F0502020204030204"/></a:rPr><a:t>One </a:t></a:r>"#,
            r#"<a:r><a:t>two </a:t></a:r>"#,
            r#"<a:fld id="{B6F15528-21DE-4FAA-801E-634DDDAF4B2B}" type="slidenum"><a:t>3</a:t></a:fld>"#,
            r#"<a:br/><a:r><a:rPr><a:cs typeface="Times New Roman"/></a:rPr><a:t>four</a:t></a:r></a:p>"#
        ));
        apply_font(&mut p, "Tahoma");

        assert!(has_font(&p, "Tahoma"));
        let runs: Vec<&XmlElement> = p
            .elements()
            .filter(|e| matches!(e.local_name(), "r" | "fld"))
            .collect();
        assert_eq!(runs.len(), 4);
        for run in runs {
            let rpr = run.child("a:rPr").unwrap();
            assert_eq!(rpr.children_named("a:latin").count(), 1);
            assert_eq!(rpr.children_named("a:cs").count(), 1);
            assert_eq!(rpr.child("a:latin").unwrap().attr("panose"), None);
        }
    }
}

// =============================================================================
// PART 3: TRANSFORM SCOPE
// =============================================================================

mod transform_scope {
    use super::*;

    #[test]
    fn test_shapes_without_text_are_untouched() {
        let shapes = format!(
            "{}{}{}{}",
            graphic_shape(3, (100, 100, 2_000_000, 2_000_000)),
            picture_shape(4, (6_000_000, 100, 1_000_000, 1_000_000)),
            text_shape(2, (1_000_000, 0, 3_000_000, 500), &paragraph("Hi")),
            graphic_shape(5, (8_000_000, 0, 1_000_000, 1_000_000))
        );
        let mut doc = parse_slide(&shapes);
        let before: Vec<String> = [3, 5]
            .iter()
            .map(|id| shape(&doc, *id).to_xml_string().unwrap())
            .collect();
        let picture_before = picture_xml(&doc);

        LayoutTransformer::default().transform(&mut doc, WIDTH, None);

        let after: Vec<String> = [3, 5]
            .iter()
            .map(|id| shape(&doc, *id).to_xml_string().unwrap())
            .collect();
        assert_eq!(before, after);
        assert_eq!(picture_before, picture_xml(&doc));
    }

    fn picture_xml(doc: &XmlDocument) -> String {
        shape_tree(&doc.root)
            .unwrap()
            .child("p:pic")
            .unwrap()
            .to_xml_string()
            .unwrap()
    }

    #[test]
    fn test_malformed_shape_does_not_stop_the_slide() {
        let broken = r#"<p:sp><p:nvSpPr><p:cNvPr id="7" name="Broken"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="1" y="2"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:t>Bad</a:t></a:r></a:p></p:txBody></p:sp>"#;
        let shapes = format!(
            "{}{}",
            broken,
            text_shape(2, (1_000_000, 0, 3_000_000, 500), &paragraph("Fine"))
        );
        let mut doc = parse_slide(&shapes);
        let report = LayoutTransformer::default().transform(&mut doc, WIDTH, None);

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].shape, "Broken");
        assert!(!is_rtl(shape_paragraphs(&doc, 7)[0]));
        assert!(is_rtl(shape_paragraphs(&doc, 2)[0]));
        assert_eq!(
            read_xfrm(shape(&doc, 2)),
            Xfrm::Explicit(Position::new(5_144_000, 0, 3_000_000, 500))
        );
    }

    #[test]
    fn test_layout_pass_marks_text_but_keeps_positions() {
        let pptx = PptxFixture::new()
            .slide(text_shape(2, (0, 0, 10, 10), &paragraph("Slide")))
            .layout(placeholder_shape(
                2,
                Some("ftr"),
                Some(11),
                Some((500_000, 6_000_000, 2_000_000, 300_000)),
                &paragraph("Confidential"),
            ))
            .build()
            .unwrap();
        let deck = Presentation::from_bytes(&pptx).unwrap();
        let mut layout = deck.layout_parts().unwrap().remove(0);

        let report = LayoutTransformer::default().transform_layout(&mut layout.xml, WIDTH);

        assert_eq!(report.shapes_mirrored, 0);
        assert_eq!(
            read_xfrm(shape(&layout.xml, 2)),
            Xfrm::Explicit(Position::new(500_000, 6_000_000, 2_000_000, 300_000))
        );
        let p = shape_paragraphs(&layout.xml, 2)[0];
        assert!(is_rtl(p));
        assert!(has_font(p, "Arial"));
    }
}

// =============================================================================
// PART 4: REPLACEMENT
// =============================================================================

mod replacement {
    use super::*;

    fn bullet_slide(levels: &[u32]) -> (XmlDocument, mirrordeck_pptx::SlideStructure) {
        let paras: String = levels
            .iter()
            .enumerate()
            .map(|(i, level)| bullet(&format!("Point {}", i + 1), *level))
            .collect();
        let shapes = placeholder_shape(
            3,
            Some("body"),
            Some(1),
            Some((500_000, 1_500_000, 8_000_000, 4_000_000)),
            &paras,
        );
        let pptx = PptxFixture::new().slide(shapes).build().unwrap();
        let deck = Presentation::from_bytes(&pptx).unwrap();
        let slide = deck.slide_part(0).unwrap();
        let structure = SlideParser::new(deck.container_width()).parse(&slide, 0);
        (slide.xml, structure)
    }

    #[test]
    fn test_bullet_levels_are_preserved_in_order() {
        let (mut doc, structure) = bullet_slide(&[0, 0, 1, 0]);
        let translations =
            TranslationResult::new().with_bullets("shape_0", ["واحد", "اثنان", "ثلاثة", "أربعة"]);

        let report = ContentReplacer::default().replace(&mut doc, &structure, &translations);
        assert!(report.is_complete());

        let paras = shape_paragraphs(&doc, 3);
        let levels: Vec<u32> = paras.iter().map(|p| paragraph_level(p)).collect();
        let texts: Vec<String> = paras.iter().map(|p| paragraph_text(p)).collect();
        assert_eq!(levels, vec![0, 0, 1, 0]);
        assert_eq!(texts, vec!["واحد", "اثنان", "ثلاثة", "أربعة"]);
        assert!(paras.iter().all(|p| is_rtl(p) && has_font(p, "Arial")));
    }

    #[test]
    fn test_count_mismatch_leaves_shape_unmodified() {
        let (mut doc, structure) = bullet_slide(&[0, 0, 1, 0]);
        let before = shape(&doc, 3).to_xml_string().unwrap();
        let element = structure.element("shape_0").unwrap();

        let err = ContentReplacer::default()
            .replace_element(
                &mut doc,
                element,
                Some(&Translation::Bullets(vec!["a".into(), "b".into(), "c".into()])),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            PptxError::BulletCountMismatch {
                expected: 4,
                actual: 3,
                ..
            }
        ));
        assert_eq!(shape(&doc, 3).to_xml_string().unwrap(), before);
    }

    #[test]
    fn test_missing_translation_fails_only_that_element() {
        let shapes = format!(
            "{}{}",
            text_shape(2, (0, 3_000_000, 10, 10), &paragraph("Kept")),
            text_shape(4, (0, 4_000_000, 10, 10), &paragraph("Translated"))
        );
        let mut doc = parse_slide(&shapes);
        let part = mirrordeck_pptx::SlidePart {
            path: "ppt/slides/slide1.xml".into(),
            layout_path: None,
            xml: doc.clone(),
        };
        let structure = SlideParser::new(WIDTH).parse(&part, 0);
        let translations = TranslationResult::new().with_text("shape_1", "مترجم");

        let report = ContentReplacer::default().replace(&mut doc, &structure, &translations);

        assert_eq!(report.replaced, vec!["shape_1"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].element, "shape_0");
        assert_eq!(paragraph_text(shape_paragraphs(&doc, 2)[0]), "Kept");
        assert_eq!(paragraph_text(shape_paragraphs(&doc, 4)[0]), "مترجم");
    }

    #[test]
    fn test_shapes_sharing_an_id_each_get_their_own_text() {
        // Copy-pasted shapes commonly repeat `p:cNvPr/@id`
        let shapes = format!(
            "{}{}",
            text_shape(2, (0, 3_000_000, 10, 10), &paragraph("First")),
            text_shape(2, (0, 4_000_000, 10, 10), &paragraph("Second"))
        );
        let mut doc = parse_slide(&shapes);
        let part = mirrordeck_pptx::SlidePart {
            path: "ppt/slides/slide1.xml".into(),
            layout_path: None,
            xml: doc.clone(),
        };
        let structure = SlideParser::new(WIDTH).parse(&part, 0);
        let indices: Vec<usize> = structure.elements.iter().map(|e| e.shape_index).collect();
        assert_eq!(indices, vec![0, 1]);

        let translations = TranslationResult::new()
            .with_text("shape_0", "AAA")
            .with_text("shape_1", "BBB");
        let report = ContentReplacer::default().replace(&mut doc, &structure, &translations);
        assert!(report.is_complete());

        let tree = shape_tree(&doc.root).unwrap();
        let texts: Vec<String> = (0..2)
            .map(|i| {
                let body = text_body(nth_shape(tree, i).unwrap()).unwrap();
                paragraph_text(paragraphs(body).next().unwrap())
            })
            .collect();
        assert_eq!(texts, vec!["AAA", "BBB"]);
    }

    #[test]
    fn test_stale_element_fails_instead_of_editing_another_shape() {
        let shapes = format!(
            "{}{}",
            text_shape(2, (0, 3_000_000, 10, 10), &paragraph("First")),
            text_shape(4, (0, 4_000_000, 10, 10), &paragraph("Second"))
        );
        let mut doc = parse_slide(&shapes);
        let part = mirrordeck_pptx::SlidePart {
            path: "ppt/slides/slide1.xml".into(),
            layout_path: None,
            xml: doc.clone(),
        };
        let mut element = SlideParser::new(WIDTH).parse(&part, 0).elements[1].clone();
        element.shape_index = 0;
        let before = doc.clone();

        let err = ContentReplacer::default()
            .replace_element(&mut doc, &element, Some(&Translation::Text("x".into())))
            .unwrap_err();

        assert_eq!(err.code(), "RTL005");
        assert_eq!(doc, before);
    }
}

// =============================================================================
// PART 5: END TO END
// =============================================================================

mod end_to_end {
    use super::*;

    #[test]
    fn test_title_and_bullets_through_a_saved_package() {
        let shapes = format!(
            "{}{}",
            placeholder_shape(
                2,
                Some("title"),
                None,
                Some((500_000, 300_000, 8_000_000, 900_000)),
                &paragraph("Our Approach")
            ),
            placeholder_shape(
                3,
                Some("body"),
                Some(1),
                Some((500_000, 1_500_000, 8_000_000, 4_000_000)),
                &format!("{}{}", bullet("First", 0), bullet("Detail", 1))
            )
        );
        let pptx = PptxFixture::new().slide(shapes).build().unwrap();
        let mut deck = Presentation::from_bytes(&pptx).unwrap();
        assert_eq!(deck.container_width(), WIDTH);

        let mut slide = deck.slide_part(0).unwrap();
        let geometry = deck.placeholder_geometry(&slide).unwrap();
        let structure = SlideParser::new(deck.container_width())
            .with_inherited(&geometry)
            .parse(&slide, 0);
        assert_eq!(structure.elements.len(), 2);

        let translations = TranslationResult::new()
            .with_text("shape_0", "X")
            .with_bullets("shape_1", ["A", "B"]);

        let transform =
            LayoutTransformer::default().transform(&mut slide.xml, deck.container_width(), Some(&geometry));
        assert_eq!(transform.shapes_mirrored, 2);
        let replaced = ContentReplacer::default().replace(&mut slide.xml, &structure, &translations);
        assert!(replaced.is_complete());
        deck.put_part(&slide.path, &slide.xml).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("deck_rtl.pptx");
        deck.save(&out).unwrap();
        let reopened = Presentation::open(&out).unwrap();
        let doc = reopened.slide_part(0).unwrap().xml;

        assert_eq!(
            read_xfrm(shape(&doc, 2)),
            Xfrm::Explicit(Position::new(644_000, 300_000, 8_000_000, 900_000))
        );
        let title = shape_paragraphs(&doc, 2);
        assert_eq!(title.len(), 1);
        assert_eq!(paragraph_text(title[0]), "X");
        assert!(is_rtl(title[0]));
        assert!(has_font(title[0], "Arial"));

        let items: Vec<(String, u32, bool)> = shape_paragraphs(&doc, 3)
            .into_iter()
            .map(|p| (paragraph_text(p), paragraph_level(p), is_rtl(p)))
            .collect();
        assert_eq!(
            items,
            vec![("A".to_string(), 0, true), ("B".to_string(), 1, true)]
        );
    }
}
