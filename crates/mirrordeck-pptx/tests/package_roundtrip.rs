//! Package Round-Trip Tests
//!
//! The OOXML package layer under [`mirrordeck_pptx::Presentation`] must
//! survive open -> edit -> save with every untouched part byte-identical
//! and the edited part still parseable.

use mirrordeck_ooxml::test_utils::{graphic_shape, paragraph, text_shape, PptxFixture};
use mirrordeck_ooxml::{resolve_part_path, OoxmlArchive, Relationships, XmlDocument};
use mirrordeck_pptx::Presentation;

// =============================================================================
// PART 1: UNTOUCHED PARTS
// =============================================================================

#[test]
fn test_untouched_parts_are_byte_identical() {
    let pptx = PptxFixture::new()
        .slide(text_shape(2, (100, 200, 300, 400), &paragraph("Keep me")))
        .slide(graphic_shape(3, (0, 0, 10, 10)))
        .build()
        .unwrap();

    let original = OoxmlArchive::from_bytes(&pptx).unwrap();
    let restored = OoxmlArchive::from_bytes(&original.to_bytes().unwrap()).unwrap();

    let mut names: Vec<&str> = original.file_list().collect();
    names.sort();
    for name in names {
        assert_eq!(original.get(name), restored.get(name), "part {} changed", name);
    }
}

#[test]
fn test_write_to_file_and_reopen() {
    let pptx = PptxFixture::new()
        .slide(text_shape(2, (0, 0, 10, 10), &paragraph("On disk")))
        .build()
        .unwrap();
    let archive = OoxmlArchive::from_bytes(&pptx).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.pptx");
    archive.write_to_file(&path).unwrap();

    let reopened = OoxmlArchive::open(&path).unwrap();
    assert_eq!(reopened.slide_paths(), vec!["ppt/slides/slide1.xml"]);
    assert_eq!(Presentation::open(&path).unwrap().slide_count(), 1);
}

// =============================================================================
// PART 2: EDITED PARTS
// =============================================================================

#[test]
fn test_edit_slide_part_through_tree() {
    let pptx = PptxFixture::new()
        .slide(text_shape(2, (100, 200, 300, 400), &paragraph("Tom & Jerry")))
        .build()
        .unwrap();
    let mut archive = OoxmlArchive::from_bytes(&pptx).unwrap();

    let mut doc = XmlDocument::parse(archive.require("ppt/slides/slide1.xml").unwrap()).unwrap();
    let off = doc
        .root
        .child_mut("p:cSld")
        .and_then(|c| c.child_mut("p:spTree"))
        .and_then(|t| t.child_mut("p:sp"))
        .and_then(|s| s.child_mut("p:spPr"))
        .and_then(|s| s.child_mut("a:xfrm"))
        .and_then(|x| x.child_mut("a:off"))
        .unwrap();
    off.set_attr("x", "999");
    archive.set("ppt/slides/slide1.xml", doc.to_bytes().unwrap());

    let saved = OoxmlArchive::from_bytes(&archive.to_bytes().unwrap()).unwrap();
    let xml = saved.get_string("ppt/slides/slide1.xml").unwrap();
    assert!(xml.contains(r#"<a:off x="999" y="200"/>"#));
    assert!(xml.contains("Tom &amp; Jerry"));
}

// =============================================================================
// PART 3: RELATIONSHIP CHAIN
// =============================================================================

#[test]
fn test_slide_layout_master_chain_resolves() {
    let pptx = PptxFixture::new()
        .slide(text_shape(2, (0, 0, 10, 10), &paragraph("x")))
        .build()
        .unwrap();
    let archive = OoxmlArchive::from_bytes(&pptx).unwrap();

    let slide = "ppt/slides/slide1.xml";
    let rels = Relationships::parse(archive.rels_for(slide).unwrap()).unwrap();
    let layout = resolve_part_path(
        slide,
        rels.first_of_type(Relationships::TYPE_SLIDE_LAYOUT).unwrap(),
    );
    assert_eq!(layout, "ppt/slideLayouts/slideLayout1.xml");

    let rels = Relationships::parse(archive.rels_for(&layout).unwrap()).unwrap();
    let master = resolve_part_path(
        &layout,
        rels.first_of_type(Relationships::TYPE_SLIDE_MASTER).unwrap(),
    );
    assert_eq!(master, "ppt/slideMasters/slideMaster1.xml");
    assert!(archive.contains(&master));
}
