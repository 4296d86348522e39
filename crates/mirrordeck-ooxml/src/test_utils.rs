//! Shared test fixtures for mirrordeck crates
//!
//! Builds minimal but structurally valid PPTX packages in memory so tests
//! can exercise the whole presentation -> slide -> layout -> master chain
//! without binary fixtures on disk.
//!
//! # Example
//! ```ignore
//! use mirrordeck_ooxml::test_utils::{text_shape, paragraph, PptxFixture};
//!
//! let pptx = PptxFixture::new()
//!     .slide(text_shape(2, (500_000, 300_000, 8_000_000, 900_000), &paragraph("Hello")))
//!     .build()?;
//! ```

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

use crate::error::Result;

/// DrawingML + PresentationML + relationships namespace declarations
pub const NS_DECLS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const SP_TREE_HEADER: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

/// Builder for an in-memory PPTX package
#[derive(Debug, Clone)]
pub struct PptxFixture {
    slide_size: (i64, i64),
    slides: Vec<String>,
    layout_shapes: String,
    master_shapes: String,
}

impl Default for PptxFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl PptxFixture {
    /// Standard 4:3 deck with no slides and an empty layout
    pub fn new() -> Self {
        Self {
            slide_size: (9_144_000, 6_858_000),
            slides: Vec::new(),
            layout_shapes: String::new(),
            master_shapes: String::new(),
        }
    }

    /// Override the slide size in EMU
    pub fn slide_size(mut self, width: i64, height: i64) -> Self {
        self.slide_size = (width, height);
        self
    }

    /// Add a slide whose shape tree contains `shapes`
    pub fn slide(mut self, shapes: impl Into<String>) -> Self {
        self.slides.push(shapes.into());
        self
    }

    /// Set the shapes of the single slide layout
    pub fn layout(mut self, shapes: impl Into<String>) -> Self {
        self.layout_shapes = shapes.into();
        self
    }

    /// Set the shapes of the slide master
    pub fn master(mut self, shapes: impl Into<String>) -> Self {
        self.master_shapes = shapes.into();
        self
    }

    /// Write the package
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let mut overrides = String::new();
        for n in 1..=self.slides.len() {
            overrides.push_str(&format!(
                r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
                n
            ));
        }

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>{}</Types>"#,
                overrides
            )
            .as_bytes(),
        )?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#,
        )?;

        let mut sld_ids = String::new();
        let mut pres_rels = String::from(
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#,
        );
        for n in 1..=self.slides.len() {
            sld_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n + 1));
            pres_rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
                n + 1,
                n
            ));
        }

        zip.start_file("ppt/presentation.xml", options)?;
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {ns}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{ids}</p:sldIdLst><p:sldSz cx="{cx}" cy="{cy}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
                ns = NS_DECLS,
                ids = sld_ids,
                cx = self.slide_size.0,
                cy = self.slide_size.1
            )
            .as_bytes(),
        )?;

        zip.start_file("ppt/_rels/presentation.xml.rels", options)?;
        zip.write_all(rels_xml(&pres_rels).as_bytes())?;

        zip.start_file("ppt/slideMasters/slideMaster1.xml", options)?;
        zip.write_all(container_xml("sldMaster", &self.master_shapes).as_bytes())?;

        zip.start_file("ppt/slideLayouts/slideLayout1.xml", options)?;
        zip.write_all(container_xml("sldLayout", &self.layout_shapes).as_bytes())?;

        zip.start_file("ppt/slideLayouts/_rels/slideLayout1.xml.rels", options)?;
        zip.write_all(
            rels_xml(r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/>"#)
                .as_bytes(),
        )?;

        for (i, shapes) in self.slides.iter().enumerate() {
            zip.start_file(format!("ppt/slides/slide{}.xml", i + 1), options)?;
            zip.write_all(slide_xml(shapes).as_bytes())?;

            zip.start_file(format!("ppt/slides/_rels/slide{}.xml.rels", i + 1), options)?;
            zip.write_all(
                rels_xml(r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#)
                    .as_bytes(),
            )?;
        }

        zip.finish()?;
        Ok(buffer.into_inner())
    }
}

fn rels_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        body
    )
}

fn container_xml(root: &str, shapes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:{root} {ns}><p:cSld><p:spTree>{header}{shapes}</p:spTree></p:cSld></p:{root}>"#,
        root = root,
        ns = NS_DECLS,
        header = SP_TREE_HEADER,
        shapes = shapes
    )
}

/// A complete slide part around the given shapes
pub fn slide_xml(shapes: &str) -> String {
    container_xml("sld", shapes)
}

/// A complete slide layout part around the given shapes
pub fn layout_xml(shapes: &str) -> String {
    container_xml("sldLayout", shapes)
}

fn xfrm_xml(rect: (i64, i64, i64, i64)) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        rect.0, rect.1, rect.2, rect.3
    )
}

/// A text box shape at `(x, y, cx, cy)` whose text body holds `paragraphs`
pub fn text_shape(id: u32, rect: (i64, i64, i64, i64), paragraphs: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr wrap="none"/><a:lstStyle/>{paras}</p:txBody></p:sp>"#,
        id = id,
        xfrm = xfrm_xml(rect),
        paras = paragraphs
    )
}

/// A placeholder shape; `rect = None` leaves the position to the layout
pub fn placeholder_shape(
    id: u32,
    ph_type: Option<&str>,
    idx: Option<u32>,
    rect: Option<(i64, i64, i64, i64)>,
    paragraphs: &str,
) -> String {
    let mut ph = String::from("<p:ph");
    if let Some(t) = ph_type {
        ph.push_str(&format!(r#" type="{}""#, t));
    }
    if let Some(i) = idx {
        ph.push_str(&format!(r#" idx="{}""#, i));
    }
    ph.push_str("/>");

    let sp_pr = match rect {
        Some(rect) => format!("<p:spPr>{}</p:spPr>", xfrm_xml(rect)),
        None => "<p:spPr/>".to_string(),
    };

    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Placeholder {id}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr>{sp_pr}<p:txBody><a:bodyPr/><a:lstStyle/>{paras}</p:txBody></p:sp>"#,
        id = id,
        ph = ph,
        sp_pr = sp_pr,
        paras = paragraphs
    )
}

/// A rectangle with no text body
pub fn graphic_shape(id: u32, rect: (i64, i64, i64, i64)) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Rectangle {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:solidFill><a:srgbClr val="1F4E79"/></a:solidFill></p:spPr></p:sp>"#,
        id = id,
        xfrm = xfrm_xml(rect)
    )
}

/// A picture shape
pub fn picture_shape(id: u32, rect: (i64, i64, i64, i64)) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId9"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        id = id,
        xfrm = xfrm_xml(rect)
    )
}

/// A single-run paragraph
pub fn paragraph(text: &str) -> String {
    format!(
        r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
        text
    )
}

/// A single-run paragraph at a bullet level
pub fn bullet(text: &str, level: u32) -> String {
    if level == 0 {
        return paragraph(text);
    }
    format!(
        r#"<a:p><a:pPr lvl="{}"/><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
        level, text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::OoxmlArchive;
    use crate::xml::XmlDocument;

    #[test]
    fn test_fixture_is_a_valid_package() {
        let pptx = PptxFixture::new()
            .slide(text_shape(2, (0, 0, 100, 100), &paragraph("Hello")))
            .slide(graphic_shape(2, (0, 0, 100, 100)))
            .build()
            .unwrap();

        let archive = OoxmlArchive::from_bytes(&pptx).unwrap();
        assert!(archive.contains("[Content_Types].xml"));
        assert!(archive.contains("ppt/slideLayouts/slideLayout1.xml"));
        assert_eq!(archive.slide_paths().len(), 2);

        for part in archive.slide_paths() {
            XmlDocument::parse(archive.get(&part).unwrap()).unwrap();
        }
    }

    #[test]
    fn test_bullet_level_zero_has_no_ppr() {
        assert!(!bullet("x", 0).contains("a:pPr"));
        assert!(bullet("x", 2).contains(r#"lvl="2""#));
    }
}
