//! Presentation package access.
//!
//! Reads the slide size and slide order from `ppt/presentation.xml`,
//! follows slide -> layout -> master relationships, and hands out parsed
//! parts for editing. Edited parts are written back with
//! [`Presentation::put_part`] and the whole package saved at the end.

use std::path::Path;

use mirrordeck_ooxml::{resolve_part_path, OoxmlArchive, Relationships, XmlDocument, PRESENTATION_PART};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::constants::{DEFAULT_SLIDE_HEIGHT_EMU, DEFAULT_SLIDE_WIDTH_EMU};
use crate::error::{PptxError, Result};
use crate::placeholder::PlaceholderGeometry;

/// A parsed slide part
#[derive(Debug, Clone)]
pub struct SlidePart {
    /// Package path (`ppt/slides/slide1.xml`)
    pub path: String,
    /// Layout the slide is based on
    pub layout_path: Option<String>,
    /// Parsed slide XML
    pub xml: XmlDocument,
}

/// A parsed slide layout part
#[derive(Debug, Clone)]
pub struct LayoutPart {
    /// Package path (`ppt/slideLayouts/slideLayout1.xml`)
    pub path: String,
    /// Master the layout is based on
    pub master_path: Option<String>,
    /// Parsed layout XML
    pub xml: XmlDocument,
}

/// A parsed slide master part
#[derive(Debug, Clone)]
pub struct MasterPart {
    /// Package path (`ppt/slideMasters/slideMaster1.xml`)
    pub path: String,
    /// Parsed master XML
    pub xml: XmlDocument,
}

/// An opened PPTX package
#[derive(Debug, Clone)]
pub struct Presentation {
    archive: OoxmlArchive,
    slide_size: (i64, i64),
    slides: Vec<String>,
}

impl Presentation {
    /// Open a presentation file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_archive(OoxmlArchive::open(path)?)
    }

    /// Open a presentation held in memory
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_archive(OoxmlArchive::from_bytes(data)?)
    }

    /// Wrap an unpacked package
    pub fn from_archive(archive: OoxmlArchive) -> Result<Self> {
        let presentation_xml = archive
            .get(PRESENTATION_PART)
            .ok_or_else(|| PptxError::missing_part(PRESENTATION_PART))?;
        let info = read_presentation_info(presentation_xml)?;

        let mut slides = Vec::new();
        if let Some(rels) = archive.rels_for(PRESENTATION_PART) {
            let rels = Relationships::parse(rels)?;
            for rel_id in &info.slide_rel_ids {
                if let Some(target) = rels.get(rel_id) {
                    let path = resolve_part_path(PRESENTATION_PART, target);
                    if archive.contains(&path) {
                        slides.push(path);
                    }
                }
            }
        }
        if slides.is_empty() {
            slides = archive.slide_paths();
        }

        debug!(
            slides = slides.len(),
            width = info.slide_size.0,
            height = info.slide_size.1,
            "opened presentation"
        );

        Ok(Self {
            archive,
            slide_size: info.slide_size,
            slides,
        })
    }

    /// Number of slides
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slide size (width, height) in EMU
    pub fn slide_size(&self) -> (i64, i64) {
        self.slide_size
    }

    /// Slide width in EMU, the container for mirroring
    pub fn container_width(&self) -> i64 {
        self.slide_size.0
    }

    /// Slide part paths in presentation order
    pub fn slide_paths(&self) -> &[String] {
        &self.slides
    }

    /// Parse the slide at `index` (zero-based, presentation order)
    pub fn slide_part(&self, index: usize) -> Result<SlidePart> {
        let path = self
            .slides
            .get(index)
            .ok_or(PptxError::SlideIndexOutOfRange {
                index,
                count: self.slides.len(),
            })?;
        let xml = XmlDocument::parse(self.require(path)?)?;
        let layout_path = self.related_part(path, Relationships::TYPE_SLIDE_LAYOUT)?;

        Ok(SlidePart {
            path: path.clone(),
            layout_path,
            xml,
        })
    }

    /// Parse a layout part
    pub fn layout_part(&self, path: &str) -> Result<LayoutPart> {
        let xml = XmlDocument::parse(self.require(path)?)?;
        let master_path = self.related_part(path, Relationships::TYPE_SLIDE_MASTER)?;
        Ok(LayoutPart {
            path: path.to_string(),
            master_path,
            xml,
        })
    }

    /// Every slide layout in the package, in numeric order
    pub fn layout_parts(&self) -> Result<Vec<LayoutPart>> {
        self.archive
            .layout_paths()
            .iter()
            .map(|path| self.layout_part(path))
            .collect()
    }

    /// Every slide master in the package, in numeric order
    pub fn master_parts(&self) -> Result<Vec<MasterPart>> {
        self.archive
            .master_paths()
            .into_iter()
            .map(|path| {
                let xml = self.xml_part(&path)?;
                Ok(MasterPart { path, xml })
            })
            .collect()
    }

    /// Parse any XML part
    pub fn xml_part(&self, path: &str) -> Result<XmlDocument> {
        Ok(XmlDocument::parse(self.require(path)?)?)
    }

    /// Positions a slide's placeholders inherit from its layout and master
    pub fn placeholder_geometry(&self, slide: &SlidePart) -> Result<PlaceholderGeometry> {
        let Some(layout_path) = &slide.layout_path else {
            return Ok(PlaceholderGeometry::default());
        };
        if !self.archive.contains(layout_path) {
            return Ok(PlaceholderGeometry::default());
        }
        let layout = self.layout_part(layout_path)?;
        let master = match &layout.master_path {
            Some(path) if self.archive.contains(path) => Some(self.xml_part(path)?),
            _ => None,
        };
        Ok(PlaceholderGeometry::from_parts(
            Some(&layout.xml),
            master.as_ref(),
        ))
    }

    /// Replace a part with an edited document
    pub fn put_part(&mut self, path: &str, xml: &XmlDocument) -> Result<()> {
        self.archive.set(path, xml.to_bytes()?);
        Ok(())
    }

    /// Borrow the underlying package
    pub fn archive(&self) -> &OoxmlArchive {
        &self.archive
    }

    /// Serialize the package
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.archive.to_bytes()?)
    }

    /// Write the package to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.archive.write_to_file(path)?;
        Ok(())
    }

    fn require(&self, path: &str) -> Result<&[u8]> {
        self.archive
            .get(path)
            .ok_or_else(|| PptxError::missing_part(path))
    }

    fn related_part(&self, source: &str, rel_type: &str) -> Result<Option<String>> {
        let Some(rels) = self.archive.rels_for(source) else {
            return Ok(None);
        };
        let rels = Relationships::parse(rels)?;
        Ok(rels
            .first_of_type(rel_type)
            .map(|target| resolve_part_path(source, target)))
    }
}

struct PresentationInfo {
    slide_size: (i64, i64),
    slide_rel_ids: Vec<String>,
}

/// Extract slide size and slide relationship ids from presentation.xml
fn read_presentation_info(xml: &[u8]) -> Result<PresentationInfo> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut width = DEFAULT_SLIDE_WIDTH_EMU;
    let mut height = DEFAULT_SLIDE_HEIGHT_EMU;
    let mut slide_rel_ids = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"sldSz" => {
                    for attr in e.attributes().flatten() {
                        let value = std::str::from_utf8(&attr.value)
                            .ok()
                            .and_then(|v| v.trim().parse::<i64>().ok());
                        match (attr.key.as_ref(), value) {
                            (b"cx", Some(v)) => width = v,
                            (b"cy", Some(v)) => height = v,
                            _ => {}
                        }
                    }
                }
                b"sldId" => {
                    for attr in e.attributes().flatten() {
                        // r:id, whatever the relationships prefix is
                        if attr.key.local_name().as_ref() == b"id" && attr.key.prefix().is_some() {
                            slide_rel_ids.push(String::from_utf8_lossy(&attr.value).into_owned());
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::XmlError(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(PresentationInfo {
        slide_size: (width, height),
        slide_rel_ids,
    })
}
