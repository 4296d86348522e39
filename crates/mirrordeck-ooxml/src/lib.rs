//! # mirrordeck-ooxml
//!
//! OOXML (Office Open XML) package access for mirrordeck.
//!
//! This crate provides functionality to:
//! - Read and write PPTX packages (ZIP containers of XML parts)
//! - Parse relationship parts and resolve their targets
//! - Edit XML parts through a mutable, prefix-preserving element tree
//!
//! ## Example: Editing a Slide Part
//!
//! ```no_run
//! use mirrordeck_ooxml::{OoxmlArchive, XmlDocument};
//!
//! let mut archive = OoxmlArchive::open("deck.pptx")?;
//! let mut slide = XmlDocument::parse(archive.require("ppt/slides/slide1.xml")?)?;
//! slide.root.set_attr("show", "1");
//! archive.set("ppt/slides/slide1.xml", slide.to_bytes()?);
//! archive.write_to_file("deck-edited.pptx")?;
//! # Ok::<(), mirrordeck_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod error;
pub mod relationships;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod xml;

pub use archive::{rels_path_for, OoxmlArchive, CONTENT_TYPES_PART, PRESENTATION_PART};
pub use error::{OoxmlError, Result};
pub use relationships::{resolve_part_path, RelationshipTarget, Relationships};
pub use xml::{qualify, XmlDocument, XmlElement, XmlNode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
