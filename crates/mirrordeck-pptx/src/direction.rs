//! Paragraph direction, alignment and bullet level.
//!
//! Everything here edits `a:pPr`, which must be the first child of
//! `a:p` when present.

use mirrordeck_ooxml::{qualify, XmlElement};

/// Mark a paragraph right-to-left and right-aligned.
///
/// Creates `a:pPr` as the first child when missing. Other attributes on
/// an existing `a:pPr` are left as they are. Calling this twice has the
/// same effect as calling it once.
pub fn mark_rtl(paragraph: &mut XmlElement) {
    let ppr = paragraph_properties(paragraph);
    ppr.set_attr("rtl", "1");
    ppr.set_attr("algn", "r");
}

/// Whether the paragraph carries `rtl="1"` and `algn="r"`
pub fn is_rtl(paragraph: &XmlElement) -> bool {
    paragraph
        .child_local("pPr")
        .is_some_and(|ppr| ppr.attr("rtl") == Some("1") && ppr.attr("algn") == Some("r"))
}

/// Zero-based nesting depth (`a:pPr/@lvl`, default 0)
pub fn paragraph_level(paragraph: &XmlElement) -> u32 {
    paragraph
        .child_local("pPr")
        .and_then(|ppr| ppr.attr("lvl"))
        .and_then(|lvl| lvl.trim().parse().ok())
        .unwrap_or(0)
}

/// Set the nesting depth; level 0 drops the attribute
pub fn set_level(paragraph: &mut XmlElement, level: u32) {
    let ppr = paragraph_properties(paragraph);
    if level == 0 {
        ppr.remove_attr("lvl");
    } else {
        ppr.set_attr("lvl", level.to_string());
    }
}

fn paragraph_properties(paragraph: &mut XmlElement) -> &mut XmlElement {
    let name = qualify(paragraph.prefix(), "pPr");
    paragraph.ensure_child(&name, |_| 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrordeck_ooxml::XmlDocument;

    fn parse_paragraph(xml: &str) -> XmlElement {
        let wrapped = format!(
            r#"<a:p xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">{}</a:p>"#,
            xml
        );
        XmlDocument::parse(wrapped.as_bytes()).unwrap().root
    }

    #[test]
    fn test_creates_ppr_before_runs() {
        let mut p = parse_paragraph("<a:r><a:t>Hello</a:t></a:r>");
        mark_rtl(&mut p);

        let first = p.elements().next().unwrap();
        assert_eq!(first.name(), "a:pPr");
        assert_eq!(first.attr("rtl"), Some("1"));
        assert_eq!(first.attr("algn"), Some("r"));
        assert!(is_rtl(&p));
    }

    #[test]
    fn test_preserves_existing_attributes() {
        let mut p = parse_paragraph(r#"<a:pPr marL="342900" lvl="1" algn="l"/><a:r><a:t>x</a:t></a:r>"#);
        mark_rtl(&mut p);

        let ppr = p.child("a:pPr").unwrap();
        assert_eq!(ppr.attr("marL"), Some("342900"));
        assert_eq!(ppr.attr("lvl"), Some("1"));
        assert_eq!(ppr.attr("algn"), Some("r"));
        assert_eq!(p.children_named("a:pPr").count(), 1);
    }

    #[test]
    fn test_marking_is_idempotent() {
        let mut once = parse_paragraph(r#"<a:pPr indent="-228600"/><a:r><a:t>x</a:t></a:r>"#);
        mark_rtl(&mut once);
        let mut twice = once.clone();
        mark_rtl(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_paragraph_is_still_marked() {
        let mut p = parse_paragraph("");
        mark_rtl(&mut p);
        assert!(is_rtl(&p));

        let mut end_only = parse_paragraph(r#"<a:endParaRPr lang="en-US"/>"#);
        mark_rtl(&mut end_only);
        assert_eq!(end_only.elements().next().unwrap().name(), "a:pPr");
    }

    #[test]
    fn test_levels() {
        let mut p = parse_paragraph("<a:r><a:t>x</a:t></a:r>");
        assert_eq!(paragraph_level(&p), 0);

        set_level(&mut p, 2);
        assert_eq!(paragraph_level(&p), 2);

        set_level(&mut p, 0);
        assert_eq!(paragraph_level(&p), 0);
        assert_eq!(p.child("a:pPr").unwrap().attr("lvl"), None);
    }
}
