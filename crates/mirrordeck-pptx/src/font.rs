//! Run font substitution.
//!
//! Right-to-left scripts render through the complex-script font
//! (`a:cs`), which is resolved independently of the Latin font
//! (`a:latin`). Every run gets both, set to the same typeface.

use mirrordeck_ooxml::{qualify, XmlElement};

/// `a:rPr` children that must follow `a:latin`
const AFTER_LATIN: &[&str] = &[
    "ea",
    "cs",
    "sym",
    "hlinkClick",
    "hlinkMouseOver",
    "rtl",
    "extLst",
];

/// `a:rPr` children that must follow `a:cs`
const AFTER_CS: &[&str] = &["sym", "hlinkClick", "hlinkMouseOver", "rtl", "extLst"];

/// Attributes describing a specific typeface that go stale when it changes
const TYPEFACE_METRICS: &[&str] = &["panose", "pitchFamily", "charset"];

/// Set the Latin and complex-script font of every run in a paragraph.
///
/// Runs are `a:r` and `a:fld`. A paragraph without runs is left as is.
pub fn apply_font(paragraph: &mut XmlElement, font: &str) {
    for run in paragraph.elements_mut().filter(|e| is_run(e)) {
        apply_run_font(run, font);
    }
}

/// Set both font entries on one run, creating `a:rPr` when missing
pub fn apply_run_font(run: &mut XmlElement, font: &str) {
    let name = qualify(run.prefix(), "rPr");
    let rpr = run.ensure_child(&name, |_| 0);
    set_typeface(rpr, "latin", font, AFTER_LATIN);
    set_typeface(rpr, "cs", font, AFTER_CS);
}

/// Whether every run of the paragraph has both font entries set to `font`
pub fn has_font(paragraph: &XmlElement, font: &str) -> bool {
    paragraph.elements().filter(|e| is_run(e)).all(|run| {
        run.child_local("rPr").is_some_and(|rpr| {
            ["latin", "cs"].iter().all(|local| {
                rpr.child_local(local)
                    .is_some_and(|entry| entry.attr("typeface") == Some(font))
            })
        })
    })
}

pub(crate) fn is_run(element: &XmlElement) -> bool {
    matches!(element.local_name(), "r" | "fld")
}

fn set_typeface(rpr: &mut XmlElement, local: &str, font: &str, followers: &[&str]) {
    let name = qualify(rpr.prefix(), local);
    let entry = rpr.ensure_child(&name, |rpr| {
        rpr.position_of_any(followers)
            .unwrap_or(rpr.children().len())
    });
    if entry.attr("typeface") != Some(font) {
        entry.set_attr("typeface", font);
        for attr in TYPEFACE_METRICS {
            entry.remove_attr(attr);
        }
    }
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

    fn rpr_child_names(run: &XmlElement) -> Vec<String> {
        run.child("a:rPr")
            .unwrap()
            .elements()
            .map(|e| e.local_name().to_string())
            .collect()
    }

    #[test]
    fn test_creates_rpr_and_both_fonts() {
        let mut p = parse_paragraph("<a:r><a:t>Hello</a:t></a:r>");
        apply_font(&mut p, "Arial");

        let run = p.child("a:r").unwrap();
        assert_eq!(run.elements().next().unwrap().name(), "a:rPr");
        assert_eq!(rpr_child_names(run), vec!["latin", "cs"]);
        assert!(has_font(&p, "Arial"));
    }

    #[test]
    fn test_every_run_gets_both_fonts() {
        let mut p = parse_paragraph(
            r#"<a:r><a:rPr b="1"/><a:t>one</a:t></a:r><a:r><a:t>two</a:t></a:r><a:br/><a:fld id="{1}" type="slidenum"><a:t>3</a:t></a:fld>"#,
        );
        apply_font(&mut p, "Arial");

        assert!(has_font(&p, "Arial"));
        assert_eq!(p.children_named("a:r").count(), 2);
        // Line breaks are not runs
        assert!(p.child("a:br").unwrap().children().is_empty());
        assert_eq!(
            p.child("a:r").unwrap().child("a:rPr").unwrap().attr("b"),
            Some("1")
        );
    }

    #[test]
    fn test_overwrites_source_font() {
        let mut p = parse_paragraph(
            r#"<a:r><a:rPr><a:latin typeface="Calibri" panose="020F0502020204030204"/><a:cs typeface="Times New Roman"/></a:rPr><a:t>x</a:t></a:r>"#,
        );
        apply_font(&mut p, "Arial");

        let rpr = p.child("a:r").unwrap().child("a:rPr").unwrap();
        let latin = rpr.child("a:latin").unwrap();
        assert_eq!(latin.attr("typeface"), Some("Arial"));
        assert_eq!(latin.attr("panose"), None);
        assert_eq!(rpr.child("a:cs").unwrap().attr("typeface"), Some("Arial"));
        assert_eq!(rpr.children_named("a:latin").count(), 1);
    }

    #[test]
    fn test_schema_order_inside_rpr() {
        let mut p = parse_paragraph(
            r#"<a:r><a:rPr><a:solidFill><a:srgbClr val="000000"/></a:solidFill><a:ea typeface="+mn-ea"/><a:hlinkClick r:id="rId2" xmlns:r="urn:r"/></a:rPr><a:t>x</a:t></a:r>"#,
        );
        apply_font(&mut p, "Arial");

        assert_eq!(
            rpr_child_names(p.child("a:r").unwrap()),
            vec!["solidFill", "latin", "ea", "cs", "hlinkClick"]
        );
    }

    #[test]
    fn test_font_is_idempotent() {
        let mut once = parse_paragraph(r#"<a:r><a:rPr sz="1800"/><a:t>x</a:t></a:r>"#);
        apply_font(&mut once, "Arial");
        let mut twice = once.clone();
        apply_font(&mut twice, "Arial");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_paragraph_without_runs_is_untouched() {
        let mut p = parse_paragraph(r#"<a:pPr algn="l"/><a:endParaRPr lang="en-US"/>"#);
        let before = p.clone();
        apply_font(&mut p, "Arial");
        assert_eq!(p, before);
        assert!(has_font(&p, "Arial"));
    }
}
