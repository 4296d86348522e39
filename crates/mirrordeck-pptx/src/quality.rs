//! Right-to-left quality checks.
//!
//! Inspects a slide after conversion and reports what is likely to
//! render badly: paragraphs that are not right-aligned, unwrapped text
//! that may run off the slide, text bodies without autofit, insets wide
//! enough to push text past a mirrored edge, and a slide mixing too many
//! Latin typefaces. Nothing is changed; the issues are returned as data.

use std::collections::BTreeSet;

use mirrordeck_ooxml::{XmlDocument, XmlElement};
use serde::Serialize;

use crate::constants::{AUTOFIT_INSET_EMU, EMU_PER_POINT};
use crate::font::is_run;
use crate::shape::{paragraph_text, paragraphs, shape_label, shape_tree, text_body, visit_shapes};

/// Horizontal inset DrawingML assumes when `lIns`/`rIns` is absent (0.1")
const DEFAULT_SIDE_INSET_EMU: i64 = 91_440;

/// How much a finding is likely to matter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// What a quality check found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Paragraphs not aligned right
    AlignmentNotRight,
    /// Long text with `wrap="none"`
    OverflowRisk,
    /// Text body with neither `normAutofit` nor `spAutoFit`
    NoAutofit,
    /// Left or right inset beyond the limit
    LargeInsets,
    /// More Latin typefaces on the slide than allowed
    MixedFonts,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlignmentNotRight => "alignment_not_right",
            Self::OverflowRisk => "overflow_risk",
            Self::NoAutofit => "no_autofit",
            Self::LargeInsets => "large_insets",
            Self::MixedFonts => "mixed_fonts",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::AlignmentNotRight => Severity::High,
            Self::OverflowRisk | Self::NoAutofit => Severity::Medium,
            Self::LargeInsets | Self::MixedFonts => Severity::Low,
        }
    }
}

/// One finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityIssue {
    pub kind: IssueKind,
    pub severity: Severity,
    /// Shape name, or `None` for slide-wide findings
    pub shape: Option<String>,
    pub message: String,
}

impl QualityIssue {
    fn new(kind: IssueKind, shape: Option<String>, message: String) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            shape,
            message,
        }
    }
}

/// Runs the quality checks over slide parts
#[derive(Debug, Clone)]
pub struct QualityChecker {
    overflow_chars: usize,
    max_inset_emu: i64,
    max_fonts: usize,
}

impl Default for QualityChecker {
    fn default() -> Self {
        Self {
            overflow_chars: 100,
            max_inset_emu: AUTOFIT_INSET_EMU * 3 / 2,
            max_fonts: 2,
        }
    }
}

impl QualityChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Characters of unwrapped text tolerated before overflow is reported
    pub fn with_overflow_chars(mut self, chars: usize) -> Self {
        self.overflow_chars = chars;
        self
    }

    /// Check every text-bearing shape of a slide.
    ///
    /// Shapes with no text are skipped. Issues come out in document
    /// order, followed by the slide-wide font check.
    pub fn check(&self, slide: &XmlDocument) -> Vec<QualityIssue> {
        let mut issues = Vec::new();
        let mut typefaces = BTreeSet::new();

        let Some(tree) = shape_tree(&slide.root) else {
            return issues;
        };
        visit_shapes(tree, &mut |shape, _| {
            let Some(body) = text_body(shape) else {
                return;
            };
            let text_len: usize = paragraphs(body)
                .map(|p| paragraph_text(p).chars().count())
                .sum();
            if text_len == 0 {
                return;
            }
            let label = shape_label(shape);
            self.check_body(body, text_len, &label, &mut issues);
            collect_typefaces(body, &mut typefaces);
        });

        if typefaces.len() > self.max_fonts {
            let names: Vec<&str> = typefaces.iter().map(String::as_str).collect();
            issues.push(QualityIssue::new(
                IssueKind::MixedFonts,
                None,
                format!(
                    "{} Latin typefaces in use ({})",
                    typefaces.len(),
                    names.join(", ")
                ),
            ));
        }
        issues
    }

    fn check_body(&self, body: &XmlElement, text_len: usize, label: &str, issues: &mut Vec<QualityIssue>) {
        let shape = || Some(label.to_string());

        let misaligned = paragraphs(body)
            .filter(|p| !paragraph_text(p).trim().is_empty())
            .filter(|p| p.child_local("pPr").and_then(|ppr| ppr.attr("algn")) != Some("r"))
            .count();
        if misaligned > 0 {
            issues.push(QualityIssue::new(
                IssueKind::AlignmentNotRight,
                shape(),
                format!("{} paragraph(s) not right-aligned", misaligned),
            ));
        }

        let body_pr = body.child_local("bodyPr");
        let wrap = body_pr.and_then(|b| b.attr("wrap"));
        if wrap == Some("none") && text_len > self.overflow_chars {
            issues.push(QualityIssue::new(
                IssueKind::OverflowRisk,
                shape(),
                format!("{} characters with wrapping off", text_len),
            ));
        }

        let autofit = body_pr.is_some_and(|b| {
            b.elements()
                .any(|e| matches!(e.local_name(), "normAutofit" | "spAutoFit"))
        });
        if !autofit {
            issues.push(QualityIssue::new(
                IssueKind::NoAutofit,
                shape(),
                "text does not shrink or grow to fit".to_string(),
            ));
        }

        let inset = |side: &str| {
            body_pr
                .and_then(|b| b.attr(side))
                .and_then(|v| v.trim().parse::<i64>().ok())
                .unwrap_or(DEFAULT_SIDE_INSET_EMU)
        };
        let widest = inset("lIns").max(inset("rIns"));
        if widest > self.max_inset_emu {
            issues.push(QualityIssue::new(
                IssueKind::LargeInsets,
                shape(),
                format!(
                    "side inset {} exceeds {}",
                    points(widest),
                    points(self.max_inset_emu)
                ),
            ));
        }
    }
}

fn collect_typefaces(body: &XmlElement, typefaces: &mut BTreeSet<String>) {
    for paragraph in paragraphs(body) {
        let latin = paragraph
            .elements()
            .filter(|e| is_run(e))
            .filter_map(|run| run.child_local("rPr")?.child_local("latin")?.attr("typeface"));
        typefaces.extend(latin.map(str::to_string));
    }
}

fn points(emu: i64) -> String {
    format!("{:.1}pt", emu as f64 / EMU_PER_POINT as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrordeck_ooxml::test_utils::{paragraph, placeholder_shape, slide_xml, text_shape};

    fn slide(shapes: &str) -> XmlDocument {
        XmlDocument::parse(slide_xml(shapes).as_bytes()).unwrap()
    }

    fn kinds(issues: &[QualityIssue]) -> Vec<IssueKind> {
        issues.iter().map(|i| i.kind).collect()
    }

    fn rtl_shape(id: u32, body_pr: &str, runs: &str) -> String {
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Text {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody>{body_pr}<a:lstStyle/><a:p><a:pPr rtl="1" algn="r"/>{runs}</a:p></p:txBody></p:sp>"#
        )
    }

    fn run(text: &str, font: &str) -> String {
        format!(r#"<a:r><a:rPr lang="ar-SA"><a:latin typeface="{font}"/><a:cs typeface="{font}"/></a:rPr><a:t>{text}</a:t></a:r>"#)
    }

    const FITTED: &str =
        r#"<a:bodyPr wrap="square" lIns="27432" tIns="27432" rIns="27432" bIns="27432"><a:normAutofit/></a:bodyPr>"#;

    #[test]
    fn test_clean_shape_has_no_issues() {
        let doc = slide(&rtl_shape(2, FITTED, &run("مرحبا", "Arial")));
        assert!(QualityChecker::new().check(&doc).is_empty());
    }

    #[test]
    fn test_source_shape_reports_alignment_autofit_and_insets() {
        let doc = slide(&text_shape(2, (0, 0, 100, 100), &paragraph("Hello")));
        let issues = QualityChecker::new().check(&doc);

        assert_eq!(
            kinds(&issues),
            vec![IssueKind::AlignmentNotRight, IssueKind::NoAutofit, IssueKind::LargeInsets]
        );
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[0].shape.as_deref(), Some("TextBox 2"));
        assert_eq!(issues[2].message, "side inset 7.2pt exceeds 3.2pt");
    }

    #[test]
    fn test_long_unwrapped_text_is_an_overflow_risk() {
        let long = "x".repeat(101);
        let body_pr = r#"<a:bodyPr wrap="none" lIns="0" rIns="0"><a:spAutoFit/></a:bodyPr>"#;
        let doc = slide(&rtl_shape(2, body_pr, &run(&long, "Arial")));

        let issues = QualityChecker::new().check(&doc);
        assert_eq!(kinds(&issues), vec![IssueKind::OverflowRisk]);
        assert_eq!(issues[0].severity, Severity::Medium);

        let lenient = QualityChecker::new().with_overflow_chars(200);
        assert!(lenient.check(&doc).is_empty());
    }

    #[test]
    fn test_three_typefaces_are_reported_once_per_slide() {
        let shapes = format!(
            "{}{}",
            rtl_shape(2, FITTED, &format!("{}{}", run("a", "Arial"), run("b", "Calibri"))),
            rtl_shape(3, FITTED, &run("c", "Tahoma")),
        );
        let issues = QualityChecker::new().check(&slide(&shapes));

        assert_eq!(kinds(&issues), vec![IssueKind::MixedFonts]);
        assert_eq!(issues[0].shape, None);
        assert_eq!(issues[0].message, "3 Latin typefaces in use (Arial, Calibri, Tahoma)");
    }

    #[test]
    fn test_empty_placeholders_are_skipped() {
        let doc = slide(&placeholder_shape(2, Some("title"), None, None, &paragraph("")));
        assert!(QualityChecker::new().check(&doc).is_empty());
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!(IssueKind::MixedFonts.as_str(), "mixed_fonts");
    }
}
