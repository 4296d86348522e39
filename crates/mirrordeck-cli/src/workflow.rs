//! Whole-deck conversion.
//!
//! Slides are parsed and translated on a worker pool, since translation
//! mostly waits on the provider. Transform and replacement then run one
//! slide at a time on the calling thread. The output is written to
//! `<output>.partial` and renamed into place only once complete.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use mirrordeck_pptx::{
    apply_layout_translations, collect_layout_texts, ContentReplacer, ContextMap,
    LayoutTransformer, PlaceholderGeometry, Presentation, QualityChecker, QualityIssue,
    ReplaceReport, Severity, ShapeWarning, SlidePart, SlideParser, SlideStructure,
    TransformReport, TranslationResult, XmlDocument,
};
use mirrordeck_translate::{
    translate_layout_texts, ChatTranslator, GlossaryTranslator, TranslateError, Translator,
};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ErrorPolicy, ProviderKind, Settings, TranslationSettings};

/// Where slide translations come from
pub enum TranslationSource<'a> {
    /// Transform only; source text stays
    None,
    /// Ask a provider, slide by slide
    Provider(&'a dyn Translator),
    /// Translations prepared earlier, keyed by zero-based slide index
    Precomputed(BTreeMap<usize, TranslationResult>),
}

/// Outcome of one slide
#[derive(Debug, Clone, Default, Serialize)]
pub struct SlideReport {
    /// Zero-based slide index
    pub slide_index: usize,
    /// Slide part path
    pub path: String,
    /// Text elements found
    pub elements: usize,
    /// Translation failure for the whole slide, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_error: Option<String>,
    /// Direction/font/mirroring outcome
    pub transform: TransformReport,
    /// Text replacement outcome
    pub replace: ReplaceReport,
    /// Rendering risks left on the converted slide
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quality: Vec<QualityIssue>,
}

impl SlideReport {
    /// Whether anything on this slide was left in the source language
    pub fn has_failures(&self) -> bool {
        self.translation_error.is_some() || !self.replace.failures.is_empty()
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowReport {
    /// Input file
    pub input: PathBuf,
    /// Output file
    pub output: PathBuf,
    /// Per-slide outcomes in slide order
    pub slides: Vec<SlideReport>,
    /// Layout parts marked right-to-left
    pub layouts: usize,
    /// Master parts marked right-to-left
    pub masters: usize,
    /// Layout text runs translated
    pub layout_texts_translated: usize,
    /// Shape warnings from the layout pass
    pub layout_warnings: Vec<ShapeWarning>,
    /// Layout translation failures
    pub layout_errors: Vec<String>,
}

impl WorkflowReport {
    /// Whether any slide kept source text
    pub fn has_failures(&self) -> bool {
        self.slides.iter().any(SlideReport::has_failures)
    }

    /// Number of shape warnings across slides and layouts
    pub fn warning_count(&self) -> usize {
        self.slides
            .iter()
            .map(|s| s.transform.warnings.len())
            .sum::<usize>()
            + self.layout_warnings.len()
    }

    /// Quality issues across slides at the given severity
    pub fn quality_count(&self, severity: Severity) -> usize {
        self.slides
            .iter()
            .flat_map(|s| &s.quality)
            .filter(|issue| issue.severity == severity)
            .count()
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let replaced: usize = self.slides.iter().map(|s| s.replace.replaced.len()).sum();
        let mirrored: usize = self
            .slides
            .iter()
            .map(|s| s.transform.shapes_mirrored)
            .sum();

        out.push_str(&format!(
            "{} -> {}\n",
            self.input.display(),
            self.output.display()
        ));
        out.push_str(&format!(
            "  slides: {}, elements replaced: {}, shapes mirrored: {}, layouts: {}, masters: {}\n",
            self.slides.len(),
            replaced,
            mirrored,
            self.layouts,
            self.masters
        ));
        if self.layout_texts_translated > 0 {
            out.push_str(&format!(
                "  layout texts translated: {}\n",
                self.layout_texts_translated
            ));
        }
        let (high, medium, low) = (
            self.quality_count(Severity::High),
            self.quality_count(Severity::Medium),
            self.quality_count(Severity::Low),
        );
        if high + medium + low > 0 {
            out.push_str(&format!(
                "  quality issues: {} high, {} medium, {} low\n",
                high, medium, low
            ));
        }

        for slide in &self.slides {
            if let Some(err) = &slide.translation_error {
                out.push_str(&format!(
                    "  slide {}: translation failed, source text kept: {}\n",
                    slide.slide_index + 1,
                    err
                ));
            }
            for failure in &slide.replace.failures {
                out.push_str(&format!(
                    "  slide {}: [{}] {}\n",
                    slide.slide_index + 1,
                    failure.code,
                    failure.message
                ));
            }
            for warning in &slide.transform.warnings {
                out.push_str(&format!(
                    "  slide {}: warning [{}] {}: {}\n",
                    slide.slide_index + 1,
                    warning.code,
                    warning.shape,
                    warning.message
                ));
            }
            for issue in slide.quality.iter().filter(|i| i.severity == Severity::High) {
                out.push_str(&format!(
                    "  slide {}: {} {}: {}\n",
                    slide.slide_index + 1,
                    issue.kind.as_str(),
                    issue.shape.as_deref().unwrap_or("slide"),
                    issue.message
                ));
            }
        }
        for warning in &self.layout_warnings {
            out.push_str(&format!(
                "  layout: warning [{}] {}: {}\n",
                warning.code, warning.shape, warning.message
            ));
        }
        for err in &self.layout_errors {
            out.push_str(&format!("  layout: {}\n", err));
        }
        out
    }
}

/// A slide after the concurrent phase
struct PreparedSlide {
    part: SlidePart,
    geometry: PlaceholderGeometry,
    structure: SlideStructure,
    translations: Option<std::result::Result<TranslationResult, String>>,
}

/// Converts decks according to [`Settings`]
pub struct Workflow<'a> {
    settings: &'a Settings,
    source: TranslationSource<'a>,
}

impl<'a> Workflow<'a> {
    /// Workflow using `source` for translations
    pub fn new(settings: &'a Settings, source: TranslationSource<'a>) -> Self {
        Self { settings, source }
    }

    /// Convert `input` and write the result to `output`
    pub fn run(&self, input: &Path, output: &Path) -> Result<WorkflowReport> {
        let partial = partial_path(output);
        let result = self
            .convert(input, &partial)
            .and_then(|report| {
                fs::rename(&partial, output).with_context(|| {
                    format!("Failed to move output into place: {}", output.display())
                })?;
                Ok(report)
            });

        match result {
            Ok(mut report) => {
                report.output = output.to_path_buf();
                info!(output = %output.display(), "wrote presentation");
                Ok(report)
            }
            Err(err) => {
                if partial.exists() {
                    let _ = fs::remove_file(&partial);
                }
                Err(err)
            }
        }
    }

    fn convert(&self, input: &Path, partial: &Path) -> Result<WorkflowReport> {
        let mut deck = Presentation::open(input)
            .with_context(|| format!("Failed to open presentation: {}", input.display()))?;
        let width = deck.container_width();
        info!(
            input = %input.display(),
            slides = deck.slide_count(),
            width,
            "converting presentation"
        );

        let prepared = self.prepare_slides(&deck)?;

        let transformer = LayoutTransformer::new(&self.settings.render.target_font)
            .with_layout_policy(self.settings.render.layout_policy);
        let replacer = ContentReplacer::new(&self.settings.render.target_font)
            .with_autofit(self.settings.render.autofit);
        let checker = QualityChecker::new();
        let abort = self.settings.workflow.on_element_error == ErrorPolicy::Abort;

        let mut report = WorkflowReport {
            input: input.to_path_buf(),
            ..Default::default()
        };

        for slide in prepared {
            let PreparedSlide {
                mut part,
                geometry,
                structure,
                translations,
            } = slide;
            let mut slide_report = SlideReport {
                slide_index: structure.slide_index,
                path: part.path.clone(),
                elements: structure.elements.len(),
                ..Default::default()
            };

            slide_report.transform = transformer.transform(&mut part.xml, width, Some(&geometry));

            match translations {
                Some(Ok(translations)) => {
                    slide_report.replace = replacer.replace(&mut part.xml, &structure, &translations);
                }
                Some(Err(err)) => slide_report.translation_error = Some(err),
                None => {}
            }
            slide_report.quality = checker.check(&part.xml);
            debug!(
                slide = structure.slide_index,
                issues = slide_report.quality.len(),
                "quality checked"
            );

            if abort && slide_report.has_failures() {
                bail!(
                    "Slide {} could not be fully translated; aborting (on_element_error = \"abort\")",
                    structure.slide_index + 1
                );
            }

            deck.put_part(&part.path, &part.xml)
                .with_context(|| format!("Failed to serialize {}", part.path))?;
            report.slides.push(slide_report);
        }

        self.layout_pass(&mut deck, &transformer, &mut report)?;

        deck.save(partial)
            .with_context(|| format!("Failed to write presentation: {}", partial.display()))?;
        Ok(report)
    }

    /// Parse, build context and translate every slide on the worker pool
    fn prepare_slides(&self, deck: &Presentation) -> Result<Vec<PreparedSlide>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.workflow.workers.max(1))
            .build()
            .context("Failed to start worker pool")?;

        pool.install(|| {
            (0..deck.slide_count())
                .into_par_iter()
                .map(|index| self.prepare_slide(deck, index))
                .collect()
        })
    }

    fn prepare_slide(&self, deck: &Presentation, index: usize) -> Result<PreparedSlide> {
        let part = deck
            .slide_part(index)
            .with_context(|| format!("Failed to read slide {}", index + 1))?;
        let geometry = deck
            .placeholder_geometry(&part)
            .with_context(|| format!("Failed to read layout of slide {}", index + 1))?;
        let structure = SlideParser::new(deck.container_width())
            .with_inherited(&geometry)
            .parse(&part, index);

        let translations = match &self.source {
            TranslationSource::None => None,
            TranslationSource::Precomputed(all) => {
                Some(Ok(all.get(&index).cloned().unwrap_or_default()))
            }
            TranslationSource::Provider(translator) => {
                let contexts = ContextMap::build(&structure);
                Some(
                    self.translate_with_retries(*translator, &structure, &contexts)
                        .map_err(|err| {
                            warn!(slide = index, provider = translator.name(), "translation failed: {}", err);
                            err.to_string()
                        }),
                )
            }
        };

        Ok(PreparedSlide {
            part,
            geometry,
            structure,
            translations,
        })
    }

    fn translate_with_retries(
        &self,
        translator: &dyn Translator,
        structure: &SlideStructure,
        contexts: &ContextMap,
    ) -> std::result::Result<TranslationResult, TranslateError> {
        if structure.is_empty() {
            return Ok(TranslationResult::new());
        }
        let retries = self.settings.workflow.retries;
        let mut attempt = 0;
        loop {
            match translator.translate_slide(structure, contexts) {
                Ok(result) => return Ok(result),
                Err(err) if err.is_retryable() && attempt < retries => {
                    attempt += 1;
                    let backoff = retry_delay(self.settings.workflow.retry_backoff_ms, attempt);
                    warn!(
                        slide = structure.slide_index,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying translation: {}",
                        err
                    );
                    thread::sleep(backoff);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Mark every layout and master right-to-left and translate their static text
    fn layout_pass(
        &self,
        deck: &mut Presentation,
        transformer: &LayoutTransformer,
        report: &mut WorkflowReport,
    ) -> Result<()> {
        let layouts = deck
            .layout_parts()
            .context("Failed to read slide layouts")?
            .into_iter()
            .map(|layout| (layout.path, layout.xml, false));
        let masters = deck
            .master_parts()
            .context("Failed to read slide masters")?
            .into_iter()
            .map(|master| (master.path, master.xml, true));
        let parts: Vec<(String, XmlDocument, bool)> = layouts.chain(masters).collect();

        for (path, mut xml, is_master) in parts {
            self.secondary_part(&path, &mut xml, deck.container_width(), transformer, report)?;
            deck.put_part(&path, &xml)
                .with_context(|| format!("Failed to serialize {}", path))?;
            if is_master {
                report.masters += 1;
            } else {
                report.layouts += 1;
            }
            debug!(part = %path, "marked right-to-left");
        }
        Ok(())
    }

    fn secondary_part(
        &self,
        path: &str,
        xml: &mut XmlDocument,
        width: i64,
        transformer: &LayoutTransformer,
        report: &mut WorkflowReport,
    ) -> Result<()> {
        let transform = transformer.transform_layout(xml, width);
        report.layout_warnings.extend(transform.warnings);

        let translator = match &self.source {
            TranslationSource::Provider(t) if self.settings.workflow.translate_layouts => *t,
            _ => return Ok(()),
        };
        let texts = collect_layout_texts(xml);
        match translate_layout_texts(translator, &texts) {
            Ok(map) => {
                report.layout_texts_translated += apply_layout_translations(xml, &map);
            }
            Err(err) => {
                warn!(part = %path, "layout translation failed: {}", err);
                if self.settings.workflow.on_element_error == ErrorPolicy::Abort {
                    bail!("Failed to translate {}: {}", path, err);
                }
                report.layout_errors.push(format!("{}: {}", path, err));
            }
        }
        Ok(())
    }
}

/// Pause before retry number `attempt` (1-based): `base`, then doubling,
/// capped at 64 times `base`
pub fn retry_delay(base_ms: u64, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(6);
    Duration::from_millis(base_ms.saturating_mul(1u64 << exponent))
}

/// `<output>.partial`, next to the output
pub fn partial_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    output.with_file_name(name)
}

/// Default output path: `<stem>_rtl.pptx` next to the input
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "presentation".to_string());
    input.with_file_name(format!("{}_rtl.pptx", stem))
}

/// Build the configured translation provider
pub fn translator_from_settings(settings: &TranslationSettings) -> Result<Box<dyn Translator>> {
    match settings.provider {
        ProviderKind::Glossary => {
            let path = settings.glossary.as_deref().context(
                "The glossary provider needs a glossary file (--glossary or [translation] glossary)",
            )?;
            let glossary = GlossaryTranslator::from_path(path)
                .with_context(|| format!("Failed to load glossary: {}", path.display()))?;
            Ok(Box::new(glossary))
        }
        ProviderKind::Chat => {
            if settings.api_key.is_none() {
                warn!("no API key set (MIRRORDECK_API_KEY); requests are sent unauthenticated");
            }
            let chat = ChatTranslator::new(settings.chat_config())
                .context("Failed to create chat translation client")?;
            Ok(Box::new(chat))
        }
    }
}
