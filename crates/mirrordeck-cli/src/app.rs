//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mirrordeck_pptx::{
    ContextMap, ElementContent, LayoutPolicy, Presentation, QualityChecker, QualityIssue,
    SlideParser, SlideStructure, TranslationResult,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::config::{ErrorPolicy, ProviderKind, Settings};
use crate::workflow::{
    default_output_path, translator_from_settings, TranslationSource, Workflow, WorkflowReport,
};

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

/// Layout policy as spelled on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LayoutPolicyArg {
    /// Mark layout text right-to-left, keep layout positions
    TextOnly,
    /// Also mirror layout shapes
    Mirror,
}

impl From<LayoutPolicyArg> for LayoutPolicy {
    fn from(arg: LayoutPolicyArg) -> Self {
        match arg {
            LayoutPolicyArg::TextOnly => LayoutPolicy::TextOnly,
            LayoutPolicyArg::Mirror => LayoutPolicy::Mirror,
        }
    }
}

#[derive(Parser)]
#[command(name = "mirrordeck")]
#[command(author, version, about = "Right-to-left conversion of PowerPoint decks", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Rendering flags shared by the commands that write a deck
#[derive(clap::Args, Debug, Default)]
struct RenderArgs {
    /// Font for translated text (Latin and complex script)
    #[arg(long)]
    font: Option<String>,

    /// Whether slide layouts are mirrored too
    #[arg(long, value_enum)]
    layout_policy: Option<LayoutPolicyArg>,

    /// Leave text frame sizing alone on replaced text
    #[arg(long)]
    no_autofit: bool,
}

impl RenderArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(font) = &self.font {
            settings.render.target_font = font.clone();
        }
        if let Some(policy) = self.layout_policy {
            settings.render.layout_policy = policy.into();
        }
        if self.no_autofit {
            settings.render.autofit = false;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a deck and convert it to right-to-left
    Translate {
        /// Input PPTX file
        input: PathBuf,

        /// Output PPTX file (defaults to <input>_rtl.pptx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Translation provider
        #[arg(short, long, value_enum)]
        provider: Option<ProviderKind>,

        /// Glossary file (TOML or JSON) for the glossary provider
        #[arg(short, long)]
        glossary: Option<PathBuf>,

        /// Language to translate into
        #[arg(long)]
        target_language: Option<String>,

        /// Slides translated concurrently
        #[arg(short, long)]
        workers: Option<usize>,

        /// What to do when text cannot be translated
        #[arg(long, value_enum)]
        on_error: Option<ErrorPolicy>,

        /// Skip translating static text on slide layouts
        #[arg(long)]
        skip_layouts: bool,

        #[command(flatten)]
        render: RenderArgs,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the text elements found on each slide
    Inspect {
        /// Input PPTX file
        input: PathBuf,

        /// Only this slide (1-based)
        #[arg(short, long)]
        slide: Option<usize>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Report right-to-left rendering risks in a deck
    Check {
        /// Input PPTX file
        input: PathBuf,

        /// Only this slide (1-based)
        #[arg(short, long)]
        slide: Option<usize>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Convert to right-to-left without translating
    Mirror {
        /// Input PPTX file
        input: PathBuf,

        /// Output PPTX file (defaults to <input>_rtl.pptx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Apply translations from a JSON file and convert to right-to-left
    Apply {
        /// Input PPTX file
        input: PathBuf,

        /// JSON object of slide number (1-based) to element translations
        translations: PathBuf,

        /// Output PPTX file (defaults to <input>_rtl.pptx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// What to do when text cannot be translated
        #[arg(long, value_enum)]
        on_error: Option<ErrorPolicy>,

        #[command(flatten)]
        render: RenderArgs,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Run the CLI application
///
/// Parses arguments, loads settings, installs logging and dispatches
/// to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    init_tracing(&settings.log_level);

    match cli.command {
        Commands::Translate {
            input,
            output,
            provider,
            glossary,
            target_language,
            workers,
            on_error,
            skip_layouts,
            render,
            format,
        } => {
            render.apply(&mut settings);
            if let Some(provider) = provider {
                settings.translation.provider = provider;
            }
            if let Some(glossary) = glossary {
                settings.translation.glossary = Some(glossary);
            }
            if let Some(language) = target_language {
                settings.translation.target_language = language;
            }
            if let Some(workers) = workers {
                settings.workflow.workers = workers;
            }
            if let Some(policy) = on_error {
                settings.workflow.on_element_error = policy;
            }
            if skip_layouts {
                settings.workflow.translate_layouts = false;
            }
            let output = output.unwrap_or_else(|| default_output_path(&input));
            let report = translate_command(&input, &output, &settings)?;
            print_report(&report, format)?;
        }
        Commands::Inspect {
            input,
            slide,
            format,
        } => {
            inspect_command(&input, slide, format)?;
        }
        Commands::Check {
            input,
            slide,
            format,
        } => {
            let slides = check_command(&input, slide)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&slides)?),
                OutputFormat::Text => print!("{}", render_check(&slides)),
            }
        }
        Commands::Mirror {
            input,
            output,
            render,
            format,
        } => {
            render.apply(&mut settings);
            let output = output.unwrap_or_else(|| default_output_path(&input));
            let report = mirror_command(&input, &output, &settings)?;
            print_report(&report, format)?;
        }
        Commands::Apply {
            input,
            translations,
            output,
            on_error,
            render,
            format,
        } => {
            render.apply(&mut settings);
            if let Some(policy) = on_error {
                settings.workflow.on_element_error = policy;
            }
            let output = output.unwrap_or_else(|| default_output_path(&input));
            let report = apply_command(&input, &translations, &output, &settings)?;
            print_report(&report, format)?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber; `RUST_LOG` wins over `default_level`
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute the translate command
pub fn translate_command(input: &Path, output: &Path, settings: &Settings) -> Result<WorkflowReport> {
    check_input(input)?;
    let translator = translator_from_settings(&settings.translation)?;
    Workflow::new(settings, TranslationSource::Provider(translator.as_ref())).run(input, output)
}

/// Execute the mirror command
pub fn mirror_command(input: &Path, output: &Path, settings: &Settings) -> Result<WorkflowReport> {
    check_input(input)?;
    Workflow::new(settings, TranslationSource::None).run(input, output)
}

/// Execute the apply command
pub fn apply_command(
    input: &Path,
    translations: &Path,
    output: &Path,
    settings: &Settings,
) -> Result<WorkflowReport> {
    check_input(input)?;
    let precomputed = load_translations(translations)?;
    Workflow::new(settings, TranslationSource::Precomputed(precomputed)).run(input, output)
}

/// Read a translations file: `{"1": {"shape_0": "...", "shape_1": ["..."]}}`.
///
/// Slide numbers are 1-based in the file and 0-based in the result.
pub fn load_translations(path: &Path) -> Result<BTreeMap<usize, TranslationResult>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read translations: {}", path.display()))?;
    let by_number: BTreeMap<usize, TranslationResult> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid translations file: {}", path.display()))?;

    by_number
        .into_iter()
        .map(|(number, result)| {
            let index = number
                .checked_sub(1)
                .with_context(|| format!("Slide numbers start at 1 (found {})", number))?;
            Ok((index, result))
        })
        .collect()
}

/// One slide in `inspect` output
#[derive(Debug, Serialize)]
struct InspectedSlide {
    path: String,
    #[serde(flatten)]
    structure: SlideStructure,
    context: ContextMap,
}

/// Execute the inspect command
pub fn inspect_command(input: &Path, slide: Option<usize>, format: OutputFormat) -> Result<()> {
    check_input(input)?;
    let deck = Presentation::open(input)
        .with_context(|| format!("Failed to open presentation: {}", input.display()))?;

    let indices = slide_indices(slide, deck.slide_count())?;

    let mut slides = Vec::with_capacity(indices.len());
    for index in indices {
        let part = deck
            .slide_part(index)
            .with_context(|| format!("Failed to read slide {}", index + 1))?;
        let geometry = deck.placeholder_geometry(&part)?;
        let structure = SlideParser::new(deck.container_width())
            .with_inherited(&geometry)
            .parse(&part, index);
        let context = ContextMap::build(&structure);
        slides.push(InspectedSlide {
            path: part.path,
            structure,
            context,
        });
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&slides)?),
        OutputFormat::Text => print!("{}", render_inspection(&slides)),
    }
    Ok(())
}

/// Quality issues of one slide
#[derive(Debug, Serialize)]
pub struct CheckedSlide {
    /// Zero-based slide index
    pub slide_index: usize,
    pub path: String,
    pub issues: Vec<QualityIssue>,
}

/// Execute the check command
pub fn check_command(input: &Path, slide: Option<usize>) -> Result<Vec<CheckedSlide>> {
    check_input(input)?;
    let deck = Presentation::open(input)
        .with_context(|| format!("Failed to open presentation: {}", input.display()))?;
    let indices = slide_indices(slide, deck.slide_count())?;

    let checker = QualityChecker::new();
    indices
        .into_iter()
        .map(|index| {
            let part = deck
                .slide_part(index)
                .with_context(|| format!("Failed to read slide {}", index + 1))?;
            Ok(CheckedSlide {
                slide_index: index,
                issues: checker.check(&part.xml),
                path: part.path,
            })
        })
        .collect()
}

fn render_check(slides: &[CheckedSlide]) -> String {
    let mut out = String::new();
    for slide in slides {
        out.push_str(&format!("Slide {} ({})\n", slide.slide_index + 1, slide.path));
        if slide.issues.is_empty() {
            out.push_str("  ok\n");
        }
        for issue in &slide.issues {
            out.push_str(&format!(
                "  [{}] {} {}: {}\n",
                issue.severity.as_str(),
                issue.kind.as_str(),
                issue.shape.as_deref().unwrap_or("slide"),
                issue.message
            ));
        }
    }
    out
}

fn slide_indices(slide: Option<usize>, count: usize) -> Result<Vec<usize>> {
    match slide {
        Some(0) => anyhow::bail!("Slide numbers start at 1"),
        Some(number) if number > count => {
            anyhow::bail!("Slide {} not found (deck has {})", number, count)
        }
        Some(number) => Ok(vec![number - 1]),
        None => Ok((0..count).collect()),
    }
}

fn render_inspection(slides: &[InspectedSlide]) -> String {
    let mut out = String::new();
    for slide in slides {
        out.push_str(&format!(
            "Slide {} ({})\n",
            slide.structure.slide_index + 1,
            slide.path
        ));
        if slide.structure.is_empty() {
            out.push_str("  (no text)\n");
        }
        for element in &slide.structure.elements {
            let role = slide
                .context
                .role(&element.id)
                .map(|r| format!(" [{}]", r.as_str()))
                .unwrap_or_default();
            match &element.content {
                ElementContent::Text { text } => out.push_str(&format!(
                    "  {} {}{}: {}\n",
                    element.id,
                    element.kind.as_str(),
                    role,
                    text.replace('\n', " / ")
                )),
                ElementContent::Bullets { bullets } => {
                    out.push_str(&format!(
                        "  {} {}{}:\n",
                        element.id,
                        element.kind.as_str(),
                        role
                    ));
                    for bullet in bullets {
                        out.push_str(&format!(
                            "    {}- {}\n",
                            "  ".repeat(bullet.level as usize),
                            bullet.text
                        ));
                    }
                }
            }
        }
    }
    out
}

fn print_report(report: &WorkflowReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            println!("mirrordeck v{}", crate::VERSION);
            print!("{}", report.summary());
            if report.warning_count() == 0 && !report.has_failures() {
                println!("Done.");
            }
        }
    }
    Ok(())
}

fn check_input(input: &Path) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    Ok(())
}
