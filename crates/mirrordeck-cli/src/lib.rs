//! mirrordeck CLI - Command-line interface library
//!
//! This library provides the CLI functionality for mirrordeck:
//! - Translate: translate a deck and convert it to right-to-left
//! - Inspect: show the text elements the parser finds on each slide
//! - Mirror: right-to-left conversion without translation
//! - Apply: convert using translations prepared in a JSON file
//! - Check: report right-to-left rendering risks in a deck
//!
//! # Library Usage
//!
//! ```ignore
//! use mirrordeck_cli::{mirror_command, Settings};
//!
//! let settings = Settings::default();
//! let report = mirror_command(&input, &output, &settings)?;
//! println!("{}", report.summary());
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Translate with an offline glossary
//! mirrordeck translate deck.pptx --glossary terms.toml
//!
//! # Translate through a chat-completions API
//! MIRRORDECK_API_KEY=... mirrordeck translate deck.pptx --provider chat
//!
//! # Show what would be translated
//! mirrordeck inspect deck.pptx --format json
//!
//! # Look for leftover rendering problems
//! mirrordeck check deck_rtl.pptx
//! ```

pub mod app;
pub mod config;
pub mod workflow;

// Re-export main entry point and types
pub use app::{
    apply_command, check_command, init_tracing, inspect_command, load_translations,
    mirror_command, translate_command, CheckedSlide,
};
pub use app::{run_cli, LayoutPolicyArg, OutputFormat};
pub use config::{ErrorPolicy, ProviderKind, Settings};
pub use workflow::{SlideReport, TranslationSource, Workflow, WorkflowReport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
