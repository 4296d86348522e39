//! # mirrordeck-translate
//!
//! Translation providers for mirrordeck.
//!
//! Every provider implements [`Translator`]. The workflow hands it one
//! parsed slide at a time together with the slide's [`ContextMap`] and
//! gets back a [`TranslationResult`] keyed by element id.
//!
//! ## Providers
//!
//! - [`GlossaryTranslator`]: offline, exact-match table from TOML or JSON
//! - `ChatTranslator` (feature `http`, on by default): one
//!   OpenAI-compatible chat-completions request per slide
//!
//! ## Example
//!
//! ```rust,ignore
//! use mirrordeck_translate::{GlossaryTranslator, Translator};
//! use mirrordeck_pptx::ContextMap;
//!
//! let glossary = GlossaryTranslator::from_path("terms.toml")?;
//! let translations = glossary.translate_slide(&slide, &ContextMap::build(&slide))?;
//! ```
//!
//! [`ContextMap`]: mirrordeck_pptx::ContextMap
//! [`TranslationResult`]: mirrordeck_pptx::TranslationResult

#[cfg(feature = "http")]
pub mod chat;
pub mod error;
pub mod glossary;
pub mod translator;

#[cfg(feature = "http")]
pub use chat::{ChatConfig, ChatTranslator, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use error::{Result, TranslateError};
pub use glossary::GlossaryTranslator;
pub use translator::{translate_layout_texts, Translator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
