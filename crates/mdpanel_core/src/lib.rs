//! Core library of the Markdown panel.
//!
//! This crate turns a Markdown document with `<!-- @include "..." -->`
//! directives into two HTML documents: one for an interactive display surface
//! and one portable export.
//!
//! # Modules
//!
//! - [`include`] - Directive scanning, target resolution and recursive expansion
//! - [`section`] - Section extraction by id, slug or class
//! - [`heading`] - ATX heading scanning, slugs and level shifting
//! - [`render`] - Markdown to HTML conversion
//! - [`assemble`] - Display and export document assembly
//! - [`pipeline`] - A complete render cycle
//! - [`display`] - Display surfaces and the update strategy between renders
//! - [`scheduler`] - Single-slot render scheduling
//! - [`watcher`] - Watching the document directory
//! - [`document`] - Supported file extensions
//! - [`assets`] - Embedded stylesheet and enhancement scripts

pub mod assemble;
pub mod assets;
pub mod display;
pub mod document;
pub mod heading;
pub mod include;
pub mod pipeline;
pub mod render;
pub mod scheduler;
pub mod section;
pub mod watcher;

pub use assemble::{AssembledDocument, DocumentAssembler};
pub use display::{diff_strategy, DiffStrategy, DisplayState, DisplaySurface, SurfaceError};
pub use document::SupportedExtensions;
pub use heading::{scan_headings, shift_heading_levels, slugify, Heading};
pub use include::{Diagnostic, IncludeDirective, IncludeExpander};
pub use pipeline::{ExportError, RenderPipeline, RenderResult};
pub use render::{MarkdownRenderer, PulldownRenderer, RenderError, RenderedHtml};
pub use scheduler::{RenderSupervisor, Submission};
pub use section::{extract_section, SectionSelector};
pub use watcher::{FileWatcher, WatchEvent, WatcherConfig};
