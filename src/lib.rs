//! # docstencil – document templates → drawing primitives
//!
//! This crate compiles hierarchical, data-bindable document templates into a
//! flat sequence of absolute-positioned drawing calls against a pluggable
//! rendering backend. The pipeline stages are:
//!
//! 1. **Migrate** – persisted JSON → current schema version ([`migrate`])
//! 2. **Model** – typed templates, blocks, and elements ([`model`])
//! 3. **Compile** – resolve block instances, substitute `{{ placeholders }}`,
//!    flatten to page-absolute coordinates, apply data bindings ([`layout`])
//! 4. **Dispatch** – map each leaf element onto backend drawing calls,
//!    including text auto-fit/wrap and table layout ([`render`])
//!
//! Backends implement the [`backend::Renderer`] capability set; the crate
//! ships a [`backend::RecordingRenderer`] that captures the op stream instead
//! of drawing, which also backs the `stencil` CLI.
//!
//! Compilation is a pure function of (template, block catalog, data): inputs
//! are never mutated, so one template may be shared across threads and
//! compiled concurrently with different data.

pub mod backend;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod layout;
pub mod migrate;
pub mod model;
pub mod render;
pub mod templates;

// Re-exports for convenience
pub use backend::{RecordingRenderer, Renderer};
pub use error::{SchemaError, UnresolvedBlockError};
pub use layout::LayoutEngine;
pub use migrate::{migrate, parse_block, parse_template, upgrade_template};
pub use model::{
    Block, BlockCatalog, BlockInstance, DataMap, Element, ElementKind, PageSize, Template,
    TemplateItem,
};
pub use render::{render_document, Exporter};
