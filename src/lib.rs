//! # inlay-core
//!
//! A library for assembling document networks from files connected by
//! embedded references and rendering them into a target textual format.
//!
//! A root file is loaded, every reference it contains is resolved to another
//! file, that file is parsed and its own references followed recursively,
//! and the result is a validated, acyclic [`Network`](network::Network) of
//! content nodes spanning several textual formats: structured data (JSON,
//! YAML), prose with links (Markdown), and template text with comment
//! include directives. The network renders either **file-first** (references
//! preserved as pointers) or **full** (every reference recursively replaced
//! by the rendered content of its target).
//!
//! ## Quick Start
//!
//! ```rust
//! use inlay_core::{
//!     build_network,
//!     properties::DocFormat,
//!     render::{render_network, RenderMode},
//!     store::MemStore,
//! };
//!
//! # fn main() -> Result<(), inlay_core::InlayError> {
//! let store = MemStore::new()
//!     .with("a.md", "Intro: [b](b.md)")
//!     .with("b.md", "hello");
//!
//! let network = build_network(&store, "a.md")?;
//! assert_eq!(network.len(), 2);
//!
//! let full = render_network(&network, DocFormat::Markdown, RenderMode::Full)?;
//! assert_eq!(full, "Intro: hello");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`codec`]: format-aware parsers ([`codec::DocCodec`],
//!   [`codec::CodecRegistry`]) — detection, canonical content, reference
//!   extraction.
//! - [`resolver`]: pluggable locator-to-location resolution
//!   ([`resolver::RefResolver`]).
//! - [`builder`]: depth-first network construction with cycle detection and
//!   depth/size ceilings ([`builder::NetworkBuilder`]).
//! - [`render`]: format-polymorphic reference substitution
//!   ([`render::RefStrategy`]) and serialization
//!   ([`render::render_network`]).
//! - [`store`]: the backing-store contract ([`store::DocStore`]) — the
//!   core's only I/O dependency.
//!
//! The core is single-threaded and synchronous. A completed network is
//! immutable plain data, safe to read from multiple call sites; builders are
//! not reentrant and concurrent builds should use separate instances.
//! Version resolution, `{{name}}` variable substitution, and snapshot export
//! are collaborators layered above this crate.

pub mod builder;
pub mod codec;
pub mod error;
pub mod network;
pub mod paths;
pub mod properties;
pub mod render;
pub mod resolver;
pub mod store;

pub use builder::{build_network, BuildLimits, NetworkBuilder};
pub use error::*;
pub use network::Network;
pub use render::{render_network, RenderMode, Renderer};
