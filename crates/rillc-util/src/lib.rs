//! rillc-util - Core Utilities and Foundation Types
//!
//! This crate provides the foundation shared by every stage of the rillc
//! compiler pipeline:
//!
//! - [`Span`] - source positions attached to tokens, AST nodes, and
//!   diagnostics
//! - [`Diagnostic`] / [`Handler`] - the collect-don't-abort error sink that
//!   every pass reports into
//! - [`Idx`] / [`IndexVec`] - typed index vectors used for node, scope,
//!   symbol, and type identifiers
//!
//! All back-references inside the compiler (symbol tables pointing at nodes,
//! nodes pointing at types) are represented as typed indices into vectors
//! owned by a single pass output, so no ownership cycles exist anywhere in
//! the pipeline.

mod diagnostic;
mod index_vec;
mod span;

pub use diagnostic::{Diagnostic, Handler, Level, Stage};
pub use index_vec::{Idx, IndexVec};
pub use span::Span;

// Re-export commonly used hash collections
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
