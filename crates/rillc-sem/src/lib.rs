//! rillc-sem - Semantic Analysis
//!
//! Three passes over the AST, each traversing the whole tree:
//!
//! 1. **Scope build** - creates the scope tree and declares struct and
//!    function symbols in their enclosing scope, so items can reference each
//!    other regardless of definition order.
//! 2. **Signature elaboration** - resolves the types written in struct
//!    fields, function parameters, and return positions, and declares
//!    parameters as bindings in the function body scope.
//! 3. **Expression typing** - computes a type for every expression, checks
//!    the typing rules, and declares `let` bindings at their statement.
//!
//! The AST itself is never mutated. All results live in an [`Analysis`]
//! value whose side-tables are keyed by [`rillc_par::NodeId`]; the
//! WebAssembly emitter consumes them read-only. Errors are collected into
//! the shared handler and analysis continues, so one ill-typed expression
//! does not hide the problems after it.

mod analysis;
#[cfg(test)]
mod edge_cases;
mod scope;
mod typeck;
mod types;

pub use analysis::{analyze, Analysis, ExternSig};
pub use scope::{Scope, ScopeId, ScopeKind, ScopeTree, Symbol, SymbolId, SymbolKind};
pub use types::{Type, TypeId, TypeTable};
