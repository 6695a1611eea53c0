//! Scope tree and symbols.

use rillc_util::{define_idx, FxHashMap, IndexVec};

use crate::types::TypeId;

define_idx!(
    /// Identity of a scope in the [`ScopeTree`].
    ScopeId
);

define_idx!(
    /// Identity of a declared symbol.
    SymbolId
);

/// What kind of region a scope covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    /// The translation unit.
    Root,
    /// A function body.
    Function,
    /// A braced block.
    Block,
}

/// A single scope: bindings plus a parent link.
#[derive(Debug)]
pub struct Scope {
    pub bindings: FxHashMap<String, SymbolId>,
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
}

/// A declared name.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
}

#[derive(Clone, Debug)]
pub enum SymbolKind {
    /// A `let` binding, function parameter, or constant item.
    Let { mutable: bool, ty: TypeId },
    /// A function (defined in source or imported through the IET).
    Func { ty: TypeId },
    /// A struct type name.
    Struct { ty: TypeId },
}

impl Symbol {
    /// The type carried by this symbol, whatever its kind.
    pub fn type_id(&self) -> TypeId {
        match self.kind {
            SymbolKind::Let { ty, .. } => ty,
            SymbolKind::Func { ty } => ty,
            SymbolKind::Struct { ty } => ty,
        }
    }
}

/// The scope tree for one translation unit.
///
/// Lookup walks parent links until a binding is found or the root is
/// passed. An identifier is unique within a single scope.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: IndexVec<ScopeId, Scope>,
    root: ScopeId,
}

impl ScopeTree {
    /// Creates a tree containing only the root scope.
    pub fn new() -> Self {
        let mut scopes = IndexVec::new();
        let root = scopes.push(Scope {
            bindings: FxHashMap::default(),
            parent: None,
            kind: ScopeKind::Root,
        });
        Self { scopes, root }
    }

    /// The root scope.
    pub fn root(&self) -> ScopeId {
        self.root
    }

    /// Creates a child scope.
    pub fn push(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        self.scopes.push(Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
            kind,
        })
    }

    /// Declares `name` in `scope`. Returns the previously declared symbol
    /// if the name is already taken in this scope.
    pub fn declare(&mut self, scope: ScopeId, name: &str, symbol: SymbolId) -> Result<(), SymbolId> {
        match self.scopes[scope].bindings.get(name) {
            Some(&existing) => Err(existing),
            None => {
                self.scopes[scope].bindings.insert(name.to_string(), symbol);
                Ok(())
            }
        }
    }

    /// Resolves `name` starting at `scope` and walking outwards.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = scope;
        loop {
            let s = &self.scopes[current];
            if let Some(&symbol) = s.bindings.get(name) {
                return Some(symbol);
            }
            current = s.parent?;
        }
    }

    /// Resolves `name` in `scope` alone, without walking parents.
    pub fn resolve_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scopes[scope].bindings.get(name).copied()
    }

    /// The scope record itself.
    pub fn get(&self, scope: ScopeId) -> &Scope {
        &self.scopes[scope]
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rillc_util::Idx;

    fn sym(n: usize) -> SymbolId {
        SymbolId::from_usize(n)
    }

    #[test]
    fn test_declare_and_resolve() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.declare(root, "x", sym(0)).unwrap();
        assert_eq!(tree.resolve(root, "x"), Some(sym(0)));
        assert_eq!(tree.resolve(root, "y"), None);
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.declare(root, "x", sym(0)).unwrap();
        assert_eq!(tree.declare(root, "x", sym(1)), Err(sym(0)));
    }

    #[test]
    fn test_lookup_walks_parents() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let inner = tree.push(root, ScopeKind::Block);
        tree.declare(root, "outer", sym(0)).unwrap();
        assert_eq!(tree.resolve(inner, "outer"), Some(sym(0)));
    }

    #[test]
    fn test_shadowing_across_scopes() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let inner = tree.push(root, ScopeKind::Block);
        tree.declare(root, "x", sym(0)).unwrap();
        tree.declare(inner, "x", sym(1)).unwrap();
        assert_eq!(tree.resolve(inner, "x"), Some(sym(1)));
        assert_eq!(tree.resolve(root, "x"), Some(sym(0)));
    }

    #[test]
    fn test_resolve_local_does_not_walk() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let inner = tree.push(root, ScopeKind::Function);
        tree.declare(root, "x", sym(0)).unwrap();
        assert_eq!(tree.resolve_local(inner, "x"), None);
    }
}
