//! Semantic type representations.
//!
//! Types are interned in a [`TypeTable`] and referenced by [`TypeId`].
//! Equality is structural for tuples, references, arrays, and function
//! types, nominal for structs, and tag-based for scalars. The
//! pointer-width aliases were already folded to `u64`/`i64` by the lexer's
//! scalar tags, so they never appear here.

use indexmap::IndexMap;
use rillc_lex::ScalarTy;
use rillc_util::{define_idx, IndexVec};

define_idx!(
    /// Identity of an interned type.
    TypeId
);

/// A semantic type.
#[derive(Clone, Debug)]
pub enum Type {
    /// Built-in scalar.
    Scalar(ScalarTy),
    /// Function signature. Parameter names are kept for diagnostics only.
    Func {
        params: Vec<(String, TypeId)>,
        ret: TypeId,
    },
    /// Ordered element list; empty means unit.
    Tuple(Vec<TypeId>),
    /// Record struct, nominal. Field order follows the declaration.
    Struct {
        name: String,
        fields: IndexMap<String, TypeId>,
    },
    /// Tuple struct, nominal.
    TupleStruct { name: String, elems: Vec<TypeId> },
    /// Reference with mutability.
    Ref { mutable: bool, inner: TypeId },
    /// Fixed-length array.
    Array { elem: TypeId, len: u64 },
    /// Placeholder produced by earlier errors; equal to everything so one
    /// mistake does not cascade.
    Error,
}

/// Interner and equality oracle for types.
#[derive(Debug)]
pub struct TypeTable {
    types: IndexVec<TypeId, Type>,
    scalars: Vec<(ScalarTy, TypeId)>,
    error: TypeId,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut types = IndexVec::new();
        let all_scalars = [
            ScalarTy::Bool,
            ScalarTy::Char,
            ScalarTy::U8,
            ScalarTy::U16,
            ScalarTy::U32,
            ScalarTy::U64,
            ScalarTy::I8,
            ScalarTy::I16,
            ScalarTy::I32,
            ScalarTy::I64,
            ScalarTy::F32,
            ScalarTy::F64,
            ScalarTy::Str,
            ScalarTy::ByteStr,
            ScalarTy::Void,
        ];
        let mut scalars = Vec::with_capacity(all_scalars.len());
        for tag in all_scalars {
            let id = types.push(Type::Scalar(tag));
            scalars.push((tag, id));
        }
        let error = types.push(Type::Error);
        Self {
            types,
            scalars,
            error,
        }
    }

    /// The pre-interned id of a scalar type.
    pub fn scalar(&self, tag: ScalarTy) -> TypeId {
        self.scalars
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, id)| *id)
            .expect("every scalar is pre-interned")
    }

    /// The unit/statement type.
    pub fn void(&self) -> TypeId {
        self.scalar(ScalarTy::Void)
    }

    pub fn bool(&self) -> TypeId {
        self.scalar(ScalarTy::Bool)
    }

    /// The error placeholder type.
    pub fn error(&self) -> TypeId {
        self.error
    }

    /// Interns a new composite type.
    pub fn add(&mut self, ty: Type) -> TypeId {
        self.types.push(ty)
    }

    /// Replaces a placeholder installed during scope building with its
    /// elaborated form. Used for struct and function types whose bodies are
    /// only known in the second pass.
    pub fn replace(&mut self, id: TypeId, ty: Type) {
        self.types[id] = ty;
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id]
    }

    /// The scalar tag of `id`, if it is a scalar.
    pub fn as_scalar(&self, id: TypeId) -> Option<ScalarTy> {
        match self.types[id] {
            Type::Scalar(tag) => Some(tag),
            _ => None,
        }
    }

    /// True if `id` is the void scalar.
    pub fn is_void(&self, id: TypeId) -> bool {
        matches!(self.types[id], Type::Scalar(ScalarTy::Void))
    }

    /// Structural type equality.
    pub fn equal(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        match (&self.types[a], &self.types[b]) {
            (Type::Error, _) | (_, Type::Error) => true,
            (Type::Scalar(x), Type::Scalar(y)) => x == y,
            (Type::Tuple(xs), Type::Tuple(ys)) => {
                xs.len() == ys.len() && xs.iter().zip(ys).all(|(&x, &y)| self.equal(x, y))
            }
            (
                Type::Ref {
                    mutable: ma,
                    inner: ia,
                },
                Type::Ref {
                    mutable: mb,
                    inner: ib,
                },
            ) => ma == mb && self.equal(*ia, *ib),
            (
                Type::Array { elem: ea, len: la },
                Type::Array { elem: eb, len: lb },
            ) => la == lb && self.equal(*ea, *eb),
            (Type::Struct { name: na, .. }, Type::Struct { name: nb, .. }) => na == nb,
            (Type::TupleStruct { name: na, .. }, Type::TupleStruct { name: nb, .. }) => na == nb,
            (
                Type::Func {
                    params: pa,
                    ret: ra,
                },
                Type::Func {
                    params: pb,
                    ret: rb,
                },
            ) => {
                pa.len() == pb.len()
                    && self.equal(*ra, *rb)
                    && pa.iter().zip(pb).all(|((_, x), (_, y))| self.equal(*x, *y))
            }
            _ => false,
        }
    }

    /// Human-readable rendering for diagnostics.
    pub fn display(&self, id: TypeId) -> String {
        match &self.types[id] {
            Type::Scalar(tag) => tag.name().to_string(),
            Type::Func { params, ret } => {
                let params = params
                    .iter()
                    .map(|(_, t)| self.display(*t))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("fn({}) -> {}", params, self.display(*ret))
            }
            Type::Tuple(elems) if elems.is_empty() => "()".to_string(),
            Type::Tuple(elems) => {
                let elems = elems
                    .iter()
                    .map(|t| self.display(*t))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({})", elems)
            }
            Type::Struct { name, .. } => name.clone(),
            Type::TupleStruct { name, .. } => name.clone(),
            Type::Ref { mutable, inner } => {
                if *mutable {
                    format!("&mut {}", self.display(*inner))
                } else {
                    format!("&{}", self.display(*inner))
                }
            }
            Type::Array { elem, len } => format!("[{}; {}]", self.display(*elem), len),
            Type::Error => "{error}".to_string(),
        }
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_equality() {
        let table = TypeTable::new();
        assert!(table.equal(table.scalar(ScalarTy::I32), table.scalar(ScalarTy::I32)));
        assert!(!table.equal(table.scalar(ScalarTy::I32), table.scalar(ScalarTy::U32)));
    }

    #[test]
    fn test_tuple_structural_equality() {
        let mut table = TypeTable::new();
        let i32_ty = table.scalar(ScalarTy::I32);
        let bool_ty = table.scalar(ScalarTy::Bool);
        let a = table.add(Type::Tuple(vec![i32_ty, bool_ty]));
        let b = table.add(Type::Tuple(vec![i32_ty, bool_ty]));
        let c = table.add(Type::Tuple(vec![bool_ty, i32_ty]));
        assert!(table.equal(a, b));
        assert!(!table.equal(a, c));
    }

    #[test]
    fn test_reference_equality_includes_mutability() {
        let mut table = TypeTable::new();
        let i32_ty = table.scalar(ScalarTy::I32);
        let shared = table.add(Type::Ref {
            mutable: false,
            inner: i32_ty,
        });
        let shared2 = table.add(Type::Ref {
            mutable: false,
            inner: i32_ty,
        });
        let unique = table.add(Type::Ref {
            mutable: true,
            inner: i32_ty,
        });
        assert!(table.equal(shared, shared2));
        assert!(!table.equal(shared, unique));
    }

    #[test]
    fn test_struct_equality_is_nominal() {
        let mut table = TypeTable::new();
        let i32_ty = table.scalar(ScalarTy::I32);
        let mut fields_a = IndexMap::new();
        fields_a.insert("x".to_string(), i32_ty);
        let a = table.add(Type::Struct {
            name: "A".to_string(),
            fields: fields_a.clone(),
        });
        let a2 = table.add(Type::Struct {
            name: "A".to_string(),
            fields: IndexMap::new(),
        });
        let b = table.add(Type::Struct {
            name: "B".to_string(),
            fields: fields_a,
        });
        assert!(table.equal(a, a2));
        assert!(!table.equal(a, b));
    }

    #[test]
    fn test_array_equality_includes_length() {
        let mut table = TypeTable::new();
        let u8_ty = table.scalar(ScalarTy::U8);
        let a = table.add(Type::Array { elem: u8_ty, len: 4 });
        let b = table.add(Type::Array { elem: u8_ty, len: 4 });
        let c = table.add(Type::Array { elem: u8_ty, len: 8 });
        assert!(table.equal(a, b));
        assert!(!table.equal(a, c));
    }

    #[test]
    fn test_error_equals_everything() {
        let table = TypeTable::new();
        assert!(table.equal(table.error(), table.scalar(ScalarTy::I32)));
        assert!(table.equal(table.void(), table.error()));
    }

    #[test]
    fn test_display() {
        let mut table = TypeTable::new();
        let i32_ty = table.scalar(ScalarTy::I32);
        let tuple = table.add(Type::Tuple(vec![i32_ty, i32_ty]));
        assert_eq!(table.display(tuple), "(i32, i32)");
        let reference = table.add(Type::Ref {
            mutable: true,
            inner: i32_ty,
        });
        assert_eq!(table.display(reference), "&mut i32");
        assert_eq!(table.display(table.void()), "void");
    }
}
