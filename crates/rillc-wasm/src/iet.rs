//! Import/export table (IET) loading.
//!
//! The IET is a JSON document declaring the module's binding to its host:
//!
//! ```json
//! {
//!   "imports": [
//!     { "module": "env", "field": "print", "associate": "print",
//!       "type": { "params": ["i32"], "return": [] } }
//!   ],
//!   "exports": [
//!     { "field": "main", "associate": "main",
//!       "type": { "params": [], "return": ["i32"] } }
//!   ]
//! }
//! ```
//!
//! `field` is the wasm-level name; `associate` is the source-level name the
//! program uses. Import order fixes the function index space 0..I-1; export
//! order fixes the match order against locally-defined functions.

use serde::Deserialize;
use thiserror::Error;

use rillc_lex::ScalarTy;
use rillc_sem::ExternSig;

/// Errors from loading or validating the IET.
#[derive(Debug, Error)]
pub enum IetError {
    #[error("failed to parse import/export table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown type tag `{0}` in import/export table")]
    UnknownTypeTag(String),
    #[error("`{0}` declares more than one return value")]
    MultipleReturns(String),
}

/// A host function signature as declared in the IET.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IetFnType {
    pub params: Vec<ScalarTy>,
    /// `None` for a void function.
    pub ret: Option<ScalarTy>,
}

/// One imported function.
#[derive(Clone, Debug)]
pub struct IetImport {
    pub module: String,
    pub field: String,
    pub associate: String,
    pub ty: IetFnType,
}

/// One exported function.
#[derive(Clone, Debug)]
pub struct IetExport {
    pub field: String,
    pub associate: String,
    pub ty: IetFnType,
}

/// The parsed import/export table.
#[derive(Clone, Debug, Default)]
pub struct Iet {
    pub imports: Vec<IetImport>,
    pub exports: Vec<IetExport>,
}

#[derive(Deserialize)]
struct RawIet {
    #[serde(default)]
    imports: Vec<RawImport>,
    #[serde(default)]
    exports: Vec<RawExport>,
}

#[derive(Deserialize)]
struct RawImport {
    module: String,
    field: String,
    associate: String,
    #[serde(rename = "type")]
    ty: RawType,
}

#[derive(Deserialize)]
struct RawExport {
    field: String,
    associate: String,
    #[serde(rename = "type")]
    ty: RawType,
}

#[derive(Deserialize)]
struct RawType {
    #[serde(default)]
    params: Vec<String>,
    #[serde(default, rename = "return")]
    ret: Vec<String>,
}

fn parse_tag(tag: &str) -> Result<ScalarTy, IetError> {
    ScalarTy::from_name(tag).ok_or_else(|| IetError::UnknownTypeTag(tag.to_string()))
}

fn parse_type(raw: &RawType, owner: &str) -> Result<IetFnType, IetError> {
    let params = raw
        .params
        .iter()
        .map(|tag| parse_tag(tag))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rets = raw
        .ret
        .iter()
        .map(|tag| parse_tag(tag))
        .collect::<Result<Vec<_>, _>>()?;
    rets.retain(|&tag| tag != ScalarTy::Void);

    if rets.len() > 1 {
        return Err(IetError::MultipleReturns(owner.to_string()));
    }

    Ok(IetFnType {
        params,
        ret: rets.first().copied(),
    })
}

impl Iet {
    /// Parses the table from JSON text.
    pub fn from_json(text: &str) -> Result<Iet, IetError> {
        let raw: RawIet = serde_json::from_str(text)?;

        let imports = raw
            .imports
            .iter()
            .map(|imp| {
                Ok(IetImport {
                    module: imp.module.clone(),
                    field: imp.field.clone(),
                    associate: imp.associate.clone(),
                    ty: parse_type(&imp.ty, &imp.field)?,
                })
            })
            .collect::<Result<Vec<_>, IetError>>()?;

        let exports = raw
            .exports
            .iter()
            .map(|exp| {
                Ok(IetExport {
                    field: exp.field.clone(),
                    associate: exp.associate.clone(),
                    ty: parse_type(&exp.ty, &exp.field)?,
                })
            })
            .collect::<Result<Vec<_>, IetError>>()?;

        Ok(Iet { imports, exports })
    }

    /// The imports as extern signatures for the semantic analyzer, in
    /// function-index order.
    pub fn extern_sigs(&self) -> Vec<ExternSig> {
        self.imports
            .iter()
            .map(|imp| ExternSig {
                name: imp.associate.clone(),
                params: imp.ty.params.clone(),
                ret: imp.ty.ret.unwrap_or(ScalarTy::Void),
            })
            .collect()
    }
}
