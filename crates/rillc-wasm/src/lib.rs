//! rillc-wasm - WebAssembly Emission
//!
//! Lowers an analyzed translation unit into a binary WebAssembly 1.0
//! module: magic and version header, then the Type, Import, Function,
//! Export, and Code sections, all LEB128-encoded and assembled in the
//! fixed section order.
//!
//! The module's binding to its host comes from the JSON import/export
//! table ([`Iet`]). Imported functions occupy the first function indices
//! in declaration order; every declared export must match a defined
//! function by name and signature, and its function index is the import
//! count plus the function's position among the definitions.

pub mod emit;
pub mod iet;
pub mod leb128;
pub mod opcodes;
pub mod sections;

#[cfg(test)]
mod edge_cases;

pub use emit::{emit, CodegenError};
pub use iet::{Iet, IetError, IetExport, IetFnType, IetImport};
pub use opcodes::{binary_opcode, valtype_of, ValType};
pub use sections::{ModuleBuilder, SectionId};
