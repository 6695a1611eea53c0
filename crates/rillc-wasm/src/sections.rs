//! Module section assembly.
//!
//! Sections are accumulated entry by entry while the emitter runs, then
//! serialized in the fixed order `Type, Import, Function, Table, Memory,
//! Global, Export, Start, Element, Code, Data`. Each non-empty section is
//! written as `id | LEB(payload_len) | LEB(entry_count) | entries`;
//! sections with no entries are omitted.

use crate::leb128::{write_sleb, write_uleb};
use crate::opcodes::{ValType, FUNC_TYPE_CODE};

/// Section identifiers in serialization order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionId {
    Type = 1,
    Import = 2,
    Function = 3,
    Table = 4,
    Memory = 5,
    Global = 6,
    Export = 7,
    Start = 8,
    Element = 9,
    Code = 10,
    Data = 11,
}

const SECTION_ORDER: [SectionId; 11] = [
    SectionId::Type,
    SectionId::Import,
    SectionId::Function,
    SectionId::Table,
    SectionId::Memory,
    SectionId::Global,
    SectionId::Export,
    SectionId::Start,
    SectionId::Element,
    SectionId::Code,
    SectionId::Data,
];

/// Incremental builder for a WebAssembly module.
pub struct ModuleBuilder {
    counts: [u32; 12],
    entries: [Vec<u8>; 12],
}

impl ModuleBuilder {
    pub fn new() -> Self {
        Self {
            counts: [0; 12],
            entries: Default::default(),
        }
    }

    fn bump(&mut self, section: SectionId) -> u32 {
        let index = self.counts[section as usize];
        self.counts[section as usize] = index + 1;
        index
    }

    fn section_mut(&mut self, section: SectionId) -> &mut Vec<u8> {
        &mut self.entries[section as usize]
    }

    /// Adds a function signature to the Type section, returning its index.
    pub fn add_type(&mut self, params: &[ValType], results: &[ValType]) -> u32 {
        let index = self.bump(SectionId::Type);
        let section = self.section_mut(SectionId::Type);
        write_sleb(section, FUNC_TYPE_CODE);
        write_uleb(section, params.len() as u64);
        for &param in params {
            write_sleb(section, param.code());
        }
        write_uleb(section, results.len() as u64);
        for &result in results {
            write_sleb(section, result.code());
        }
        index
    }

    /// Adds a function import, returning its import index.
    pub fn add_import_func(&mut self, module: &str, field: &str, type_index: u32) -> u32 {
        let index = self.bump(SectionId::Import);
        let section = self.section_mut(SectionId::Import);
        write_uleb(section, module.len() as u64);
        section.extend_from_slice(module.as_bytes());
        write_uleb(section, field.len() as u64);
        section.extend_from_slice(field.as_bytes());
        section.push(0x00); // imported kind: function
        write_uleb(section, type_index as u64);
        index
    }

    /// Adds a defined function: a Function-section type reference plus a
    /// Code-section body. `locals` holds one `(type, count)` group per value
    /// type actually used. Returns the local function index.
    pub fn add_func(&mut self, type_index: u32, locals: &[(ValType, u32)], code: &[u8]) -> u32 {
        let index = self.bump(SectionId::Function);
        let section = self.section_mut(SectionId::Function);
        write_uleb(section, type_index as u64);

        let mut body = Vec::new();
        write_uleb(&mut body, locals.len() as u64);
        for &(ty, count) in locals {
            write_uleb(&mut body, count as u64);
            write_sleb(&mut body, ty.code());
        }
        body.extend_from_slice(code);
        body.push(0x0b); // end

        self.bump(SectionId::Code);
        let section = self.section_mut(SectionId::Code);
        write_uleb(section, body.len() as u64);
        section.extend_from_slice(&body);

        index
    }

    /// Adds a function export under `field`.
    pub fn add_export_func(&mut self, field: &str, func_index: u32) {
        self.bump(SectionId::Export);
        let section = self.section_mut(SectionId::Export);
        write_uleb(section, field.len() as u64);
        section.extend_from_slice(field.as_bytes());
        section.push(0x00); // exported kind: function
        write_uleb(section, func_index as u64);
    }

    /// Serializes the module: magic, version, then every non-empty section.
    pub fn finish(self) -> Vec<u8> {
        let mut out = vec![0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];

        for section in SECTION_ORDER {
            let count = self.counts[section as usize];
            if count == 0 {
                continue;
            }
            let entries = &self.entries[section as usize];

            let mut payload = Vec::new();
            write_uleb(&mut payload, count as u64);
            payload.extend_from_slice(entries);

            write_uleb(&mut out, section as u64);
            write_uleb(&mut out, payload.len() as u64);
            out.extend_from_slice(&payload);
        }

        out
    }
}

impl Default for ModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_module_is_header_only() {
        let module = ModuleBuilder::new().finish();
        assert_eq!(
            module,
            vec![0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_type_indices_are_sequential() {
        let mut builder = ModuleBuilder::new();
        assert_eq!(builder.add_type(&[], &[]), 0);
        assert_eq!(builder.add_type(&[ValType::I32], &[ValType::I32]), 1);
    }

    #[test]
    fn test_single_function_module_layout() {
        let mut builder = ModuleBuilder::new();
        let ty = builder.add_type(&[], &[ValType::I32]);
        // i32.const 7
        let func = builder.add_func(ty, &[], &[0x41, 0x07]);
        builder.add_export_func("seven", func);
        let module = builder.finish();

        // Header
        assert_eq!(&module[0..8], &[0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00]);

        // Type section: id 1, len 5, count 1, func () -> (i32)
        assert_eq!(&module[8..15], &[0x01, 0x05, 0x01, 0x60, 0x00, 0x01, 0x7f]);

        // Function section: id 3, len 2, count 1, type 0
        assert_eq!(&module[15..19], &[0x03, 0x02, 0x01, 0x00]);

        // Export section: id 7, len 9, count 1, "seven", kind 0, func 0
        assert_eq!(
            &module[19..30],
            &[0x07, 0x09, 0x01, 0x05, b's', b'e', b'v', b'e', b'n', 0x00, 0x00]
        );

        // Code section: id 10, len 6, count 1, body size 4, no locals,
        // i32.const 7, end
        assert_eq!(&module[30..], &[0x0a, 0x06, 0x01, 0x04, 0x00, 0x41, 0x07, 0x0b]);
    }

    #[test]
    fn test_import_entry_layout() {
        let mut builder = ModuleBuilder::new();
        let ty = builder.add_type(&[ValType::I32], &[]);
        assert_eq!(builder.add_import_func("env", "print", ty), 0);
        let module = builder.finish();

        // After the type section comes the import section:
        // id 2, payload len, count 1, "env", "print", kind 0, type 0
        let import_section = &module[8 + 7..];
        assert_eq!(import_section[0], 0x02);
        assert_eq!(import_section[2], 0x01); // one import
        assert_eq!(import_section[3], 0x03); // module name length
        assert_eq!(&import_section[4..7], b"env");
        assert_eq!(import_section[7], 0x05); // field name length
        assert_eq!(&import_section[8..13], b"print");
        assert_eq!(import_section[13], 0x00); // function kind
    }

    #[test]
    fn test_locals_grouped_by_type() {
        let mut builder = ModuleBuilder::new();
        let ty = builder.add_type(&[], &[]);
        builder.add_func(ty, &[(ValType::I32, 2), (ValType::I64, 1)], &[]);
        let module = builder.finish();

        // Code section: id, payload len, count 1, body size 6, two local
        // groups (2 x i32, 1 x i64), end.
        let code = &module[module.len() - 10..];
        assert_eq!(
            code,
            &[0x0a, 0x08, 0x01, 0x06, 0x02, 0x02, 0x7f, 0x01, 0x7e, 0x0b]
        );
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let mut builder = ModuleBuilder::new();
        builder.add_type(&[], &[]);
        let module = builder.finish();
        // Only the type section follows the header; no import/export/code.
        assert_eq!(module[8], 0x01);
        assert_eq!(module.len(), 8 + 2 + 4);
    }
}
