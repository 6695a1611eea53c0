//! End-to-end emitter tests over the full front-end.

use rillc_par::parse_source;
use rillc_sem::analyze;
use rillc_util::Handler;

use crate::emit::{emit, CodegenError};
use crate::iet::Iet;
use crate::leb128::read_uleb;

fn compile(source: &str, iet_json: &str) -> Result<Vec<u8>, CodegenError> {
    let mut handler = Handler::new();
    let ast = parse_source(source, &mut handler);
    let iet = Iet::from_json(iet_json).expect("test IET must parse");
    let analysis = analyze(&ast, &iet.extern_sigs(), &mut handler);
    assert!(
        !handler.has_errors(),
        "front-end errors for {:?}: {:?}",
        source,
        handler.diagnostics()
    );
    emit(&ast, &analysis, &iet)
}

fn compile_ok(source: &str, iet_json: &str) -> Vec<u8> {
    compile(source, iet_json).expect("codegen should succeed")
}

/// Returns the raw payload of a section, without its entry count.
fn section_payload(module: &[u8], id: u8) -> Option<Vec<u8>> {
    let mut pos = 8;
    while pos < module.len() {
        let section = module[pos];
        pos += 1;
        let (len, used) = read_uleb(&module[pos..])?;
        pos += used;
        let payload = &module[pos..pos + len as usize];
        if section == id {
            return Some(payload.to_vec());
        }
        pos += len as usize;
    }
    None
}

fn contains_subsequence(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

const EXPORT_MAIN_I32: &str = r#"{
    "exports": [ { "field": "main", "associate": "main",
        "type": { "params": [], "return": ["i32"] } } ]
}"#;

#[test]
fn test_module_header() {
    let module = compile_ok("fn main() -> i32 { 0 as i32 }", EXPORT_MAIN_I32);
    assert_eq!(&module[0..4], b"\0asm");
    assert_eq!(&module[4..8], &[0x01, 0x00, 0x00, 0x00]);
}

#[test]
fn test_expression_body_bytes() {
    // 1 + 2 * 3 lowers to the post-order constant sequence with mul
    // before add.
    let module = compile_ok("fn main() -> i32 { return (1 + 2 * 3) as i32; }", EXPORT_MAIN_I32);
    let code = section_payload(&module, 10).expect("code section");
    let expected = [0x41, 0x01, 0x41, 0x02, 0x41, 0x03, 0x6c, 0x6a];
    assert!(
        contains_subsequence(&code, &expected),
        "code section {:02x?} lacks {:02x?}",
        code,
        expected
    );
}

#[test]
fn test_sections_in_order_and_nonempty_only() {
    let module = compile_ok("fn main() -> i32 { 7i32 }", EXPORT_MAIN_I32);
    let mut ids = Vec::new();
    let mut pos = 8;
    while pos < module.len() {
        ids.push(module[pos]);
        pos += 1;
        let (len, used) = read_uleb(&module[pos..]).unwrap();
        pos += used + len as usize;
    }
    // Type, Function, Export, Code; no Import/Table/Memory sections.
    assert_eq!(ids, vec![1, 3, 7, 10]);
}

#[test]
fn test_export_entry_present() {
    let module = compile_ok("fn main() -> i32 { 1i32 }", EXPORT_MAIN_I32);
    let exports = section_payload(&module, 7).unwrap();
    // count 1, name "main", kind function, index 0
    assert_eq!(exports[0], 1);
    assert_eq!(exports[1], 4);
    assert_eq!(&exports[2..6], b"main");
    assert_eq!(exports[6], 0x00);
    assert_eq!(exports[7], 0x00);
}

#[test]
fn test_import_shifts_function_indices() {
    let iet = r#"{
        "imports": [ { "module": "env", "field": "print", "associate": "print",
            "type": { "params": ["i32"], "return": [] } } ],
        "exports": [ { "field": "main", "associate": "main",
            "type": { "params": [], "return": [] } } ]
    }"#;
    let module = compile_ok("fn main() { print(42i32); }", iet);

    // The import section exists and the export references function 1.
    assert!(section_payload(&module, 2).is_some());
    let exports = section_payload(&module, 7).unwrap();
    assert_eq!(*exports.last().unwrap(), 0x01);

    // The call site targets import index 0.
    let code = section_payload(&module, 10).unwrap();
    assert!(contains_subsequence(&code, &[0x10, 0x00]));
}

#[test]
fn test_unmatched_export_is_fatal() {
    let err = compile("fn helper() -> i32 { 1i32 }", EXPORT_MAIN_I32).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::UnmatchedExport { field } if field == "main"
    ));
}

#[test]
fn test_export_signature_mismatch_is_fatal() {
    let err = compile("fn main() -> i64 { 1i64 }", EXPORT_MAIN_I32).unwrap_err();
    assert!(matches!(err, CodegenError::ExportSignatureMismatch { .. }));
}

#[test]
fn test_locals_and_param_moves() {
    let iet = r#"{
        "exports": [ { "field": "add", "associate": "add",
            "type": { "params": ["i32", "i32"], "return": ["i32"] } } ]
    }"#;
    let module = compile_ok("fn add(x: i32, y: i32) -> i32 { return x + y; }", iet);
    let code = section_payload(&module, 10).unwrap();

    // Both parameters are moved into their binding slots at entry.
    let moves = [0x20, 0x00, 0x21, 0x02, 0x20, 0x01, 0x21, 0x03];
    assert!(
        contains_subsequence(&code, &moves),
        "code {:02x?} lacks parameter moves",
        code
    );
    // The addition reads the binding slots.
    assert!(contains_subsequence(&code, &[0x20, 0x02, 0x20, 0x03, 0x6a]));
}

#[test]
fn test_while_loop_shape() {
    let iet = r#"{
        "exports": [ { "field": "count", "associate": "count",
            "type": { "params": [], "return": ["i32"] } } ]
    }"#;
    let module = compile_ok(
        "fn count() -> i32 { let mut x: i32 = 0i32; while x < 10i32 { x = x + 1i32; } return x; }",
        iet,
    );
    let code = section_payload(&module, 10).unwrap();

    // block empty; loop empty
    assert!(contains_subsequence(&code, &[0x02, 0x40, 0x03, 0x40]));
    // condition exit: i32.eqz; br_if 1
    assert!(contains_subsequence(&code, &[0x45, 0x0d, 0x01]));
    // back edge and the two ends
    assert!(contains_subsequence(&code, &[0x0c, 0x00, 0x0b, 0x0b]));
}

#[test]
fn test_infinite_loop_with_break_value() {
    let iet = r#"{
        "exports": [ { "field": "f", "associate": "f",
            "type": { "params": [], "return": ["i32"] } } ]
    }"#;
    let module = compile_ok("fn f() -> i32 { loop { break 5i32; } }", iet);
    let code = section_payload(&module, 10).unwrap();

    // The break target block carries the loop's value type.
    assert!(contains_subsequence(&code, &[0x02, 0x7f, 0x03, 0x40]));
    // Value then br 1.
    assert!(contains_subsequence(&code, &[0x41, 0x05, 0x0c, 0x01]));
}

#[test]
fn test_break_depth_accounts_for_if_nesting() {
    let iet = r#"{
        "exports": [ { "field": "f", "associate": "f",
            "type": { "params": [], "return": ["i32"] } } ]
    }"#;
    let module = compile_ok(
        "fn f() -> i32 { let mut x: i32 = 0i32; \
         while true { if x > 3i32 { break; } x = x + 1i32; } \
         return x; }",
        iet,
    );
    let code = section_payload(&module, 10).unwrap();
    // Inside one `if` the break must branch two labels up.
    assert!(contains_subsequence(&code, &[0x0c, 0x02]));
}

#[test]
fn test_float_literals_are_raw_le_bits() {
    let iet = r#"{
        "exports": [ { "field": "f", "associate": "f",
            "type": { "params": [], "return": ["f32"] } } ]
    }"#;
    let module = compile_ok("fn f() -> f32 { 1.5f32 }", iet);
    let code = section_payload(&module, 10).unwrap();
    let mut expected = vec![0x43];
    expected.extend_from_slice(&1.5f32.to_le_bytes());
    assert!(contains_subsequence(&code, &expected));
}

#[test]
fn test_unsigned_division_uses_unsigned_opcode() {
    let iet = r#"{
        "exports": [ { "field": "f", "associate": "f",
            "type": { "params": ["u32", "u32"], "return": ["u32"] } } ]
    }"#;
    let module = compile_ok("fn f(a: u32, b: u32) -> u32 { return a / b; }", iet);
    let code = section_payload(&module, 10).unwrap();
    assert!(contains_subsequence(&code, &[0x6e])); // i32.div_u
}

#[test]
fn test_compound_assignment_lowering() {
    let iet = r#"{
        "exports": [ { "field": "f", "associate": "f",
            "type": { "params": [], "return": ["i32"] } } ]
    }"#;
    let module = compile_ok(
        "fn f() -> i32 { let mut x: i32 = 4i32; x += 2i32; return x; }",
        iet,
    );
    let code = section_payload(&module, 10).unwrap();
    // local.get x; i32.const 2; i32.add; local.set x
    assert!(contains_subsequence(&code, &[0x20, 0x00, 0x41, 0x02, 0x6a, 0x21, 0x00]));
}

#[test]
fn test_statement_values_are_dropped() {
    let iet = r#"{
        "exports": [ { "field": "f", "associate": "f",
            "type": { "params": [], "return": ["i32"] } } ]
    }"#;
    let module = compile_ok("fn f() -> i32 { 1i32 + 2i32; return 0i32; }", iet);
    let code = section_payload(&module, 10).unwrap();
    assert!(contains_subsequence(&code, &[0x6a, 0x1a])); // add then drop
}

#[test]
fn test_struct_value_aborts_codegen() {
    let source = "struct P { x: i32, y: i32 }\n\
                  fn main() -> i32 { let p = P { x: 1i32, y: 2i32 }; return p.x; }";
    let err = compile(source, EXPORT_MAIN_I32).unwrap_err();
    assert!(matches!(err, CodegenError::NoValueType { .. }));
}

#[test]
fn test_cast_emits_conversion() {
    let iet = r#"{
        "exports": [ { "field": "f", "associate": "f",
            "type": { "params": ["i32"], "return": ["i64"] } } ]
    }"#;
    let module = compile_ok("fn f(x: i32) -> i64 { return x as i64; }", iet);
    let code = section_payload(&module, 10).unwrap();
    assert!(contains_subsequence(&code, &[0xac])); // i64.extend_i32_s
}

#[test]
fn test_const_item_is_inlined() {
    let source = "const LIMIT: i32 = 41i32;\nfn main() -> i32 { return LIMIT + 1i32; }";
    let module = compile_ok(source, EXPORT_MAIN_I32);
    let code = section_payload(&module, 10).unwrap();
    assert!(contains_subsequence(&code, &[0x41, 0x29, 0x41, 0x01, 0x6a]));
}

#[test]
fn test_scenario_add_function() {
    let iet = r#"{
        "exports": [ { "field": "add", "associate": "add",
            "type": { "params": ["i32", "i32"], "return": ["i32"] } } ]
    }"#;
    let module = compile_ok("fn add(x: i32, y: i32) -> i32 { return x + y; }", iet);

    // Type section declares (i32, i32) -> i32.
    let types = section_payload(&module, 1).unwrap();
    assert_eq!(types, vec![0x01, 0x60, 0x02, 0x7f, 0x7f, 0x01, 0x7f]);

    // Export section exports "add" at function index 0.
    let exports = section_payload(&module, 7).unwrap();
    assert_eq!(&exports[2..5], b"add");
}
