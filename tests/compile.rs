use lllc::asm;
use lllc::lll::{self, Compiler};
use lllc::util::ToHexString;

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_literal_01() {
    check("42", "0x602a");
}

#[test]
fn test_literal_02() {
    // Zero still pushes one byte.
    check("0", "0x6000");
}

#[test]
fn test_literal_03() {
    check("256", "0x610100");
}

#[test]
fn test_literal_04() {
    check("0x10000", "0x62010000");
}

#[test]
fn test_literal_05() {
    // A negative literal encodes as its two's complement.
    let ff = "ff".repeat(32);
    check("-1", &format!("0x7f{ff}"));
}

// ============================================================================
// Opcodes
// ============================================================================

#[test]
fn test_opcode_01() {
    // Children are evaluated in reverse, so the first argument ends
    // up on top of the stack.
    check("(add 1 2)", "0x6002600101");
}

#[test]
fn test_opcode_02() {
    check("(mstore 64 7)", "0x6007604052");
}

#[test]
fn test_opcode_03() {
    check("(caller)", "0x33");
}

// ============================================================================
// Conditionals
// ============================================================================

#[test]
fn test_if_01() {
    // The label resolves to the byte offset of the JUMPDEST itself.
    check("(if 1 (seq))", "0x600115610007575b");
}

#[test]
fn test_if_02() {
    check("(if 0 1 2)", "0x60001561000d576001610010565b60025b");
}

#[test]
fn test_assert_01() {
    check("(assert 1)", "0x6001155857");
}

// ============================================================================
// Sequencing & Bindings
// ============================================================================

#[test]
fn test_seq_01() {
    // Intermediate values are popped; the trailing one survives.
    check("(seq 1 2)", "0x6001506002");
}

#[test]
fn test_seq_02() {
    check("(seq (pass) 3)", "0x6003");
}

#[test]
fn test_with_01() {
    check("(with x 5 (add x 1))", "0x6005600181019050");
}

#[test]
fn test_with_02() {
    // Nested bindings resolve to distinct DUP offsets.
    check(
        "(with x 5 (with y (add x 1) (add x y)))",
        "0x60056001810180820190509050",
    );
}

#[test]
fn test_with_03() {
    // Shadowing: the inner binding wins.
    check("(with x 1 (with x 2 x))", "0x600160028090509050");
}

#[test]
fn test_set_01() {
    check("(with x 5 (seq (set x 7) x))", "0x600560079050809050");
}

// ============================================================================
// Loops
// ============================================================================

#[test]
fn test_repeat_01() {
    check(
        "(repeat 0 0 3 (pass))",
        "0x600060006003818352015b815160010180835281141561000a575b5050",
    );
}

#[test]
fn test_repeat_02() {
    // A break at the loop's own height pops nothing.
    check(
        "(repeat 0 0 1 (break))",
        "0x600060006001818352015b61001e5681516001018083528114\
         1561000a575b5050",
    );
}

#[test]
fn test_repeat_03() {
    // Breaking from under a binding pops back down to the loop
    // height first.
    check(
        "(repeat 0 0 1 (with y 1 (break)))",
        "0x600060006001818352015b60015061002256508151600101808352\
         81141561000a575b5050",
    );
}

// ============================================================================
// Embedded Programs
// ============================================================================

#[test]
fn test_lll_01() {
    // The sub-program's bytes land verbatim between its begin/end
    // labels, and the final SUB leaves the byte length behind.
    check(
        "(lll 42 0)",
        "0x61000656602a5b6100046100060361000460003961000461000603",
    );
}

#[test]
fn test_lll_02() {
    // An empty sub-program: begin and end coincide.
    check(
        "(lll (seq) 0)",
        "0x610004565b6100046100040361000460003961000461000403",
    );
}

// ============================================================================
// Derived Comparisons
// ============================================================================

#[test]
fn test_comparison_01() {
    check("(le 1 2)", "0x600260011115");
}

#[test]
fn test_comparison_02() {
    // A derived comparison is byte-identical to its rewrite.
    assert_eq!(compile("(le 1 2)"), compile("(iszero (gt 1 2))"));
    assert_eq!(compile("(sge 1 2)"), compile("(iszero (slt 1 2))"));
}

#[test]
fn test_comparison_03() {
    check("(ne 5 5)", "0x600560051415");
}

// ============================================================================
// Clamps
// ============================================================================

#[test]
fn test_clamp_fold_01() {
    check("(uclamplt 3 5)", "0x6003");
}

#[test]
fn test_clamp_fold_02() {
    check("(uclamplt 5 3)", "0xfe");
}

#[test]
fn test_clamp_fold_03() {
    // The `le` variants fold inclusively.
    check("(uclample 5 5)", "0x6005");
    check("(uclamplt 5 5)", "0xfe");
}

#[test]
fn test_clamp_fold_04() {
    // Signed folding: -1 really is below 5.
    let ff = "ff".repeat(32);
    check("(clamplt -1 5)", &format!("0x7f{ff}"));
    // Unsigned folding sees the wrapped encoding instead.
    check("(uclamplt -1 5)", "0xfe");
}

#[test]
fn test_clamp_dynamic_01() {
    check("(uclamplt (mload 0) 16)", "0x60005160108110155857");
}

#[test]
fn test_clamp_dynamic_02() {
    check("(clample (mload 0) 100)", "0x600051606481135857");
}

#[test]
fn test_clamp_range_01() {
    check(
        "(uclamp 1 (mload 0) 9)",
        "0x600160005180600990115857809190105857",
    );
}

#[test]
fn test_clamp_nonzero_01() {
    check("(clamp_nonzero (mload 0))", "0x60005180155857");
}

// ============================================================================
// Hashing & Rounding
// ============================================================================

#[test]
fn test_sha3_32_01() {
    // One word through the reserved scratch slot.
    check("(sha3_32 1)", "0x600160c05260c0602020");
}

#[test]
fn test_ceil32_01() {
    check("(ceil32 97)", "0x606160206001820306601f8201039050");
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_determinism_01() {
    // Same tree, fresh compiler: same bytes.
    assert_eq!(compile("(if 1 (seq))"), compile("(if 1 (seq))"));
    assert_eq!(compile("(lll 42 0)"), compile("(lll 42 0)"));
}

// ============================================================================
// Helpers
// ============================================================================

/// Check that compiling a given source expression produces a given
/// hex string.
fn check(source: &str, hex: &str) {
    let expected: String = hex.split_whitespace().collect();
    assert_eq!(expected, compile(source));
}

fn compile(source: &str) -> String {
    let tree = lll::parse(source).unwrap();
    let tokens = Compiler::new().compile(&tree).unwrap();
    let bytes = asm::encode(&tokens).unwrap();
    bytes.to_hex_string()
}
