use lllc::asm::{encode, AsmError, SymbolAllocator, Token};

// ============================================================================
// Label Geometry
// ============================================================================

#[test]
fn test_backward_reference() {
    let mut symbols = SymbolAllocator::new();
    let lab = symbols.fresh();
    let tokens = vec![
        Token::Label(lab),
        Token::mnemonic("jumpdest"),
        Token::mnemonic("stop"),
        Token::Label(lab),
        Token::mnemonic("jump"),
    ];
    assert_eq!(
        encode(&tokens).unwrap(),
        vec![0x5b, 0x00, 0x61, 0x00, 0x00, 0x56]
    );
}

#[test]
fn test_forward_reference() {
    let mut symbols = SymbolAllocator::new();
    let lab = symbols.fresh();
    let tokens = vec![
        Token::Label(lab),
        Token::mnemonic("jump"),
        Token::mnemonic("stop"),
        Token::Label(lab),
        Token::mnemonic("jumpdest"),
    ];
    // Reference occupies three bytes, so the target lands at 5.
    assert_eq!(
        encode(&tokens).unwrap(),
        vec![0x61, 0x00, 0x05, 0x56, 0x00, 0x5b]
    );
}

#[test]
fn test_families_and_immediates() {
    let tokens = vec![
        Token::Push(2),
        Token::Immediate(0xbe),
        Token::Immediate(0xef),
        Token::Dup(3),
        Token::Swap(16),
    ];
    assert_eq!(encode(&tokens).unwrap(), vec![0x61, 0xbe, 0xef, 0x82, 0x9f]);
}

// ============================================================================
// Sub-programs
// ============================================================================

#[test]
fn test_sub_program_is_spliced_verbatim() {
    let mut symbols = SymbolAllocator::new();
    let lab = symbols.fresh();
    // The inner program resolves its own labels relative to its own
    // start.
    let inner = vec![
        Token::Label(lab),
        Token::mnemonic("jump"),
        Token::Label(lab),
        Token::mnemonic("jumpdest"),
    ];
    let tokens = vec![Token::mnemonic("stop"), Token::Sub(inner)];
    assert_eq!(
        encode(&tokens).unwrap(),
        vec![0x00, 0x61, 0x00, 0x04, 0x56, 0x5b]
    );
}

#[test]
fn test_outer_positions_account_for_sub_length() {
    let mut symbols = SymbolAllocator::new();
    let lab = symbols.fresh();
    let tokens = vec![
        Token::Label(lab),
        Token::mnemonic("jump"),
        Token::Sub(vec![Token::mnemonic("stop"), Token::mnemonic("stop")]),
        Token::Label(lab),
        Token::mnemonic("jumpdest"),
    ];
    // 3 (reference) + 1 (jump) + 2 (sub) = 6.
    assert_eq!(
        encode(&tokens).unwrap(),
        vec![0x61, 0x00, 0x06, 0x56, 0x00, 0x00, 0x5b]
    );
}

// ============================================================================
// Address-space Limit
// ============================================================================

#[test]
fn test_label_at_address_limit() {
    let mut symbols = SymbolAllocator::new();
    let lab = symbols.fresh();
    let mut tokens = vec![Token::Label(lab), Token::mnemonic("jump")];
    // Pad the definition out to position 0xffff exactly.
    tokens.extend(std::iter::repeat(Token::mnemonic("stop")).take(0xffff - 4));
    tokens.push(Token::Label(lab));
    tokens.push(Token::mnemonic("jumpdest"));
    let bytes = encode(&tokens).unwrap();
    assert_eq!(&bytes[..4], &[0x61, 0xff, 0xff, 0x56]);
    assert_eq!(*bytes.last().unwrap(), 0x5b);
}

#[test]
fn test_label_beyond_address_limit() {
    let mut symbols = SymbolAllocator::new();
    let lab = symbols.fresh();
    let mut tokens = vec![Token::Label(lab), Token::mnemonic("jump")];
    tokens.extend(std::iter::repeat(Token::mnemonic("stop")).take(0xffff - 3));
    tokens.push(Token::Label(lab));
    tokens.push(Token::mnemonic("jumpdest"));
    assert_eq!(encode(&tokens), Err(AsmError::CodeTooLarge(0x10000)));
}
