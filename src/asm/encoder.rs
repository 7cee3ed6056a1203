// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use std::collections::HashMap;

use log::debug;

use crate::evm::opcode;
use crate::evm::opcode::{DUP_BASE, PUSH_BASE, SWAP_BASE};

use super::{AsmError, Symbol, Token};

/// Encode a token stream into raw bytecode, resolving every label to
/// an absolute byte offset.  Resolution is a two-pass affair: since
/// a label reference always occupies exactly three bytes (an
/// implicit `PUSH2` plus the address), the first pass can assign
/// every definition its position without fixed-point iteration, and
/// the second pass emits bytes against the completed map.  Labels
/// resolve locally: an embedded `Sub` program is encoded by a
/// recursive call with its own label space.
pub fn encode(tokens: &[Token]) -> Result<Vec<u8>, AsmError> {
    let labels = resolve(tokens)?;
    // Encode each sub-program once, keyed by token index.
    let mut subs: HashMap<usize, Vec<u8>> = HashMap::new();
    for (i, token) in tokens.iter().enumerate() {
        if let Token::Sub(inner) = token {
            subs.insert(i, encode(inner)?);
        }
    }
    // Second pass: emit.
    let mut bytes = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Mnemonic(m) => match opcode::real(m) {
                Some(op) => bytes.push(op.byte),
                None => return Err(AsmError::UnknownMnemonic(m.clone())),
            },
            Token::Push(k) => bytes.push(PUSH_BASE + k),
            Token::Dup(k) => bytes.push(DUP_BASE + k),
            Token::Swap(k) => bytes.push(SWAP_BASE + k),
            Token::Immediate(b) => bytes.push(*b),
            // Definitions occupy no bytes; the marker which follows
            // them is emitted on its own account.
            Token::Label(_) if is_definition(tokens, i) => {}
            Token::Label(sym) => {
                let target = *labels.get(sym).ok_or(AsmError::UnknownLabel(*sym))?;
                if target > 0xffff {
                    return Err(AsmError::CodeTooLarge(target));
                }
                bytes.push(PUSH_BASE + 2);
                bytes.push((target >> 8) as u8);
                bytes.push((target & 0xff) as u8);
            }
            Token::Blank => {}
            Token::Sub(_) => bytes.extend_from_slice(&subs[&i]),
        }
    }
    debug!("encoded {} tokens into {} bytes", tokens.len(), bytes.len());
    Ok(bytes)
}

/// First pass: map every label definition to its byte position.
fn resolve(tokens: &[Token]) -> Result<HashMap<Symbol, usize>, AsmError> {
    let mut labels = HashMap::new();
    let mut pos = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Label(sym) => {
                if is_definition(tokens, i) {
                    if labels.insert(*sym, pos).is_some() {
                        return Err(AsmError::DuplicateLabel(*sym));
                    }
                } else {
                    // PUSH2 plus two address bytes.
                    pos += 3;
                }
            }
            Token::Blank => {}
            Token::Sub(inner) => pos += encoded_len(inner),
            _ => pos += 1,
        }
    }
    Ok(labels)
}

/// Compute the encoded length of a token stream without resolving
/// its labels.  Lengths are position-independent, so this never
/// fails.
fn encoded_len(tokens: &[Token]) -> usize {
    let mut len = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Label(_) if is_definition(tokens, i) => {}
            Token::Label(_) => len += 3,
            Token::Blank => {}
            Token::Sub(inner) => len += encoded_len(inner),
            _ => len += 1,
        }
    }
    len
}

/// A label is a definition exactly when the next token is `JUMPDEST`
/// or `Blank`; in every other position it is a reference.
fn is_definition(tokens: &[Token], i: usize) -> bool {
    match tokens.get(i + 1) {
        Some(Token::Mnemonic(m)) => m == "JUMPDEST",
        Some(Token::Blank) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::SymbolAllocator;

    #[test]
    fn test_definition_occupies_no_bytes() {
        let mut symbols = SymbolAllocator::new();
        let lab = symbols.fresh();
        let tokens = vec![
            Token::Label(lab),
            Token::mnemonic("jumpdest"),
            Token::Label(lab),
            Token::mnemonic("jump"),
        ];
        assert_eq!(encode(&tokens).unwrap(), vec![0x5b, 0x61, 0x00, 0x00, 0x56]);
    }

    #[test]
    fn test_blank_is_zero_width() {
        let mut symbols = SymbolAllocator::new();
        let lab = symbols.fresh();
        let tokens = vec![
            Token::mnemonic("stop"),
            Token::Label(lab),
            Token::Blank,
            Token::Label(lab),
            Token::mnemonic("jump"),
        ];
        // The label marks position 1, directly after STOP.
        assert_eq!(encode(&tokens).unwrap(), vec![0x00, 0x61, 0x00, 0x01, 0x56]);
    }

    #[test]
    fn test_unknown_label() {
        let mut symbols = SymbolAllocator::new();
        let lab = symbols.fresh();
        let tokens = vec![Token::Label(lab), Token::mnemonic("jump")];
        assert_eq!(encode(&tokens), Err(AsmError::UnknownLabel(lab)));
    }

    #[test]
    fn test_duplicate_label() {
        let mut symbols = SymbolAllocator::new();
        let lab = symbols.fresh();
        let tokens = vec![
            Token::Label(lab),
            Token::mnemonic("jumpdest"),
            Token::Label(lab),
            Token::mnemonic("jumpdest"),
        ];
        assert_eq!(encode(&tokens), Err(AsmError::DuplicateLabel(lab)));
    }

    #[test]
    fn test_unknown_mnemonic() {
        let tokens = vec![Token::Mnemonic("BOGUS".to_string())];
        assert_eq!(
            encode(&tokens),
            Err(AsmError::UnknownMnemonic("BOGUS".to_string()))
        );
    }
}
