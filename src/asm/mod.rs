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
mod encoder;

pub use encoder::encode;

use std::fmt;

// ============================================================================
// Errors
// ============================================================================

/// Errors which can arise when encoding a token stream into raw
/// bytecode.
#[derive(Clone, Debug, PartialEq)]
pub enum AsmError {
    /// A mnemonic token was encountered which does not correspond to
    /// any real opcode.
    UnknownMnemonic(String),
    /// A label was referenced but never defined within the enclosing
    /// (sub-)program.
    UnknownLabel(Symbol),
    /// A label was defined more than once within the enclosing
    /// (sub-)program.
    DuplicateLabel(Symbol),
    /// A label resolved to a position which does not fit in the two
    /// address bytes of a reference.
    CodeTooLarge(usize),
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AsmError::UnknownMnemonic(m) => {
                write!(f, "unknown mnemonic in assembly: {m}")
            }
            AsmError::UnknownLabel(s) => write!(f, "reference to undefined label {s}"),
            AsmError::DuplicateLabel(s) => write!(f, "label {s} defined twice"),
            AsmError::CodeTooLarge(p) => {
                write!(f, "label position {p} exceeds the 16bit address space")
            }
        }
    }
}

impl std::error::Error for AsmError {}

// ============================================================================
// Symbols
// ============================================================================

/// A symbolic label, allocated during lowering and resolved to an
/// absolute byte offset by the encoder.  Symbols have no meaning
/// across compilations; they are displayed `_sym_<n>`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Symbol(usize);

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "_sym_{}", self.0)
    }
}

/// Allocates fresh symbolic labels.  The counter is scoped to a
/// single compilation, so independent compilations can run
/// concurrently without sharing state.
pub struct SymbolAllocator {
    next: usize,
}

impl SymbolAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Return a label distinct from every label this allocator has
    /// previously returned.
    pub fn fresh(&mut self) -> Symbol {
        self.next += 1;
        Symbol(self.next)
    }
}

impl Default for SymbolAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// A single element of the symbolic assembly produced by lowering.
/// The stream is flat except for `Sub`, which holds an embedded
/// program encoded recursively and spliced in verbatim.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// A real opcode mnemonic (always uppercase), emitted as one
    /// byte.
    Mnemonic(String),
    /// `PUSH<k>` with `1 <= k <= 32`; the following `k` tokens are
    /// the immediate bytes.
    Push(u8),
    /// `DUP<k>` with `1 <= k <= 16`.
    Dup(u8),
    /// `SWAP<k>` with `1 <= k <= 16`.
    Swap(u8),
    /// An immediate byte following a push.
    Immediate(u8),
    /// A symbolic label.  This is a *definition* when the next token
    /// is `JUMPDEST` or `Blank` (occupying no bytes), and otherwise a
    /// *reference* (an implicit `PUSH2` of the resolved position,
    /// occupying three bytes).
    Label(Symbol),
    /// A zero-width marker for the start of an embedded program.
    Blank,
    /// An embedded sub-program.
    Sub(Vec<Token>),
}

impl Token {
    /// Construct a mnemonic token, normalising to uppercase.
    pub fn mnemonic(name: &str) -> Token {
        Token::Mnemonic(name.to_ascii_uppercase())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Mnemonic(m) => write!(f, "{m}"),
            Token::Push(k) => write!(f, "PUSH{k}"),
            Token::Dup(k) => write!(f, "DUP{k}"),
            Token::Swap(k) => write!(f, "SWAP{k}"),
            Token::Immediate(b) => write!(f, "0x{b:02x}"),
            Token::Label(s) => write!(f, "{s}"),
            Token::Blank => write!(f, "BLANK"),
            Token::Sub(tokens) => {
                write!(f, "[")?;
                for t in tokens {
                    write!(f, " {t}")?;
                }
                write!(f, " ]")
            }
        }
    }
}
