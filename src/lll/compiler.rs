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
use std::cmp::Ordering;
use std::fmt;

use log::debug;
use ruint::aliases::U256;

use crate::asm::{Symbol, SymbolAllocator, Token};
use crate::evm::opcode;

use super::{Node, Value};

/// Word-aligned scratch memory offset reserved for hashing a single
/// value.
pub const FREE_MEMORY_SCRATCH: u8 = 192;

type Result<T> = std::result::Result<T, CompileError>;

// ============================================================================
// Errors
// ============================================================================

/// Errors which can arise when lowering an LLL tree to assembly.
/// All are fatal to the compilation.
#[derive(Clone, Debug, PartialEq)]
pub enum CompileError {
    /// A negative literal below `-(2^255)`.  (Values at or above
    /// `2^256` are unrepresentable by construction.)
    LiteralOutOfRange(String),
    /// A binding was referenced (or assigned) at a stack distance
    /// outside `1..=16`, which `DUP`/`SWAP` cannot reach.
    BindingTooDeep(String),
    /// A `break` appeared outside of any enclosing loop.
    InvalidBreak,
    /// A node had the wrong shape: bad special-form arity, a
    /// non-literal or zero `repeat` count, a branch valency
    /// mismatch, or an unknown symbolic value.
    MalformedNode(String),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompileError::LiteralOutOfRange(v) => write!(f, "literal out of range: {v}"),
            CompileError::BindingTooDeep(n) => {
                write!(f, "binding {n} is too deep to reach on the stack")
            }
            CompileError::InvalidBreak => write!(f, "break outside of a loop"),
            CompileError::MalformedNode(msg) => write!(f, "malformed node: {msg}"),
        }
    }
}

impl std::error::Error for CompileError {}

// ============================================================================
// Compile-time Environment
// ============================================================================

/// Lexically scoped bindings introduced by `with`.  Each frame maps
/// a name to the abstract stack height at which its value was
/// pushed.  Lookup walks backwards, so an inner binding shadows an
/// outer one of the same name.
struct Bindings {
    frames: Vec<(String, usize)>,
}

impl Bindings {
    fn new() -> Self {
        Self { frames: Vec::new() }
    }

    fn lookup(&self, name: &str) -> Option<usize> {
        self.frames.iter().rev().find(|(n, _)| n == name).map(|(_, h)| *h)
    }

    fn push(&mut self, name: &str, height: usize) {
        self.frames.push((name.to_string(), height));
    }

    fn pop(&mut self) {
        self.frames.pop();
    }
}

/// The innermost enclosing loop exit: the label `break` jumps to,
/// and the stack height the loop epilogue expects on arrival.
#[derive(Clone, Copy)]
struct BreakTarget {
    label: Symbol,
    height: usize,
}

// ============================================================================
// Compiler
// ============================================================================

/// Lowers LLL trees into symbolic assembly.  The compiler owns the
/// symbol allocator, so labels are unique within one compilation and
/// independent compilations share no state.
///
/// Every lowering template preserves one contract: after the
/// emitted tokens execute, the abstract stack height equals the
/// entry height plus the node's valency.
pub struct Compiler {
    symbols: SymbolAllocator,
}

impl Compiler {
    pub fn new() -> Self {
        Self { symbols: SymbolAllocator::new() }
    }

    /// Lower a tree into a flat token stream, ready for encoding.
    pub fn compile(&mut self, node: &Node) -> Result<Vec<Token>> {
        let mut env = Bindings::new();
        let tokens = self.lower(node, &mut env, None, 0)?;
        debug!("lowered tree into {} assembly tokens", tokens.len());
        Ok(tokens)
    }

    fn lower(
        &mut self,
        node: &Node,
        env: &mut Bindings,
        brk: Option<BreakTarget>,
        height: usize,
    ) -> Result<Vec<Token>> {
        match &node.value {
            Value::Int(x) => Ok(lower_literal(*x)),
            Value::Neg(x) => lower_negative(*x),
            Value::Symbol(name) => {
                // Real opcodes take precedence; bindings shadow the
                // builtin forms.
                if opcode::real(name).is_some() {
                    self.lower_opcode(node, name, env, brk, height)
                } else if let Some(bound) = env.lookup(name) {
                    lower_reference(name, bound, height)
                } else {
                    self.lower_form(node, name, env, brk, height)
                }
            }
        }
    }

    /// Lower an opcode invocation.  Children are evaluated in
    /// reverse, so the first argument ends up on top of the stack;
    /// each child sees the height as raised by those before it.
    fn lower_opcode(
        &mut self,
        node: &Node,
        name: &str,
        env: &mut Bindings,
        brk: Option<BreakTarget>,
        height: usize,
    ) -> Result<Vec<Token>> {
        let mut out = Vec::new();
        for (i, arg) in node.args.iter().rev().enumerate() {
            out.extend(self.lower(arg, env, brk, height + i)?);
        }
        out.push(Token::mnemonic(name));
        Ok(out)
    }

    fn lower_form(
        &mut self,
        node: &Node,
        name: &str,
        env: &mut Bindings,
        brk: Option<BreakTarget>,
        height: usize,
    ) -> Result<Vec<Token>> {
        match name {
            "set" => self.lower_set(node, env, brk, height),
            "pass" => Ok(Vec::new()),
            "if" => self.lower_if(node, env, brk, height),
            "repeat" => self.lower_repeat(node, env, brk, height),
            "break" => lower_break(brk, height),
            "with" => self.lower_with(node, env, brk, height),
            "lll" => self.lower_lll(node, env, brk, height),
            "seq" => self.lower_seq(node, env, brk, height),
            "assert" => self.lower_assert(node, env, brk, height),
            "uclamplt" | "clamplt" | "uclample" | "clample" => {
                self.lower_clamp_bound(node, name, env, brk, height)
            }
            "uclamp" | "clamp" => self.lower_clamp_range(node, name, env, brk, height),
            "clamp_nonzero" => self.lower_clamp_nonzero(node, env, brk, height),
            "sha3_32" => self.lower_sha3_32(node, env, brk, height),
            "le" | "ge" | "sle" | "sge" | "ne" => {
                self.lower_comparison(node, name, env, brk, height)
            }
            "ceil32" => self.lower_ceil32(node, env, brk, height),
            _ => Err(CompileError::MalformedNode(format!("unknown code element: {node}"))),
        }
    }

    /// `set name expr` overwrites the binding's stack slot in place.
    fn lower_set(
        &mut self,
        node: &Node,
        env: &mut Bindings,
        brk: Option<BreakTarget>,
        height: usize,
    ) -> Result<Vec<Token>> {
        let name = match node.args.as_slice() {
            [Node { value: Value::Symbol(name), .. }, _] => name.clone(),
            _ => {
                return Err(CompileError::MalformedNode(
                    "set expects a stack variable and an expression".to_string(),
                ))
            }
        };
        let bound = env.lookup(&name).ok_or_else(|| {
            CompileError::MalformedNode(format!("set of unbound variable {name}"))
        })?;
        let mut out = self.lower(&node.args[1], env, brk, height)?;
        let k = binding_distance(&name, bound, height)?;
        out.push(Token::Swap(k));
        out.push(Token::mnemonic("POP"));
        Ok(out)
    }

    fn lower_if(
        &mut self,
        node: &Node,
        env: &mut Bindings,
        brk: Option<BreakTarget>,
        height: usize,
    ) -> Result<Vec<Token>> {
        match node.args.as_slice() {
            [cond, then] => {
                if then.valency != 0 {
                    return Err(CompileError::MalformedNode(
                        "a two-arm if branch must leave nothing on the stack".to_string(),
                    ));
                }
                let mut out = self.lower(cond, env, brk, height)?;
                let end = self.symbols.fresh();
                out.push(Token::mnemonic("ISZERO"));
                out.push(Token::Label(end));
                out.push(Token::mnemonic("JUMPI"));
                out.extend(self.lower(then, env, brk, height)?);
                out.push(Token::Label(end));
                out.push(Token::mnemonic("JUMPDEST"));
                Ok(out)
            }
            [cond, then, other] => {
                if then.valency != other.valency {
                    return Err(CompileError::MalformedNode(
                        "if branches disagree on how many words they leave".to_string(),
                    ));
                }
                let mut out = self.lower(cond, env, brk, height)?;
                let mid = self.symbols.fresh();
                let end = self.symbols.fresh();
                out.push(Token::mnemonic("ISZERO"));
                out.push(Token::Label(mid));
                out.push(Token::mnemonic("JUMPI"));
                out.extend(self.lower(then, env, brk, height)?);
                out.push(Token::Label(end));
                out.push(Token::mnemonic("JUMP"));
                out.push(Token::Label(mid));
                out.push(Token::mnemonic("JUMPDEST"));
                out.extend(self.lower(other, env, brk, height)?);
                out.push(Token::Label(end));
                out.push(Token::mnemonic("JUMPDEST"));
                Ok(out)
            }
            args => Err(CompileError::MalformedNode(format!(
                "if expects 2 or 3 arguments, found {}",
                args.len()
            ))),
        }
    }

    /// `repeat memloc start rounds body` iterates `body` with the
    /// induction variable held in memory at `memloc`, keeping the
    /// stack shallow.  The trip count must be a nonzero literal.
    fn lower_repeat(
        &mut self,
        node: &Node,
        env: &mut Bindings,
        brk: Option<BreakTarget>,
        height: usize,
    ) -> Result<Vec<Token>> {
        if node.args.len() != 4 {
            return Err(CompileError::MalformedNode(format!(
                "repeat expects 4 arguments, found {}",
                node.args.len()
            )));
        }
        let rounds = match &node.args[2].value {
            Value::Int(x) if *x != U256::ZERO => x.to_be_bytes_trimmed_vec(),
            Value::Int(_) => {
                return Err(CompileError::MalformedNode(
                    "repeat with a zero trip count".to_string(),
                ))
            }
            _ => {
                return Err(CompileError::MalformedNode(
                    "repeat count must be an integer literal".to_string(),
                ))
            }
        };
        let body = &node.args[3];
        if body.valency != 0 {
            return Err(CompileError::MalformedNode(
                "a repeat body must leave nothing on the stack".to_string(),
            ));
        }
        let start = self.symbols.fresh();
        let end = self.symbols.fresh();
        let mut out = self.lower(&node.args[0], env, brk, height)?;
        out.extend(self.lower(&node.args[1], env, brk, height + 1)?);
        // Stack: memloc, i, rounds.
        out.push(Token::Push(rounds.len() as u8));
        out.extend(rounds.into_iter().map(Token::Immediate));
        out.push(Token::Dup(2));
        out.push(Token::Dup(4));
        out.push(Token::mnemonic("MSTORE"));
        out.push(Token::mnemonic("ADD"));
        // Stack: memloc, exit_index; mem[memloc] = i.
        out.push(Token::Label(start));
        out.push(Token::mnemonic("JUMPDEST"));
        let target = BreakTarget { label: end, height: height + 2 };
        out.extend(self.lower(body, env, Some(target), height + 2)?);
        // Bump the induction variable and store it back.
        out.push(Token::Dup(2));
        out.push(Token::mnemonic("MLOAD"));
        out.push(Token::Push(1));
        out.push(Token::Immediate(1));
        out.push(Token::mnemonic("ADD"));
        out.push(Token::Dup(1));
        out.push(Token::Dup(4));
        out.push(Token::mnemonic("MSTORE"));
        // Loop back until the exit index is reached.
        out.push(Token::Dup(2));
        out.push(Token::mnemonic("EQ"));
        out.push(Token::mnemonic("ISZERO"));
        out.push(Token::Label(start));
        out.push(Token::mnemonic("JUMPI"));
        out.push(Token::Label(end));
        out.push(Token::mnemonic("JUMPDEST"));
        out.push(Token::mnemonic("POP"));
        out.push(Token::mnemonic("POP"));
        Ok(out)
    }

    /// `with name expr body` binds the value of `expr` to `name` for
    /// the extent of `body`.  Bindings are lexically scoped and may
    /// shadow.
    fn lower_with(
        &mut self,
        node: &Node,
        env: &mut Bindings,
        brk: Option<BreakTarget>,
        height: usize,
    ) -> Result<Vec<Token>> {
        let name = match node.args.as_slice() {
            [Node { value: Value::Symbol(name), .. }, _, _] => name.clone(),
            _ => {
                return Err(CompileError::MalformedNode(
                    "with expects a name, an expression and a body".to_string(),
                ))
            }
        };
        let body = &node.args[2];
        let mut out = self.lower(&node.args[1], env, brk, height)?;
        env.push(&name, height);
        let lowered = self.lower(body, env, brk, height + 1);
        env.pop();
        out.extend(lowered?);
        // Drop the binding slot, keeping any result on top.
        if body.valency == 1 {
            out.push(Token::Swap(1));
            out.push(Token::mnemonic("POP"));
        } else {
            out.push(Token::mnemonic("POP"));
        }
        Ok(out)
    }

    /// `lll inner outer` compiles `inner` as an independent embedded
    /// program and emits code which copies its bytes to the runtime
    /// address computed by `outer`, leaving the byte length on the
    /// stack.
    fn lower_lll(
        &mut self,
        node: &Node,
        env: &mut Bindings,
        brk: Option<BreakTarget>,
        height: usize,
    ) -> Result<Vec<Token>> {
        if node.args.len() != 2 {
            return Err(CompileError::MalformedNode(format!(
                "lll expects 2 arguments, found {}",
                node.args.len()
            )));
        }
        let begin = self.symbols.fresh();
        let end = self.symbols.fresh();
        let mut out = vec![
            Token::Label(end),
            Token::mnemonic("JUMP"),
            Token::Label(begin),
            Token::Blank,
        ];
        // The embedded program starts from a blank slate: its own
        // stack, no bindings, no loop.
        let mut inner_env = Bindings::new();
        out.push(Token::Sub(self.lower(&node.args[0], &mut inner_env, None, 0)?));
        out.push(Token::Label(end));
        out.push(Token::mnemonic("JUMPDEST"));
        out.push(Token::Label(begin));
        out.push(Token::Label(end));
        out.push(Token::mnemonic("SUB"));
        out.push(Token::Label(begin));
        // The sub-program length and begin offset sit beneath the
        // destination while `outer` evaluates.
        out.extend(self.lower(&node.args[1], env, brk, height + 2)?);
        out.push(Token::mnemonic("CODECOPY"));
        out.push(Token::Label(begin));
        out.push(Token::Label(end));
        out.push(Token::mnemonic("SUB"));
        Ok(out)
    }

    fn lower_seq(
        &mut self,
        node: &Node,
        env: &mut Bindings,
        brk: Option<BreakTarget>,
        height: usize,
    ) -> Result<Vec<Token>> {
        let mut out = Vec::new();
        for (i, arg) in node.args.iter().enumerate() {
            out.extend(self.lower(arg, env, brk, height)?);
            // Only the trailing child's value, if any, survives.
            if arg.valency == 1 && i + 1 != node.args.len() {
                out.push(Token::mnemonic("POP"));
            }
        }
        Ok(out)
    }

    /// `assert cond` aborts execution unless `cond` is nonzero, by
    /// jumping to the current program counter (never a valid
    /// destination).
    fn lower_assert(
        &mut self,
        node: &Node,
        env: &mut Bindings,
        brk: Option<BreakTarget>,
        height: usize,
    ) -> Result<Vec<Token>> {
        match node.args.as_slice() {
            [cond] if cond.valency == 1 => {
                let mut out = self.lower(cond, env, brk, height)?;
                out.push(Token::mnemonic("ISZERO"));
                out.push(Token::mnemonic("PC"));
                out.push(Token::mnemonic("JUMPI"));
                Ok(out)
            }
            _ => Err(CompileError::MalformedNode(
                "assert expects a single expression".to_string(),
            )),
        }
    }

    /// One-sided clamps: `uclamplt`/`clamplt`/`uclample`/`clample x
    /// bound` abort unless `x` compares against `bound` as the
    /// variant requires, leaving `x` on the stack.  When both
    /// operands are literals the check is folded at compile time.
    fn lower_clamp_bound(
        &mut self,
        node: &Node,
        name: &str,
        env: &mut Bindings,
        brk: Option<BreakTarget>,
        height: usize,
    ) -> Result<Vec<Token>> {
        if node.args.len() != 2 {
            return Err(CompileError::MalformedNode(format!(
                "{name} expects 2 arguments, found {}",
                node.args.len()
            )));
        }
        let (x, bound) = (&node.args[0], &node.args[1]);
        let signed = !name.starts_with('u');
        let inclusive = name.ends_with("le");
        if let (Some(xv), Some(bv)) = (literal(x), literal(bound)) {
            let ord = if signed { cmp_signed(xv, bv) } else { cmp_unsigned(xv, bv) };
            let ok = match ord {
                Ordering::Less => true,
                Ordering::Equal => inclusive,
                Ordering::Greater => false,
            };
            return if ok {
                self.lower(x, env, brk, height)
            } else {
                Ok(vec![Token::mnemonic("INVALID")])
            };
        }
        let mut out = self.lower(x, env, brk, height)?;
        out.extend(self.lower(bound, env, brk, height + 1)?);
        out.push(Token::Dup(2));
        // Stack: x, bound, x.
        match (signed, inclusive) {
            (false, false) => {
                out.push(Token::mnemonic("LT"));
                out.push(Token::mnemonic("ISZERO"));
            }
            (true, false) => {
                out.push(Token::mnemonic("SLT"));
                out.push(Token::mnemonic("ISZERO"));
            }
            (false, true) => out.push(Token::mnemonic("GT")),
            (true, true) => out.push(Token::mnemonic("SGT")),
        }
        out.push(Token::mnemonic("PC"));
        out.push(Token::mnemonic("JUMPI"));
        Ok(out)
    }

    /// Two-sided clamps: `uclamp`/`clamp lo x hi` abort unless
    /// `lo <= x <= hi` under the unsigned or signed ordering,
    /// leaving `x` on the stack.
    fn lower_clamp_range(
        &mut self,
        node: &Node,
        name: &str,
        env: &mut Bindings,
        brk: Option<BreakTarget>,
        height: usize,
    ) -> Result<Vec<Token>> {
        if node.args.len() != 3 {
            return Err(CompileError::MalformedNode(format!(
                "{name} expects 3 arguments, found {}",
                node.args.len()
            )));
        }
        let (comp1, comp2) = if name == "clamp" { ("SGT", "SLT") } else { ("GT", "LT") };
        let mut out = self.lower(&node.args[0], env, brk, height)?;
        out.extend(self.lower(&node.args[1], env, brk, height + 1)?);
        out.push(Token::Dup(1));
        out.extend(self.lower(&node.args[2], env, brk, height + 3)?);
        // Stack: lo, x, x, hi.  Abort if x exceeds the upper bound.
        out.push(Token::Swap(1));
        out.push(Token::mnemonic(comp1));
        out.push(Token::mnemonic("PC"));
        out.push(Token::mnemonic("JUMPI"));
        // Stack: lo, x.  Abort if x undershoots the lower bound.
        out.push(Token::Dup(1));
        out.push(Token::Swap(2));
        out.push(Token::Swap(1));
        out.push(Token::mnemonic(comp2));
        out.push(Token::mnemonic("PC"));
        out.push(Token::mnemonic("JUMPI"));
        Ok(out)
    }

    fn lower_clamp_nonzero(
        &mut self,
        node: &Node,
        env: &mut Bindings,
        brk: Option<BreakTarget>,
        height: usize,
    ) -> Result<Vec<Token>> {
        match node.args.as_slice() {
            [x] => {
                let mut out = self.lower(x, env, brk, height)?;
                out.push(Token::Dup(1));
                out.push(Token::mnemonic("ISZERO"));
                out.push(Token::mnemonic("PC"));
                out.push(Token::mnemonic("JUMPI"));
                Ok(out)
            }
            args => Err(CompileError::MalformedNode(format!(
                "clamp_nonzero expects 1 argument, found {}",
                args.len()
            ))),
        }
    }

    /// `sha3_32 x` hashes a single word via the reserved scratch
    /// slot, leaving live memory undisturbed.
    fn lower_sha3_32(
        &mut self,
        node: &Node,
        env: &mut Bindings,
        brk: Option<BreakTarget>,
        height: usize,
    ) -> Result<Vec<Token>> {
        match node.args.as_slice() {
            [x] => {
                let mut out = self.lower(x, env, brk, height)?;
                out.push(Token::Push(1));
                out.push(Token::Immediate(FREE_MEMORY_SCRATCH));
                out.push(Token::mnemonic("MSTORE"));
                out.push(Token::Push(1));
                out.push(Token::Immediate(FREE_MEMORY_SCRATCH));
                out.push(Token::Push(1));
                out.push(Token::Immediate(32));
                out.push(Token::mnemonic("SHA3"));
                Ok(out)
            }
            args => Err(CompileError::MalformedNode(format!(
                "sha3_32 expects 1 argument, found {}",
                args.len()
            ))),
        }
    }

    /// The derived comparisons rewrite to `iszero` of the opposite
    /// primitive.
    fn lower_comparison(
        &mut self,
        node: &Node,
        name: &str,
        env: &mut Bindings,
        brk: Option<BreakTarget>,
        height: usize,
    ) -> Result<Vec<Token>> {
        if node.args.len() != 2 {
            return Err(CompileError::MalformedNode(format!(
                "{name} expects 2 arguments, found {}",
                node.args.len()
            )));
        }
        let opposite = match name {
            "le" => "gt",
            "ge" => "lt",
            "sle" => "sgt",
            "sge" => "slt",
            _ => "eq",
        };
        let rewrite = Node::op(
            "iszero",
            vec![Node::op(opposite, vec![node.args[0].clone(), node.args[1].clone()])],
        );
        self.lower(&rewrite, env, brk, height)
    }

    /// `ceil32 x` rounds up to the next multiple of 32, e.g. 95 ->
    /// 96, 96 -> 96, 97 -> 128.
    fn lower_ceil32(
        &mut self,
        node: &Node,
        env: &mut Bindings,
        brk: Option<BreakTarget>,
        height: usize,
    ) -> Result<Vec<Token>> {
        if node.args.len() != 1 {
            return Err(CompileError::MalformedNode(format!(
                "ceil32 expects 1 argument, found {}",
                node.args.len()
            )));
        }
        let rewrite = Node::op(
            "with",
            vec![
                Node::symbol("_val"),
                node.args[0].clone(),
                Node::op(
                    "sub",
                    vec![
                        Node::op("add", vec![Node::symbol("_val"), Node::num(31)]),
                        Node::op(
                            "mod",
                            vec![
                                Node::op("sub", vec![Node::symbol("_val"), Node::num(1)]),
                                Node::num(32),
                            ],
                        ),
                    ],
                ),
            ],
        );
        self.lower(&rewrite, env, brk, height)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Emit a minimal big-endian push of `value mod 2^256`.  Zero still
/// pushes a single byte.
fn lower_literal(value: U256) -> Vec<Token> {
    let mut bytes = value.to_be_bytes_trimmed_vec();
    if bytes.is_empty() {
        bytes.push(0);
    }
    let mut out = Vec::with_capacity(bytes.len() + 1);
    out.push(Token::Push(bytes.len() as u8));
    out.extend(bytes.into_iter().map(Token::Immediate));
    out
}

/// A negative literal encodes as its two's complement, provided its
/// magnitude does not exceed `2^255`.
fn lower_negative(magnitude: U256) -> Result<Vec<Token>> {
    if magnitude > U256::ONE << 255 {
        return Err(CompileError::LiteralOutOfRange(format!("-{magnitude}")));
    }
    Ok(lower_literal(magnitude.wrapping_neg()))
}

/// A binding reference duplicates the bound slot onto the top of
/// the stack.
fn lower_reference(name: &str, bound: usize, height: usize) -> Result<Vec<Token>> {
    let k = binding_distance(name, bound, height)?;
    Ok(vec![Token::Dup(k)])
}

fn lower_break(brk: Option<BreakTarget>, height: usize) -> Result<Vec<Token>> {
    let target = brk.ok_or(CompileError::InvalidBreak)?;
    // Restore the stack to the height the loop epilogue expects
    // before jumping out.
    let mut out = Vec::new();
    for _ in 0..height.saturating_sub(target.height) {
        out.push(Token::mnemonic("POP"));
    }
    out.push(Token::Label(target.label));
    out.push(Token::mnemonic("JUMP"));
    Ok(out)
}

/// Distance from the top of the stack down to a binding's slot,
/// which both `DUP<k>` and `SWAP<k>` require to lie in `1..=16`.
fn binding_distance(name: &str, bound: usize, height: usize) -> Result<u8> {
    match height.checked_sub(bound) {
        Some(k) if (1..=16).contains(&k) => Ok(k as u8),
        _ => Err(CompileError::BindingTooDeep(name.to_string())),
    }
}

/// Extract a literal value, if the node is one.
fn literal(node: &Node) -> Option<&Value> {
    match &node.value {
        Value::Int(_) | Value::Neg(_) => Some(&node.value),
        Value::Symbol(_) => None,
    }
}

/// The wrapped (mod `2^256`) encoding of a literal.
fn wrapped(value: &Value) -> U256 {
    match value {
        Value::Int(x) => *x,
        Value::Neg(x) => x.wrapping_neg(),
        Value::Symbol(_) => unreachable!("symbols carry no literal value"),
    }
}

fn cmp_unsigned(a: &Value, b: &Value) -> Ordering {
    wrapped(a).cmp(&wrapped(b))
}

/// Compare two literals the way `SLT`/`SGT` would: as two's
/// complement interpretations of their wrapped encodings.
fn cmp_signed(a: &Value, b: &Value) -> Ordering {
    let (ua, ub) = (wrapped(a), wrapped(b));
    match (ua.bit(255), ub.bit(255)) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => ua.cmp(&ub),
    }
}
