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
use std::fmt;

use ruint::aliases::U256;

use crate::evm::opcode;

// ============================================================================
// Values
// ============================================================================

/// The value carried by an LLL node: an integer literal or a
/// symbolic identifier.  Admissible literals lie in the range
/// `[-(2^255), 2^256)`; non-negative literals are in range by
/// construction, while negative literals store their magnitude and
/// are checked when lowered.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A non-negative integer literal.
    Int(U256),
    /// A negative integer literal, stored by magnitude.
    Neg(U256),
    /// A symbolic identifier: an opcode mnemonic, a builtin form, or
    /// a binding name.
    Symbol(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(x) => write!(f, "{x}"),
            Value::Neg(x) => write!(f, "-{x}"),
            Value::Symbol(s) => write!(f, "{s}"),
        }
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// A node of an LLL tree.  Aside from its value and its ordered
/// children, every node carries a precomputed *valency*: the number
/// of 256-bit words (0 or 1) it leaves on the operand stack after
/// evaluation.  The lowering templates rely on valencies to keep
/// the abstract stack height accurate, so nodes are built through
/// the constructors below, which compute them.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub value: Value,
    pub args: Vec<Node>,
    pub valency: usize,
}

impl Node {
    /// Construct an integer literal node.
    pub fn int(value: U256) -> Node {
        Node { value: Value::Int(value), args: Vec::new(), valency: 1 }
    }

    /// Construct an integer literal node from a signed machine
    /// integer.  Handy for rewrites and tests.
    pub fn num(value: i128) -> Node {
        let magnitude = U256::from(value.unsigned_abs());
        let value = if value < 0 { Value::Neg(magnitude) } else { Value::Int(magnitude) };
        Node { value, args: Vec::new(), valency: 1 }
    }

    /// Construct a negative integer literal node from its magnitude.
    /// A zero magnitude normalises to the literal zero.
    pub fn neg(magnitude: U256) -> Node {
        if magnitude == U256::ZERO {
            return Node::int(magnitude);
        }
        Node { value: Value::Neg(magnitude), args: Vec::new(), valency: 1 }
    }

    /// Construct a bare symbol node (no children).
    pub fn symbol(name: &str) -> Node {
        Node::op(name, Vec::new())
    }

    /// Construct a symbolic node with children, computing its
    /// valency.
    pub fn op(name: &str, args: Vec<Node>) -> Node {
        let valency = symbol_valency(name, &args);
        Node { value: Value::Symbol(name.to_string()), args, valency }
    }

    /// True iff this node is the integer literal zero.
    pub fn is_zero_literal(&self) -> bool {
        matches!(&self.value, Value::Int(x) if *x == U256::ZERO)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "({}", self.value)?;
            for arg in &self.args {
                write!(f, " {arg}")?;
            }
            write!(f, ")")
        }
    }
}

/// Compute the valency of a symbolic node.  Opcodes and
/// pseudo-opcodes take their table output arity; the builtin forms
/// have structural rules; anything else is assumed to be a binding
/// reference, which duplicates one word.
fn symbol_valency(name: &str, args: &[Node]) -> usize {
    if let Some(op) = opcode::real(name) {
        return op.outputs as usize;
    }
    if let Some(op) = opcode::pseudo(name) {
        return op.outputs as usize;
    }
    match name {
        "if" => args.get(1).map_or(0, |a| a.valency),
        "with" => args.get(2).map_or(0, |a| a.valency),
        "seq" => args.last().map_or(0, |a| a.valency),
        "repeat" => 0,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_valency() {
        assert_eq!(Node::num(42).valency, 1);
        assert_eq!(Node::num(-1).valency, 1);
        assert_eq!(Node::int(U256::ZERO).valency, 1);
    }

    #[test]
    fn test_opcode_valency() {
        assert_eq!(Node::op("add", vec![Node::num(1), Node::num(2)]).valency, 1);
        assert_eq!(Node::op("pop", vec![Node::num(1)]).valency, 0);
        assert_eq!(Node::op("mstore", vec![Node::num(0), Node::num(1)]).valency, 0);
        assert_eq!(Node::symbol("caller").valency, 1);
        assert_eq!(Node::symbol("pass").valency, 0);
    }

    #[test]
    fn test_form_valency() {
        // A two-arm conditional takes its branch's valency.
        let cond = Node::op("if", vec![Node::num(1), Node::symbol("pass")]);
        assert_eq!(cond.valency, 0);
        // A binding body propagates through `with`.
        let body = Node::op("add", vec![Node::symbol("x"), Node::num(1)]);
        let with = Node::op("with", vec![Node::symbol("x"), Node::num(5), body]);
        assert_eq!(with.valency, 1);
        // A sequence takes its trailing child's valency.
        assert_eq!(Node::op("seq", vec![Node::symbol("pass"), Node::num(3)]).valency, 1);
        assert_eq!(Node::op("seq", vec![]).valency, 0);
        // Unknown symbols are binding references.
        assert_eq!(Node::symbol("x").valency, 1);
    }

    #[test]
    fn test_display() {
        let tree = Node::op("with", vec![
            Node::symbol("x"),
            Node::num(5),
            Node::op("add", vec![Node::symbol("x"), Node::num(-1)]),
        ]);
        assert_eq!(format!("{tree}"), "(with x 5 (add x -1))");
    }

    #[test]
    fn test_negative_zero_normalises() {
        assert_eq!(Node::num(-0), Node::num(0));
        assert!(Node::num(0).is_zero_literal());
        assert!(!Node::num(-3).is_zero_literal());
    }
}
