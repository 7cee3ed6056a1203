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

use crate::evm::opcode;

use super::{Node, Value};

// ============================================================================
// Errors
// ============================================================================

/// Errors which can arise when estimating the gas consumption of an
/// LLL tree.
#[derive(Clone, Debug, PartialEq)]
pub enum GasError {
    /// A builtin form had the wrong shape (e.g. an `if` with one
    /// child, or a `repeat` whose trip count is not a literal).
    MalformedNode(String),
}

impl fmt::Display for GasError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GasError::MalformedNode(msg) => write!(f, "gas estimate failed: {msg}"),
        }
    }
}

impl std::error::Error for GasError {}

// ============================================================================
// Estimator
// ============================================================================

/// Compute a static upper bound on the gas consumed by executing an
/// LLL tree.  The bound is pessimistic for opcodes with dynamic
/// costs: a `CALL` transferring value, an `SSTORE` to a
/// possibly-nonzero slot and a `SELFDESTRUCT` each take a fixed
/// worst-case surcharge.
pub fn estimate(node: &Node) -> Result<usize, GasError> {
    walk(node, 0)
}

/// `depth` tracks the nesting level of the walk, which prices the
/// implicit stack cleanup a `break` performs on early exit.
fn walk(node: &Node, depth: usize) -> Result<usize, GasError> {
    match &node.value {
        // A literal is a single push.
        Value::Int(_) | Value::Neg(_) => Ok(3),
        Value::Symbol(name) => symbol_cost(node, name, depth),
    }
}

fn symbol_cost(node: &Node, name: &str, depth: usize) -> Result<usize, GasError> {
    // Real and pseudo opcodes are priced uniformly: base gas plus
    // the children, evaluated right-to-left.
    let base = match opcode::real(name) {
        Some(op) => Some(op.gas),
        None => opcode::pseudo(name).map(|op| op.gas),
    };
    if let Some(base) = base {
        let mut cost = base;
        for (i, arg) in node.args.iter().rev().enumerate() {
            cost += walk(arg, depth + i)?;
        }
        match name.to_ascii_uppercase().as_str() {
            // Value transfer can trigger both the transfer stipend
            // and a new-account charge.
            "CALL" if !node.args.get(2).map_or(true, Node::is_zero_literal) => {
                cost += 34000;
            }
            // Storing to a slot which may end up nonzero.
            "SSTORE" if !node.args.get(1).map_or(true, Node::is_zero_literal) => {
                cost += 15000;
            }
            "SUICIDE" | "SELFDESTRUCT" => cost += 25000,
            // Breaking out pops one word per enclosing frame.
            "BREAK" => {
                if let Some(pop) = opcode::real("POP") {
                    cost += pop.gas * depth;
                }
            }
            _ => {}
        }
        return Ok(cost);
    }
    match name {
        "if" => match node.args.len() {
            2 => {
                let cond = walk(&node.args[0], depth + 1)?;
                let then = walk(&node.args[1], depth + 1)?;
                Ok(cond + then + 17)
            }
            3 => {
                let cond = walk(&node.args[0], depth + 1)?;
                let then = walk(&node.args[1], depth + 1)?;
                let other = walk(&node.args[2], depth + 1)?;
                Ok(cond + then.max(other) + 31)
            }
            n => Err(GasError::MalformedNode(format!(
                "if expects 2 or 3 arguments, found {n}"
            ))),
        },
        "with" => {
            if node.args.len() != 3 {
                return Err(GasError::MalformedNode(format!(
                    "with expects 3 arguments, found {}",
                    node.args.len()
                )));
            }
            let expr = walk(&node.args[1], depth + 1)?;
            let body = walk(&node.args[2], depth + 1)?;
            Ok(expr + body + 5)
        }
        "repeat" => {
            if node.args.len() != 4 {
                return Err(GasError::MalformedNode(format!(
                    "repeat expects 4 arguments, found {}",
                    node.args.len()
                )));
            }
            let rounds = match &node.args[2].value {
                Value::Int(x) => usize::try_from(*x).unwrap_or(usize::MAX),
                _ => {
                    return Err(GasError::MalformedNode(
                        "repeat count must be an integer literal".to_string(),
                    ))
                }
            };
            let body = walk(&node.args[3], depth + 1)?;
            Ok((body + 50).saturating_mul(rounds).saturating_add(30))
        }
        "seq" => {
            let mut cost = 0;
            for arg in &node.args {
                cost += walk(arg, depth + 1)?;
            }
            Ok(cost)
        }
        // Anything else resolves to a single stack operation.
        _ => Ok(3),
    }
}
