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

/// Functionality related to symbolic assembly.  This includes the
/// token stream produced by lowering, symbolic labels, and the
/// encoder which resolves labels into absolute byte offsets and
/// emits raw bytecode.
pub mod asm;
/// Constants and metadata for individual EVM bytecode instructions.
/// This includes the opcode byte for every mnemonic, along with its
/// stack arities and base gas cost.
pub mod evm;
/// Functionality for working with the LLL intermediate
/// representation.  This includes constructing trees, estimating
/// their gas consumption, and lowering them to symbolic assembly.
pub mod lll;
pub mod util;
