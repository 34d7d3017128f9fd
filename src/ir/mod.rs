//! The IR model: operators, operands, instructions, basic blocks, and the
//! CFG that owns them (§3).

pub mod block;
pub mod cfg;
pub mod instr;
pub mod operand;
pub mod operator;
pub mod printer;

pub use block::{BasicBlock, BlockId};
pub use cfg::Cfg;
pub use instr::Instruction;
pub use operand::{ConstValue, Label, Operand, PhiPaths, Temp, TempVersion, Type};
pub use operator::Operator;
