//! Operand and value types shared by both IR dialects (pre-SSA and SSA).

use super::block::BlockId;
use std::fmt;

/// The three surface types DL supports. Each carries the spill-slot size the
/// linear-scan allocator needs; there is no aggregate or pointer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Real,
    Bool,
}

impl Type {
    /// Size in bytes of a spill slot for a value of this type.
    pub fn size_bytes(self) -> u32 {
        match self {
            Type::Int => 4,
            Type::Real => 8,
            Type::Bool => 4,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Real => write!(f, "real"),
            Type::Bool => write!(f, "bool"),
        }
    }
}

/// A source-level temporary minted by the IR builder.
///
/// `is_address` is set on the temp produced by `ALLOCA`; mem2reg (§4.3a)
/// relies on this flag to recognize which temps denote storage locations
/// rather than ordinary scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Temp {
    pub id: u32,
    pub ty: Type,
    pub is_address: bool,
}

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.id)
    }
}

/// A temp after SSA renaming: `(origin, version)`. Each `TempVersion` is
/// written by exactly one instruction (§4.3 invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TempVersion {
    pub origin: Temp,
    pub version: u32,
}

impl fmt::Display for TempVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}_{}", self.origin.id, self.version)
    }
}

/// A constant value. Booleans print as `0`/`1` per §6.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Int(i32),
    Real(f64),
    Bool(bool),
}

impl ConstValue {
    pub fn ty(self) -> Type {
        match self {
            ConstValue::Int(_) => Type::Int,
            ConstValue::Real(_) => Type::Real,
            ConstValue::Bool(_) => Type::Bool,
        }
    }

    /// Truthiness used by `IF` and branch folding. Only meaningful for
    /// `Bool`; callers only invoke this on boolean-typed operands.
    pub fn is_truthy(self) -> bool {
        match self {
            ConstValue::Bool(b) => b,
            ConstValue::Int(i) => i != 0,
            ConstValue::Real(r) => r != 0.0,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(i) => write!(f, "{i}"),
            ConstValue::Real(r) => write!(f, "{r}"),
            ConstValue::Bool(b) => write!(f, "{}", if *b { 1 } else { 0 }),
        }
    }
}

/// A jump target. Distinct from `BlockId`: labels are minted by the builder
/// at AST-walk time, and the owning block may be created lazily afterwards
/// (§4.1 "block stitching contract").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// One incoming edge of a φ: which predecessor block, and which versioned
/// temp it supplies. Stored as a `Vec` rather than a `HashMap` to preserve
/// insertion order -- printing and the interpreter both depend on φ paths
/// being iterated in the same order as `predecessors(b)` (§9).
pub type PhiPaths = Vec<(BlockId, TempVersion)>;

/// A sum type covering every slot an `Instruction` can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Temp(Temp),
    TempVersion(TempVersion),
    Const(ConstValue),
    Label(Label),
    Phi(PhiPaths),
    /// Unit placeholder so every instruction slot is non-null (§3).
    Empty,
}

impl Operand {
    pub fn as_temp(&self) -> Option<Temp> {
        match self {
            Operand::Temp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_temp_version(&self) -> Option<TempVersion> {
        match self {
            Operand::TempVersion(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_const(&self) -> Option<ConstValue> {
        match self {
            Operand::Const(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<Label> {
        match self {
            Operand::Label(l) => Some(*l),
            _ => None,
        }
    }

    pub fn as_phi(&self) -> Option<&PhiPaths> {
        match self {
            Operand::Phi(paths) => Some(paths),
            _ => None,
        }
    }

    pub fn as_phi_mut(&mut self) -> Option<&mut PhiPaths> {
        match self {
            Operand::Phi(paths) => Some(paths),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Operand::Empty)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Temp(t) => write!(f, "{t}"),
            Operand::TempVersion(v) => write!(f, "{v}"),
            Operand::Const(c) => write!(f, "{c}"),
            Operand::Label(l) => write!(f, "{l}"),
            Operand::Phi(paths) => {
                write!(f, "phi [")?;
                for (i, (block, value)) in paths.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "B{}: {}", block.0, value)?;
                }
                write!(f, "]")
            }
            Operand::Empty => write!(f, ""),
        }
    }
}
