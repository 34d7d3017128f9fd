//! Error types for the IR builder and interpreter.
//!
//! Mirrors the hand-rolled error style used elsewhere in this crate's lineage
//! (a small enum, a manual `Display`, a manual `std::error::Error`) rather than
//! a derive-macro based error crate: there are only two fallible subsystems and
//! neither needs anything past `?`-propagation and a human-readable message.

use std::fmt;

/// Failure building the pre-SSA CFG from a typed AST.
///
/// The AST handed to the builder is presumed already validated by an external
/// semantic checker (out of scope for this crate, see the crate's spec §1).
/// `BuildError` exists for the narrow case where that presumption is violated
/// -- e.g. a `Var` reference to a name with no matching `Decl` in scope -- so
/// that callers get a `Result` instead of a panic from a library entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A variable was referenced before any `Decl` introduced it in scope.
    UndeclaredVariable(String),
    /// A variable was declared twice in the same scope.
    DuplicateDeclaration(String),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::UndeclaredVariable(name) => {
                write!(f, "undeclared variable referenced: {name}")
            }
            BuildError::DuplicateDeclaration(name) => {
                write!(f, "variable declared more than once: {name}")
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// A runtime failure while interpreting the SSA CFG (§4.5, §7).
///
/// These are the only two interpreter-level failures the spec names:
/// division/modulus by zero (which constant folding deliberately declines to
/// resolve, see §4.4) and malformed `READ` input. Both stop interpretation
/// gracefully; neither is a translator bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpError {
    /// Integer division or modulus by a zero divisor.
    DivisionByZero,
    /// `READ` input could not be parsed as the target operand's type.
    InvalidInput,
}

impl fmt::Display for InterpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpError::DivisionByZero => write!(f, "division or modulus by zero"),
            InterpError::InvalidInput => {
                write!(f, "Entrada de dados inválida! Interpretação encerrada.")
            }
        }
    }
}

impl std::error::Error for InterpError {}
