//! DL middle-end
//!
//! Takes an already type-checked [`ast::Program`] and runs it through:
//!
//! 1. [`builder::IrBuilder`] — three-address pre-SSA CFG construction.
//! 2. [`ssa::construct_ssa`] — dominance-frontier φ placement and
//!    stack-based renaming into pruned SSA form.
//! 3. [`optimize::optimize_ssa`] — a fixed-point pipeline of copy
//!    propagation, constant folding, branch folding, unreachable-block
//!    elimination, φ-simplification, dead-code elimination, and block
//!    merging.
//! 4. [`interp::interpret`] — a tree-walking interpreter over the resulting
//!    SSA CFG, or [`regalloc::allocate`] for a linear-scan register
//!    assignment instead.
//!
//! Lexing, parsing, semantic checking, a command-line driver, and any
//! machine-code back end are all external collaborators this crate does not
//! provide; see [`ast`] for the data contract they hand in.
//!
//! # Example
//!
//! ```rust,ignore
//! use dl_midend::{ast::*, builder::IrBuilder, ssa, optimize, interp};
//! use std::io::{stdin, stdout};
//!
//! let program = Program { statements: vec![] };
//! let mut cfg = IrBuilder::new().build(&program)?;
//! ssa::construct_ssa(&mut cfg);
//! optimize::optimize_ssa(&mut cfg, &optimize::OptimizerConfig::new());
//! interp::interpret(&cfg, &mut stdin().lock(), &mut stdout())?;
//! ```

pub mod arith;
pub mod ast;
pub mod builder;
pub mod dominance;
pub mod error;
pub mod interp;
pub mod ir;
pub mod liveness;
pub mod optimize;
pub mod regalloc;
pub mod ssa;

pub use ast::Program;
pub use error::{BuildError, InterpError};
pub use ir::Cfg;
pub use optimize::{optimize_ssa, OptimizerConfig};
