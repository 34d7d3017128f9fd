//! AST -> CFG translation, pre-SSA dialect (§4.1).
//!
//! Walks a type-checked [`Program`](crate::ast::Program) and emits
//! three-address instructions into a single growing [`Cfg`]. The builder
//! presumes the AST is well-typed; the only failures it can report are the
//! two named in [`BuildError`], which can only arise if the external
//! semantic checker this crate assumes was bypassed.

use crate::ast::{BinOp, Expr, LiteralValue, Program, Stmt, UnaryOp};
use crate::error::BuildError;
use crate::ir::{BlockId, Cfg, ConstValue, Instruction, Label, Operand, Operator, Temp, Type};
use std::collections::HashMap;

/// Builds the pre-SSA CFG for one [`Program`].
///
/// Counters for temp and label numbering are owned by the builder instance,
/// not a process-wide global (§9), so independent builds in the same process
/// (as in this crate's own test suite) never collide.
pub struct IrBuilder {
    cfg: Cfg,
    next_temp: u32,
    next_label: u32,
    current: BlockId,
    /// `(name -> address temp)`. DL has no procedures (§1 non-goals), so one
    /// flat scope covers an entire program.
    scope: HashMap<String, Temp>,
}

impl Default for IrBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IrBuilder {
    pub fn new() -> Self {
        let mut cfg = Cfg::new();
        let entry = cfg.new_block();
        IrBuilder {
            cfg,
            next_temp: 0,
            next_label: 0,
            current: entry,
            scope: HashMap::new(),
        }
    }

    /// Builds a whole program and returns the finished pre-SSA CFG.
    pub fn build(mut self, program: &Program) -> Result<Cfg, BuildError> {
        for stmt in &program.statements {
            self.build_stmt(stmt)?;
        }
        Ok(self.cfg)
    }

    fn fresh_temp(&mut self, ty: Type, is_address: bool) -> Temp {
        let id = self.next_temp;
        self.next_temp += 1;
        Temp {
            id,
            ty,
            is_address,
        }
    }

    fn fresh_label(&mut self) -> Label {
        let id = self.next_label;
        self.next_label += 1;
        Label(id)
    }

    fn emit(&mut self, instr: Instruction) {
        self.cfg.block_mut(self.current).instructions.push(instr);
    }

    /// Closes the current block and opens the block owned by `label`,
    /// creating it lazily if this is the label's first mention (§4.1).
    fn open_block(&mut self, label: Label) {
        let id = self.cfg.block_for_label(label);
        if self.cfg.block(id).instructions.is_empty() {
            self.cfg
                .block_mut(id)
                .instructions
                .push(Instruction::label(label));
        }
        self.current = id;
    }

    fn terminate_goto(&mut self, target: Label) {
        let target_id = self.cfg.block_for_label(target);
        self.emit(Instruction::goto(target));
        self.cfg.add_edge(self.current, target_id);
    }

    fn terminate_if(&mut self, cond: Operand, true_label: Label, false_label: Label) {
        let true_id = self.cfg.block_for_label(true_label);
        let false_id = self.cfg.block_for_label(false_label);
        self.emit(Instruction::if_branch(cond, true_label, false_label));
        self.cfg.add_edge(self.current, true_id);
        self.cfg.add_edge(self.current, false_id);
    }

    fn lookup(&self, name: &str) -> Result<Temp, BuildError> {
        self.scope
            .get(name)
            .copied()
            .ok_or_else(|| BuildError::UndeclaredVariable(name.to_string()))
    }

    fn build_stmt(&mut self, stmt: &Stmt) -> Result<(), BuildError> {
        match stmt {
            Stmt::Decl { name, ty } => {
                if self.scope.contains_key(name) {
                    return Err(BuildError::DuplicateDeclaration(name.clone()));
                }
                let addr = self.fresh_temp(*ty, true);
                self.emit(Instruction {
                    op: Operator::Alloca,
                    arg1: Operand::Empty,
                    arg2: Operand::Empty,
                    result: Operand::Temp(addr),
                });
                self.scope.insert(name.clone(), addr);
            }
            Stmt::Assign { name, value } => {
                let addr = self.lookup(name)?;
                let value = self.build_expr(value)?;
                self.emit(Instruction {
                    op: Operator::Store,
                    arg1: value,
                    arg2: Operand::Empty,
                    result: Operand::Temp(addr),
                });
            }
            Stmt::If { cond, then_branch } => {
                let ltrue = self.fresh_label();
                let lout = self.fresh_label();
                let c = self.build_expr(cond)?;
                self.terminate_if(c, ltrue, lout);
                self.open_block(ltrue);
                for s in then_branch {
                    self.build_stmt(s)?;
                }
                self.terminate_goto(lout);
                self.open_block(lout);
            }
            Stmt::IfElse {
                cond,
                then_branch,
                else_branch,
            } => {
                let ltrue = self.fresh_label();
                let lfalse = self.fresh_label();
                let lout = self.fresh_label();
                let c = self.build_expr(cond)?;
                self.terminate_if(c, ltrue, lfalse);
                self.open_block(ltrue);
                for s in then_branch {
                    self.build_stmt(s)?;
                }
                self.terminate_goto(lout);
                self.open_block(lfalse);
                for s in else_branch {
                    self.build_stmt(s)?;
                }
                self.terminate_goto(lout);
                self.open_block(lout);
            }
            Stmt::While { cond, body } => {
                let lentry = self.fresh_label();
                let lbody = self.fresh_label();
                let lexit = self.fresh_label();
                // Forces a block boundary so the header has two predecessors
                // (pre-header and back-edge), required for correct phi
                // placement later (§4.1).
                self.terminate_goto(lentry);
                self.open_block(lentry);
                let c = self.build_expr(cond)?;
                self.terminate_if(c, lbody, lexit);
                self.open_block(lbody);
                for s in body {
                    self.build_stmt(s)?;
                }
                self.terminate_goto(lentry);
                self.open_block(lexit);
            }
            Stmt::Read { name } => {
                let addr = self.lookup(name)?;
                let fresh = self.fresh_temp(addr.ty, false);
                self.emit(Instruction::read(Operand::Temp(fresh)));
                self.emit(Instruction {
                    op: Operator::Store,
                    arg1: Operand::Temp(fresh),
                    arg2: Operand::Empty,
                    result: Operand::Temp(addr),
                });
            }
            Stmt::Write { value } => {
                let v = self.build_expr(value)?;
                self.emit(Instruction::print(v));
            }
        }
        Ok(())
    }

    fn build_expr(&mut self, expr: &Expr) -> Result<Operand, BuildError> {
        match expr {
            Expr::Literal(lit) => Ok(Operand::Const(literal_to_const(*lit))),
            Expr::Var(name) => {
                let addr = self.lookup(name)?;
                let fresh = self.fresh_temp(addr.ty, false);
                self.emit(Instruction {
                    op: Operator::Load,
                    arg1: Operand::Temp(addr),
                    arg2: Operand::Empty,
                    result: Operand::Temp(fresh),
                });
                Ok(Operand::Temp(fresh))
            }
            Expr::Convert(inner) => {
                let v = self.build_expr(inner)?;
                let fresh = self.fresh_temp(Type::Real, false);
                self.emit(Instruction::unary(
                    Operator::Convert,
                    v,
                    Operand::Temp(fresh),
                ));
                Ok(Operand::Temp(fresh))
            }
            Expr::Unary(op, inner) => {
                let v = self.build_expr(inner)?;
                let ty = operand_type(&v);
                let result_ty = if *op == UnaryOp::Not { Type::Bool } else { ty };
                let fresh = self.fresh_temp(result_ty, false);
                self.emit(Instruction::unary(
                    map_unary(*op),
                    v,
                    Operand::Temp(fresh),
                ));
                Ok(Operand::Temp(fresh))
            }
            Expr::Binary(op, lhs, rhs) => {
                let l = self.build_expr(lhs)?;
                let r = self.build_expr(rhs)?;
                let result_ty = if is_relational(*op) {
                    Type::Bool
                } else {
                    operand_type(&l)
                };
                let fresh = self.fresh_temp(result_ty, false);
                self.emit(Instruction::binary(map_binary(*op), l, r, Operand::Temp(fresh)));
                Ok(Operand::Temp(fresh))
            }
            Expr::Or(lhs, rhs) => self.build_short_circuit(lhs, rhs, true),
            Expr::And(lhs, rhs) => self.build_short_circuit(lhs, rhs, false),
        }
    }

    /// Lowers short-circuit `or`/`and` into the CFG diamond described in
    /// §4.1. `is_or` selects between the `OR` skeleton and its "symmetric
    /// with inverted first branch" `AND` counterpart.
    fn build_short_circuit(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
        is_or: bool,
    ) -> Result<Operand, BuildError> {
        let ltest = self.fresh_label();
        let ltrue = self.fresh_label();
        let lfalse = self.fresh_label();
        let lout = self.fresh_label();

        let c1 = self.build_expr(lhs)?;
        if is_or {
            self.terminate_if(c1, ltrue, ltest);
        } else {
            self.terminate_if(c1, ltest, lfalse);
        }

        self.open_block(ltest);
        let c2 = self.build_expr(rhs)?;
        self.terminate_if(c2, ltrue, lfalse);

        let result = self.fresh_temp(Type::Bool, false);

        self.open_block(ltrue);
        self.emit(Instruction::mov(
            Operand::Const(ConstValue::Bool(true)),
            Operand::Temp(result),
        ));
        self.terminate_goto(lout);

        self.open_block(lfalse);
        self.emit(Instruction::mov(
            Operand::Const(ConstValue::Bool(false)),
            Operand::Temp(result),
        ));
        self.terminate_goto(lout);

        self.open_block(lout);
        Ok(Operand::Temp(result))
    }
}

fn literal_to_const(lit: LiteralValue) -> ConstValue {
    match lit {
        LiteralValue::Int(i) => ConstValue::Int(i),
        LiteralValue::Real(r) => ConstValue::Real(r),
        LiteralValue::Bool(b) => ConstValue::Bool(b),
    }
}

fn operand_type(operand: &Operand) -> Type {
    match operand {
        Operand::Temp(t) => t.ty,
        Operand::Const(c) => c.ty(),
        other => unreachable!("build_expr never produces {other:?} as an rvalue"),
    }
}

fn is_relational(op: BinOp) -> bool {
    matches!(
        op,
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
    )
}

fn map_binary(op: BinOp) -> Operator {
    match op {
        BinOp::Sum => Operator::Sum,
        BinOp::Sub => Operator::Sub,
        BinOp::Mul => Operator::Mul,
        BinOp::Div => Operator::Div,
        BinOp::Mod => Operator::Mod,
        BinOp::Pow => Operator::Pow,
        BinOp::Eq => Operator::Eq,
        BinOp::Ne => Operator::Ne,
        BinOp::Lt => Operator::Lt,
        BinOp::Le => Operator::Le,
        BinOp::Gt => Operator::Gt,
        BinOp::Ge => Operator::Ge,
    }
}

fn map_unary(op: UnaryOp) -> Operator {
    match op {
        UnaryOp::Plus => Operator::Plus,
        UnaryOp::Minus => Operator::Minus,
        UnaryOp::Not => Operator::Not,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::printer::print_cfg;

    fn decl(name: &str, ty: Type) -> Stmt {
        Stmt::Decl {
            name: name.to_string(),
            ty,
        }
    }

    #[test]
    fn straight_line_assignment_builds_three_blocks_worth_of_instructions() {
        let program = Program {
            statements: vec![
                decl("x", Type::Int),
                Stmt::Assign {
                    name: "x".to_string(),
                    value: Expr::Binary(
                        BinOp::Sum,
                        Box::new(Expr::Literal(LiteralValue::Int(2))),
                        Box::new(Expr::Binary(
                            BinOp::Mul,
                            Box::new(Expr::Literal(LiteralValue::Int(3))),
                            Box::new(Expr::Literal(LiteralValue::Int(4))),
                        )),
                    ),
                },
                Stmt::Write {
                    value: Expr::Var("x".to_string()),
                },
            ],
        };

        let cfg = IrBuilder::new().build(&program).unwrap();
        assert_eq!(cfg.blocks.len(), 1);
        let text = print_cfg(&cfg);
        assert!(text.contains("alloca"));
        assert!(text.contains("print"));
    }

    #[test]
    fn while_loop_header_has_two_predecessors() {
        let program = Program {
            statements: vec![
                decl("i", Type::Int),
                Stmt::Assign {
                    name: "i".to_string(),
                    value: Expr::Literal(LiteralValue::Int(0)),
                },
                Stmt::While {
                    cond: Expr::Binary(
                        BinOp::Lt,
                        Box::new(Expr::Var("i".to_string())),
                        Box::new(Expr::Literal(LiteralValue::Int(3))),
                    ),
                    body: vec![Stmt::Assign {
                        name: "i".to_string(),
                        value: Expr::Binary(
                            BinOp::Sum,
                            Box::new(Expr::Var("i".to_string())),
                            Box::new(Expr::Literal(LiteralValue::Int(1))),
                        ),
                    }],
                },
                Stmt::Write {
                    value: Expr::Var("i".to_string()),
                },
            ],
        };

        let cfg = IrBuilder::new().build(&program).unwrap();
        let header = cfg
            .blocks
            .iter()
            .find(|b| b.predecessors.len() == 2)
            .expect("loop header with two predecessors");
        assert_eq!(header.predecessors.len(), 2);
    }

    #[test]
    fn undeclared_variable_is_reported_not_panicked() {
        let program = Program {
            statements: vec![Stmt::Write {
                value: Expr::Var("missing".to_string()),
            }],
        };
        let err = IrBuilder::new().build(&program).unwrap_err();
        assert_eq!(err, BuildError::UndeclaredVariable("missing".to_string()));
    }
}
