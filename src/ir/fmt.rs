//! Plain-text rendering of lowered IR, for tests and `--dump-ir`-style
//! debugging.
//!
//! The output is one statement per line.  Binary and unary operations are
//! fully parenthesized so the tree shape is unambiguous without precedence
//! rules.

use std::fmt::Write;

use crate::consts::ConstTable;
use crate::entity::EntityTable;

use super::{Expr, Stmt};

pub fn stringify_body(body: &[Stmt], entities: &EntityTable, consts: &ConstTable) -> String {
    let render = Render { entities, consts };
    let mut out = String::new();
    for stmt in body {
        render.stmt(&mut out, stmt);
        out.push('\n');
    }
    out
}

pub fn stringify_expr(expr: &Expr, entities: &EntityTable, consts: &ConstTable) -> String {
    let render = Render { entities, consts };
    let mut out = String::new();
    render.expr(&mut out, expr);
    out
}

struct Render<'a> {
    entities: &'a EntityTable,
    consts: &'a ConstTable,
}

impl Render<'_> {
    fn stmt(&self, out: &mut String, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { lhs, rhs, .. } => {
                self.expr(out, lhs);
                out.push_str(" = ");
                self.expr(out, rhs);
                out.push(';');
            }
            Stmt::ExprStmt { expr, .. } => {
                self.expr(out, expr);
                out.push(';');
            }
            Stmt::Label { label } => {
                let _ = write!(out, "{}:", label);
            }
            Stmt::Jump { to, .. } => {
                let _ = write!(out, "jump {};", to);
            }
            Stmt::CondJump { cond, then_label, else_label, .. } => {
                out.push_str("cjump ");
                self.expr(out, cond);
                let _ = write!(out, " {} {};", then_label, else_label);
            }
            Stmt::Switch { cond, cases, default_label, end_label, .. } => {
                out.push_str("switch ");
                self.expr(out, cond);
                out.push_str(" [");
                for (i, case) in cases.iter().enumerate() {
                    if i != 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{} -> {}", case.value, case.label);
                }
                let _ = write!(out, "] default {} end {};", default_label, end_label);
            }
            Stmt::Return { value, .. } => {
                out.push_str("return");
                if let Some(value) = value {
                    out.push(' ');
                    self.expr(out, value);
                }
                out.push(';');
            }
        }
    }

    fn expr(&self, out: &mut String, expr: &Expr) {
        match expr {
            Expr::Int { value, .. } => {
                let _ = write!(out, "{}", value);
            }
            Expr::Str { entry, .. } => {
                let _ = write!(out, "{:?}", self.consts.get(*entry));
            }
            Expr::Var { entity, .. } => {
                let _ = write!(out, "{}", self.entities.get(*entity).name);
            }
            Expr::Bin { op, lhs, rhs, .. } => {
                out.push('(');
                self.expr(out, lhs);
                let _ = write!(out, " {} ", op);
                self.expr(out, rhs);
                out.push(')');
            }
            Expr::Uni { op, expr, .. } => {
                let _ = write!(out, "({}", op);
                if matches!(op, super::Op::Cast | super::Op::SCast | super::Op::UCast) {
                    out.push(' ');
                }
                self.expr(out, expr);
                out.push(')');
            }
            Expr::Mem { addr, .. } => {
                out.push('*');
                self.expr(out, addr);
            }
            Expr::Addr { expr, .. } => {
                out.push('&');
                self.expr(out, expr);
            }
            Expr::Call { callee, args, .. } => {
                self.expr(out, callee);
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i != 0 {
                        out.push_str(", ");
                    }
                    self.expr(out, arg);
                }
                out.push(')');
            }
        }
    }
}
