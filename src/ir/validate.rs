//! Structural checks on lowered function bodies.
//!
//! These are the invariants the code generator gets to rely on.  The checker
//! runs in tests over every lowered body; it is also cheap enough to run on
//! demand when debugging a miscompile.
//!
//! Expression purity needs no check: [`super::Expr`] has no variant that can
//! contain a statement.

use std::collections::HashMap;

use crate::types::TypeTable;

use super::{Expr, Label, Stmt};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum InvalidIr {
    #[error("label {0} is defined {1} times")]
    DuplicateLabel(Label, usize),
    #[error("jump to undefined label {0}")]
    UndefinedLabel(Label),
    #[error("assignment target is neither a variable nor a load")]
    BadAssignTarget,
    #[error("address-of directly wraps a load")]
    AddrOfMem,
    #[error("load directly wraps a pointer-typed address-of")]
    MemOfAddr,
}

/// Check one function body against the IR invariants.
pub fn check_body(body: &[Stmt], types: &TypeTable) -> Result<(), InvalidIr> {
    let mut definitions = HashMap::<Label, usize>::new();
    let mut references = Vec::<Label>::new();

    for stmt in body {
        match stmt {
            Stmt::Label { label } => {
                *definitions.entry(*label).or_insert(0) += 1;
            }
            Stmt::Jump { to, .. } => references.push(*to),
            Stmt::CondJump { cond, then_label, else_label, .. } => {
                references.push(*then_label);
                references.push(*else_label);
                check_expr(cond, types)?;
            }
            Stmt::Switch { cond, cases, default_label, end_label, .. } => {
                references.extend(cases.iter().map(|case| case.label));
                references.push(*default_label);
                references.push(*end_label);
                check_expr(cond, types)?;
            }
            Stmt::Assign { lhs, rhs, .. } => {
                if !matches!(lhs, Expr::Var { .. } | Expr::Mem { .. }) {
                    return Err(InvalidIr::BadAssignTarget);
                }
                check_expr(lhs, types)?;
                check_expr(rhs, types)?;
            }
            Stmt::ExprStmt { expr, .. } => check_expr(expr, types)?,
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    check_expr(value, types)?;
                }
            }
        }
    }

    for (&label, &count) in &definitions {
        if count > 1 {
            return Err(InvalidIr::DuplicateLabel(label, count));
        }
    }
    for label in references {
        if !definitions.contains_key(&label) {
            return Err(InvalidIr::UndefinedLabel(label));
        }
    }
    Ok(())
}

fn check_expr(expr: &Expr, types: &TypeTable) -> Result<(), InvalidIr> {
    match expr {
        Expr::Int { .. } | Expr::Str { .. } | Expr::Var { .. } => Ok(()),
        Expr::Bin { lhs, rhs, .. } => {
            check_expr(lhs, types)?;
            check_expr(rhs, types)
        }
        Expr::Uni { expr, .. } => check_expr(expr, types),
        Expr::Addr { expr, .. } => {
            if matches!(**expr, Expr::Mem { .. }) {
                return Err(InvalidIr::AddrOfMem);
            }
            check_expr(expr, types)
        }
        Expr::Mem { addr, .. } => {
            // An `Addr` with an array carrier type is how array decay is
            // spelled; only a pointer-typed `Addr` here means the algebra
            // failed to cancel.
            if let Expr::Addr { ty, .. } = &**addr {
                if types.is_pointer(*ty) {
                    return Err(InvalidIr::MemOfAddr);
                }
            }
            check_expr(addr, types)
        }
        Expr::Call { callee, args, .. } => {
            check_expr(callee, types)?;
            args.iter().try_for_each(|arg| check_expr(arg, types))
        }
    }
}
