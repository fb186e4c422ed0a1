//! The flat intermediate representation produced by lowering.
//!
//! A function body is an ordered list of [`Stmt`]s over *pure* expression
//! trees: by the time IR exists, every side effect has been turned into its
//! own statement and every high-level construct into labels and jumps.  The
//! statement/expression split is structural — [`Expr`] simply has no variant
//! that could contain a [`Stmt`] — so purity cannot regress silently.

use crate::ast;
use crate::consts::ConstId;
use crate::entity::EntityId;
use crate::pos::Span;
use crate::types::TypeId;

pub mod fmt;
pub mod validate;

pub use self::fmt::{stringify_body, stringify_expr};

/// The lowered program: the AST's definitions, with bodies and initializers
/// replaced by IR.  The type, entity, and constant tables pass through
/// unchanged (aside from the temporaries lowering added).
#[derive(Debug)]
pub struct Program {
    /// Module-scope variables and function-local statics.
    pub variables: Vec<DefinedVariable>,
    pub functions: Vec<DefinedFunction>,
}

#[derive(Debug)]
pub struct DefinedVariable {
    pub entity: EntityId,
    /// A single pure expression; statically allocated variables cannot have
    /// runtime initialization code.
    pub init: Option<Expr>,
}

#[derive(Debug)]
pub struct DefinedFunction {
    pub entity: EntityId,
    pub body: Vec<Stmt>,
}

/// A branch target identity, unique within one function body.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub u32);

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Store `rhs` into the location `lhs` (a loadable `Var` or a `Mem`).
    Assign { loc: Span, lhs: Expr, rhs: Expr },
    /// Evaluate for side effects, discard the value.
    ExprStmt { loc: Span, expr: Expr },
    /// Jump target.
    Label { label: Label },
    Jump { loc: Span, to: Label },
    /// Two-way branch on the truthiness of `cond`.
    CondJump {
        loc: Span,
        cond: Expr,
        then_label: Label,
        else_label: Label,
    },
    /// Multi-way branch on an integer value.
    Switch {
        loc: Span,
        cond: Expr,
        cases: Vec<Case>,
        default_label: Label,
        end_label: Label,
    },
    Return { loc: Span, value: Option<Expr> },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Case {
    pub value: i64,
    pub label: Label,
}

/// A pure expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int {
        ty: TypeId,
        value: i64,
    },
    /// Pointer to a constant-pool entry.
    Str {
        ty: TypeId,
        entry: ConstId,
    },
    Var {
        ty: TypeId,
        entity: EntityId,
    },
    Bin {
        ty: TypeId,
        op: Op,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Uni {
        ty: TypeId,
        op: Op,
        expr: Box<Expr>,
    },
    /// Load from an address; `ty` is the pointee type.
    Mem {
        ty: TypeId,
        addr: Box<Expr>,
    },
    /// Address of an inner location.  For array- and struct-valued operands
    /// the carrier type stays the operand's own type (see the address
    /// algebra in the lowering pass).
    Addr {
        ty: TypeId,
        expr: Box<Expr>,
    },
    /// A call is pure *here* only because lowering already sequenced it;
    /// the code generator still treats it as effectful.
    Call {
        ty: TypeId,
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn ty(&self) -> TypeId {
        match self {
            | Expr::Int { ty, .. }
            | Expr::Str { ty, .. }
            | Expr::Var { ty, .. }
            | Expr::Bin { ty, .. }
            | Expr::Uni { ty, .. }
            | Expr::Mem { ty, .. }
            | Expr::Addr { ty, .. }
            | Expr::Call { ty, .. }
            => *ty,
        }
    }

    /// Is this a location whose address is known without evaluating any
    /// sub-expression?  (In practice: a named variable.)
    pub fn is_constant_address(&self) -> bool {
        matches!(self, Expr::Var { .. })
    }
}

/// The closed operator set of the IR.
///
/// Signedness is resolved at lowering time where it matters: source `>>`
/// becomes [`Op::ArShift`] or [`Op::RShift`], and effective casts become
/// [`Op::SCast`] or [`Op::UCast`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[derive(strum::Display)]
pub enum Op {
    #[strum(serialize = "+")] Add,
    #[strum(serialize = "-")] Sub,
    #[strum(serialize = "*")] Mul,
    #[strum(serialize = "/")] Div,
    #[strum(serialize = "%")] Mod,
    #[strum(serialize = "&")] And,
    #[strum(serialize = "|")] Or,
    #[strum(serialize = "^")] Xor,
    #[strum(serialize = "<<")] LShift,
    /// Logical (zero-filling) right shift.
    #[strum(serialize = ">>>")] RShift,
    /// Arithmetic (sign-extending) right shift.
    #[strum(serialize = ">>")] ArShift,
    #[strum(serialize = "==")] Eq,
    #[strum(serialize = "!=")] Neq,
    #[strum(serialize = "<")] Lt,
    #[strum(serialize = "<=")] LtEq,
    #[strum(serialize = ">")] Gt,
    #[strum(serialize = ">=")] GtEq,
    #[strum(serialize = "~")] BitNot,
    #[strum(serialize = "!")] Not,
    #[strum(serialize = "-")] UMinus,
    /// Representation-preserving conversion.
    #[strum(serialize = "cast")] Cast,
    /// Sign-extending conversion.
    #[strum(serialize = "s_cast")] SCast,
    /// Zero-extending conversion.
    #[strum(serialize = "u_cast")] UCast,
}

impl Op {
    /// Map a source-level binary operator onto the IR operator set.
    ///
    /// `signed` drives the choice of right shift and comes from the operand
    /// type, which the semantic analyzer already checked.
    pub fn intern_binary(op: ast::BinaryOp, signed: bool) -> Op {
        match op {
            ast::BinaryOp::Add => Op::Add,
            ast::BinaryOp::Sub => Op::Sub,
            ast::BinaryOp::Mul => Op::Mul,
            ast::BinaryOp::Div => Op::Div,
            ast::BinaryOp::Rem => Op::Mod,
            ast::BinaryOp::BitAnd => Op::And,
            ast::BinaryOp::BitOr => Op::Or,
            ast::BinaryOp::BitXor => Op::Xor,
            ast::BinaryOp::ShiftLeft => Op::LShift,
            ast::BinaryOp::ShiftRight => if signed { Op::ArShift } else { Op::RShift },
            ast::BinaryOp::Eq => Op::Eq,
            ast::BinaryOp::Ne => Op::Neq,
            ast::BinaryOp::Lt => Op::Lt,
            ast::BinaryOp::Le => Op::LtEq,
            ast::BinaryOp::Gt => Op::Gt,
            ast::BinaryOp::Ge => Op::GtEq,
            ast::BinaryOp::LogicAnd | ast::BinaryOp::LogicOr => {
                panic!("(bug!) short-circuit operator {} has no direct IR equivalent", op)
            }
        }
    }

    pub fn intern_unary(op: ast::UnaryOp) -> Op {
        match op {
            ast::UnaryOp::Neg => Op::UMinus,
            ast::UnaryOp::Not => Op::Not,
            ast::UnaryOp::BitNot => Op::BitNot,
            ast::UnaryOp::Plus => panic!("(bug!) unary plus is the identity and is never interned"),
        }
    }
}
