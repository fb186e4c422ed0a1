//! The typed AST, as delivered by the semantic analyzer.
//!
//! This is the input contract of the lowering pass.  Everything type- or
//! name-shaped has already been resolved: expressions carry their [`TypeId`],
//! variable references carry an [`EntityId`], member accesses carry a byte
//! offset, array references carry element size and dimension data, casts are
//! marked effective or not, and `sizeof` is already a number.  Lowering reads
//! these facts; it never re-derives them.

use crate::consts::ConstTable;
use crate::entity::{EntityId, EntityTable, ScopeId};
use crate::ident::Ident;
use crate::pos::Sp;
use crate::types::{TypeId, TypeTable};

/// A fully-analyzed program.
#[derive(Debug)]
pub struct Program {
    pub types: TypeTable,
    pub entities: EntityTable,
    pub consts: ConstTable,
    /// Module-scope variables, in definition order.
    pub defined_variables: Vec<DefinedVariable>,
    pub defined_functions: Vec<DefinedFunction>,
}

/// A defined variable together with its (optional) initializer.
///
/// Used both for module-scope variables and for locals declared in a
/// [`Block`].
#[derive(Debug, Clone)]
pub struct DefinedVariable {
    pub entity: EntityId,
    pub init: Option<Sp<Expr>>,
}

#[derive(Debug)]
pub struct DefinedFunction {
    pub entity: EntityId,
    pub body: Block,
}

/// A braced statement list with its resolved lexical scope and the locals
/// declared directly in it.
#[derive(Debug, Clone)]
pub struct Block {
    pub scope: ScopeId,
    pub variables: Vec<DefinedVariable>,
    pub stmts: Vec<Sp<Stmt>>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Block(Block),
    Expr(Sp<Expr>),
    If {
        cond: Sp<Expr>,
        then_body: Box<Sp<Stmt>>,
        else_body: Option<Box<Sp<Stmt>>>,
    },
    While {
        cond: Sp<Expr>,
        body: Box<Sp<Stmt>>,
    },
    DoWhile {
        body: Box<Sp<Stmt>>,
        cond: Sp<Expr>,
    },
    For {
        init: Option<Sp<Expr>>,
        cond: Option<Sp<Expr>>,
        step: Option<Sp<Expr>>,
        body: Box<Sp<Stmt>>,
    },
    Switch {
        cond: Sp<Expr>,
        cases: Vec<SwitchCase>,
    },
    Break,
    Continue,
    /// `name: stmt`
    Label {
        name: Sp<Ident>,
        body: Option<Box<Sp<Stmt>>>,
    },
    Goto {
        target: Sp<Ident>,
    },
    Return {
        value: Option<Sp<Expr>>,
    },
}

/// One `case`/`default` clause of a `switch`.
///
/// An empty value list marks the default clause.  Several values on one
/// clause (`case 1: case 2:` folded by the parser) share a single body.
#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub values: Vec<Sp<Expr>>,
    pub body: Block,
}

impl SwitchCase {
    pub fn is_default(&self) -> bool {
        self.values.is_empty()
    }
}

/// A typed expression node.
#[derive(Debug, Clone)]
pub struct Expr {
    pub ty: TypeId,
    /// Set by the semantic analyzer on nodes that evaluate to an address
    /// rather than a loaded value: array- and function-typed lvalues, which
    /// decay to their own address.
    pub eval_to_address: bool,
    pub kind: ExprKind,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Int(i64),
    Str(crate::consts::ConstId),
    Var(EntityId),
    Bin {
        op: Sp<BinaryOp>,
        lhs: Box<Sp<Expr>>,
        rhs: Box<Sp<Expr>>,
    },
    Unary {
        op: Sp<UnaryOp>,
        expr: Box<Sp<Expr>>,
    },
    /// `++e` / `--e`
    Prefix {
        op: Sp<IncDecOp>,
        expr: Box<Sp<Expr>>,
    },
    /// `e++` / `e--`
    Suffix {
        op: Sp<IncDecOp>,
        expr: Box<Sp<Expr>>,
    },
    Assign {
        lhs: Box<Sp<Expr>>,
        rhs: Box<Sp<Expr>>,
    },
    /// `lhs op= rhs`
    OpAssign {
        op: Sp<BinaryOp>,
        lhs: Box<Sp<Expr>>,
        rhs: Box<Sp<Expr>>,
    },
    /// `cond ? then_expr : else_expr`
    Ternary {
        cond: Box<Sp<Expr>>,
        then_expr: Box<Sp<Expr>>,
        else_expr: Box<Sp<Expr>>,
    },
    Funcall {
        callee: Box<Sp<Expr>>,
        args: Vec<Sp<Expr>>,
    },
    /// `base[index]`
    Aref {
        base: Box<Sp<Expr>>,
        index: Box<Sp<Expr>>,
        /// Size of the element this node selects.
        element_size: u64,
        /// Length of the array along this node's axis.
        length: u64,
        /// Is `base` itself an array reference into a multi-dimensional
        /// array?  Drives the flattened-index recursion.
        multi_dimension: bool,
    },
    /// `base.member`
    Member {
        base: Box<Sp<Expr>>,
        member: Sp<Ident>,
        offset: u64,
    },
    /// `base->member`
    PtrMember {
        base: Box<Sp<Expr>>,
        member: Sp<Ident>,
        offset: u64,
    },
    /// `*expr`
    Deref {
        expr: Box<Sp<Expr>>,
    },
    /// `&expr`
    Addr {
        expr: Box<Sp<Expr>>,
    },
    Cast {
        /// Does the cast change machine representation?  No-op casts between
        /// structurally identical types are lowered as the identity.
        effective: bool,
        expr: Box<Sp<Expr>>,
    },
    /// `sizeof(type)` / `sizeof expr`, already folded by the analyzer.
    Sizeof {
        alloc_size: u64,
    },
}

string_enum! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub enum BinaryOp {
        #[strum(serialize = "+")] Add,
        #[strum(serialize = "-")] Sub,
        #[strum(serialize = "*")] Mul,
        #[strum(serialize = "/")] Div,
        #[strum(serialize = "%")] Rem,
        #[strum(serialize = "&")] BitAnd,
        #[strum(serialize = "|")] BitOr,
        #[strum(serialize = "^")] BitXor,
        #[strum(serialize = "<<")] ShiftLeft,
        #[strum(serialize = ">>")] ShiftRight,
        #[strum(serialize = "==")] Eq,
        #[strum(serialize = "!=")] Ne,
        #[strum(serialize = "<")] Lt,
        #[strum(serialize = "<=")] Le,
        #[strum(serialize = ">")] Gt,
        #[strum(serialize = ">=")] Ge,
        #[strum(serialize = "&&")] LogicAnd,
        #[strum(serialize = "||")] LogicOr,
    }
}

impl BinaryOp {
    /// Short-circuit operators get their own lowering; everything else maps
    /// directly onto an IR operator.
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::LogicAnd | BinaryOp::LogicOr)
    }
}

string_enum! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub enum UnaryOp {
        #[strum(serialize = "+")] Plus,
        #[strum(serialize = "-")] Neg,
        #[strum(serialize = "!")] Not,
        #[strum(serialize = "~")] BitNot,
    }
}

string_enum! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub enum IncDecOp {
        #[strum(serialize = "++")] Inc,
        #[strum(serialize = "--")] Dec,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ops_parse_by_token() {
        assert_eq!("+".parse::<BinaryOp>(), Ok(BinaryOp::Add));
        assert_eq!(">>".parse::<BinaryOp>(), Ok(BinaryOp::ShiftRight));
        assert_eq!("&&".parse::<BinaryOp>(), Ok(BinaryOp::LogicAnd));
        assert_eq!("~".parse::<UnaryOp>(), Ok(UnaryOp::BitNot));
        assert_eq!("++".parse::<IncDecOp>(), Ok(IncDecOp::Inc));
        assert!("<>".parse::<BinaryOp>().is_err());
    }

    #[test]
    fn ops_display_by_token() {
        assert_eq!(BinaryOp::Le.to_string(), "<=");
        assert_eq!(UnaryOp::Neg.to_string(), "-");
    }
}
