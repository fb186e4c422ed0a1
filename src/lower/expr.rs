//! Expression lowering.
//!
//! Every method here returns a *pure* IR expression; side effects are pushed
//! into the statement list on the way.  Where the enclosing expression still
//! needs the value of a side-effecting construct, the value is parked in a
//! fresh temporary and the defining assignment is hoisted in front of the
//! statement being lowered (`assign_before_stmt`).

use crate::ast::{self, BinaryOp, IncDecOp, UnaryOp};
use crate::ir::{self, Op};
use crate::pos::{Sp, Span};
use crate::types::TypeId;

use super::Lowerer;

impl Lowerer<'_> {
    /// Lower an expression nested inside another expression or statement.
    ///
    /// `None` means "the expression was in statement context and has already
    /// been emitted as statements"; callers that need a value must not see it
    /// (they go through [`Self::transform_subexpr`]).
    pub(super) fn transform_expr(&mut self, expr: &Sp<ast::Expr>) -> Option<ir::Expr> {
        self.expr_nest_level += 1;
        let result = self.transform_expr_inner(expr);
        self.expr_nest_level -= 1;
        result
    }

    /// Lower an expression whose value the enclosing *statement* demands: a
    /// condition, a return value, a case value, or an initializer.
    ///
    /// The operand is evaluated one nesting level deep, so side-effecting
    /// constructs hoist their value through a temporary instead of treating
    /// themselves as a whole statement.
    pub(super) fn transform_value_expr(&mut self, expr: &Sp<ast::Expr>) -> ir::Expr {
        self.before_stmt = self.stmts.len();
        self.expr_nest_level += 1;
        let result = self.transform_subexpr(expr);
        self.expr_nest_level -= 1;
        result
    }

    /// Lower a subexpression, which always yields a value.
    fn transform_subexpr(&mut self, expr: &Sp<ast::Expr>) -> ir::Expr {
        self.transform_expr(expr)
            .expect("(bug!) subexpression lowered to nothing")
    }

    /// Directly under an expression statement?  Such expressions may emit
    /// themselves as statements and yield no value.
    fn is_statement(&self) -> bool {
        self.expr_nest_level <= 1
    }

    fn transform_expr_inner(&mut self, expr: &Sp<ast::Expr>) -> Option<ir::Expr> {
        let span = expr.span;
        let ty = expr.ty;
        match &expr.kind {
            ast::ExprKind::Int(value) => Some(ir::Expr::Int { ty, value: *value }),

            ast::ExprKind::Str(entry) => Some(ir::Expr::Str { ty, entry: *entry }),

            ast::ExprKind::Sizeof { alloc_size } => {
                Some(ir::Expr::Int { ty, value: *alloc_size as i64 })
            }

            ast::ExprKind::Var(entity) => {
                let var = self.ref_var(*entity);
                Some(match expr.eval_to_address {
                    true => self.address_of(var),
                    false => var,
                })
            }

            ast::ExprKind::Bin { op, lhs, rhs } if op.value.is_logical() => {
                self.transform_logical(span, ty, op.value, lhs, rhs)
            }

            ast::ExprKind::Bin { op, lhs, rhs } => {
                Some(self.transform_binary(ty, op.value, lhs, rhs))
            }

            ast::ExprKind::Unary { op, expr: operand } => match op.value {
                // +e is the identity
                UnaryOp::Plus => self.transform_expr(operand),
                op => {
                    let operand = self.transform_subexpr(operand);
                    Some(ir::Expr::Uni {
                        ty,
                        op: Op::intern_unary(op),
                        expr: Box::new(operand),
                    })
                }
            },

            ast::ExprKind::Ternary { cond, then_expr, else_expr } => {
                self.transform_ternary(span, ty, cond, then_expr, else_expr)
            }

            ast::ExprKind::Assign { lhs, rhs } => self.transform_assign(span, lhs, rhs),

            ast::ExprKind::OpAssign { op, lhs, rhs } => {
                // rhs evaluates before lhs
                let rhs_ir = self.transform_subexpr(rhs);
                let lhs_ir = self.transform_lhs(lhs);
                let op = Op::intern_binary(op.value, self.types.is_signed(lhs.ty));
                self.transform_op_assign(span, op, lhs.ty, lhs_ir, rhs_ir)
            }

            ast::ExprKind::Prefix { op, expr: target } => {
                // ++e behaves exactly like e += 1
                let one = self.int_one();
                let lhs_ir = self.transform_lhs(target);
                let op = Self::inc_dec_op(op.value);
                self.transform_op_assign(span, op, target.ty, lhs_ir, one)
            }

            ast::ExprKind::Suffix { op, expr: target } => {
                self.transform_suffix(span, op.value, target)
            }

            ast::ExprKind::Funcall { callee, args } => self.transform_call(span, ty, callee, args),

            ast::ExprKind::Aref { .. } => Some(self.transform_aref(expr)),

            ast::ExprKind::Member { base, offset, .. } => {
                let base_ir = self.transform_subexpr(base);
                let base_addr = self.address_of(base_ir);
                let addr = self.member_addr(ty, base_addr, *offset);
                Some(match expr.eval_to_address {
                    true => addr,
                    false => ir::Expr::Mem { ty, addr: Box::new(addr) },
                })
            }

            ast::ExprKind::PtrMember { base, offset, .. } => {
                let base_addr = self.transform_subexpr(base);
                let addr = self.member_addr(ty, base_addr, *offset);
                Some(match expr.eval_to_address {
                    true => addr,
                    false => ir::Expr::Mem { ty, addr: Box::new(addr) },
                })
            }

            ast::ExprKind::Deref { expr: operand } => {
                let addr = self.transform_subexpr(operand);
                let mem = self.deref(addr, ty);
                Some(match expr.eval_to_address {
                    true => self.address_of(mem),
                    false => mem,
                })
            }

            ast::ExprKind::Addr { expr: operand } => {
                let e = self.transform_subexpr(operand);
                Some(match operand.eval_to_address {
                    // the operand already evaluated to its address
                    true => e,
                    false => self.address_of(e),
                })
            }

            ast::ExprKind::Cast { effective: true, expr: operand } => {
                let op = self.cast_op(operand.ty, ty);
                let operand = self.transform_subexpr(operand);
                Some(ir::Expr::Uni { ty, op, expr: Box::new(operand) })
            }

            // a no-op cast is its operand, in the same context
            ast::ExprKind::Cast { effective: false, expr: operand } => {
                self.transform_expr_inner(operand)
            }
        }
    }

    // ------------------
    // Assignment-like constructs.

    fn transform_assign(
        &mut self,
        span: Span,
        lhs: &Sp<ast::Expr>,
        rhs: &Sp<ast::Expr>,
    ) -> Option<ir::Expr> {
        if self.is_statement() {
            // rhs evaluates before lhs
            let rhs_ir = self.transform_subexpr(rhs);
            let lhs_ir = self.transform_lhs(lhs);
            self.push(ir::Stmt::Assign { loc: span, lhs: lhs_ir, rhs: rhs_ir });
            None
        } else {
            // lhs = rhs  ->  t = rhs; lhs = t; ...t...
            //
            // The temporary keeps the value correct even if the enclosing
            // expression later writes through memory that aliases lhs.
            let tmp = self.tmp_var(rhs.ty);
            let tmp_ref = self.ref_var(tmp);
            let rhs_ir = self.transform_subexpr(rhs);
            self.assign_before_stmt(rhs.span, tmp_ref.clone(), rhs_ir);
            let lhs_ir = self.transform_lhs(lhs);
            self.assign_before_stmt(lhs.span, lhs_ir, tmp_ref.clone());
            Some(tmp_ref)
        }
    }

    /// `lhs op= rhs` with both sides already lowered.
    ///
    /// The address of `lhs` is computed exactly once: `a[f()] += 1` calls `f`
    /// exactly once.
    fn transform_op_assign(
        &mut self,
        loc: Span,
        op: Op,
        lhs_ty: TypeId,
        lhs: ir::Expr,
        rhs: ir::Expr,
    ) -> Option<ir::Expr> {
        if lhs.is_constant_address() {
            // lhs = lhs op rhs
            let bin = self.bin(op, lhs_ty, lhs.clone(), rhs);
            self.emit_assign(loc, lhs.clone(), bin);
            match self.is_statement() {
                true => None,
                false => Some(lhs),
            }
        } else {
            // a = &lhs; *a = *a op rhs; ...*a...
            let addr = self.address_of(lhs);
            let addr = self.capture_address(loc, addr);
            let mem = ir::Expr::Mem { ty: lhs_ty, addr: Box::new(addr) };
            let bin = self.bin(op, lhs_ty, mem.clone(), rhs);
            self.emit_assign(loc, mem.clone(), bin);
            match self.is_statement() {
                true => None,
                false => Some(mem),
            }
        }
    }

    fn transform_suffix(
        &mut self,
        span: Span,
        op: IncDecOp,
        target: &Sp<ast::Expr>,
    ) -> Option<ir::Expr> {
        let op = Self::inc_dec_op(op);
        let one = self.int_one();
        let lhs = self.transform_lhs(target);

        if self.is_statement() {
            // e++; is exactly e += 1;
            return self.transform_op_assign(span, op, target.ty, lhs, one);
        }

        let v = self.tmp_var(target.ty);
        let v_ref = self.ref_var(v);
        if lhs.is_constant_address() {
            // v = lhs; lhs = lhs op 1; ...v...
            self.assign_before_stmt(span, v_ref.clone(), lhs.clone());
            let bin = self.bin(op, target.ty, lhs.clone(), one);
            self.assign_before_stmt(span, lhs, bin);
        } else {
            // a = &lhs; v = *a; *a = *a op 1; ...v...
            let addr = self.address_of(lhs);
            let addr = self.capture_address(span, addr);
            let mem = ir::Expr::Mem { ty: target.ty, addr: Box::new(addr) };
            self.assign_before_stmt(span, v_ref.clone(), mem.clone());
            let bin = self.bin(op, target.ty, mem.clone(), one);
            self.assign_before_stmt(span, mem, bin);
        }
        Some(v_ref)
    }

    /// Lower the target of an assignment.
    ///
    /// The generic lowering wraps decaying lvalues in `Addr`, but assignment
    /// wants the location itself, so one outer `Addr` is stripped.
    fn transform_lhs(&mut self, expr: &Sp<ast::Expr>) -> ir::Expr {
        match self.transform_subexpr(expr) {
            ir::Expr::Addr { expr, .. } => *expr,
            e => e,
        }
    }

    /// Emit an assignment: appended in statement context, hoisted in front of
    /// the current statement otherwise.
    fn emit_assign(&mut self, loc: Span, lhs: ir::Expr, rhs: ir::Expr) {
        if self.is_statement() {
            self.push(ir::Stmt::Assign { loc, lhs, rhs });
        } else {
            self.assign_before_stmt(loc, lhs, rhs);
        }
    }

    /// Insert an assignment in front of the statement currently being
    /// lowered.  Consecutive insertions keep their order.
    fn assign_before_stmt(&mut self, loc: Span, lhs: ir::Expr, rhs: ir::Expr) {
        let at = self.before_stmt;
        self.stmts.insert(at, ir::Stmt::Assign { loc, lhs, rhs });
        self.before_stmt += 1;
    }

    /// Park an address in a temporary unless it is already a constant-address
    /// location; either way the result can be evaluated repeatedly without
    /// repeating side effects.
    fn capture_address(&mut self, loc: Span, addr: ir::Expr) -> ir::Expr {
        if addr.is_constant_address() {
            return addr;
        }
        let a = self.tmp_var(addr.ty());
        let a_ref = self.ref_var(a);
        self.emit_assign(loc, a_ref.clone(), addr);
        a_ref
    }

    // ------------------
    // Control-flow expressions.

    /// `a && b` / `a || b` via the short-circuit temporary idiom: the
    /// left-hand assignment doubles as the test value.
    fn transform_logical(
        &mut self,
        span: Span,
        ty: TypeId,
        op: BinaryOp,
        lhs: &Sp<ast::Expr>,
        rhs: &Sp<ast::Expr>,
    ) -> Option<ir::Expr> {
        let rhs_label = self.new_label();
        let end_label = self.new_label();
        let var = self.tmp_var(ty);
        let var_ref = self.ref_var(var);

        let lhs_ir = self.transform_subexpr(lhs);
        self.push(ir::Stmt::Assign { loc: lhs.span, lhs: var_ref.clone(), rhs: lhs_ir });
        match op {
            BinaryOp::LogicAnd => self.cjump(span, var_ref.clone(), rhs_label, end_label),
            BinaryOp::LogicOr => self.cjump(span, var_ref.clone(), end_label, rhs_label),
            _ => unreachable!("(bug!) transform_logical on {}", op),
        }
        self.label(rhs_label);
        let rhs_ir = self.transform_subexpr(rhs);
        self.push(ir::Stmt::Assign { loc: rhs.span, lhs: var_ref.clone(), rhs: rhs_ir });
        self.label(end_label);

        match self.is_statement() {
            true => None,
            false => Some(var_ref),
        }
    }

    /// `c ? a : b`.  Either arm may emit statements, so the value always goes
    /// through a temporary.
    fn transform_ternary(
        &mut self,
        span: Span,
        ty: TypeId,
        cond: &Sp<ast::Expr>,
        then_expr: &Sp<ast::Expr>,
        else_expr: &Sp<ast::Expr>,
    ) -> Option<ir::Expr> {
        let then_label = self.new_label();
        let else_label = self.new_label();
        let end_label = self.new_label();
        let var = self.tmp_var(ty);
        let var_ref = self.ref_var(var);

        let cond_ir = self.transform_subexpr(cond);
        self.cjump(span, cond_ir, then_label, else_label);
        self.label(then_label);
        let then_ir = self.transform_subexpr(then_expr);
        self.push(ir::Stmt::Assign { loc: then_expr.span, lhs: var_ref.clone(), rhs: then_ir });
        self.jump(span, end_label);
        self.label(else_label);
        let else_ir = self.transform_subexpr(else_expr);
        self.push(ir::Stmt::Assign { loc: else_expr.span, lhs: var_ref.clone(), rhs: else_ir });
        self.jump(span, end_label);
        self.label(end_label);

        match self.is_statement() {
            true => None,
            false => Some(var_ref),
        }
    }

    fn transform_call(
        &mut self,
        span: Span,
        ty: TypeId,
        callee: &Sp<ast::Expr>,
        args: &[Sp<ast::Expr>],
    ) -> Option<ir::Expr> {
        // arguments evaluate right to left
        let mut ir_args: Vec<ir::Expr> = args.iter().rev()
            .map(|arg| self.transform_subexpr(arg))
            .collect();
        ir_args.reverse();
        let callee_ir = self.transform_subexpr(callee);
        let call = ir::Expr::Call { ty, callee: Box::new(callee_ir), args: ir_args };

        if self.is_statement() {
            // the value is unused; evaluate and discard
            self.push(ir::Stmt::ExprStmt { loc: span, expr: call });
            None
        } else {
            // evaluate eagerly so the call happens exactly once, in order
            let tmp = self.tmp_var(ty);
            let tmp_ref = self.ref_var(tmp);
            self.assign_before_stmt(span, tmp_ref.clone(), call);
            Some(tmp_ref)
        }
    }

    // ------------------
    // Arithmetic and addresses.

    fn transform_binary(
        &mut self,
        ty: TypeId,
        op: BinaryOp,
        lhs: &Sp<ast::Expr>,
        rhs: &Sp<ast::Expr>,
    ) -> ir::Expr {
        // right before left, matching the argument evaluation order
        let rhs_ir = self.transform_subexpr(rhs);
        let lhs_ir = self.transform_subexpr(lhs);
        let ir_op = Op::intern_binary(op, self.types.is_signed(ty));

        let lhs_deref = self.types.is_dereferable(lhs.ty);
        let rhs_deref = self.types.is_dereferable(rhs.ty);
        if ir_op == Op::Sub && lhs_deref && rhs_deref {
            // ptr - ptr: byte difference scaled down by the pointee size
            let size = self.ptr_base_size(lhs.ty);
            let diff = ir::Expr::Bin { ty, op: Op::Sub, lhs: Box::new(lhs_ir), rhs: Box::new(rhs_ir) };
            ir::Expr::Bin { ty, op: Op::Div, lhs: Box::new(diff), rhs: Box::new(size) }
        } else if matches!(ir_op, Op::Add | Op::Sub) && lhs_deref {
            // ptr + n: scale the integer operand by the pointee size
            let size = self.ptr_base_size(lhs.ty);
            let scaled = ir::Expr::Bin {
                ty: rhs_ir.ty(),
                op: Op::Mul,
                lhs: Box::new(rhs_ir),
                rhs: Box::new(size),
            };
            ir::Expr::Bin { ty, op: ir_op, lhs: Box::new(lhs_ir), rhs: Box::new(scaled) }
        } else if ir_op == Op::Add && rhs_deref {
            // n + ptr: same, mirrored
            let size = self.ptr_base_size(rhs.ty);
            let scaled = ir::Expr::Bin {
                ty: lhs_ir.ty(),
                op: Op::Mul,
                lhs: Box::new(lhs_ir),
                rhs: Box::new(size),
            };
            ir::Expr::Bin { ty, op: ir_op, lhs: Box::new(scaled), rhs: Box::new(rhs_ir) }
        } else {
            ir::Expr::Bin { ty, op: ir_op, lhs: Box::new(lhs_ir), rhs: Box::new(rhs_ir) }
        }
    }

    /// Build a binary operation on an already-lowered left side, expanding
    /// pointer arithmetic the same way as [`Self::transform_binary`].  Used
    /// by the op-assign family, where it makes `p += n` scale `n`.
    fn bin(&mut self, op: Op, lhs_ty: TypeId, lhs: ir::Expr, rhs: ir::Expr) -> ir::Expr {
        if matches!(op, Op::Add | Op::Sub) && self.types.is_dereferable(lhs_ty) {
            let size = self.ptr_base_size(lhs_ty);
            let scaled = ir::Expr::Bin {
                ty: rhs.ty(),
                op: Op::Mul,
                lhs: Box::new(rhs),
                rhs: Box::new(size),
            };
            ir::Expr::Bin { ty: lhs.ty(), op, lhs: Box::new(lhs), rhs: Box::new(scaled) }
        } else {
            ir::Expr::Bin { ty: lhs.ty(), op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
        }
    }

    /// `a[i]`: the element address is `base + element_size * index`, with the
    /// index of a multi-dimensional reference flattened first.
    fn transform_aref(&mut self, expr: &Sp<ast::Expr>) -> ir::Expr {
        let element_size = match &expr.kind {
            ast::ExprKind::Aref { element_size, .. } => *element_size,
            _ => unreachable!("(bug!) transform_aref on non-aref"),
        };

        let root = Self::aref_root(expr);
        let base_ir = self.transform_subexpr(root);
        let index = self.transform_index(expr);
        let size = ir::Expr::Int {
            ty: self.types.ptr_diff_type(),
            value: element_size as i64,
        };
        let int = self.types.signed_int();
        let offset = ir::Expr::Bin {
            ty: int,
            op: Op::Mul,
            lhs: Box::new(size),
            rhs: Box::new(index),
        };
        let addr_ty = self.types.pointer_to(expr.ty);
        let addr = ir::Expr::Bin {
            ty: addr_ty,
            op: Op::Add,
            lhs: Box::new(base_ir),
            rhs: Box::new(offset),
        };
        match expr.eval_to_address {
            true => addr,
            false => ir::Expr::Mem { ty: expr.ty, addr: Box::new(addr) },
        }
    }

    /// Flatten the index of `a[i1][i2]...[iN]` by Horner's scheme:
    /// `((i1*d2 + i2)*d3 + i3)...`.  Each recursion step handles the
    /// outermost remaining subscript.
    fn transform_index(&mut self, expr: &Sp<ast::Expr>) -> ir::Expr {
        let (base, index, length, multi) = match &expr.kind {
            ast::ExprKind::Aref { base, index, length, multi_dimension, .. } => {
                (base, index, *length, *multi_dimension)
            }
            _ => unreachable!("(bug!) transform_index on non-aref"),
        };

        let index_ir = self.transform_subexpr(index);
        if !multi {
            return index_ir;
        }
        let int = self.types.signed_int();
        let length = ir::Expr::Int { ty: int, value: length as i64 };
        let inner = self.transform_index(base);
        let scaled = ir::Expr::Bin {
            ty: int,
            op: Op::Mul,
            lhs: Box::new(length),
            rhs: Box::new(inner),
        };
        ir::Expr::Bin {
            ty: int,
            op: Op::Add,
            lhs: Box::new(index_ir),
            rhs: Box::new(scaled),
        }
    }

    /// The non-subscript expression at the bottom of an `a[i][j]...` chain.
    fn aref_root(expr: &Sp<ast::Expr>) -> &Sp<ast::Expr> {
        match &expr.kind {
            ast::ExprKind::Aref { base, multi_dimension: true, .. } => Self::aref_root(base),
            ast::ExprKind::Aref { base, .. } => base,
            _ => unreachable!("(bug!) aref_root on non-aref"),
        }
    }

    fn member_addr(&mut self, member_ty: TypeId, base_addr: ir::Expr, offset: u64) -> ir::Expr {
        let addr_ty = self.types.pointer_to(member_ty);
        let offset = ir::Expr::Int {
            ty: self.types.ptr_diff_type(),
            value: offset as i64,
        };
        ir::Expr::Bin {
            ty: addr_ty,
            op: Op::Add,
            lhs: Box::new(base_addr),
            rhs: Box::new(offset),
        }
    }

    // ------------------
    // The address/deref algebra.

    /// Take the address of a lowered expression.
    ///
    /// `&*e` cancels.  Array-typed operands and non-loadable variables keep
    /// their own type as the `Addr` carrier, which is how the code generator
    /// spells "this lvalue is only ever an address".
    fn address_of(&mut self, expr: ir::Expr) -> ir::Expr {
        match expr {
            ir::Expr::Mem { addr, .. } => *addr,
            expr => {
                let ty = expr.ty();
                let carrier_keeps_type = self.types.is_array(ty)
                    || matches!(
                        &expr,
                        ir::Expr::Var { entity, .. } if self.entities.get(*entity).cannot_load
                    );
                let addr_ty = match carrier_keeps_type {
                    true => ty,
                    false => self.types.pointer_to(ty),
                };
                ir::Expr::Addr { ty: addr_ty, expr: Box::new(expr) }
            }
        }
    }

    /// Load from a lowered address; `*&e` cancels.
    fn deref(&mut self, addr: ir::Expr, pointee: TypeId) -> ir::Expr {
        match addr {
            ir::Expr::Addr { ty, expr } if self.types.is_pointer(ty) => *expr,
            addr => ir::Expr::Mem { ty: pointee, addr: Box::new(addr) },
        }
    }

    // ------------------
    // Small helpers.

    fn int_one(&mut self) -> ir::Expr {
        ir::Expr::Int { ty: self.types.signed_int(), value: 1 }
    }

    fn inc_dec_op(op: IncDecOp) -> Op {
        match op {
            IncDecOp::Inc => Op::Add,
            IncDecOp::Dec => Op::Sub,
        }
    }

    /// Pick the IR conversion operator for an effective cast.
    ///
    /// Same-size conversions keep their representation; widening extends by
    /// the *source* signedness.
    fn cast_op(&self, from: TypeId, to: TypeId) -> Op {
        if self.types.size_of(from) == self.types.size_of(to) {
            Op::Cast
        } else if self.types.is_signed(from) {
            Op::SCast
        } else {
            Op::UCast
        }
    }

    /// The size of the pointee, as the constant used in pointer arithmetic.
    fn ptr_base_size(&mut self, ty: TypeId) -> ir::Expr {
        let base = self.types.base_type(ty);
        ir::Expr::Int {
            ty: self.types.ptr_diff_type(),
            value: self.types.size_of(base) as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::entity::{Entity, EntityTable, Storage};
    use crate::error::ErrorSink;
    use crate::ir;
    use crate::types::{Type, TypeTable};

    use super::super::Lowerer;

    fn with_lowerer<T>(f: impl FnOnce(&mut Lowerer<'_>) -> T) -> T {
        let mut types = TypeTable::new();
        let mut entities = EntityTable::new();
        let mut sink = ErrorSink::new();
        let mut lowerer = Lowerer::new(&mut types, &mut entities, &mut sink);
        f(&mut lowerer)
    }

    #[test]
    fn address_of_cancels_deref() {
        with_lowerer(|lowerer| {
            let int = lowerer.types.signed_int();
            let ptr = lowerer.types.pointer_to(int);
            let scope = lowerer.entities.new_scope();
            let p = lowerer.entities.declare_temporary(scope, ptr);

            // addressOf(deref(e)) == e
            let p_ref = lowerer.ref_var(p);
            let mem = lowerer.deref(p_ref.clone(), int);
            assert_eq!(lowerer.address_of(mem), p_ref);
        });
    }

    #[test]
    fn deref_cancels_address_of() {
        with_lowerer(|lowerer| {
            let int = lowerer.types.signed_int();
            let scope = lowerer.entities.new_scope();
            let x = lowerer.entities.declare_temporary(scope, int);

            let x_ref = lowerer.ref_var(x);
            let addr = lowerer.address_of(x_ref.clone());
            assert_eq!(lowerer.deref(addr, int), x_ref);
        });
    }

    #[test]
    fn scalar_addresses_are_pointer_typed() {
        with_lowerer(|lowerer| {
            let int = lowerer.types.signed_int();
            let scope = lowerer.entities.new_scope();
            let x = lowerer.entities.declare_temporary(scope, int);

            let x_ref = lowerer.ref_var(x);
            let addr = lowerer.address_of(x_ref);
            let expected = lowerer.types.pointer_to(int);
            assert_eq!(addr.ty(), expected);
        });
    }

    #[test]
    fn array_addresses_keep_the_array_carrier_type() {
        with_lowerer(|lowerer| {
            let int = lowerer.types.signed_int();
            let arr = lowerer.types.intern(Type::Array { base: int, length: 10 });
            let scope = lowerer.entities.new_scope();
            let a = lowerer.entities.define(Entity {
                name: "a".parse().unwrap(),
                ty: arr,
                storage: Storage::Local,
                cannot_load: true,
                scope,
            });

            let a_ref = lowerer.ref_var(a);
            let addr = lowerer.address_of(a_ref.clone());
            assert_eq!(addr, ir::Expr::Addr { ty: arr, expr: Box::new(a_ref) });
        });
    }
}
