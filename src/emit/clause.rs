//! Boolean clause lowering: quantifiers, bindings, membership and logic.

use crate::ast::display::{format_bool, format_data};
use crate::ast::*;
use crate::error::CheckError;
use crate::types::{Domain, ValueType};

use super::ir::Op;
use super::{LowerCtx, Lowering, Mode, Verdict};

/// An opened `for` loop waiting for its body.
pub(super) struct LoopHeader {
    pub var: String,
    pub iter: String,
    pub collection: String,
    pub mode: RangeMode,
}

impl LoopHeader {
    /// Number of iterations, as an expression.
    pub fn trip_count(&self) -> String {
        match self.mode {
            RangeMode::UniqueElements => format!("len(set({}))", self.collection),
            RangeMode::Elements | RangeMode::Indices => format!("len({})", self.collection),
        }
    }
}

impl Lowering {
    pub(super) fn lower_bool(
        &self,
        ctx: &mut LowerCtx,
        expr: &BoolExpr,
        mode: Mode,
    ) -> Result<Verdict, CheckError> {
        match &expr.kind {
            BoolKind::ForAll { ranges, body } => self.lower_for_all(ctx, ranges, body, mode),

            BoolKind::LetIn { name, value, body } => {
                let value = self.lower_data(ctx, value)?;
                ctx.emit(Op::assign(name, value));
                ctx.push_scope();
                ctx.declare(name);
                let verdict = self.lower_bool(ctx, body, mode);
                ctx.pop_scope();
                verdict
            }

            BoolKind::Membership { item, collection } => {
                let item_code = self.lower_data(ctx, item)?;
                // Sequences are unhashable on the target side.
                let item_code = if Self::ty_of(item)?.is_sequence() {
                    format!("tuple({})", item_code)
                } else {
                    item_code
                };
                let coll_code = self.lower_data(ctx, collection)?;
                let cond = match Self::ty_of(collection)? {
                    ValueType::Sequence(_) => format!("({} in {})", item_code, coll_code),
                    ValueType::Map(..) => format!("{}.get({},0)", coll_code, item_code),
                    other => {
                        return Err(CheckError::NotSearchable {
                            node: format_data(collection),
                            ty: other.clone(),
                            span: collection.span,
                        })
                    }
                };
                Ok(self.from_bool(mode, cond))
            }

            BoolKind::ApproxEq { lhs, rhs } => {
                if !lhs.is_identifier(OUTPUT) {
                    return Err(CheckError::InvalidApproximateComparisonTarget {
                        node: format_data(lhs),
                        span: lhs.span,
                    });
                }
                let expected = self.lower_data(ctx, rhs)?;
                let diffs = ctx.fresh();
                let sample = ctx.fresh();
                ctx.emit(Op::assign(
                    &diffs,
                    format!("[{s}-{e} for {s} in {o}]", s = sample, e = expected, o = OUTPUT),
                ));
                let pvalue = self.library.wilcoxon_pvalue(&diffs);
                Ok(self.from_pvalue(mode, pvalue))
            }

            BoolKind::Compare { lhs, op, rhs } => self.lower_compare(ctx, expr, lhs, *op, rhs, mode),

            BoolKind::Logic { lhs, op, rhs } => {
                let a = self.lower_bool(ctx, lhs, mode)?;
                let b = self.lower_bool(ctx, rhs, mode)?;
                Ok(match (mode, op) {
                    (Mode::Boolean, _) => Verdict::Boolean(format!(
                        "({} {} {})",
                        a.expr(),
                        op.as_str(),
                        b.expr()
                    )),
                    (Mode::PValue, LogicOp::And) => {
                        Verdict::Probability(format!("min({},{})", a.expr(), b.expr()))
                    }
                    (Mode::PValue, LogicOp::Or) => {
                        Verdict::Probability(format!("max({},{})", a.expr(), b.expr()))
                    }
                })
            }

            BoolKind::Not { inner } => {
                let v = self.lower_bool(ctx, inner, mode)?;
                Ok(match mode {
                    Mode::Boolean => Verdict::Boolean(format!("(not {})", v.expr())),
                    Mode::PValue => Verdict::Probability(format!("(1-{})", v.expr())),
                })
            }
        }
    }

    /// Universal quantification. Bodies that test over runs yield p-values
    /// that are combined once the loops finish; all other bodies are a
    /// running conjunction that leaves every loop level on the first
    /// failure.
    fn lower_for_all(
        &self,
        ctx: &mut LowerCtx,
        ranges: &[Range],
        body: &BoolExpr,
        mode: Mode,
    ) -> Result<Verdict, CheckError> {
        let combine = body.domain() == Domain::OverRuns;
        let result = ctx.fresh();
        let pvals = if combine {
            let pvals = ctx.fresh();
            ctx.emit(Op::assign(&pvals, "[]"));
            Some(pvals)
        } else {
            ctx.emit(Op::assign(&result, "True"));
            None
        };

        ctx.push_scope();
        let headers = self.open_ranges(ctx, ranges)?;
        match &pvals {
            Some(pvals) => {
                let p = self.lower_bool(ctx, body, Mode::PValue)?;
                ctx.emit(Op::Append {
                    list: pvals.clone(),
                    value: p.into_expr(),
                });
                Self::close_ranges(ctx, headers, None);
            }
            None => {
                let cond = self.lower_bool(ctx, body, Mode::Boolean)?;
                ctx.emit(Op::assign(
                    &result,
                    format!("{} and {}", result, cond.expr()),
                ));
                Self::close_ranges(ctx, headers, Some(&result));
            }
        }
        ctx.pop_scope();

        match pvals {
            Some(pvals) => {
                ctx.emit(Op::assign(&result, self.library.combine_pvalues(&pvals)));
                Ok(self.from_pvalue(mode, result))
            }
            None => Ok(self.from_bool(mode, result)),
        }
    }

    /// Lower each range's collection and open one loop block per range.
    /// Variables are declared in the current scope, in order.
    pub(super) fn open_ranges(
        &self,
        ctx: &mut LowerCtx,
        ranges: &[Range],
    ) -> Result<Vec<LoopHeader>, CheckError> {
        let mut headers = Vec::with_capacity(ranges.len());
        for range in ranges {
            let collection = self.lower_data(ctx, &range.collection)?;
            let iter = match range.mode {
                RangeMode::Elements => collection.clone(),
                RangeMode::UniqueElements => format!("set({})", collection),
                RangeMode::Indices => format!("range(len({}))", collection),
            };
            ctx.declare(&range.var);
            headers.push(LoopHeader {
                var: range.var.clone(),
                iter,
                collection,
                mode: range.mode,
            });
            ctx.open();
        }
        Ok(headers)
    }

    /// Close the blocks opened by [`Self::open_ranges`], innermost first.
    /// With `break_unless`, every level exits as soon as the condition
    /// turns false.
    pub(super) fn close_ranges(
        ctx: &mut LowerCtx,
        headers: Vec<LoopHeader>,
        break_unless: Option<&str>,
    ) {
        for header in headers.into_iter().rev() {
            if let Some(cond) = break_unless {
                ctx.emit(Op::BreakUnless {
                    cond: cond.to_string(),
                });
            }
            let body = ctx.close();
            ctx.emit(Op::For {
                var: header.var,
                iter: header.iter,
                body,
            });
        }
    }

    pub(super) fn ty_of(expr: &DataExpr) -> Result<&ValueType, CheckError> {
        expr.ty().ok_or_else(|| CheckError::Untyped {
            node: format_data(expr),
            span: expr.span,
        })
    }

    pub(super) fn clause_node(expr: &BoolExpr) -> String {
        format_bool(expr)
    }
}
