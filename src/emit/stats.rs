//! Statistical test selection for comparisons.
//!
//! A comparison whose left side is a probability becomes a binomial test
//! on a success count; an expectation becomes a one-sample t-test. Any
//! other comparison is evaluated directly.

use tracing::debug;

use crate::ast::display::format_data;
use crate::ast::*;
use crate::error::CheckError;

use super::ir::Op;
use super::{LowerCtx, Lowering, Mode, Verdict};

/// What a trial loop counts over.
#[derive(Clone, Copy, Debug)]
enum Trials {
    Inputs,
    Runs,
}

impl Trials {
    fn bound(self) -> &'static str {
        match self {
            Trials::Inputs => "Inputs",
            Trials::Runs => "Runs",
        }
    }
}

/// Alternative hypothesis of the binomial test: `P >= p` is rejected when
/// the observed rate is significantly less than `p`, and vice versa.
pub fn binomial_alternative(op: CmpOp) -> Option<&'static str> {
    match op {
        CmpOp::Eq => Some("two-sided"),
        CmpOp::Gt | CmpOp::Ge => Some("less"),
        CmpOp::Lt | CmpOp::Le => Some("greater"),
        CmpOp::Ne => None,
    }
}

impl Lowering {
    pub(super) fn lower_compare(
        &self,
        ctx: &mut LowerCtx,
        clause: &BoolExpr,
        lhs: &DataExpr,
        op: CmpOp,
        rhs: &DataExpr,
        mode: Mode,
    ) -> Result<Verdict, CheckError> {
        match &lhs.kind {
            DataKind::ProbabilityOverInputs { body } => {
                self.lower_trial_probability(ctx, clause, Trials::Inputs, body, op, rhs, mode)
            }
            DataKind::ProbabilityOverRuns { body } => {
                self.lower_trial_probability(ctx, clause, Trials::Runs, body, op, rhs, mode)
            }
            DataKind::ExpectationOverInputs { body } | DataKind::ExpectationOverRuns { body } => {
                if !body.is_identifier(OUTPUT) {
                    return Err(CheckError::InvalidExpectationTarget {
                        node: format_data(body),
                        span: body.span,
                    });
                }
                let expected = self.lower_data(ctx, rhs)?;
                self.t_test(ctx, clause, OUTPUT, &expected, op, mode)
            }
            DataKind::ProbabilityOverItems { ranges, body } => {
                let alternative = Self::require_binomial(clause, op)?;
                let count = ctx.fresh();
                ctx.emit(Op::assign(&count, "0"));

                ctx.push_scope();
                let headers = self.open_ranges(ctx, ranges)?;
                let hit = self.lower_bool(ctx, body, Mode::Boolean)?;
                ctx.emit(Op::Update {
                    target: count.clone(),
                    op: "+=",
                    value: format!("1 if {} else 0", hit.expr()),
                });
                // Product of each range's size, read after the loops close: a
                // range over an earlier range's variable counts the last
                // binding of that variable only.
                let trials = std::iter::once("1".to_string())
                    .chain(headers.iter().map(|h| h.trip_count()))
                    .collect::<Vec<_>>()
                    .join("*");
                Self::close_ranges(ctx, headers, None);
                ctx.pop_scope();

                let prob = self.lower_data(ctx, rhs)?;
                debug!(alternative, "binomial test over items");
                let pvalue = self.library.binomial_test(&count, &trials, &prob, alternative);
                Ok(self.from_pvalue(mode, pvalue))
            }
            DataKind::ExpectationOverItems { ranges, body } => {
                let samples = ctx.fresh();
                ctx.emit(Op::assign(&samples, "[]"));

                ctx.push_scope();
                let headers = self.open_ranges(ctx, ranges)?;
                let value = self.lower_data(ctx, body)?;
                ctx.emit(Op::Append {
                    list: samples.clone(),
                    value,
                });
                Self::close_ranges(ctx, headers, None);
                ctx.pop_scope();

                let expected = self.lower_data(ctx, rhs)?;
                self.t_test(ctx, clause, &samples, &expected, op, mode)
            }
            _ => {
                let a = self.lower_data(ctx, lhs)?;
                let b = self.lower_data(ctx, rhs)?;
                Ok(self.from_bool(mode, format!("({}{}{})", a, op.as_str(), b)))
            }
        }
    }

    /// Count successes of `body` over every input or run, then test the
    /// observed rate against the right-hand side.
    #[allow(clippy::too_many_arguments)]
    fn lower_trial_probability(
        &self,
        ctx: &mut LowerCtx,
        clause: &BoolExpr,
        trials: Trials,
        body: &BoolExpr,
        op: CmpOp,
        rhs: &DataExpr,
        mode: Mode,
    ) -> Result<Verdict, CheckError> {
        let alternative = Self::require_binomial(clause, op)?;
        let count = ctx.fresh();
        ctx.emit(Op::assign(&count, "0"));

        let index = ctx.fresh();
        let previous = ctx.enter_trial(&index);
        ctx.open();
        let hit = self.lower_bool(ctx, body, Mode::Boolean);
        let hit = match hit {
            Ok(hit) => hit,
            Err(err) => {
                ctx.leave_trial(previous);
                return Err(err);
            }
        };
        ctx.emit(Op::Update {
            target: count.clone(),
            op: "+=",
            value: format!("1 if {} else 0", hit.expr()),
        });
        let loop_body = ctx.close();
        ctx.leave_trial(previous);
        ctx.emit(Op::For {
            var: index,
            iter: format!("range({})", trials.bound()),
            body: loop_body,
        });

        let prob = self.lower_data(ctx, rhs)?;
        debug!(?trials, alternative, "binomial test");
        let pvalue = self
            .library
            .binomial_test(&count, trials.bound(), &prob, alternative);
        Ok(self.from_pvalue(mode, pvalue))
    }

    /// One-sample t-test of `samples` against `expected`. Ordered
    /// comparisons halve the two-sided p-value and pass outright when the
    /// sample mean already lies on the claimed side.
    fn t_test(
        &self,
        ctx: &mut LowerCtx,
        clause: &BoolExpr,
        samples: &str,
        expected: &str,
        op: CmpOp,
        mode: Mode,
    ) -> Result<Verdict, CheckError> {
        let result = ctx.fresh();
        ctx.emit(Op::assign(&result, self.library.ttest_1samp(samples, expected)));
        debug!(op = op.as_str(), ?mode, "t-test");

        let alpha = &self.alpha;
        match (mode, op) {
            (Mode::PValue, CmpOp::Eq) => Ok(Verdict::Probability(format!("{}[1]", result))),
            (Mode::PValue, _) => Err(Self::unsupported(clause, op, "two-sided t-test")),
            (Mode::Boolean, CmpOp::Eq) => Ok(Verdict::Boolean(format!("({}[1]>={})", result, alpha))),
            (Mode::Boolean, CmpOp::Gt | CmpOp::Ge) => Ok(Verdict::Boolean(format!(
                "({r}[1]/2>={a} or {r}[0]>=0)",
                r = result,
                a = alpha
            ))),
            (Mode::Boolean, CmpOp::Lt | CmpOp::Le) => Ok(Verdict::Boolean(format!(
                "({r}[1]/2>={a} or {r}[0]<=0)",
                r = result,
                a = alpha
            ))),
            (Mode::Boolean, CmpOp::Ne) => Err(Self::unsupported(clause, op, "t-test")),
        }
    }

    fn require_binomial(clause: &BoolExpr, op: CmpOp) -> Result<&'static str, CheckError> {
        binomial_alternative(op).ok_or_else(|| Self::unsupported(clause, op, "binomial test"))
    }

    fn unsupported(clause: &BoolExpr, op: CmpOp, test: &'static str) -> CheckError {
        CheckError::UnsupportedTestOperator {
            op: op.as_str(),
            test,
            node: Self::clause_node(clause),
            span: clause.span,
        }
    }
}
