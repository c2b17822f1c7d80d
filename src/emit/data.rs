//! Data expression lowering.

use crate::ast::display::format_data;
use crate::ast::*;
use crate::error::CheckError;
use crate::types::ValueType;

use super::library::matrix_function;
use super::{LowerCtx, Lowering};

impl Lowering {
    pub(super) fn lower_data(&self, ctx: &mut LowerCtx, expr: &DataExpr) -> Result<String, CheckError> {
        match &expr.kind {
            DataKind::Constant { value } => Ok(value.clone()),

            DataKind::ProbabilityOverInputs { .. }
            | DataKind::ProbabilityOverRuns { .. }
            | DataKind::ProbabilityOverItems { .. }
            | DataKind::ExpectationOverInputs { .. }
            | DataKind::ExpectationOverRuns { .. }
            | DataKind::ExpectationOverItems { .. } => Err(CheckError::MisplacedStatistic {
                node: format_data(expr),
                span: expr.span,
            }),

            DataKind::Lookup { collection, key } => {
                let coll = self.lower_data(ctx, collection)?;
                let key = self.lower_data(ctx, key)?;
                match Self::ty_of(collection)? {
                    ValueType::Sequence(_) => Ok(format!("{}[{}]", coll, key)),
                    ValueType::Map(..) => Ok(format!("{}.get({},0)", coll, key)),
                    other => Err(CheckError::NotIndexable {
                        node: format_data(collection),
                        ty: other.clone(),
                        span: collection.span,
                    }),
                }
            }

            DataKind::Identifier { name } => Ok(ctx.resolve(name).render()),

            DataKind::Tuple { elements } => {
                let parts = elements
                    .iter()
                    .map(|e| self.lower_data(ctx, e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("[{}]", parts.join(",")))
            }

            DataKind::Binary { lhs, op, rhs } => {
                let lhs_ty = Self::ty_of(lhs)?;
                let rhs_ty = Self::ty_of(rhs)?;
                if lhs_ty != rhs_ty {
                    return Err(CheckError::OperandTypeMismatch {
                        node: format_data(expr),
                        lhs: lhs_ty.clone(),
                        rhs: rhs_ty.clone(),
                        span: expr.span,
                    });
                }
                let a = self.lower_data(ctx, lhs)?;
                let b = self.lower_data(ctx, rhs)?;
                if lhs_ty.is_matrix() {
                    let func = matrix_function(*op).ok_or_else(|| {
                        CheckError::UnsupportedMatrixOperator {
                            op: op.as_str(),
                            node: format_data(expr),
                            span: expr.span,
                        }
                    })?;
                    Ok(format!("{}({},{})", func, a, b))
                } else {
                    Ok(format!("({}{}{})", a, op.as_str(), b))
                }
            }

            DataKind::SizeOf { collection } => {
                Ok(format!("len({})", self.lower_data(ctx, collection)?))
            }

            DataKind::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|a| self.lower_data(ctx, a))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("{}({})", name, args.join(",")))
            }
        }
    }
}
