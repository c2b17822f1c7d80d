//! Data expression typing and range binding.

use crate::ast::display::format_data;
use crate::ast::*;
use crate::error::CheckError;
use crate::types::ValueType;

use super::TypeChecker;

impl TypeChecker {
    pub(super) fn check_data(&mut self, expr: &mut DataExpr) -> Result<ValueType, CheckError> {
        let ty = match &mut expr.kind {
            DataKind::Constant { .. } => ValueType::Scalar,

            // Statistics are scalars; their bodies still have to type-check.
            DataKind::ProbabilityOverInputs { body } | DataKind::ProbabilityOverRuns { body } => {
                self.check_bool(body)?;
                ValueType::Scalar
            }
            DataKind::ProbabilityOverItems { ranges, body } => {
                self.push_scope();
                self.check_ranges(ranges)?;
                self.check_bool(body)?;
                self.pop_scope();
                ValueType::Scalar
            }
            DataKind::ExpectationOverInputs { body } | DataKind::ExpectationOverRuns { body } => {
                self.check_data(body)?;
                ValueType::Scalar
            }
            DataKind::ExpectationOverItems { ranges, body } => {
                self.push_scope();
                self.check_ranges(ranges)?;
                self.check_data(body)?;
                self.pop_scope();
                ValueType::Scalar
            }

            DataKind::Lookup { collection, key } => {
                let coll_ty = self.check_data(collection)?;
                self.check_data(key)?;
                match coll_ty {
                    ValueType::Sequence(elem) => *elem,
                    ValueType::Map(_, value) => *value,
                    other => {
                        return Err(CheckError::NotIndexable {
                            node: format_data(collection),
                            ty: other,
                            span: collection.span,
                        })
                    }
                }
            }

            DataKind::Identifier { name } => self.lookup(name).ty(),

            DataKind::Tuple { elements } => {
                let mut first = None;
                for elem in elements.iter_mut() {
                    let ty = self.check_data(elem)?;
                    first.get_or_insert(ty);
                }
                // Only the first element decides; the rest are not compared.
                ValueType::sequence(first.unwrap_or(ValueType::Scalar))
            }

            DataKind::Binary { lhs, op, rhs } => {
                let lhs_ty = self.check_data(lhs)?;
                let rhs_ty = self.check_data(rhs)?;
                if lhs_ty != rhs_ty {
                    return Err(CheckError::OperandTypeMismatch {
                        node: format!("{} {} {}", format_data(lhs), op.as_str(), format_data(rhs)),
                        lhs: lhs_ty,
                        rhs: rhs_ty,
                        span: lhs.span.merge(rhs.span),
                    });
                }
                lhs_ty
            }

            DataKind::SizeOf { collection } => {
                self.check_data(collection)?;
                ValueType::Scalar
            }

            DataKind::Call { name, args } => {
                for arg in args.iter_mut() {
                    self.check_data(arg)?;
                }
                // A declared name models an external function with a known
                // return shape.
                self.lookup(name).ty()
            }
        };

        expr.ty = Some(ty.clone());
        Ok(ty)
    }

    /// Bind each range variable in the current scope, in order, so later
    /// ranges may walk collections reached through earlier variables.
    pub(super) fn check_ranges(&mut self, ranges: &mut [Range]) -> Result<(), CheckError> {
        for range in ranges.iter_mut() {
            let coll_ty = self.check_data(&mut range.collection)?;
            let elem = match coll_ty {
                ValueType::Sequence(elem) => *elem,
                other => {
                    return Err(CheckError::NotIterable {
                        node: format_data(&range.collection),
                        ty: other,
                        span: range.collection.span,
                    })
                }
            };
            let var_ty = match range.mode {
                RangeMode::Indices => ValueType::Scalar,
                RangeMode::Elements | RangeMode::UniqueElements => elem,
            };
            self.env.define(&range.var, var_ty);
        }
        Ok(())
    }
}
