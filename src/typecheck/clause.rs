//! Boolean clause checking: quantifiers, bindings, comparisons.

use crate::ast::display::format_data;
use crate::ast::*;
use crate::error::CheckError;

use super::TypeChecker;

impl TypeChecker {
    pub(super) fn check_bool(&mut self, expr: &mut BoolExpr) -> Result<(), CheckError> {
        match &mut expr.kind {
            BoolKind::ForAll { ranges, body } => {
                self.push_scope();
                self.check_ranges(ranges)?;
                self.check_bool(body)?;
                self.pop_scope();
            }
            BoolKind::LetIn { name, value, body } => {
                let ty = self.check_data(value)?;
                self.push_scope();
                self.env.define(name, ty);
                self.check_bool(body)?;
                self.pop_scope();
            }
            BoolKind::Membership { item, collection } => {
                self.check_data(item)?;
                self.check_data(collection)?;
            }
            BoolKind::ApproxEq { lhs, rhs } => {
                if !lhs.is_identifier(OUTPUT) {
                    return Err(CheckError::InvalidApproximateComparisonTarget {
                        node: format_data(lhs),
                        span: lhs.span,
                    });
                }
                self.check_data(lhs)?;
                self.check_data(rhs)?;
            }
            BoolKind::Compare { lhs, rhs, .. } => {
                self.check_data(lhs)?;
                self.check_data(rhs)?;
            }
            BoolKind::Logic { lhs, rhs, .. } => {
                self.check_bool(lhs)?;
                self.check_bool(rhs)?;
            }
            BoolKind::Not { inner } => self.check_bool(inner)?,
        }
        Ok(())
    }
}
