//! Fatal errors of the analysis and generation passes.
//!
//! Every error aborts the current compilation. Each variant carries the
//! span of the offending node and, where useful, the node rendered back
//! into spec syntax so the message stands on its own without a source.

use thiserror::Error;

use crate::diagnostic::Diagnostic;
use crate::span::Span;
use crate::types::ValueType;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum CheckError {
    #[error("specification does not declare `{name}`")]
    MissingRequiredDeclaration { name: &'static str, span: Span },

    #[error("cannot iterate over `{node}` of type {ty}")]
    NotIterable {
        node: String,
        ty: ValueType,
        span: Span,
    },

    #[error("cannot index into `{node}` of type {ty}")]
    NotIndexable {
        node: String,
        ty: ValueType,
        span: Span,
    },

    #[error("cannot test membership in `{node}` of type {ty}")]
    NotSearchable {
        node: String,
        ty: ValueType,
        span: Span,
    },

    #[error("operand types differ in `{node}`: {lhs} vs {rhs}")]
    OperandTypeMismatch {
        node: String,
        lhs: ValueType,
        rhs: ValueType,
        span: Span,
    },

    #[error("approximate comparison must compare `Output`, found `{node}`")]
    InvalidApproximateComparisonTarget { node: String, span: Span },

    #[error("expectation over inputs or runs must be taken of `Output`, found `{node}`")]
    InvalidExpectationTarget { node: String, span: Span },

    #[error("operator `{op}` is not supported by the {test} in `{node}`")]
    UnsupportedTestOperator {
        op: &'static str,
        test: &'static str,
        node: String,
        span: Span,
    },

    #[error("operator `{op}` is not defined on matrices in `{node}`")]
    UnsupportedMatrixOperator {
        op: &'static str,
        node: String,
        span: Span,
    },

    #[error("statistic `{node}` may only appear as the left side of a comparison")]
    MisplacedStatistic { node: String, span: Span },

    #[error("cost term `{node}` cannot be turned into a fit function")]
    UnsupportedCostTerm { node: String, span: Span },

    #[error("expression `{node}` has no resolved type")]
    Untyped { node: String, span: Span },

    #[error("specification mixes incompatible probability domains")]
    UnsupportedDomainCombination { span: Span },

    #[error("specification is empty: no accuracy, time or space clause")]
    EmptySpecification { span: Span },

    #[error("accuracy clause contains no probability, expectation or approximate comparison")]
    NoStatisticalClause { span: Span },
}

impl CheckError {
    pub fn span(&self) -> Span {
        match self {
            CheckError::MissingRequiredDeclaration { span, .. }
            | CheckError::NotIterable { span, .. }
            | CheckError::NotIndexable { span, .. }
            | CheckError::NotSearchable { span, .. }
            | CheckError::OperandTypeMismatch { span, .. }
            | CheckError::InvalidApproximateComparisonTarget { span, .. }
            | CheckError::InvalidExpectationTarget { span, .. }
            | CheckError::UnsupportedTestOperator { span, .. }
            | CheckError::UnsupportedMatrixOperator { span, .. }
            | CheckError::MisplacedStatistic { span, .. }
            | CheckError::UnsupportedCostTerm { span, .. }
            | CheckError::Untyped { span, .. }
            | CheckError::UnsupportedDomainCombination { span }
            | CheckError::EmptySpecification { span }
            | CheckError::NoStatisticalClause { span } => *span,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CheckError::MissingRequiredDeclaration { .. } => "E0001",
            CheckError::NotIterable { .. } => "E0002",
            CheckError::NotIndexable { .. } => "E0003",
            CheckError::NotSearchable { .. } => "E0004",
            CheckError::OperandTypeMismatch { .. } => "E0005",
            CheckError::InvalidApproximateComparisonTarget { .. } => "E0006",
            CheckError::InvalidExpectationTarget { .. } => "E0007",
            CheckError::UnsupportedTestOperator { .. } => "E0008",
            CheckError::UnsupportedMatrixOperator { .. } => "E0009",
            CheckError::MisplacedStatistic { .. } => "E0010",
            CheckError::UnsupportedCostTerm { .. } => "E0011",
            CheckError::Untyped { .. } => "E0012",
            CheckError::UnsupportedDomainCombination { .. } => "E0013",
            CheckError::EmptySpecification { .. } => "E0014",
            CheckError::NoStatisticalClause { .. } => "E0015",
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string(), self.span()).with_code(self.code());
        match self {
            CheckError::MissingRequiredDeclaration { name, .. } => {
                diag.with_help(format!("add a declaration such as `{} real;`", name))
            }
            CheckError::NotIterable { .. } => {
                diag.with_note("only lists can be quantified over".to_string())
            }
            CheckError::NotIndexable { .. } => {
                diag.with_note("only lists and maps support lookup".to_string())
            }
            CheckError::OperandTypeMismatch { .. } => diag.with_note(
                "arithmetic requires both operands to have the same shape".to_string(),
            ),
            CheckError::UnsupportedTestOperator { .. } => diag.with_help(
                "use `==` for a two-sided test, or `<`/`>` in a plain boolean context".to_string(),
            ),
            CheckError::UnsupportedDomainCombination { .. } => diag
                .with_note(
                    "a specification may quantify over inputs, runs or items, but only one of them"
                        .to_string(),
                )
                .with_help("split the clause into separate specifications".to_string()),
            CheckError::EmptySpecification { .. } => diag.with_help(
                "add an `ACC`, `TIME` or `SPACE` clause to the specification".to_string(),
            ),
            CheckError::NoStatisticalClause { .. } => diag
                .with_note(
                    "without a statistic the clause cannot be tied to inputs, runs or items"
                        .to_string(),
                )
                .with_help(
                    "state the clause as a probability or expectation over inputs, runs or items"
                        .to_string(),
                ),
            _ => diag,
        }
    }
}

impl From<CheckError> for Diagnostic {
    fn from(err: CheckError) -> Self {
        err.to_diagnostic()
    }
}
