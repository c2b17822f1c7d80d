//! Typed AST for checker specifications.
//!
//! Three closed node families: boolean expressions ([`BoolExpr`]), data
//! expressions ([`DataExpr`]) and quantifier ranges ([`Range`]). The front
//! end builds the tree once; the analyzer then fills in the `ty` slot of
//! every data expression, after which code generation only reads it.

pub mod display;

use serde::{Deserialize, Serialize};

use crate::error::CheckError;
use crate::span::Span;
use crate::types::{Domain, ValueType};

/// Name of the per-run program output.
pub const OUTPUT: &str = "Output";
/// Name of the program input.
pub const INPUT: &str = "Input";

// ─── Compilation unit ──────────────────────────────────────────────

/// A `name type;` line of the specification header.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decl {
    pub name: String,
    pub ty: ValueType,
    #[serde(default)]
    pub span: Span,
}

impl Decl {
    pub fn new(name: &str, ty: ValueType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            span: Span::dummy(),
        }
    }
}

/// One specification: declarations plus optional accuracy, time and space
/// clauses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub decls: Vec<Decl>,
    #[serde(default)]
    pub accuracy: Option<BoolExpr>,
    #[serde(default)]
    pub time: Option<DataExpr>,
    #[serde(default)]
    pub space: Option<DataExpr>,
    #[serde(default)]
    pub span: Span,
}

impl Specification {
    /// Build a specification, rejecting it unless both `Output` and
    /// `Input` are declared.
    pub fn new(
        decls: Vec<Decl>,
        accuracy: Option<BoolExpr>,
        time: Option<DataExpr>,
        space: Option<DataExpr>,
    ) -> Result<Self, CheckError> {
        let spec = Self {
            decls,
            accuracy,
            time,
            space,
            span: Span::dummy(),
        };
        spec.require_declarations()?;
        Ok(spec)
    }

    pub fn require_declarations(&self) -> Result<(), CheckError> {
        for required in [OUTPUT, INPUT] {
            if !self.decls.iter().any(|d| d.name == required) {
                return Err(CheckError::MissingRequiredDeclaration {
                    name: required,
                    span: self.span,
                });
            }
        }
        Ok(())
    }

    /// Domain of the whole specification: the accuracy clause decides;
    /// without one, any cost clause makes it performance-only.
    pub fn domain(&self) -> Domain {
        match &self.accuracy {
            Some(acc) => acc.domain(),
            None if self.time.is_some() || self.space.is_some() => Domain::PerformanceOnly,
            None => Domain::None,
        }
    }
}

// ─── Operators ─────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl CmpOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "**", alias = "^")]
    Pow,
}

impl ArithOp {
    pub fn as_str(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Pow => "**",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicOp {
    And,
    Or,
}

impl LogicOp {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicOp::And => "and",
            LogicOp::Or => "or",
        }
    }
}

// ─── Ranges ────────────────────────────────────────────────────────

/// How a quantifier walks its collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeMode {
    Elements,
    UniqueElements,
    Indices,
}

/// `var in collection`, bound by a `forall` or an over-items statistic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub var: String,
    pub collection: DataExpr,
    pub mode: RangeMode,
    #[serde(default)]
    pub span: Span,
}

impl Range {
    pub fn new(var: &str, collection: DataExpr, mode: RangeMode) -> Self {
        Self {
            var: var.to_string(),
            collection,
            mode,
            span: Span::dummy(),
        }
    }

    pub fn elements(var: &str, collection: DataExpr) -> Self {
        Self::new(var, collection, RangeMode::Elements)
    }

    pub fn unique(var: &str, collection: DataExpr) -> Self {
        Self::new(var, collection, RangeMode::UniqueElements)
    }

    pub fn indices(var: &str, collection: DataExpr) -> Self {
        Self::new(var, collection, RangeMode::Indices)
    }
}

// ─── Boolean expressions ───────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoolExpr {
    #[serde(flatten)]
    pub kind: BoolKind,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoolKind {
    ForAll {
        ranges: Vec<Range>,
        body: Box<BoolExpr>,
    },
    LetIn {
        name: String,
        value: DataExpr,
        body: Box<BoolExpr>,
    },
    Membership {
        item: DataExpr,
        collection: DataExpr,
    },
    ApproxEq {
        lhs: DataExpr,
        rhs: DataExpr,
    },
    Compare {
        lhs: DataExpr,
        op: CmpOp,
        rhs: DataExpr,
    },
    Logic {
        lhs: Box<BoolExpr>,
        op: LogicOp,
        rhs: Box<BoolExpr>,
    },
    Not {
        inner: Box<BoolExpr>,
    },
}

impl BoolExpr {
    pub fn new(kind: BoolKind) -> Self {
        Self {
            kind,
            span: Span::dummy(),
        }
    }

    pub fn for_all(ranges: Vec<Range>, body: BoolExpr) -> Self {
        Self::new(BoolKind::ForAll {
            ranges,
            body: Box::new(body),
        })
    }

    pub fn let_in(name: &str, value: DataExpr, body: BoolExpr) -> Self {
        Self::new(BoolKind::LetIn {
            name: name.to_string(),
            value,
            body: Box::new(body),
        })
    }

    pub fn member(item: DataExpr, collection: DataExpr) -> Self {
        Self::new(BoolKind::Membership { item, collection })
    }

    pub fn approx_eq(lhs: DataExpr, rhs: DataExpr) -> Self {
        Self::new(BoolKind::ApproxEq { lhs, rhs })
    }

    pub fn compare(lhs: DataExpr, op: CmpOp, rhs: DataExpr) -> Self {
        Self::new(BoolKind::Compare { lhs, op, rhs })
    }

    pub fn and(lhs: BoolExpr, rhs: BoolExpr) -> Self {
        Self::logic(lhs, LogicOp::And, rhs)
    }

    pub fn or(lhs: BoolExpr, rhs: BoolExpr) -> Self {
        Self::logic(lhs, LogicOp::Or, rhs)
    }

    pub fn logic(lhs: BoolExpr, op: LogicOp, rhs: BoolExpr) -> Self {
        Self::new(BoolKind::Logic {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        })
    }

    pub fn not(inner: BoolExpr) -> Self {
        Self::new(BoolKind::Not {
            inner: Box::new(inner),
        })
    }

    /// Probability domain contributed by this expression.
    ///
    /// An approximate comparison is itself the terminal statistic over
    /// runs, so any statistic nested under it is a conflict.
    pub fn domain(&self) -> Domain {
        match &self.kind {
            BoolKind::ForAll { body, .. } | BoolKind::LetIn { body, .. } => body.domain(),
            BoolKind::Not { inner } => inner.domain(),
            BoolKind::Membership { .. } => Domain::None,
            BoolKind::ApproxEq { lhs, rhs } => {
                if lhs.domain() != Domain::None || rhs.domain() != Domain::None {
                    Domain::Conflict
                } else {
                    Domain::OverRuns
                }
            }
            BoolKind::Compare { lhs, rhs, .. } => lhs.domain().merge(rhs.domain()),
            BoolKind::Logic { lhs, rhs, .. } => lhs.domain().merge(rhs.domain()),
        }
    }
}

// ─── Data expressions ──────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataExpr {
    #[serde(flatten)]
    pub kind: DataKind,
    /// Resolved by the analyzer; `None` until then.
    #[serde(skip)]
    pub ty: Option<ValueType>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataKind {
    /// Numeric literal, kept in source spelling.
    Constant {
        value: String,
    },
    ProbabilityOverInputs {
        body: Box<BoolExpr>,
    },
    ProbabilityOverRuns {
        body: Box<BoolExpr>,
    },
    ProbabilityOverItems {
        ranges: Vec<Range>,
        body: Box<BoolExpr>,
    },
    ExpectationOverInputs {
        body: Box<DataExpr>,
    },
    ExpectationOverRuns {
        body: Box<DataExpr>,
    },
    ExpectationOverItems {
        ranges: Vec<Range>,
        body: Box<DataExpr>,
    },
    Lookup {
        collection: Box<DataExpr>,
        key: Box<DataExpr>,
    },
    Identifier {
        name: String,
    },
    Tuple {
        elements: Vec<DataExpr>,
    },
    Binary {
        lhs: Box<DataExpr>,
        op: ArithOp,
        rhs: Box<DataExpr>,
    },
    SizeOf {
        collection: Box<DataExpr>,
    },
    Call {
        name: String,
        args: Vec<DataExpr>,
    },
}

impl DataExpr {
    pub fn new(kind: DataKind) -> Self {
        Self {
            kind,
            ty: None,
            span: Span::dummy(),
        }
    }

    pub fn constant(value: &str) -> Self {
        Self::new(DataKind::Constant {
            value: value.to_string(),
        })
    }

    pub fn ident(name: &str) -> Self {
        Self::new(DataKind::Identifier {
            name: name.to_string(),
        })
    }

    pub fn probability_over_inputs(body: BoolExpr) -> Self {
        Self::new(DataKind::ProbabilityOverInputs {
            body: Box::new(body),
        })
    }

    pub fn probability_over_runs(body: BoolExpr) -> Self {
        Self::new(DataKind::ProbabilityOverRuns {
            body: Box::new(body),
        })
    }

    pub fn probability_over_items(ranges: Vec<Range>, body: BoolExpr) -> Self {
        Self::new(DataKind::ProbabilityOverItems {
            ranges,
            body: Box::new(body),
        })
    }

    pub fn expectation_over_inputs(body: DataExpr) -> Self {
        Self::new(DataKind::ExpectationOverInputs {
            body: Box::new(body),
        })
    }

    pub fn expectation_over_runs(body: DataExpr) -> Self {
        Self::new(DataKind::ExpectationOverRuns {
            body: Box::new(body),
        })
    }

    pub fn expectation_over_items(ranges: Vec<Range>, body: DataExpr) -> Self {
        Self::new(DataKind::ExpectationOverItems {
            ranges,
            body: Box::new(body),
        })
    }

    pub fn lookup(collection: DataExpr, key: DataExpr) -> Self {
        Self::new(DataKind::Lookup {
            collection: Box::new(collection),
            key: Box::new(key),
        })
    }

    pub fn tuple(elements: Vec<DataExpr>) -> Self {
        Self::new(DataKind::Tuple { elements })
    }

    pub fn binary(lhs: DataExpr, op: ArithOp, rhs: DataExpr) -> Self {
        Self::new(DataKind::Binary {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        })
    }

    pub fn size_of(collection: DataExpr) -> Self {
        Self::new(DataKind::SizeOf {
            collection: Box::new(collection),
        })
    }

    pub fn call(name: &str, args: Vec<DataExpr>) -> Self {
        Self::new(DataKind::Call {
            name: name.to_string(),
            args,
        })
    }

    pub fn ty(&self) -> Option<&ValueType> {
        self.ty.as_ref()
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            DataKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_identifier(&self, name: &str) -> bool {
        self.as_identifier() == Some(name)
    }

    /// True for the probability/expectation forms, which only make sense
    /// as the left operand of a comparison.
    pub fn is_statistic(&self) -> bool {
        matches!(
            self.kind,
            DataKind::ProbabilityOverInputs { .. }
                | DataKind::ProbabilityOverRuns { .. }
                | DataKind::ProbabilityOverItems { .. }
                | DataKind::ExpectationOverInputs { .. }
                | DataKind::ExpectationOverRuns { .. }
                | DataKind::ExpectationOverItems { .. }
        )
    }

    pub fn domain(&self) -> Domain {
        match &self.kind {
            DataKind::ProbabilityOverInputs { .. } | DataKind::ExpectationOverInputs { .. } => {
                Domain::OverInputs
            }
            DataKind::ProbabilityOverRuns { .. } | DataKind::ExpectationOverRuns { .. } => {
                Domain::OverRuns
            }
            DataKind::ProbabilityOverItems { .. } | DataKind::ExpectationOverItems { .. } => {
                Domain::OverItems
            }
            DataKind::Binary { lhs, rhs, .. } => lhs.domain().merge(rhs.domain()),
            DataKind::Constant { .. }
            | DataKind::Lookup { .. }
            | DataKind::Identifier { .. }
            | DataKind::Tuple { .. }
            | DataKind::SizeOf { .. }
            | DataKind::Call { .. } => Domain::None,
        }
    }
}

#[cfg(test)]
mod tests;
