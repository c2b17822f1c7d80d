//! Statement IR for generated checker code.
//!
//! Lowering builds nested `Op` trees instead of writing indented text
//! directly; indentation is decided once, when the tree is rendered.

/// One statement of generated code. Expressions are already-rendered
/// target-language strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// `target = value`
    Assign { target: String, value: String },
    /// `target op value`, e.g. `c += 1 if ok else 0`
    Update {
        target: String,
        op: &'static str,
        value: String,
    },
    /// `list.append(value)`
    Append { list: String, value: String },
    /// Bare expression statement.
    Expr(String),
    For {
        var: String,
        iter: String,
        body: Vec<Op>,
    },
    If { cond: String, body: Vec<Op> },
    /// Leave the innermost loop unless `cond` holds.
    BreakUnless { cond: String },
    Return(String),
    /// Nested function definition.
    Def {
        name: String,
        params: Vec<String>,
        body: Vec<Op>,
    },
    /// Guarded block with a single handler for the listed exceptions.
    Try {
        body: Vec<Op>,
        catch: Vec<String>,
        handler: Vec<Op>,
    },
}

impl Op {
    pub fn assign(target: &str, value: impl Into<String>) -> Self {
        Op::Assign {
            target: target.to_string(),
            value: value.into(),
        }
    }

    pub fn expr(value: impl Into<String>) -> Self {
        Op::Expr(value.into())
    }

    pub fn print(message: &str) -> Self {
        Op::Expr(format!("print({})", message))
    }
}

/// A top-level function of the generated module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Op>,
}

impl Function {
    pub fn new(name: &str, params: &[&str], body: Vec<Op>) -> Self {
        Self {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            body,
        }
    }
}

/// Count statements, including nested ones.
pub fn op_count(ops: &[Op]) -> usize {
    ops.iter()
        .map(|op| {
            1 + match op {
                Op::For { body, .. } | Op::If { body, .. } | Op::Def { body, .. } => {
                    op_count(body)
                }
                Op::Try { body, handler, .. } => op_count(body) + op_count(handler),
                _ => 0,
            }
        })
        .sum()
}
