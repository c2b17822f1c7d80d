//! Expression lowering: typed specification clauses to checker statements.
//!
//! Lowering state (temporary counter, visible names, the active trial
//! index and the stack of open blocks) lives in an explicit [`LowerCtx`]
//! threaded through every call, so any sub-expression can be lowered in
//! isolation against a hand-built context.

mod clause;
mod data;
pub mod ir;
pub mod library;
pub mod python;
mod stats;

use std::collections::HashSet;

use tracing::trace;

use crate::ast::{BoolExpr, OUTPUT};
use crate::error::CheckError;

use ir::Op;
use library::Library;

pub use stats::binomial_alternative;

/// What a lowered clause must evaluate to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// A truth value: does the clause pass?
    Boolean,
    /// A p-value, later combined with sibling p-values.
    PValue,
}

/// A lowered clause, tagged with the kind of value its expression yields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Boolean(String),
    Probability(String),
}

impl Verdict {
    pub fn expr(&self) -> &str {
        match self {
            Verdict::Boolean(e) | Verdict::Probability(e) => e,
        }
    }

    pub fn into_expr(self) -> String {
        match self {
            Verdict::Boolean(e) | Verdict::Probability(e) => e,
        }
    }
}

/// How an identifier resolves in generated code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    /// A name bound by the checker signature or by the clause itself.
    Local(String),
    /// `Output` inside a trial loop: the current trial's sample.
    TrialOutput { trial: String },
    /// A configuration parameter supplied by the harness.
    Config(String),
}

impl Reference {
    pub fn render(&self) -> String {
        match self {
            Reference::Local(name) => name.clone(),
            Reference::TrialOutput { trial } => format!("({}[{}])", OUTPUT, trial),
            Reference::Config(name) => format!("Config['{}']", name),
        }
    }
}

/// Mutable state of one lowering traversal.
#[derive(Clone, Debug)]
pub struct LowerCtx {
    temps: usize,
    scopes: Vec<HashSet<String>>,
    trial: Option<String>,
    blocks: Vec<Vec<Op>>,
}

impl LowerCtx {
    /// Start with `names` visible in the outermost scope.
    pub fn new(names: &[&str]) -> Self {
        Self {
            temps: 0,
            scopes: vec![names.iter().map(|n| n.to_string()).collect()],
            trial: None,
            blocks: vec![Vec::new()],
        }
    }

    /// A temporary name never handed out before in this traversal.
    pub fn fresh(&mut self) -> String {
        let name = format!("t{}", self.temps);
        self.temps += 1;
        name
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashSet::new());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.scopes.iter().any(|s| s.contains(name))
    }

    pub fn resolve(&self, name: &str) -> Reference {
        if !self.is_visible(name) {
            return Reference::Config(name.to_string());
        }
        match &self.trial {
            Some(trial) if name == OUTPUT => Reference::TrialOutput {
                trial: trial.clone(),
            },
            _ => Reference::Local(name.to_string()),
        }
    }

    /// Enter a trial loop; returns the previous index for [`Self::leave_trial`].
    pub fn enter_trial(&mut self, index: &str) -> Option<String> {
        self.trial.replace(index.to_string())
    }

    pub fn leave_trial(&mut self, previous: Option<String>) {
        self.trial = previous;
    }

    pub fn emit(&mut self, op: Op) {
        if let Some(block) = self.blocks.last_mut() {
            block.push(op);
        }
    }

    pub fn open(&mut self) {
        self.blocks.push(Vec::new());
    }

    /// Close the innermost block and hand back its statements. The
    /// outermost block is never closed this way.
    pub fn close(&mut self) -> Vec<Op> {
        if self.blocks.len() > 1 {
            self.blocks.pop().unwrap_or_default()
        } else {
            Vec::new()
        }
    }

    /// Take every statement emitted at the outermost level.
    pub fn finish(mut self) -> Vec<Op> {
        while self.blocks.len() > 1 {
            let inner = self.close();
            self.emit_all(inner);
        }
        self.blocks.pop().unwrap_or_default()
    }

    fn emit_all(&mut self, ops: Vec<Op>) {
        for op in ops {
            self.emit(op);
        }
    }
}

/// Lowers typed clauses against a fixed significance level and library.
#[derive(Clone, Debug)]
pub struct Lowering {
    library: Library,
    alpha: String,
}

impl Default for Lowering {
    fn default() -> Self {
        Self::new(Library::default(), 0.05)
    }
}

impl Lowering {
    pub fn new(library: Library, alpha: f64) -> Self {
        Self {
            library,
            alpha: format!("{}", alpha),
        }
    }

    /// Lower an accuracy clause. Statements needed to compute it are
    /// emitted into `ctx`; the returned verdict is the final expression.
    pub fn lower_clause(
        &self,
        ctx: &mut LowerCtx,
        expr: &BoolExpr,
        mode: Mode,
    ) -> Result<Verdict, CheckError> {
        trace!(?mode, "lowering clause");
        self.lower_bool(ctx, expr, mode)
    }

    /// Interpret a p-value in the requested mode.
    fn from_pvalue(&self, mode: Mode, pvalue: String) -> Verdict {
        match mode {
            Mode::Boolean => Verdict::Boolean(format!("({}>={})", pvalue, self.alpha)),
            Mode::PValue => Verdict::Probability(pvalue),
        }
    }

    /// Interpret a truth value in the requested mode.
    fn from_bool(&self, mode: Mode, cond: String) -> Verdict {
        match mode {
            Mode::Boolean => Verdict::Boolean(cond),
            Mode::PValue => Verdict::Probability(format!("(1 if {} else 0)", cond)),
        }
    }
}
