//! Curve-fit model synthesis for cost clauses.
//!
//! A cost expression such as `n * log(k) + size(L) ** 2` becomes a model
//! with free coefficients `p0, p1, ...` that the harness fits against
//! measured time or space. Configuration inputs appear as `Cfg[i]`, in
//! the order they are first referenced.

use serde::Serialize;
use tracing::debug;

use crate::ast::display::format_data;
use crate::ast::*;
use crate::error::CheckError;

/// Highest literal exponent expanded into a polynomial.
pub const MAX_POLYNOMIAL_DEGREE: u32 = 16;

/// A synthesized regression model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FitFunction {
    /// Model expression over `Cfg` and the coefficients.
    pub body: String,
    /// Number of coefficients, named `p0..p{n-1}`.
    pub coefficients: usize,
    /// Configuration inputs, in `Cfg` index order.
    pub inputs: Vec<String>,
}

impl FitFunction {
    /// Parameter list of the model function: `Cfg` then each coefficient.
    pub fn params(&self) -> Vec<String> {
        std::iter::once("Cfg".to_string())
            .chain((0..self.coefficients).map(|i| format!("p{}", i)))
            .collect()
    }
}

/// Build the fit model for one cost clause.
pub fn synthesize(expr: &DataExpr) -> Result<FitFunction, CheckError> {
    let mut synth = FitSynth::default();
    let body = synth.model(expr, true)?;
    debug!(
        coefficients = synth.next,
        inputs = synth.inputs.len(),
        "synthesized fit function"
    );
    Ok(FitFunction {
        body,
        coefficients: synth.next,
        inputs: synth.inputs,
    })
}

#[derive(Default)]
struct FitSynth {
    next: usize,
    inputs: Vec<String>,
}

impl FitSynth {
    /// Reserve `n` consecutive coefficients and return the first index.
    fn take(&mut self, n: usize) -> usize {
        let first = self.next;
        self.next += n;
        first
    }

    fn input_index(&mut self, name: &str) -> usize {
        match self.inputs.iter().position(|i| i == name) {
            Some(idx) => idx,
            None => {
                self.inputs.push(name.to_string());
                self.inputs.len() - 1
            }
        }
    }

    fn affine(&mut self, term: String) -> String {
        let p = self.take(2);
        format!("(p{}*{}+p{})", p, term, p + 1)
    }

    fn model(&mut self, expr: &DataExpr, top: bool) -> Result<String, CheckError> {
        match &expr.kind {
            DataKind::Constant { value } => {
                if top {
                    Ok(format!("p{}", self.take(1)))
                } else {
                    Ok(value.clone())
                }
            }

            DataKind::Identifier { name } => {
                let idx = self.input_index(name);
                Ok(self.affine(format!("Cfg[{}]", idx)))
            }

            DataKind::SizeOf { collection } => match collection.as_identifier() {
                Some(name) => {
                    let idx = self.input_index(name);
                    Ok(self.affine(format!("len(Cfg[{}])", idx)))
                }
                None => Err(Self::unsupported(expr)),
            },

            DataKind::Binary { lhs, op, rhs } => {
                if *op == ArithOp::Pow {
                    if let Some(n) = literal_exponent(rhs) {
                        return self.polynomial(expr, lhs, n);
                    }
                }
                let a = self.model(lhs, false)?;
                let b = self.model(rhs, false)?;
                match op {
                    ArithOp::Add | ArithOp::Sub => Ok(format!("({}{}{})", a, op.as_str(), b)),
                    ArithOp::Mul | ArithOp::Div => {
                        let p = self.take(1);
                        Ok(format!("({}{}{}+p{})", a, op.as_str(), b, p))
                    }
                    ArithOp::Pow => {
                        let p = self.take(2);
                        Ok(format!("(({}**{})*p{}+p{})", a, b, p, p + 1))
                    }
                }
            }

            DataKind::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|a| self.model(a, false))
                    .collect::<Result<Vec<_>, _>>()?;
                let call = format!("{}({})", name, args.join(","));
                let p = self.take(2);
                Ok(format!("({}*p{}+p{})", call, p, p + 1))
            }

            _ => Err(Self::unsupported(expr)),
        }
    }

    /// `base ** n` as `p_t + p_{t+1}*B**n + ... + p_{t+n}*B**1`, where `B`
    /// is the base's own model.
    fn polynomial(
        &mut self,
        expr: &DataExpr,
        base: &DataExpr,
        n: u32,
    ) -> Result<String, CheckError> {
        if n > MAX_POLYNOMIAL_DEGREE {
            return Err(Self::unsupported(expr));
        }
        match n {
            0 => Ok("1".to_string()),
            1 => self.model(base, false),
            _ => {
                let b = self.model(base, false)?;
                let first = self.take(n as usize + 1);
                let mut out = format!("(p{}", first);
                for (k, power) in (1..=n).rev().enumerate() {
                    out.push_str(&format!("+p{}*{}**{}", first + 1 + k, b, power));
                }
                out.push(')');
                Ok(out)
            }
        }
    }

    fn unsupported(expr: &DataExpr) -> CheckError {
        CheckError::UnsupportedCostTerm {
            node: format_data(expr),
            span: expr.span,
        }
    }
}

/// A non-negative integer literal exponent, if `expr` is one.
fn literal_exponent(expr: &DataExpr) -> Option<u32> {
    match &expr.kind {
        DataKind::Constant { value } => value.trim().parse::<u32>().ok(),
        _ => None,
    }
}
