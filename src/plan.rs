//! Sample-size planning for binomial accuracy tests.
//!
//! Estimates how many trials (runs, inputs or items) a probability
//! comparison needs before its binomial test can tell the claimed rate
//! apart from one `delta` away, at significance `alpha` and power
//! `1 - beta`.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;
use tracing::debug;

use crate::ast::display::format_bool;
use crate::ast::*;
use crate::emit::binomial_alternative;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum PlanError {
    #[error("{name} must lie in {range}, got {value}")]
    OutOfRange {
        name: &'static str,
        range: &'static str,
        value: f64,
    },
    #[error("tails must be 1 or 2, got {0}")]
    Tails(u32),
    #[error("normal distribution unavailable: {0}")]
    Distribution(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlanOptions {
    pub alpha: f64,
    /// Type II error rate; power is `1 - beta`.
    pub beta: f64,
    /// Smallest deviation from the claimed probability worth detecting.
    pub delta: f64,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            beta: 0.2,
            delta: 0.1,
        }
    }
}

fn check_open_unit(name: &'static str, value: f64) -> Result<(), PlanError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(PlanError::OutOfRange {
            name,
            range: "(0, 1)",
            value,
        })
    }
}

/// Trials needed by a binomial test of `p0` with the given error rates.
pub fn binomial_samples_required(
    alpha: f64,
    beta: f64,
    delta: f64,
    tails: u32,
    p0: f64,
) -> Result<u64, PlanError> {
    check_open_unit("alpha", alpha)?;
    check_open_unit("beta", beta)?;
    check_open_unit("delta", delta)?;
    if tails != 1 && tails != 2 {
        return Err(PlanError::Tails(tails));
    }
    if !(0.0..=1.0).contains(&p0) {
        return Err(PlanError::OutOfRange {
            name: "p0",
            range: "[0, 1]",
            value: p0,
        });
    }
    let pa = if p0 > 0.5 { p0 - delta } else { p0 + delta };
    if !(0.0..=1.0).contains(&pa) {
        return Err(PlanError::OutOfRange {
            name: "p0 shifted by delta",
            range: "[0, 1]",
            value: pa,
        });
    }

    let normal = Normal::new(0.0, 1.0).map_err(|e| PlanError::Distribution(e.to_string()))?;
    let z_alpha = normal.inverse_cdf(1.0 - alpha / tails as f64);
    let z_beta = normal.inverse_cdf(1.0 - beta);
    let spread = z_alpha * (p0 * (1.0 - p0)).sqrt() + z_beta * (pa * (1.0 - pa)).sqrt();
    let n = (spread / delta).powi(2) + 1.0 / delta;
    Ok(n.ceil() as u64)
}

/// Where a probability comparison draws its trials from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialSource {
    Inputs,
    Runs,
    Items,
}

impl TrialSource {
    pub fn name(self) -> &'static str {
        match self {
            TrialSource::Inputs => "inputs",
            TrialSource::Runs => "runs",
            TrialSource::Items => "items",
        }
    }
}

/// Sample-size estimate for one probability comparison.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlanEntry {
    pub clause: String,
    pub source: TrialSource,
    pub alternative: Option<&'static str>,
    pub tails: u32,
    pub p0: Option<f64>,
    pub samples: Option<u64>,
    /// Why no estimate was produced.
    pub reason: Option<String>,
}

/// Estimate trial counts for every probability comparison in the
/// accuracy clause, in source order.
pub fn plan_spec(spec: &Specification, options: &PlanOptions) -> Vec<PlanEntry> {
    let mut entries = Vec::new();
    if let Some(acc) = &spec.accuracy {
        collect(acc, options, &mut entries);
    }
    entries
}

fn collect(expr: &BoolExpr, options: &PlanOptions, out: &mut Vec<PlanEntry>) {
    match &expr.kind {
        BoolKind::ForAll { body, .. } | BoolKind::LetIn { body, .. } => collect(body, options, out),
        BoolKind::Not { inner } => collect(inner, options, out),
        BoolKind::Logic { lhs, rhs, .. } => {
            collect(lhs, options, out);
            collect(rhs, options, out);
        }
        BoolKind::Compare { lhs, op, rhs } => {
            let source = match lhs.kind {
                DataKind::ProbabilityOverInputs { .. } => TrialSource::Inputs,
                DataKind::ProbabilityOverRuns { .. } => TrialSource::Runs,
                DataKind::ProbabilityOverItems { .. } => TrialSource::Items,
                _ => return,
            };
            out.push(plan_comparison(expr, source, *op, rhs, options));
        }
        BoolKind::Membership { .. } | BoolKind::ApproxEq { .. } => {}
    }
}

fn plan_comparison(
    clause: &BoolExpr,
    source: TrialSource,
    op: CmpOp,
    rhs: &DataExpr,
    options: &PlanOptions,
) -> PlanEntry {
    let tails = if op == CmpOp::Eq { 2 } else { 1 };
    let mut entry = PlanEntry {
        clause: format_bool(clause),
        source,
        alternative: binomial_alternative(op),
        tails,
        p0: None,
        samples: None,
        reason: None,
    };
    if entry.alternative.is_none() {
        entry.reason = Some(format!("operator `{}` has no binomial test", op.as_str()));
        return entry;
    }
    let p0 = match &rhs.kind {
        DataKind::Constant { value } => value.trim().parse::<f64>().ok(),
        _ => None,
    };
    let Some(p0) = p0 else {
        entry.reason = Some("claimed probability is not a constant".to_string());
        return entry;
    };
    entry.p0 = Some(p0);
    match binomial_samples_required(options.alpha, options.beta, options.delta, tails, p0) {
        Ok(n) => {
            debug!(source = source.name(), p0, samples = n, "planned comparison");
            entry.samples = Some(n);
        }
        Err(e) => entry.reason = Some(e.to_string()),
    }
    entry
}

/// Human-readable plan table.
pub fn format_plan(entries: &[PlanEntry], options: &PlanOptions) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Sample plan (alpha={}, beta={}, delta={})\n",
        options.alpha, options.beta, options.delta
    ));
    if entries.is_empty() {
        out.push_str("no probability comparisons\n");
        return out;
    }
    out.push_str(&format!(
        "{:<8} {:<10} {:>5} {:>6} {:>8}  {}\n",
        "source", "test", "tails", "p0", "samples", "clause"
    ));
    out.push_str(&"-".repeat(72));
    out.push('\n');
    for e in entries {
        let p0 = e.p0.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
        let samples = e
            .samples
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<8} {:<10} {:>5} {:>6} {:>8}  {}\n",
            e.source.name(),
            e.alternative.unwrap_or("-"),
            e.tails,
            p0,
            samples,
            e.clause
        ));
        if let Some(reason) = &e.reason {
            out.push_str(&format!("  note: {}\n", reason));
        }
    }
    out
}
