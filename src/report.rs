//! Machine-readable summary of one generation run, for CI and tooling.
//!
//! Serialized with serde_json; `format_report` renders the same data as
//! a plain table for the terminal.

use serde::Serialize;

use crate::driver::{checker_signature, Generated};
use crate::fit::FitFunction;
use crate::types::Domain;

// ─── Data Structures ───────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationReport {
    pub version: u32,
    pub file: String,
    pub domain: Domain,
    pub checker: Option<CheckerSummary>,
    pub fits: Vec<FitSummary>,
    pub functions: Vec<String>,
    pub statements: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckerSummary {
    pub name: String,
    pub params: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FitSummary {
    pub resource: String,
    pub function: String,
    pub coefficients: usize,
    pub inputs: Vec<String>,
    pub model: String,
}

impl FitSummary {
    fn new(resource: &str, fit: &FitFunction) -> Self {
        Self {
            resource: resource.to_string(),
            function: format!("{}FitFunc", resource),
            coefficients: fit.coefficients,
            inputs: fit.inputs.clone(),
            model: fit.body.clone(),
        }
    }
}

// ─── Construction ──────────────────────────────────────────────────

impl GenerationReport {
    pub fn new(file: &str, generated: &Generated) -> Self {
        let checker = checker_signature(generated.domain).map(|(name, params)| CheckerSummary {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        });
        let mut fits = Vec::new();
        if let Some(fit) = &generated.time_fit {
            fits.push(FitSummary::new("time", fit));
        }
        if let Some(fit) = &generated.space_fit {
            fits.push(FitSummary::new("space", fit));
        }
        Self {
            version: 1,
            file: file.to_string(),
            domain: generated.domain,
            checker,
            fits,
            functions: generated.functions.iter().map(|f| f.name.clone()).collect(),
            statements: generated.statement_count(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn format_report(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Generation report: {}\n", self.file));
        out.push_str(&format!("  domain:     {}\n", self.domain));
        match &self.checker {
            Some(c) => out.push_str(&format!(
                "  checker:    {}({})\n",
                c.name,
                c.params.join(", ")
            )),
            None => out.push_str("  checker:    (none, performance only)\n"),
        }
        out.push_str(&format!("  functions:  {}\n", self.functions.join(", ")));
        out.push_str(&format!("  statements: {}\n", self.statements));

        if !self.fits.is_empty() {
            out.push_str(&format!(
                "\n{:<16} {:>6}  {:<20} {}\n",
                "Fit function", "coeffs", "inputs", "model"
            ));
            out.push_str(&"-".repeat(72));
            out.push('\n');
            for fit in &self.fits {
                out.push_str(&format!(
                    "{:<16} {:>6}  {:<20} {}\n",
                    fit.function,
                    fit.coefficients,
                    fit.inputs.join(","),
                    fit.model
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::driver::{generate, GenOptions};
    use crate::typecheck::analyze;
    use crate::types::ValueType;

    fn generated(acc: Option<BoolExpr>, time: Option<DataExpr>) -> Generated {
        let decls = vec![
            Decl::new(INPUT, ValueType::Scalar),
            Decl::new(OUTPUT, ValueType::Scalar),
        ];
        let mut spec = Specification::new(decls, acc, time, None).unwrap();
        analyze(&mut spec).unwrap();
        generate(&spec, &GenOptions::default()).unwrap()
    }

    #[test]
    fn test_report_lists_checker_and_fits() {
        let acc = BoolExpr::compare(
            DataExpr::expectation_over_runs(DataExpr::ident(OUTPUT)),
            CmpOp::Eq,
            DataExpr::constant("10.0"),
        );
        let time = DataExpr::binary(DataExpr::ident("n"), ArithOp::Mul, DataExpr::ident("k"));
        let report = GenerationReport::new("mean.spec", &generated(Some(acc), Some(time)));

        assert_eq!(report.domain, Domain::OverRuns);
        let checker = report.checker.as_ref().unwrap();
        assert_eq!(checker.name, "perInpFunc");
        assert_eq!(checker.params, vec!["Config", "Input", "Runs", "Output"]);
        assert_eq!(report.functions, vec!["perInpFunc", "inpAgg", "cfgAgg", "finalFunc"]);
        assert_eq!(report.fits.len(), 1);
        assert_eq!(report.fits[0].function, "timeFitFunc");
        assert_eq!(report.fits[0].coefficients, 5);
        assert_eq!(report.fits[0].inputs, vec!["n", "k"]);

        let text = report.format_report();
        assert!(text.contains("checker:    perInpFunc(Config, Input, Runs, Output)"));
        assert!(text.contains("timeFitFunc"));
    }

    #[test]
    fn test_report_json_shape() {
        let time = DataExpr::ident("n");
        let report = GenerationReport::new("perf.spec", &generated(None, Some(time)));
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["domain"], "performance_only");
        assert!(value["checker"].is_null());
        assert_eq!(value["fits"][0]["model"], "(p0*Cfg[0]+p1)");
        assert_eq!(value["functions"].as_array().map(|a| a.len()), Some(3));
    }
}
