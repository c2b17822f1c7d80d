pub mod ast;
pub mod config;
pub mod diagnostic;
pub mod driver;
pub mod emit;
pub mod error;
pub mod fit;
pub mod input;
pub mod plan;
pub mod report;
pub mod span;
pub mod typecheck;
pub mod types;

use ast::Specification;
use diagnostic::{render_diagnostics, Diagnostic};
use error::CheckError;
use input::SpecFile;
use types::Domain;

pub use driver::{GenOptions, Generated};

/// Analyze a specification and generate its harness module.
pub fn generate(file: &SpecFile, options: &GenOptions) -> Result<Generated, Vec<Diagnostic>> {
    generate_silent(&file.spec, options).map_err(|errors| {
        render_diagnostics(&errors, file.display_name(), file.source_text());
        errors
    })
}

/// Analyze a specification and report its probability domain.
pub fn check(file: &SpecFile) -> Result<Domain, Vec<Diagnostic>> {
    check_silent(&file.spec).map_err(|errors| {
        render_diagnostics(&errors, file.display_name(), file.source_text());
        errors
    })
}

/// Like [`generate`], without rendering diagnostics to stderr.
pub fn generate_silent(spec: &Specification, options: &GenOptions) -> Result<Generated, Vec<Diagnostic>> {
    let mut spec = spec.clone();
    typecheck::analyze(&mut spec).map_err(into_diagnostics)?;
    driver::generate(&spec, options).map_err(into_diagnostics)
}

/// Like [`check`], without rendering diagnostics to stderr. Domains that
/// generation would refuse are reported here as well.
pub fn check_silent(spec: &Specification) -> Result<Domain, Vec<Diagnostic>> {
    let mut spec = spec.clone();
    let domain = typecheck::analyze(&mut spec).map_err(into_diagnostics)?;
    match driver::domain_error(&spec, domain) {
        Some(err) => Err(into_diagnostics(err)),
        None => Ok(domain),
    }
}

fn into_diagnostics(err: CheckError) -> Vec<Diagnostic> {
    vec![err.to_diagnostic()]
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::ast::*;
    use crate::span::Span;
    use crate::types::ValueType;

    fn list() -> ValueType {
        ValueType::sequence(ValueType::Scalar)
    }

    fn spec(decls: Vec<Decl>, acc: BoolExpr) -> Specification {
        Specification::new(decls, Some(acc), None, None).unwrap()
    }

    #[test]
    fn test_mean_over_runs_end_to_end() {
        let acc = BoolExpr::compare(
            DataExpr::expectation_over_runs(DataExpr::ident(OUTPUT)),
            CmpOp::Eq,
            DataExpr::constant("10.0"),
        );
        let spec = spec(
            vec![
                Decl::new(INPUT, ValueType::Scalar),
                Decl::new(OUTPUT, ValueType::Scalar),
            ],
            acc,
        );
        assert_eq!(check_silent(&spec).unwrap(), Domain::OverRuns);

        let generated = generate_silent(&spec, &GenOptions::default()).unwrap();
        assert!(generated
            .source
            .starts_with("def perInpFunc(Config, Input, Runs, Output):\n"));
        assert!(generated.source.contains("AxProf.ttest_1samp(Output,10.0)"));
        assert!(generated.source.contains("(t0[1]>=0.05)"));
    }

    #[test]
    fn test_conflicting_domains_abort_generation() {
        let over_inputs = BoolExpr::compare(
            DataExpr::probability_over_inputs(BoolExpr::compare(
                DataExpr::ident(OUTPUT),
                CmpOp::Gt,
                DataExpr::constant("0"),
            )),
            CmpOp::Ge,
            DataExpr::constant("0.9"),
        );
        let over_items = BoolExpr::compare(
            DataExpr::probability_over_items(
                vec![Range::elements("x", DataExpr::ident(INPUT))],
                BoolExpr::compare(DataExpr::ident("x"), CmpOp::Gt, DataExpr::constant("0")),
            ),
            CmpOp::Ge,
            DataExpr::constant("0.5"),
        );
        let spec = spec(
            vec![Decl::new(INPUT, list()), Decl::new(OUTPUT, ValueType::Scalar)],
            BoolExpr::and(over_inputs, over_items),
        );

        let errors = generate_silent(&spec, &GenOptions::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "specification mixes incompatible probability domains"
        );
        assert!(check_silent(&spec).is_err());
    }

    #[test]
    fn test_for_all_exits_every_loop_on_first_failure() {
        let acc = BoolExpr::for_all(
            vec![
                Range::indices("i", DataExpr::ident(INPUT)),
                Range::elements("y", DataExpr::ident(OUTPUT)),
            ],
            BoolExpr::compare(
                DataExpr::lookup(DataExpr::ident(INPUT), DataExpr::ident("i")),
                CmpOp::Le,
                DataExpr::ident("y"),
            ),
        );
        let expect = BoolExpr::compare(
            DataExpr::expectation_over_runs(DataExpr::ident(OUTPUT)),
            CmpOp::Eq,
            DataExpr::constant("1"),
        );
        // The quantifier alone has no domain; pair it with a runs clause.
        let spec = spec(
            vec![Decl::new(INPUT, list()), Decl::new(OUTPUT, list())],
            BoolExpr::and(acc, expect),
        );
        let generated = generate_silent(&spec, &GenOptions::default()).unwrap();
        let expected_loops = "\
  t0 = True
  for i in range(len(Input)):
    for y in Output:
      t0 = t0 and (Input[i]<=y)
      if not t0:
        break
    if not t0:
      break
";
        assert!(
            generated.source.contains(expected_loops),
            "{}",
            generated.source
        );
        assert_eq!(generated.source.matches("break").count(), 2);
    }

    #[test]
    fn test_performance_only_spec_from_json() {
        let json = r#"{
            "filename": "sort.spec",
            "spec": {
                "decls": [
                    { "name": "Input", "ty": { "sequence": "scalar" } },
                    { "name": "Output", "ty": { "sequence": "scalar" } }
                ],
                "time": {
                    "kind": "binary",
                    "lhs": { "kind": "size_of", "collection": { "kind": "identifier", "name": "Input" } },
                    "op": "*",
                    "rhs": { "kind": "call", "name": "log",
                             "args": [ { "kind": "size_of", "collection": { "kind": "identifier", "name": "Input" } } ] }
                }
            }
        }"#;
        let file = SpecFile::parse(json).unwrap();
        assert_eq!(check_silent(&file.spec).unwrap(), Domain::PerformanceOnly);

        let generated = generate_silent(&file.spec, &GenOptions::default()).unwrap();
        assert_eq!(generated.checker(), None);
        let fit = generated.time_fit.as_ref().unwrap();
        assert_eq!(fit.inputs, vec!["Input"]);
        assert_eq!(
            fit.body,
            "((p0*len(Cfg[0])+p1)*(log((p2*len(Cfg[0])+p3))*p4+p5)+p6)"
        );
        assert!(generated.source.contains("def timeFitFunc(Cfg,p0,p1,p2,p3,p4,p5,p6):"));
    }

    #[test]
    fn test_missing_output_is_a_diagnostic() {
        let json = r#"{ "spec": { "decls": [ { "name": "Input", "ty": "scalar" } ] } }"#;
        let file = SpecFile::parse(json).unwrap();
        let errors = check_silent(&file.spec).unwrap_err();
        assert_eq!(errors[0].message, "specification does not declare `Output`");
        assert!(errors[0].help.is_some());
    }

    #[test]
    fn test_accuracy_without_statistic_is_not_called_empty() {
        let mut acc =
            BoolExpr::compare(DataExpr::ident(OUTPUT), CmpOp::Gt, DataExpr::constant("0"));
        acc.span = Span::new(30, 40);
        let spec = Specification::new(
            vec![
                Decl::new(INPUT, ValueType::Scalar),
                Decl::new(OUTPUT, ValueType::Scalar),
            ],
            Some(acc),
            Some(DataExpr::ident("n")),
            None,
        )
        .unwrap();

        let errors = generate_silent(&spec, &GenOptions::default()).unwrap_err();
        assert_eq!(
            errors[0].message,
            "accuracy clause contains no probability, expectation or approximate comparison"
        );
        assert_eq!(errors[0].code, Some("E0015"));
        assert_eq!(errors[0].span, Span::new(30, 40));
        assert!(!errors[0].help.as_deref().unwrap_or("").contains("`TIME`"));

        let errors = check_silent(&spec).unwrap_err();
        assert!(errors[0].message.starts_with("accuracy clause contains no"));
    }

    #[test]
    fn test_empty_spec_is_a_diagnostic() {
        let json = r#"{ "spec": { "decls": [
            { "name": "Input", "ty": "scalar" }, { "name": "Output", "ty": "scalar" } ] } }"#;
        let file = SpecFile::parse(json).unwrap();
        let errors = generate_silent(&file.spec, &GenOptions::default()).unwrap_err();
        assert!(errors[0].message.starts_with("specification is empty"));
    }
}
