use super::display::{format_bool, format_data};
use super::*;

fn io_decls() -> Vec<Decl> {
    vec![
        Decl::new(INPUT, ValueType::sequence(ValueType::Scalar)),
        Decl::new(OUTPUT, ValueType::Scalar),
    ]
}

#[test]
fn test_time_only_spec_is_performance_only() {
    let spec = Specification::new(io_decls(), None, Some(DataExpr::ident("n")), None).unwrap();
    assert_eq!(spec.domain(), Domain::PerformanceOnly);
}

#[test]
fn test_space_only_spec_is_performance_only() {
    let spec = Specification::new(io_decls(), None, None, Some(DataExpr::ident("k"))).unwrap();
    assert_eq!(spec.domain(), Domain::PerformanceOnly);
}

#[test]
fn test_empty_spec_has_no_domain() {
    let spec = Specification::new(io_decls(), None, None, None).unwrap();
    assert_eq!(spec.domain(), Domain::None);
}

#[test]
fn test_missing_output_rejected() {
    let decls = vec![Decl::new(INPUT, ValueType::Scalar)];
    let err = Specification::new(decls, None, None, None).unwrap_err();
    assert!(matches!(
        err,
        CheckError::MissingRequiredDeclaration { name: "Output", .. }
    ));
}

#[test]
fn test_missing_input_rejected() {
    let decls = vec![Decl::new(OUTPUT, ValueType::Scalar)];
    let err = Specification::new(decls, None, None, None).unwrap_err();
    assert!(matches!(
        err,
        CheckError::MissingRequiredDeclaration { name: "Input", .. }
    ));
}

#[test]
fn test_accuracy_clause_decides_domain() {
    let acc = BoolExpr::compare(
        DataExpr::expectation_over_inputs(DataExpr::ident(OUTPUT)),
        CmpOp::Eq,
        DataExpr::constant("1"),
    );
    let spec =
        Specification::new(io_decls(), Some(acc), Some(DataExpr::ident("n")), None).unwrap();
    assert_eq!(spec.domain(), Domain::OverInputs);
}

#[test]
fn test_approx_eq_is_over_runs() {
    let e = BoolExpr::approx_eq(DataExpr::ident(OUTPUT), DataExpr::constant("3"));
    assert_eq!(e.domain(), Domain::OverRuns);
}

#[test]
fn test_approx_eq_over_statistic_conflicts() {
    let nested = DataExpr::expectation_over_runs(DataExpr::ident(OUTPUT));
    let e = BoolExpr::approx_eq(DataExpr::ident(OUTPUT), nested);
    assert_eq!(e.domain(), Domain::Conflict);
}

#[test]
fn test_membership_is_not_probabilistic() {
    let e = BoolExpr::member(DataExpr::ident("x"), DataExpr::ident(OUTPUT));
    assert_eq!(e.domain(), Domain::None);
}

#[test]
fn test_forall_and_not_pass_body_domain() {
    let body = BoolExpr::approx_eq(DataExpr::ident(OUTPUT), DataExpr::ident("x"));
    let e = BoolExpr::not(BoolExpr::for_all(
        vec![Range::elements("x", DataExpr::ident(INPUT))],
        body,
    ));
    assert_eq!(e.domain(), Domain::OverRuns);
}

#[test]
fn test_binary_merges_statistics() {
    let a = DataExpr::probability_over_inputs(BoolExpr::compare(
        DataExpr::ident(OUTPUT),
        CmpOp::Gt,
        DataExpr::constant("0"),
    ));
    let b = DataExpr::expectation_over_items(
        vec![Range::elements("i", DataExpr::ident(INPUT))],
        DataExpr::ident("i"),
    );
    let sum = DataExpr::binary(a, ArithOp::Add, b);
    assert_eq!(sum.domain(), Domain::Conflict);
}

#[test]
fn test_deserialize_front_end_tree() {
    let json = r#"{
        "decls": [
            {"name": "Input", "ty": {"sequence": "scalar"}},
            {"name": "Output", "ty": "scalar"}
        ],
        "accuracy": {
            "kind": "compare",
            "lhs": {"kind": "expectation_over_runs", "body": {"kind": "identifier", "name": "Output"}},
            "op": "==",
            "rhs": {"kind": "binary",
                    "lhs": {"kind": "identifier", "name": "coins"},
                    "op": "/",
                    "rhs": {"kind": "constant", "value": "2"}}
        },
        "time": {"kind": "binary",
                 "lhs": {"kind": "constant", "value": "2"},
                 "op": "^",
                 "rhs": {"kind": "identifier", "name": "k", "span": {"start": 40, "end": 41}}}
    }"#;
    let spec: Specification = serde_json::from_str(json).unwrap();
    assert_eq!(spec.domain(), Domain::OverRuns);
    let input = spec.decls.iter().find(|d| d.name == INPUT).map(|d| &d.ty);
    assert_eq!(input, Some(&ValueType::sequence(ValueType::Scalar)));
    match &spec.time.as_ref().unwrap().kind {
        DataKind::Binary { op, rhs, .. } => {
            assert_eq!(*op, ArithOp::Pow);
            assert_eq!(rhs.span, Span::new(40, 41));
        }
        other => panic!("expected binary time clause, got {:?}", other),
    }
    assert!(spec.accuracy.as_ref().unwrap().span.is_dummy());
}

#[test]
fn test_display_renders_spec_syntax() {
    let e = BoolExpr::compare(
        DataExpr::probability_over_items(
            vec![Range::unique("x", DataExpr::ident(INPUT))],
            BoolExpr::member(DataExpr::ident("x"), DataExpr::ident(OUTPUT)),
        ),
        CmpOp::Ge,
        DataExpr::constant("0.9"),
    );
    assert_eq!(
        format_bool(&e),
        "Probability over x in uniques(Input) [x in Output] >= 0.9"
    );
    let call = DataExpr::call("abs", vec![DataExpr::size_of(DataExpr::ident("L"))]);
    assert_eq!(format_data(&call), "abs(size(L))");
}
