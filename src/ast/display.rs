//! Render AST nodes back into spec-like text for diagnostics.

use super::*;

pub fn format_bool(expr: &BoolExpr) -> String {
    match &expr.kind {
        BoolKind::ForAll { ranges, body } => {
            format!("forall {} : {}", format_ranges(ranges), format_bool(body))
        }
        BoolKind::LetIn { name, value, body } => {
            format!("let {} = {} in {}", name, format_data(value), format_bool(body))
        }
        BoolKind::Membership { item, collection } => {
            format!("{} in {}", format_data(item), format_data(collection))
        }
        BoolKind::ApproxEq { lhs, rhs } => {
            format!("{} ~ {}", format_data(lhs), format_data(rhs))
        }
        BoolKind::Compare { lhs, op, rhs } => {
            format!("{} {} {}", format_data(lhs), op.as_str(), format_data(rhs))
        }
        BoolKind::Logic { lhs, op, rhs } => {
            format!("({} {} {})", format_bool(lhs), op.as_str(), format_bool(rhs))
        }
        BoolKind::Not { inner } => format!("not {}", format_bool(inner)),
    }
}

pub fn format_data(expr: &DataExpr) -> String {
    match &expr.kind {
        DataKind::Constant { value } => value.clone(),
        DataKind::ProbabilityOverInputs { body } => {
            format!("Probability over inputs [{}]", format_bool(body))
        }
        DataKind::ProbabilityOverRuns { body } => {
            format!("Probability over runs [{}]", format_bool(body))
        }
        DataKind::ProbabilityOverItems { ranges, body } => format!(
            "Probability over {} [{}]",
            format_ranges(ranges),
            format_bool(body)
        ),
        DataKind::ExpectationOverInputs { body } => {
            format!("Expectation over inputs [{}]", format_data(body))
        }
        DataKind::ExpectationOverRuns { body } => {
            format!("Expectation over runs [{}]", format_data(body))
        }
        DataKind::ExpectationOverItems { ranges, body } => format!(
            "Expectation over {} [{}]",
            format_ranges(ranges),
            format_data(body)
        ),
        DataKind::Lookup { collection, key } => {
            format!("{}[{}]", format_data(collection), format_data(key))
        }
        DataKind::Identifier { name } => name.clone(),
        DataKind::Tuple { elements } => {
            let items: Vec<String> = elements.iter().map(format_data).collect();
            format!("({})", items.join(", "))
        }
        DataKind::Binary { lhs, op, rhs } => {
            format!("({} {} {})", format_data(lhs), op.as_str(), format_data(rhs))
        }
        DataKind::SizeOf { collection } => format!("size({})", format_data(collection)),
        DataKind::Call { name, args } => {
            let items: Vec<String> = args.iter().map(format_data).collect();
            format!("{}({})", name, items.join(", "))
        }
    }
}

pub fn format_range(range: &Range) -> String {
    let coll = format_data(&range.collection);
    match range.mode {
        RangeMode::Elements => format!("{} in {}", range.var, coll),
        RangeMode::UniqueElements => format!("{} in uniques({})", range.var, coll),
        RangeMode::Indices => format!("{} in indices({})", range.var, coll),
    }
}

fn format_ranges(ranges: &[Range]) -> String {
    let parts: Vec<String> = ranges.iter().map(format_range).collect();
    parts.join(", ")
}
