//! Render statement IR as Python source.

use super::ir::{Function, Op};

const INDENT: &str = "  ";

/// Render a sequence of top-level functions, separated by blank lines.
pub fn render_module(functions: &[Function]) -> String {
    let mut out = String::new();
    for (i, func) in functions.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&render_function(func));
    }
    out
}

pub fn render_function(func: &Function) -> String {
    let mut lines = Vec::new();
    lines.push(format!("def {}({}):", func.name, func.params.join(", ")));
    render_block(&func.body, 1, &mut lines);
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Render statements at the given depth. An empty block renders as `pass`.
pub fn render_ops(ops: &[Op], depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    render_block(ops, depth, &mut lines);
    lines
}

fn render_block(ops: &[Op], depth: usize, out: &mut Vec<String>) {
    if ops.is_empty() {
        out.push(format!("{}pass", INDENT.repeat(depth)));
        return;
    }
    for op in ops {
        render_op(op, depth, out);
    }
}

fn render_op(op: &Op, depth: usize, out: &mut Vec<String>) {
    let pad = INDENT.repeat(depth);
    match op {
        Op::Assign { target, value } => out.push(format!("{}{} = {}", pad, target, value)),
        Op::Update { target, op, value } => {
            out.push(format!("{}{} {} {}", pad, target, op, value))
        }
        Op::Append { list, value } => out.push(format!("{}{}.append({})", pad, list, value)),
        Op::Expr(expr) => out.push(format!("{}{}", pad, expr)),
        Op::For { var, iter, body } => {
            out.push(format!("{}for {} in {}:", pad, var, iter));
            render_block(body, depth + 1, out);
        }
        Op::If { cond, body } => {
            out.push(format!("{}if {}:", pad, cond));
            render_block(body, depth + 1, out);
        }
        Op::BreakUnless { cond } => {
            out.push(format!("{}if not {}:", pad, cond));
            out.push(format!("{}{}break", pad, INDENT));
        }
        Op::Return(value) => out.push(format!("{}return {}", pad, value)),
        Op::Def { name, params, body } => {
            out.push(format!("{}def {}({}):", pad, name, params.join(",")));
            render_block(body, depth + 1, out);
        }
        Op::Try {
            body,
            catch,
            handler,
        } => {
            out.push(format!("{}try:", pad));
            render_block(body, depth + 1, out);
            let exc = match catch.len() {
                0 => String::new(),
                1 => format!(" {}", catch[0]),
                _ => format!(" ({})", catch.join(", ")),
            };
            out.push(format!("{}except{}:", pad, exc));
            render_block(handler, depth + 1, out);
        }
    }
}
