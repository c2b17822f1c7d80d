//! Generation driver: assembles the harness module for one specification.
//!
//! The module always defines `inpAgg`, `cfgAgg` and `finalFunc`; a checker
//! function precedes them unless the specification is performance-only.
//! Its name and parameter list depend on the probability domain:
//!
//! | domain       | checker                                        |
//! |--------------|------------------------------------------------|
//! | over inputs  | `perConfigFunc(Config, Runs, Inputs, Output)`  |
//! | over runs    | `perInpFunc(Config, Input, Runs, Output)`      |
//! | over items   | `perRunFunc(Config, Input, Output)`            |

use tracing::{debug, info};

use crate::ast::{Specification, INPUT, OUTPUT};
use crate::emit::ir::{op_count, Function, Op};
use crate::emit::library::Library;
use crate::emit::python::render_module;
use crate::emit::{LowerCtx, Lowering, Mode};
use crate::error::CheckError;
use crate::fit::{synthesize, FitFunction};
use crate::types::Domain;

/// Settings that shape the generated module.
#[derive(Clone, Debug, PartialEq)]
pub struct GenOptions {
    /// Significance level of every statistical test.
    pub alpha: f64,
    /// Module prefix of the statistics library.
    pub library: String,
    /// Path prefix for dumped time/space tables. The harness substitutes
    /// `%FILENAME%`.
    pub data_prefix: String,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            library: "AxProf".to_string(),
            data_prefix: "outputs/%FILENAME%".to_string(),
        }
    }
}

/// The generated module and what went into it.
#[derive(Clone, Debug)]
pub struct Generated {
    pub domain: Domain,
    pub functions: Vec<Function>,
    pub time_fit: Option<FitFunction>,
    pub space_fit: Option<FitFunction>,
    pub source: String,
}

impl Generated {
    /// Name of the checker function, if one was emitted.
    pub fn checker(&self) -> Option<&str> {
        checker_signature(self.domain).map(|(name, _)| name)
    }

    pub fn statement_count(&self) -> usize {
        self.functions.iter().map(|f| op_count(&f.body)).sum()
    }
}

/// Checker name and parameters for a domain. `None` for domains that get
/// no checker.
pub fn checker_signature(domain: Domain) -> Option<(&'static str, &'static [&'static str])> {
    match domain {
        Domain::OverInputs => Some(("perConfigFunc", &["Config", "Runs", "Inputs", OUTPUT])),
        Domain::OverRuns => Some(("perInpFunc", &["Config", INPUT, "Runs", OUTPUT])),
        Domain::OverItems => Some(("perRunFunc", &["Config", INPUT, OUTPUT])),
        Domain::PerformanceOnly | Domain::None | Domain::Conflict => None,
    }
}

/// Generate the harness module for an analyzed specification.
pub fn generate(spec: &Specification, options: &GenOptions) -> Result<Generated, CheckError> {
    let domain = spec.domain();
    if let Some(err) = domain_error(spec, domain) {
        return Err(err);
    }
    info!(%domain, "generating checker module");

    let library = Library::new(&options.library);
    let mut functions = Vec::new();

    if let (Some((name, params)), Some(acc)) = (checker_signature(domain), spec.accuracy.as_ref()) {
        let lowering = Lowering::new(library.clone(), options.alpha);
        let mut ctx = LowerCtx::new(&scope_names(domain));
        ctx.emit(Op::assign(OUTPUT, format!("{}['acc']", OUTPUT)));

        let verdict = lowering.lower_clause(&mut ctx, acc, Mode::Boolean)?;
        let result = if is_plain_name(verdict.expr()) {
            verdict.into_expr()
        } else {
            let temp = ctx.fresh();
            ctx.emit(Op::assign(&temp, verdict.into_expr()));
            temp
        };
        ctx.emit(Op::If {
            cond: format!("not {}", result),
            body: vec![Op::print("'Checker detected a possible error'")],
        });
        ctx.emit(Op::Return(result));

        let body = ctx.finish();
        debug!(checker = name, statements = op_count(&body), "lowered accuracy clause");
        functions.push(Function::new(name, params, body));
    }

    functions.push(input_aggregator(domain));
    functions.push(config_aggregator(domain));

    let time_fit = spec.time.as_ref().map(synthesize).transpose()?;
    let space_fit = spec.space.as_ref().map(synthesize).transpose()?;
    functions.push(final_function(
        &library,
        &options.data_prefix,
        time_fit.as_ref(),
        space_fit.as_ref(),
    ));

    let source = render_module(&functions);
    Ok(Generated {
        domain,
        functions,
        time_fit,
        space_fit,
        source,
    })
}

/// The error for a domain generation refuses, if `domain` is one.
pub fn domain_error(spec: &Specification, domain: Domain) -> Option<CheckError> {
    match domain {
        Domain::Conflict => Some(CheckError::UnsupportedDomainCombination { span: spec.span }),
        Domain::None => match &spec.accuracy {
            Some(acc) => Some(CheckError::NoStatisticalClause { span: acc.span }),
            None => Some(CheckError::EmptySpecification { span: spec.span }),
        },
        Domain::OverInputs | Domain::OverRuns | Domain::OverItems | Domain::PerformanceOnly => {
            None
        }
    }
}

/// Names the checker signature binds.
fn scope_names(domain: Domain) -> Vec<&'static str> {
    let mut names = vec!["Config", OUTPUT];
    if matches!(domain, Domain::OverRuns | Domain::OverInputs) {
        names.push("Runs");
    }
    if domain == Domain::OverInputs {
        names.push("Inputs");
    } else {
        names.push(INPUT);
    }
    names
}

fn is_plain_name(expr: &str) -> bool {
    !expr.is_empty() && expr.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ─── Aggregators ───────────────────────────────────────────────────

const EMPTY_AGG: &str = "{'acc':[], 'time':0, 'space':0}";

fn init_agg() -> Op {
    Op::If {
        cond: "agg==None".to_string(),
        body: vec![Op::assign("agg", EMPTY_AGG)],
    }
}

/// Running mean of `key` after folding in `source` as sample `index`.
fn running_mean(key: &str, index: &str, source: &str) -> Op {
    Op::assign(
        &format!("agg['{}']", key),
        format!(
            "(agg['{k}']*{i} + {s}['{k}'])/({i}+1)",
            k = key,
            i = index,
            s = source
        ),
    )
}

/// Folds one run's output into the per-input aggregate.
fn input_aggregator(domain: Domain) -> Function {
    let mut body = vec![init_agg()];
    if matches!(domain, Domain::OverRuns | Domain::OverInputs) {
        body.push(Op::Append {
            list: "agg['acc']".to_string(),
            value: "output['acc']".to_string(),
        });
    }
    body.push(running_mean("time", "run", "output"));
    body.push(running_mean("space", "run", "output"));
    body.push(Op::Return("agg".to_string()));
    Function::new("inpAgg", &["agg", "run", "output"], body)
}

/// Folds one input's aggregate into the per-configuration aggregate.
fn config_aggregator(domain: Domain) -> Function {
    let mut body = vec![init_agg()];
    if domain == Domain::OverInputs {
        body.push(Op::Update {
            target: "agg['acc']".to_string(),
            op: "+=",
            value: "inpAgg['acc']".to_string(),
        });
    }
    body.push(running_mean("time", "input", "inpAgg"));
    body.push(running_mean("space", "input", "inpAgg"));
    body.push(Op::Return("agg".to_string()));
    Function::new("cfgAgg", &["agg", "input", "inpAgg"], body)
}

// ─── Finalization ──────────────────────────────────────────────────

/// One measured resource with an optional cost model.
#[derive(Clone, Copy, Debug)]
enum Resource {
    Time,
    Space,
}

impl Resource {
    fn key(self) -> &'static str {
        match self {
            Resource::Time => "time",
            Resource::Space => "space",
        }
    }

    fn table(self) -> &'static str {
        match self {
            Resource::Time => "times",
            Resource::Space => "spaces",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Resource::Time => "Time",
            Resource::Space => "space",
        }
    }
}

fn final_function(
    library: &Library,
    data_prefix: &str,
    time_fit: Option<&FitFunction>,
    space_fit: Option<&FitFunction>,
) -> Function {
    let mut body = Vec::new();
    for res in [Resource::Time, Resource::Space] {
        body.push(Op::assign(
            res.table(),
            format!("{{k:v['{}'] for k, v in outputs.items()}}", res.key()),
        ));
        let path = format!("{}-{}Data.txt", data_prefix, res.key());
        body.push(Op::expr(library.dump_obtained_data(res.table(), &path, res.key())));
    }
    for (res, fit) in [(Resource::Time, time_fit), (Resource::Space, space_fit)] {
        if let Some(fit) = fit {
            body.extend(fit_block(library, res, fit));
        }
    }
    Function::new(
        "finalFunc",
        &["paramNames", "outputs", "runs", "inputs"],
        body,
    )
}

/// Model definition plus a guarded regression against the measured table.
fn fit_block(library: &Library, res: Resource, fit: &FitFunction) -> Vec<Op> {
    let func = format!("{}FitFunc", res.key());
    let call = library.fit_func_to_data(res.table(), &func, &fit.inputs);
    vec![
        Op::Def {
            name: func,
            params: fit.params(),
            body: vec![Op::Return(fit.body.clone())],
        },
        Op::Try {
            body: vec![
                Op::assign("popt, rsqd", call),
                Op::print(&format!(
                    "'{} usage:\\nOptimal curve fit parameters:',popt,'\\nR^2 metric:',rsqd",
                    res.label()
                )),
            ],
            catch: vec!["RuntimeError".to_string(), "TypeError".to_string()],
            handler: vec![Op::print(&format!(
                "'Unable to find optimal curve fit parameters for {} data'",
                res.key()
            ))],
        },
    ]
}
