use std::path::PathBuf;
use std::process;

use clap::Args;

use checkgen::plan::{format_plan, plan_spec};

use super::{load_config, load_spec, override_alpha};

#[derive(Args)]
pub struct PlanArgs {
    /// Serialized specification tree (.json)
    pub input: PathBuf,
    /// Settings file (default: nearest checkgen.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Significance level
    #[arg(long)]
    pub alpha: Option<f64>,
    /// Type II error rate (power is 1 - beta)
    #[arg(long)]
    pub beta: Option<f64>,
    /// Smallest deviation from the claimed probability worth detecting
    #[arg(long)]
    pub delta: Option<f64>,
    /// Print the plan as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

pub fn cmd_plan(args: PlanArgs) {
    let PlanArgs {
        input,
        config,
        alpha,
        beta,
        delta,
        json,
    } = args;

    let file = load_spec(&input);
    let mut config = load_config(&input, config.as_ref());
    override_alpha(&mut config, alpha);
    if let Some(beta) = beta {
        config.plan.beta = beta;
    }
    if let Some(delta) = delta {
        config.plan.delta = delta;
    }

    if checkgen::check(&file).is_err() {
        process::exit(1);
    }

    let options = config.plan_options();
    let entries = plan_spec(&file.spec, &options);
    if json {
        match serde_json::to_string_pretty(&entries) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("error: cannot serialize plan: {}", e);
                process::exit(1);
            }
        }
    } else {
        print!("{}", format_plan(&entries, &options));
    }
}
