use std::path::PathBuf;
use std::process;

use clap::Args;
use tracing::info;

use checkgen::report::GenerationReport;

use super::{load_config, load_spec, override_alpha};

#[derive(Args)]
pub struct BuildArgs {
    /// Serialized specification tree (.json)
    pub input: PathBuf,
    /// Output path for the generated module (default: input with .py extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Settings file (default: nearest checkgen.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Significance level for the generated tests
    #[arg(long)]
    pub alpha: Option<f64>,
    /// Print a summary of the generated functions
    #[arg(long)]
    pub report: bool,
    /// Print the summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

pub fn cmd_build(args: BuildArgs) {
    let BuildArgs {
        input,
        output,
        config,
        alpha,
        report,
        json,
    } = args;

    let file = load_spec(&input);
    let mut config = load_config(&input, config.as_ref());
    override_alpha(&mut config, alpha);

    let generated = match checkgen::generate(&file, &config.gen_options()) {
        Ok(g) => g,
        Err(_) => process::exit(1),
    };

    let out_path = output.unwrap_or_else(|| input.with_extension("py"));
    if let Err(e) = std::fs::write(&out_path, &generated.source) {
        eprintln!("error: cannot write '{}': {}", out_path.display(), e);
        process::exit(1);
    }
    info!(domain = %generated.domain, path = %out_path.display(), "wrote harness module");
    eprintln!("Generated -> {}", out_path.display());

    if report || json {
        let summary = GenerationReport::new(file.display_name(), &generated);
        if json {
            match summary.to_json() {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("error: cannot serialize report: {}", e);
                    process::exit(1);
                }
            }
        } else {
            eprintln!("\n{}", summary.format_report());
        }
    }
}
