use std::path::PathBuf;
use std::process;

use clap::Args;

use super::load_spec;

#[derive(Args)]
pub struct CheckArgs {
    /// Serialized specification tree (.json)
    pub input: PathBuf,
}

pub fn cmd_check(args: CheckArgs) {
    let file = load_spec(&args.input);
    match checkgen::check(&file) {
        Ok(domain) => {
            eprintln!("OK: {} ({})", args.input.display(), domain);
        }
        Err(_) => {
            process::exit(1);
        }
    }
}
