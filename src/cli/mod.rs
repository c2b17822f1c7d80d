pub mod build;
pub mod check;
pub mod plan;

use std::path::{Path, PathBuf};
use std::process;

use checkgen::config::Config;
use checkgen::input::SpecFile;

/// Read a serialized specification tree, exiting on failure.
pub fn load_spec(input: &Path) -> SpecFile {
    match SpecFile::load(input) {
        Ok(file) => file,
        Err(d) => {
            d.render(&input.display().to_string(), "");
            process::exit(1);
        }
    }
}

/// Load `--config` if given, otherwise the nearest checkgen.toml above
/// the input file. Falls back to the defaults when there is none.
pub fn load_config(input: &Path, explicit: Option<&PathBuf>) -> Config {
    let loaded = match explicit {
        Some(path) => Config::load(path),
        None => Config::discover(input.parent().unwrap_or(Path::new("."))),
    };
    match loaded {
        Ok(config) => config,
        Err(d) => {
            let name = explicit.map_or_else(|| input.display().to_string(), |p| p.display().to_string());
            d.render(&name, "");
            process::exit(1);
        }
    }
}

/// Apply a command-line `--alpha` on top of the loaded settings.
pub fn override_alpha(config: &mut Config, alpha: Option<f64>) {
    if let Some(alpha) = alpha {
        if !(alpha > 0.0 && alpha < 1.0) {
            eprintln!("error: --alpha must lie strictly between 0 and 1, got {}", alpha);
            process::exit(1);
        }
        config.checker.alpha = alpha;
    }
}
