use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diagnostic::Diagnostic;
use crate::driver::GenOptions;
use crate::plan::PlanOptions;
use crate::span::Span;

pub const CONFIG_FILE: &str = "checkgen.toml";

/// Settings from checkgen.toml. Every field is optional in the file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub checker: CheckerConfig,
    pub plan: PlanConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerConfig {
    pub alpha: f64,
    pub library: String,
    pub data_prefix: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        let options = GenOptions::default();
        Self {
            alpha: options.alpha,
            library: options.library,
            data_prefix: options.data_prefix,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanConfig {
    pub beta: f64,
    pub delta: f64,
}

impl Default for PlanConfig {
    fn default() -> Self {
        let options = PlanOptions::default();
        Self {
            beta: options.beta,
            delta: options.delta,
        }
    }
}

impl Config {
    /// Load settings from a checkgen.toml file.
    pub fn load(toml_path: &Path) -> Result<Config, Diagnostic> {
        let content = std::fs::read_to_string(toml_path).map_err(|e| {
            Diagnostic::error(
                format!("cannot read '{}': {}", toml_path.display(), e),
                Span::dummy(),
            )
        })?;
        let config = Self::parse(&content).map_err(|d| {
            d.with_note(format!("while loading '{}'", toml_path.display()))
        })?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Config, Diagnostic> {
        let config: Config = toml::from_str(content).map_err(|e| {
            Diagnostic::error(format!("invalid {}: {}", CONFIG_FILE, e.message()), Span::dummy())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Try to find a checkgen.toml in the given directory or its ancestors.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.exists() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Load the nearest checkgen.toml, or the defaults when there is none.
    pub fn discover(start_dir: &Path) -> Result<Config, Diagnostic> {
        match Self::find(start_dir) {
            Some(path) => Self::load(&path),
            None => Ok(Config::default()),
        }
    }

    fn validate(&self) -> Result<(), Diagnostic> {
        for (name, value) in [
            ("checker.alpha", self.checker.alpha),
            ("plan.beta", self.plan.beta),
            ("plan.delta", self.plan.delta),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(Diagnostic::error(
                    format!("{} must lie strictly between 0 and 1, got {}", name, value),
                    Span::dummy(),
                ));
            }
        }
        let library = &self.checker.library;
        if library.is_empty() || !library.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.') {
            return Err(Diagnostic::error(
                format!("checker.library '{}' is not a module name", library),
                Span::dummy(),
            )
            .with_help("use a Python module path such as `AxProf`".to_string()));
        }
        Ok(())
    }

    pub fn gen_options(&self) -> GenOptions {
        GenOptions {
            alpha: self.checker.alpha,
            library: self.checker.library.clone(),
            data_prefix: self.checker.data_prefix.clone(),
        }
    }

    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            alpha: self.checker.alpha,
            beta: self.plan.beta,
            delta: self.plan.delta,
        }
    }
}
