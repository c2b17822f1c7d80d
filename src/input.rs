//! Serialized specification handed over by the parser front end.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ast::Specification;
use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// `{ "filename"?, "source"?, "spec": ... }`. The file name and source
/// text only serve diagnostics rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpecFile {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub spec: Specification,
}

impl SpecFile {
    pub fn parse(json: &str) -> Result<SpecFile, Diagnostic> {
        serde_json::from_str(json).map_err(|e| {
            Diagnostic::error(format!("malformed specification tree: {}", e), Span::dummy())
                .with_note(format!("at line {}, column {}", e.line(), e.column()))
        })
    }

    /// Read a serialized tree. A missing `filename` falls back to the
    /// path it was read from.
    pub fn load(path: &Path) -> Result<SpecFile, Diagnostic> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Diagnostic::error(
                format!("cannot read '{}': {}", path.display(), e),
                Span::dummy(),
            )
        })?;
        let mut file = Self::parse(&content)?;
        if file.filename.is_none() {
            file.filename = Some(path.display().to_string());
        }
        Ok(file)
    }

    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("<spec>")
    }

    pub fn source_text(&self) -> &str {
        self.source.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DataKind, OUTPUT};

    const SPEC: &str = r#"{
        "filename": "mean.spec",
        "source": "Input real; Output real; ACC Expectation over runs [Output] == 10.0",
        "spec": {
            "decls": [
                { "name": "Input", "ty": "scalar" },
                { "name": "Output", "ty": "scalar" }
            ],
            "accuracy": {
                "kind": "compare",
                "lhs": { "kind": "expectation_over_runs", "body": { "kind": "identifier", "name": "Output" } },
                "op": "==",
                "rhs": { "kind": "constant", "value": "10.0" },
                "span": { "start": 37, "end": 78 }
            }
        }
    }"#;

    #[test]
    fn test_parse_spec_file() {
        let file = SpecFile::parse(SPEC).unwrap();
        assert_eq!(file.display_name(), "mean.spec");
        assert!(file.source_text().starts_with("Input real;"));
        assert_eq!(file.spec.decls.len(), 2);
        let acc = file.spec.accuracy.as_ref().unwrap();
        assert_eq!(acc.span, Span::new(37, 78));
        assert!(file.spec.time.is_none());
        match &acc.kind {
            crate::ast::BoolKind::Compare { lhs, .. } => match &lhs.kind {
                DataKind::ExpectationOverRuns { body } => assert!(body.is_identifier(OUTPUT)),
                other => panic!("unexpected lhs: {:?}", other),
            },
            other => panic!("unexpected clause: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_tree_reports_position() {
        let err = SpecFile::parse(r#"{ "spec": { "decls": 3 } }"#).unwrap_err();
        assert!(err.message.starts_with("malformed specification tree"));
        assert!(err.notes[0].starts_with("at line 1"));
    }

    #[test]
    fn test_load_defaults_filename_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.json");
        std::fs::write(
            &path,
            r#"{ "spec": { "decls": [ { "name": "Input", "ty": "scalar" }, { "name": "Output", "ty": "scalar" } ] } }"#,
        )
        .unwrap();
        let file = SpecFile::load(&path).unwrap();
        assert!(file.display_name().ends_with("bare.json"));
        assert_eq!(file.source_text(), "");
    }
}
