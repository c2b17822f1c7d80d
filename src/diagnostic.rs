use crate::span::Span;

/// A fatal problem with a specification, its settings or its input file.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    /// Stable identifier such as `E0003`, present for analysis errors.
    pub code: Option<&'static str>,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(message: String, span: Span) -> Self {
        Self {
            code: None,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Render to stderr using ariadne. A label is drawn only when the
    /// source text is known and the span points into it.
    pub fn render(&self, filename: &str, source: &str) {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let start = (self.span.start as usize).min(source.len());
        let end = (self.span.end as usize).clamp(start, source.len());

        let mut report =
            Report::build(ReportKind::Error, filename, start).with_message(&self.message);
        if let Some(code) = self.code {
            report = report.with_code(code);
        }
        if !source.is_empty() && !self.span.is_dummy() {
            report = report.with_label(
                Label::new((filename, start..end))
                    .with_message(&self.message)
                    .with_color(Color::Red),
            );
        }
        for note in &self.notes {
            report = report.with_note(note);
        }
        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        if report
            .finish()
            .eprint((filename, Source::from(source)))
            .is_err()
        {
            eprintln!("{}: {}", filename, self.message);
        }
    }
}

/// Render a list of diagnostics.
pub fn render_diagnostics(diagnostics: &[Diagnostic], filename: &str, source: &str) {
    for diag in diagnostics {
        diag.render(filename, source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckError;

    #[test]
    fn test_check_error_carries_code_and_span() {
        let err = CheckError::Untyped {
            node: "Output".to_string(),
            span: Span::new(4, 10),
        };
        let diag = Diagnostic::from(err);
        assert_eq!(diag.code, Some("E0012"));
        assert_eq!(diag.span, Span::new(4, 10));
        assert_eq!(diag.message, "expression `Output` has no resolved type");
    }

    #[test]
    fn test_builders_accumulate() {
        let diag = Diagnostic::error("bad".to_string(), Span::dummy())
            .with_note("first".to_string())
            .with_note("second".to_string())
            .with_help("fix it".to_string());
        assert_eq!(diag.code, None);
        assert_eq!(diag.notes, vec!["first", "second"]);
        assert_eq!(diag.help.as_deref(), Some("fix it"));
    }
}
