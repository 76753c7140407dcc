//! # Diagnostic Module
//!
//! Renderable diagnostics for the type checker, printed in the familiar
//! rustc layout:
//!
//! ```text
//! error[E0100]: Arithmetic operator applied to invalid operand
//!  --> main.shanty:3:9
//!   |
//! 2 | int f() {
//! 3 |     x = 5 + true;
//!   |         ^^^^^^^^ `+` expects int operands, found `bool`
//! 4 | }
//!   |
//! ```
//!
//! The checker produces [`TypeDiagnostic`](crate::sink::TypeDiagnostic)s;
//! these convert into [`Diagnostic`] for display. When the source text is not
//! available the renderer prints the byte range instead of an excerpt.

use crate::span::Span;
use colored::{Color, Colorize};
use std::fmt::{self, Write as _};

/// How serious a diagnostic is. Every rule violation the checker finds is an
/// error; there are no lints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The program is ill-typed
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
        }
    }

    fn color(&self) -> Color {
        match self {
            Severity::Error => Color::Red,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `^^^` underline under the construct the diagnostic is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

/// A diagnostic ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<String>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub help: Vec<String>,
    pub filename: Option<String>,
}

impl Diagnostic {
    fn with_severity(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
            filename: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label {
            span,
            message: message.into(),
        });
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub colors: bool,
    /// Source lines shown above and below each labelled line
    pub context_lines: usize,
    /// Columns a tab expands to in excerpts
    pub tab_width: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            colors: true,
            context_lines: 1,
            tab_width: 4,
        }
    }
}

impl RenderConfig {
    pub fn no_colors() -> Self {
        Self {
            colors: false,
            ..Default::default()
        }
    }
}

pub struct DiagnosticRenderer {
    config: RenderConfig,
}

impl DiagnosticRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn plain() -> Self {
        Self::new(RenderConfig::no_colors())
    }

    pub fn render(&self, diagnostic: &Diagnostic, source: Option<&str>) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail.
        let _ = self.render_to(&mut output, diagnostic, source);
        output
    }

    pub fn render_to(
        &self,
        output: &mut dyn fmt::Write,
        diagnostic: &Diagnostic,
        source: Option<&str>,
    ) -> fmt::Result {
        self.render_header(output, diagnostic)?;
        match source {
            Some(source) => self.render_excerpt(output, diagnostic, source)?,
            None => self.render_offsets(output, diagnostic)?,
        }
        for note in &diagnostic.notes {
            writeln!(output, "  = {}: {}", self.paint("note", Color::Cyan, true), note)?;
        }
        for help in &diagnostic.help {
            writeln!(output, "  = {}: {}", self.paint("help", Color::Green, true), help)?;
        }
        Ok(())
    }

    fn paint(&self, text: &str, color: Color, bold: bool) -> String {
        if !self.config.colors {
            return text.to_string();
        }
        let painted = text.color(color);
        if bold {
            painted.bold().to_string()
        } else {
            painted.to_string()
        }
    }

    fn render_header(&self, output: &mut dyn fmt::Write, diagnostic: &Diagnostic) -> fmt::Result {
        let mut head = diagnostic.severity.to_string();
        if let Some(code) = &diagnostic.code {
            write!(head, "[{}]", code)?;
        }
        writeln!(
            output,
            "{}: {}",
            self.paint(&head, diagnostic.severity.color(), true),
            self.paint(&diagnostic.message, Color::White, true)
        )
    }

    fn render_offsets(&self, output: &mut dyn fmt::Write, diagnostic: &Diagnostic) -> fmt::Result {
        let filename = diagnostic.filename.as_deref().unwrap_or("<unit>");
        for label in &diagnostic.labels {
            write!(output, " {} {}@{}", self.paint("-->", Color::Blue, true), filename, label.span)?;
            if !label.message.is_empty() {
                write!(output, ": {}", label.message)?;
            }
            writeln!(output)?;
        }
        Ok(())
    }

    fn render_excerpt(
        &self,
        output: &mut dyn fmt::Write,
        diagnostic: &Diagnostic,
        source: &str,
    ) -> fmt::Result {
        if diagnostic.labels.is_empty() {
            return Ok(());
        }

        let mut labels = diagnostic.labels.clone();
        labels.sort_by_key(|label| label.span.start);

        let lines: Vec<&str> = source.lines().collect();
        let line_starts: Vec<usize> = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        let mut shown: Vec<usize> = Vec::new();
        for label in &labels {
            let (line, _) = label.span.to_line_col(source);
            let first = line.saturating_sub(self.config.context_lines);
            let around = first..=line.saturating_add(self.config.context_lines);
            shown.extend(around.take_while(|&i| i < lines.len()));
        }
        shown.sort_unstable();
        shown.dedup();

        let gutter = shown.last().map(|n| (n + 1).to_string().len()).unwrap_or(1);
        let bar = self.paint("|", Color::Blue, true);

        let (line, col) = labels[0].span.to_line_col(source);
        writeln!(
            output,
            "{:>gutter$}{} {}:{}:{}",
            "",
            self.paint("-->", Color::Blue, true),
            diagnostic.filename.as_deref().unwrap_or("<source>"),
            line + 1,
            col + 1,
            gutter = gutter
        )?;
        writeln!(output, "{:>gutter$} {}", "", bar, gutter = gutter)?;

        let mut previous: Option<usize> = None;
        for &idx in &shown {
            if matches!(previous, Some(p) if idx > p + 1) {
                writeln!(output, "{}", self.paint("...", Color::Blue, true))?;
            }
            previous = Some(idx);

            let text = lines.get(idx).copied().unwrap_or("");
            let start = line_starts.get(idx).copied().unwrap_or(0);
            let end = start + text.len();
            let expanded = text.replace('\t', &" ".repeat(self.config.tab_width));
            let number = self.paint(&format!("{:>gutter$}", idx + 1, gutter = gutter), Color::Blue, true);
            writeln!(output, "{} {} {}", number, bar, expanded)?;

            for label in labels.iter().filter(|l| l.span.to_line_col(source).0 == idx) {
                let from = label.span.start.saturating_sub(start);
                let to = label.span.end.min(end).saturating_sub(start);
                let width = to.saturating_sub(from).max(1);
                let prefix = text.get(..from).unwrap_or(text);
                let indent = prefix.chars().map(|c| if c == '\t' { self.config.tab_width } else { 1 }).sum::<usize>();
                let mut underline = "^".repeat(width);
                if !label.message.is_empty() {
                    underline.push(' ');
                    underline.push_str(&label.message);
                }
                writeln!(
                    output,
                    "{:>gutter$} {} {}{}",
                    "",
                    bar,
                    " ".repeat(indent),
                    self.paint(&underline, diagnostic.severity.color(), true),
                    gutter = gutter
                )?;
            }
        }

        writeln!(output, "{:>gutter$} {}", "", bar, gutter = gutter)
    }
}

/// A collection of diagnostics with a closing summary line.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn render(&self, source: Option<&str>, config: RenderConfig) -> String {
        let renderer = DiagnosticRenderer::new(config);
        let mut output = String::new();
        for diagnostic in &self.diagnostics {
            output.push_str(&renderer.render(diagnostic, source));
            output.push('\n');
        }

        let errors = self.error_count();
        if errors > 0 {
            output.push_str(&format!(
                "{}: aborting due to {} previous error{}\n",
                renderer.paint("error", Color::Red, true),
                errors,
                if errors == 1 { "" } else { "s" }
            ));
        }
        output
    }
}

impl FromIterator<Diagnostic> for DiagnosticBag {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self {
            diagnostics: iter.into_iter().collect(),
        }
    }
}
