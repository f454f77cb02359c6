use crate::source::{Location, Source, SourceSpan};
use crate::syntax::StateType;
use colorful::{Color, Colorful};
use serde::Serialize;
use std::fmt::{self, Write as _};

/// Pushes reports into a diagnostics sink owned elsewhere (usually by the
/// [`Compiler`](crate::Compiler), which clears it before every compile).
pub struct Reporter<'out> {
    reports: &'out mut Vec<Report>,
}

impl<'out> Reporter<'out> {
    pub fn new(reports: &'out mut Vec<Report>) -> Self {
        Self { reports }
    }

    pub fn note(&mut self, location: &Location, span: SourceSpan, message: Message) -> Reporter<'_> {
        self.report(ReportKind::Note, location, span, message)
    }

    pub fn warning(
        &mut self,
        location: &Location,
        span: SourceSpan,
        message: Message,
    ) -> Reporter<'_> {
        self.report(ReportKind::Warning, location, span, message)
    }

    pub fn error(&mut self, location: &Location, span: SourceSpan, message: Message) -> Reporter<'_> {
        self.report(ReportKind::Error, location, span, message)
    }

    pub fn report(
        &mut self,
        kind: ReportKind,
        location: &Location,
        span: SourceSpan,
        message: Message,
    ) -> Reporter<'_> {
        tracing::trace!(%location, %kind, %message, "report");
        self.reports.push(Report {
            kind,
            location: location.clone(),
            span,
            message,
            also: vec![],
        });
        let last = self.reports.last_mut().expect("just pushed");
        Reporter::new(&mut last.also)
    }

    pub fn has_errors(&self) -> bool {
        has_errors(self.reports)
    }
}

/// True if any report is an [`ReportKind::Error`]; warnings and notes never gate a stage.
pub fn has_errors(reports: &[Report]) -> bool {
    reports.iter().any(|report| report.kind == ReportKind::Error)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub kind: ReportKind,
    pub location: Location,
    pub span: SourceSpan,
    pub message: Message,
    pub also: Vec<Report>,
}

#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportKind {
    Note,
    Warning,
    Error,
}

impl ReportKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    fn color(self) -> Color {
        match self {
            Self::Note => Color::Cyan,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Message {
    // Lexer
    #[error("Unterminated string")]
    UnterminatedString,

    #[error("Unexpected character: '{ch}'")]
    UnexpectedChar { ch: char },

    // Parser
    #[error("Expected {expected}")]
    Expected { expected: &'static str },

    #[error("Unexpected token: {found}")]
    UnexpectedToken { found: String },

    #[error("Expected type, got '{found}'")]
    ExpectedType { found: String },

    #[error("Expected value, got '{found}'")]
    ExpectedValue { found: String },

    #[error("Expected widget type, got '{found}'")]
    ExpectedWidget { found: String },

    #[error("Expected event verb (click/type), got '{found}'")]
    ExpectedVerb { found: String },

    #[error("Expected string or 'called' after widget type")]
    ExpectedWidgetRef,

    #[error("Expected action keyword, got '{found}'")]
    ExpectedAction { found: String },

    #[error("Expected comparator")]
    ExpectedComparator,

    // Analyzer
    #[error("Variable '{name}' is already declared")]
    AlreadyDeclared { name: String },
    #[error("first declared here")]
    FirstDeclared,

    #[error("Type mismatch: cannot initialize '{declared}' with '{found}'")]
    TypeMismatch { declared: StateType, found: StateType },

    #[error("Undefined variable: '{name}'")]
    UndefinedVariable { name: String },

    #[error("Type error: '{name}' is '{actual}', expected '{expected}'")]
    WrongType {
        name: String,
        actual: StateType,
        expected: StateType,
    },

    #[error("Loop variable '{name}' shadows a state variable of the same name")]
    ShadowsState { name: String },

    #[error("'{name}' is reserved in the generated JavaScript and cannot be used as a name")]
    ReservedName { name: String },

    #[error("Custom widget '{name}' ignores its {part}")]
    IgnoredByCustomWidget { name: String, part: &'static str },
}

struct IndentWrite<W> {
    write: W,
    indent: usize,
    at_line_start: bool,
}

impl<W: fmt::Write> fmt::Write for IndentWrite<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for line in s.split_inclusive('\n') {
            if self.at_line_start {
                for _ in 0..self.indent {
                    self.write.write_char(' ')?;
                }
            }
            self.write.write_str(line)?;
            self.at_line_start = line.ends_with('\n');
        }
        Ok(())
    }
}

/// Renders reports as `file:line:col: kind: message`, followed by the source
/// line and a squiggle under the reported span. Notes are indented beneath.
pub struct ReportFormatter<'a> {
    write: IndentWrite<&'a mut dyn fmt::Write>,
    source: &'a Source,
    color: bool,
}

impl<'a> ReportFormatter<'a> {
    pub fn new(write: &'a mut dyn fmt::Write, source: &'a Source) -> Self {
        Self {
            write: IndentWrite {
                write,
                indent: 0,
                at_line_start: true,
            },
            source,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

impl ReportFormatter<'_> {
    pub fn write(&mut self, report: &Report) -> fmt::Result {
        if self.color {
            writeln!(
                self.write,
                "{location}: {kind}: {message}",
                location = report.location,
                kind = report.kind.as_str().color(report.kind.color()),
                message = report.message,
            )?;
        } else {
            writeln!(
                self.write,
                "{location}: {kind}: {message}",
                location = report.location,
                kind = report.kind,
                message = report.message,
            )?;
        }
        let line_span = self.source.line_span(report.span.start);
        writeln!(
            self.write,
            "{line:>4} | {source}",
            line = report.location.line,
            source = &self.source[line_span]
        )?;
        // squiggle
        write!(self.write, "     | ")?;
        for _ in 1..report.location.column {
            self.write.write_char(' ')?
        }
        let end = if line_span.contains(report.span.end) {
            report.span.end
        } else {
            line_span.end
        };
        let width = self.source.text[report.span.start.0..end.0].chars().count();
        for _ in 0..width.max(1) {
            self.write.write_char('^')?
        }
        writeln!(self.write)?;

        self.write.indent += 2;
        for report in &report.also {
            if let Err(error) = self.write(report) {
                self.write.indent -= 2;
                return Err(error);
            }
        }
        self.write.indent -= 2;

        Ok(())
    }
}
