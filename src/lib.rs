#![deny(rust_2018_idioms)]

//! Compiler for Lingo, an English-like language for describing small web
//! UIs, and the reactive runtime the generated code is written against.
//!
//! The pipeline is [`lex`] → [`parse`] → [`analyze`] → [`emit`]; each stage
//! pushes diagnostics through a [`diag::Reporter`] and the [`Compiler`] stops
//! after the first stage that reports an error.

mod list;

pub mod analyze;
pub mod diag;
pub mod emit;
pub mod lex;
pub mod parse;
pub mod reactive;
pub mod source;
pub mod syntax;

use crate::diag::{Report, ReportKind, Reporter};
use crate::source::Source;

/// Module specifier generated code imports the runtime from.
pub const RUNTIME_PACKAGE: &str = "@lingo-dsl/runtime";

#[derive(Clone, Debug, Default)]
pub struct CompileOptions {
    /// Module to import custom widgets and actions from, as
    /// `import * as customFunctions from '<path>'`.
    pub custom_functions_path: Option<String>,
}

#[derive(Debug)]
pub struct CompilationResult {
    pub success: bool,
    /// Set only on success.
    pub code: Option<String>,
    /// Set only on success.
    pub dependencies: Option<Vec<String>>,
    pub errors: Vec<Report>,
    pub warnings: Vec<Report>,
}

/// Runs the whole pipeline. Reports from one compile never leak into the
/// next, so one compiler can be reused for many sources.
#[derive(Debug, Default)]
pub struct Compiler {
    reports: Vec<Report>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(
        &mut self,
        source: &str,
        filename: &str,
        options: &CompileOptions,
    ) -> CompilationResult {
        let _span = tracing::debug_span!("compile", filename).entered();
        self.reports.clear();
        let source = Source::new(filename, source);
        let mut reporter = Reporter::new(&mut self.reports);

        let tokens = lex::tokenize(&source, &mut reporter);
        if reporter.has_errors() {
            tracing::debug!("stopping after lex errors");
            return self.failed();
        }

        let program = parse::parse(&tokens, &mut reporter);
        if reporter.has_errors() {
            tracing::debug!("stopping after parse errors");
            return self.failed();
        }

        let analysis = analyze::analyze(&program, &mut reporter);
        if !analysis.success {
            tracing::debug!("stopping after analysis errors");
            return self.failed();
        }

        let generated = emit::generate(&program, options.custom_functions_path.as_deref());
        let (errors, warnings) = self.split_reports();
        CompilationResult {
            success: true,
            code: Some(generated.code),
            dependencies: Some(generated.dependencies),
            errors,
            warnings,
        }
    }

    fn failed(&mut self) -> CompilationResult {
        let (errors, warnings) = self.split_reports();
        CompilationResult {
            success: false,
            code: None,
            dependencies: None,
            errors,
            warnings,
        }
    }

    /// Errors, and everything else as warnings. Notes travel inside the
    /// report they are attached to.
    fn split_reports(&mut self) -> (Vec<Report>, Vec<Report>) {
        std::mem::take(&mut self.reports)
            .into_iter()
            .partition(|report| report.kind == ReportKind::Error)
    }
}

/// Parse and analyze without generating code, keeping every report and the
/// tree even when there are errors. Used by `lingo tree` and the baseline
/// tests.
pub struct CheckResult {
    pub program: syntax::Program,
    pub analysis: Option<analyze::Analysis>,
    pub reports: Vec<Report>,
}

pub fn check(source: &Source) -> CheckResult {
    let mut reports = vec![];
    let mut reporter = Reporter::new(&mut reports);
    let tokens = lex::tokenize(source, &mut reporter);
    let program = parse::parse(&tokens, &mut reporter);
    // analysis of a tree with holes would only repeat the syntax errors
    let analysis = if reporter.has_errors() {
        None
    } else {
        Some(analyze::analyze(&program, &mut reporter))
    };
    CheckResult {
        program,
        analysis,
        reports,
    }
}

#[cfg(test)]
mod tests;
