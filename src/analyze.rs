use crate::diag::{Message, Reporter};
use crate::source::{Location, SourceSpan};
use crate::syntax::*;
use indexmap::IndexMap;

#[derive(Clone, Debug, PartialEq)]
pub struct SymbolInfo {
    pub var_type: StateType,
    pub initialized: bool,
    /// The declaration, for "first declared here" notes.
    pub location: Location,
    pub span: SourceSpan,
}

/// JavaScript reserved words, plus the names every generated module relies on.
/// State and loop variables become JS bindings verbatim, so none of these can
/// be used.
const RESERVED: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue",
    "debugger", "default", "delete", "do", "else", "enum", "eval", "export",
    "extends", "false", "finally", "for", "function", "if", "implements", "import",
    "in", "instanceof", "interface", "let", "new", "null", "package", "private",
    "protected", "public", "return", "static", "super", "switch", "this", "throw",
    "true", "try", "typeof", "undefined", "var", "void", "while", "with", "yield",
    // runtime imports and globals of the generated module
    "createApp", "createEffect", "createSignal", "customFunctions", "document",
    "renderApp",
];

/// Declared state variables in declaration order.
pub type SymbolTable = IndexMap<String, SymbolInfo>;

#[derive(Debug)]
pub struct Analysis {
    pub success: bool,
    pub symbols: SymbolTable,
}

/// Check every reference in the program against its state declarations.
/// All problems are reported; nothing stops the analysis early.
pub fn analyze(program: &Program, reporter: &mut Reporter<'_>) -> Analysis {
    let mut analyzer = Analyzer {
        symbols: SymbolTable::new(),
        reporter,
    };

    for statement in &program.statements {
        if let Statement::State(decl) = statement {
            analyzer.declare(decl);
        }
    }
    for statement in &program.statements {
        analyzer.statement(statement);
    }

    tracing::debug!(symbols = analyzer.symbols.len(), "analyzed");
    Analysis {
        success: !analyzer.reporter.has_errors(),
        symbols: analyzer.symbols,
    }
}

struct Analyzer<'reporter, 'reports> {
    symbols: SymbolTable,
    reporter: &'reporter mut Reporter<'reports>,
}

impl Analyzer<'_, '_> {
    fn declare(&mut self, decl: &StateDecl) {
        self.check_name(&decl.identifier, &decl.location, decl.span);
        match self.symbols.get(&decl.identifier) {
            Some(first) => {
                let (location, span) = (first.location.clone(), first.span);
                self.reporter
                    .error(
                        &decl.location,
                        decl.span,
                        Message::AlreadyDeclared {
                            name: decl.identifier.clone(),
                        },
                    )
                    .note(&location, span, Message::FirstDeclared);
            }
            None => {
                self.symbols.insert(
                    decl.identifier.clone(),
                    SymbolInfo {
                        var_type: decl.var_type,
                        initialized: true,
                        location: decl.location.clone(),
                        span: decl.span,
                    },
                );
            }
        }
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::State(decl) => self.state_decl(decl),
            Statement::Show(show) => self.show(show),
            Statement::Event(event) => {
                // widget references name elements, not state
                for action in &event.actions {
                    self.action(action);
                }
            }
            Statement::If(block) => {
                let condition = &block.condition;
                self.exists(&condition.identifier, &condition.location, condition.span);
                self.value(&condition.value, &condition.location, condition.span);
                for show in &block.body {
                    self.show(show);
                }
            }
            Statement::ForEach(block) => self.for_each(block),
        }
    }

    fn state_decl(&mut self, decl: &StateDecl) {
        match &decl.initial_value {
            // identifiers are only checked for existence
            Value::Identifier(name) => {
                self.exists(name, &decl.location, decl.span);
            }
            value => {
                if let Some(found) = value.literal_type() {
                    if found != decl.var_type && decl.var_type != StateType::List {
                        self.reporter.error(
                            &decl.location,
                            decl.span,
                            Message::TypeMismatch {
                                declared: decl.var_type,
                                found,
                            },
                        );
                    }
                }
            }
        }
    }

    fn show(&mut self, show: &ShowStmt) {
        if let Widget::Custom(name) = &show.widget {
            // the custom function only receives the parent and its parameters
            let ignored = [
                ("styles", show.styles.is_some()),
                ("children", show.children.is_some()),
            ];
            for (part, present) in ignored {
                if present {
                    self.reporter.warning(
                        &show.location,
                        show.span,
                        Message::IgnoredByCustomWidget {
                            name: name.clone(),
                            part,
                        },
                    );
                }
            }
        }
        if let ShowConfig::Saying { template } = &show.config {
            for part in template_parts(template) {
                if let TemplatePart::Placeholder(name) = part {
                    self.exists(name, &show.location, show.span);
                }
            }
        }
        for child in show.children.iter().flatten() {
            self.show(child);
        }
    }

    fn action(&mut self, stmt: &ActionStmt) {
        let (location, span) = (&stmt.location, stmt.span);
        match &stmt.action {
            Action::Increase { identifier, .. } | Action::Decrease { identifier, .. } => {
                self.has_type(identifier, StateType::Number, location, span);
            }
            Action::Set { identifier, value } => {
                self.exists(identifier, location, span);
                self.value(value, location, span);
            }
            Action::Add { value, list } | Action::Remove { value, list } => {
                self.has_type(list, StateType::List, location, span);
                self.value(value, location, span);
            }
            Action::Toggle { identifier } => {
                self.has_type(identifier, StateType::Boolean, location, span);
            }
            // resolved by the custom function registry at runtime
            Action::Custom { .. } => {}
        }
    }

    fn for_each(&mut self, block: &ForEachBlock) {
        self.has_type(&block.list_name, StateType::List, &block.location, block.span);
        self.check_name(&block.item_name, &block.location, block.span);

        let item = SymbolInfo {
            var_type: StateType::Text,
            initialized: true,
            location: block.location.clone(),
            span: block.span,
        };
        let shadowed = self.symbols.insert(block.item_name.clone(), item);
        if shadowed.is_some() {
            self.reporter.warning(
                &block.location,
                block.span,
                Message::ShadowsState {
                    name: block.item_name.clone(),
                },
            );
        }

        for show in &block.body {
            self.show(show);
        }

        match shadowed {
            Some(info) => {
                self.symbols.insert(block.item_name.clone(), info);
            }
            None => {
                self.symbols.shift_remove(&block.item_name);
            }
        }
    }

    fn check_name(&mut self, name: &str, location: &Location, span: SourceSpan) {
        if RESERVED.contains(&name) {
            self.reporter.error(
                location,
                span,
                Message::ReservedName {
                    name: name.to_string(),
                },
            );
        }
    }

    fn value(&mut self, value: &Value, location: &Location, span: SourceSpan) {
        if let Value::Identifier(name) = value {
            self.exists(name, location, span);
        }
    }

    fn exists(&mut self, name: &str, location: &Location, span: SourceSpan) -> Option<StateType> {
        match self.symbols.get(name) {
            Some(info) => Some(info.var_type),
            None => {
                self.reporter.error(
                    location,
                    span,
                    Message::UndefinedVariable {
                        name: name.to_string(),
                    },
                );
                None
            }
        }
    }

    fn has_type(&mut self, name: &str, expected: StateType, location: &Location, span: SourceSpan) {
        let Some(actual) = self.exists(name, location, span) else {
            return;
        };
        if actual != expected {
            self.reporter.error(
                location,
                span,
                Message::WrongType {
                    name: name.to_string(),
                    actual,
                    expected,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::{Report, ReportKind};
    use crate::lex::tokenize;
    use crate::parse::parse;
    use crate::source::Source;

    fn analyze_source(text: &str) -> (Analysis, Vec<Report>) {
        let source = Source::new("test.lingo", text);
        let mut reports = vec![];
        let mut reporter = Reporter::new(&mut reports);
        let tokens = tokenize(&source, &mut reporter);
        let program = parse(&tokens, &mut reporter);
        assert!(!reporter.has_errors(), "syntax errors in test source");
        let analysis = analyze(&program, &mut reporter);
        (analysis, reports)
    }

    fn errors(reports: &[Report]) -> Vec<String> {
        reports
            .iter()
            .filter(|report| report.kind == ReportKind::Error)
            .map(|report| report.message.to_string())
            .collect()
    }

    #[test]
    fn valid_program() {
        let (analysis, reports) = analyze_source(
            "There is a number called count starting at 0.\n\
             There is a list called todos starting empty.\n\
             Show text saying \"Count: {count}\".\n\
             When I click the button \"Add\",\n\
             increase count by 1.\n\
             add \"x\" to todos.",
        );
        assert!(reports.is_empty(), "{reports:#?}");
        assert!(analysis.success);
        let names = analysis.symbols.keys().map(String::as_str).collect::<Vec<_>>();
        assert_eq!(names, ["count", "todos"]);
    }

    #[test]
    fn duplicate_declaration_keeps_first() {
        let (analysis, reports) = analyze_source(
            "There is a number called x starting at 0.\n\
             There is text called x starting at \"a\".",
        );
        assert_eq!(errors(&reports), ["Variable 'x' is already declared"]);
        assert_eq!(reports[0].location.line, 2);
        assert_eq!(reports[0].also.len(), 1);
        assert_eq!(reports[0].also[0].message, Message::FirstDeclared);
        assert_eq!(reports[0].also[0].location.line, 1);
        assert_eq!(analysis.symbols["x"].var_type, StateType::Number);
        assert!(!analysis.success);
    }

    #[test]
    fn initializer_type_mismatch() {
        let (_, reports) = analyze_source(
            "There is a number called n starting at \"five\".\n\
             There is a list called l starting at 3.\n\
             There is a boolean called b starting at n.",
        );
        assert_eq!(
            errors(&reports),
            ["Type mismatch: cannot initialize 'number' with 'text'"]
        );
    }

    #[test]
    fn undefined_template_variable() {
        let (analysis, reports) = analyze_source("Show text saying \"{missingVar}\".");
        assert_eq!(errors(&reports), ["Undefined variable: 'missingVar'"]);
        assert!(!analysis.success);
    }

    #[test]
    fn action_operand_types() {
        let (_, reports) = analyze_source(
            "There is text called name starting at \"\".\n\
             There is a number called n starting at 0.\n\
             When I click the button \"Go\",\n\
             increase name by 1.\n\
             toggle n.\n\
             add \"x\" to n.\n\
             set nothing to 1.\n\
             decrease ghost by 2.\n\
             fetchThings nowhere.",
        );
        assert_eq!(
            errors(&reports),
            [
                "Type error: 'name' is 'text', expected 'number'",
                "Type error: 'n' is 'number', expected 'boolean'",
                "Type error: 'n' is 'number', expected 'list'",
                "Undefined variable: 'nothing'",
                "Undefined variable: 'ghost'",
            ]
        );
    }

    #[test]
    fn loop_variable_does_not_leak() {
        let (analysis, reports) = analyze_source(
            "There is a list called todos starting empty.\n\
             For each item in todos,\n\
             show text saying \"{item}\".\n\
             Show text saying \"{item}\".",
        );
        assert_eq!(errors(&reports), ["Undefined variable: 'item'"]);
        assert_eq!(reports[0].location.line, 4);
        assert!(!analysis.symbols.contains_key("item"));
    }

    #[test]
    fn loop_variable_shadowing_warns_and_restores() {
        let (analysis, reports) = analyze_source(
            "There is a number called item starting at 0.\n\
             There is a list called todos starting empty.\n\
             For each item in todos,\n\
             show text saying \"{item}\".",
        );
        assert!(errors(&reports).is_empty());
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, ReportKind::Warning);
        assert!(analysis.success);
        assert_eq!(analysis.symbols["item"].var_type, StateType::Number);
        let names = analysis.symbols.keys().map(String::as_str).collect::<Vec<_>>();
        assert_eq!(names, ["item", "todos"]);
    }

    #[test]
    fn for_each_requires_list() {
        let (_, reports) = analyze_source(
            "There is a number called n starting at 0.\n\
             For each x in n,\n\
             show text saying \"{x}\".\n\
             For each y in nope,\n\
             show text.",
        );
        assert_eq!(
            errors(&reports),
            [
                "Type error: 'n' is 'number', expected 'list'",
                "Undefined variable: 'nope'",
            ]
        );
    }

    #[test]
    fn if_condition_and_container_children() {
        let (_, reports) = analyze_source(
            "If score is greater than limit,\n\
             show text saying \"hi\".\n\
             Show a row containing,\n\
             show text saying \"{inner}\".",
        );
        assert_eq!(
            errors(&reports),
            [
                "Undefined variable: 'score'",
                "Undefined variable: 'limit'",
                "Undefined variable: 'inner'",
            ]
        );
    }

    #[test]
    fn reserved_names_are_rejected() {
        let (analysis, reports) = analyze_source(
            "There is text called with starting at \"\".\n\
             There is a number called document starting at 0.\n\
             There is a list called todos starting empty.\n\
             For each from in todos,\n\
             show text saying \"{from}\".",
        );
        assert_eq!(
            errors(&reports),
            [
                "'with' is reserved in the generated JavaScript and cannot be used as a name",
                "'document' is reserved in the generated JavaScript and cannot be used as a name",
            ]
        );
        assert!(!analysis.success);
        // still declared, so later references don't cascade
        assert!(analysis.symbols.contains_key("with"));
    }

    #[test]
    fn reserved_loop_variable() {
        let (_, reports) = analyze_source(
            "There is a list called todos starting empty.\n\
             For each this in todos,\n\
             show text.",
        );
        assert_eq!(
            errors(&reports),
            ["'this' is reserved in the generated JavaScript and cannot be used as a name"]
        );
    }

    #[test]
    fn names_used_by_generated_code_are_allowed() {
        let (analysis, reports) = analyze_source(
            "There is a list called items starting empty.\n\
             There is text called root starting at \"\".\n\
             There is text called e starting at \"\".\n\
             There is text called item starting at \"\".",
        );
        assert!(reports.is_empty(), "{reports:#?}");
        assert!(analysis.success);
    }

    #[test]
    fn custom_widget_styles_and_children_warn() {
        let (analysis, reports) = analyze_source(
            "Show a card with title \"Hi\" colored red containing,\n\
             show text saying \"{missing}\".\n\
             Show a badge with label \"x\".",
        );
        let warnings = reports
            .iter()
            .filter(|report| report.kind == ReportKind::Warning)
            .map(|report| report.message.to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            warnings,
            [
                "Custom widget 'card' ignores its styles",
                "Custom widget 'card' ignores its children",
            ]
        );
        assert_eq!(errors(&reports), ["Undefined variable: 'missing'"]);
        assert!(!analysis.success);
    }
}
