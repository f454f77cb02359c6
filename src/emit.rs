//! JavaScript generation. Statements are lowered into an [`Emitter`], a flat
//! list of indented [`Line`]s, which is only turned into text at the end.

use crate::syntax::*;
use crate::RUNTIME_PACKAGE;
use std::collections::HashMap;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Line {
    pub indent: usize,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct Emitter {
    lines: Vec<Line>,
    indent: usize,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl Into<String>) {
        self.lines.push(Line {
            indent: self.indent,
            text: text.into(),
        });
    }

    pub fn blank(&mut self) {
        self.lines.push(Line {
            indent: 0,
            text: String::new(),
        });
    }

    /// Emit a line that opens a block; following lines are indented.
    pub fn open(&mut self, text: impl Into<String>) {
        self.line(text);
        self.indent += 1;
    }

    pub fn close(&mut self, text: impl Into<String>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Two spaces per indent level, every line terminated by `\n`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            if !line.text.is_empty() {
                for _ in 0..line.indent {
                    out.push_str("  ");
                }
                out.push_str(&line.text);
            }
            out.push('\n');
        }
        out
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Generated {
    pub code: String,
    pub dependencies: Vec<String>,
}

/// Generate a module exporting `createApp()`. The program must already have
/// passed analysis.
pub fn generate(program: &Program, custom_functions_path: Option<&str>) -> Generated {
    let mut codegen = Codegen::default();
    codegen.program(program, custom_functions_path);
    let code = codegen.out.render();
    tracing::debug!(lines = codegen.out.lines().len(), "generated");
    Generated {
        code,
        dependencies: vec![RUNTIME_PACKAGE.to_string()],
    }
}

#[derive(Default)]
struct Codegen {
    out: Emitter,
    next_id: usize,
    /// Declared state, used for `empty` defaults and to decide what is a signal.
    types: HashMap<String, StateType>,
    /// Loop variables in scope. These are plain values, not signals.
    locals: Vec<String>,
}

impl Codegen {
    fn program(&mut self, program: &Program, custom_functions_path: Option<&str>) {
        self.out.line(format!(
            "import {{ createSignal, createEffect, renderApp }} from '{RUNTIME_PACKAGE}';"
        ));
        if let Some(path) = custom_functions_path {
            self.out.line(format!(
                "import * as customFunctions from {};",
                js_string(path, '\'')
            ));
        }
        self.out.blank();
        self.out.open("export function createApp() {");

        let mut any_state = false;
        for statement in &program.statements {
            if let Statement::State(decl) = statement {
                self.state_decl(decl);
                any_state = true;
            }
        }
        if any_state {
            self.out.blank();
        }

        self.out.open("return renderApp(($root) => {");
        for statement in &program.statements {
            match statement {
                Statement::Show(show) => self.show(show, "$root", true),
                Statement::If(block) => self.if_block(block),
                Statement::ForEach(block) => self.for_each(block),
                Statement::State(_) | Statement::Event(_) => {}
            }
        }
        for statement in &program.statements {
            if let Statement::Event(event) = statement {
                self.out.blank();
                self.event(event);
            }
        }
        self.out.close("});");
        self.out.close("}");
    }

    fn state_decl(&mut self, decl: &StateDecl) {
        self.types.insert(decl.identifier.clone(), decl.var_type);
        let initial = match &decl.initial_value {
            Value::Empty => empty_value(decl.var_type).to_string(),
            value => self.value(value),
        };
        self.out.line(format!(
            "const {} = createSignal({initial}, {});",
            decl.identifier,
            js_string(&decl.identifier, '\'')
        ));
    }

    /// `reactive` is false inside `If`/`For each` bodies, which are already
    /// re-rendered by their container's effect.
    fn show(&mut self, show: &ShowStmt, parent: &str, reactive: bool) {
        let id = self.next_id("widget");

        if let Widget::Custom(name) = &show.widget {
            let mut args = vec![parent.to_string()];
            if let ShowConfig::Custom { params } = &show.config {
                args.extend(params.values().map(|value| js_string(value, '"')));
            }
            self.out.line(format!(
                "const {id} = customFunctions.{name}({});",
                args.join(", ")
            ));
            return;
        }

        let name = show.widget.name();
        self.out
            .line(format!("const {id} = document.createElement('{}');", tag(name)));
        match name {
            "row" | "column" => self.out.line(format!("{id}.className = '{name}';")),
            "a" => self.out.line(format!("{id}.href = '#';")),
            _ => {}
        }

        match &show.config {
            ShowConfig::Saying { template } => {
                let property = match name {
                    "input" => "placeholder",
                    "image" => "alt",
                    _ => "textContent",
                };
                self.assign_template(&id, property, template, reactive);
            }
            ShowConfig::Called { identifier } => {
                self.out.line(format!(
                    "{id}.dataset.identifier = {};",
                    js_string(identifier, '\'')
                ));
                self.bind(&id, name, identifier, reactive);
            }
            ShowConfig::Image { source } => {
                self.out.line(format!("{id}.src = {};", js_string(source, '"')));
            }
            ShowConfig::Custom { .. } | ShowConfig::Empty => {}
        }

        if let Some(styles) = &show.styles {
            self.styles(&id, styles);
        }
        self.out.line(format!("{parent}.appendChild({id});"));

        for child in show.children.iter().flatten() {
            self.show(child, &id, reactive);
        }
    }

    /// Keep a `called` widget in sync with the state of the same name, if any.
    fn bind(&mut self, id: &str, widget: &str, identifier: &str, reactive: bool) {
        if widget == "button" {
            return;
        }
        let Some(read) = self.read(identifier) else {
            return;
        };
        let tracked = reactive && self.is_signal(identifier);
        if widget == "input" {
            self.track(tracked, format!("{id}.value = {read};"));
            if self.is_signal(identifier) {
                self.out.line(format!(
                    "{id}.addEventListener('input', ($e) => {{ {identifier}.set($e.target.value); }});"
                ));
            }
        } else {
            self.track(tracked, format!("{id}.textContent = {read};"));
        }
    }

    fn assign_template(&mut self, id: &str, property: &str, template: &str, reactive: bool) {
        let (code, reads_signals) = self.template(template);
        self.track(reactive && reads_signals, format!("{id}.{property} = {code};"));
    }

    fn track(&mut self, tracked: bool, statement: String) {
        if tracked {
            self.out
                .line(format!("createEffect(() => {{ {statement} }});"));
        } else {
            self.out.line(statement);
        }
    }

    fn styles(&mut self, id: &str, styles: &StyleProperties) {
        if let Some(color) = &styles.color {
            self.out
                .line(format!("{id}.style.color = {};", js_string(color, '"')));
        }
        if let Some(color) = &styles.background_color {
            self.out.line(format!(
                "{id}.style.backgroundColor = {};",
                js_string(color, '"')
            ));
        }
        if let Some(align) = styles.text_align {
            self.out
                .line(format!("{id}.style.textAlign = '{}';", align.as_str()));
        }
        if let Some(gap) = &styles.gap {
            let gap = if !gap.is_empty() && gap.chars().all(|c| c.is_ascii_digit()) {
                format!("{gap}px")
            } else {
                gap.clone()
            };
            self.out
                .line(format!("{id}.style.gap = {};", js_string(&gap, '"')));
        }
    }

    fn if_block(&mut self, block: &IfBlock) {
        let id = self.next_id("if_container");
        self.container(&id);
        self.out.open("createEffect(() => {");
        self.out.line(format!("{id}.innerHTML = '';"));
        let condition = &block.condition;
        self.out.open(format!(
            "if ({}.get() {} {}) {{",
            condition.identifier,
            operator(condition.comparator),
            self.value(&condition.value)
        ));
        for show in &block.body {
            self.show(show, &id, false);
        }
        self.out.close("}");
        self.out.close("});");
    }

    fn for_each(&mut self, block: &ForEachBlock) {
        let id = self.next_id("list_container");
        self.container(&id);
        self.out.open("createEffect(() => {");
        self.out
            .line(format!("const $items = {}.get();", block.list_name));
        self.out.line(format!("{id}.innerHTML = '';"));
        self.out
            .open(format!("$items.forEach(({}) => {{", block.item_name));
        self.locals.push(block.item_name.clone());
        for show in &block.body {
            self.show(show, &id, false);
        }
        self.locals.pop();
        self.out.close("});");
        self.out.close("});");
    }

    fn container(&mut self, id: &str) {
        self.out
            .line(format!("const {id} = document.createElement('div');"));
        self.out.line(format!("$root.appendChild({id});"));
    }

    fn event(&mut self, event: &EventBlock) {
        let widget_ref = match (&event.verb, &event.widget_ref) {
            // runs once, after the page is built
            (EventVerb::Load, _) | (_, None) => {
                for action in &event.actions {
                    self.action(action);
                }
                return;
            }
            (_, Some(widget_ref)) => widget_ref,
        };
        let dom_event = match event.verb {
            EventVerb::Type => "input",
            _ => "click",
        };
        let guard = match widget_ref {
            WidgetRef::Literal { widget, label } => format!(
                "$e.target.tagName === '{}' && $e.target.textContent === {}",
                tag(widget).to_ascii_uppercase(),
                js_string(label, '"')
            ),
            WidgetRef::Identifier { identifier, .. } => format!(
                "$e.target.dataset.identifier === {}",
                js_string(identifier, '"')
            ),
        };
        self.out
            .open(format!("$root.addEventListener('{dom_event}', ($e) => {{"));
        self.out.open(format!("if ({guard}) {{"));
        for action in &event.actions {
            self.action(action);
        }
        self.out.close("}");
        self.out.close("});");
    }

    fn action(&mut self, stmt: &ActionStmt) {
        let code = match &stmt.action {
            Action::Increase { identifier, amount } => {
                format!("{identifier}.set({identifier}.get() + {amount});")
            }
            Action::Decrease { identifier, amount } => {
                format!("{identifier}.set({identifier}.get() - {amount});")
            }
            Action::Set { identifier, value } => {
                let value = match (value, self.types.get(identifier)) {
                    (Value::Empty, Some(&var_type)) => empty_value(var_type).to_string(),
                    (value, _) => self.value(value),
                };
                format!("{identifier}.set({value});")
            }
            Action::Add { value, list } => {
                format!("{list}.set([...{list}.get(), {}]);", self.value(value))
            }
            Action::Remove { value, list } => format!(
                "{list}.set({list}.get().filter(($item) => $item !== {}));",
                self.value(value)
            ),
            Action::Toggle { identifier } => {
                format!("{identifier}.set(!{identifier}.get());")
            }
            Action::Custom {
                name,
                identifier,
                params,
            } => {
                let mut args = vec![identifier.clone()];
                for value in params.iter().flat_map(|params| params.values()) {
                    // `"{name}"` hands over the signal itself
                    args.push(match template_parts(value).as_slice() {
                        [TemplatePart::Placeholder(name)] => name.to_string(),
                        _ => js_string(value, '"'),
                    });
                }
                format!("customFunctions.{name}({});", args.join(", "))
            }
        };
        self.out.line(code);
    }

    fn value(&self, value: &Value) -> String {
        match value {
            Value::Number(value) => format!("{value}"),
            Value::Text(value) => js_string(value, '"'),
            Value::Boolean(value) => value.to_string(),
            Value::Empty => "\"\"".to_string(),
            Value::Identifier(name) if self.is_local(name) => name.clone(),
            Value::Identifier(name) => format!("{name}.get()"),
        }
    }

    /// A JS template literal, and whether it reads any signal.
    fn template(&self, template: &str) -> (String, bool) {
        let mut code = String::from("`");
        let mut reads_signals = false;
        for part in template_parts(template) {
            match part {
                TemplatePart::Text(text) => {
                    for c in text.chars() {
                        match c {
                            '\\' => code.push_str("\\\\"),
                            '`' => code.push_str("\\`"),
                            '$' => code.push_str("\\$"),
                            '\n' => code.push_str("\\n"),
                            '\r' => code.push_str("\\r"),
                            c => code.push(c),
                        }
                    }
                }
                TemplatePart::Placeholder(name) if self.is_local(name) => {
                    code.push_str(&format!("${{{name}}}"));
                }
                TemplatePart::Placeholder(name) => {
                    reads_signals = true;
                    code.push_str(&format!("${{{name}.get()}}"));
                }
            }
        }
        code.push('`');
        (code, reads_signals)
    }

    /// Expression reading a name, or `None` if it is neither state nor a loop variable.
    fn read(&self, name: &str) -> Option<String> {
        if self.is_local(name) {
            Some(name.to_string())
        } else if self.is_signal(name) {
            Some(format!("{name}.get()"))
        } else {
            None
        }
    }

    fn is_local(&self, name: &str) -> bool {
        self.locals.iter().any(|local| local == name)
    }

    fn is_signal(&self, name: &str) -> bool {
        !self.is_local(name) && self.types.contains_key(name)
    }

    /// Generated names start with `$`, which Lingo names cannot contain.
    fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("${prefix}_{}", self.next_id);
        self.next_id += 1;
        id
    }
}

/// Element tag for a widget name.
fn tag(widget: &str) -> &str {
    match widget {
        "heading" => "h1",
        "text" => "p",
        "image" => "img",
        "row" | "column" => "div",
        other => other,
    }
}

fn operator(comparator: Comparator) -> &'static str {
    match comparator {
        Comparator::Equal => "===",
        Comparator::NotEqual => "!==",
        Comparator::Greater => ">",
        Comparator::Less => "<",
        Comparator::GreaterOrEqual => ">=",
        Comparator::LessOrEqual => "<=",
    }
}

fn empty_value(var_type: StateType) -> &'static str {
    match var_type {
        StateType::Number => "0",
        StateType::Text => "\"\"",
        StateType::Boolean => "false",
        StateType::List => "[]",
    }
}

/// Quote a string as a JS literal.
fn js_string(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::tokenize;
    use crate::parse::parse;
    use crate::diag::Reporter;
    use crate::source::{Location, Source, SourceSpan};

    fn generate_source(text: &str) -> String {
        let source = Source::new("test.lingo", text);
        let mut reports = vec![];
        let mut reporter = Reporter::new(&mut reports);
        let tokens = tokenize(&source, &mut reporter);
        let program = parse(&tokens, &mut reporter);
        assert!(reports.is_empty(), "{reports:#?}");
        generate(&program, None).code
    }

    fn lower_action(codegen: &mut Codegen, action: Action) -> String {
        codegen.out = Emitter::new();
        codegen.action(&ActionStmt {
            action,
            location: Location::default(),
            span: SourceSpan::default(),
        });
        codegen.out.render()
    }

    #[test]
    fn emitter_indents_blocks() {
        let mut out = Emitter::new();
        out.open("a {");
        out.open("b {");
        out.line("c;");
        out.close("}");
        out.blank();
        out.close("}");
        assert_eq!(out.render(), "a {\n  b {\n    c;\n  }\n\n}\n");
        assert_eq!(
            out.lines()[2],
            Line {
                indent: 2,
                text: "c;".into()
            }
        );
    }

    #[test]
    fn counter_app() {
        let code = generate_source(
            "There is a number called count starting at 0.\n\
             \n\
             Show a heading saying \"Counter\".\n\
             Show text saying \"Count: {count}\".\n\
             Show a button saying \"Increment\".\n\
             \n\
             When I click the button \"Increment\",\n\
             increase count by 1.\n",
        );
        assert_eq!(
            code,
            "import { createSignal, createEffect, renderApp } from '@lingo-dsl/runtime';\n\
             \n\
             export function createApp() {\n\
             \x20 const count = createSignal(0, 'count');\n\
             \n\
             \x20 return renderApp(($root) => {\n\
             \x20   const $widget_0 = document.createElement('h1');\n\
             \x20   $widget_0.textContent = `Counter`;\n\
             \x20   $root.appendChild($widget_0);\n\
             \x20   const $widget_1 = document.createElement('p');\n\
             \x20   createEffect(() => { $widget_1.textContent = `Count: ${count.get()}`; });\n\
             \x20   $root.appendChild($widget_1);\n\
             \x20   const $widget_2 = document.createElement('button');\n\
             \x20   $widget_2.textContent = `Increment`;\n\
             \x20   $root.appendChild($widget_2);\n\
             \n\
             \x20   $root.addEventListener('click', ($e) => {\n\
             \x20     if ($e.target.tagName === 'BUTTON' && $e.target.textContent === \"Increment\") {\n\
             \x20       count.set(count.get() + 1);\n\
             \x20     }\n\
             \x20   });\n\
             \x20 });\n\
             }\n"
        );
    }

    #[test]
    fn state_defaults() {
        let code = generate_source(
            "There is a list called todos starting empty.\n\
             There is text called name starting at \"John\".\n\
             There is a boolean called open starting empty.\n\
             There is a number called n starting at -2.5.",
        );
        assert!(code.contains("const todos = createSignal([], 'todos');"));
        assert!(code.contains("const name = createSignal(\"John\", 'name');"));
        assert!(code.contains("const open = createSignal(false, 'open');"));
        assert!(code.contains("const n = createSignal(-2.5, 'n');"));
    }

    #[test]
    fn actions_lower_to_signal_updates() {
        let mut codegen = Codegen::default();
        codegen.types.insert("todos".into(), StateType::List);
        let cases = [
            (
                Action::Decrease {
                    identifier: "count".into(),
                    amount: 1.0,
                },
                "count.set(count.get() - 1);\n",
            ),
            (
                Action::Set {
                    identifier: "x".into(),
                    value: Value::Identifier("y".into()),
                },
                "x.set(y.get());\n",
            ),
            (
                Action::Set {
                    identifier: "todos".into(),
                    value: Value::Empty,
                },
                "todos.set([]);\n",
            ),
            (
                Action::Add {
                    value: Value::Text("item".into()),
                    list: "todos".into(),
                },
                "todos.set([...todos.get(), \"item\"]);\n",
            ),
            (
                Action::Remove {
                    value: Value::Text("item".into()),
                    list: "todos".into(),
                },
                "todos.set(todos.get().filter(($item) => $item !== \"item\"));\n",
            ),
            (
                Action::Toggle {
                    identifier: "isOpen".into(),
                },
                "isOpen.set(!isOpen.get());\n",
            ),
        ];
        for (action, expected) in cases {
            assert_eq!(lower_action(&mut codegen, action), expected);
        }
    }

    #[test]
    fn custom_action_forwards_signal_handles() {
        let mut params = Params::new();
        params.insert("target".into(), "{count}".into());
        params.insert("label".into(), "Say \"hi\"".into());
        let code = lower_action(
            &mut Codegen::default(),
            Action::Custom {
                name: "track".into(),
                identifier: "facts".into(),
                params: Some(params),
            },
        );
        assert_eq!(code, "customFunctions.track(facts, count, \"Say \\\"hi\\\"\");\n");
    }

    #[test]
    fn widgets() {
        let code = generate_source(
            "There is text called name starting at \"\".\n\
             Show an input called name.\n\
             Show an input called other.\n\
             Show an image with source \"logo.png\".\n\
             Show a link saying \"Home\".\n\
             Show a column colored red and gap \"12\".\n\
             Show a card with title \"Hi\" and size \"2\".",
        );
        assert!(code.contains("$widget_0.dataset.identifier = 'name';"));
        assert!(code.contains("createEffect(() => { $widget_0.value = name.get(); });"));
        assert!(code.contains(
            "$widget_0.addEventListener('input', ($e) => { name.set($e.target.value); });"
        ));
        assert!(code.contains("$widget_1.dataset.identifier = 'other';"));
        assert!(!code.contains("other.get()"));
        assert!(code.contains("$widget_2.src = \"logo.png\";"));
        assert!(code.contains("$widget_3.href = '#';"));
        assert!(code.contains("$widget_4.className = 'column';"));
        assert!(code.contains("$widget_4.style.color = \"red\";"));
        assert!(code.contains("$widget_4.style.gap = \"12px\";"));
        assert!(code.contains("const $widget_5 = customFunctions.card($root, \"Hi\", \"2\");"));
    }

    #[test]
    fn container_children_append_to_container() {
        let code = generate_source(
            "Show a row containing,\n\
             show a button saying \"A\".\n\
             show text saying \"B\".",
        );
        assert!(code.contains("$root.appendChild($widget_0);"));
        assert!(code.contains("$widget_0.appendChild($widget_1);"));
        assert!(code.contains("$widget_0.appendChild($widget_2);"));
    }

    #[test]
    fn events_by_identifier_and_type() {
        let code = generate_source(
            "When I click the button called submitBtn,\n\
             increase count by 1.\n\
             When I type the input called name,\n\
             set name to empty.\n\
             On page load,\n\
             loadData facts.",
        );
        assert!(code.contains("if ($e.target.dataset.identifier === \"submitBtn\") {"));
        assert!(code.contains("$root.addEventListener('input', ($e) => {"));
        assert!(code.contains("name.set(\"\");"));
        assert!(code.contains("\n    customFunctions.loadData(facts);\n"));
    }

    #[test]
    fn if_block_rerenders_container() {
        let code = generate_source(
            "There is a number called count starting at 0.\n\
             If count is greater than or equal to 5,\n\
             show text saying \"High: {count}\".",
        );
        assert!(code.contains(
            "    const $if_container_0 = document.createElement('div');\n\
             \x20   $root.appendChild($if_container_0);\n\
             \x20   createEffect(() => {\n\
             \x20     $if_container_0.innerHTML = '';\n\
             \x20     if (count.get() >= 5) {\n\
             \x20       const $widget_1 = document.createElement('p');\n\
             \x20       $widget_1.textContent = `High: ${count.get()}`;\n\
             \x20       $if_container_0.appendChild($widget_1);\n\
             \x20     }\n\
             \x20   });\n"
        ));
    }

    #[test]
    fn for_each_uses_loop_variable_directly() {
        let code = generate_source(
            "There is a list called todos starting empty.\n\
             For each item in todos,\n\
             show text saying \"• {item} `$`\".",
        );
        assert!(code.contains("const $items = todos.get();"));
        assert!(code.contains("$items.forEach((item) => {"));
        assert!(code.contains("$widget_1.textContent = `• ${item} \\`\\$\\``;"));
        assert!(code.contains("$list_container_0.appendChild($widget_1);"));
    }

    #[test]
    fn state_names_stay_apart_from_generated_names() {
        let code = generate_source(
            "There is a list called items starting empty.\n\
             There is text called root starting at \"\".\n\
             There is text called e starting at \"\".\n\
             There is text called item starting at \"x\".\n\
             For each entry in items,\n\
             show text saying \"{entry} {root}\".\n\
             Show an input called e.\n\
             When I click the button \"Drop\",\n\
             remove item from items.",
        );
        assert!(code.contains("const items = createSignal([], 'items');"));
        assert!(code.contains("const $items = items.get();"));
        assert!(code.contains("$items.forEach((entry) => {"));
        assert!(code.contains("const root = createSignal(\"\", 'root');"));
        assert!(code.contains("return renderApp(($root) => {"));
        assert!(code.contains("$widget_1.textContent = `${entry} ${root.get()}`;"));
        assert!(code.contains(
            "$widget_2.addEventListener('input', ($e) => { e.set($e.target.value); });"
        ));
        assert!(code.contains("items.set(items.get().filter(($item) => $item !== item.get()));"));
        assert!(!code.contains("(root)"));
        assert!(!code.contains("(e)"));
        assert!(!code.contains(" widget_"));
    }

    #[test]
    fn custom_functions_import() {
        let source = Source::new("test.lingo", "Show text.");
        let mut reports = vec![];
        let mut reporter = Reporter::new(&mut reports);
        let tokens = tokenize(&source, &mut reporter);
        let program = parse(&tokens, &mut reporter);
        let generated = generate(&program, Some("./functions.js"));
        assert!(generated
            .code
            .contains("import * as customFunctions from './functions.js';\n"));
        assert_eq!(generated.dependencies, [RUNTIME_PACKAGE]);
    }

    #[test]
    fn deterministic() {
        let text = "There is a number called a starting at 1.\nShow text saying \"{a}\".";
        assert_eq!(generate_source(text), generate_source(text));
    }
}
