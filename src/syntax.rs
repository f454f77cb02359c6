//! Abstract syntax tree produced by [`parse`](crate::parse::parse).
//!
//! The tree is plain owned data: [`ShowStmt::children`] is the only recursive
//! edge and the parser only ever appends to it.

use crate::source::{Location, SourceSpan};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub location: Location,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    State(StateDecl),
    Show(ShowStmt),
    Event(EventBlock),
    If(IfBlock),
    ForEach(ForEachBlock),
}

impl Statement {
    pub fn location(&self) -> &Location {
        match self {
            Self::State(stmt) => &stmt.location,
            Self::Show(stmt) => &stmt.location,
            Self::Event(stmt) => &stmt.location,
            Self::If(stmt) => &stmt.location,
            Self::ForEach(stmt) => &stmt.location,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateType {
    Number,
    Text,
    Boolean,
    List,
}

impl StateType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::List => "list",
        }
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Boolean(bool),
    Empty,
    Identifier(String),
}

impl Value {
    /// The state type a literal value initializes, `None` for `empty` and identifiers.
    pub fn literal_type(&self) -> Option<StateType> {
        match self {
            Self::Number(_) => Some(StateType::Number),
            Self::Text(_) => Some(StateType::Text),
            Self::Boolean(_) => Some(StateType::Boolean),
            Self::Empty | Self::Identifier(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value:?}"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Empty => write!(f, "empty"),
            Self::Identifier(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StateDecl {
    pub var_type: StateType,
    pub identifier: String,
    pub initial_value: Value,
    pub location: Location,
    pub span: SourceSpan,
}

/// A widget is either one of the built in keywords, already mapped to its
/// canonical name (`paragraph` is `p`, `heading` stays `heading`), or a bare
/// identifier resolved by the custom function registry at runtime.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Widget {
    Builtin(&'static str),
    Custom(String),
}

impl Widget {
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(name) => name,
            Self::Custom(name) => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(name) => write!(f, "{name}"),
            Self::Custom(name) => write!(f, "custom {name}"),
        }
    }
}

pub type Params = IndexMap<String, String>;

#[derive(Clone, Debug, PartialEq)]
pub enum ShowConfig {
    Saying { template: String },
    Called { identifier: String },
    Image { source: String },
    Custom { params: Params },
    Empty,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleProperties {
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub text_align: Option<TextAlign>,
    pub gap: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShowStmt {
    pub widget: Widget,
    pub config: ShowConfig,
    pub styles: Option<StyleProperties>,
    pub children: Option<Vec<ShowStmt>>,
    pub location: Location,
    pub span: SourceSpan,
}

impl ShowStmt {
    pub fn is_custom(&self) -> bool {
        self.widget.is_custom()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EventVerb {
    Click,
    Type,
    Load,
}

impl EventVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Type => "type",
            Self::Load => "load",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum WidgetRef {
    /// `the button "Add"`: matched by tag and text content.
    Literal { widget: &'static str, label: String },
    /// `the input called name`: matched by the `data-identifier` attribute.
    Identifier {
        widget: &'static str,
        identifier: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct EventBlock {
    pub verb: EventVerb,
    /// `None` for `On page load`.
    pub widget_ref: Option<WidgetRef>,
    pub actions: Vec<ActionStmt>,
    pub location: Location,
    pub span: SourceSpan,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActionStmt {
    pub action: Action,
    pub location: Location,
    pub span: SourceSpan,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Increase { identifier: String, amount: f64 },
    Decrease { identifier: String, amount: f64 },
    Set { identifier: String, value: Value },
    Add { value: Value, list: String },
    Remove { value: Value, list: String },
    Toggle { identifier: String },
    Custom {
        name: String,
        identifier: String,
        params: Option<Params>,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Comparator {
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub identifier: String,
    pub comparator: Comparator,
    pub value: Value,
    pub location: Location,
    pub span: SourceSpan,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfBlock {
    pub condition: Condition,
    pub body: Vec<ShowStmt>,
    pub location: Location,
    pub span: SourceSpan,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForEachBlock {
    pub item_name: String,
    pub list_name: String,
    pub body: Vec<ShowStmt>,
    pub location: Location,
    pub span: SourceSpan,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TemplatePart<'a> {
    Text(&'a str),
    /// `{name}`, where name is `[A-Za-z_][A-Za-z0-9_]*`
    Placeholder(&'a str),
}

/// Split a `saying` template into literal text and placeholders. Braces that
/// don't enclose a valid name stay literal text.
pub fn template_parts(template: &str) -> Vec<TemplatePart<'_>> {
    let mut parts = vec![];
    let mut text_start = 0;
    let mut search = 0;
    while let Some(offset) = template[search..].find('{') {
        let open = search + offset;
        let name_start = open + 1;
        let name_end = template[name_start..]
            .find(|c: char| c != '_' && !c.is_ascii_alphanumeric())
            .map_or(template.len(), |len| name_start + len);
        let name = &template[name_start..name_end];
        let valid = name.starts_with(|c: char| c == '_' || c.is_ascii_alphabetic())
            && template[name_end..].starts_with('}');
        if !valid {
            search = name_start;
            continue;
        }
        if text_start < open {
            parts.push(TemplatePart::Text(&template[text_start..open]));
        }
        parts.push(TemplatePart::Placeholder(name));
        text_start = name_end + 1;
        search = text_start;
    }
    if text_start < template.len() {
        parts.push(TemplatePart::Text(&template[text_start..]));
    }
    parts
}

/// Writes an indented dump of a [`Program`], used by `lingo tree` and the
/// baseline tests.
pub struct TreeWriter<'a> {
    program: &'a Program,
}

impl<'a> TreeWriter<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self { program }
    }
}

struct FmtData<'b, 'a> {
    f: &'b mut fmt::Formatter<'a>,
    indent: usize,
}

impl FmtData<'_, '_> {
    fn write_indent(&mut self) -> fmt::Result {
        for _ in 0..self.indent {
            fmt::Write::write_char(self.f, ' ')?
        }
        Ok(())
    }

    fn node(&mut self, kind: &str, location: &Location) -> fmt::Result {
        writeln!(self.f, "{kind} @ {}:{} {{", location.line, location.column)?;
        self.indent += 2;
        Ok(())
    }

    fn close(&mut self) -> fmt::Result {
        self.indent -= 2;
        self.write_indent()?;
        writeln!(self.f, "}}")
    }

    fn field(&mut self, name: &str, value: impl fmt::Display) -> fmt::Result {
        self.write_indent()?;
        writeln!(self.f, "{name}: {value}")
    }

    fn array_start(&mut self, name: &str) -> fmt::Result {
        self.write_indent()?;
        writeln!(self.f, "{name}: [")?;
        self.indent += 2;
        Ok(())
    }

    fn array_end(&mut self) -> fmt::Result {
        self.indent -= 2;
        self.write_indent()?;
        writeln!(self.f, "]")
    }

    fn statement(&mut self, statement: &Statement) -> fmt::Result {
        self.write_indent()?;
        match statement {
            Statement::State(data) => {
                self.node("StateDecl", &data.location)?;
                self.field("var_type", data.var_type)?;
                self.field("identifier", &data.identifier)?;
                self.field("initial_value", &data.initial_value)?;
                self.close()
            }
            Statement::Show(data) => self.show(data),
            Statement::Event(data) => {
                self.node("EventBlock", &data.location)?;
                self.field("verb", data.verb.as_str())?;
                match &data.widget_ref {
                    Some(WidgetRef::Literal { widget, label }) => {
                        self.field("widget_ref", format_args!("{widget} {label:?}"))?
                    }
                    Some(WidgetRef::Identifier { widget, identifier }) => {
                        self.field("widget_ref", format_args!("{widget} called {identifier}"))?
                    }
                    None => {}
                }
                self.array_start("actions")?;
                for action in &data.actions {
                    self.action(action)?;
                }
                self.array_end()?;
                self.close()
            }
            Statement::If(data) => {
                self.node("IfBlock", &data.location)?;
                let condition = &data.condition;
                self.field(
                    "condition",
                    format_args!(
                        "{} {:?} {}",
                        condition.identifier, condition.comparator, condition.value
                    ),
                )?;
                self.body(&data.body)?;
                self.close()
            }
            Statement::ForEach(data) => {
                self.node("ForEachBlock", &data.location)?;
                self.field("item_name", &data.item_name)?;
                self.field("list_name", &data.list_name)?;
                self.body(&data.body)?;
                self.close()
            }
        }
    }

    fn body(&mut self, body: &[ShowStmt]) -> fmt::Result {
        self.array_start("body")?;
        for show in body {
            self.write_indent()?;
            self.show(show)?;
        }
        self.array_end()
    }

    fn show(&mut self, data: &ShowStmt) -> fmt::Result {
        self.node("ShowStmt", &data.location)?;
        self.field("widget", &data.widget)?;
        match &data.config {
            ShowConfig::Saying { template } => self.field("saying", format_args!("{template:?}"))?,
            ShowConfig::Called { identifier } => self.field("called", identifier)?,
            ShowConfig::Image { source } => self.field("source", format_args!("{source:?}"))?,
            ShowConfig::Custom { params } => self.params(params)?,
            ShowConfig::Empty => {}
        }
        if let Some(styles) = &data.styles {
            if let Some(color) = &styles.color {
                self.field("color", color)?;
            }
            if let Some(color) = &styles.background_color {
                self.field("background", color)?;
            }
            if let Some(align) = styles.text_align {
                self.field("align", align.as_str())?;
            }
            if let Some(gap) = &styles.gap {
                self.field("gap", gap)?;
            }
        }
        if let Some(children) = &data.children {
            self.array_start("children")?;
            for child in children {
                self.write_indent()?;
                self.show(child)?;
            }
            self.array_end()?;
        }
        self.close()
    }

    fn params(&mut self, params: &Params) -> fmt::Result {
        for (key, value) in params {
            self.field(&format!("param {key}"), format_args!("{value:?}"))?;
        }
        Ok(())
    }

    fn action(&mut self, data: &ActionStmt) -> fmt::Result {
        self.write_indent()?;
        match &data.action {
            Action::Increase { identifier, amount } => {
                self.node("Increase", &data.location)?;
                self.field("identifier", identifier)?;
                self.field("amount", amount)?;
            }
            Action::Decrease { identifier, amount } => {
                self.node("Decrease", &data.location)?;
                self.field("identifier", identifier)?;
                self.field("amount", amount)?;
            }
            Action::Set { identifier, value } => {
                self.node("Set", &data.location)?;
                self.field("identifier", identifier)?;
                self.field("value", value)?;
            }
            Action::Add { value, list } => {
                self.node("Add", &data.location)?;
                self.field("value", value)?;
                self.field("list", list)?;
            }
            Action::Remove { value, list } => {
                self.node("Remove", &data.location)?;
                self.field("value", value)?;
                self.field("list", list)?;
            }
            Action::Toggle { identifier } => {
                self.node("Toggle", &data.location)?;
                self.field("identifier", identifier)?;
            }
            Action::Custom {
                name,
                identifier,
                params,
            } => {
                self.node("Custom", &data.location)?;
                self.field("name", name)?;
                self.field("identifier", identifier)?;
                if let Some(params) = params {
                    self.params(params)?;
                }
            }
        }
        self.close()
    }
}

impl fmt::Display for TreeWriter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fmt = FmtData { f, indent: 0 };
        fmt.array_start("statements")?;
        for statement in &self.program.statements {
            fmt.statement(statement)?;
        }
        fmt.array_end()
    }
}
