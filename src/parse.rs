use crate::diag::{Message, Reporter};
use crate::lex::{Token, TokenKind};
use crate::source::{Location, SourcePos, SourceSpan};
use crate::syntax::*;

/// A production failed. The problem has already been reported; the caller
/// should resynchronize.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ParseError;

type ParseResult<T> = Result<T, ParseError>;

/// Parse tokens produced by [`tokenize`](crate::lex::tokenize), which must end
/// with [`TokenKind::Eof`]. Every statement that fails to parse is reported and
/// skipped, so one call can surface several syntax errors.
pub fn parse(tokens: &[Token], reporter: &mut Reporter<'_>) -> Program {
    let Some(first) = tokens.first() else {
        return Program {
            statements: vec![],
            location: Location::default(),
        };
    };
    let mut parser = Parser {
        tokens,
        current: 0,
        reporter,
    };
    let mut statements = vec![];
    while !parser.at_end() {
        if parser.try_kind(TokenKind::Newline) {
            continue;
        }
        let start = parser.current;
        match parser.statement() {
            Ok(statement) => statements.push(statement),
            Err(ParseError) => parser.synchronize(start),
        }
    }
    tracing::debug!(statements = statements.len(), "parsed");
    Program {
        statements,
        location: first.location.clone(),
    }
}

/// Maps a widget keyword to its canonical name. The core widgets keep
/// their keyword, everything else becomes the HTML tag.
fn widget_name(kind: TokenKind) -> Option<&'static str> {
    use TokenKind::*;
    Some(match kind {
        Heading => "heading",
        Text => "text",
        Button => "button",
        Input => "input",
        Image => "image",
        Row => "row",
        Column => "column",
        Paragraph => "p",
        Textarea => "textarea",
        Container | Division => "div",
        Italic => "i",
        Bold => "b",
        Strong => "strong",
        Emphasis => "em",
        Underline => "u",
        Small => "small",
        Mark => "mark",
        Deleted => "del",
        Inserted => "ins",
        Subscript => "sub",
        Superscript => "sup",
        Code => "code",
        Preformatted => "pre",
        Quote => "blockquote",
        Link => "a",
        UnorderedList => "ul",
        OrderedList => "ol",
        ListItem => "li",
        Section => "section",
        Article => "article",
        Aside => "aside",
        Header => "header",
        Footer => "footer",
        Nav => "nav",
        Main => "main",
        Span => "span",
        LineBreak => "br",
        Rule => "hr",
        Table => "table",
        TableRow => "tr",
        TableData => "td",
        TableHeader => "th",
        _ => return None,
    })
}

struct Parser<'tokens, 'reporter, 'reports> {
    tokens: &'tokens [Token],
    current: usize,
    reporter: &'reporter mut Reporter<'reports>,
}

impl<'tokens> Parser<'tokens, '_, '_> {
    fn statement(&mut self) -> ParseResult<Statement> {
        match self.peek().kind {
            TokenKind::There => self.state_decl().map(Statement::State),
            TokenKind::Show => self.show(false).map(Statement::Show),
            TokenKind::When | TokenKind::On => self.event_block().map(Statement::Event),
            TokenKind::If => self.if_block().map(Statement::If),
            TokenKind::For => self.for_each_block().map(Statement::ForEach),
            _ => {
                let found = self.peek().describe().to_string();
                self.error_here(Message::UnexpectedToken { found });
                Err(ParseError)
            }
        }
    }

    fn state_decl(&mut self) -> ParseResult<StateDecl> {
        let first = self.peek();
        self.consume(TokenKind::There, "'There'")?;
        self.consume(TokenKind::Is, "'is'")?;
        self.article();
        let var_type = self.state_type();
        self.consume(TokenKind::Called, "'called'")?;
        let identifier = self.identifier()?;
        self.consume(TokenKind::Starting, "'starting'")?;
        self.try_kind(TokenKind::At);
        let initial_value = self.value();
        self.consume(TokenKind::Period, "'.'")?;
        let span = self.span_from(first.span.start);
        self.skip_newlines();
        Ok(StateDecl {
            var_type,
            identifier,
            initial_value,
            location: first.location.clone(),
            span,
        })
    }

    fn state_type(&mut self) -> StateType {
        let token = self.advance();
        match token.kind {
            TokenKind::NumberType => StateType::Number,
            TokenKind::BooleanType => StateType::Boolean,
            TokenKind::ListType => StateType::List,
            // `text` is both a type and a widget, other widgets mean text too
            TokenKind::Text
            | TokenKind::Input
            | TokenKind::Button
            | TokenKind::Heading
            | TokenKind::Image
            | TokenKind::Row
            | TokenKind::Column => StateType::Text,
            _ => {
                let found = token.describe().to_string();
                self.error_at(token, Message::ExpectedType { found });
                StateType::Number
            }
        }
    }

    fn value(&mut self) -> Value {
        let token = self.advance();
        match token.kind {
            TokenKind::Number => Value::Number(number(token)),
            TokenKind::String => Value::Text(token.text.clone()),
            TokenKind::True => Value::Boolean(true),
            TokenKind::False => Value::Boolean(false),
            TokenKind::Empty => Value::Empty,
            TokenKind::Identifier
            | TokenKind::Input
            | TokenKind::Button
            | TokenKind::Text
            | TokenKind::Heading
            | TokenKind::Image
            | TokenKind::Row
            | TokenKind::Column => Value::Identifier(token.text.clone()),
            _ => {
                let found = token.describe().to_string();
                self.error_at(token, Message::ExpectedValue { found });
                Value::Empty
            }
        }
    }

    /// `Show`/`show`, then a widget with its config, styles and children.
    fn show(&mut self, lowercase: bool) -> ParseResult<ShowStmt> {
        let first = self.peek();
        let expected = if lowercase { "'show'" } else { "'Show'" };
        self.consume(TokenKind::Show, expected)?;
        self.article();

        let (widget, config) = if self.check(TokenKind::Identifier) {
            let name = self.advance().text.clone();
            let params = self.params()?;
            (Widget::Custom(name), ShowConfig::Custom { params })
        } else {
            let widget = Widget::Builtin(self.widget());
            (widget, self.show_config()?)
        };
        let styles = self.styles();

        // containers end at the first line that isn't a child, not at a period
        let children = if self.check(TokenKind::Containing) {
            Some(self.children()?)
        } else {
            self.consume(TokenKind::Period, "'.'")?;
            None
        };
        let span = self.span_from(first.span.start);
        self.skip_newlines();

        Ok(ShowStmt {
            widget,
            config,
            styles,
            children,
            location: first.location.clone(),
            span,
        })
    }

    fn widget(&mut self) -> &'static str {
        let token = self.advance();
        match widget_name(token.kind) {
            Some(name) => name,
            None => {
                let found = token.describe().to_string();
                self.error_at(token, Message::ExpectedWidget { found });
                "text"
            }
        }
    }

    fn show_config(&mut self) -> ParseResult<ShowConfig> {
        if self.try_kind(TokenKind::Saying) {
            let template = self.consume(TokenKind::String, "string after 'saying'")?;
            return Ok(ShowConfig::Saying {
                template: template.text.clone(),
            });
        }
        if self.try_kind(TokenKind::Called) {
            let identifier = self.identifier()?;
            return Ok(ShowConfig::Called { identifier });
        }
        if self.try_kind(TokenKind::With) {
            self.consume(TokenKind::Source, "'source' after 'with'")?;
            let source = self.consume(TokenKind::String, "string after 'source'")?;
            return Ok(ShowConfig::Image {
                source: source.text.clone(),
            });
        }
        Ok(ShowConfig::Empty)
    }

    /// `with key "value" and key2 "value2" ...`, or nothing.
    fn params(&mut self) -> ParseResult<Params> {
        let mut params = Params::new();
        if self.try_kind(TokenKind::With) {
            loop {
                let key = self.identifier()?;
                let value = self.consume(TokenKind::String, "string value for parameter")?;
                params.insert(key, value.text.clone());
                if !self.try_kind(TokenKind::And) {
                    break;
                }
            }
        }
        Ok(params)
    }

    fn styles(&mut self) -> Option<StyleProperties> {
        let mut styles = StyleProperties::default();
        let mut any = false;
        loop {
            match self.peek().kind {
                TokenKind::And => {}
                TokenKind::Colored => {
                    self.advance();
                    if let Some(color) = self.style_word(&[TokenKind::Identifier, TokenKind::String]) {
                        styles.color = Some(color);
                        any = true;
                    }
                    continue;
                }
                TokenKind::Background => {
                    self.advance();
                    if let Some(color) = self.style_word(&[TokenKind::Identifier, TokenKind::String]) {
                        styles.background_color = Some(color);
                        any = true;
                    }
                    continue;
                }
                TokenKind::Gap => {
                    self.advance();
                    let kinds = [TokenKind::String, TokenKind::Number, TokenKind::Identifier];
                    if let Some(gap) = self.style_word(&kinds) {
                        styles.gap = Some(gap);
                        any = true;
                    }
                    continue;
                }
                TokenKind::Centered => {
                    styles.text_align = Some(TextAlign::Center);
                    any = true;
                }
                TokenKind::Aligned => {
                    self.advance();
                    let align = match self.peek().kind {
                        TokenKind::Left => TextAlign::Left,
                        TokenKind::Right => TextAlign::Right,
                        TokenKind::Center => TextAlign::Center,
                        _ => continue,
                    };
                    styles.text_align = Some(align);
                    any = true;
                }
                _ => break,
            }
            self.advance();
        }
        any.then_some(styles)
    }

    fn style_word(&mut self, kinds: &[TokenKind]) -> Option<String> {
        if kinds.contains(&self.peek().kind) {
            Some(self.advance().text.clone())
        } else {
            None
        }
    }

    fn children(&mut self) -> ParseResult<Vec<ShowStmt>> {
        self.consume(TokenKind::Containing, "'containing'")?;
        self.consume(TokenKind::Comma, "','")?;
        self.skip_newlines();
        let mut children = vec![];
        while !self.at_end() && !self.is_statement_start() {
            if self.try_kind(TokenKind::Newline) {
                continue;
            }
            if !self.check(TokenKind::Show) {
                break;
            }
            children.push(self.show(true)?);
        }
        Ok(children)
    }

    fn event_block(&mut self) -> ParseResult<EventBlock> {
        let first = self.peek();
        let (verb, widget_ref) = if self.try_kind(TokenKind::On) {
            self.consume(TokenKind::Page, "'page'")?;
            self.consume(TokenKind::Load, "'load'")?;
            (EventVerb::Load, None)
        } else {
            self.consume(TokenKind::When, "'When'")?;
            self.consume(TokenKind::I, "'I'")?;
            let verb = self.verb();
            self.consume(TokenKind::The, "'the'")?;
            (verb, Some(self.widget_ref()?))
        };
        self.consume(TokenKind::Comma, "','")?;
        let header = self.span_from(first.span.start);
        self.skip_newlines();

        let mut actions = vec![];
        while !self.at_end() && !self.is_statement_start() {
            if self.try_kind(TokenKind::Newline) {
                continue;
            }
            match self.action_stmt() {
                Ok(action) => actions.push(action),
                Err(ParseError) => self.skip_line(),
            }
        }
        let end = actions.last().map_or(header.end, |action| action.span.end);

        Ok(EventBlock {
            verb,
            widget_ref,
            actions,
            location: first.location.clone(),
            span: SourceSpan::new(header.start, end),
        })
    }

    fn verb(&mut self) -> EventVerb {
        let token = self.advance();
        match token.kind {
            TokenKind::Click => EventVerb::Click,
            TokenKind::Type => EventVerb::Type,
            _ => {
                let found = token.describe().to_string();
                self.error_at(token, Message::ExpectedVerb { found });
                EventVerb::Click
            }
        }
    }

    fn widget_ref(&mut self) -> ParseResult<WidgetRef> {
        let widget = self.widget();
        if self.check(TokenKind::String) {
            let label = self.advance().text.clone();
            return Ok(WidgetRef::Literal { widget, label });
        }
        if self.try_kind(TokenKind::Called) {
            let identifier = self.consume(TokenKind::Identifier, "identifier")?;
            return Ok(WidgetRef::Identifier {
                widget,
                identifier: identifier.text.clone(),
            });
        }
        self.error_here(Message::ExpectedWidgetRef);
        Ok(WidgetRef::Literal {
            widget,
            label: String::new(),
        })
    }

    fn action_stmt(&mut self) -> ParseResult<ActionStmt> {
        let first = self.peek();
        let action = self.action()?;
        self.consume(TokenKind::Period, "'.' after action")?;
        let span = self.span_from(first.span.start);
        self.skip_newlines();
        Ok(ActionStmt {
            action,
            location: first.location.clone(),
            span,
        })
    }

    fn action(&mut self) -> ParseResult<Action> {
        let token = self.peek();
        Ok(match token.kind {
            TokenKind::Increase | TokenKind::Decrease => {
                self.advance();
                let identifier = self.identifier()?;
                self.consume(TokenKind::By, "'by'")?;
                let amount = number(self.consume(TokenKind::Number, "number")?);
                if token.kind == TokenKind::Increase {
                    Action::Increase { identifier, amount }
                } else {
                    Action::Decrease { identifier, amount }
                }
            }
            TokenKind::Set => {
                self.advance();
                let identifier = self.identifier()?;
                self.consume(TokenKind::To, "'to'")?;
                let value = self.value();
                Action::Set { identifier, value }
            }
            TokenKind::Add => {
                self.advance();
                let value = self.value();
                self.consume(TokenKind::To, "'to'")?;
                let list = self.identifier()?;
                Action::Add { value, list }
            }
            TokenKind::Remove => {
                self.advance();
                let value = self.value();
                self.consume(TokenKind::From, "'from'")?;
                let list = self.identifier()?;
                Action::Remove { value, list }
            }
            TokenKind::Toggle => {
                self.advance();
                let identifier = self.identifier()?;
                Action::Toggle { identifier }
            }
            TokenKind::Identifier => {
                let name = self.advance().text.clone();
                let identifier = self.identifier()?;
                let params = self.params()?;
                Action::Custom {
                    name,
                    identifier,
                    params: (!params.is_empty()).then_some(params),
                }
            }
            _ => {
                let found = token.describe().to_string();
                self.error_here(Message::ExpectedAction { found });
                return Err(ParseError);
            }
        })
    }

    fn if_block(&mut self) -> ParseResult<IfBlock> {
        let first = self.peek();
        self.consume(TokenKind::If, "'If'")?;
        let condition = self.condition()?;
        self.consume(TokenKind::Comma, "','")?;
        let body = self.body()?;
        Ok(IfBlock {
            condition,
            span: self.block_span(first, &body),
            body,
            location: first.location.clone(),
        })
    }

    fn condition(&mut self) -> ParseResult<Condition> {
        let first = self.peek();
        let identifier = self.identifier()?;
        self.consume(TokenKind::Is, "'is'")?;
        let comparator = self.comparator()?;
        let value = self.value();
        Ok(Condition {
            identifier,
            comparator,
            value,
            location: first.location.clone(),
            span: self.span_from(first.span.start),
        })
    }

    fn comparator(&mut self) -> ParseResult<Comparator> {
        let comparator = match self.peek().kind {
            TokenKind::Not => {
                self.advance();
                self.consume(TokenKind::Equal, "'equal'")?;
                Comparator::NotEqual
            }
            TokenKind::Equal => {
                self.advance();
                Comparator::Equal
            }
            TokenKind::Greater | TokenKind::Less => {
                let greater = self.advance().kind == TokenKind::Greater;
                self.consume(TokenKind::Than, "'than'")?;
                if !self.try_kind(TokenKind::Or) {
                    return Ok(if greater {
                        Comparator::Greater
                    } else {
                        Comparator::Less
                    });
                }
                self.consume(TokenKind::Equal, "'equal'")?;
                if greater {
                    Comparator::GreaterOrEqual
                } else {
                    Comparator::LessOrEqual
                }
            }
            _ => {
                self.error_here(Message::ExpectedComparator);
                return Ok(Comparator::Equal);
            }
        };
        self.consume(TokenKind::To, "'to'")?;
        Ok(comparator)
    }

    fn for_each_block(&mut self) -> ParseResult<ForEachBlock> {
        let first = self.peek();
        self.consume(TokenKind::For, "'For'")?;
        self.consume(TokenKind::Each, "'each'")?;
        let item_name = self.identifier()?;
        self.consume(TokenKind::In, "'in'")?;
        let list_name = self.identifier()?;
        self.consume(TokenKind::Comma, "','")?;
        let body = self.body()?;
        Ok(ForEachBlock {
            item_name,
            list_name,
            span: self.block_span(first, &body),
            body,
            location: first.location.clone(),
        })
    }

    /// Lowercase `show` statements until the next top level statement.
    fn body(&mut self) -> ParseResult<Vec<ShowStmt>> {
        self.skip_newlines();
        let mut body = vec![];
        while !self.at_end() && !self.is_statement_start() {
            if self.try_kind(TokenKind::Newline) {
                continue;
            }
            body.push(self.show(true)?);
        }
        Ok(body)
    }

    fn block_span(&self, first: &Token, body: &[ShowStmt]) -> SourceSpan {
        match body.last() {
            Some(last) => SourceSpan::new(first.span.start, last.span.end),
            None => self.span_from(first.span.start),
        }
    }

    /// Variable names may also be spelled like a handful of keywords.
    fn identifier(&mut self) -> ParseResult<String> {
        use TokenKind::*;
        match self.peek().kind {
            Identifier | Input | Button | Text | Heading | Image | Row | Column | NumberType
            | BooleanType | ListType | Type | Source | By | To | From | With | At => {
                Ok(self.advance().text.clone())
            }
            _ => {
                self.expected_here("identifier");
                Err(ParseError)
            }
        }
    }

    fn article(&mut self) {
        if self.check(TokenKind::A) || self.check(TokenKind::An) {
            self.advance();
        }
    }

    fn is_statement_start(&self) -> bool {
        let token = self.peek();
        match token.kind {
            TokenKind::There | TokenKind::When | TokenKind::On | TokenKind::If | TokenKind::For => {
                true
            }
            TokenKind::Show => token.text == "Show",
            _ => false,
        }
    }

    /// Discard tokens until a top level statement starts a new line. A
    /// statement that failed without consuming anything gives up its first
    /// token so the caller always makes progress.
    fn synchronize(&mut self, start: usize) {
        if self.current == start {
            self.advance();
        }
        while !self.at_end() {
            let line_start = self
                .previous()
                .map_or(true, |token| token.kind == TokenKind::Newline);
            if line_start && self.is_statement_start() {
                return;
            }
            self.advance();
        }
    }

    fn skip_line(&mut self) {
        while !self.at_end() && !self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    fn skip_newlines(&mut self) {
        while self.try_kind(TokenKind::Newline) {}
    }

    fn span_from(&self, start: SourcePos) -> SourceSpan {
        let end = self.previous().map_or(start, |token| token.span.end);
        SourceSpan::new(start, end)
    }

    fn consume(&mut self, kind: TokenKind, expected: &'static str) -> ParseResult<&'tokens Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            self.expected_here(expected);
            Err(ParseError)
        }
    }

    fn expected_here(&mut self, expected: &'static str) {
        self.error_here(Message::Expected { expected })
    }

    fn error_here(&mut self, message: Message) {
        self.error_at(self.peek(), message)
    }

    fn error_at(&mut self, token: &Token, message: Message) {
        self.reporter.error(&token.location, token.span, message);
    }

    fn try_kind(&mut self, kind: TokenKind) -> bool {
        let ok = self.check(kind);
        if ok {
            self.advance();
        }
        ok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    fn peek(&self) -> &'tokens Token {
        let tokens: &'tokens [Token] = self.tokens;
        &tokens[self.current.min(tokens.len() - 1)]
    }

    fn previous(&self) -> Option<&'tokens Token> {
        let tokens: &'tokens [Token] = self.tokens;
        self.current.checked_sub(1).map(|index| &tokens[index])
    }

    /// Consume the current token. Never moves past the end of input.
    fn advance(&mut self) -> &'tokens Token {
        let token = self.peek();
        if !self.at_end() {
            self.current += 1;
        }
        token
    }
}

fn number(token: &Token) -> f64 {
    token.text.parse().expect("invalid Number token")
}
