//! Classify contiguous spans of source text into tokens to simplify parsing.

use crate::diag::{Message, Reporter};
use crate::source::{Location, Source, SourcePos, SourceSpan};

/// Kind of the token matched by the [`Lexer`]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TokenKind {
    // Statement keywords
    /// `"There"`
    There,
    /// `"is"`
    Is,
    /// `"a"`
    A,
    /// `"an"`
    An,
    /// `"called"`
    Called,
    /// `"starting"`
    Starting,
    /// `"at"`
    At,
    /// `"Show"` or `"show"`, see [`Token::text`] for which
    Show,
    /// `"saying"`
    Saying,
    /// `"When"`
    When,
    /// `"On"`
    On,
    /// `"page"`
    Page,
    /// `"load"`
    Load,
    /// `"I"`
    I,
    /// `"click"`
    Click,
    /// `"type"`
    Type,
    /// `"the"`
    The,
    /// `"If"`
    If,
    /// `"For"`
    For,
    /// `"each"`
    Each,
    /// `"in"`
    In,

    // Actions
    /// `"increase"`
    Increase,
    /// `"decrease"`
    Decrease,
    /// `"set"`
    Set,
    /// `"to"`
    To,
    /// `"add"`
    Add,
    /// `"remove"`
    Remove,
    /// `"from"`
    From,
    /// `"toggle"`
    Toggle,
    /// `"with"`
    With,
    /// `"source"`
    Source,
    /// `"by"`
    By,
    /// `"and"`
    And,

    // Comparators
    /// `"greater"`
    Greater,
    /// `"less"`
    Less,
    /// `"than"`
    Than,
    /// `"or"`
    Or,
    /// `"equal"`
    Equal,
    /// `"not"`
    Not,

    // Styling
    /// `"colored"`
    Colored,
    /// `"centered"`
    Centered,
    /// `"aligned"`
    Aligned,
    /// `"containing"`
    Containing,
    /// `"left"`
    Left,
    /// `"right"`
    Right,
    /// `"center"`
    Center,
    /// `"background"`
    Background,
    /// `"gap"`
    Gap,

    // Types. `text` is always lexed as the [`TokenKind::Text`] widget.
    /// `"number"`
    NumberType,
    /// `"boolean"`
    BooleanType,
    /// `"list"`
    ListType,

    // Widgets
    /// `"heading"`
    Heading,
    /// `"text"`, as a widget or as a state type
    Text,
    /// `"paragraph"`
    Paragraph,
    /// `"button"`
    Button,
    /// `"input"`
    Input,
    /// `"textarea"`
    Textarea,
    /// `"image"`
    Image,
    /// `"row"`
    Row,
    /// `"column"`
    Column,
    /// `"container"`
    Container,
    /// `"division"`
    Division,
    /// `"italic"`
    Italic,
    /// `"bold"`
    Bold,
    /// `"strong"`
    Strong,
    /// `"emphasis"`
    Emphasis,
    /// `"underline"`
    Underline,
    /// `"small"`
    Small,
    /// `"mark"` or `"highlight"`
    Mark,
    /// `"deleted"` or `"strikethrough"`
    Deleted,
    /// `"inserted"`
    Inserted,
    /// `"subscript"`
    Subscript,
    /// `"superscript"`
    Superscript,
    /// `"code"`
    Code,
    /// `"preformatted"`
    Preformatted,
    /// `"quote"` or `"blockquote"`
    Quote,
    /// `"link"`
    Link,
    /// `"unorderedlist"`
    UnorderedList,
    /// `"orderedlist"` or `"numberedlist"`
    OrderedList,
    /// `"listitem"`
    ListItem,
    /// `"section"`
    Section,
    /// `"article"`
    Article,
    /// `"aside"`
    Aside,
    /// `"header"`
    Header,
    /// `"footer"`
    Footer,
    /// `"nav"` or `"navigation"`
    Nav,
    /// `"main"`
    Main,
    /// `"span"`
    Span,
    /// `"linebreak"` or `"break"`
    LineBreak,
    /// `"rule"` or `"line"`
    Rule,
    /// `"table"`
    Table,
    /// `"tablerow"`
    TableRow,
    /// `"tabledata"`
    TableData,
    /// `"tableheader"`
    TableHeader,

    // Literals
    /// `[_A-Za-z][_0-9A-Za-z]*` not in the keyword table
    Identifier,
    /// `'-'? [0-9]+ ('.' [0-9]+)?`
    Number,
    /// `'"' ([^"\\] | '\\' .)* '"'`, [`Token::text`] holds the unescaped value
    String,
    /// `"true"`
    True,
    /// `"false"`
    False,
    /// `"empty"`
    Empty,

    /// `'.'`
    Period,
    /// `','`
    Comma,
    /// `'\n'`, statements and clauses end at line breaks
    Newline,
    /// Lexer has reached the end of input
    Eof,
}

fn keyword(text: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match text {
        "There" => There,
        "is" => Is,
        "a" => A,
        "an" => An,
        "called" => Called,
        "starting" => Starting,
        "at" => At,
        "Show" | "show" => Show,
        "saying" => Saying,
        "When" => When,
        "On" => On,
        "page" => Page,
        "load" => Load,
        "I" => I,
        "click" => Click,
        "type" => Type,
        "the" => The,
        "If" => If,
        "For" => For,
        "each" => Each,
        "in" => In,
        "increase" => Increase,
        "decrease" => Decrease,
        "set" => Set,
        "to" => To,
        "add" => Add,
        "remove" => Remove,
        "from" => From,
        "toggle" => Toggle,
        "with" => With,
        "source" => Source,
        "by" => By,
        "and" => And,
        "greater" => Greater,
        "less" => Less,
        "than" => Than,
        "or" => Or,
        "equal" => Equal,
        "not" => Not,
        "colored" => Colored,
        "centered" => Centered,
        "aligned" => Aligned,
        "containing" => Containing,
        "left" => Left,
        "right" => Right,
        "center" => Center,
        "background" => Background,
        "gap" => Gap,
        "number" => NumberType,
        "boolean" => BooleanType,
        "list" => ListType,
        "heading" => Heading,
        "text" => Text,
        "paragraph" => Paragraph,
        "button" => Button,
        "input" => Input,
        "textarea" => Textarea,
        "image" => Image,
        "row" => Row,
        "column" => Column,
        "container" => Container,
        "division" => Division,
        "italic" => Italic,
        "bold" => Bold,
        "strong" => Strong,
        "emphasis" => Emphasis,
        "underline" => Underline,
        "small" => Small,
        "mark" | "highlight" => Mark,
        "deleted" | "strikethrough" => Deleted,
        "inserted" => Inserted,
        "subscript" => Subscript,
        "superscript" => Superscript,
        "code" => Code,
        "preformatted" => Preformatted,
        "quote" | "blockquote" => Quote,
        "link" => Link,
        "unorderedlist" => UnorderedList,
        "orderedlist" | "numberedlist" => OrderedList,
        "listitem" => ListItem,
        "section" => Section,
        "article" => Article,
        "aside" => Aside,
        "header" => Header,
        "footer" => Footer,
        "nav" | "navigation" => Nav,
        "main" => Main,
        "span" => Span,
        "linebreak" | "break" => LineBreak,
        "rule" | "line" => Rule,
        "table" => Table,
        "tablerow" => TableRow,
        "tabledata" => TableData,
        "tableheader" => TableHeader,
        "true" => True,
        "false" => False,
        "empty" => Empty,
        _ => return None,
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Matched text, except for strings which hold the unescaped contents.
    pub text: String,
    pub location: Location,
    pub span: SourceSpan,
}

impl Token {
    /// Text used when this token shows up in a diagnostic.
    pub fn describe(&self) -> &str {
        match self.kind {
            TokenKind::Newline => "end of line",
            TokenKind::Eof => "end of input",
            _ => &self.text,
        }
    }
}

/// Tokenize the whole source. Never fails: problems are reported and
/// skipped, and the result always ends with a single [`TokenKind::Eof`].
pub fn tokenize(source: &Source, reporter: &mut Reporter<'_>) -> Vec<Token> {
    let mut lexer = Lexer::new(source, reporter);
    let mut tokens = vec![];
    loop {
        let token = lexer.scan();
        let end = token.kind == TokenKind::Eof;
        tokens.push(token);
        if end {
            break;
        }
    }
    tracing::debug!(file = %source.name, count = tokens.len(), "tokenized");
    tokens
}

/// State of a lexer
pub struct Lexer<'source, 'reporter, 'reports> {
    /// Input source
    pub source: &'source Source,
    reporter: &'reporter mut Reporter<'reports>,
    /// Position of the next character to scan.
    pos: SourcePos,
    line: usize,
    column: usize,
}

impl<'source, 'reporter, 'reports> Lexer<'source, 'reporter, 'reports> {
    pub fn new(source: &'source Source, reporter: &'reporter mut Reporter<'reports>) -> Self {
        Self {
            source,
            reporter,
            pos: SourcePos(0),
            line: 1,
            column: 1,
        }
    }

    /// Scan the next token, reporting and skipping anything unrecognized.
    pub fn scan(&mut self) -> Token {
        loop {
            self.bump_while(|c| matches!(c, ' ' | '\t' | '\r'));
            let start = self.pos;
            let location = self.location();
            let kind = match self.peek() {
                None => TokenKind::Eof,
                Some('\n') => {
                    self.bump();
                    TokenKind::Newline
                }
                Some('#') => {
                    self.bump_while(|c| c != '\n');
                    continue;
                }
                Some('"') => match self.string() {
                    Some(value) => return self.token(TokenKind::String, value, start, location),
                    None => {
                        self.reporter.error(
                            &location,
                            SourceSpan::new(start, self.pos),
                            Message::UnterminatedString,
                        );
                        continue;
                    }
                },
                Some('0'..='9') => self.number(),
                Some('-') if matches!(self.peek_next(), Some('0'..='9')) => self.number(),
                Some('_' | 'A'..='Z' | 'a'..='z') => {
                    self.bump_while(|c| matches!(c, '_' | '0'..='9' | 'A'..='Z' | 'a'..='z'));
                    let text = &self.source.text[start.0..self.pos.0];
                    keyword(text).unwrap_or(TokenKind::Identifier)
                }
                Some('.') => {
                    self.bump();
                    TokenKind::Period
                }
                Some(',') => {
                    self.bump();
                    TokenKind::Comma
                }
                Some(ch) => {
                    self.bump();
                    self.reporter.error(
                        &location,
                        SourceSpan::new(start, self.pos),
                        Message::UnexpectedChar { ch },
                    );
                    continue;
                }
            };
            let text = self.source.text[start.0..self.pos.0].to_string();
            return self.token(kind, text, start, location);
        }
    }

    fn token(&self, kind: TokenKind, text: String, start: SourcePos, location: Location) -> Token {
        Token {
            kind,
            text,
            location,
            span: SourceSpan::new(start, self.pos),
        }
    }

    /// Scan a string literal starting at the opening quote, returning its
    /// unescaped contents, or `None` if the input ends first.
    fn string(&mut self) -> Option<String> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump()? {
                '"' => return Some(value),
                '\\' => match self.bump()? {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    // `\\`, `\"` and anything unknown keep the escaped char
                    escaped => value.push(escaped),
                },
                c => value.push(c),
            }
        }
    }

    fn number(&mut self) -> TokenKind {
        if self.peek() == Some('-') {
            self.bump();
        }
        self.bump_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && matches!(self.peek_next(), Some('0'..='9')) {
            self.bump();
            self.bump_while(|c| c.is_ascii_digit());
        }
        TokenKind::Number
    }

    fn location(&self) -> Location {
        Location::new(self.source.name.as_str(), self.line, self.column)
    }

    /// Return the character (if any) at the current position
    fn peek(&self) -> Option<char> {
        self.source.peek(self.pos)
    }

    /// Return the character (if any) after the current one
    fn peek_next(&self) -> Option<char> {
        let c = self.peek()?;
        self.source.peek(SourcePos(self.pos.0 + c.len_utf8()))
    }

    /// Consume one character, keeping line and column up to date.
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos.0 += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Advance to the first position that does not match the provided
    /// predicate. Never used across line breaks.
    fn bump_while(&mut self, while_char: impl Fn(char) -> bool) {
        let end = self.source.scan_forward(self.pos, |c| c != '\n' && while_char(c));
        self.column += self.source.text[self.pos.0..end.0].chars().count();
        self.pos = end;
    }
}

#[cfg(test)]
fn lex_all(source: &str) -> (Vec<Token>, Vec<crate::diag::Report>) {
    let source = Source::new("test", source);
    let mut reports = vec![];
    let tokens = tokenize(&source, &mut Reporter::new(&mut reports));
    (tokens, reports)
}

#[cfg(test)]
fn test(source: &str, expected: &[(TokenKind, &str)]) {
    let (tokens, reports) = lex_all(source);
    assert!(reports.is_empty(), "unexpected reports: {reports:?}");
    let actual = tokens
        .iter()
        .take_while(|token| token.kind != TokenKind::Eof)
        .map(|token| (token.kind, token.text.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(actual, expected);
}

#[test]
fn empty() {
    let (tokens, reports) = lex_all("");
    assert!(reports.is_empty());
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
}

#[test]
fn state_decl() {
    use TokenKind::*;
    test(
        "There is a number called count starting at 0.",
        &[
            (There, "There"),
            (Is, "is"),
            (A, "a"),
            (NumberType, "number"),
            (Called, "called"),
            (Identifier, "count"),
            (Starting, "starting"),
            (At, "at"),
            (Number, "0"),
            (Period, "."),
        ],
    )
}

#[test]
fn show_both_cases() {
    use TokenKind::*;
    test(
        "Show show",
        &[(Show, "Show"), (Show, "show")],
    )
}

#[test]
fn numbers() {
    use TokenKind::*;
    test(
        "-12 3.5 7. 8",
        &[
            (Number, "-12"),
            (Number, "3.5"),
            (Number, "7"),
            (Period, "."),
            (Number, "8"),
        ],
    )
}

#[test]
fn string_escapes() {
    test(
        r#""a\n\t\\\"b" "{count}""#,
        &[
            (TokenKind::String, "a\n\t\\\"b"),
            (TokenKind::String, "{count}"),
        ],
    )
}

#[test]
fn newlines_and_comments() {
    use TokenKind::*;
    test(
        "x # a comment\n\r\n  y",
        &[
            (Identifier, "x"),
            (Newline, "\n"),
            (Newline, "\n"),
            (Identifier, "y"),
        ],
    )
}

#[test]
fn aliases() {
    use TokenKind::*;
    test(
        "highlight blockquote navigation break line",
        &[
            (Mark, "highlight"),
            (Quote, "blockquote"),
            (Nav, "navigation"),
            (LineBreak, "break"),
            (Rule, "line"),
        ],
    )
}

#[test]
fn custom_names_are_identifiers() {
    use TokenKind::*;
    test(
        "card loadData _x1",
        &[(Identifier, "card"), (Identifier, "loadData"), (Identifier, "_x1")],
    )
}

#[test]
fn locations() {
    let (tokens, _) = lex_all("Show text.\n  show \"hi\".");
    let locations = tokens
        .iter()
        .map(|token| (token.location.line, token.location.column))
        .collect::<Vec<_>>();
    assert_eq!(
        locations,
        [(1, 1), (1, 6), (1, 10), (1, 11), (2, 3), (2, 8), (2, 12), (2, 13)]
    );
    assert_eq!(tokens[0].location.filename, "test");
}

#[test]
fn unexpected_characters_are_skipped() {
    let (tokens, reports) = lex_all("a @@ b");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].message, Message::UnexpectedChar { ch: '@' });
    assert_eq!(reports[1].location.column, 4);
    let kinds = tokens.iter().map(|token| token.kind).collect::<Vec<_>>();
    assert_eq!(
        kinds,
        [TokenKind::A, TokenKind::Identifier, TokenKind::Eof]
    );
}

#[test]
fn unterminated_string_reported_at_quote() {
    let (tokens, reports) = lex_all("Show text saying \"oops");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].message, Message::UnterminatedString);
    assert_eq!(
        (reports[0].location.line, reports[0].location.column),
        (1, 18)
    );
    assert_eq!(tokens.last().map(|token| token.kind), Some(TokenKind::Eof));
}
