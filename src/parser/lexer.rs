use phf::{phf_set, Set};

/// Script words that get their own token kind. Purely informational; the
/// parser treats keywords and identifiers the same way, but downstream
/// tooling likes to highlight them differently.
static KEYWORDS: Set<&'static str> = phf_set! {
    "focus",
    "focus_tree",
    "technologies",
    "prerequisite",
    "mutually_exclusive",
    "available",
    "bypass",
    "completion_reward",
    "ai_will_do",
    "allow",
    "path",
    "leads_to_tech",
    "research_cost",
    "on_research_complete",
    "id",
    "icon",
    "position",
    "x",
    "y",
};

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// End of input. Returned indefinitely once reached.
    Eof,
    /// A single character that matched no lexing rule.
    Error,
    Identifier,
    String,
    Number,
    Date,
    Keyword,
    LeftBrace,
    RightBrace,
    Equals,
    LessThan,
    GreaterThan,
}

/// A lexical token together with the position of its first character.
/// Positions are 1-based, for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    fn new(kind: TokenKind, text: String, line: usize, column: usize) -> Self {
        Token {
            kind,
            text,
            line,
            column,
        }
    }
}

/// A tokenizer for the Paradox scripting dialect.
///
/// The lexer never fails: characters that match no rule become [TokenKind::Error]
/// tokens and lexing continues on the next character, an unterminated string
/// yields whatever was accumulated, and once the input is exhausted
/// [next_token](Lexer::next_token) keeps returning [TokenKind::Eof].
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Skip whitespace and `#` line comments. Runs before every token.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('#') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Produce the next token. Side-effect free with respect to tokens
    /// already emitted; every call strictly advances the read cursor until
    /// end of input.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();
        let line = self.line;
        let column = self.column + 1;
        let c = match self.advance() {
            Some(c) => c,
            None => return Token::new(TokenKind::Eof, String::new(), line, column),
        };
        match c {
            '{' => Token::new(TokenKind::LeftBrace, "{".to_owned(), line, column),
            '}' => Token::new(TokenKind::RightBrace, "}".to_owned(), line, column),
            '=' => Token::new(TokenKind::Equals, "=".to_owned(), line, column),
            '<' => Token::new(TokenKind::LessThan, "<".to_owned(), line, column),
            '>' => Token::new(TokenKind::GreaterThan, ">".to_owned(), line, column),
            '"' => self.read_string(line, column),
            '@' => self.read_variable(line, column),
            '-' => {
                if self.peek().is_some_and(|d| d.is_ascii_digit()) {
                    self.read_number('-', line, column)
                } else {
                    Token::new(TokenKind::Error, "-".to_owned(), line, column)
                }
            }
            c if c.is_ascii_digit() => self.read_number(c, line, column),
            c if c.is_alphabetic() || c == '_' => self.read_word(c, line, column),
            other => Token::new(TokenKind::Error, other.to_string(), line, column),
        }
    }

    /// Read a quoted string. The opening quote has already been consumed.
    /// Backslash escapes the following character; a missing closing quote
    /// ends the token at end of input with whatever was accumulated.
    fn read_string(&mut self, line: usize, column: usize) -> Token {
        let mut text = String::new();
        while let Some(c) = self.advance() {
            match c {
                '"' => break,
                '\\' => {
                    if let Some(escaped) = self.advance() {
                        text.push(escaped);
                    }
                }
                _ => text.push(c),
            }
        }
        Token::new(TokenKind::String, text, line, column)
    }

    /// Read a `@` variable form. The `@` has already been consumed.
    /// `@` + letter/underscore is an identifier (`@SUPP`); `@` + digit is a
    /// number-shaped variable name (`@1918`), kept as a number token so the
    /// parser treats it like any other numeric value.
    fn read_variable(&mut self, line: usize, column: usize) -> Token {
        let mut text = String::from('@');
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => {
                while let Some(c) = self.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        text.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
                Token::new(TokenKind::Identifier, text, line, column)
            }
            Some(c) if c.is_ascii_digit() => {
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
                Token::new(TokenKind::Number, text, line, column)
            }
            _ => Token::new(TokenKind::Error, text, line, column),
        }
    }

    fn read_digits(&mut self, text: &mut String) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Read a numeric literal. One dotted run keeps it a number (`45.67`),
    /// a second promotes it to a date (`1939.1.1`), and any further runs
    /// stay part of the date (bookmark dates carry an hour: `1936.1.1.12`).
    fn read_number(&mut self, first: char, line: usize, column: usize) -> Token {
        let mut text = String::from(first);
        self.read_digits(&mut text);
        let mut kind = TokenKind::Number;
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some('.'), Some(d)) if d.is_ascii_digit() => {
                    if text.contains('.') {
                        kind = TokenKind::Date;
                    }
                    text.push('.');
                    self.advance();
                    self.read_digits(&mut text);
                }
                _ => break,
            }
        }
        Token::new(kind, text, line, column)
    }

    /// Read an identifier or keyword. `:` is allowed in continuation so that
    /// flag names like `UNLOCK:radar` survive as one token.
    fn read_word(&mut self, first: char, line: usize, column: usize) -> Token {
        let mut text = String::from(first);
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == ':' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = if KEYWORDS.contains(text.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, text, line, column)
    }
}
