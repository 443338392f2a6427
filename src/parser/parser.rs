use std::error;

use derive_more::{Display, From};

use super::ast::{Assignment, Block, Expression, Operator, Program};
use super::lexer::{Lexer, Token, TokenKind};

/// A recoverable structural error found while parsing. Parsing continues
/// past these; the caller decides whether to treat them as fatal.
#[derive(Debug, Clone, PartialEq, Display)]
#[display("line {line}:{column}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// The error type for [parse_strict], raised when a script contains any
/// structural errors.
#[derive(Debug, Display, From)]
#[display("script has {} syntax error(s), first: {}", errors.len(), errors[0])]
pub struct ParseError {
    pub errors: Vec<SyntaxError>,
}

impl error::Error for ParseError {}

/// Parse a script permissively.
///
/// Always returns a [Program]; structural errors (a missing value after an
/// operator, an unclosed block) are accumulated alongside the partial tree.
/// Top-level tokens that do not begin an assignment are skipped silently,
/// which matches how the game engine treats stray words in script files.
pub fn parse(input: &str) -> (Program, Vec<SyntaxError>) {
    let mut parser = Parser::new(input);
    let root = parser.parse_assignments(true);
    (Program { root }, parser.errors)
}

/// Parse a script, rejecting it outright if any structural error is found.
pub fn parse_strict(input: &str) -> Result<Program, ParseError> {
    let (program, errors) = parse(input);
    if errors.is_empty() {
        Ok(program)
    } else {
        Err(ParseError { errors })
    }
}

/// Recursive-descent parser with two tokens of lookahead.
struct Parser {
    lexer: Lexer,
    current: Token,
    next: Token,
    errors: Vec<SyntaxError>,
}

impl Parser {
    fn new(input: &str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        let next = lexer.next_token();
        Parser {
            lexer,
            current,
            next,
            errors: Vec::new(),
        }
    }

    fn advance(&mut self) {
        self.current = std::mem::replace(&mut self.next, self.lexer.next_token());
    }

    fn error(&mut self, message: String, token: &Token) {
        self.errors.push(SyntaxError {
            message,
            line: token.line,
            column: token.column,
        });
    }

    /// Any token that can act as an assignment key or a bare list word.
    fn is_word(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Identifier
                | TokenKind::Keyword
                | TokenKind::String
                | TokenKind::Number
                | TokenKind::Date
        )
    }

    fn operator(kind: TokenKind) -> Option<Operator> {
        match kind {
            TokenKind::Equals => Some(Operator::Equals),
            TokenKind::LessThan => Some(Operator::LessThan),
            TokenKind::GreaterThan => Some(Operator::GreaterThan),
            _ => None,
        }
    }

    /// Parse a run of assignments until `}` (inside a block) or end of
    /// input. At the top level anything that is not an assignment head is
    /// skipped; inside a block bare words form element lists.
    fn parse_assignments(&mut self, top_level: bool) -> Block {
        let mut block = Block::default();
        loop {
            match self.current.kind {
                TokenKind::Eof => break,
                TokenKind::RightBrace if !top_level => break,
                kind if Self::is_word(kind) => {
                    if Self::operator(self.next.kind).is_some() {
                        if let Some(assignment) = self.parse_assignment() {
                            block.assignments.push(assignment);
                        }
                    } else if top_level {
                        self.advance();
                    } else {
                        self.parse_bare_word(&mut block);
                    }
                }
                _ => self.advance(),
            }
        }
        block
    }

    /// Parse `key <op> value` with the cursor on the key.
    /// Returns `None` when the value is missing; the error is recorded and
    /// the offending token is left in place for the enclosing loop.
    fn parse_assignment(&mut self) -> Option<Assignment> {
        let key = std::mem::take(&mut self.current.text);
        let line = self.current.line;
        self.advance();
        let operator = Self::operator(self.current.kind).unwrap_or(Operator::Equals);
        self.advance();
        let value = match self.current.kind {
            TokenKind::LeftBrace => {
                self.advance();
                let inner = self.parse_assignments(false);
                if self.current.kind == TokenKind::RightBrace {
                    self.advance();
                } else {
                    let token = self.current.clone();
                    self.error(format!("unclosed block for key '{}'", key), &token);
                }
                Expression::Block(inner)
            }
            TokenKind::Identifier | TokenKind::Keyword => {
                let text = std::mem::take(&mut self.current.text);
                self.advance();
                Expression::Identifier(text)
            }
            TokenKind::String => {
                let text = std::mem::take(&mut self.current.text);
                self.advance();
                Expression::String(text)
            }
            TokenKind::Number => {
                let text = std::mem::take(&mut self.current.text);
                self.advance();
                Expression::Number(text)
            }
            TokenKind::Date => {
                let text = std::mem::take(&mut self.current.text);
                self.advance();
                Expression::Date(text)
            }
            _ => {
                let token = self.current.clone();
                self.error(format!("missing value for key '{}'", key), &token);
                return None;
            }
        };
        Some(Assignment::new(key, operator, value, line))
    }

    /// Handle one bare word inside a block. Consecutive bare words become
    /// overlapping pairs: `a b c` yields `a = b`, `b = c`, `c = c`, so a
    /// flat list can be read back from either the keys or the values.
    fn parse_bare_word(&mut self, block: &mut Block) {
        let word = std::mem::take(&mut self.current.text);
        let line = self.current.line;
        let value = if Self::is_word(self.next.kind) {
            self.next.text.clone()
        } else {
            word.clone()
        };
        block.assignments.push(Assignment::new(
            word,
            Operator::Equals,
            Expression::Identifier(value),
            line,
        ));
        self.advance();
    }
}
