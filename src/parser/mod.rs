//! A permissive recursive-descent parser for the Paradox scripting
//! dialect used by game and mod files: nested `key = value` blocks,
//! `@` variables, date literals and `#` comments.

mod ast;
mod lexer;
#[allow(clippy::module_inception)]
mod parser;
mod variables;

pub use ast::{Assignment, Block, Expression, Operator, Program};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{parse, parse_strict, ParseError, SyntaxError};
pub use variables::VariableTable;
