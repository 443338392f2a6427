use std::fmt;

/// Comparison operator of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    LessThan,
    GreaterThan,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Equals => f.write_str("="),
            Operator::LessThan => f.write_str("<"),
            Operator::GreaterThan => f.write_str(">"),
        }
    }
}

/// The right-hand side of an assignment.
///
/// Numeric and date values keep their source spelling in [raw](Expression::Number)
/// form so that `@`-variable references survive until resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A bare word: tech name, country tag, yes/no, `@SUPP`.
    Identifier(String),
    /// A quoted string, quotes stripped and escapes applied.
    String(String),
    /// A numeric literal or number-shaped variable (`@1918`), unparsed.
    Number(String),
    /// A date literal such as `1939.1.1`, unparsed.
    Date(String),
    /// A brace-delimited block of nested assignments.
    Block(Block),
}

impl Expression {
    /// The block payload, if this expression is one.
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Expression::Block(block) => Some(block),
            _ => None,
        }
    }

    /// The textual payload of a scalar expression. `None` for blocks.
    pub fn scalar(&self) -> Option<&str> {
        match self {
            Expression::Identifier(s)
            | Expression::String(s)
            | Expression::Number(s)
            | Expression::Date(s) => Some(s),
            Expression::Block(_) => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(s) | Expression::Number(s) | Expression::Date(s) => {
                f.write_str(s)
            }
            Expression::String(s) => write!(f, "\"{}\"", s),
            Expression::Block(block) => {
                f.write_str("{")?;
                for assignment in &block.assignments {
                    write!(f, " {}", assignment)?;
                }
                f.write_str(" }")
            }
        }
    }
}

/// A single `key <op> value` node.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub key: String,
    pub operator: Operator,
    pub value: Expression,
    pub line: usize,
}

impl Assignment {
    pub fn new(key: String, operator: Operator, value: Expression, line: usize) -> Self {
        Assignment {
            key,
            operator,
            value,
            line,
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.key, self.operator, self.value)
    }
}

/// An ordered sequence of assignments, possibly with repeated keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub assignments: Vec<Assignment>,
}

impl Block {
    /// The first assignment with the given key, in source order.
    pub fn get(&self, key: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.key == key)
    }

    /// All assignments with the given key, in source order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Assignment> {
        self.assignments.iter().filter(move |a| a.key == key)
    }

    /// The first scalar value stored under the key.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|a| a.value.scalar())
    }

    /// The first block value stored under the key.
    pub fn block(&self, key: &str) -> Option<&Block> {
        self.get(key).and_then(|a| a.value.as_block())
    }
}

/// A parsed script file: its top-level assignments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub root: Block,
}

impl Program {
    pub fn is_empty(&self) -> bool {
        self.root.assignments.is_empty()
    }
}
