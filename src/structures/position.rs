use serde::Serialize;

use crate::parser::{Block, Expression, VariableTable};
use crate::types::Diagnostics;

/// A coordinate on the focus or technology grid.
///
/// When the source wrote a coordinate as a variable reference the resolved
/// numeric value lands in `x`/`y` and the symbolic name is kept in
/// `x_var`/`y_var` so display layers can show both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub x_var: Option<String>,
    pub y_var: Option<String>,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position {
            x,
            y,
            x_var: None,
            y_var: None,
        }
    }

    /// Read a `{ x = ... y = ... }` block, resolving variable references
    /// through the table. A coordinate that resolves to nothing numeric is
    /// left at zero.
    pub fn from_block(
        block: &Block,
        variables: &VariableTable,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut position = Position::default();
        for assignment in &block.assignments {
            let raw = match &assignment.value {
                Expression::Number(s) | Expression::Identifier(s) => s.as_str(),
                _ => continue,
            };
            let value = variables.resolve_int(raw, diagnostics).unwrap_or(0);
            let var_name = raw.starts_with('@').then(|| raw.to_owned());
            match assignment.key.as_str() {
                "x" => {
                    position.x = value;
                    position.x_var = var_name;
                }
                "y" => {
                    position.y = value;
                    position.y_var = var_name;
                }
                _ => {}
            }
        }
        position
    }
}
