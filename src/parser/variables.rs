use std::collections::HashMap;

use crate::types::Diagnostics;

use super::ast::{Block, Program};

/// A table of `@name = value` script variables.
///
/// Built in two passes: definitions at the top level of a file first, then
/// definitions inside the block being extracted, so block-local values
/// shadow file-level ones. Resolution fails open: an unknown variable
/// resolves to its own name and leaves a diagnostic, the same way the game
/// engine renders unresolved references verbatim.
#[derive(Debug, Default)]
pub struct VariableTable {
    values: HashMap<String, String>,
}

impl VariableTable {
    /// Collect variable definitions from a program's top level and,
    /// optionally, from one target block inside it.
    pub fn collect(program: &Program, target_block: Option<&Block>) -> Self {
        let mut table = VariableTable::default();
        table.scan(&program.root);
        if let Some(block) = target_block {
            table.scan(block);
        }
        table
    }

    fn scan(&mut self, block: &Block) {
        for assignment in &block.assignments {
            if assignment.key.starts_with('@') {
                if let Some(value) = assignment.value.scalar() {
                    self.values
                        .insert(assignment.key.clone(), value.to_owned());
                }
            }
        }
    }

    /// Resolve a raw scalar. Values not starting with `@` pass through
    /// unchanged; `@` references are looked up, and a miss returns the
    /// reference itself with a warning recorded.
    pub fn resolve<'a>(&'a self, raw: &'a str, diagnostics: &mut Diagnostics) -> &'a str {
        if !raw.starts_with('@') {
            return raw;
        }
        match self.values.get(raw) {
            Some(value) => value,
            None => {
                diagnostics.warn(format!("unresolved variable {}", raw));
                raw
            }
        }
    }

    /// Resolve a raw scalar and parse it as an integer, truncating a
    /// fractional part. Returns `None` when the resolved text is not
    /// numeric, with a warning recorded.
    pub fn resolve_int(&self, raw: &str, diagnostics: &mut Diagnostics) -> Option<i32> {
        let resolved = self.resolve(raw, diagnostics);
        match resolved.parse::<f64>() {
            Ok(value) => Some(value as i32),
            Err(_) => {
                diagnostics.warn(format!("non-numeric value '{}' where a number was expected", resolved));
                None
            }
        }
    }
}
