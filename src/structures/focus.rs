use serde::Serialize;

use crate::parser::{Block, Expression, Program, VariableTable};
use crate::types::Diagnostics;

use super::{script_bool, ExtractError, FocusTree, Position};

/// A national focus.
///
/// Effect bodies (`available`, `bypass`, `completion_reward`, `ai_will_do`)
/// are not interpreted; they are kept as rendered script text for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Focus {
    pub id: String,
    pub icon: String,
    pub position: Position,
    pub relative_position_id: Option<String>,
    /// Each inner list is an OR group; the outer list is ANDed.
    pub prerequisites: Vec<Vec<String>>,
    pub mutually_exclusive: Vec<String>,
    pub cost: i32,
    pub cancel_if_invalid: bool,
    pub continue_if_invalid: bool,
    pub available_if_capitulated: bool,
    pub available: Option<String>,
    pub bypass: Option<String>,
    pub completion_reward: Option<String>,
    pub ai_will_do: Option<String>,
    pub search_filters: Vec<String>,
}

impl Focus {
    pub fn has_prerequisite(&self) -> bool {
        !self.prerequisites.is_empty()
    }

    pub fn is_mutually_exclusive_with(&self, other_id: &str) -> bool {
        self.mutually_exclusive.iter().any(|id| id == other_id)
    }
}

/// Extract every focus defined under the `focus_tree` block. Tree-level
/// metadata keys are skipped here; [extract_focus_tree] captures them.
pub fn extract_focuses(
    program: &Program,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Focus>, ExtractError> {
    Ok(extract_focus_tree(program, diagnostics)?.into_focuses())
}

/// Extract the whole `focus_tree` block: its metadata plus all focuses.
pub fn extract_focus_tree(
    program: &Program,
    diagnostics: &mut Diagnostics,
) -> Result<FocusTree, ExtractError> {
    if program.is_empty() {
        return Err(ExtractError::EmptyProgram);
    }
    let assignment = program
        .root
        .get("focus_tree")
        .ok_or(ExtractError::MissingBlock("focus_tree"))?;
    let block = assignment
        .value
        .as_block()
        .ok_or(ExtractError::NotABlock("focus_tree"))?;
    let variables = VariableTable::collect(program, Some(block));

    let mut tree = FocusTree::default();
    for entry in &block.assignments {
        if entry.key.starts_with('@') {
            continue;
        }
        match entry.key.as_str() {
            "id" => {
                if let Some(id) = entry.value.scalar() {
                    tree.id = id.to_owned();
                }
            }
            "country" => {
                tree.country = entry.value.scalar().map(str::to_owned);
            }
            "default" => {
                if let Some(value) = entry.value.scalar() {
                    tree.is_default = script_bool(value);
                }
            }
            "reset_on_civilwar" => {
                if let Some(value) = entry.value.scalar() {
                    tree.reset_on_civilwar = script_bool(value);
                }
            }
            "continuous_focus_position" => {
                if let Some(position) = entry.value.as_block() {
                    tree.continuous_focus_position =
                        Some(Position::from_block(position, &variables, diagnostics));
                }
            }
            "focus" => {
                let Some(focus_block) = entry.value.as_block() else {
                    continue;
                };
                match parse_focus(focus_block, &variables, diagnostics) {
                    Some(focus) => tree.add_focus(focus),
                    None => diagnostics
                        .warn(format!("skipping focus without id at line {}", entry.line)),
                }
            }
            _ => {}
        }
    }
    Ok(tree)
}

fn parse_focus(
    block: &Block,
    variables: &VariableTable,
    diagnostics: &mut Diagnostics,
) -> Option<Focus> {
    let mut focus = Focus {
        cost: 70,
        ..Focus::default()
    };
    for assignment in &block.assignments {
        match assignment.key.as_str() {
            "id" => {
                if let Some(id) = assignment.value.scalar() {
                    focus.id = id.to_owned();
                }
            }
            "icon" => {
                if let Some(icon) = assignment.value.scalar() {
                    focus.icon = icon.to_owned();
                }
            }
            "cost" => {
                if let Some(raw) = assignment.value.scalar() {
                    if let Some(cost) = variables.resolve_int(raw, diagnostics) {
                        focus.cost = cost;
                    }
                }
            }
            "x" => {
                if let Some(raw) = assignment.value.scalar() {
                    focus.position.x = variables.resolve_int(raw, diagnostics).unwrap_or(0);
                    focus.position.x_var = raw.starts_with('@').then(|| raw.to_owned());
                }
            }
            "y" => {
                if let Some(raw) = assignment.value.scalar() {
                    focus.position.y = variables.resolve_int(raw, diagnostics).unwrap_or(0);
                    focus.position.y_var = raw.starts_with('@').then(|| raw.to_owned());
                }
            }
            "relative_position_id" => {
                focus.relative_position_id = assignment.value.scalar().map(str::to_owned);
            }
            "prerequisite" => {
                if let Some(prereq_block) = assignment.value.as_block() {
                    let group = focus_references(prereq_block);
                    if !group.is_empty() {
                        focus.prerequisites.push(group);
                    }
                }
            }
            "mutually_exclusive" => {
                if let Some(mutex_block) = assignment.value.as_block() {
                    focus.mutually_exclusive = focus_references(mutex_block);
                }
            }
            "cancel_if_invalid" => {
                if let Some(value) = assignment.value.scalar() {
                    focus.cancel_if_invalid = script_bool(value);
                }
            }
            "continue_if_invalid" => {
                if let Some(value) = assignment.value.scalar() {
                    focus.continue_if_invalid = script_bool(value);
                }
            }
            "available_if_capitulated" => {
                if let Some(value) = assignment.value.scalar() {
                    focus.available_if_capitulated = script_bool(value);
                }
            }
            "available" => focus.available = Some(opaque_text(&assignment.value)),
            "bypass" => focus.bypass = Some(opaque_text(&assignment.value)),
            "completion_reward" => {
                focus.completion_reward = Some(opaque_text(&assignment.value));
            }
            "ai_will_do" => focus.ai_will_do = Some(opaque_text(&assignment.value)),
            "search_filters" => {
                if let Some(filters) = assignment.value.as_block() {
                    focus.search_filters = super::flat_word_list(filters);
                }
            }
            _ => {}
        }
    }
    if focus.id.is_empty() {
        return None;
    }
    Some(focus)
}

/// Collect `focus = <id>` entries from a prerequisite or
/// mutually_exclusive block.
fn focus_references(block: &Block) -> Vec<String> {
    block
        .get_all("focus")
        .filter_map(|a| a.value.scalar())
        .map(str::to_owned)
        .collect()
}

/// Render an effect body back to script-ish text for opaque storage.
fn opaque_text(value: &Expression) -> String {
    value.to_string()
}
