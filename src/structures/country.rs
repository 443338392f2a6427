use crate::parser::{Block, Program};

/// Collect every `set_country_flag` value from a country history file, in
/// encounter order, walking nested blocks (effect bodies set flags too).
/// Duplicates are preserved; consumers that want a set de-duplicate
/// themselves.
pub fn extract_country_flags(program: &Program) -> Vec<String> {
    let mut flags = Vec::new();
    collect_flags(&program.root, &mut flags);
    flags
}

fn collect_flags(block: &Block, flags: &mut Vec<String>) {
    for assignment in &block.assignments {
        if assignment.key == "set_country_flag" {
            if let Some(flag) = assignment.value.scalar() {
                flags.push(flag.to_owned());
            }
        }
        if let Some(nested) = assignment.value.as_block() {
            collect_flags(nested, flags);
        }
    }
}

/// Only the `UNLOCK:` flags, the ones folder conditions typically test.
pub fn unlock_flags(flags: &[String]) -> Vec<String> {
    flags
        .iter()
        .filter(|flag| flag.starts_with("UNLOCK:"))
        .cloned()
        .collect()
}

/// Only the flags prefixed with `<TAG>_`.
pub fn country_specific_flags(flags: &[String], tag: &str) -> Vec<String> {
    let prefix = format!("{}_", tag);
    flags
        .iter()
        .filter(|flag| flag.starts_with(&prefix))
        .cloned()
        .collect()
}
