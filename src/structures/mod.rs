use std::error;

use derive_more::Display;

use super::parser::Block;

mod position;
pub use position::Position;

mod technology;
pub use technology::{extract_technologies, TechPath, Technology};

mod focus;
pub use focus::{extract_focus_tree, extract_focuses, Focus};

mod tree;
pub use tree::{FocusTree, TechnologyTree};

mod bookmark;
pub use bookmark::{extract_bookmarks, Bookmark, BookmarkCountry};

mod condition;
pub use condition::{Condition, ConditionEvaluator};

mod folder;
pub use folder::{extract_folder_names, extract_folders, TechFolder};

mod country;
pub use country::{country_specific_flags, extract_country_flags, unlock_flags};

/// The error type shared by every extractor. The only hard failures are a
/// missing or malformed required top-level block; anything wrong inside a
/// single record skips that record with a diagnostic instead.
#[derive(Debug, Display, PartialEq, Eq)]
pub enum ExtractError {
    #[display("program is empty")]
    EmptyProgram,
    #[display("missing top-level block '{_0}'")]
    MissingBlock(&'static str),
    #[display("'{_0}' is not a block")]
    NotABlock(&'static str),
}

impl error::Error for ExtractError {}

/// Recover a flat word list from a block holding bare words.
///
/// The grammar represents `{ a b c }` as overlapping assignments
/// (`a = b`, `b = c`, `c = c`), so both keys and identifier values are read
/// back and de-duplicated preserving first-seen order.
pub(crate) fn flat_word_list(block: &Block) -> Vec<String> {
    let mut words = Vec::new();
    for assignment in &block.assignments {
        if !words.contains(&assignment.key) {
            words.push(assignment.key.clone());
        }
        if let crate::parser::Expression::Identifier(value) = &assignment.value {
            if !words.contains(value) {
                words.push(value.clone());
            }
        }
    }
    words
}

/// Paradox booleans: `yes`/`true` are true, everything else false.
pub(crate) fn script_bool(value: &str) -> bool {
    value == "yes" || value == "true"
}
