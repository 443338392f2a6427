use serde::Serialize;

use crate::parser::{Block, Program};
use crate::types::Diagnostics;

use super::{flat_word_list, script_bool, ExtractError};

/// A scenario start bookmark.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bookmark {
    pub name: String,
    pub description: String,
    /// Start date, verbatim; bookmark dates carry an hour (`1936.1.1.12`).
    pub date: String,
    pub default_country: String,
    pub countries: Vec<BookmarkCountry>,
}

/// A playable country listed in a bookmark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookmarkCountry {
    pub tag: String,
    pub history: String,
    pub ideology: String,
    pub is_major: bool,
    pub ideas: Vec<String>,
    pub focuses: Vec<String>,
}

impl BookmarkCountry {
    fn new(tag: String) -> Self {
        BookmarkCountry {
            tag,
            history: String::new(),
            ideology: String::new(),
            // minor = yes flips this off
            is_major: true,
            ideas: Vec::new(),
            focuses: Vec::new(),
        }
    }

    pub fn type_label(&self) -> &'static str {
        if self.is_major {
            "Major"
        } else {
            "Minor"
        }
    }
}

/// Keys inside a bookmark that are known metadata, never country tags.
const BOOKMARK_METADATA: &[&str] = &[
    "name",
    "desc",
    "date",
    "default_country",
    "effect",
    "picture",
    "default",
    "available",
];

/// Extract every bookmark under the `bookmarks` block.
///
/// A country entry is recognized as a block-valued assignment whose key is
/// 2-3 characters long. That is a heuristic, not a format guarantee: any
/// other short key with a block value would be swept up too, so anything
/// the format is known to use is screened out first.
pub fn extract_bookmarks(
    program: &Program,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Bookmark>, ExtractError> {
    if program.is_empty() {
        return Err(ExtractError::EmptyProgram);
    }
    let assignment = program
        .root
        .get("bookmarks")
        .ok_or(ExtractError::MissingBlock("bookmarks"))?;
    let block = assignment
        .value
        .as_block()
        .ok_or(ExtractError::NotABlock("bookmarks"))?;
    let mut bookmarks = Vec::new();
    for entry in block.get_all("bookmark") {
        match entry.value.as_block() {
            Some(bookmark_block) => bookmarks.push(parse_bookmark(bookmark_block)),
            None => diagnostics.warn(format!(
                "bookmark entry at line {} is not a block",
                entry.line
            )),
        }
    }
    Ok(bookmarks)
}

fn parse_bookmark(block: &Block) -> Bookmark {
    let mut bookmark = Bookmark::default();
    for assignment in &block.assignments {
        let key = assignment.key.as_str();
        match key {
            "name" => {
                if let Some(value) = assignment.value.scalar() {
                    bookmark.name = value.to_owned();
                }
            }
            "desc" => {
                if let Some(value) = assignment.value.scalar() {
                    bookmark.description = value.to_owned();
                }
            }
            "date" => {
                if let Some(value) = assignment.value.scalar() {
                    bookmark.date = value.to_owned();
                }
            }
            "default_country" => {
                if let Some(value) = assignment.value.scalar() {
                    bookmark.default_country = value.to_owned();
                }
            }
            _ if BOOKMARK_METADATA.contains(&key) => {}
            _ => {
                if let Some(country_block) = assignment.value.as_block() {
                    if (2..=3).contains(&key.len()) {
                        bookmark
                            .countries
                            .push(parse_country(key.to_owned(), country_block));
                    }
                }
            }
        }
    }
    bookmark
}

fn parse_country(tag: String, block: &Block) -> BookmarkCountry {
    let mut country = BookmarkCountry::new(tag);
    for assignment in &block.assignments {
        match assignment.key.as_str() {
            "history" => {
                if let Some(value) = assignment.value.scalar() {
                    country.history = value.to_owned();
                }
            }
            "ideology" => {
                if let Some(value) = assignment.value.scalar() {
                    country.ideology = value.to_owned();
                }
            }
            "minor" => {
                if let Some(value) = assignment.value.scalar() {
                    country.is_major = !script_bool(value);
                }
            }
            "ideas" => {
                if let Some(ideas) = assignment.value.as_block() {
                    country.ideas = flat_word_list(ideas);
                }
            }
            "focuses" => {
                if let Some(focuses) = assignment.value.as_block() {
                    country.focuses = flat_word_list(focuses);
                }
            }
            _ => {}
        }
    }
    country
}
